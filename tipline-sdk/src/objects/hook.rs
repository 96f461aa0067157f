use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Body posted by the phone-side notification forwarder.
///
/// The forwarder relays bank SMS / push notifications verbatim in `text`.
/// Some forwarder setups extract the amount on-device and send it in
/// `amount` instead; when both are present the structured field wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BankNotification {
    /// Free-text notification content.
    #[serde(default)]
    pub text: Option<String>,
    /// Pre-parsed amount, if the forwarder extracted one.
    #[serde(default)]
    pub amount: Option<Decimal>,
}

/// Acknowledgement returned to the forwarder.
///
/// The hook always acknowledges receipt; `ok: false` only signals that the
/// notification could not be interpreted at all. Delivery problems on the
/// forwarder side are retried by the forwarder, so the ack carries enough
/// detail to make those retries idempotent in practice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HookAck {
    pub ok: bool,
    /// Whether the observed amount matched a pending request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched: Option<bool>,
    /// The amount that was extracted from the notification.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
}

impl HookAck {
    /// Ack for a notification that was handled (confirmed or gate-dropped).
    pub fn handled(matched: Option<bool>, amount: Option<Decimal>) -> Self {
        Self {
            ok: true,
            matched,
            amount,
        }
    }

    /// Ack for a notification that carried no usable amount.
    pub fn unusable() -> Self {
        Self {
            ok: false,
            matched: None,
            amount: None,
        }
    }
}

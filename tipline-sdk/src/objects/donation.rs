use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request payload for declaring a donation intent.
///
/// Sent by the donation page when the donor asks for a payment QR code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateDonationRequest {
    /// Donor display name; the server substitutes a placeholder when absent.
    #[serde(default)]
    pub name: Option<String>,
    /// Amount the donor intends to transfer.
    pub amount: Decimal,
    /// Message to show alongside the alert.
    #[serde(default)]
    pub comment: Option<String>,
}

/// Response returned by the "create donation" endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateDonationResponse {
    /// Identifier of the pending request inside the matching engine.
    pub request_id: Uuid,
    /// PromptPay QR code as a base64 data URL, ready for an `<img>` tag.
    pub qr: String,
    /// Seconds until the pending request expires unpaid.
    pub expires_in_secs: u64,
}

/// A confirmed donation as returned by the history endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonationRecord {
    pub name: String,
    pub amount: Decimal,
    pub comment: String,
    /// RFC 3339 timestamp; sortable and directly displayable.
    #[serde(with = "time::serde::rfc3339")]
    pub confirmed_at: time::OffsetDateTime,
}

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tipline_sdk::objects::DonationRecord;

/// The result of a confirmed payment observation.
///
/// Created once per confirmation, appended to history and handed to the
/// alert queue; never mutated afterwards. The amount is the *observed*
/// amount from the bank notification — the bank is the source of truth for
/// what was actually received, not the pending request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmedDonation {
    pub name: String,
    pub amount: Decimal,
    pub comment: String,
    /// RFC 3339 in the snapshot file; sortable and directly displayable.
    #[serde(with = "time::serde::rfc3339")]
    pub confirmed_at: OffsetDateTime,
}

impl From<&ConfirmedDonation> for DonationRecord {
    fn from(d: &ConfirmedDonation) -> Self {
        DonationRecord {
            name: d.name.clone(),
            amount: d.amount,
            comment: d.comment.clone(),
            confirmed_at: d.confirmed_at,
        }
    }
}

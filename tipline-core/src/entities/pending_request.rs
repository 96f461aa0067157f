use rust_decimal::Decimal;
use time::OffsetDateTime;
use uuid::Uuid;

/// A payment a donor declared intent to make, awaiting bank confirmation.
///
/// Owned exclusively by the [`PendingStore`](crate::store::PendingStore):
/// read-only after insertion, removed either by a successful match or by
/// the expiry sweep. `amount > 0` is guaranteed at submission.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRequest {
    pub id: Uuid,
    pub name: String,
    pub amount: Decimal,
    pub comment: String,
    pub created_at: OffsetDateTime,
}

impl PendingRequest {
    /// Whether this request has outlived `ttl` as of `now`.
    pub fn is_expired(&self, now: OffsetDateTime, ttl: time::Duration) -> bool {
        now - self.created_at >= ttl
    }
}

use time::OffsetDateTime;
use tipline_sdk::objects::OverlayFrame;

/// One unit of display work waiting in the alert queue.
///
/// Created when a confirmation or a manual trigger occurs, consumed exactly
/// once by the queue's drain loop, never persisted.
#[derive(Debug, Clone)]
pub struct QueuedAlert {
    pub frame: OverlayFrame,
    pub enqueued_at: OffsetDateTime,
}

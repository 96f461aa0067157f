//! Channel factories and the producer-side handle for the alert pipeline.

use super::types::QueuedAlert;
use thiserror::Error;
use time::OffsetDateTime;
use tipline_sdk::objects::OverlayFrame;
use tokio::sync::{broadcast, mpsc};

/// Buffer for alerts waiting to be drained; enough for a burst of
/// confirmations without ever dropping one.
pub const ALERT_QUEUE_BUFFER: usize = 256;

/// Per-viewer buffer of undelivered frames. Paced deliveries are several
/// seconds apart, so a viewer only lags if its socket is effectively dead.
pub const VIEWER_BUFFER: usize = 64;

/// Receiver half of the paced alert queue, owned by the drain loop.
pub type AlertQueueReceiver = mpsc::Receiver<QueuedAlert>;

/// Receiver handle for one viewer connection.
pub type ViewerReceiver = broadcast::Receiver<OverlayFrame>;

/// Error returned when the alert queue is no longer accepting events.
#[derive(Debug, Error)]
#[error("alert queue is shut down")]
pub struct EnqueueError;

/// Producer-side handle for the alert pipeline.
///
/// Cloneable; held by the matcher and every HTTP handler that emits frames.
#[derive(Clone)]
pub struct AlertPublisher {
    queue_tx: mpsc::Sender<QueuedAlert>,
    live_tx: broadcast::Sender<OverlayFrame>,
}

impl AlertPublisher {
    /// Append a frame to the tail of the paced queue.
    ///
    /// Insertion order is delivery order. Fails only when the drain loop
    /// has shut down.
    pub async fn enqueue(
        &self,
        frame: OverlayFrame,
        now: OffsetDateTime,
    ) -> Result<(), EnqueueError> {
        self.queue_tx
            .send(QueuedAlert {
                frame,
                enqueued_at: now,
            })
            .await
            .map_err(|_| EnqueueError)
    }

    /// Push a frame to all currently connected viewers immediately,
    /// bypassing the pacing queue. Returns the number of viewers reached;
    /// zero viewers is a successful no-op.
    pub fn publish_now(&self, frame: OverlayFrame) -> usize {
        self.live_tx.send(frame).unwrap_or(0)
    }

    /// Subscribe a new viewer connection.
    pub fn subscribe(&self) -> ViewerReceiver {
        self.live_tx.subscribe()
    }

    /// Number of currently subscribed viewers.
    pub fn viewer_count(&self) -> usize {
        self.live_tx.receiver_count()
    }
}

/// Create the alert pipeline channels.
///
/// Returns the producer handle, the queue receiver for the
/// [`AlertQueue`](crate::processors::AlertQueue) drain loop, and the
/// broadcast sender the drain loop delivers through.
pub fn alert_channel() -> (
    AlertPublisher,
    AlertQueueReceiver,
    broadcast::Sender<OverlayFrame>,
) {
    let (queue_tx, queue_rx) = mpsc::channel(ALERT_QUEUE_BUFFER);
    let (live_tx, _) = broadcast::channel(VIEWER_BUFFER);
    (
        AlertPublisher {
            queue_tx,
            live_tx: live_tx.clone(),
        },
        queue_rx,
        live_tx,
    )
}

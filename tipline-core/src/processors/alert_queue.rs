//! AlertQueue processor.
//!
//! The AlertQueue is responsible for:
//! - Receiving [`QueuedAlert`]s in submission order
//! - Delivering each frame to every currently connected viewer
//! - Waiting a fixed pacing interval between deliveries so alerts never
//!   overlap on screen
//!
//! The queue is either idle (waiting on the channel) or draining (one
//! delivery pass plus the pacing sleep); delivery passes never overlap and
//! each queued event is delivered exactly once. Undelivered events are
//! dropped at shutdown — they are ephemeral visual notifications.

use crate::events::AlertQueueReceiver;
use std::time::Duration;
use tipline_sdk::objects::OverlayFrame;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info};

/// Drains the paced alert queue to the viewer broadcast channel.
pub struct AlertQueue {
    queue_rx: AlertQueueReceiver,
    live_tx: broadcast::Sender<OverlayFrame>,
    pacing: Duration,
    shutdown_rx: watch::Receiver<bool>,
}

impl AlertQueue {
    /// Create a new AlertQueue.
    ///
    /// `pacing` is the minimum gap between two consecutive deliveries.
    pub fn new(
        queue_rx: AlertQueueReceiver,
        live_tx: broadcast::Sender<OverlayFrame>,
        pacing: Duration,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            queue_rx,
            live_tx,
            pacing,
            shutdown_rx,
        }
    }

    /// Run the AlertQueue until shutdown is signaled.
    pub async fn run(mut self) {
        info!(pacing = ?self.pacing, "AlertQueue started");

        'drain: loop {
            tokio::select! {
                biased;

                _ = self.shutdown_rx.changed() => {
                    if *self.shutdown_rx.borrow() {
                        info!("AlertQueue received shutdown signal");
                        break 'drain;
                    }
                }

                Some(alert) = self.queue_rx.recv() => {
                    let kind = alert.frame.kind();
                    // A send with zero receivers is a completed delivery
                    // pass against an empty viewer set, not a failure.
                    let viewers = self.live_tx.send(alert.frame).unwrap_or(0);
                    debug!(
                        kind,
                        viewers,
                        enqueued_at = %alert.enqueued_at,
                        "Delivered alert"
                    );

                    // Pacing gap before the next delivery pass.
                    tokio::select! {
                        biased;

                        _ = self.shutdown_rx.changed() => {
                            if *self.shutdown_rx.borrow() {
                                info!("AlertQueue received shutdown signal");
                                break 'drain;
                            }
                        }

                        () = tokio::time::sleep(self.pacing) => {}
                    }
                }

                else => {
                    info!("Alert queue channel closed");
                    break 'drain;
                }
            }
        }

        info!("AlertQueue shutdown complete");
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::panic)]

    use super::*;
    use crate::events::{AlertPublisher, alert_channel};
    use rust_decimal::Decimal;
    use time::macros::datetime;
    use tokio::task::JoinHandle;

    const NOW: time::OffsetDateTime = datetime!(2026-08-06 12:00 UTC);
    const PACING: Duration = Duration::from_secs(6);

    fn repeat_frame(name: &str) -> OverlayFrame {
        OverlayFrame::AlertRepeat {
            name: name.to_owned(),
            amount: Decimal::from(10),
            comment: String::new(),
        }
    }

    fn frame_name(frame: OverlayFrame) -> String {
        match frame {
            OverlayFrame::AlertRepeat { name, .. } => name,
            other => panic!("unexpected frame {other:?}"),
        }
    }

    fn spawn_queue() -> (AlertPublisher, watch::Sender<bool>, JoinHandle<()>) {
        let (publisher, queue_rx, live_tx) = alert_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let queue = AlertQueue::new(queue_rx, live_tx, PACING, shutdown_rx);
        (publisher, shutdown_tx, tokio::spawn(queue.run()))
    }

    #[tokio::test(start_paused = true)]
    async fn delivers_in_order_with_pacing_gaps() {
        let (publisher, shutdown_tx, handle) = spawn_queue();
        let mut viewer = publisher.subscribe();

        for name in ["one", "two", "three"] {
            publisher.enqueue(repeat_frame(name), NOW).await.unwrap();
        }

        let start = tokio::time::Instant::now();
        assert_eq!(frame_name(viewer.recv().await.unwrap()), "one");

        assert_eq!(frame_name(viewer.recv().await.unwrap()), "two");
        assert!(start.elapsed() >= PACING);

        assert_eq!(frame_name(viewer.recv().await.unwrap()), "three");
        assert!(start.elapsed() >= PACING * 2);

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn drains_with_zero_viewers_and_returns_to_idle() {
        let (publisher, shutdown_tx, handle) = spawn_queue();

        for name in ["one", "two", "three"] {
            publisher.enqueue(repeat_frame(name), NOW).await.unwrap();
        }

        // Three paced passes against an empty viewer set.
        tokio::time::sleep(PACING * 5).await;

        // The queue is idle again: a late subscriber sees only new frames.
        let mut viewer = publisher.subscribe();
        publisher.enqueue(repeat_frame("four"), NOW).await.unwrap();
        assert_eq!(frame_name(viewer.recv().await.unwrap()), "four");

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn publish_now_bypasses_the_pacing_gap() {
        let (publisher, shutdown_tx, handle) = spawn_queue();
        let mut viewer = publisher.subscribe();

        publisher.enqueue(repeat_frame("queued"), NOW).await.unwrap();
        assert_eq!(frame_name(viewer.recv().await.unwrap()), "queued");

        // The queue is now in its pacing sleep; an immediate frame still
        // goes straight through.
        let start = tokio::time::Instant::now();
        publisher.publish_now(OverlayFrame::PaymentDone {
            name: "Alice".to_owned(),
            amount: Decimal::from(50),
        });
        let frame = viewer.recv().await.unwrap();
        assert_eq!(frame.kind(), "payment_done");
        assert!(start.elapsed() < PACING);

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn a_dropped_viewer_does_not_stall_the_queue() {
        let (publisher, shutdown_tx, handle) = spawn_queue();
        let mut stable = publisher.subscribe();
        let dying = publisher.subscribe();

        publisher.enqueue(repeat_frame("one"), NOW).await.unwrap();
        assert_eq!(frame_name(stable.recv().await.unwrap()), "one");
        drop(dying);

        publisher.enqueue(repeat_frame("two"), NOW).await.unwrap();
        assert_eq!(frame_name(stable.recv().await.unwrap()), "two");

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_drops_undelivered_events() {
        let (publisher, shutdown_tx, handle) = spawn_queue();
        let mut viewer = publisher.subscribe();

        for name in ["one", "two", "three", "four"] {
            publisher.enqueue(repeat_frame(name), NOW).await.unwrap();
        }
        assert_eq!(frame_name(viewer.recv().await.unwrap()), "one");

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();

        // Nothing further is delivered after shutdown.
        assert!(viewer.try_recv().is_err());
    }
}

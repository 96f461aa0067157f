//! ExpirySweeper processor.
//!
//! Periodically removes pending requests that outlived the policy TTL, so
//! abandoned QR codes cannot grow the pending store without bound. Runs on
//! a fixed interval regardless of request volume.

use crate::store::PendingStore;
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Periodic expiry sweep over the pending store.
pub struct ExpirySweeper {
    store: Arc<PendingStore>,
    period: Duration,
    shutdown_rx: watch::Receiver<bool>,
}

impl ExpirySweeper {
    pub fn new(store: Arc<PendingStore>, period: Duration, shutdown_rx: watch::Receiver<bool>) -> Self {
        Self {
            store,
            period,
            shutdown_rx,
        }
    }

    /// Run the ExpirySweeper until shutdown is signaled.
    pub async fn run(mut self) {
        info!(period = ?self.period, "ExpirySweeper started");

        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown_rx.changed() => {
                    if *self.shutdown_rx.borrow() {
                        info!("ExpirySweeper received shutdown signal");
                        break;
                    }
                }

                _ = ticker.tick() => {
                    let removed = self.store.sweep_expired(OffsetDateTime::now_utc());
                    if removed > 0 {
                        info!(removed, pending = self.store.len(), "Swept expired pending requests");
                    } else {
                        debug!(pending = self.store.len(), "Sweep found nothing expired");
                    }
                }
            }
        }

        info!("ExpirySweeper shutdown complete");
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::store::MatchPolicy;
    use rust_decimal::Decimal;

    #[tokio::test(start_paused = true)]
    async fn sweeps_expired_entries_and_keeps_fresh_ones() {
        let store = Arc::new(PendingStore::new(MatchPolicy::default()));
        let now = OffsetDateTime::now_utc();
        store
            .submit(
                Some("stale".into()),
                Decimal::from(10),
                None,
                now - time::Duration::seconds(700),
            )
            .unwrap();
        store
            .submit(Some("fresh".into()), Decimal::from(20), None, now)
            .unwrap();

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let sweeper = ExpirySweeper::new(Arc::clone(&store), Duration::from_secs(60), shutdown_rx);
        let handle = tokio::spawn(sweeper.run());

        // The first tick fires immediately.
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(store.len(), 1);
        assert!(
            store
                .find_best_match(Decimal::from(20), OffsetDateTime::now_utc())
                .is_some()
        );

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();
    }
}

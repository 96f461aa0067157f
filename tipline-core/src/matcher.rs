//! Bank-notification matching.
//!
//! Turns the noisy free-text signal from the phone-side forwarder into a
//! confirmed donation: a keyword gate drops notifications that are not
//! incoming credits, an amount parser extracts the observed value, and
//! [`Matcher::observe`] runs the confirmation workflow against the pending
//! store, history, and alert queue.

use crate::entities::ConfirmedDonation;
use crate::events::AlertPublisher;
use crate::history::DonationHistory;
use crate::store::PendingStore;
use regex::Regex;
use rust_decimal::Decimal;
use std::sync::{Arc, OnceLock};
use thiserror::Error;
use time::OffsetDateTime;
use tipline_sdk::objects::{BankNotification, OverlayFrame};
use tracing::{info, warn};

/// Errors from [`Matcher::observe`].
///
/// Neither variant mutates any state; the inbound event is simply dropped.
#[derive(Debug, Error, PartialEq)]
pub enum ObserveError {
    /// The notification text does not look like an incoming credit.
    #[error("notification is not an incoming credit")]
    NotACredit,

    /// No usable positive amount could be extracted.
    #[error("no usable amount in notification")]
    UnparsableAmount,
}

/// A handled observation: the confirmed donation plus whether it matched a
/// pending request or fell back to the anonymous identity.
#[derive(Debug, Clone)]
pub struct Observation {
    pub donation: ConfirmedDonation,
    pub matched: bool,
}

/// Words that mark a bank notification as an incoming credit rather than a
/// balance check, outgoing transfer, or promotion.
#[allow(clippy::expect_used)]
fn credit_gate() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)ยอดเงิน|จำนวนเงิน|รับเงิน|ฝาก|โอนเข้า|เงินเข้า|received|credited|deposit")
            .expect("credit gate pattern is constant")
    })
}

/// An amount immediately followed by a currency marker.
#[allow(clippy::expect_used)]
fn marked_amount() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)([0-9][0-9,]*(?:\.[0-9]+)?)\s*(?:บาท|baht|thb)")
            .expect("marked amount pattern is constant")
    })
}

/// Any numeric token, used when no marked amount is present.
#[allow(clippy::expect_used)]
fn bare_amount() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"[0-9][0-9,]*(?:\.[0-9]+)?").expect("bare amount pattern is constant")
    })
}

/// Whether `text` reads as an incoming-credit notification.
pub fn looks_like_credit(text: &str) -> bool {
    credit_gate().is_match(text)
}

/// Extract the observed amount from free text.
///
/// Prefers a number adjacent to a currency marker (`บาท`, `baht`, `thb`) so
/// account numbers and timestamps in the same message don't win; falls back
/// to the first numeric token. Thousands separators are tolerated.
pub fn parse_observed_amount(text: &str) -> Option<Decimal> {
    let token = marked_amount()
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .or_else(|| bare_amount().find(text).map(|m| m.as_str()))?;

    token.replace(',', "").parse().ok()
}

/// The confirmation workflow: pending-store lookup, history append, alert
/// enqueue. One instance per process, shared by the webhook handlers.
pub struct Matcher {
    store: Arc<PendingStore>,
    history: Arc<dyn DonationHistory>,
    alerts: AlertPublisher,
    fallback_name: String,
}

impl Matcher {
    /// `fallback_name` is the donor identity used when an observed credit
    /// matches no pending request (anonymous-confirm policy).
    pub fn new(
        store: Arc<PendingStore>,
        history: Arc<dyn DonationHistory>,
        alerts: AlertPublisher,
        fallback_name: String,
    ) -> Self {
        Self {
            store,
            history,
            alerts,
            fallback_name,
        }
    }

    /// Handle one observed bank notification.
    ///
    /// A structured `amount` from the forwarder is trusted as-is; free text
    /// goes through the credit gate and the amount parser. On success the
    /// best pending match is atomically removed and a `ConfirmedDonation`
    /// built from its name and comment with the *observed* amount; with no
    /// match the donation is confirmed under the fallback identity. The
    /// donation is appended to history (failure logged, never blocking) and
    /// a `donate` alert is queued; a real match additionally pushes an
    /// immediate `payment_done` frame for the donor page.
    pub async fn observe(
        &self,
        note: &BankNotification,
        now: OffsetDateTime,
    ) -> Result<Observation, ObserveError> {
        let amount = match note.amount {
            Some(amount) => amount,
            None => {
                let text = note.text.as_deref().unwrap_or("");
                if !looks_like_credit(text) {
                    return Err(ObserveError::NotACredit);
                }
                parse_observed_amount(text).ok_or(ObserveError::UnparsableAmount)?
            }
        };
        if amount <= Decimal::ZERO {
            return Err(ObserveError::UnparsableAmount);
        }

        let pending = self.store.take_match(amount, now);
        let matched = pending.is_some();
        let (name, comment) = match pending {
            Some(p) => (p.name, p.comment),
            None => (self.fallback_name.clone(), String::new()),
        };

        let donation = ConfirmedDonation {
            name,
            amount,
            comment,
            confirmed_at: now,
        };
        info!(
            name = %donation.name,
            amount = %donation.amount,
            matched,
            pending_left = self.store.len(),
            "Confirmed donation"
        );

        if let Err(e) = self.history.append(&donation).await {
            warn!(error = %e, "Failed to persist donation; alert continues");
        }

        let frame = OverlayFrame::Donate {
            name: donation.name.clone(),
            amount: donation.amount,
            comment: donation.comment.clone(),
            time: donation.confirmed_at,
        };
        if let Err(e) = self.alerts.enqueue(frame, now).await {
            warn!(error = %e, "Alert queue rejected donate frame");
        }

        if matched {
            self.alerts.publish_now(OverlayFrame::PaymentDone {
                name: donation.name.clone(),
                amount: donation.amount,
            });
        }

        Ok(Observation { donation, matched })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::events::alert_channel;
    use crate::history::HistoryError;
    use crate::store::MatchPolicy;
    use async_trait::async_trait;
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2026-08-06 12:00 UTC);

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    struct RecordingHistory(tokio::sync::Mutex<Vec<ConfirmedDonation>>);

    impl RecordingHistory {
        fn new() -> Arc<Self> {
            Arc::new(Self(tokio::sync::Mutex::new(Vec::new())))
        }
    }

    #[async_trait]
    impl DonationHistory for RecordingHistory {
        async fn append(&self, donation: &ConfirmedDonation) -> Result<(), HistoryError> {
            self.0.lock().await.push(donation.clone());
            Ok(())
        }

        async fn list_recent(&self) -> Vec<ConfirmedDonation> {
            self.0.lock().await.iter().rev().cloned().collect()
        }
    }

    struct FailingHistory;

    #[async_trait]
    impl DonationHistory for FailingHistory {
        async fn append(&self, _donation: &ConfirmedDonation) -> Result<(), HistoryError> {
            Err(HistoryError::Io(std::io::Error::other("history offline")))
        }

        async fn list_recent(&self) -> Vec<ConfirmedDonation> {
            Vec::new()
        }
    }

    fn text_note(text: &str) -> BankNotification {
        BankNotification {
            text: Some(text.to_owned()),
            amount: None,
        }
    }

    #[test]
    fn parses_marked_amounts_past_other_numbers() {
        let text = "เงินเข้าบัญชี x1234 ยอดเงิน 1,250.75 บาท";
        assert_eq!(parse_observed_amount(text), Some(dec("1250.75")));

        let text = "received 50.10 THB to account 998877";
        assert_eq!(parse_observed_amount(text), Some(dec("50.10")));
    }

    #[test]
    fn falls_back_to_the_first_numeric_token() {
        assert_eq!(parse_observed_amount("เงินเข้า 99"), Some(dec("99")));
        assert_eq!(parse_observed_amount("no numbers here"), None);
    }

    #[test]
    fn gate_rejects_non_credit_text() {
        assert!(looks_like_credit("เงินเข้า 50 บาท"));
        assert!(!looks_like_credit("โปรโมชั่นพิเศษ ลด 50%"));
    }

    fn matcher_with(
        store: Arc<PendingStore>,
        history: Arc<dyn DonationHistory>,
    ) -> (Matcher, crate::events::AlertQueueReceiver) {
        let (publisher, queue_rx, _live_tx) = alert_channel();
        (
            Matcher::new(store, history, publisher, "Mobile donor".to_owned()),
            queue_rx,
        )
    }

    #[tokio::test]
    async fn observed_amount_wins_over_pending_amount() {
        let store = Arc::new(PendingStore::new(MatchPolicy::default()));
        store
            .submit(Some("Alice".into()), dec("50"), Some("go team".into()), NOW)
            .unwrap();
        let history = RecordingHistory::new();
        let (matcher, mut queue_rx) = matcher_with(Arc::clone(&store), history.clone());

        let obs = matcher
            .observe(&text_note("เงินเข้า 50.1 บาท"), NOW)
            .await
            .unwrap();

        assert!(obs.matched);
        assert_eq!(obs.donation.name, "Alice");
        assert_eq!(obs.donation.amount, dec("50.1"));
        assert_eq!(obs.donation.comment, "go team");
        assert!(store.is_empty());

        assert_eq!(history.list_recent().await.len(), 1);
        let queued = queue_rx.recv().await.unwrap();
        assert_eq!(queued.frame.kind(), "donate");
    }

    #[tokio::test]
    async fn unmatched_credit_confirms_as_anonymous() {
        let store = Arc::new(PendingStore::new(MatchPolicy::default()));
        let history = RecordingHistory::new();
        let (matcher, mut queue_rx) = matcher_with(Arc::clone(&store), history);

        let obs = matcher
            .observe(&text_note("เงินเข้า 20 บาท"), NOW)
            .await
            .unwrap();

        assert!(!obs.matched);
        assert_eq!(obs.donation.name, "Mobile donor");
        assert_eq!(obs.donation.comment, "");
        assert!(store.is_empty());
        assert_eq!(queue_rx.recv().await.unwrap().frame.kind(), "donate");
    }

    #[tokio::test]
    async fn second_observation_of_the_same_amount_falls_back() {
        let store = Arc::new(PendingStore::new(MatchPolicy::default()));
        store
            .submit(Some("Alice".into()), dec("50"), None, NOW)
            .unwrap();
        let (matcher, _queue_rx) = matcher_with(Arc::clone(&store), RecordingHistory::new());

        let first = matcher.observe(&text_note("เงินเข้า 50 บาท"), NOW).await.unwrap();
        let second = matcher.observe(&text_note("เงินเข้า 50 บาท"), NOW).await.unwrap();

        assert!(first.matched);
        assert!(!second.matched);
        assert_eq!(second.donation.name, "Mobile donor");
    }

    #[tokio::test]
    async fn an_expired_request_is_not_matched_after_the_sweep() {
        let store = Arc::new(PendingStore::new(MatchPolicy::default()));
        store
            .submit(Some("Bob".into()), dec("20"), None, NOW)
            .unwrap();
        let (matcher, _queue_rx) = matcher_with(Arc::clone(&store), RecordingHistory::new());

        let later = NOW + time::Duration::seconds(700);
        store.sweep_expired(later);

        let obs = matcher
            .observe(&text_note("เงินเข้า 20 บาท"), later)
            .await
            .unwrap();

        assert!(!obs.matched);
        assert_eq!(obs.donation.name, "Mobile donor");
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn structured_amount_skips_the_text_gate() {
        let store = Arc::new(PendingStore::new(MatchPolicy::default()));
        store
            .submit(Some("Bob".into()), dec("20"), None, NOW)
            .unwrap();
        let (matcher, _queue_rx) = matcher_with(Arc::clone(&store), RecordingHistory::new());

        let note = BankNotification {
            text: None,
            amount: Some(dec("20")),
        };
        let obs = matcher.observe(&note, NOW).await.unwrap();
        assert!(obs.matched);
        assert_eq!(obs.donation.name, "Bob");
    }

    #[tokio::test]
    async fn gate_and_parser_failures_leave_the_store_untouched() {
        let store = Arc::new(PendingStore::new(MatchPolicy::default()));
        store
            .submit(Some("Alice".into()), dec("50"), None, NOW)
            .unwrap();
        let (matcher, _queue_rx) = matcher_with(Arc::clone(&store), RecordingHistory::new());

        assert!(matches!(
            matcher.observe(&text_note("your OTP is 123456"), NOW).await,
            Err(ObserveError::NotACredit)
        ));
        assert!(matches!(
            matcher.observe(&text_note("เงินเข้าบัญชีของคุณ"), NOW).await,
            Err(ObserveError::UnparsableAmount)
        ));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn history_failure_does_not_block_the_alert() {
        let store = Arc::new(PendingStore::new(MatchPolicy::default()));
        let (matcher, mut queue_rx) = matcher_with(store, Arc::new(FailingHistory));

        let obs = matcher
            .observe(&text_note("เงินเข้า 20 บาท"), NOW)
            .await
            .unwrap();

        assert!(!obs.matched);
        assert_eq!(queue_rx.recv().await.unwrap().frame.kind(), "donate");
    }
}

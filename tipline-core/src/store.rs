//! The pending request store.
//!
//! Holds submitted-but-unconfirmed payment intents and provides expiry and
//! best-match lookup. All mutation goes through a single mutex so that a
//! concurrent observe / submit / sweep can never see a half-updated
//! collection, and find-then-remove is one critical section.

use crate::entities::{DEFAULT_DONOR_NAME, PendingRequest};
use rust_decimal::Decimal;
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

/// Matching policy knobs, swappable at runtime via config reload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchPolicy {
    /// Maximum absolute difference between a pending amount and an observed
    /// amount for them to be considered the same payment.
    pub tolerance: Decimal,
    /// Maximum age a pending request may reach before the sweep removes it.
    pub ttl: time::Duration,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            // 0.50 currency units either way
            tolerance: Decimal::new(50, 2),
            ttl: time::Duration::seconds(600),
        }
    }
}

/// Errors from [`PendingStore::submit`].
#[derive(Debug, Error, PartialEq)]
pub enum SubmitError {
    /// The requested amount was zero or negative.
    #[error("donation amount must be positive, got {0}")]
    InvalidAmount(Decimal),
}

/// Time-bounded store of pending donation requests.
///
/// Constructed once per process and shared via `Arc`. The lock is never
/// held across a suspension point.
pub struct PendingStore {
    inner: Mutex<Inner>,
}

struct Inner {
    // Insertion order is submission order; ties in the match scan fall back
    // to the earliest entry, so ordering here is load-bearing.
    entries: Vec<PendingRequest>,
    policy: MatchPolicy,
}

impl PendingStore {
    pub fn new(policy: MatchPolicy) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: Vec::new(),
                policy,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // The store holds no invariant that a panicking holder could break
        // mid-update that later readers can't tolerate; recover the guard.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert a new pending request.
    ///
    /// An empty or missing name is replaced with [`DEFAULT_DONOR_NAME`].
    /// Returns a snapshot of the stored entry.
    pub fn submit(
        &self,
        name: Option<String>,
        amount: Decimal,
        comment: Option<String>,
        now: OffsetDateTime,
    ) -> Result<PendingRequest, SubmitError> {
        if amount <= Decimal::ZERO {
            return Err(SubmitError::InvalidAmount(amount));
        }

        let request = PendingRequest {
            id: Uuid::new_v4(),
            name: name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_DONOR_NAME.to_owned()),
            amount,
            comment: comment.unwrap_or_default(),
            created_at: now,
        };

        self.lock().entries.push(request.clone());
        Ok(request)
    }

    /// Find the best pending match for an observed amount without removing it.
    ///
    /// A candidate qualifies when its amount is within the policy tolerance
    /// of `observed` and it has not expired as of `now`. Among qualifying
    /// entries the smallest absolute difference wins; exact distance ties go
    /// to the oldest entry.
    pub fn find_best_match(&self, observed: Decimal, now: OffsetDateTime) -> Option<PendingRequest> {
        let inner = self.lock();
        best_index(&inner, observed, now).map(|i| inner.entries[i].clone())
    }

    /// Atomically find and remove the best match for an observed amount.
    ///
    /// This is the path the matcher uses: one lock acquisition covers the
    /// scan and the removal, so two concurrent observations of the same
    /// amount can never both claim the same entry.
    pub fn take_match(&self, observed: Decimal, now: OffsetDateTime) -> Option<PendingRequest> {
        let mut inner = self.lock();
        best_index(&inner, observed, now).map(|i| inner.entries.remove(i))
    }

    /// Remove a request by id. Idempotent: removing an entry that is already
    /// gone returns `false` and is not an error.
    pub fn remove(&self, id: Uuid) -> bool {
        let mut inner = self.lock();
        match inner.entries.iter().position(|e| e.id == id) {
            Some(i) => {
                inner.entries.remove(i);
                true
            }
            None => false,
        }
    }

    /// Remove every entry older than the policy TTL as of `now`; returns the
    /// number removed.
    pub fn sweep_expired(&self, now: OffsetDateTime) -> usize {
        let mut inner = self.lock();
        let ttl = inner.policy.ttl;
        let before = inner.entries.len();
        inner.entries.retain(|e| !e.is_expired(now, ttl));
        before - inner.entries.len()
    }

    /// Replace the matching policy (config reload).
    pub fn set_policy(&self, policy: MatchPolicy) {
        self.lock().policy = policy;
    }

    pub fn policy(&self) -> MatchPolicy {
        self.lock().policy
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }
}

/// Index of the best qualifying entry, if any.
///
/// Strictly-smaller comparison keeps the earliest entry on exact ties.
fn best_index(inner: &Inner, observed: Decimal, now: OffsetDateTime) -> Option<usize> {
    let mut best: Option<(Decimal, usize)> = None;
    for (i, entry) in inner.entries.iter().enumerate() {
        if entry.is_expired(now, inner.policy.ttl) {
            continue;
        }
        let distance = (entry.amount - observed).abs();
        if distance > inner.policy.tolerance {
            continue;
        }
        if best.map_or(true, |(d, _)| distance < d) {
            best = Some((distance, i));
        }
    }
    best.map(|(_, i)| i)
}

//! Donation history persistence.
//!
//! The matching engine only needs an append-only record of confirmed
//! donations; everything behind [`DonationHistory`] is a collaborator.
//! The bundled implementation keeps the full list in memory and mirrors
//! it to a point-in-time JSON snapshot file after every append, so a
//! restart picks up where the previous process left off.
//!
//! A failed append is reported to the caller but must never block the
//! visual alert — the matcher logs and continues.

use crate::entities::ConfirmedDonation;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors from history persistence. Maps to the "persistence unavailable"
/// failure class: recoverable, local to one append.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("history snapshot is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Append-only record of confirmed donations.
#[async_trait]
pub trait DonationHistory: Send + Sync {
    /// Append one confirmed donation.
    async fn append(&self, donation: &ConfirmedDonation) -> Result<(), HistoryError>;

    /// All recorded donations, newest first.
    async fn list_recent(&self) -> Vec<ConfirmedDonation>;
}

/// File-backed history: an in-memory list mirrored to a JSON snapshot.
pub struct JsonHistoryFile {
    path: PathBuf,
    records: RwLock<Vec<ConfirmedDonation>>,
}

impl JsonHistoryFile {
    /// Open (or create) a history snapshot at `path`.
    ///
    /// A missing file starts an empty history; a present but unreadable
    /// file is an error so a corrupt snapshot is never silently truncated.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, HistoryError> {
        let path = path.as_ref().to_path_buf();
        let records = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            records: RwLock::new(records),
        })
    }

    /// Write the snapshot atomically: temp file in the same directory,
    /// then rename over the previous snapshot.
    async fn write_snapshot(&self, records: &[ConfirmedDonation]) -> Result<(), HistoryError> {
        let json = serde_json::to_vec_pretty(records)?;
        let temp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, json).await?;
        tokio::fs::rename(&temp_path, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl DonationHistory for JsonHistoryFile {
    async fn append(&self, donation: &ConfirmedDonation) -> Result<(), HistoryError> {
        // The write lock is held across the snapshot write so the file
        // always reflects a prefix of the in-memory list.
        let mut records = self.records.write().await;
        records.push(donation.clone());
        self.write_snapshot(&records).await
    }

    async fn list_recent(&self) -> Vec<ConfirmedDonation> {
        let records = self.records.read().await;
        records.iter().rev().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use rust_decimal::Decimal;
    use time::macros::datetime;

    fn donation(name: &str, amount: &str) -> ConfirmedDonation {
        ConfirmedDonation {
            name: name.to_owned(),
            amount: amount.parse::<Decimal>().unwrap(),
            comment: String::new(),
            confirmed_at: datetime!(2026-08-06 12:00 UTC),
        }
    }

    #[tokio::test]
    async fn append_then_list_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let history = JsonHistoryFile::open(dir.path().join("donates.json"))
            .await
            .unwrap();

        history.append(&donation("Alice", "50")).await.unwrap();
        history.append(&donation("Bob", "20")).await.unwrap();

        let listed = history.list_recent().await;
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].name, "Bob");
        assert_eq!(listed[1].name, "Alice");
    }

    #[tokio::test]
    async fn snapshot_survives_a_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("donates.json");

        {
            let history = JsonHistoryFile::open(&path).await.unwrap();
            history.append(&donation("Alice", "50")).await.unwrap();
        }

        let reopened = JsonHistoryFile::open(&path).await.unwrap();
        let listed = reopened.list_recent().await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Alice");
    }

    #[tokio::test]
    async fn corrupt_snapshot_is_an_error_not_a_wipe() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("donates.json");
        tokio::fs::write(&path, b"not json").await.unwrap();

        assert!(JsonHistoryFile::open(&path).await.is_err());
    }
}

//! TOML file configuration structures.
//!
//! These structs directly map to the `tipline-config.toml` file format.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use tipline_core::store::MatchPolicy;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub promptpay: PromptPayConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "0.0.0.0:8080").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    "0.0.0.0:8080".parse().expect("valid default address")
}

/// PromptPay configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptPayConfig {
    /// Transfer target: a mobile number, 13-digit national/tax ID, or
    /// 15-digit e-wallet ID.
    pub target: String,
}

/// Matching engine configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Maximum absolute difference for a pending request to match an
    /// observed amount.
    #[serde(default = "default_tolerance")]
    pub tolerance: Decimal,
    /// Seconds a pending request lives before the sweep removes it.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    /// Seconds between expiry sweeps.
    #[serde(default = "default_sweep_secs")]
    pub sweep_secs: u64,
    /// Minimum seconds between two overlay alert deliveries.
    #[serde(default = "default_pacing_secs")]
    pub pacing_secs: u64,
    /// Donor identity for observed credits that match no pending request.
    #[serde(default = "default_anonymous_name")]
    pub anonymous_name: String,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
            ttl_secs: default_ttl_secs(),
            sweep_secs: default_sweep_secs(),
            pacing_secs: default_pacing_secs(),
            anonymous_name: default_anonymous_name(),
        }
    }
}

impl MatchingConfig {
    /// The store-side part of this section.
    pub fn policy(&self) -> MatchPolicy {
        MatchPolicy {
            tolerance: self.tolerance,
            ttl: time::Duration::seconds(self.ttl_secs as i64),
        }
    }
}

fn default_tolerance() -> Decimal {
    Decimal::new(50, 2)
}

fn default_ttl_secs() -> u64 {
    600
}

fn default_sweep_secs() -> u64 {
    60
}

fn default_pacing_secs() -> u64 {
    6
}

fn default_anonymous_name() -> String {
    "Mobile donor".to_owned()
}

/// Storage paths section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Donation history snapshot file.
    #[serde(default = "default_history_path")]
    pub history_path: PathBuf,
    /// Overlay appearance config file.
    #[serde(default = "default_overlay_path")]
    pub overlay_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            history_path: default_history_path(),
            overlay_path: default_overlay_path(),
        }
    }
}

fn default_history_path() -> PathBuf {
    PathBuf::from("donates.json")
}

fn default_overlay_path() -> PathBuf {
    PathBuf::from("overlay.json")
}

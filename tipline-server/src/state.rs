//! Application state shared across all request handlers.

use std::path::PathBuf;
use std::sync::Arc;
use tipline_core::events::AlertPublisher;
use tipline_core::history::DonationHistory;
use tipline_core::matcher::Matcher;
use tipline_core::store::PendingStore;
use tipline_sdk::objects::OverlayConfig;
use tokio::sync::RwLock;

/// Runtime PromptPay settings, swappable on SIGHUP.
#[derive(Debug, Clone)]
pub struct PromptPaySettings {
    /// Transfer target encoded into every donation QR code.
    pub target: String,
}

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
#[derive(Clone)]
pub struct AppState {
    /// Pending donation requests awaiting bank confirmation.
    pub pending: Arc<PendingStore>,
    /// Confirmed donation history.
    pub history: Arc<dyn DonationHistory>,
    /// The confirmation workflow driven by the bank hook.
    pub matcher: Arc<Matcher>,
    /// Producer handle for the alert pipeline.
    pub alerts: AlertPublisher,
    /// Overlay appearance config (editable from the dashboard).
    pub overlay: Arc<RwLock<OverlayConfig>>,
    /// Where the overlay config is persisted.
    pub overlay_path: Arc<PathBuf>,
    /// PromptPay settings (reloaded via SIGHUP).
    pub promptpay: Arc<RwLock<PromptPaySettings>>,
}

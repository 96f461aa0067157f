//! Tipline Server
//!
//! A PromptPay donation alert gateway: donors request a payment QR code, a
//! phone-side forwarder reports observed bank credits, and confirmed
//! donations are broadcast to overlay viewers one alert at a time.

mod api;
mod config;
mod server;
mod shutdown;
mod state;

use clap::Parser;
use config::ConfigLoader;
use server::{build_router, run_server};
use shutdown::spawn_config_reload_handler;
use state::{AppState, PromptPaySettings};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tipline_core::events::alert_channel;
use tipline_core::history::{DonationHistory, JsonHistoryFile};
use tipline_core::matcher::Matcher;
use tipline_core::processors::{AlertQueue, ExpirySweeper};
use tipline_core::store::PendingStore;
use tokio::sync::{RwLock, watch};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Tipline - PromptPay donation alert gateway
#[derive(Parser, Debug)]
#[command(name = "tipline-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./tipline-config.toml")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:3000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let args = Args::parse();

    tracing::info!("Starting tipline-server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_loader = Arc::new(ConfigLoader::new(&args.config, args.listen));
    let file_config = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;

    let listen_addr = file_config.server.listen;
    tracing::info!("Configuration loaded from {:?}", args.config);

    // Open the donation history snapshot
    let history = Arc::new(
        JsonHistoryFile::open(&file_config.storage.history_path)
            .await
            .map_err(|e| {
                tracing::error!("Failed to open donation history: {}", e);
                e
            })?,
    );
    tracing::info!(
        path = %file_config.storage.history_path.display(),
        records = history.list_recent().await.len(),
        "Donation history loaded"
    );

    // Load the overlay appearance config
    let overlay = api::overlay::load_config(&file_config.storage.overlay_path).await;

    // Build the matching engine and the alert pipeline
    let pending = Arc::new(PendingStore::new(file_config.matching.policy()));
    let (alerts, queue_rx, live_tx) = alert_channel();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let alert_queue = AlertQueue::new(
        queue_rx,
        live_tx,
        Duration::from_secs(file_config.matching.pacing_secs),
        shutdown_rx.clone(),
    );
    let sweeper = ExpirySweeper::new(
        Arc::clone(&pending),
        Duration::from_secs(file_config.matching.sweep_secs),
        shutdown_rx,
    );
    let queue_handle = tokio::spawn(alert_queue.run());
    let sweeper_handle = tokio::spawn(sweeper.run());

    let history_port: Arc<dyn DonationHistory> = history;
    let matcher = Arc::new(Matcher::new(
        Arc::clone(&pending),
        Arc::clone(&history_port),
        alerts.clone(),
        file_config.matching.anonymous_name.clone(),
    ));

    // Create application state
    let state = AppState {
        pending,
        history: history_port,
        matcher,
        alerts,
        overlay: Arc::new(RwLock::new(overlay)),
        overlay_path: Arc::new(file_config.storage.overlay_path.clone()),
        promptpay: Arc::new(RwLock::new(PromptPaySettings {
            target: file_config.promptpay.target.clone(),
        })),
    };

    // Spawn config reload handler (listens for SIGHUP)
    let reload_notify = spawn_config_reload_handler(state.clone(), config_loader);

    // Build the router
    let router = build_router(state);

    // Run the server
    tracing::info!("Starting HTTP server on {}", listen_addr);
    let result = run_server(router, listen_addr).await;

    // Signal the config reload handler and the processors to stop
    reload_notify.notify_one();
    let _ = shutdown_tx.send(true);
    let _ = queue_handle.await;
    let _ = sweeper_handle.await;

    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

//! Overlay API: the viewer WebSocket and the appearance config.
//!
//! `GET /overlay/ws` upgrades to a WebSocket and forwards every
//! [`OverlayFrame`] to the viewer until it disconnects. The server never
//! interprets client frames; viewers are display surfaces only. A viewer
//! that cannot keep up skips the frames it missed instead of stalling the
//! other connections.

use axum::{
    Json, Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use std::path::Path;
use tipline_core::events::AlertPublisher;
use tipline_sdk::objects::{OverlayConfig, OverlayFrame};
use tokio::sync::broadcast::error::RecvError;

use super::Ack;
use crate::state::AppState;

/// Build the overlay router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/overlay/ws", get(overlay_ws))
        .route("/overlay/config", get(get_config).post(save_config))
}

/// `GET /overlay/ws` — viewer WebSocket stream.
async fn overlay_ws(state: State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    let alerts = state.alerts.clone();
    ws.on_upgrade(move |socket| handle_viewer(socket, alerts))
}

/// Background task that drives a single viewer connection.
async fn handle_viewer(mut socket: WebSocket, alerts: AlertPublisher) {
    // Subscribe before anything else so no frame published after the
    // upgrade is missed.
    let mut frames = alerts.subscribe();
    tracing::debug!(viewers = alerts.viewer_count(), "Overlay viewer connected");

    loop {
        tokio::select! {
            result = frames.recv() => {
                match result {
                    Ok(frame) => {
                        if send_frame(&mut socket, &frame).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Overlay viewer lagged, skipping missed frames");
                    }
                    Err(RecvError::Closed) => {
                        break;
                    }
                }
            }

            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        break;
                    }
                    Some(Ok(_)) => {
                        // Viewers have nothing to say; ignore.
                    }
                    Some(Err(_)) => {
                        break;
                    }
                }
            }
        }
    }

    let _ = socket.send(Message::Close(None)).await;
    tracing::debug!("Overlay viewer disconnected");
}

/// Serialize `frame` as JSON and send it as a text WebSocket frame.
///
/// Returns `Err(())` if the send fails (client disconnected).
async fn send_frame(socket: &mut WebSocket, frame: &OverlayFrame) -> Result<(), ()> {
    let json = serde_json::to_string(frame).map_err(|_| ())?;
    socket.send(Message::Text(json.into())).await.map_err(|_| ())
}

/// `GET /overlay/config` — current overlay appearance settings.
async fn get_config(state: State<AppState>) -> Json<OverlayConfig> {
    Json(state.overlay.read().await.clone())
}

/// `POST /overlay/config` — replace the overlay appearance settings.
///
/// Persists the new config, swaps it into shared state, and pushes a
/// `config_update` frame to all viewers immediately (no pacing: the
/// overlay should restyle before the next alert, not after it).
async fn save_config(
    state: State<AppState>,
    Json(config): Json<OverlayConfig>,
) -> Result<Json<Ack>, OverlayApiError> {
    persist_config(&state.overlay_path, &config).await?;
    *state.overlay.write().await = config.clone();

    let viewers = state
        .alerts
        .publish_now(OverlayFrame::ConfigUpdate { config });
    tracing::info!(viewers, "Overlay config updated");

    Ok(Json(Ack::ok()))
}

/// Load the overlay config from disk, falling back to defaults when the
/// file is missing or unreadable (appearance settings are not worth
/// refusing startup over).
pub async fn load_config(path: &Path) -> OverlayConfig {
    match tokio::fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Overlay config unreadable, using defaults");
                OverlayConfig::default()
            }
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => OverlayConfig::default(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Overlay config unreadable, using defaults");
            OverlayConfig::default()
        }
    }
}

/// Write the overlay config atomically: temp file, then rename.
async fn persist_config(path: &Path, config: &OverlayConfig) -> Result<(), OverlayApiError> {
    let json = serde_json::to_vec_pretty(config).map_err(OverlayApiError::Serialize)?;
    let temp_path = path.with_extension("json.tmp");
    tokio::fs::write(&temp_path, json).await.map_err(OverlayApiError::Io)?;
    tokio::fs::rename(&temp_path, path).await.map_err(OverlayApiError::Io)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Error handling
// ---------------------------------------------------------------------------

/// Errors that can occur in overlay config handlers.
#[derive(Debug)]
enum OverlayApiError {
    Io(std::io::Error),
    Serialize(serde_json::Error),
}

impl IntoResponse for OverlayApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            OverlayApiError::Io(e) => {
                tracing::error!(error = %e, "Overlay config write failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "could not save overlay config")
                    .into_response()
            }
            OverlayApiError::Serialize(e) => {
                tracing::error!(error = %e, "Overlay config serialization failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "could not save overlay config")
                    .into_response()
            }
        }
    }
}

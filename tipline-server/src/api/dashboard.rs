//! Dashboard API: alert replay, appearance preview, and a smoke test.
//!
//! All three feed the same paced alert queue as real confirmations, so a
//! replay fired during a live alert waits its turn instead of stacking on
//! screen.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use rust_decimal::Decimal;
use time::OffsetDateTime;
use tipline_core::events::EnqueueError;
use tipline_sdk::objects::{OverlayFrame, PreviewAlertRequest, RepeatAlertRequest};

use super::Ack;
use crate::state::AppState;

/// Comment shown when a trigger does not provide one.
const DEFAULT_COMMENT: &str = "Thank you for your support";

/// Build the dashboard router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/alerts/repeat", post(repeat_alert))
        .route("/alerts/preview", post(preview_alert))
        .route("/alerts/test", get(test_alert))
}

/// `POST /alerts/repeat` — replay a past alert from the dashboard.
async fn repeat_alert(
    state: State<AppState>,
    Json(body): Json<RepeatAlertRequest>,
) -> Result<Json<Ack>, DashboardApiError> {
    tracing::info!(name = %body.name, amount = %body.amount, "Replaying alert from dashboard");

    let frame = OverlayFrame::AlertRepeat {
        name: body.name,
        amount: body.amount,
        comment: body.comment.unwrap_or_else(|| DEFAULT_COMMENT.to_owned()),
    };
    state
        .alerts
        .enqueue(frame, OffsetDateTime::now_utc())
        .await?;
    Ok(Json(Ack::ok()))
}

/// `POST /alerts/preview` — fire a styled preview alert.
async fn preview_alert(
    state: State<AppState>,
    Json(body): Json<PreviewAlertRequest>,
) -> Result<Json<Ack>, DashboardApiError> {
    let overlay = state.overlay.read().await;
    let frame = OverlayFrame::AlertTest {
        name: "tipline".to_owned(),
        amount: Decimal::from(99),
        comment: body.text.unwrap_or_else(|| DEFAULT_COMMENT.to_owned()),
        color: body.color.unwrap_or_else(|| overlay.color.clone()),
        effect: body.effect.unwrap_or_else(|| overlay.animation.clone()),
    };
    drop(overlay);

    state
        .alerts
        .enqueue(frame, OffsetDateTime::now_utc())
        .await?;
    Ok(Json(Ack::ok()))
}

/// `GET /alerts/test` — queue a canned donation alert to smoke-test the
/// overlay end to end.
async fn test_alert(state: State<AppState>) -> Result<Json<Ack>, DashboardApiError> {
    let frame = OverlayFrame::Donate {
        name: "Test donor".to_owned(),
        amount: Decimal::from(99),
        comment: DEFAULT_COMMENT.to_owned(),
        time: OffsetDateTime::now_utc(),
    };
    state
        .alerts
        .enqueue(frame, OffsetDateTime::now_utc())
        .await?;
    tracing::info!("Queued test alert");
    Ok(Json(Ack::ok()))
}

// ---------------------------------------------------------------------------
// Error handling
// ---------------------------------------------------------------------------

/// Errors that can occur in dashboard handlers.
#[derive(Debug)]
struct DashboardApiError(EnqueueError);

impl From<EnqueueError> for DashboardApiError {
    fn from(e: EnqueueError) -> Self {
        Self(e)
    }
}

impl IntoResponse for DashboardApiError {
    fn into_response(self) -> axum::response::Response {
        tracing::error!(error = %self.0, "Alert queue unavailable");
        (StatusCode::SERVICE_UNAVAILABLE, "alert queue unavailable").into_response()
    }
}

//! Bank-notification webhook.
//!
//! The phone-side forwarder posts every bank SMS / push notification here.
//! The hook is deliberately forgiving: anything that is not an incoming
//! credit is acknowledged and dropped, and a notification without a usable
//! amount is reported in the body — never a 5xx, so the forwarder does not
//! retry garbage forever.

use axum::{Json, Router, extract::State, routing::post};
use time::OffsetDateTime;
use tipline_core::matcher::ObserveError;
use tipline_sdk::objects::{BankNotification, HookAck};

use crate::state::AppState;

/// Build the webhook router.
pub fn router() -> Router<AppState> {
    Router::new().route("/hooks/bank", post(bank_hook))
}

/// `POST /hooks/bank` — observe a bank notification.
async fn bank_hook(state: State<AppState>, Json(body): Json<BankNotification>) -> Json<HookAck> {
    let now = OffsetDateTime::now_utc();

    match state.matcher.observe(&body, now).await {
        Ok(observation) => Json(HookAck::handled(
            Some(observation.matched),
            Some(observation.donation.amount),
        )),
        Err(ObserveError::NotACredit) => {
            tracing::debug!("Ignoring non-credit notification");
            Json(HookAck::handled(None, None))
        }
        Err(ObserveError::UnparsableAmount) => {
            tracing::warn!(text = ?body.text, "Credit notification without a usable amount");
            Json(HookAck::unusable())
        }
    }
}

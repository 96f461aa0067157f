use axum::{Json, extract::State, response::IntoResponse};
use tipline_sdk::objects::DonationRecord;

use crate::state::AppState;

/// `GET /donations` — confirmed donation history, newest first.
pub(super) async fn list_donations(state: State<AppState>) -> impl IntoResponse {
    let records: Vec<DonationRecord> = state
        .history
        .list_recent()
        .await
        .iter()
        .map(DonationRecord::from)
        .collect();
    Json(records)
}

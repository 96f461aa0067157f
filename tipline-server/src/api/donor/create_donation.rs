use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use time::OffsetDateTime;
use tipline_core::{promptpay, qr};
use tipline_sdk::objects::{CreateDonationRequest, CreateDonationResponse};

use super::DonorApiError;
use crate::state::AppState;

/// `POST /donations` — declare a donation intent.
///
/// Builds the PromptPay payload and QR code first, then inserts the pending
/// request, so a render failure leaves no stray entry behind. The QR
/// embeds the requested amount; the bank notification later observed for
/// it is matched within the configured tolerance.
pub(super) async fn create_donation(
    state: State<AppState>,
    Json(body): Json<CreateDonationRequest>,
) -> Result<impl IntoResponse, DonorApiError> {
    let target = state.promptpay.read().await.target.clone();

    let payload = promptpay::build_payload(&target, Some(body.amount))?;
    let qr = qr::render_data_url(&payload)?;

    let now = OffsetDateTime::now_utc();
    let request = state
        .pending
        .submit(body.name, body.amount, body.comment, now)?;

    let ttl = state.pending.policy().ttl;
    tracing::info!(
        request_id = %request.id,
        name = %request.name,
        amount = %request.amount,
        pending = state.pending.len(),
        "Created pending donation request"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateDonationResponse {
            request_id: request.id,
            qr,
            expires_in_secs: ttl.whole_seconds().max(0) as u64,
        }),
    ))
}

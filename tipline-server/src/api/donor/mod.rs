//! Donor API handlers.
//!
//! These endpoints are called by the public donation page.
//!
//! # Endpoints
//!
//! - `POST /donations` – declare a donation intent, get a PromptPay QR code
//! - `GET  /donations` – confirmed donation history, newest first

use axum::{Router, http::StatusCode, response::IntoResponse, routing::post};
use tipline_core::promptpay::PayloadError;
use tipline_core::qr::RenderError;
use tipline_core::store::SubmitError;

use crate::state::AppState;

mod create_donation;
mod list_donations;

/// Build the Donor API router.
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/donations",
        post(create_donation::create_donation).get(list_donations::list_donations),
    )
}

// ---------------------------------------------------------------------------
// Error handling
// ---------------------------------------------------------------------------

/// Errors that can occur in Donor API handlers.
#[derive(Debug)]
enum DonorApiError {
    /// The requested amount was rejected.
    InvalidAmount(String),
    /// The PromptPay payload could not be built.
    Payload(PayloadError),
    /// The QR image could not be rendered.
    Render(RenderError),
}

impl From<SubmitError> for DonorApiError {
    fn from(e: SubmitError) -> Self {
        DonorApiError::InvalidAmount(e.to_string())
    }
}

impl From<PayloadError> for DonorApiError {
    fn from(e: PayloadError) -> Self {
        match e {
            PayloadError::InvalidAmount(_) => DonorApiError::InvalidAmount(e.to_string()),
            PayloadError::EmptyTarget => DonorApiError::Payload(e),
        }
    }
}

impl From<RenderError> for DonorApiError {
    fn from(e: RenderError) -> Self {
        DonorApiError::Render(e)
    }
}

impl IntoResponse for DonorApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            DonorApiError::InvalidAmount(message) => {
                (StatusCode::BAD_REQUEST, message).into_response()
            }
            DonorApiError::Payload(e) => {
                tracing::error!(error = %e, "PromptPay payload build failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "payment target misconfigured")
                    .into_response()
            }
            DonorApiError::Render(e) => {
                tracing::error!(error = %e, "QR render failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "could not render QR code").into_response()
            }
        }
    }
}

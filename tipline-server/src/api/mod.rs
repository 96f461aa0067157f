//! HTTP API.
//!
//! - `donor` — the public donation page: create a request, list history
//! - `hook` — the bank-notification webhook from the phone forwarder
//! - `overlay` — the viewer WebSocket and overlay appearance config
//! - `dashboard` — alert replay / preview / smoke test

use serde::Serialize;

pub mod dashboard;
pub mod donor;
pub mod hook;
pub mod overlay;

/// Minimal acknowledgement body for fire-and-forget endpoints.
#[derive(Debug, Serialize)]
pub struct Ack {
    pub ok: bool,
}

impl Ack {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

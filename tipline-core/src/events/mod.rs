//! Event plumbing between the matching engine and the overlay transport.
//!
//! # Event flow
//!
//! 1. HTTP handlers and the [`Matcher`](crate::matcher::Matcher) hand
//!    [`QueuedAlert`]s to the [`AlertPublisher`].
//! 2. The [`AlertQueue`](crate::processors::AlertQueue) drains them one at
//!    a time, pacing deliveries so alerts never overlap on screen.
//! 3. Each delivery fans out over a broadcast channel to every currently
//!    subscribed viewer connection; viewers that disconnect mid-delivery
//!    simply miss the frame.
//!
//! Frames that must not wait for pacing (`payment_done`, `config_update`)
//! bypass the queue via [`AlertPublisher::publish_now`].

pub mod channels;
pub mod types;

pub use channels::{
    AlertPublisher, AlertQueueReceiver, EnqueueError, ViewerReceiver, alert_channel,
    ALERT_QUEUE_BUFFER, VIEWER_BUFFER,
};
pub use types::QueuedAlert;

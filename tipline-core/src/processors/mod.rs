//! Long-running processor tasks.
//!
//! - `AlertQueue`: drains queued display events to all connected viewers,
//!   one at a time with a fixed pacing gap.
//! - `ExpirySweeper`: periodically removes expired pending requests.
//!
//! Both are spawned once at startup and stop when the shared shutdown
//! watch flips to `true`.

pub mod alert_queue;
pub mod sweeper;

pub use alert_queue::AlertQueue;
pub use sweeper::ExpirySweeper;

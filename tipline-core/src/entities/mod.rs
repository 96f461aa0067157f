pub mod confirmed_donation;
pub mod pending_request;

pub use confirmed_donation::ConfirmedDonation;
pub use pending_request::PendingRequest;

/// Display name used when a donor submits a request without one.
pub const DEFAULT_DONOR_NAME: &str = "Anonymous";

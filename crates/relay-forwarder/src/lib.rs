//! Downstream forwarding for the webhook relay.
//!
//! Forwards an ingested event to a single target using a fixed retry
//! schedule: three attempts, fixed pauses, no backoff growth, no jitter.

pub mod error;
pub mod http_forwarder;
pub mod schedule;

pub use error::RelayError;
pub use http_forwarder::HttpRelayForwarder;
pub use schedule::RetrySchedule;

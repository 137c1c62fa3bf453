//! Shared test mocks and utilities for the webhook relay.

mod clock;
mod forwarder;
mod store;

pub use clock::{FixedClock, SteppingClock};
pub use forwarder::{CountingForwarder, ForwardedCall};
pub use store::{FailingEventStore, InMemoryEventStore};

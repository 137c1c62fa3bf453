//! Domain error types.

use thiserror::Error;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The inbound payload was rejected before any state was touched.
    #[error("validation error: {0}")]
    Validation(String),

    /// No event exists with the requested identifier.
    #[error("event not found: {0}")]
    EventNotFound(String),

    /// The event store could not complete an operation.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// A collaborator broke its contract or something else went wrong.
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl DomainError {
    /// Whether the error is the caller's fault rather than the server's.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::EventNotFound(_))
    }
}

//! Forwarding error types.

use thiserror::Error;

/// Errors raised while forwarding.
///
/// Only `ClientBuild` leaves this crate; the other variants are recovered
/// inside the retry loop.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The outbound HTTP client could not be constructed.
    #[error("failed to build relay HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    /// The request never produced a response (timeout, refused, DNS, ...).
    #[error("relay transport failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The target answered with a status outside 2xx.
    #[error("relay target returned status {0}")]
    NonSuccessStatus(u16),
}

impl RelayError {
    /// The status code carried by the error, if the target answered at all.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::NonSuccessStatus(code) => Some(*code),
            Self::ClientBuild(_) | Self::Transport(_) => None,
        }
    }
}

//! Forwarding abstraction.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::correlation::CorrelationId;
use crate::event::RelayEventView;

/// Result of trying to forward one event to the downstream target.
///
/// Exhausting the retry budget is a normal outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayOutcome {
    /// Whether any attempt was made.
    pub attempted: bool,
    /// Whether an attempt got a 2xx response.
    pub success: bool,
    /// The last status code observed, if any attempt produced one.
    pub status_code: Option<u16>,
}

impl RelayOutcome {
    /// An attempt received a 2xx response.
    #[must_use]
    pub fn delivered(status_code: u16) -> Self {
        Self {
            attempted: true,
            success: true,
            status_code: Some(status_code),
        }
    }

    /// Every attempt failed.
    #[must_use]
    pub fn exhausted(last_status: Option<u16>) -> Self {
        Self {
            attempted: true,
            success: false,
            status_code: last_status,
        }
    }
}

/// Best-effort delivery of an event to a single downstream target.
///
/// Implementations never fail past this boundary: every path ends in a
/// `RelayOutcome`.
#[async_trait]
pub trait Forwarder: Send + Sync {
    /// Attempts delivery of `event` to `target_url`, carrying `correlation_id`.
    async fn attempt(
        &self,
        event: &RelayEventView<'_>,
        target_url: &str,
        correlation_id: &CorrelationId,
    ) -> RelayOutcome;
}

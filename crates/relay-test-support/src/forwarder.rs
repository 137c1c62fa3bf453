//! Test forwarder that records every `attempt` call and returns a canned outcome.

use std::sync::Mutex;

use async_trait::async_trait;
use relay_core::correlation::CorrelationId;
use relay_core::event::RelayEventView;
use relay_core::relay::{Forwarder, RelayOutcome};

/// One recorded call to `CountingForwarder::attempt`.
#[derive(Debug, Clone)]
pub struct ForwardedCall {
    /// The event view, as it would have been sent.
    pub body: serde_json::Value,
    /// The target the event was addressed to.
    pub target_url: String,
    /// The correlation id passed alongside.
    pub correlation_id: CorrelationId,
}

/// A forwarder that never touches the network.
#[derive(Debug)]
pub struct CountingForwarder {
    outcome: RelayOutcome,
    calls: Mutex<Vec<ForwardedCall>>,
}

impl CountingForwarder {
    /// A forwarder whose every attempt succeeds with status 200.
    #[must_use]
    pub fn succeeding() -> Self {
        Self::returning(RelayOutcome::delivered(200))
    }

    /// A forwarder that always returns `outcome`.
    #[must_use]
    pub fn returning(outcome: RelayOutcome) -> Self {
        Self {
            outcome,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Number of times `attempt` was invoked.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Returns a snapshot of all recorded calls.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn calls(&self) -> Vec<ForwardedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Forwarder for CountingForwarder {
    async fn attempt(
        &self,
        event: &RelayEventView<'_>,
        target_url: &str,
        correlation_id: &CorrelationId,
    ) -> RelayOutcome {
        let body = serde_json::to_value(event).unwrap();
        self.calls.lock().unwrap().push(ForwardedCall {
            body,
            target_url: target_url.to_owned(),
            correlation_id: correlation_id.clone(),
        });
        self.outcome
    }
}

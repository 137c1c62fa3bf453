//! HTTP implementation of the `Forwarder` trait.
//!
//! Every attempt is an independent POST on a fresh connection. A 2xx answer
//! ends the loop at once; any other status and any transport failure are
//! treated alike: logged, followed by the scheduled pause, then retried.

use async_trait::async_trait;
use relay_core::correlation::{CorrelationId, REQUEST_ID_HEADER};
use relay_core::event::RelayEventView;
use relay_core::relay::{Forwarder, RelayOutcome};
use tracing::{Instrument, info, info_span, warn};

use crate::error::RelayError;
use crate::schedule::RetrySchedule;

/// Forwards events over HTTP with a fixed retry schedule.
#[derive(Debug, Clone)]
pub struct HttpRelayForwarder {
    client: reqwest::Client,
    schedule: RetrySchedule,
}

impl HttpRelayForwarder {
    /// Creates a forwarder using `schedule`.
    ///
    /// # Errors
    ///
    /// Returns `RelayError::ClientBuild` if the HTTP client cannot be
    /// configured.
    pub fn new(schedule: RetrySchedule) -> Result<Self, RelayError> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(0)
            // A 3xx is the target's answer to this POST, not a hop to follow.
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(concat!("webhook-relay/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(RelayError::ClientBuild)?;

        Ok(Self { client, schedule })
    }

    /// Creates a forwarder with the default 3-attempt schedule.
    ///
    /// # Errors
    ///
    /// Returns `RelayError::ClientBuild` if the HTTP client cannot be
    /// configured.
    pub fn with_defaults() -> Result<Self, RelayError> {
        Self::new(RetrySchedule::default())
    }

    /// The schedule this forwarder follows.
    #[must_use]
    pub fn schedule(&self) -> &RetrySchedule {
        &self.schedule
    }

    /// Makes a single POST and classifies the answer.
    async fn send_once(
        &self,
        event: &RelayEventView<'_>,
        target_url: &str,
        correlation_id: &CorrelationId,
    ) -> Result<u16, RelayError> {
        let response = self
            .client
            .post(target_url)
            .timeout(self.schedule.attempt_timeout())
            .header(REQUEST_ID_HEADER, correlation_id.as_str())
            .json(event)
            .send()
            .await
            .map_err(RelayError::Transport)?;

        let status = response.status();
        if status.is_success() {
            Ok(status.as_u16())
        } else {
            Err(RelayError::NonSuccessStatus(status.as_u16()))
        }
    }
}

#[async_trait]
impl Forwarder for HttpRelayForwarder {
    async fn attempt(
        &self,
        event: &RelayEventView<'_>,
        target_url: &str,
        correlation_id: &CorrelationId,
    ) -> RelayOutcome {
        let span = info_span!(
            "relay",
            request_id = %correlation_id,
            event_id = %event.event_id,
            target = %target_url,
        );

        async move {
            let mut last_status = None;

            for (index, delay) in self.schedule.delays().iter().enumerate() {
                let attempt = index + 1;

                match self.send_once(event, target_url, correlation_id).await {
                    Ok(status_code) => {
                        info!(status_code, attempt, "relay attempt succeeded");
                        return RelayOutcome::delivered(status_code);
                    }
                    Err(err @ RelayError::NonSuccessStatus(_)) => {
                        last_status = err.status_code();
                        warn!(
                            status_code = last_status,
                            attempt, "relay attempt returned non-success status"
                        );
                    }
                    Err(err) => {
                        warn!(attempt, error = %err, "relay attempt failed");
                    }
                }

                tokio::time::sleep(*delay).await;
            }

            warn!(
                attempts = self.schedule.max_attempts(),
                status_code = last_status,
                "relay exhausted"
            );
            RelayOutcome::exhausted(last_status)
        }
        .instrument(span)
        .await
    }
}

//! End-to-end handling of one inbound webhook.
//!
//! The coordinator assigns identity and receipt time, appends the event, and
//! then (only when a target is configured) awaits the forwarder before
//! answering. Persistence failure aborts the request; relay failure never
//! does.

use std::sync::Arc;

use relay_core::clock::{Clock, receipt_time};
use relay_core::error::DomainError;
use relay_core::event::{Event, RelayEventView, with_correlation};
use relay_core::relay::Forwarder;
use relay_core::store::EventStore;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::commands::IngestWebhook;
use crate::domain::receipts::IngestionReceipt;

/// Longest accepted source name.
pub const MAX_SOURCE_LEN: usize = 100;

/// Orchestrates ingestion, persistence and relay for each inbound event.
pub struct EventIngestionCoordinator {
    clock: Arc<dyn Clock>,
    store: Arc<dyn EventStore>,
    forwarder: Arc<dyn Forwarder>,
    target_url: Option<String>,
}

impl std::fmt::Debug for EventIngestionCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventIngestionCoordinator")
            .field("target_url", &self.target_url)
            .finish_non_exhaustive()
    }
}

impl EventIngestionCoordinator {
    /// Creates a coordinator. A `None` or blank `target_url` disables relay.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        store: Arc<dyn EventStore>,
        forwarder: Arc<dyn Forwarder>,
        target_url: Option<String>,
    ) -> Self {
        let target_url = target_url
            .map(|url| url.trim().to_owned())
            .filter(|url| !url.is_empty());
        Self {
            clock,
            store,
            forwarder,
            target_url,
        }
    }

    /// The configured downstream target, if relay is enabled.
    #[must_use]
    pub fn target_url(&self) -> Option<&str> {
        self.target_url.as_deref()
    }

    /// Records `command` as a new event and relays it if a target is set.
    ///
    /// The response is not produced until the append and, when enabled, the
    /// whole retry budget of the forwarder have completed.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the source name is empty or too
    /// long, `DomainError::Persistence` if the event cannot be stored, and
    /// `DomainError::Unexpected` if the store fails in any other way. No relay
    /// is attempted in any of these cases.
    pub async fn handle_incoming(
        &self,
        command: IngestWebhook,
    ) -> Result<IngestionReceipt, DomainError> {
        validate_source(&command.source)?;

        let correlation_id = command.correlation_id;
        let event = Event {
            id: Uuid::new_v4(),
            source: command.source,
            received_at: receipt_time(self.clock.as_ref()),
            payload: command.payload,
            headers: with_correlation(command.headers, &correlation_id),
            request_id: correlation_id.as_str().to_owned(),
        };

        self.store.append(&event).await.map_err(|err| match err {
            DomainError::Persistence(_) => err,
            other => DomainError::Unexpected(format!("event store contract violated: {other}")),
        })?;

        info!(
            request_id = %correlation_id,
            source = %event.source,
            event_id = %event.id,
            "event received"
        );

        let relay_outcome = match &self.target_url {
            Some(target_url) => Some(
                self.forwarder
                    .attempt(&RelayEventView::from(&event), target_url, &correlation_id)
                    .await,
            ),
            None => {
                debug!(request_id = %correlation_id, "relay disabled, skipping forward");
                None
            }
        };

        Ok(IngestionReceipt {
            event_id: event.id,
            received_at: event.received_at,
            relay_outcome,
        })
    }
}

fn validate_source(source: &str) -> Result<(), DomainError> {
    if source.trim().is_empty() {
        return Err(DomainError::Validation("source must not be empty".into()));
    }
    if source.chars().count() > MAX_SOURCE_LEN {
        return Err(DomainError::Validation(format!(
            "source must be at most {MAX_SOURCE_LEN} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{Duration, TimeZone, Utc};
    use relay_core::correlation::CorrelationId;
    use relay_core::event::{CapturedHeaders, Payload, capture_headers};
    use relay_core::relay::RelayOutcome;
    use relay_core::store::EventLimit;
    use relay_test_support::{
        CountingForwarder, FailingEventStore, FixedClock, InMemoryEventStore, SteppingClock,
    };

    use super::*;

    const TARGET: &str = "https://downstream.example.com/hook";

    fn payload() -> Payload {
        serde_json::json!({"a": 1, "b": {"c": true}})
            .as_object()
            .unwrap()
            .clone()
    }

    fn command(correlation_id: &str) -> IngestWebhook {
        IngestWebhook {
            correlation_id: CorrelationId::new(correlation_id),
            source: "source1".to_owned(),
            payload: payload(),
            headers: capture_headers([
                ("user-agent", "pytest/1.0"),
                ("content-type", "application/json"),
            ]),
        }
    }

    fn coordinator(
        store: Arc<dyn EventStore>,
        forwarder: Arc<dyn Forwarder>,
        target_url: Option<&str>,
    ) -> EventIngestionCoordinator {
        let fixed_now = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        EventIngestionCoordinator::new(
            Arc::new(FixedClock(fixed_now)),
            store,
            forwarder,
            target_url.map(str::to_owned),
        )
    }

    #[tokio::test]
    async fn test_handle_incoming_persists_event_with_inputs() {
        // Arrange
        let store = Arc::new(InMemoryEventStore::new());
        let forwarder = Arc::new(CountingForwarder::succeeding());
        let coordinator = coordinator(store.clone(), forwarder, None);

        // Act
        let receipt = coordinator.handle_incoming(command("rid-1")).await.unwrap();

        // Assert
        let appended = store.appended_events();
        assert_eq!(appended.len(), 1);
        let event = &appended[0];
        assert_eq!(event.id, receipt.event_id);
        assert_eq!(event.source, "source1");
        assert_eq!(event.payload, payload());
        assert_eq!(event.request_id, "rid-1");
        assert_eq!(
            event.received_at,
            Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
        );
        assert_eq!(event.received_at, receipt.received_at);
        assert_eq!(event.headers["user-agent"], "pytest/1.0");
        assert_eq!(event.headers["content-type"], "application/json");
        assert_eq!(event.headers["x-request-id"], "rid-1");
    }

    #[tokio::test]
    async fn test_handle_incoming_without_target_never_relays() {
        // Arrange
        let store = Arc::new(InMemoryEventStore::new());
        let forwarder = Arc::new(CountingForwarder::succeeding());
        let coordinator = coordinator(store, forwarder.clone(), None);

        // Act
        let receipt = coordinator.handle_incoming(command("rid-1")).await.unwrap();

        // Assert
        assert!(receipt.relay_outcome.is_none());
        assert_eq!(forwarder.call_count(), 0);
    }

    #[tokio::test]
    async fn test_blank_target_disables_relay() {
        let forwarder = Arc::new(CountingForwarder::succeeding());
        let coordinator = coordinator(
            Arc::new(InMemoryEventStore::new()),
            forwarder.clone(),
            Some("   "),
        );

        let receipt = coordinator.handle_incoming(command("rid-1")).await.unwrap();

        assert!(coordinator.target_url().is_none());
        assert!(receipt.relay_outcome.is_none());
        assert_eq!(forwarder.call_count(), 0);
    }

    #[tokio::test]
    async fn test_handle_incoming_with_target_relays_event_view() {
        // Arrange
        let store = Arc::new(InMemoryEventStore::new());
        let forwarder = Arc::new(CountingForwarder::succeeding());
        let coordinator = coordinator(store, forwarder.clone(), Some(TARGET));

        // Act
        let receipt = coordinator.handle_incoming(command("rid-7")).await.unwrap();

        // Assert
        assert_eq!(receipt.relay_outcome, Some(RelayOutcome::delivered(200)));
        let calls = forwarder.calls();
        assert_eq!(calls.len(), 1);
        let call = &calls[0];
        assert_eq!(call.target_url, TARGET);
        assert_eq!(call.correlation_id, CorrelationId::new("rid-7"));
        assert_eq!(call.body["event_id"], receipt.event_id.to_string());
        assert_eq!(call.body["source"], "source1");
        assert_eq!(call.body["payload"]["a"], 1);
        assert_eq!(call.body["headers"]["x-request-id"], "rid-7");
    }

    #[tokio::test]
    async fn test_exhausted_relay_is_reported_not_raised() {
        let store = Arc::new(InMemoryEventStore::new());
        let forwarder = Arc::new(CountingForwarder::returning(RelayOutcome::exhausted(Some(
            500,
        ))));
        let coordinator = coordinator(store.clone(), forwarder, Some(TARGET));

        let receipt = coordinator.handle_incoming(command("rid-1")).await.unwrap();

        assert_eq!(
            receipt.relay_outcome,
            Some(RelayOutcome {
                attempted: true,
                success: false,
                status_code: Some(500),
            })
        );
        assert_eq!(store.appended_events().len(), 1);
    }

    #[tokio::test]
    async fn test_persistence_failure_is_fatal_and_skips_relay() {
        // Arrange
        let forwarder = Arc::new(CountingForwarder::succeeding());
        let coordinator = coordinator(Arc::new(FailingEventStore), forwarder.clone(), Some(TARGET));

        // Act
        let result = coordinator.handle_incoming(command("rid-1")).await;

        // Assert
        assert!(matches!(result, Err(DomainError::Persistence(_))));
        assert_eq!(forwarder.call_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_source_is_rejected_before_append() {
        let store = Arc::new(InMemoryEventStore::new());
        let coordinator = coordinator(
            store.clone(),
            Arc::new(CountingForwarder::succeeding()),
            None,
        );
        let mut cmd = command("rid-1");
        cmd.source = " ".to_owned();

        let result = coordinator.handle_incoming(cmd).await;

        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert!(store.appended_events().is_empty());
    }

    #[tokio::test]
    async fn test_overlong_source_is_rejected() {
        let coordinator = coordinator(
            Arc::new(InMemoryEventStore::new()),
            Arc::new(CountingForwarder::succeeding()),
            None,
        );
        let mut cmd = command("rid-1");
        cmd.source = "s".repeat(MAX_SOURCE_LEN + 1);

        let result = coordinator.handle_incoming(cmd).await;

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn test_each_ingestion_gets_a_unique_id() {
        let store = Arc::new(InMemoryEventStore::new());
        let coordinator = coordinator(
            store.clone(),
            Arc::new(CountingForwarder::succeeding()),
            None,
        );

        let first = coordinator.handle_incoming(command("rid-1")).await.unwrap();
        let second = coordinator.handle_incoming(command("rid-1")).await.unwrap();

        assert_ne!(first.event_id, second.event_id);
        assert_eq!(store.appended_events().len(), 2);
    }

    #[tokio::test]
    async fn test_received_at_falls_within_call_window() {
        let store = Arc::new(InMemoryEventStore::new());
        let coordinator = EventIngestionCoordinator::new(
            Arc::new(relay_core::clock::SystemClock),
            store,
            Arc::new(CountingForwarder::succeeding()),
            None,
        );

        let before = Utc::now() - Duration::milliseconds(1);
        let receipt = coordinator.handle_incoming(command("rid-1")).await.unwrap();
        let after = Utc::now();

        assert!(receipt.received_at >= before);
        assert!(receipt.received_at <= after);
    }

    #[tokio::test]
    async fn test_later_ingestion_lists_first() {
        let store = Arc::new(InMemoryEventStore::new());
        let start = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        let coordinator = EventIngestionCoordinator::new(
            Arc::new(SteppingClock::new(start, Duration::seconds(1))),
            store.clone(),
            Arc::new(CountingForwarder::succeeding()),
            None,
        );

        let a = coordinator.handle_incoming(command("rid-a")).await.unwrap();
        let b = coordinator.handle_incoming(command("rid-b")).await.unwrap();

        let listed = store.list_recent(EventLimit::clamped(Some(2))).await.unwrap();
        assert_eq!(listed[0].id, b.event_id);
        assert_eq!(listed[1].id, a.event_id);
    }

    /// Forwarder that checks the event is already stored when relay starts.
    struct StoreObservingForwarder {
        store: Arc<InMemoryEventStore>,
        seen_in_store: Mutex<Vec<bool>>,
    }

    #[async_trait]
    impl Forwarder for StoreObservingForwarder {
        async fn attempt(
            &self,
            event: &RelayEventView<'_>,
            _target_url: &str,
            _correlation_id: &CorrelationId,
        ) -> RelayOutcome {
            let stored = self.store.get(event.event_id).await.unwrap().is_some();
            self.seen_in_store.lock().unwrap().push(stored);
            RelayOutcome::delivered(204)
        }
    }

    #[tokio::test]
    async fn test_append_completes_before_relay_starts() {
        // Arrange
        let store = Arc::new(InMemoryEventStore::new());
        let forwarder = Arc::new(StoreObservingForwarder {
            store: store.clone(),
            seen_in_store: Mutex::new(Vec::new()),
        });
        let coordinator = coordinator(store, forwarder.clone(), Some(TARGET));

        // Act
        coordinator.handle_incoming(command("rid-1")).await.unwrap();

        // Assert
        assert_eq!(*forwarder.seen_in_store.lock().unwrap(), vec![true]);
    }

    #[tokio::test]
    async fn test_headers_outside_allow_list_are_never_stored() {
        let store = Arc::new(InMemoryEventStore::new());
        let coordinator = coordinator(
            store.clone(),
            Arc::new(CountingForwarder::succeeding()),
            None,
        );
        let mut cmd = command("rid-1");
        cmd.headers = capture_headers([("authorization", "Bearer x"), ("cookie", "a=b")]);

        coordinator.handle_incoming(cmd).await.unwrap();

        let mut expected = CapturedHeaders::new();
        expected.insert("x-request-id".to_owned(), "rid-1".to_owned());
        assert_eq!(store.appended_events()[0].headers, expected);
    }
}

//! Shared application state.

use std::sync::Arc;

use relay_core::clock::Clock;
use relay_core::relay::Forwarder;
use relay_core::store::EventStore;
use relay_ingestion::application::coordinator::EventIngestionCoordinator;

use crate::metrics::HttpMetrics;

/// Application state shared across all request handlers.
///
/// Everything here is fixed at startup; handlers only read it.
#[derive(Clone)]
pub struct AppState {
    /// Ingestion pipeline for inbound webhooks.
    pub coordinator: Arc<EventIngestionCoordinator>,
    /// Store queried by the read endpoints.
    pub event_store: Arc<dyn EventStore>,
    /// Request counters and latency histograms.
    pub metrics: Arc<HttpMetrics>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        event_store: Arc<dyn EventStore>,
        forwarder: Arc<dyn Forwarder>,
        target_url: Option<String>,
        metrics: Arc<HttpMetrics>,
    ) -> Self {
        let coordinator = Arc::new(EventIngestionCoordinator::new(
            clock,
            Arc::clone(&event_store),
            forwarder,
            target_url,
        ));
        Self {
            coordinator,
            event_store,
            metrics,
        }
    }
}

//! Mock `EventStore` implementations for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use relay_core::error::DomainError;
use relay_core::event::Event;
use relay_core::store::{EventLimit, EventStore};
use uuid::Uuid;

/// An event store that keeps events in memory, in append order.
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    events: Mutex<Vec<Event>>,
}

impl InMemoryEventStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all appended events, oldest first.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn appended_events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn append(&self, event: &Event) -> Result<(), DomainError> {
        let mut events = self.events.lock().unwrap();
        if events.iter().any(|existing| existing.id == event.id) {
            return Err(DomainError::Persistence(format!(
                "duplicate event id {}",
                event.id
            )));
        }
        events.push(event.clone());
        Ok(())
    }

    async fn get(&self, event_id: Uuid) -> Result<Option<Event>, DomainError> {
        Ok(self
            .events
            .lock()
            .unwrap()
            .iter()
            .find(|event| event.id == event_id)
            .cloned())
    }

    async fn list_recent(&self, limit: EventLimit) -> Result<Vec<Event>, DomainError> {
        let mut events = self.events.lock().unwrap().clone();
        // Newest append first, then a stable sort keeps that order among ties.
        events.reverse();
        events.sort_by(|a, b| b.received_at.cmp(&a.received_at));
        events.truncate(limit.get() as usize);
        Ok(events)
    }

    async fn ping(&self) -> Result<(), DomainError> {
        Ok(())
    }
}

/// An event store that always returns a persistence error. Useful for testing
/// error-handling paths.
#[derive(Debug)]
pub struct FailingEventStore;

#[async_trait]
impl EventStore for FailingEventStore {
    async fn append(&self, _event: &Event) -> Result<(), DomainError> {
        Err(DomainError::Persistence("connection refused".into()))
    }

    async fn get(&self, _event_id: Uuid) -> Result<Option<Event>, DomainError> {
        Err(DomainError::Persistence("connection refused".into()))
    }

    async fn list_recent(&self, _limit: EventLimit) -> Result<Vec<Event>, DomainError> {
        Err(DomainError::Persistence("connection refused".into()))
    }

    async fn ping(&self) -> Result<(), DomainError> {
        Err(DomainError::Persistence("connection refused".into()))
    }
}

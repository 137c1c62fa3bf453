//! Query handlers for stored events.
//!
//! These read straight from the event store and return the stored entity;
//! nothing is derived or cached.

use relay_core::error::DomainError;
use relay_core::event::Event;
use relay_core::store::{EventLimit, EventStore};
use serde::Serialize;
use uuid::Uuid;

/// A page of events, most recently received first.
#[derive(Debug, Serialize)]
pub struct EventListView {
    /// The events on this page.
    pub events: Vec<Event>,
}

/// Retrieves a stored event by its identifier.
///
/// An identifier that is not a UUID cannot name a stored event and is
/// reported as not found.
///
/// # Errors
///
/// Returns `DomainError::EventNotFound` if no event has that id.
/// Returns `DomainError::Persistence` if the store cannot be read.
pub async fn get_event_by_id(event_id: &str, store: &dyn EventStore) -> Result<Event, DomainError> {
    let not_found = || DomainError::EventNotFound(event_id.to_owned());
    let id = Uuid::parse_str(event_id).map_err(|_| not_found())?;
    store.get(id).await?.ok_or_else(not_found)
}

/// Lists the most recently received events.
///
/// # Errors
///
/// Returns `DomainError::Persistence` if the store cannot be read.
pub async fn list_recent_events(
    limit: EventLimit,
    store: &dyn EventStore,
) -> Result<EventListView, DomainError> {
    let events = store.list_recent(limit).await?;
    Ok(EventListView { events })
}

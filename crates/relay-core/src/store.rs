//! Event store abstraction.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::DomainError;
use crate::event::Event;

/// A page size for recency listings, already clamped to `[MIN, MAX]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventLimit(u32);

impl EventLimit {
    /// Smallest page size.
    pub const MIN: u32 = 1;
    /// Largest page size.
    pub const MAX: u32 = 100;
    /// Page size used when the caller does not ask for one.
    pub const DEFAULT: u32 = 50;

    /// Clamps a caller-supplied limit; `None` selects the default.
    #[must_use]
    pub fn clamped(requested: Option<i64>) -> Self {
        let requested = requested.unwrap_or(i64::from(Self::DEFAULT));
        let clamped = requested.clamp(i64::from(Self::MIN), i64::from(Self::MAX));
        // The clamp above bounds the value to 1..=100.
        Self(u32::try_from(clamped).unwrap_or(Self::DEFAULT))
    }

    /// Returns the limit as a `u32`.
    #[must_use]
    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for EventLimit {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

/// Durable, append-only record of received events.
///
/// Implementations must be safe for concurrent use; no ordering is promised
/// across concurrent appends beyond each event's own `received_at`.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Durably writes a new event. Never overwrites an existing id.
    async fn append(&self, event: &Event) -> Result<(), DomainError>;

    /// Loads a single event, or `None` if no event has that id.
    async fn get(&self, event_id: Uuid) -> Result<Option<Event>, DomainError>;

    /// Returns up to `limit` events, most recently received first.
    async fn list_recent(&self, limit: EventLimit) -> Result<Vec<Event>, DomainError>;

    /// Checks that the underlying medium is reachable.
    async fn ping(&self) -> Result<(), DomainError>;
}

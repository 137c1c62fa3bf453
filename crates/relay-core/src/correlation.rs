//! Request-scoped correlation identity.
//!
//! A `CorrelationId` is resolved once per inbound request and then passed by
//! reference through ingestion, relay, and logging. It is never stored in a
//! shared slot.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Header that carries the correlation id in and out of the service.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Identifier tying together every effect of one logical request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Wraps an existing identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Generates a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Reuses the inbound header value when it is present and non-blank,
    /// otherwise generates one.
    #[must_use]
    pub fn resolve(inbound: Option<&str>) -> Self {
        match inbound.map(str::trim) {
            Some(value) if !value.is_empty() => Self::new(value),
            _ => Self::generate(),
        }
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

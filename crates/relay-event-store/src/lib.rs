//! sqlx-backed event stores.
//!
//! PostgreSQL is the production backend; SQLite serves single-node
//! deployments and hermetic tests. The backend is picked from the scheme of
//! the storage connection string.

pub mod pg_event_store;
pub mod sqlite_event_store;

use std::sync::Arc;

use relay_core::error::DomainError;
use relay_core::store::EventStore;

use crate::pg_event_store::PgEventStore;
use crate::sqlite_event_store::SqliteEventStore;

/// Storage engines the relay can persist events to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// `postgres://` or `postgresql://`.
    Postgres,
    /// `sqlite:`.
    Sqlite,
}

impl StoreBackend {
    /// Determines the backend from a connection string, if supported.
    #[must_use]
    pub fn from_url(database_url: &str) -> Option<Self> {
        if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
            Some(Self::Postgres)
        } else if database_url.starts_with("sqlite:") {
            Some(Self::Sqlite)
        } else {
            None
        }
    }
}

/// Connects to the store named by `database_url` and applies migrations.
///
/// # Errors
///
/// Returns `sqlx::Error::Configuration` for an unsupported scheme, or any
/// connection or migration error from the backend.
pub async fn connect(database_url: &str) -> Result<Arc<dyn EventStore>, sqlx::Error> {
    match StoreBackend::from_url(database_url) {
        Some(StoreBackend::Postgres) => Ok(Arc::new(PgEventStore::connect(database_url).await?)),
        Some(StoreBackend::Sqlite) => Ok(Arc::new(SqliteEventStore::connect(database_url).await?)),
        None => Err(sqlx::Error::Configuration(
            "DATABASE_URL must use a postgres:// or sqlite: scheme".into(),
        )),
    }
}

pub(crate) fn persistence(err: sqlx::Error) -> DomainError {
    DomainError::Persistence(err.to_string())
}

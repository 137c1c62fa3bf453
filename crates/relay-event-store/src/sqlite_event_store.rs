//! `SQLite` implementation of the `EventStore` trait.

use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::DateTime;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::types::Json;
use tracing::debug;
use uuid::Uuid;

use relay_core::error::DomainError;
use relay_core::event::{CapturedHeaders, Event, Payload};
use relay_core::store::{EventLimit, EventStore};

use crate::persistence;

/// SQLite-backed event store.
///
/// Receipt times are stored as microseconds since the Unix epoch so that
/// ordering is numeric rather than lexical.
#[derive(Debug, Clone)]
pub struct SqliteEventStore {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct EventRow {
    id: String,
    source: String,
    received_at: i64,
    payload: Json<Payload>,
    headers: Json<CapturedHeaders>,
    request_id: String,
}

impl TryFrom<EventRow> for Event {
    type Error = DomainError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&row.id).map_err(|e| {
            DomainError::Persistence(format!("stored event id {:?} is not a UUID: {e}", row.id))
        })?;
        let received_at = DateTime::from_timestamp_micros(row.received_at).ok_or_else(|| {
            DomainError::Persistence(format!(
                "stored receipt time {} is out of range",
                row.received_at
            ))
        })?;
        Ok(Self {
            id,
            source: row.source,
            received_at,
            payload: row.payload.0,
            headers: row.headers.0,
            request_id: row.request_id,
        })
    }
}

impl SqliteEventStore {
    /// Creates a new `SqliteEventStore` over an existing pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens (creating if missing) the database at `database_url` and runs
    /// pending migrations.
    ///
    /// An in-memory database lives only as long as its connection, so it is
    /// served by a single connection that is never recycled.
    ///
    /// # Errors
    ///
    /// Returns a `sqlx::Error` if the URL is malformed, the file cannot be
    /// created, or a migration fails.
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        let pool = match database_file(database_url) {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)?;
                }
                SqlitePoolOptions::new()
                    .max_connections(5)
                    .connect_with(options)
                    .await?
            }
            None => {
                SqlitePoolOptions::new()
                    .max_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None)
                    .connect_with(options)
                    .await?
            }
        };

        Self::migrate(&pool).await?;
        Ok(Self::new(pool))
    }

    /// Runs the embedded `SQLite` migrations against `pool`.
    ///
    /// # Errors
    ///
    /// Returns a `sqlx::Error` if a migration fails.
    pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::Error> {
        sqlx::migrate!("../../migrations/sqlite").run(pool).await?;
        Ok(())
    }
}

/// Extracts the on-disk path from a `sqlite:` URL; `None` for in-memory
/// databases.
fn database_file(database_url: &str) -> Option<&Path> {
    let rest = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() || path == ":memory:" || database_url.contains("mode=memory") {
        None
    } else {
        Some(Path::new(path))
    }
}

#[async_trait]
impl EventStore for SqliteEventStore {
    async fn append(&self, event: &Event) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO events (id, source, received_at, payload, headers, request_id) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(event.id.to_string())
        .bind(&event.source)
        .bind(event.received_at.timestamp_micros())
        .bind(Json(&event.payload))
        .bind(Json(&event.headers))
        .bind(&event.request_id)
        .execute(&self.pool)
        .await
        .map_err(persistence)?;

        debug!(event_id = %event.id, "event appended");
        Ok(())
    }

    async fn get(&self, event_id: Uuid) -> Result<Option<Event>, DomainError> {
        let row = sqlx::query_as::<_, EventRow>(
            "SELECT id, source, received_at, payload, headers, request_id \
             FROM events WHERE id = ?",
        )
        .bind(event_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(persistence)?;

        row.map(Event::try_from).transpose()
    }

    async fn list_recent(&self, limit: EventLimit) -> Result<Vec<Event>, DomainError> {
        let rows = sqlx::query_as::<_, EventRow>(
            "SELECT id, source, received_at, payload, headers, request_id \
             FROM events ORDER BY received_at DESC, rowid DESC LIMIT ?",
        )
        .bind(i64::from(limit.get()))
        .fetch_all(&self.pool)
        .await
        .map_err(persistence)?;

        rows.into_iter().map(Event::try_from).collect()
    }

    async fn ping(&self) -> Result<(), DomainError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(persistence)?;
        Ok(())
    }
}

//! `PostgreSQL` implementation of the `EventStore` trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use tracing::debug;
use uuid::Uuid;

use relay_core::error::DomainError;
use relay_core::event::{CapturedHeaders, Event, Payload};
use relay_core::store::{EventLimit, EventStore};

use crate::persistence;

/// PostgreSQL-backed event store.
#[derive(Debug, Clone)]
pub struct PgEventStore {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct EventRow {
    id: Uuid,
    source: String,
    received_at: DateTime<Utc>,
    payload: Json<Payload>,
    headers: Json<CapturedHeaders>,
    request_id: String,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Self {
            id: row.id,
            source: row.source,
            received_at: row.received_at,
            payload: row.payload.0,
            headers: row.headers.0,
            request_id: row.request_id,
        }
    }
}

impl PgEventStore {
    /// Creates a new `PgEventStore` over an existing pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool for `database_url` and runs pending migrations.
    ///
    /// # Errors
    ///
    /// Returns a `sqlx::Error` if the database is unreachable or a migration
    /// fails.
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        sqlx::migrate!("../../migrations/postgres").run(&pool).await?;
        Ok(Self::new(pool))
    }
}

fn encode_error(err: serde_json::Error) -> DomainError {
    DomainError::Persistence(format!("failed to encode json column: {err}"))
}

#[async_trait]
impl EventStore for PgEventStore {
    async fn append(&self, event: &Event) -> Result<(), DomainError> {
        // Bound as text so the server parses it as json, never jsonb.
        let payload = serde_json::to_string(&event.payload).map_err(encode_error)?;
        let headers = serde_json::to_string(&event.headers).map_err(encode_error)?;

        sqlx::query(
            "INSERT INTO events (id, source, received_at, payload, headers, request_id) \
             VALUES ($1, $2, $3, $4::json, $5::json, $6)",
        )
        .bind(event.id)
        .bind(&event.source)
        .bind(event.received_at)
        .bind(payload)
        .bind(headers)
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
             FROM events WHERE id = $1",
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(persistence)?;

        Ok(row.map(Event::from))
    }

    async fn list_recent(&self, limit: EventLimit) -> Result<Vec<Event>, DomainError> {
        let rows = sqlx::query_as::<_, EventRow>(
            "SELECT id, source, received_at, payload, headers, request_id \
             FROM events ORDER BY received_at DESC, position DESC LIMIT $1",
        )
        .bind(i64::from(limit.get()))
        .fetch_all(&self.pool)
        .await
        .map_err(persistence)?;

        Ok(rows.into_iter().map(Event::from).collect())
    }

    async fn ping(&self) -> Result<(), DomainError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(persistence)?;
        Ok(())
    }
}

//! `PostgreSQL` implementation of the `EventStoreRepository` trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use catalog_core::error::DomainError;
use catalog_core::event::DomainEvent;
use catalog_core::repository::EventStoreRepository;

/// Row shape of the `domain_events` table.
#[derive(Debug, sqlx::FromRow)]
struct EventRow {
    event_id: Uuid,
    aggregate_id: Uuid,
    aggregate_type: String,
    event_type: String,
    event_body: Value,
    occurred_on: DateTime<Utc>,
    published_at: Option<DateTime<Utc>>,
}

impl From<EventRow> for DomainEvent {
    fn from(row: EventRow) -> Self {
        DomainEvent::reconstruct(
            row.event_id,
            row.aggregate_id,
            row.aggregate_type,
            row.event_type,
            row.event_body,
            row.occurred_on,
            row.published_at,
        )
    }
}

/// PostgreSQL-backed event store.
///
/// Timestamp ties are broken by `recorded_seq`, a serial column assigned at
/// insert time, so replay and outbox order match insertion order.
#[derive(Debug, Clone)]
pub struct PgEventStore {
    pool: PgPool,
}

impl PgEventStore {
    /// Creates a new `PgEventStore`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventStoreRepository for PgEventStore {
    #[tracing::instrument(skip(self), fields(aggregate_id = %aggregate_id))]
    async fn load_history(
        &self,
        aggregate_id: Uuid,
        aggregate_type: &str,
    ) -> Result<Vec<DomainEvent>, DomainError> {
        let rows: Vec<EventRow> = sqlx::query_as(
            r"
            SELECT event_id, aggregate_id, aggregate_type, event_type, event_body,
                   occurred_on, published_at
            FROM domain_events
            WHERE aggregate_id = $1 AND aggregate_type = $2
            ORDER BY occurred_on ASC, recorded_seq ASC
            ",
        )
        .bind(aggregate_id)
        .bind(aggregate_type)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::Infrastructure(e.to_string()))?;

        Ok(rows.into_iter().map(DomainEvent::from).collect())
    }

    #[tracing::instrument(skip(self, events), fields(events_len = events.len()))]
    async fn append_events(&self, events: &[DomainEvent]) -> Result<(), DomainError> {
        if events.is_empty() {
            return Ok(());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::Infrastructure(e.to_string()))?;

        for event in events {
            sqlx::query(
                r"
                INSERT INTO domain_events
                    (event_id, aggregate_id, aggregate_type, event_type, event_body,
                     occurred_on, published_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ",
            )
            .bind(event.event_id())
            .bind(event.aggregate_id())
            .bind(event.aggregate_type())
            .bind(event.event_type())
            .bind(event.event_body().clone())
            .bind(event.occurred_on())
            .bind(event.published_at())
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::Infrastructure(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| DomainError::Infrastructure(e.to_string()))?;

        Ok(())
    }

    async fn find_pending_events(&self) -> Result<Vec<DomainEvent>, DomainError> {
        let rows: Vec<EventRow> = sqlx::query_as(
            r"
            SELECT event_id, aggregate_id, aggregate_type, event_type, event_body,
                   occurred_on, published_at
            FROM domain_events
            WHERE published_at IS NULL
            ORDER BY occurred_on ASC, recorded_seq ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::Infrastructure(e.to_string()))?;

        Ok(rows.into_iter().map(DomainEvent::from).collect())
    }

    async fn mark_as_published(&self, event: &DomainEvent) -> Result<(), DomainError> {
        sqlx::query(
            r"
            UPDATE domain_events
            SET published_at = COALESCE($2, now())
            WHERE event_id = $1 AND published_at IS NULL
            ",
        )
        .bind(event.event_id())
        .bind(event.published_at())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::Infrastructure(e.to_string()))?;

        Ok(())
    }
}

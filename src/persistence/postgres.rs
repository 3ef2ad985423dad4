//! PostgreSQL implementations of the persistence seams.
//!
//! The `events` table is read-only to this service (maintained by the
//! import/owner pipeline). The `saved_events` table enforces the
//! `(user_id, event_id)` uniqueness with its primary key; the insert
//! uses `ON CONFLICT DO NOTHING` so a duplicate save is a success, and
//! a delete of a missing row is indistinguishable from a delete of a
//! present one.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, QueryBuilder};

use super::models::{EventRow, SavedEventRow};
use super::{EventSource, SavedEventBackend, SourceFilter};
use crate::domain::{Event, EventId, UserId};
use crate::error::DiscoveryError;

const EVENT_COLUMNS: &str = "id, title, description, organization, link, image_url, \
     category, status, event_date, start_time, end_time, address, latitude, longitude";

/// PostgreSQL-backed [`EventSource`] using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresEventSource {
    pool: PgPool,
}

impl PostgresEventSource {
    /// Creates a new source with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventSource for PostgresEventSource {
    async fn fetch_active(&self, filter: &SourceFilter) -> Result<Vec<Event>, DiscoveryError> {
        let mut builder = QueryBuilder::new(format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE status = 'active'"
        ));

        if !filter.categories.is_empty() {
            let identifiers: Vec<String> = filter
                .categories
                .iter()
                .map(|c| c.as_str().to_string())
                .collect();
            builder.push(" AND category = ANY(");
            builder.push_bind(identifiers);
            builder.push(")");
        }
        if let Some(fragment) = &filter.address_fragment {
            builder.push(" AND address ILIKE '%' || ");
            builder.push_bind(fragment.clone());
            builder.push(" || '%'");
        }
        builder.push(" ORDER BY created_at ASC, id ASC");

        let rows: Vec<EventRow> = builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DiscoveryError::PersistenceError(e.to_string()))?;

        // Unusable rows are dropped with a warning, never fatal.
        Ok(rows.into_iter().filter_map(EventRow::into_event).collect())
    }
}

/// PostgreSQL-backed [`SavedEventBackend`] using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresSavedEvents {
    pool: PgPool,
}

impl PostgresSavedEvents {
    /// Creates a new backend with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SavedEventBackend for PostgresSavedEvents {
    async fn insert(
        &self,
        user_id: &UserId,
        event_id: &EventId,
        saved_at: DateTime<Utc>,
    ) -> Result<(), DiscoveryError> {
        sqlx::query(
            "INSERT INTO saved_events (user_id, event_id, saved_at) VALUES ($1, $2, $3) \
             ON CONFLICT (user_id, event_id) DO NOTHING",
        )
        .bind(user_id.as_str())
        .bind(event_id.as_str())
        .bind(saved_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DiscoveryError::PersistenceError(e.to_string()))?;

        Ok(())
    }

    async fn delete(&self, user_id: &UserId, event_id: &EventId) -> Result<(), DiscoveryError> {
        // rows_affected of zero is still success: removing a relationship
        // that does not exist is a no-op.
        sqlx::query("DELETE FROM saved_events WHERE user_id = $1 AND event_id = $2")
            .bind(user_id.as_str())
            .bind(event_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| DiscoveryError::PersistenceError(e.to_string()))?;

        Ok(())
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<SavedEventRow>, DiscoveryError> {
        let rows = sqlx::query_as::<_, (String, String, DateTime<Utc>)>(
            "SELECT user_id, event_id, saved_at FROM saved_events \
             WHERE user_id = $1 ORDER BY saved_at DESC, event_id ASC",
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DiscoveryError::PersistenceError(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|(user_id, event_id, saved_at)| SavedEventRow {
                user_id: UserId::new(user_id),
                event_id: EventId::new(event_id),
                saved_at,
            })
            .collect())
    }
}

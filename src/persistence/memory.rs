//! In-memory persistence for tests and database-less embedders.
//!
//! [`InMemorySavedEvents`] honors the same idempotency contract as the
//! Postgres backend and adds a write-failure switch so the store's
//! optimistic-rollback path can be exercised. [`InMemoryEventSource`]
//! applies the same coarse pre-filter semantics as the SQL query.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::models::SavedEventRow;
use super::{EventSource, SavedEventBackend, SourceFilter};
use crate::domain::{Event, EventId, EventStatus, UserId};
use crate::error::DiscoveryError;

/// In-memory [`SavedEventBackend`].
#[derive(Debug, Default)]
pub struct InMemorySavedEvents {
    rows: RwLock<HashMap<UserId, HashMap<EventId, DateTime<Utc>>>>,
    fail_writes: AtomicBool,
}

impl InMemorySavedEvents {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// When `true`, subsequent inserts and deletes fail with a
    /// persistence error. Reads are unaffected.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of relationships held for the user.
    pub async fn count_for_user(&self, user_id: &UserId) -> usize {
        self.rows
            .read()
            .await
            .get(user_id)
            .map_or(0, HashMap::len)
    }

    fn check_writable(&self) -> Result<(), DiscoveryError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DiscoveryError::PersistenceError(
                "simulated write failure".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl SavedEventBackend for InMemorySavedEvents {
    async fn insert(
        &self,
        user_id: &UserId,
        event_id: &EventId,
        saved_at: DateTime<Utc>,
    ) -> Result<(), DiscoveryError> {
        self.check_writable()?;
        let mut rows = self.rows.write().await;
        rows.entry(user_id.clone())
            .or_default()
            .entry(event_id.clone())
            .or_insert(saved_at);
        Ok(())
    }

    async fn delete(&self, user_id: &UserId, event_id: &EventId) -> Result<(), DiscoveryError> {
        self.check_writable()?;
        let mut rows = self.rows.write().await;
        if let Some(user_rows) = rows.get_mut(user_id) {
            user_rows.remove(event_id);
        }
        Ok(())
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<SavedEventRow>, DiscoveryError> {
        let rows = self.rows.read().await;
        let mut list: Vec<SavedEventRow> = rows
            .get(user_id)
            .map(|user_rows| {
                user_rows
                    .iter()
                    .map(|(event_id, saved_at)| SavedEventRow {
                        user_id: user_id.clone(),
                        event_id: event_id.clone(),
                        saved_at: *saved_at,
                    })
                    .collect()
            })
            .unwrap_or_default();
        list.sort_by(|a, b| b.saved_at.cmp(&a.saved_at).then(a.event_id.cmp(&b.event_id)));
        Ok(list)
    }
}

/// In-memory [`EventSource`] over a fixed collection.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventSource {
    events: Vec<Event>,
}

impl InMemoryEventSource {
    /// Creates a source over the given collection.
    #[must_use]
    pub fn new(events: Vec<Event>) -> Self {
        Self { events }
    }
}

#[async_trait]
impl EventSource for InMemoryEventSource {
    async fn fetch_active(&self, filter: &SourceFilter) -> Result<Vec<Event>, DiscoveryError> {
        let fragment = filter
            .address_fragment
            .as_ref()
            .map(|f| f.to_lowercase());

        Ok(self
            .events
            .iter()
            .filter(|event| event.status == EventStatus::Active)
            .filter(|event| {
                filter.categories.is_empty() || filter.categories.contains(&event.category)
            })
            .filter(|event| match &fragment {
                Some(fragment) => event.address.to_lowercase().contains(fragment),
                None => true,
            })
            .cloned()
            .collect())
    }
}

//! Persistence layer: the event source and the durable saved-event store.
//!
//! Two trait seams: [`EventSource`] feeds the catalog with active events
//! (optionally pre-filtered, coarsely), and [`SavedEventBackend`] holds
//! the durable `(user, event)` relationships. The concrete
//! implementations use `sqlx::PgPool`; [`memory`] provides in-memory
//! stand-ins for tests and embedders without a database.

pub mod memory;
pub mod models;
pub mod postgres;

pub use memory::{InMemoryEventSource, InMemorySavedEvents};
pub use postgres::{PostgresEventSource, PostgresSavedEvents};

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Event, EventCategory, EventId, UserId};
use crate::error::DiscoveryError;
use models::SavedEventRow;

/// Coarse pre-filter for [`EventSource::fetch_active`].
///
/// The source's location filter is address-substring based and therefore
/// never authoritative: the engine's geodesic radius gate re-filters
/// client-side regardless of what the source pre-filtered. An empty
/// filter fetches the full active set.
#[derive(Debug, Clone, Default)]
pub struct SourceFilter {
    /// Restrict to these categories (empty = all).
    pub categories: Vec<EventCategory>,
    /// Case-insensitive substring to match against the address.
    pub address_fragment: Option<String>,
}

impl SourceFilter {
    /// The unfiltered fetch used by catalog refreshes.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }
}

/// Remote source of active events.
#[async_trait]
pub trait EventSource: fmt::Debug + Send + Sync {
    /// Fetches active events matching the coarse pre-filter.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::PersistenceError`] on storage failure.
    async fn fetch_active(&self, filter: &SourceFilter) -> Result<Vec<Event>, DiscoveryError>;
}

/// Durable store of saved-event relationships.
///
/// `(user_id, event_id)` is unique; implementations must treat a
/// duplicate insert and a delete of a missing row as success, never as
/// errors, so the store-level idempotency contract holds end to end.
#[async_trait]
pub trait SavedEventBackend: fmt::Debug + Send + Sync {
    /// Creates the relationship; a duplicate is a no-op success.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::PersistenceError`] on storage failure.
    async fn insert(
        &self,
        user_id: &UserId,
        event_id: &EventId,
        saved_at: DateTime<Utc>,
    ) -> Result<(), DiscoveryError>;

    /// Removes the relationship; a missing row is a no-op success.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::PersistenceError`] on storage failure.
    async fn delete(&self, user_id: &UserId, event_id: &EventId) -> Result<(), DiscoveryError>;

    /// Lists the user's relationships, most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::PersistenceError`] on storage failure.
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<SavedEventRow>, DiscoveryError>;
}

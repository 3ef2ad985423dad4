//! In-memory snapshot of the event collection.
//!
//! [`EventCatalog`] holds the most recently fetched event set behind a
//! [`tokio::sync::RwLock`]. The snapshot preserves source order, which is
//! what the filter pipeline's stable sort uses to break ties between equal
//! dates. Refreshes replace the snapshot wholesale; individual events are
//! never mutated in place (events are read-only input to discovery).

use std::collections::HashMap;

use tokio::sync::RwLock;

use super::Event;
use super::EventId;

/// Central read-mostly store for the current event collection.
///
/// # Concurrency
///
/// - Any number of concurrent readers (discovery evaluations, saved-list
///   dereferencing).
/// - A refresh takes the write lock briefly to swap the snapshot.
#[derive(Debug, Default)]
pub struct EventCatalog {
    inner: RwLock<Snapshot>,
}

/// Events in source order plus an id index for O(1) dereferencing.
#[derive(Debug, Default)]
struct Snapshot {
    events: Vec<Event>,
    index: HashMap<EventId, usize>,
}

impl EventCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the entire snapshot with a freshly fetched collection.
    ///
    /// Duplicate ids keep the first occurrence; later duplicates are
    /// dropped and logged since downstream bookkeeping assumes unique ids.
    pub async fn replace_all(&self, events: Vec<Event>) {
        let mut deduped: Vec<Event> = Vec::with_capacity(events.len());
        let mut index: HashMap<EventId, usize> = HashMap::with_capacity(events.len());
        for event in events {
            if index.contains_key(&event.id) {
                tracing::warn!(event_id = %event.id, "duplicate event id in feed, keeping first");
                continue;
            }
            index.insert(event.id.clone(), deduped.len());
            deduped.push(event);
        }

        let mut inner = self.inner.write().await;
        inner.events = deduped;
        inner.index = index;
    }

    /// Returns a clone of the full snapshot in source order.
    pub async fn all(&self) -> Vec<Event> {
        self.inner.read().await.events.clone()
    }

    /// Looks up a single event by id.
    pub async fn get(&self, id: &EventId) -> Option<Event> {
        let inner = self.inner.read().await;
        inner.index.get(id).and_then(|i| inner.events.get(*i)).cloned()
    }

    /// Dereferences a list of ids to full events, preserving the input
    /// order and silently dropping ids that no longer resolve (the event
    /// was removed or completed since the relationship was created).
    pub async fn resolve_ids(&self, ids: &[EventId]) -> Vec<Event> {
        let inner = self.inner.read().await;
        let mut resolved = Vec::with_capacity(ids.len());
        for id in ids {
            match inner.index.get(id).and_then(|i| inner.events.get(*i)) {
                Some(event) => resolved.push(event.clone()),
                None => {
                    tracing::debug!(event_id = %id, "saved id no longer resolves, dropping");
                }
            }
        }
        resolved
    }

    /// Returns the number of events in the snapshot.
    pub async fn len(&self) -> usize {
        self.inner.read().await.events.len()
    }

    /// Returns `true` when the snapshot is empty.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.events.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{EventCategory, EventStatus};

    fn make_event(id: &str) -> Event {
        Event {
            id: EventId::new(id),
            title: format!("Event {id}"),
            description: String::new(),
            organization: "Org".to_string(),
            link: None,
            image_url: None,
            category: EventCategory::Community,
            status: EventStatus::Active,
            date: None,
            start_time: String::new(),
            end_time: String::new(),
            address: String::new(),
            coordinate: None,
        }
    }

    #[tokio::test]
    async fn replace_preserves_source_order() {
        let catalog = EventCatalog::new();
        catalog
            .replace_all(vec![make_event("c"), make_event("a"), make_event("b")])
            .await;

        let ids: Vec<String> = catalog
            .all()
            .await
            .into_iter()
            .map(|e| e.id.to_string())
            .collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn duplicate_ids_keep_first_occurrence() {
        let catalog = EventCatalog::new();
        let mut second = make_event("a");
        second.title = "Second".to_string();
        catalog.replace_all(vec![make_event("a"), second]).await;

        assert_eq!(catalog.len().await, 1);
        let found = catalog.get(&EventId::new("a")).await;
        let Some(found) = found else {
            panic!("event missing");
        };
        assert_eq!(found.title, "Event a");
    }

    #[tokio::test]
    async fn resolve_ids_drops_unknown() {
        let catalog = EventCatalog::new();
        catalog.replace_all(vec![make_event("a"), make_event("b")]).await;

        let resolved = catalog
            .resolve_ids(&[EventId::new("b"), EventId::new("gone"), EventId::new("a")])
            .await;

        let ids: Vec<String> = resolved.into_iter().map(|e| e.id.to_string()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn get_on_empty_catalog_is_none() {
        let catalog = EventCatalog::new();
        assert!(catalog.is_empty().await);
        assert_eq!(catalog.get(&EventId::new("x")).await, None);
    }
}

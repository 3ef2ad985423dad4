//! The saved-event store: optimistic local view over the durable backend.
//!
//! All reads and writes of "is event E saved for user U" go through one
//! [`SavedEventStore`] instance so list rendering and swipe triage can
//! never drift apart. A mutation applies to the local view immediately,
//! publishes on the change feed, then persists remotely; if persistence
//! fails, the local change is rolled back and the rollback is published
//! too — unless a newer operation on the same `(user, event)` pair has
//! already superseded it (per-pair sequence numbers, last writer wins).

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::{ChangeFeed, Event, EventCatalog, EventId, SavedSetChange, UserId};
use crate::error::DiscoveryError;
use crate::persistence::SavedEventBackend;

/// Single source of truth for per-user saved-event state.
#[derive(Debug)]
pub struct SavedEventStore {
    backend: Arc<dyn SavedEventBackend>,
    catalog: Arc<EventCatalog>,
    feed: ChangeFeed,
    views: RwLock<HashMap<UserId, UserView>>,
}

/// Local optimistic view of one user's saved set.
#[derive(Debug, Default)]
struct UserView {
    /// Saved event ids with their local save timestamps.
    saved: HashMap<EventId, DateTime<Utc>>,
    /// Whether the view has been hydrated from the backend.
    hydrated: bool,
    /// Monotonic operation counter for this user.
    next_seq: u64,
    /// Sequence number of the latest operation per event, used to
    /// suppress stale rollbacks.
    latest_op: HashMap<EventId, u64>,
}

impl UserView {
    fn begin_op(&mut self, event_id: &EventId) -> u64 {
        self.next_seq += 1;
        let seq = self.next_seq;
        self.latest_op.insert(event_id.clone(), seq);
        seq
    }

    fn op_is_current(&self, event_id: &EventId, seq: u64) -> bool {
        self.latest_op.get(event_id) == Some(&seq)
    }
}

impl SavedEventStore {
    /// Creates a store over the given backend, catalog, and feed.
    #[must_use]
    pub fn new(
        backend: Arc<dyn SavedEventBackend>,
        catalog: Arc<EventCatalog>,
        feed: ChangeFeed,
    ) -> Self {
        Self {
            backend,
            catalog,
            feed,
            views: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the change feed this store publishes to.
    #[must_use]
    pub fn feed(&self) -> &ChangeFeed {
        &self.feed
    }

    /// Primes a user's local view with ids from a host-side cache, so
    /// saved indicators render before the first backend round-trip.
    /// Primed entries never overwrite state already present, and the
    /// view still hydrates from the backend on first real access.
    pub async fn prime(&self, user_id: &UserId, event_ids: Vec<EventId>) {
        let now = Utc::now();
        let mut views = self.views.write().await;
        let view = views.entry(user_id.clone()).or_default();
        if view.hydrated {
            return;
        }
        for event_id in event_ids {
            view.saved.entry(event_id).or_insert(now);
        }
    }

    /// Saves an event for a user. Idempotent: saving an already-saved
    /// event is a no-op success.
    ///
    /// # Errors
    ///
    /// [`DiscoveryError::EventNotFound`] when the id does not resolve in
    /// the catalog; [`DiscoveryError::PersistenceError`] when the remote
    /// write failed (the local view has been rolled back unless a newer
    /// operation superseded it).
    pub async fn save(&self, user_id: &UserId, event_id: &EventId) -> Result<(), DiscoveryError> {
        if self.catalog.get(event_id).await.is_none() {
            return Err(DiscoveryError::EventNotFound(event_id.clone()));
        }

        let saved_at = Utc::now();
        let seq = {
            let mut views = self.views.write().await;
            let view = self.hydrated_view(&mut views, user_id).await?;
            if view.saved.contains_key(event_id) {
                tracing::debug!(user_id = %user_id, event_id = %event_id, "already saved");
                return Ok(());
            }
            view.saved.insert(event_id.clone(), saved_at);
            view.begin_op(event_id)
        };

        self.feed.publish(SavedSetChange::Saved {
            user_id: user_id.clone(),
            event_id: event_id.clone(),
            timestamp: saved_at,
        });

        if let Err(error) = self.backend.insert(user_id, event_id, saved_at).await {
            self.roll_back_save(user_id, event_id, seq).await;
            return Err(error);
        }
        Ok(())
    }

    /// Removes an event from a user's saved set. Idempotent: unsaving a
    /// never-saved event is a no-op success.
    ///
    /// # Errors
    ///
    /// [`DiscoveryError::PersistenceError`] when the remote delete
    /// failed (the local view has been rolled back unless a newer
    /// operation superseded it).
    pub async fn unsave(&self, user_id: &UserId, event_id: &EventId) -> Result<(), DiscoveryError> {
        let (seq, prior_saved_at) = {
            let mut views = self.views.write().await;
            let view = self.hydrated_view(&mut views, user_id).await?;
            let Some(prior) = view.saved.remove(event_id) else {
                tracing::debug!(user_id = %user_id, event_id = %event_id, "not saved, nothing to remove");
                return Ok(());
            };
            (view.begin_op(event_id), prior)
        };

        self.feed.publish(SavedSetChange::Unsaved {
            user_id: user_id.clone(),
            event_id: event_id.clone(),
            timestamp: Utc::now(),
        });

        if let Err(error) = self.backend.delete(user_id, event_id).await {
            self.roll_back_unsave(user_id, event_id, seq, prior_saved_at).await;
            return Err(error);
        }
        Ok(())
    }

    /// Whether the event is currently saved for the user, per the local
    /// optimistic view.
    ///
    /// # Errors
    ///
    /// [`DiscoveryError::PersistenceError`] when first-access hydration
    /// from the backend failed.
    pub async fn is_saved(
        &self,
        user_id: &UserId,
        event_id: &EventId,
    ) -> Result<bool, DiscoveryError> {
        let mut views = self.views.write().await;
        let view = self.hydrated_view(&mut views, user_id).await?;
        Ok(view.saved.contains_key(event_id))
    }

    /// The user's saved event ids, most recently saved first.
    ///
    /// # Errors
    ///
    /// [`DiscoveryError::PersistenceError`] when first-access hydration
    /// from the backend failed.
    pub async fn saved_ids(&self, user_id: &UserId) -> Result<Vec<EventId>, DiscoveryError> {
        let mut views = self.views.write().await;
        let view = self.hydrated_view(&mut views, user_id).await?;
        let mut entries: Vec<(&EventId, &DateTime<Utc>)> = view.saved.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
        Ok(entries.into_iter().map(|(id, _)| id.clone()).collect())
    }

    /// The user's saved events as full objects, dereferenced through the
    /// catalog. Ids that no longer resolve to a live event are silently
    /// dropped.
    ///
    /// # Errors
    ///
    /// [`DiscoveryError::PersistenceError`] when first-access hydration
    /// from the backend failed.
    pub async fn list_saved(&self, user_id: &UserId) -> Result<Vec<Event>, DiscoveryError> {
        let ids = self.saved_ids(user_id).await?;
        Ok(self.catalog.resolve_ids(&ids).await)
    }

    /// Returns the user's view, hydrating it from the backend on first
    /// access. Hydration merges under local optimistic state: an id the
    /// local view already tracks keeps its local timestamp.
    async fn hydrated_view<'a>(
        &self,
        views: &'a mut HashMap<UserId, UserView>,
        user_id: &UserId,
    ) -> Result<&'a mut UserView, DiscoveryError> {
        if !views.get(user_id).is_some_and(|v| v.hydrated) {
            let rows = self.backend.list_for_user(user_id).await?;
            let view = views.entry(user_id.clone()).or_default();
            for row in rows {
                view.saved.entry(row.event_id).or_insert(row.saved_at);
            }
            view.hydrated = true;
        }
        // The entry exists after the branch above.
        Ok(views.entry(user_id.clone()).or_default())
    }

    async fn roll_back_save(&self, user_id: &UserId, event_id: &EventId, seq: u64) {
        let mut views = self.views.write().await;
        let Some(view) = views.get_mut(user_id) else {
            return;
        };
        if !view.op_is_current(event_id, seq) {
            tracing::debug!(user_id = %user_id, event_id = %event_id, "save rollback superseded");
            return;
        }
        view.saved.remove(event_id);
        drop(views);

        tracing::warn!(user_id = %user_id, event_id = %event_id, "save failed remotely, rolled back");
        self.feed.publish(SavedSetChange::SaveRolledBack {
            user_id: user_id.clone(),
            event_id: event_id.clone(),
            timestamp: Utc::now(),
        });
    }

    async fn roll_back_unsave(
        &self,
        user_id: &UserId,
        event_id: &EventId,
        seq: u64,
        prior_saved_at: DateTime<Utc>,
    ) {
        let mut views = self.views.write().await;
        let Some(view) = views.get_mut(user_id) else {
            return;
        };
        if !view.op_is_current(event_id, seq) {
            tracing::debug!(user_id = %user_id, event_id = %event_id, "unsave rollback superseded");
            return;
        }
        view.saved.insert(event_id.clone(), prior_saved_at);
        drop(views);

        tracing::warn!(user_id = %user_id, event_id = %event_id, "unsave failed remotely, rolled back");
        self.feed.publish(SavedSetChange::UnsaveRolledBack {
            user_id: user_id.clone(),
            event_id: event_id.clone(),
            timestamp: Utc::now(),
        });
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{Coordinate, EventCategory, EventStatus};
    use crate::persistence::memory::InMemorySavedEvents;
    use crate::persistence::models::SavedEventRow;
    use async_trait::async_trait;
    use tokio::sync::Semaphore;

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
            coordinate: Some(Coordinate::new(0.0, 0.0)),
        }
    }

    async fn make_store(
        event_ids: &[&str],
    ) -> (Arc<SavedEventStore>, Arc<InMemorySavedEvents>) {
        let backend = Arc::new(InMemorySavedEvents::new());
        let catalog = Arc::new(EventCatalog::new());
        catalog
            .replace_all(event_ids.iter().map(|id| make_event(id)).collect())
            .await;
        let store = Arc::new(SavedEventStore::new(
            Arc::clone(&backend) as Arc<dyn SavedEventBackend>,
            catalog,
            ChangeFeed::new(64),
        ));
        (store, backend)
    }

    #[tokio::test]
    async fn double_save_yields_one_relationship() {
        let (store, backend) = make_store(&["e1"]).await;
        let user = UserId::new("u1");
        let event = EventId::new("e1");

        assert!(store.save(&user, &event).await.is_ok());
        assert!(store.save(&user, &event).await.is_ok());

        assert_eq!(backend.count_for_user(&user).await, 1);
        assert_eq!(store.is_saved(&user, &event).await.ok(), Some(true));
    }

    #[tokio::test]
    async fn unsave_of_never_saved_is_noop_success() {
        let (store, backend) = make_store(&["e1"]).await;
        let user = UserId::new("u1");

        assert!(store.unsave(&user, &EventId::new("e1")).await.is_ok());
        assert_eq!(backend.count_for_user(&user).await, 0);
    }

    #[tokio::test]
    async fn save_of_unknown_event_is_not_found() {
        let (store, _) = make_store(&["e1"]).await;
        let result = store.save(&UserId::new("u1"), &EventId::new("ghost")).await;
        let Err(DiscoveryError::EventNotFound(_)) = result else {
            panic!("expected EventNotFound, got {result:?}");
        };
    }

    #[tokio::test]
    async fn failed_save_rolls_back_and_publishes() {
        let (store, backend) = make_store(&["e1"]).await;
        let user = UserId::new("u1");
        let event = EventId::new("e1");
        let mut rx = store.feed().subscribe();

        backend.fail_writes(true);
        let result = store.save(&user, &event).await;
        assert!(result.is_err());

        // Optimistic apply, then the compensation.
        let first = rx.recv().await;
        let second = rx.recv().await;
        let (Ok(first), Ok(second)) = (first, second) else {
            panic!("expected two feed changes");
        };
        assert_eq!(first.kind(), "saved");
        assert_eq!(second.kind(), "save_rolled_back");

        assert_eq!(store.is_saved(&user, &event).await.ok(), Some(false));
    }

    #[tokio::test]
    async fn failed_unsave_restores_the_entry() {
        let (store, backend) = make_store(&["e1"]).await;
        let user = UserId::new("u1");
        let event = EventId::new("e1");

        assert!(store.save(&user, &event).await.is_ok());

        backend.fail_writes(true);
        assert!(store.unsave(&user, &event).await.is_err());
        assert_eq!(store.is_saved(&user, &event).await.ok(), Some(true));
    }

    #[tokio::test]
    async fn list_saved_drops_ids_missing_from_catalog() {
        let backend = Arc::new(InMemorySavedEvents::new());
        let user = UserId::new("u1");
        let now = Utc::now();
        let _ = backend.insert(&user, &EventId::new("live"), now).await;
        let _ = backend
            .insert(&user, &EventId::new("gone"), now - chrono::Duration::minutes(1))
            .await;

        let catalog = Arc::new(EventCatalog::new());
        catalog.replace_all(vec![make_event("live")]).await;
        let store = SavedEventStore::new(
            Arc::clone(&backend) as Arc<dyn SavedEventBackend>,
            catalog,
            ChangeFeed::new(64),
        );

        let listed = store.list_saved(&user).await;
        let Ok(listed) = listed else {
            panic!("list failed");
        };
        let ids: Vec<String> = listed.iter().map(|e| e.id.to_string()).collect();
        assert_eq!(ids, vec!["live"]);
    }

    #[tokio::test]
    async fn saved_list_orders_most_recent_first() {
        let (store, _) = make_store(&["a", "b", "c"]).await;
        let user = UserId::new("u1");

        for id in ["b", "c", "a"] {
            assert!(store.save(&user, &EventId::new(id)).await.is_ok());
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }

        let ids = store.saved_ids(&user).await;
        let Ok(ids) = ids else {
            panic!("saved_ids failed");
        };
        let ids: Vec<String> = ids.iter().map(EventId::to_string).collect();
        assert_eq!(ids, vec!["a", "c", "b"]);
    }

    #[tokio::test]
    async fn primed_view_answers_before_hydration() {
        let backend = Arc::new(InMemorySavedEvents::new());
        let catalog = Arc::new(EventCatalog::new());
        catalog.replace_all(vec![make_event("e1")]).await;
        let store = SavedEventStore::new(
            Arc::clone(&backend) as Arc<dyn SavedEventBackend>,
            catalog,
            ChangeFeed::new(64),
        );

        let user = UserId::new("u1");
        store.prime(&user, vec![EventId::new("e1")]).await;
        assert_eq!(store.is_saved(&user, &EventId::new("e1")).await.ok(), Some(true));
    }

    /// Backend whose insert blocks until a permit arrives, then fails.
    #[derive(Debug)]
    struct GatedBackend {
        gate: Semaphore,
        inner: InMemorySavedEvents,
    }

    #[async_trait]
    impl SavedEventBackend for GatedBackend {
        async fn insert(
            &self,
            _user_id: &UserId,
            _event_id: &EventId,
            _saved_at: DateTime<Utc>,
        ) -> Result<(), DiscoveryError> {
            let _permit = self.gate.acquire().await;
            Err(DiscoveryError::PersistenceError("slow failure".to_string()))
        }

        async fn delete(
            &self,
            user_id: &UserId,
            event_id: &EventId,
        ) -> Result<(), DiscoveryError> {
            self.inner.delete(user_id, event_id).await
        }

        async fn list_for_user(
            &self,
            user_id: &UserId,
        ) -> Result<Vec<SavedEventRow>, DiscoveryError> {
            self.inner.list_for_user(user_id).await
        }
    }

    #[tokio::test]
    async fn superseded_save_failure_does_not_roll_back_newer_unsave() {
        let backend = Arc::new(GatedBackend {
            gate: Semaphore::new(0),
            inner: InMemorySavedEvents::new(),
        });
        let catalog = Arc::new(EventCatalog::new());
        catalog.replace_all(vec![make_event("e1")]).await;
        let store = Arc::new(SavedEventStore::new(
            Arc::clone(&backend) as Arc<dyn SavedEventBackend>,
            catalog,
            ChangeFeed::new(64),
        ));

        let user = UserId::new("u1");
        let event = EventId::new("e1");

        // Save applies locally, then parks inside the backend.
        let save_task = {
            let store = Arc::clone(&store);
            let (user, event) = (user.clone(), event.clone());
            tokio::spawn(async move { store.save(&user, &event).await })
        };
        for _ in 0..100 {
            if store.is_saved(&user, &event).await.ok() == Some(true) {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(1)).await;
        }
        assert_eq!(store.is_saved(&user, &event).await.ok(), Some(true));

        // A newer unsave lands while the save's write is in flight.
        assert!(store.unsave(&user, &event).await.is_ok());

        // Release the parked save; its failure must not resurrect state
        // the unsave already settled.
        backend.gate.add_permits(1);
        let save_result = save_task.await;
        let Ok(save_result) = save_result else {
            panic!("save task panicked");
        };
        assert!(save_result.is_err());
        assert_eq!(store.is_saved(&user, &event).await.ok(), Some(false));
    }
}

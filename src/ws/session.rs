//! Per-connection triage session.
//!
//! Owns the connection's [`TriageController`] and the latest-wins guard
//! for asynchronous criteria resolution. Command handling returns plain
//! JSON payloads; the connection loop wraps them in envelopes.

use serde_json::json;

use crate::api::dto::EventDto;
use crate::app_state::AppState;
use crate::domain::UserId;
use crate::error::DiscoveryError;
use crate::service::{CriteriaRequest, LatestWins, TriageController, TriagePhase};

/// One client's triage state for the lifetime of a WebSocket connection.
#[derive(Debug)]
pub struct TriageSession {
    user_id: UserId,
    latest: LatestWins,
    controller: Option<TriageController>,
}

impl TriageSession {
    /// Creates a session with no active deck.
    #[must_use]
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            latest: LatestWins::new(),
            controller: None,
        }
    }

    /// The user this session belongs to.
    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Resolves the request into criteria, runs the engine, and replaces
    /// the deck. The previous deck (and its triage history) is discarded
    /// only on success: a failed geocode leaves everything untouched,
    /// and a resolution that lost the latest-wins race is dropped
    /// without being applied.
    ///
    /// # Errors
    ///
    /// Validation and geocoding errors from criteria resolution.
    pub async fn apply_filters(
        &mut self,
        state: &AppState,
        request: CriteriaRequest,
    ) -> Result<serde_json::Value, DiscoveryError> {
        let token = self.latest.begin();
        let criteria = state.location.resolve_criteria(&request).await?;
        if !self.latest.is_current(token) {
            // A newer apply_filters started while we were geocoding.
            tracing::debug!(user_id = %self.user_id, "stale criteria resolution discarded");
            return Ok(json!({ "applied": false, "stale": true }));
        }

        let deck = state.discovery.discover(&criteria).await;
        let controller = TriageController::new(self.user_id.clone(), deck);
        let payload = json!({
            "applied": true,
            "deck_size": controller.deck_len(),
            "card": controller.current().map(|e| EventDto::from_event(e.clone(), None)),
            "exhausted": controller.phase() == TriagePhase::Exhausted,
        });
        self.controller = Some(controller);
        Ok(payload)
    }

    /// Accept gesture: save through the store, advance, report.
    ///
    /// # Errors
    ///
    /// [`DiscoveryError::InvalidRequest`] when no deck is active. A
    /// failed save is not an error here: it comes back as the
    /// non-blocking `save_failed` notice and the cursor has advanced.
    pub async fn accept(&mut self, state: &AppState) -> Result<serde_json::Value, DiscoveryError> {
        let Some(controller) = self.controller.as_mut() else {
            return Err(no_active_deck());
        };
        let outcome = controller.accept(&state.saved).await;
        Ok(json!({
            "judged": outcome.judged,
            "save_failed": outcome.save_failed,
            "card": controller.current().map(|e| EventDto::from_event(e.clone(), None)),
            "exhausted": controller.phase() == TriagePhase::Exhausted,
        }))
    }

    /// Reject gesture: advance without touching the store.
    ///
    /// # Errors
    ///
    /// [`DiscoveryError::InvalidRequest`] when no deck is active.
    pub fn reject(&mut self) -> Result<serde_json::Value, DiscoveryError> {
        let Some(controller) = self.controller.as_mut() else {
            return Err(no_active_deck());
        };
        let outcome = controller.reject();
        Ok(json!({
            "judged": outcome.judged,
            "save_failed": false,
            "card": controller.current().map(|e| EventDto::from_event(e.clone(), None)),
            "exhausted": controller.phase() == TriagePhase::Exhausted,
        }))
    }

    /// Re-sends the presented card without judging anything.
    ///
    /// # Errors
    ///
    /// [`DiscoveryError::InvalidRequest`] when no deck is active.
    pub fn current(&self) -> Result<serde_json::Value, DiscoveryError> {
        let Some(controller) = self.controller.as_ref() else {
            return Err(no_active_deck());
        };
        Ok(json!({
            "card": controller.current().map(|e| EventDto::from_event(e.clone(), None)),
            "exhausted": controller.phase() == TriagePhase::Exhausted,
        }))
    }
}

fn no_active_deck() -> DiscoveryError {
    DiscoveryError::InvalidRequest("no active deck; send apply_filters first".to_string())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{
        ChangeFeed, Coordinate, Event, EventCatalog, EventCategory, EventId, EventStatus,
    };
    use crate::geo::{DeniedPosition, GeoResolver, ResolvedPlace};
    use crate::persistence::SavedEventBackend;
    use crate::persistence::memory::{InMemoryEventSource, InMemorySavedEvents};
    use crate::service::{DiscoveryService, LocationService, SavedEventStore};
    use async_trait::async_trait;
    use std::sync::Arc;

    #[derive(Debug)]
    struct NoPlaceResolver;

    #[async_trait]
    impl GeoResolver for NoPlaceResolver {
        async fn geocode(&self, query: &str) -> Result<ResolvedPlace, DiscoveryError> {
            Err(DiscoveryError::PlaceNotFound(query.to_string()))
        }

        async fn reverse_geocode(
            &self,
            _coordinate: Coordinate,
        ) -> Result<String, DiscoveryError> {
            Err(DiscoveryError::GeoResolution("unused".to_string()))
        }
    }

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

    async fn make_state(event_ids: &[&str]) -> AppState {
        let events: Vec<Event> = event_ids.iter().map(|id| make_event(id)).collect();
        let catalog = Arc::new(EventCatalog::new());
        catalog.replace_all(events.clone()).await;

        let feed = ChangeFeed::new(64);
        let backend = Arc::new(InMemorySavedEvents::new());
        AppState {
            discovery: Arc::new(DiscoveryService::new(
                Arc::clone(&catalog),
                Arc::new(InMemoryEventSource::new(events)),
            )),
            saved: Arc::new(SavedEventStore::new(
                backend as Arc<dyn SavedEventBackend>,
                catalog,
                feed.clone(),
            )),
            location: Arc::new(LocationService::new(
                Arc::new(NoPlaceResolver),
                Arc::new(DeniedPosition),
            )),
            feed,
        }
    }

    #[tokio::test]
    async fn apply_then_gestures_run_the_deck() {
        let state = make_state(&["a", "b"]).await;
        let mut session = TriageSession::new(UserId::new("u1"));

        let payload = session
            .apply_filters(&state, CriteriaRequest::default())
            .await;
        let Ok(payload) = payload else {
            panic!("apply failed: {payload:?}");
        };
        assert_eq!(payload.get("deck_size").and_then(|v| v.as_u64()), Some(2));

        let accept = session.accept(&state).await;
        let Ok(accept) = accept else {
            panic!("accept failed");
        };
        assert_eq!(
            accept.get("judged").and_then(|v| v.as_str()),
            Some("a")
        );
        assert_eq!(accept.get("save_failed").and_then(|v| v.as_bool()), Some(false));

        let reject = session.reject();
        let Ok(reject) = reject else {
            panic!("reject failed");
        };
        assert_eq!(reject.get("exhausted").and_then(|v| v.as_bool()), Some(true));
    }

    #[tokio::test]
    async fn failed_geocode_keeps_the_prior_deck() {
        let state = make_state(&["a"]).await;
        let mut session = TriageSession::new(UserId::new("u1"));

        let initial = session
            .apply_filters(&state, CriteriaRequest::default())
            .await;
        assert!(initial.is_ok());

        let request = CriteriaRequest {
            near: Some("ZZZZNOWHERE123".to_string()),
            ..CriteriaRequest::default()
        };
        let result = session.apply_filters(&state, request).await;
        let Err(DiscoveryError::PlaceNotFound(_)) = result else {
            panic!("expected PlaceNotFound");
        };

        // Prior deck still presents its card.
        let current = session.current();
        let Ok(current) = current else {
            panic!("current failed");
        };
        assert!(current.get("card").is_some_and(|c| !c.is_null()));
    }

    #[tokio::test]
    async fn gesture_without_deck_is_rejected() {
        let state = make_state(&[]).await;
        let mut session = TriageSession::new(UserId::new("u1"));
        let result = session.accept(&state).await;
        let Err(DiscoveryError::InvalidRequest(_)) = result else {
            panic!("expected InvalidRequest");
        };
    }
}

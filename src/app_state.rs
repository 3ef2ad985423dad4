//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::ChangeFeed;
use crate::service::{DiscoveryService, LocationService, SavedEventStore};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
///
/// The single [`SavedEventStore`] here is deliberate: list rendering
/// and swipe triage both read and write saved status through it, so the
/// two views can never drift apart.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Catalog refresh and filter evaluation.
    pub discovery: Arc<DiscoveryService>,
    /// The one source of truth for saved-event state.
    pub saved: Arc<SavedEventStore>,
    /// Geocoding and device position composition.
    pub location: Arc<LocationService>,
    /// Saved-set change feed for WebSocket subscriptions.
    pub feed: ChangeFeed,
}

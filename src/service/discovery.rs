//! Discovery orchestration: catalog refresh and filter evaluation.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::NaiveDate;

use crate::domain::{Event, EventCatalog, FilterCriteria};
use crate::engine::FilterEngine;
use crate::error::DiscoveryError;
use crate::persistence::{EventSource, SourceFilter};

/// Orchestrates the event catalog and the filter engine.
///
/// The refresh deliberately fetches with no source pre-filter: the
/// source's location filter is address-substring based and only ever a
/// coarse pre-filter, so the engine is given the full active set and
/// its geodesic radius gate stays authoritative.
#[derive(Debug)]
pub struct DiscoveryService {
    catalog: Arc<EventCatalog>,
    source: Arc<dyn EventSource>,
}

impl DiscoveryService {
    /// Creates a service over the given catalog and source.
    #[must_use]
    pub fn new(catalog: Arc<EventCatalog>, source: Arc<dyn EventSource>) -> Self {
        Self { catalog, source }
    }

    /// Returns the catalog this service refreshes.
    #[must_use]
    pub fn catalog(&self) -> &Arc<EventCatalog> {
        &self.catalog
    }

    /// Replaces the catalog snapshot with a fresh fetch from the source.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::PersistenceError`] when the fetch
    /// fails; the previous snapshot is left untouched.
    pub async fn refresh(&self) -> Result<usize, DiscoveryError> {
        let events = self.source.fetch_active(&SourceFilter::none()).await?;
        let count = events.len();
        self.catalog.replace_all(events).await;
        tracing::info!(count, "event catalog refreshed");
        Ok(count)
    }

    /// Evaluates the criteria against the current snapshot with "today"
    /// taken from the UTC clock.
    pub async fn discover(&self, criteria: &FilterCriteria) -> Vec<Event> {
        let events = self.catalog.all().await;
        FilterEngine::apply(&events, criteria)
    }

    /// Evaluates against an injected date; used by tests.
    pub async fn discover_on(&self, criteria: &FilterCriteria, today: NaiveDate) -> Vec<Event> {
        let events = self.catalog.all().await;
        FilterEngine::apply_on(&events, criteria, today)
    }
}

/// "Latest request wins" guard for asynchronous criteria resolution.
///
/// A caller takes a token before starting a geocoding round-trip and
/// checks it after: if the criteria changed again in the meantime (a
/// newer token was issued), the stale resolution is discarded instead of
/// overwriting the newer one.
#[derive(Debug, Default)]
pub struct LatestWins {
    counter: AtomicU64,
}

/// Token identifying one resolution attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionToken(u64);

impl LatestWins {
    /// Creates the guard with no outstanding requests.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Begins a new resolution attempt, invalidating all earlier tokens.
    pub fn begin(&self) -> ResolutionToken {
        ResolutionToken(self.counter.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether the token still corresponds to the latest attempt.
    #[must_use]
    pub fn is_current(&self, token: ResolutionToken) -> bool {
        self.counter.load(Ordering::SeqCst) == token.0
    }
}

//! Service layer: business logic orchestration.
//!
//! [`DiscoveryService`] runs the catalog and filter engine,
//! [`SavedEventStore`] owns the optimistic saved-set state,
//! [`LocationService`] composes the geocoding seams, and
//! [`TriageController`] drives the swipe session.

pub mod discovery;
pub mod location;
pub mod saved_events;
pub mod triage;

pub use discovery::{DiscoveryService, LatestWins, ResolutionToken};
pub use location::{CriteriaRequest, LocationService};
pub use saved_events::SavedEventStore;
pub use triage::{TriageController, TriageOutcome, TriagePhase};

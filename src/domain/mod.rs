//! Domain layer: events, filter criteria, the catalog, and the change feed.
//!
//! This module contains the discovery domain model: event and user
//! identity, the event entity with its closed category/status sets, the
//! filter criteria value, the in-memory event catalog, and the broadcast
//! feed of saved-set changes.

pub mod catalog;
pub mod change;
pub mod coordinate;
pub mod criteria;
pub mod event;
pub mod feed;
pub mod ids;

pub use catalog::EventCatalog;
pub use change::SavedSetChange;
pub use coordinate::Coordinate;
pub use criteria::{DateBucket, FilterCriteria, GeoConstraint};
pub use event::{Event, EventCategory, EventStatus};
pub use feed::ChangeFeed;
pub use ids::{EventId, UserId};

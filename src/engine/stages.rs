//! Named predicate stages of the filter pipeline.
//!
//! Each stage is an independent, short-circuiting predicate over
//! `(Event, FilterCriteria, today)`. A stage may eliminate a candidate;
//! no stage ever resurrects one. Keeping the stages as an explicit
//! ordered list makes each gate testable on its own and makes any
//! reordering a deliberate edit rather than an accident of control flow.
//!
//! The geo gate is *not* part of [`PIPELINE`]: it runs after the sort
//! stage (it filters by distance, never reorders by it) and lives in
//! [`geo_gate`].

use chrono::{Days, NaiveDate};

use crate::domain::{DateBucket, Event, EventStatus, FilterCriteria};
use crate::geo::distance::distance_miles;

/// A single predicate stage of the pipeline.
#[derive(Debug, Clone, Copy)]
pub struct FilterStage {
    /// Stage name for logging when an event is dropped.
    pub name: &'static str,
    /// Returns `true` to retain the event.
    pub predicate: fn(&Event, &FilterCriteria, NaiveDate) -> bool,
}

/// The pre-sort stages, in evaluation order.
pub const PIPELINE: [FilterStage; 4] = [
    FilterStage {
        name: "status",
        predicate: status_gate,
    },
    FilterStage {
        name: "category",
        predicate: category_gate,
    },
    FilterStage {
        name: "text",
        predicate: text_gate,
    },
    FilterStage {
        name: "date_bucket",
        predicate: date_bucket_gate,
    },
];

/// Unconditional gate: only active events are discoverable. Not part of
/// user-visible criteria.
fn status_gate(event: &Event, _criteria: &FilterCriteria, _today: NaiveDate) -> bool {
    event.status == EventStatus::Active
}

/// Empty category selection means "no constraint", not "match nothing".
fn category_gate(event: &Event, criteria: &FilterCriteria, _today: NaiveDate) -> bool {
    criteria.categories.is_empty() || criteria.categories.contains(&event.category)
}

/// Case-insensitive substring containment over title, description, and
/// address. No tokenization, stemming, or ranking; a match in several
/// fields is no better than a match in one.
fn text_gate(event: &Event, criteria: &FilterCriteria, _today: NaiveDate) -> bool {
    if criteria.search_text.is_empty() {
        return true;
    }
    let needle = criteria.search_text.to_lowercase();
    event.title.to_lowercase().contains(&needle)
        || event.description.to_lowercase().contains(&needle)
        || event.address.to_lowercase().contains(&needle)
}

/// Relative date window against "today" at evaluation time.
///
/// Every bucket except [`DateBucket::All`] excludes events strictly in
/// the past, and excludes events with a missing or unparseable date.
fn date_bucket_gate(event: &Event, criteria: &FilterCriteria, today: NaiveDate) -> bool {
    let window_days = match criteria.date_bucket {
        DateBucket::All => return true,
        DateBucket::Today => 0,
        DateBucket::ThisWeek => 7,
        DateBucket::ThisMonth => 30,
    };
    let Some(date) = event.date else {
        return false;
    };
    let end = today
        .checked_add_days(Days::new(window_days))
        .unwrap_or(NaiveDate::MAX);
    date >= today && date <= end
}

/// Post-sort radius gate.
///
/// Returns `true` when no geo constraint is active. When one is active,
/// an event with no coordinate fails unconditionally; the constraint's
/// center is always a successfully resolved coordinate (see
/// [`crate::domain::GeoConstraint`]), so a failed geocode can never
/// silently admit all events.
#[must_use]
pub fn geo_gate(event: &Event, criteria: &FilterCriteria) -> bool {
    let Some(geo) = criteria.geo else {
        return true;
    };
    let Some(coordinate) = event.coordinate else {
        return false;
    };
    distance_miles(geo.center, coordinate) <= geo.radius_miles
}

//! User-facing filter criteria for event discovery.
//!
//! [`FilterCriteria`] is the immutable value the UI layer composes and
//! hands to the [`crate::engine::FilterEngine`] on every re-evaluation.
//! The engine never mutates criteria; identical criteria over identical
//! events always produce identical ordered output.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::Coordinate;
use super::event::EventCategory;

/// Relative date window for the date-bucket gate.
///
/// Buckets are computed against "today" at evaluation time. Every bucket
/// except [`DateBucket::All`] excludes events strictly in the past.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DateBucket {
    /// No date constraint.
    #[default]
    All,
    /// Events dated exactly today (calendar date, not a 24-hour window).
    Today,
    /// Events within `[today, today + 7 days]` inclusive.
    ThisWeek,
    /// Events within `[today, today + 30 days]` inclusive.
    ThisMonth,
}

impl DateBucket {
    /// Parses the query-parameter form (`all`, `today`, `this_week`,
    /// `this_month`).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "all" => Some(Self::All),
            "today" => Some(Self::Today),
            "this_week" => Some(Self::ThisWeek),
            "this_month" => Some(Self::ThisMonth),
            _ => None,
        }
    }
}

/// A resolved radius constraint around a geocoded center.
///
/// Constructed only after the center has successfully resolved; the engine
/// never sees a half-resolved constraint, so a failed geocode can never
/// silently admit all events.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoConstraint {
    /// Search center.
    pub center: Coordinate,
    /// Inclusive great-circle radius in miles.
    pub radius_miles: f64,
}

/// The full set of independently-specified discovery constraints.
///
/// Pure data: empty `categories` and empty `search_text` mean "no
/// constraint", and `geo: None` disables the radius gate. `Default` is the
/// fully unconstrained criteria.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    /// Selected categories; empty = no category constraint.
    pub categories: HashSet<EventCategory>,
    /// Case-insensitive substring to match against title, description, and
    /// address; empty = no text constraint.
    pub search_text: String,
    /// Relative date window.
    pub date_bucket: DateBucket,
    /// Optional resolved radius constraint.
    pub geo: Option<GeoConstraint>,
}

impl FilterCriteria {
    /// `true` when no user-visible constraint is active (the status gate
    /// still applies).
    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        self.categories.is_empty()
            && self.search_text.is_empty()
            && self.date_bucket == DateBucket::All
            && self.geo.is_none()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn default_is_unconstrained() {
        assert!(FilterCriteria::default().is_unconstrained());
    }

    #[test]
    fn any_single_constraint_is_detected() {
        let with_text = FilterCriteria {
            search_text: "river".to_string(),
            ..FilterCriteria::default()
        };
        assert!(!with_text.is_unconstrained());

        let with_bucket = FilterCriteria {
            date_bucket: DateBucket::Today,
            ..FilterCriteria::default()
        };
        assert!(!with_bucket.is_unconstrained());
    }

    #[test]
    fn bucket_parse_round_trip() {
        for (text, bucket) in [
            ("all", DateBucket::All),
            ("today", DateBucket::Today),
            ("this_week", DateBucket::ThisWeek),
            ("this_month", DateBucket::ThisMonth),
        ] {
            assert_eq!(DateBucket::parse(text), Some(bucket));
        }
        assert_eq!(DateBucket::parse("next_year"), None);
    }
}

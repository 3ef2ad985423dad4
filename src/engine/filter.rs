//! The filter pipeline: gates, stable sort, post-sort geo gate.

use chrono::{NaiveDate, Utc};

use super::stages::{self, PIPELINE};
use crate::domain::{Event, FilterCriteria};

/// Applies the full discovery pipeline to a candidate event collection.
///
/// Deterministic: identical inputs (events, criteria, evaluation date)
/// always yield identical ordered output. Criteria are pure data and are
/// never mutated. Malformed events (missing date or coordinate) are
/// dropped by the stage they fail, never a reason to abort the rest of
/// the collection.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterEngine;

impl FilterEngine {
    /// Runs the pipeline with "today" taken from the UTC clock.
    #[must_use]
    pub fn apply(events: &[Event], criteria: &FilterCriteria) -> Vec<Event> {
        Self::apply_on(events, criteria, Utc::now().date_naive())
    }

    /// Runs the pipeline against an injected evaluation date.
    ///
    /// Order of operations:
    /// 1. the predicate stages of [`PIPELINE`] (status, category, text,
    ///    date bucket), each eliminating candidates independently;
    /// 2. a stable ascending sort by date, missing dates last (equal
    ///    dates keep their source order);
    /// 3. the geo gate, which filters by great-circle distance but never
    ///    reorders.
    #[must_use]
    pub fn apply_on(events: &[Event], criteria: &FilterCriteria, today: NaiveDate) -> Vec<Event> {
        let mut survivors: Vec<Event> = events
            .iter()
            .filter(|event| {
                for stage in &PIPELINE {
                    if !(stage.predicate)(event, criteria, today) {
                        tracing::trace!(
                            event_id = %event.id,
                            stage = stage.name,
                            "event eliminated"
                        );
                        return false;
                    }
                }
                true
            })
            .cloned()
            .collect();

        // Stable: equal dates (and the missing-date tail) keep source order.
        survivors.sort_by_key(|event| (event.date.is_none(), event.date));

        survivors.retain(|event| {
            let retained = stages::geo_gate(event, criteria);
            if !retained {
                tracing::trace!(event_id = %event.id, stage = "geo", "event eliminated");
            }
            retained
        });

        survivors
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{
        Coordinate, DateBucket, EventCategory, EventId, EventStatus, GeoConstraint,
    };
    use std::collections::HashSet;

    fn eval_date() -> NaiveDate {
        let Some(date) = NaiveDate::from_ymd_opt(2025, 6, 15) else {
            panic!("valid date");
        };
        date
    }

    fn event(id: &str, category: EventCategory, date: Option<(i32, u32, u32)>) -> Event {
        Event {
            id: EventId::new(id),
            title: format!("Event {id}"),
            description: String::new(),
            organization: "Org".to_string(),
            link: None,
            image_url: None,
            category,
            status: EventStatus::Active,
            date: date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            start_time: String::new(),
            end_time: String::new(),
            address: String::new(),
            coordinate: Some(Coordinate::new(34.0522, -118.2437)),
        }
    }

    fn ids(events: &[Event]) -> Vec<String> {
        events.iter().map(|e| e.id.to_string()).collect()
    }

    #[test]
    fn apply_is_deterministic() {
        let events = vec![
            event("a", EventCategory::Environment, Some((2025, 6, 20))),
            event("b", EventCategory::Community, Some((2025, 6, 16))),
            event("c", EventCategory::Food, Some((2025, 6, 16))),
        ];
        let criteria = FilterCriteria {
            date_bucket: DateBucket::ThisWeek,
            ..FilterCriteria::default()
        };

        let first = FilterEngine::apply_on(&events, &criteria, eval_date());
        let second = FilterEngine::apply_on(&events, &criteria, eval_date());
        assert_eq!(first, second);
        assert_eq!(ids(&first), vec!["b", "c", "a"]);
    }

    #[test]
    fn only_active_events_survive() {
        let mut draft = event("d", EventCategory::Health, Some((2025, 6, 16)));
        draft.status = EventStatus::Draft;
        let mut done = event("x", EventCategory::Health, Some((2025, 6, 16)));
        done.status = EventStatus::Completed;
        let events = vec![
            draft,
            event("a", EventCategory::Health, Some((2025, 6, 16))),
            done,
        ];

        let result = FilterEngine::apply_on(&events, &FilterCriteria::default(), eval_date());
        assert_eq!(ids(&result), vec!["a"]);
    }

    #[test]
    fn empty_constraints_are_no_ops() {
        let events = vec![
            event("a", EventCategory::Environment, Some((2025, 6, 16))),
            event("b", EventCategory::Community, Some((2025, 6, 17))),
        ];
        let unconstrained = FilterEngine::apply_on(&events, &FilterCriteria::default(), eval_date());

        let explicit = FilterCriteria {
            categories: HashSet::new(),
            search_text: String::new(),
            ..FilterCriteria::default()
        };
        let with_empty = FilterEngine::apply_on(&events, &explicit, eval_date());
        assert_eq!(unconstrained, with_empty);
        assert_eq!(with_empty.len(), 2);
    }

    #[test]
    fn category_gate_eliminates_nonmembers() {
        // A(Environment, 6-16) and B(Community, 6-14) under an
        // Environment-only filter with no date constraint.
        let events = vec![
            event("a", EventCategory::Environment, Some((2025, 6, 16))),
            event("b", EventCategory::Community, Some((2025, 6, 14))),
        ];
        let criteria = FilterCriteria {
            categories: HashSet::from([EventCategory::Environment]),
            ..FilterCriteria::default()
        };

        let result = FilterEngine::apply_on(&events, &criteria, eval_date());
        assert_eq!(ids(&result), vec!["a"]);
    }

    #[test]
    fn today_bucket_keeps_exact_date_only() {
        let events = vec![
            event("past", EventCategory::Food, Some((2025, 6, 14))),
            event("now", EventCategory::Food, Some((2025, 6, 15))),
            event("soon", EventCategory::Food, Some((2025, 6, 16))),
        ];
        let criteria = FilterCriteria {
            date_bucket: DateBucket::Today,
            ..FilterCriteria::default()
        };

        let result = FilterEngine::apply_on(&events, &criteria, eval_date());
        assert_eq!(ids(&result), vec!["now"]);
    }

    #[test]
    fn sort_is_stable_and_missing_dates_go_last() {
        let events = vec![
            event("late", EventCategory::Food, Some((2025, 7, 1))),
            event("tie1", EventCategory::Food, Some((2025, 6, 16))),
            event("undated", EventCategory::Food, None),
            event("tie2", EventCategory::Food, Some((2025, 6, 16))),
        ];

        let result = FilterEngine::apply_on(&events, &FilterCriteria::default(), eval_date());
        assert_eq!(ids(&result), vec!["tie1", "tie2", "late", "undated"]);
    }

    #[test]
    fn geo_gate_filters_without_reordering() {
        let mut far = event("far", EventCategory::Food, Some((2025, 6, 16)));
        // Roughly 800 miles from LA.
        far.coordinate = Some(Coordinate::new(47.6062, -122.3321));
        let events = vec![
            event("b", EventCategory::Food, Some((2025, 6, 17))),
            far,
            event("a", EventCategory::Food, Some((2025, 6, 16))),
        ];
        let criteria = FilterCriteria {
            geo: Some(GeoConstraint {
                center: Coordinate::new(34.0522, -118.2437),
                radius_miles: 10.0,
            }),
            ..FilterCriteria::default()
        };

        let result = FilterEngine::apply_on(&events, &criteria, eval_date());
        assert_eq!(ids(&result), vec!["a", "b"]);
    }

    #[test]
    fn text_gate_matches_title_description_and_address() {
        let mut by_desc = event("d", EventCategory::Food, Some((2025, 6, 16)));
        by_desc.description = "Sorting donations at the pantry".to_string();
        let mut by_addr = event("a", EventCategory::Food, Some((2025, 6, 16)));
        by_addr.address = "12 Pantry Lane".to_string();
        let no_match = event("n", EventCategory::Food, Some((2025, 6, 16)));

        let criteria = FilterCriteria {
            search_text: "pantry".to_string(),
            ..FilterCriteria::default()
        };
        let result =
            FilterEngine::apply_on(&[by_desc, by_addr, no_match], &criteria, eval_date());
        assert_eq!(ids(&result), vec!["d", "a"]);
    }
}

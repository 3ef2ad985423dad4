//! Database row models and the row → domain conversion.
//!
//! `event_date` is stored as raw feed text, not a SQL `DATE`: the import
//! pipeline passes values through as-is, and the malformed-date edge
//! case is handled here at load time (an unparseable date becomes
//! `None` with a warning, never a failed query).

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

use crate::domain::{Coordinate, Event, EventCategory, EventId, EventStatus, UserId};

/// Date format produced by the event import pipeline.
const EVENT_DATE_FORMAT: &str = "%Y-%m-%d";

/// A row from the `events` table.
#[derive(Debug, Clone, FromRow)]
pub struct EventRow {
    /// Event id (TEXT primary key).
    pub id: String,
    /// Headline.
    pub title: String,
    /// Free-text description.
    pub description: String,
    /// Hosting organization name.
    pub organization: String,
    /// Optional external signup link.
    pub link: Option<String>,
    /// Optional image URL.
    pub image_url: Option<String>,
    /// Category identifier (one of the six stable identifiers).
    pub category: String,
    /// Status identifier.
    pub status: String,
    /// Raw date text from the feed (expected `YYYY-MM-DD`).
    pub event_date: Option<String>,
    /// Human-readable start time.
    pub start_time: String,
    /// Human-readable end time.
    pub end_time: String,
    /// Free-text street address.
    pub address: String,
    /// Latitude, when the feed had usable coordinates.
    pub latitude: Option<f64>,
    /// Longitude, when the feed had usable coordinates.
    pub longitude: Option<f64>,
}

impl EventRow {
    /// Converts the row to a domain [`Event`].
    ///
    /// Returns `None` only when the category or status identifier is
    /// unknown (the row is unusable and is dropped with a warning).
    /// A missing or unparseable date and a half-present coordinate both
    /// degrade to `None` fields instead: those events are still real
    /// and the filter stages define how they behave.
    #[must_use]
    pub fn into_event(self) -> Option<Event> {
        let Some(category) = EventCategory::parse(&self.category) else {
            tracing::warn!(event_id = %self.id, category = %self.category, "unknown category, dropping row");
            return None;
        };
        let Some(status) = EventStatus::parse(&self.status) else {
            tracing::warn!(event_id = %self.id, status = %self.status, "unknown status, dropping row");
            return None;
        };

        let date = match self.event_date.as_deref() {
            None => None,
            Some(raw) => match NaiveDate::parse_from_str(raw.trim(), EVENT_DATE_FORMAT) {
                Ok(date) => Some(date),
                Err(_) => {
                    tracing::warn!(event_id = %self.id, raw, "unparseable event date");
                    None
                }
            },
        };

        let coordinate = match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinate::new(latitude, longitude)),
            (None, None) => None,
            _ => {
                tracing::warn!(event_id = %self.id, "half-present coordinate, treating as missing");
                None
            }
        };

        Some(Event {
            id: EventId::new(self.id),
            title: self.title,
            description: self.description,
            organization: self.organization,
            link: self.link,
            image_url: self.image_url,
            category,
            status,
            date,
            start_time: self.start_time,
            end_time: self.end_time,
            address: self.address,
            coordinate,
        })
    }
}

/// A row from the `saved_events` table: "user U has saved event E".
#[derive(Debug, Clone, PartialEq)]
pub struct SavedEventRow {
    /// Owner of the relationship.
    pub user_id: UserId,
    /// Saved event.
    pub event_id: EventId,
    /// When the relationship was created.
    pub saved_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn make_row() -> EventRow {
        EventRow {
            id: "evt-1".to_string(),
            title: "Beach Cleanup".to_string(),
            description: String::new(),
            organization: "Coastkeepers".to_string(),
            link: None,
            image_url: None,
            category: "environment".to_string(),
            status: "active".to_string(),
            event_date: Some("2025-06-15".to_string()),
            start_time: "9:00 AM".to_string(),
            end_time: "noon".to_string(),
            address: "Dockweiler Beach".to_string(),
            latitude: Some(33.93),
            longitude: Some(-118.43),
        }
    }

    #[test]
    fn well_formed_row_converts() {
        let event = make_row().into_event();
        let Some(event) = event else {
            panic!("conversion failed");
        };
        assert_eq!(event.category, EventCategory::Environment);
        assert_eq!(event.date, NaiveDate::from_ymd_opt(2025, 6, 15));
        assert_eq!(event.coordinate, Some(Coordinate::new(33.93, -118.43)));
    }

    #[test]
    fn unparseable_date_degrades_to_none() {
        let mut row = make_row();
        row.event_date = Some("June 15th".to_string());
        let event = row.into_event();
        let Some(event) = event else {
            panic!("conversion failed");
        };
        assert_eq!(event.date, None);
    }

    #[test]
    fn half_present_coordinate_degrades_to_none() {
        let mut row = make_row();
        row.longitude = None;
        let event = row.into_event();
        let Some(event) = event else {
            panic!("conversion failed");
        };
        assert_eq!(event.coordinate, None);
    }

    #[test]
    fn unknown_category_drops_the_row() {
        let mut row = make_row();
        row.category = "gardening".to_string();
        assert!(row.into_event().is_none());
    }
}

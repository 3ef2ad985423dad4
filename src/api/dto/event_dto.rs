//! Event discovery DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::common_dto::PaginationMeta;
use crate::domain::{Coordinate, Event, EventCategory, EventId};
use crate::service::CriteriaRequest;

/// Query parameters for `GET /api/v1/events`.
///
/// `categories` is a comma-separated list of category identifiers.
/// `near` (free text, geocoded server-side) and `lat`/`lon` (a center
/// the client resolved on-device) are mutually exclusive.
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
pub struct DiscoverParams {
    /// Comma-separated category identifiers (e.g. `environment,food`).
    #[serde(default)]
    pub categories: Option<String>,
    /// Free-text search over title, description, and address.
    #[serde(default)]
    pub q: Option<String>,
    /// Date bucket: `all`, `today`, `this_week`, or `this_month`.
    #[serde(default)]
    pub date_bucket: Option<String>,
    /// Free-text place to center a radius search on.
    #[serde(default)]
    pub near: Option<String>,
    /// Pre-resolved center latitude.
    #[serde(default)]
    pub lat: Option<f64>,
    /// Pre-resolved center longitude.
    #[serde(default)]
    pub lon: Option<f64>,
    /// Radius in miles (defaults to 25 when a center is given).
    #[serde(default)]
    pub radius_miles: Option<f64>,
    /// Annotate each event with this user's saved flag.
    #[serde(default)]
    pub user_id: Option<String>,
    /// Page number (1-indexed).
    #[serde(default)]
    pub page: Option<u32>,
    /// Items per page (max 100).
    #[serde(default)]
    pub per_page: Option<u32>,
}

impl DiscoverParams {
    /// Converts the query into an unresolved [`CriteriaRequest`].
    #[must_use]
    pub fn to_criteria_request(&self) -> CriteriaRequest {
        CriteriaRequest {
            categories: self
                .categories
                .as_deref()
                .unwrap_or_default()
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            search_text: self.q.clone().unwrap_or_default(),
            date_bucket: self.date_bucket.clone(),
            near: self.near.clone(),
            lat: self.lat,
            lon: self.lon,
            radius_miles: self.radius_miles,
        }
    }
}

/// One event in a discovery or saved-list response.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct EventDto {
    /// Event id.
    #[schema(value_type = String)]
    pub id: EventId,
    /// Headline.
    pub title: String,
    /// Free-text description.
    pub description: String,
    /// Hosting organization name.
    pub organization: String,
    /// Optional external signup link.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Optional image URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Category.
    pub category: EventCategory,
    /// Calendar date; absent when the feed value was unusable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    /// Human-readable start time.
    pub start_time: String,
    /// Human-readable end time.
    pub end_time: String,
    /// Free-text street address.
    pub address: String,
    /// Geocoded location, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinate: Option<Coordinate>,
    /// Whether the requesting user has saved this event; present only
    /// when the request carried a `user_id`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved: Option<bool>,
}

impl EventDto {
    /// Builds the DTO from a domain event and an optional saved flag.
    #[must_use]
    pub fn from_event(event: Event, saved: Option<bool>) -> Self {
        Self {
            id: event.id,
            title: event.title,
            description: event.description,
            organization: event.organization,
            link: event.link,
            image_url: event.image_url,
            category: event.category,
            date: event.date,
            start_time: event.start_time,
            end_time: event.end_time,
            address: event.address,
            coordinate: event.coordinate,
            saved,
        }
    }
}

/// Paginated response for `GET /api/v1/events`.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct EventListResponse {
    /// One page of filtered events, ascending by date.
    pub data: Vec<EventDto>,
    /// Pagination metadata over the full filtered result.
    pub pagination: PaginationMeta,
}

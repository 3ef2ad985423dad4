//! The volunteering event entity and its closed classification sets.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Coordinate;
use super::EventId;

/// Category of a volunteering opportunity.
///
/// Fixed closed set of six values. The discovery filter treats an empty
/// category selection as "no constraint", so there is deliberately no
/// catch-all variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    /// Conservation, cleanups, habitat restoration.
    Environment,
    /// Neighborhood and civic projects.
    Community,
    /// Tutoring, mentoring, literacy programs.
    Education,
    /// Clinics, blood drives, wellness outreach.
    Health,
    /// Shelters, rescues, wildlife care.
    Animals,
    /// Food banks, meal services, gleaning.
    Food,
}

impl EventCategory {
    /// All categories in display order.
    pub const ALL: [Self; 6] = [
        Self::Environment,
        Self::Community,
        Self::Education,
        Self::Health,
        Self::Animals,
        Self::Food,
    ];

    /// Stable lowercase identifier used in persistence and query params.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Environment => "environment",
            Self::Community => "community",
            Self::Education => "education",
            Self::Health => "health",
            Self::Animals => "animals",
            Self::Food => "food",
        }
    }

    /// Parses the stable identifier back into a category.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "environment" => Some(Self::Environment),
            "community" => Some(Self::Community),
            "education" => Some(Self::Education),
            "health" => Some(Self::Health),
            "animals" => Some(Self::Animals),
            "food" => Some(Self::Food),
            _ => None,
        }
    }

    /// Human-readable label for category catalogs and clients.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Environment => "Environment",
            Self::Community => "Community",
            Self::Education => "Education",
            Self::Health => "Health",
            Self::Animals => "Animals",
            Self::Food => "Food Security",
        }
    }
}

/// Lifecycle status of an event.
///
/// Only [`EventStatus::Active`] events are discoverable; the status gate in
/// the filter pipeline is unconditional and not part of user-visible
/// criteria. Transitions (draft → active, active → completed once the date
/// passes) are owned by the event maintenance pipeline, out of scope here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    /// Discoverable and open for volunteers.
    Active,
    /// Not yet published by its owner.
    Draft,
    /// Called off; retained for history.
    Cancelled,
    /// Date has passed.
    Completed,
}

impl EventStatus {
    /// Stable lowercase identifier used in persistence.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Draft => "draft",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }

    /// Parses the stable identifier back into a status.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "draft" => Some(Self::Draft),
            "cancelled" => Some(Self::Cancelled),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// A volunteering opportunity.
///
/// Read-only input to the discovery engine: created by an event owner or
/// the seed/import process and never mutated here. `date` and `coordinate`
/// are optional because upstream feed data is not always well-formed; the
/// filter stages define how such events behave (see
/// [`crate::engine::stages`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier (immutable).
    pub id: EventId,
    /// Short headline shown on cards and lists.
    pub title: String,
    /// Longer free-text description.
    pub description: String,
    /// Name of the hosting organization.
    pub organization: String,
    /// Optional external signup or info link.
    pub link: Option<String>,
    /// Optional image URL.
    pub image_url: Option<String>,
    /// Classification within the closed category set.
    pub category: EventCategory,
    /// Lifecycle status; only active events are discoverable.
    pub status: EventStatus,
    /// Calendar day of the event; `None` when the feed value was missing
    /// or unparseable.
    pub date: Option<NaiveDate>,
    /// Human-readable start time (e.g. `"9:00 AM"`).
    pub start_time: String,
    /// Human-readable end time (e.g. `"1:00 PM"`).
    pub end_time: String,
    /// Free-text street address.
    pub address: String,
    /// Geocoded location; `None` when the feed had no usable coordinates.
    pub coordinate: Option<Coordinate>,
}

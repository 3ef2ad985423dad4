//! Geocoding DTOs.

use serde::{Deserialize, Serialize};

use crate::domain::Coordinate;
use crate::geo::ResolvedPlace;

/// Query parameters for `GET /api/v1/geo/search`.
#[derive(Debug, Clone, Deserialize, utoipa::IntoParams)]
pub struct GeoSearchParams {
    /// Free-text place query.
    pub q: String,
}

/// Query parameters for `GET /api/v1/geo/reverse`.
#[derive(Debug, Clone, Copy, Deserialize, utoipa::IntoParams)]
pub struct ReverseParams {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lon: f64,
}

/// A resolved place in geo responses.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct PlaceResponse {
    /// Latitude of the match.
    pub latitude: f64,
    /// Longitude of the match.
    pub longitude: f64,
    /// Human-readable display name.
    pub display_name: String,
}

impl From<ResolvedPlace> for PlaceResponse {
    fn from(place: ResolvedPlace) -> Self {
        Self {
            latitude: place.coordinate.latitude,
            longitude: place.coordinate.longitude,
            display_name: place.display_name,
        }
    }
}

/// Response for `GET /api/v1/geo/reverse`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct ReverseResponse {
    /// The queried coordinate, echoed back.
    pub coordinate: Coordinate,
    /// Human-readable display address.
    pub display_name: String,
}

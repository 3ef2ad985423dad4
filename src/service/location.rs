//! Location composition: geocoding, device position, and turning raw
//! filter requests into resolved [`FilterCriteria`].

use std::sync::Arc;

use crate::domain::{Coordinate, DateBucket, FilterCriteria, GeoConstraint};
use crate::error::DiscoveryError;
use crate::geo::{GeoResolver, PositionProvider, ResolvedPlace};

/// Radius applied when a center is given without an explicit radius.
pub const DEFAULT_RADIUS_MILES: f64 = 25.0;

/// An unresolved filter request as it arrives from a client.
///
/// `near` is free text that still needs geocoding; `lat`/`lon` carry a
/// center the client already resolved on-device. The two are mutually
/// exclusive.
#[derive(Debug, Clone, Default)]
pub struct CriteriaRequest {
    /// Category identifiers (stable lowercase form).
    pub categories: Vec<String>,
    /// Free-text search.
    pub search_text: String,
    /// Date bucket identifier (`all` when absent).
    pub date_bucket: Option<String>,
    /// Free-text place to geocode into a center.
    pub near: Option<String>,
    /// Pre-resolved center latitude.
    pub lat: Option<f64>,
    /// Pre-resolved center longitude.
    pub lon: Option<f64>,
    /// Radius in miles; defaults to [`DEFAULT_RADIUS_MILES`] when a
    /// center is present.
    pub radius_miles: Option<f64>,
}

/// Composes the geocoder and the device position provider.
#[derive(Debug)]
pub struct LocationService {
    resolver: Arc<dyn GeoResolver>,
    position: Arc<dyn PositionProvider>,
}

impl LocationService {
    /// Creates the service over the given seams.
    #[must_use]
    pub fn new(resolver: Arc<dyn GeoResolver>, position: Arc<dyn PositionProvider>) -> Self {
        Self { resolver, position }
    }

    /// Geocodes a free-text query.
    ///
    /// An empty or whitespace-only query short-circuits to
    /// [`DiscoveryError::PlaceNotFound`] before the resolver is touched.
    ///
    /// # Errors
    ///
    /// [`DiscoveryError::PlaceNotFound`] or
    /// [`DiscoveryError::GeoResolution`], per the resolver contract.
    pub async fn resolve_query(&self, query: &str) -> Result<ResolvedPlace, DiscoveryError> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(DiscoveryError::PlaceNotFound(query.to_string()));
        }
        self.resolver.geocode(trimmed).await
    }

    /// Reverse-geocodes a coordinate to a display address.
    ///
    /// # Errors
    ///
    /// [`DiscoveryError::GeoResolution`] when the round-trip failed.
    pub async fn describe(&self, coordinate: Coordinate) -> Result<String, DiscoveryError> {
        self.resolver.reverse_geocode(coordinate).await
    }

    /// The "use my current location" flow: device position, then a
    /// best-effort reverse geocode for the text field. A failed reverse
    /// lookup degrades to the raw coordinate display, since the address
    /// text never drives filtering.
    ///
    /// # Errors
    ///
    /// [`DiscoveryError::LocationPermissionDenied`] when the platform
    /// permission is denied; [`DiscoveryError::GeoResolution`] when the
    /// position itself could not be read.
    pub async fn device_place(&self) -> Result<ResolvedPlace, DiscoveryError> {
        let coordinate = self.position.current_position().await?;
        let display_name = match self.resolver.reverse_geocode(coordinate).await {
            Ok(name) => name,
            Err(error) => {
                tracing::warn!(%error, "reverse geocode failed, falling back to raw coordinate");
                coordinate.to_string()
            }
        };
        Ok(ResolvedPlace {
            coordinate,
            display_name,
        })
    }

    /// Resolves a raw request into engine-ready [`FilterCriteria`],
    /// geocoding `near` when present. The returned criteria carry a geo
    /// constraint only when its center resolved successfully.
    ///
    /// # Errors
    ///
    /// Validation errors for unknown categories or buckets and for
    /// conflicting or half-specified centers; geocoding errors from
    /// `near` resolution.
    pub async fn resolve_criteria(
        &self,
        request: &CriteriaRequest,
    ) -> Result<FilterCriteria, DiscoveryError> {
        let mut categories = std::collections::HashSet::new();
        for raw in &request.categories {
            let identifier = raw.trim();
            if identifier.is_empty() {
                continue;
            }
            let Some(category) = crate::domain::EventCategory::parse(identifier) else {
                return Err(DiscoveryError::InvalidCategory(identifier.to_string()));
            };
            categories.insert(category);
        }

        let date_bucket = match request.date_bucket.as_deref() {
            None | Some("") => DateBucket::All,
            Some(raw) => DateBucket::parse(raw)
                .ok_or_else(|| DiscoveryError::InvalidDateBucket(raw.to_string()))?,
        };

        let center = match (&request.near, request.lat, request.lon) {
            (Some(near), None, None) if !near.trim().is_empty() => {
                Some(self.resolve_query(near).await?.coordinate)
            }
            (Some(near), _, _) if !near.trim().is_empty() => {
                return Err(DiscoveryError::InvalidRequest(
                    "near and lat/lon are mutually exclusive".to_string(),
                ));
            }
            (_, Some(lat), Some(lon)) => Some(Coordinate::new(lat, lon)),
            (_, None, None) => None,
            (_, _, _) => {
                return Err(DiscoveryError::InvalidRequest(
                    "lat and lon must be given together".to_string(),
                ));
            }
        };

        Ok(FilterCriteria {
            categories,
            search_text: request.search_text.trim().to_string(),
            date_bucket,
            geo: center.map(|center| GeoConstraint {
                center,
                radius_miles: request.radius_miles.unwrap_or(DEFAULT_RADIUS_MILES),
            }),
        })
    }
}

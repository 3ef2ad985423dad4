//! Geocoding and device position seams.
//!
//! [`GeoResolver`] and [`PositionProvider`] are the trait boundaries to
//! the external geocoding service and the platform location permission.
//! The hosted binary wires in [`crate::geo::NominatimResolver`] and one
//! of the position providers below; embedders and tests supply their own.

use std::fmt;

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::Coordinate;
use crate::error::DiscoveryError;

/// A successfully geocoded place.
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct ResolvedPlace {
    /// Best-matching coordinate for the query.
    pub coordinate: Coordinate,
    /// Human-readable display name of the match.
    pub display_name: String,
}

/// Resolves free text to coordinates and coordinates back to text.
///
/// # Contract
///
/// - `geocode` returns [`DiscoveryError::PlaceNotFound`] when the query
///   matched nothing and [`DiscoveryError::GeoResolution`] on network or
///   malformed-response failures; callers choose different messaging for
///   the two ("no such place" vs "couldn't check").
/// - An empty or whitespace-only query must yield `PlaceNotFound`
///   without issuing any external call.
/// - `reverse_geocode` is only ever used to populate a text field after
///   "use my current location"; it never drives filtering.
#[async_trait]
pub trait GeoResolver: fmt::Debug + Send + Sync {
    /// Resolves a free-text location query to its best-matching place.
    ///
    /// # Errors
    ///
    /// [`DiscoveryError::PlaceNotFound`] when nothing matched;
    /// [`DiscoveryError::GeoResolution`] when the round-trip failed.
    async fn geocode(&self, query: &str) -> Result<ResolvedPlace, DiscoveryError>;

    /// Resolves a coordinate to a human-readable address.
    ///
    /// # Errors
    ///
    /// [`DiscoveryError::GeoResolution`] when the round-trip failed.
    async fn reverse_geocode(&self, coordinate: Coordinate) -> Result<String, DiscoveryError>;
}

/// Reports the device's current position.
#[async_trait]
pub trait PositionProvider: fmt::Debug + Send + Sync {
    /// Returns the current position.
    ///
    /// # Errors
    ///
    /// [`DiscoveryError::LocationPermissionDenied`] when the platform
    /// permission is denied (the caller directs the user to manual
    /// address entry); [`DiscoveryError::GeoResolution`] for other
    /// failures.
    async fn current_position(&self) -> Result<Coordinate, DiscoveryError>;
}

/// A position provider pinned to a configured coordinate.
///
/// Used for kiosk deployments where the "device" has a known fixed
/// location (`DEVICE_POSITION` in the environment).
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(Coordinate);

impl FixedPosition {
    /// Creates a provider that always reports `coordinate`.
    #[must_use]
    pub const fn new(coordinate: Coordinate) -> Self {
        Self(coordinate)
    }
}

#[async_trait]
impl PositionProvider for FixedPosition {
    async fn current_position(&self) -> Result<Coordinate, DiscoveryError> {
        Ok(self.0)
    }
}

/// A position provider that always reports permission denied.
///
/// The hosted binary's default: a server has no GPS, so clients resolve
/// their own position on-device and send `lat`/`lon` explicitly.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeniedPosition;

#[async_trait]
impl PositionProvider for DeniedPosition {
    async fn current_position(&self) -> Result<Coordinate, DiscoveryError> {
        Err(DiscoveryError::LocationPermissionDenied)
    }
}

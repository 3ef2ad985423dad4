//! Geographic coordinate value type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in decimal degrees.
///
/// Plain value type shared by events, filter criteria, and the geocoding
/// layer. Distance math lives in [`crate::geo::distance`]; this type carries
/// no behavior beyond construction and display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Coordinate {
    /// Latitude in decimal degrees (positive = north).
    pub latitude: f64,
    /// Longitude in decimal degrees (positive = east).
    pub longitude: f64,
}

impl Coordinate {
    /// Creates a coordinate from decimal degrees.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4},{:.4}", self.latitude, self.longitude)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_four_decimal_places() {
        let c = Coordinate::new(34.0522, -118.2437);
        assert_eq!(format!("{c}"), "34.0522,-118.2437");
    }

    #[test]
    fn serde_round_trip() {
        let c = Coordinate::new(51.5, -0.12);
        let json = serde_json::to_string(&c).ok();
        let Some(json) = json else {
            panic!("serialization failed");
        };
        let back: Option<Coordinate> = serde_json::from_str(&json).ok();
        assert_eq!(back, Some(c));
    }
}

//! Great-circle distance between coordinates.

use crate::domain::Coordinate;

/// Mean Earth radius in miles used by the haversine formula.
pub const EARTH_RADIUS_MILES: f64 = 3959.0;

/// Great-circle (haversine) distance between two coordinates, in miles.
///
/// Pure function: symmetric in its arguments and zero for equal points.
/// The radius gate in the filter pipeline compares this value against the
/// criteria's radius; nothing in discovery ever sorts by it.
#[must_use]
pub fn distance_miles(a: Coordinate, b: Coordinate) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_MILES * h.sqrt().asin()
}

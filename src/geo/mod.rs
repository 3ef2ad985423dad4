//! Geospatial layer: distance math, geocoding seams, and the Nominatim
//! HTTP resolver.

pub mod distance;
pub mod nominatim;
pub mod resolver;

pub use nominatim::NominatimResolver;
pub use resolver::{DeniedPosition, FixedPosition, GeoResolver, PositionProvider, ResolvedPlace};

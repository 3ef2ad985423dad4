//! Nominatim-style HTTP geocoder.
//!
//! Talks to a public Nominatim deployment (`/search` and `/reverse` with
//! `format=jsonv2`). Public instances are rate-limited and require a
//! descriptive User-Agent, so the client is built once with the
//! configured agent and short timeouts. No API key is managed here.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::resolver::{GeoResolver, ResolvedPlace};
use crate::domain::Coordinate;
use crate::error::DiscoveryError;

/// One candidate row from the Nominatim search/reverse endpoints.
///
/// Coordinates arrive as decimal strings in `jsonv2`.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: String,
}

/// HTTP implementation of [`GeoResolver`] against a Nominatim endpoint.
#[derive(Debug, Clone)]
pub struct NominatimResolver {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimResolver {
    /// Builds the resolver with its dedicated HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::Internal`] if the underlying client
    /// cannot be constructed.
    pub fn new(
        base_url: impl Into<String>,
        user_agent: &str,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self, DiscoveryError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| DiscoveryError::Internal(format!("geocoder client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, DiscoveryError> {
        let url = format!("{}{path}", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| DiscoveryError::GeoResolution(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DiscoveryError::GeoResolution(format!(
                "geocoder returned {status}"
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| DiscoveryError::GeoResolution(format!("malformed response: {e}")))
    }
}

fn parse_place(place: &NominatimPlace) -> Result<ResolvedPlace, DiscoveryError> {
    let latitude: f64 = place
        .lat
        .parse()
        .map_err(|_| DiscoveryError::GeoResolution(format!("bad latitude: {}", place.lat)))?;
    let longitude: f64 = place
        .lon
        .parse()
        .map_err(|_| DiscoveryError::GeoResolution(format!("bad longitude: {}", place.lon)))?;

    Ok(ResolvedPlace {
        coordinate: Coordinate::new(latitude, longitude),
        display_name: place.display_name.clone(),
    })
}

#[async_trait]
impl GeoResolver for NominatimResolver {
    async fn geocode(&self, query: &str) -> Result<ResolvedPlace, DiscoveryError> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            // Contract: no external call for empty input.
            return Err(DiscoveryError::PlaceNotFound(query.to_string()));
        }

        let candidates: Vec<NominatimPlace> = self
            .get_json("/search", &[("q", trimmed), ("format", "jsonv2"), ("limit", "1")])
            .await?;

        let Some(best) = candidates.first() else {
            return Err(DiscoveryError::PlaceNotFound(trimmed.to_string()));
        };

        let place = parse_place(best)?;
        tracing::debug!(query = trimmed, coordinate = %place.coordinate, "geocoded");
        Ok(place)
    }

    async fn reverse_geocode(&self, coordinate: Coordinate) -> Result<String, DiscoveryError> {
        let lat = coordinate.latitude.to_string();
        let lon = coordinate.longitude.to_string();
        let place: NominatimPlace = self
            .get_json(
                "/reverse",
                &[("lat", lat.as_str()), ("lon", lon.as_str()), ("format", "jsonv2")],
            )
            .await?;

        Ok(place.display_name)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn make_resolver() -> NominatimResolver {
        let resolver = NominatimResolver::new(
            "http://127.0.0.1:9", // discard port: any dial fails fast
            "uplift-discovery-tests",
            Duration::from_millis(250),
            Duration::from_millis(250),
        );
        let Ok(resolver) = resolver else {
            panic!("client construction failed");
        };
        resolver
    }

    #[tokio::test]
    async fn empty_query_is_not_found_without_network() {
        // The base URL is unreachable; a network attempt would surface as
        // GeoResolution, so PlaceNotFound proves no call was made.
        let resolver = make_resolver();
        let result = resolver.geocode("   ").await;
        let Err(DiscoveryError::PlaceNotFound(_)) = result else {
            panic!("expected PlaceNotFound, got {result:?}");
        };
    }

    #[tokio::test]
    async fn unreachable_upstream_is_resolution_error() {
        let resolver = make_resolver();
        let result = resolver.geocode("Los Angeles").await;
        let Err(DiscoveryError::GeoResolution(_)) = result else {
            panic!("expected GeoResolution, got {result:?}");
        };
    }

    #[test]
    fn candidate_coordinates_parse_from_strings() {
        let place = NominatimPlace {
            lat: "34.0522".to_string(),
            lon: "-118.2437".to_string(),
            display_name: "Los Angeles, California".to_string(),
        };
        let resolved = parse_place(&place).ok();
        let Some(resolved) = resolved else {
            panic!("expected parse to succeed");
        };
        assert_eq!(resolved.coordinate, Coordinate::new(34.0522, -118.2437));
        assert_eq!(resolved.display_name, "Los Angeles, California");
    }

    #[test]
    fn garbage_coordinates_are_resolution_errors() {
        let place = NominatimPlace {
            lat: "north-ish".to_string(),
            lon: "-118.2437".to_string(),
            display_name: "??".to_string(),
        };
        let Err(DiscoveryError::GeoResolution(_)) = parse_place(&place) else {
            panic!("expected GeoResolution");
        };
    }
}

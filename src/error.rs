//! Discovery error types with HTTP status code mapping.
//!
//! [`DiscoveryError`] is the central error type for the service. Each
//! variant maps to a specific HTTP status code and structured JSON error
//! response. Nothing in this taxonomy is fatal: every error is recovered
//! at the boundary of the operation that raised it and surfaced as
//! transient client-visible state.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::domain::EventId;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2002,
///     "message": "no place found for query: ZZZZNOWHERE123",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges below).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category         | HTTP Status                |
/// |-----------|------------------|----------------------------|
/// | 1000–1999 | Validation       | 400 Bad Request            |
/// | 2000–2999 | Not Found        | 404 Not Found              |
/// | 3000–3999 | Server           | 500 Internal Server Error  |
/// | 4000–4999 | Geo-Specific     | 502 Bad Gateway / 403 Forbidden |
///
/// `PlaceNotFound` and `GeoResolution` are deliberately distinct variants:
/// "no such place" and "couldn't check" call for different client
/// messaging, and only the latter is worth a retry.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Unknown category identifier in a filter request.
    #[error("invalid category: {0}")]
    InvalidCategory(String),

    /// Unknown date bucket identifier in a filter request.
    #[error("invalid date bucket: {0}")]
    InvalidDateBucket(String),

    /// Event with the given id was not found in the catalog.
    #[error("event not found: {0}")]
    EventNotFound(EventId),

    /// Geocoding completed but matched nothing.
    #[error("no place found for query: {0}")]
    PlaceNotFound(String),

    /// Durable saved-event store failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Geocoding round-trip failed (network, upstream, or malformed
    /// response). Distinct from [`Self::PlaceNotFound`].
    #[error("geocoding failed: {0}")]
    GeoResolution(String),

    /// Device location permission was denied.
    #[error("location permission denied")]
    LocationPermissionDenied,

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DiscoveryError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::InvalidCategory(_) => 1002,
            Self::InvalidDateBucket(_) => 1003,
            Self::EventNotFound(_) => 2001,
            Self::PlaceNotFound(_) => 2002,
            Self::PersistenceError(_) => 3001,
            Self::Internal(_) => 3000,
            Self::GeoResolution(_) => 4001,
            Self::LocationPermissionDenied => 4002,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::InvalidCategory(_) | Self::InvalidDateBucket(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::EventNotFound(_) | Self::PlaceNotFound(_) => StatusCode::NOT_FOUND,
            Self::PersistenceError(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::GeoResolution(_) => StatusCode::BAD_GATEWAY,
            Self::LocationPermissionDenied => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for DiscoveryError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

//! # uplift-discovery
//!
//! Event discovery, geospatial filtering, and saved-event
//! synchronization for the Uplift volunteer app.
//!
//! The core is the filter pipeline in [`engine`] (status, category,
//! text, and date-bucket gates, a stable date sort, and a geodesic
//! radius gate) plus the optimistic [`service::SavedEventStore`] and the
//! swipe [`service::TriageController`]. The binary wraps the core in an
//! Axum HTTP/WebSocket server; the library modules are UI-agnostic and
//! every external collaborator (event source, saved-event store,
//! geocoder, device position) is a trait seam.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── Triage Sessions (ws/)
//!     │
//!     ├── DiscoveryService / SavedEventStore / LocationService (service/)
//!     ├── FilterEngine (engine/), distance + geocoding (geo/)
//!     │
//!     ├── EventCatalog, ChangeFeed (domain/)
//!     │
//!     └── PostgreSQL + Nominatim (persistence/, geo/nominatim)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod geo;
pub mod persistence;
pub mod service;
pub mod ws;

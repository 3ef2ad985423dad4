//! uplift-discovery server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints,
//! backed by PostgreSQL for events and Nominatim for geocoding.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use uplift_discovery::api;
use uplift_discovery::app_state::AppState;
use uplift_discovery::config::DiscoveryConfig;
use uplift_discovery::domain::{ChangeFeed, EventCatalog};
use uplift_discovery::geo::{DeniedPosition, FixedPosition, NominatimResolver, PositionProvider};
use uplift_discovery::persistence::{PostgresEventSource, PostgresSavedEvents};
use uplift_discovery::service::{DiscoveryService, LocationService, SavedEventStore};
use uplift_discovery::ws::handler::ws_handler;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = DiscoveryConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting uplift-discovery");

    // Database pool and migrations
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .min_connections(config.database_min_connections)
        .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    // Build domain layer
    let catalog = Arc::new(EventCatalog::new());
    let feed = ChangeFeed::new(config.change_feed_capacity);

    // Build service layer
    let source = Arc::new(PostgresEventSource::new(pool.clone()));
    let discovery = Arc::new(DiscoveryService::new(catalog.clone(), source));
    let saved = Arc::new(SavedEventStore::new(
        Arc::new(PostgresSavedEvents::new(pool)),
        catalog,
        feed.clone(),
    ));

    let resolver = Arc::new(NominatimResolver::new(
        config.geocoder_base_url.clone(),
        &config.geocoder_user_agent,
        Duration::from_secs(config.geocoder_timeout_secs),
        Duration::from_secs(config.geocoder_connect_timeout_secs),
    )?);
    let position: Arc<dyn PositionProvider> = match config.device_position {
        Some(coordinate) => Arc::new(FixedPosition::new(coordinate)),
        None => Arc::new(DeniedPosition),
    };
    let location = Arc::new(LocationService::new(resolver, position));

    // Initial catalog load, then periodic refreshes
    let loaded = discovery.refresh().await?;
    tracing::info!(events = loaded, "event catalog loaded");

    let refresher = discovery.clone();
    let refresh_secs = config.catalog_refresh_secs;
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(refresh_secs));
        ticker.tick().await; // first tick fires immediately
        loop {
            ticker.tick().await;
            if let Err(error) = refresher.refresh().await {
                tracing::warn!(%error, "catalog refresh failed");
            }
        }
    });

    // Build application state
    let app_state = AppState {
        discovery,
        saved,
        location,
        feed,
    };

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

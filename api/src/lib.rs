//! Poster board backend: poster metadata in a key-value store, images and
//! generated search-index files in an object store, and the derived
//! per-category page index kept in sync on every write.

pub mod auth;
pub mod cache;
pub mod config;
pub mod dto;
pub mod errors;
pub mod exports;
pub mod extract;
pub mod maintenance;
pub mod models;
pub mod repository;
pub mod routes;
pub mod search;
pub mod search_index;
pub mod states;
pub mod storage;
pub mod urls;

pub use states::AppState;

use axum::{
    Router,
    http::{HeaderValue, StatusCode},
    routing::get,
};
use config::Config;
use errors::StartupError;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

/// Opens storage, builds the shared state and, when configured, rebuilds
/// the derived indices from the stored records.
pub async fn bootstrap(config: Config) -> Result<AppState, StartupError> {
    let (kv, objects) = storage::open_backends(&config).await?;
    let state = AppState::new(config, kv, objects)?;

    if state.config.rebuild_on_startup {
        info!("Rebuilding derived indices...");
        let report = maintenance::rebuild(&state).await?;
        info!(
            "Indices ready: {} posters, {} search-index files",
            report.export.total_posters,
            report.search_index.files.len()
        );
    }

    Ok(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if allowed.is_empty() {
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(AllowOrigin::list(allowed))
    }
}

/// The full application: routes, state and middleware.
pub fn build_router(state: AppState) -> Router {
    let config = state.config.clone();

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", routes::api_routes(config.max_upload_bytes))
        .with_state(state)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.request_timeout,
        ))
        .layer(ConcurrencyLimitLayer::new(config.max_concurrent_requests.max(1)))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.cors_origins))
}

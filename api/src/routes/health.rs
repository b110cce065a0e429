use crate::{AppState, dto::HealthResponse};
use axum::{Json, extract::State};
use chrono::Utc;
use tracing::warn;

/// GET /health
/// Response: 200 OK with JSON. `status` is "degraded" when the poster store
/// cannot be read.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let posters = match state.posters.list_all().await {
        Ok(posters) => Some(posters.len()),
        Err(e) => {
            warn!("Health check could not read posters: {}", e);
            None
        }
    };

    Json(HealthResponse {
        status: if posters.is_some() { "healthy" } else { "degraded" },
        timestamp: Utc::now().timestamp(),
        storage: state.config.storage_backend.as_str(),
        posters,
    })
}

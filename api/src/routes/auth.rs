use crate::{
    AppState,
    auth::{ADMIN_SUBJECT, TOKEN_TTL_HOURS, create_token, verify_admin_password},
    dto::{LoginRequest, LoginResponse},
    errors::ApiError,
    extract::ApiJson,
};
use axum::{Json, extract::State};
use tracing::{info, warn};
use validator::Validate;

/// POST /api/admin/login
/// Body: { "password": "..." }
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if state.login_limiter.check().is_err() {
        warn!("Admin login rate limit hit");
        return Err(ApiError::TooManyRequests);
    }

    payload
        .validate()
        .map_err(|e| ApiError::ValidationError(e.to_string()))?;

    if !verify_admin_password(&payload.password, &state.admin_password_hash)? {
        warn!("Rejected admin login");
        return Err(ApiError::InvalidCredentials);
    }

    let token = create_token(ADMIN_SUBJECT, &state.jwt_secret)?;

    info!("Admin logged in");

    Ok(Json(LoginResponse {
        token,
        expires_in: TOKEN_TTL_HOURS * 3600,
    }))
}

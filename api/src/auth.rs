use crate::{config::AdminSecret, errors::ApiError};
use axum::http::{HeaderMap, header};
use bcrypt::{BcryptError, DEFAULT_COST, hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

pub const ADMIN_SUBJECT: &str = "admin";
pub const TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

/// Resolves the configured admin secret to a bcrypt hash.
pub fn admin_password_hash(secret: &AdminSecret) -> Result<String, BcryptError> {
    match secret {
        AdminSecret::Hash(existing) => Ok(existing.clone()),
        AdminSecret::Plain(password) => hash(password, DEFAULT_COST),
    }
}

pub fn verify_admin_password(password: &str, password_hash: &str) -> Result<bool, ApiError> {
    verify(password, password_hash)
        .map_err(|e| ApiError::InternalError(format!("Password verification failed: {}", e)))
}

pub fn create_token(subject: &str, secret: &str) -> Result<String, ApiError> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(TOKEN_TTL_HOURS))
        .ok_or_else(|| ApiError::InternalError("Failed to calculate expiration".into()))?
        .timestamp() as usize;

    let claims = Claims {
        sub: subject.to_string(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::InternalError(format!("Token Creation failed: {}", e)))
}

pub fn validate_token(headers: &HeaderMap, secret: &str) -> Result<Claims, ApiError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(ApiError::Unauthorized)?;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| ApiError::Unauthorized)
}

/// Rejects the request unless it carries a valid admin token.
pub fn require_admin(headers: &HeaderMap, secret: &str) -> Result<(), ApiError> {
    let claims = validate_token(headers, secret)?;
    if claims.sub != ADMIN_SUBJECT {
        return Err(ApiError::Unauthorized);
    }
    Ok(())
}

//! Login and logout.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::auth::TOKEN_TTL_HOURS;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Bearer token for subsequent requests.
    pub token: String,
    /// Seconds until the token expires.
    pub expires_in: i64,
}

pub async fn login(
    State(ctx): State<ApiContext>,
    headers: HeaderMap,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let source = throttle_source(&headers);
    let token = ctx.core.auth.login(&source, &body.username, &body.password)?;

    Ok(Json(LoginResponse {
        token,
        expires_in: TOKEN_TTL_HOURS * 3600,
    }))
}

pub async fn logout(State(ctx): State<ApiContext>) -> StatusCode {
    ctx.core.auth.logout();
    StatusCode::NO_CONTENT
}

/// Throttle key for the caller: the forwarded client address when a
/// reverse proxy provides one, else a single local bucket.
fn throttle_source(headers: &HeaderMap) -> String {
    headers
        .get("X-Forwarded-For")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "local".to_string())
}

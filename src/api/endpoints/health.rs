//! Liveness endpoint. Unauthenticated.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::types::ApiContext;
use crate::config;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Whether a live session exists. Lets the front-end skip the login
    /// screen on reload.
    pub authenticated: bool,
}

pub async fn check(State(ctx): State<ApiContext>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: config::APP_VERSION,
        authenticated: ctx.core.auth.is_authenticated(),
    })
}

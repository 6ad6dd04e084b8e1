//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::analysis::AnalysisError;
use crate::auth::AuthError;
use crate::documents::RegistryError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Authentication required")]
    Unauthorized,
    #[error("Session expired")]
    SessionExpired,
    #[error("Invalid credentials")]
    InvalidCredentials { remaining: u32 },
    #[error("Too many attempts")]
    Blocked { minutes: i64 },
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Document limit reached")]
    DocumentLimit,
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "AUTH_REQUIRED",
                "Authentication required".to_string(),
            ),
            ApiError::SessionExpired => (
                StatusCode::UNAUTHORIZED,
                "SESSION_EXPIRED",
                "Session expired, sign in again".to_string(),
            ),
            ApiError::InvalidCredentials { remaining } => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                format!("Invalid credentials. {remaining} attempts remaining."),
            ),
            ApiError::Blocked { minutes } => (
                StatusCode::TOO_MANY_REQUESTS,
                "TOO_MANY_ATTEMPTS",
                format!("Too many attempts. Try again in {minutes} minutes."),
            ),
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "NOT_FOUND", detail.clone()),
            ApiError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail.clone())
            }
            ApiError::DocumentLimit => (
                StatusCode::CONFLICT,
                "DOCUMENT_LIMIT",
                RegistryError::Full.to_string(),
            ),
            ApiError::Analysis(e) => (analysis_status(e), e.code(), e.to_string()),
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };

        let mut response = (status, Json(body)).into_response();
        // Blocked responses carry a Retry-After hint.
        if let ApiError::Blocked { minutes } = &self {
            let seconds = minutes.saturating_mul(60);
            if let Ok(val) = axum::http::HeaderValue::from_str(&seconds.to_string()) {
                response.headers_mut().insert("Retry-After", val);
            }
        }
        response
    }
}

/// Upstream failures map onto gateway statuses; a job-embedded failure is
/// this document's problem, not the gateway's.
fn analysis_status(error: &AnalysisError) -> StatusCode {
    match error {
        AnalysisError::Connectivity
        | AnalysisError::RequestFailed { .. }
        | AnalysisError::MissingTaskId
        | AnalysisError::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
        AnalysisError::AnalysisFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AnalysisError::TimedOut => StatusCode::GATEWAY_TIMEOUT,
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials { remaining } => {
                ApiError::InvalidCredentials { remaining }
            }
            AuthError::Blocked { minutes } => ApiError::Blocked { minutes },
            AuthError::TokenInvalid => ApiError::Unauthorized,
            AuthError::TokenExpired => ApiError::SessionExpired,
            AuthError::Crypto | AuthError::LockPoisoned => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::Full => ApiError::DocumentLimit,
            RegistryError::NotFound(id) => ApiError::NotFound(format!("Document not found: {id}")),
            RegistryError::LockPoisoned => ApiError::Internal(err.to_string()),
        }
    }
}

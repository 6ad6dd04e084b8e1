//! Result proxy.

use axum::extract::State;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;

/// `GET /api/kid-json` — the latest finalized structured document from
/// the analysis service. A pure pass-through read: no polling, no retry,
/// no caching; the upstream serves whatever analysis finished last.
pub async fn kid_json(State(ctx): State<ApiContext>) -> Result<Json<serde_json::Value>, ApiError> {
    let value = ctx.core.analysis.fetch_result().await?;
    Ok(Json(value))
}

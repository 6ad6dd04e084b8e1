//! API router.
//!
//! Routes live under `/api/`. Login and health are open; everything else
//! goes through the bearer-token middleware. `Extension` carries the
//! `ApiContext` into middleware, `State` carries it into handlers.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue};
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Upload cap. KIDs run a few pages; annual reports can be large.
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Build the API router.
pub fn api_router(core: Arc<CoreState>) -> Router {
    build_router(ApiContext::new(core))
}

fn build_router(ctx: ApiContext) -> Router {
    // Protected routes — bearer token required.
    //
    // Layers run outermost-last: Extension must be the outermost layer so
    // the auth middleware can extract ApiContext.
    let protected = Router::new()
        .route(
            "/documents",
            post(endpoints::documents::upload).get(endpoints::documents::list),
        )
        .route("/documents/:id", delete(endpoints::documents::remove))
        .route("/documents/:id/file", get(endpoints::documents::raw_file))
        .route(
            "/documents/:id/analysis",
            get(endpoints::documents::analysis_state),
        )
        .route("/documents/:id/result", get(endpoints::documents::result))
        .route("/kid-json", get(endpoints::results::kid_json))
        .route("/auth/logout", post(endpoints::auth::logout))
        .with_state(ctx.clone())
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(axum::middleware::from_fn(middleware::auth::require_auth))
        .layer(axum::Extension(ctx.clone()));

    // Unprotected routes.
    let unprotected = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/auth/login", post(endpoints::auth::login))
        .with_state(ctx);

    Router::new()
        .nest("/api", protected)
        .nest("/api", unprotected)
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        // The SPA is served from its own origin during development.
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

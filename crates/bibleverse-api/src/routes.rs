//! API Routes

use axum::{
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::handlers;
use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Routes under `/api`
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/get-verse",
            post(handlers::verse::get_verse)
                .options(handlers::verse::preflight)
                .fallback(handlers::verse::method_not_allowed),
        )
        .route("/situations", get(handlers::situations::list_situations))
}

/// OpenAPI document
pub fn openapi_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
}

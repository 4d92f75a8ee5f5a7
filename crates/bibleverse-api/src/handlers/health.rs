//! Health Check Handlers

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::dto::HealthResponse;
use crate::state::AppState;

/// Health check endpoint
///
/// Reports liveness only: 200 while the process is running. A missing API
/// key shows up in `provider_configured`; verse requests fail with 500 until
/// it is set.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        provider: state.llm.kind().to_string(),
        provider_configured: state.llm.is_configured(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

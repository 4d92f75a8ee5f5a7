//! Preset situation listing for the UI

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::dto::SituationsResponse;
use crate::state::AppState;

/// List preset situations in display order
#[utoipa::path(
    get,
    path = "/api/situations",
    tag = "Verse",
    responses(
        (status = 200, description = "Preset situations", body = SituationsResponse)
    )
)]
pub async fn list_situations(State(state): State<Arc<AppState>>) -> Json<SituationsResponse> {
    Json(SituationsResponse {
        situations: state.catalog.all().to_vec(),
    })
}

//! Health check endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use super::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub cached_carts: usize,
}

/// GET /health: returns service health status.
///
/// Reports `not_ready` if the cart service is missing a collaborator.
pub async fn check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let status = if state.service.is_ready() {
        "ok"
    } else {
        "not_ready"
    };
    Json(HealthResponse {
        status,
        cached_carts: state.cache.len(),
    })
}

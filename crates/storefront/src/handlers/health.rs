//! Health endpoint.

use axum::{extract::State, Json};
use serde_json::json;

use crate::state::AppState;

/// GET /health - liveness for load balancers; reports the active cache
/// backend but performs no active checks.
pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "cache_backend": state.cache_backend,
    }))
}

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Reports overall engine status plus per-source availability
/// (ok | throttled | unavailable).
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let (status, sources) = state.engine.health_snapshot();
    Json(json!({
        "status": status,
        "sources": sources,
    }))
}

pub mod health;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tokio_util::sync::CancellationToken;

use crate::errors::EngineError;
use crate::models::job::{JobResult, JobSpec};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/source-candidates", post(handle_source_candidates))
        .with_state(state)
}

/// POST /source-candidates
///
/// Runs one sourcing job synchronously. Returns 200 with the JobResult
/// (including any partial failures), 400 on a malformed JobSpec, 503 when
/// the engine cannot accept new work.
async fn handle_source_candidates(
    State(state): State<AppState>,
    Json(spec): Json<JobSpec>,
) -> Result<Json<JobResult>, EngineError> {
    let result = state.engine.run_job(spec, CancellationToken::new()).await?;
    Ok(Json(result))
}

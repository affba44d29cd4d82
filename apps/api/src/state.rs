use std::sync::Arc;

use crate::config::Config;
use crate::pipeline::SourcingEngine;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SourcingEngine>,
    pub config: Config,
}

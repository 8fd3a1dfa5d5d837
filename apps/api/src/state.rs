use std::sync::Arc;

use crate::config::Config;
use crate::judge::Judge;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The evaluation capability. Constructed once at startup and injected so
    /// tests can substitute a stub.
    pub judge: Arc<dyn Judge>,
    pub config: Config,
}

use std::sync::Arc;

use crate::config::Config;
use crate::screening::scorer::CandidateScorer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Scoring oracle behind a trait object so tests can swap in mocks.
    pub scorer: Arc<dyn CandidateScorer>,
}

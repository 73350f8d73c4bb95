use std::sync::Arc;

use crate::catalog::store::CatalogStore;
use crate::config::Config;
use crate::evaluation::batch::BatchEvaluator;
use crate::evaluation::gateway::ExtractionGateway;
use crate::evaluation::orchestrator::Evaluator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub catalog: Arc<dyn CatalogStore>,
    pub extractor: Arc<dyn ExtractionGateway>,
    /// Owns the scoring semaphore shared by every request.
    pub evaluator: Arc<Evaluator>,
    pub batch: Arc<BatchEvaluator>,
}

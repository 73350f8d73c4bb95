mod auth;
mod catalog;
mod config;
mod db;
mod errors;
mod evaluation;
mod llm_client;
mod models;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::catalog::store::PgCatalogStore;
use crate::config::Config;
use crate::db::create_pool;
use crate::evaluation::batch::BatchEvaluator;
use crate::evaluation::gateway::{LlmExtractionGateway, LlmScoringGateway};
use crate::evaluation::orchestrator::Evaluator;
use crate::evaluation::store::PgEvaluationStore;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Config first: the log filter depends on it
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Ranker API v{}", env!("CARGO_PKG_VERSION"));

    let db = create_pool(&config.database_url, config.database_max_connections).await?;

    let llm = LlmClient::new(config.anthropic_api_key.clone(), config.collaborator_timeout)?;
    info!(model = llm_client::MODEL, "LLM client initialized");

    let catalog = Arc::new(PgCatalogStore::new(db.clone()));
    let evaluator = Arc::new(Evaluator::new(
        Arc::new(PgEvaluationStore::new(db)),
        Arc::new(LlmScoringGateway(llm.clone())),
        config.scoring_concurrency,
        config.collaborator_timeout,
    ));
    let batch = Arc::new(BatchEvaluator::new(
        evaluator.clone(),
        catalog.clone(),
        config.max_batch_size,
    ));
    info!(
        scoring_concurrency = config.scoring_concurrency,
        max_batch_size = config.max_batch_size,
        timeout_secs = config.collaborator_timeout.as_secs(),
        "Evaluation engine ready"
    );

    let state = AppState {
        config: config.clone(),
        catalog,
        extractor: Arc::new(LlmExtractionGateway(llm)),
        evaluator,
        batch,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the frontend host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

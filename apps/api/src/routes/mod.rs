pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::catalog::handlers as catalog;
use crate::evaluation::handlers as evaluation;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Catalog
        .route(
            "/resumes",
            post(catalog::handle_create_resume).get(catalog::handle_list_resumes),
        )
        .route(
            "/jobs",
            post(catalog::handle_create_job).get(catalog::handle_list_jobs),
        )
        // Evaluation
        .route(
            "/evaluations",
            post(evaluation::handle_evaluate).get(evaluation::handle_list_evaluations),
        )
        .route(
            "/batch-evaluate",
            post(evaluation::handle_batch_evaluate).get(evaluation::handle_job_ranking),
        )
        .with_state(state)
}

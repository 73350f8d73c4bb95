//! Axum route handlers for single-pair and batch evaluation.

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Owner;
use crate::errors::AppError;
use crate::evaluation::batch::{BatchFailure, BatchSuccess, BatchSummary, JobRanking};
use crate::evaluation::ranking::match_label;
use crate::evaluation::store::EvaluationFilter;
use crate::models::evaluation::{EvaluationResult, EvaluationRow};
use crate::models::page::Page;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateRequest {
    pub resume_id: Uuid,
    pub job_id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateResponse {
    pub success: bool,
    pub evaluation: EvaluationRow,
    pub result: EvaluationResult,
    pub was_cached: bool,
    pub match_label: &'static str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationListQuery {
    pub resume_id: Option<Uuid>,
    pub job_id: Option<Uuid>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl From<EvaluationListQuery> for EvaluationFilter {
    fn from(query: EvaluationListQuery) -> Self {
        Self {
            resume_id: query.resume_id,
            job_id: query.job_id,
            page: Page::new(query.limit, query.offset),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EvaluationListResponse {
    pub evaluations: Vec<EvaluationRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    pub resume_ids: Vec<Uuid>,
    pub job_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub success: bool,
    pub evaluations: Vec<BatchSuccess>,
    pub errors: Vec<BatchFailure>,
    pub summary: BatchSummary,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRankingQuery {
    pub job_id: Uuid,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /evaluations
pub async fn handle_evaluate(
    State(state): State<AppState>,
    Owner(owner_id): Owner,
    payload: Result<Json<EvaluateRequest>, JsonRejection>,
) -> Result<Json<EvaluateResponse>, AppError> {
    let Json(request) = payload?;

    let resume = state
        .catalog
        .find_resume(request.resume_id, &owner_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Resume not found".to_string()))?;
    let job = state
        .catalog
        .find_job(request.job_id, &owner_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;

    let evaluated = state.evaluator.evaluate_one(&owner_id, &resume, &job).await?;

    Ok(Json(EvaluateResponse {
        success: true,
        result: EvaluationResult::from(&evaluated.record),
        match_label: match_label(evaluated.record.overall_score),
        evaluation: evaluated.record,
        was_cached: evaluated.was_cached,
    }))
}

/// GET /evaluations
pub async fn handle_list_evaluations(
    State(state): State<AppState>,
    Owner(owner_id): Owner,
    query: Result<Query<EvaluationListQuery>, QueryRejection>,
) -> Result<Json<EvaluationListResponse>, AppError> {
    let Query(query) = query?;
    let evaluations = state
        .evaluator
        .store()
        .list_by_filter(&owner_id, query.into())
        .await?;
    Ok(Json(EvaluationListResponse { evaluations }))
}

/// POST /batch-evaluate
///
/// Always 200 once the batch starts; per-resume failures land in `errors`.
pub async fn handle_batch_evaluate(
    State(state): State<AppState>,
    Owner(owner_id): Owner,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> Result<Json<BatchResponse>, AppError> {
    let Json(request) = payload?;
    let result = state
        .batch
        .evaluate_batch(&owner_id, request.job_id, &request.resume_ids)
        .await?;
    Ok(Json(BatchResponse {
        success: true,
        evaluations: result.evaluations,
        errors: result.errors,
        summary: result.summary,
    }))
}

/// GET /batch-evaluate?jobId=
pub async fn handle_job_ranking(
    State(state): State<AppState>,
    Owner(owner_id): Owner,
    query: Result<Query<JobRankingQuery>, QueryRejection>,
) -> Result<Json<JobRanking>, AppError> {
    let Query(query) = query?;
    let ranking = state.batch.rank_for_job(&owner_id, query.job_id).await?;
    Ok(Json(ranking))
}

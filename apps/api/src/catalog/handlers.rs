use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::Owner;
use crate::catalog::jobs::{create_job, CreateJobRequest};
use crate::catalog::resumes::{ingest_resume, CreateResumeRequest, ResumeCreated};
use crate::errors::AppError;
use crate::models::job::JobRow;
use crate::models::page::{Page, PageQuery};
use crate::models::resume::ResumeRow;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ResumeListResponse {
    pub resumes: Vec<ResumeRow>,
}

#[derive(Debug, Serialize)]
pub struct JobCreatedResponse {
    pub success: bool,
    pub job: JobRow,
}

#[derive(Debug, Default, Deserialize)]
pub struct JobListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    /// `true` restricts the listing to open postings.
    pub active: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct JobListResponse {
    pub jobs: Vec<JobRow>,
}

/// POST /resumes
pub async fn handle_create_resume(
    State(state): State<AppState>,
    Owner(owner_id): Owner,
    payload: Result<Json<CreateResumeRequest>, JsonRejection>,
) -> Result<Json<ResumeCreated>, AppError> {
    let Json(request) = payload?;
    let row = ingest_resume(
        state.catalog.as_ref(),
        state.extractor.as_ref(),
        state.config.collaborator_timeout,
        &owner_id,
        request,
    )
    .await?;
    Ok(Json(row.into()))
}

/// GET /resumes
pub async fn handle_list_resumes(
    State(state): State<AppState>,
    Owner(owner_id): Owner,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<ResumeListResponse>, AppError> {
    let Query(page) = query?;
    let resumes = state.catalog.list_resumes(&owner_id, page.into()).await?;
    Ok(Json(ResumeListResponse { resumes }))
}

/// POST /jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    Owner(owner_id): Owner,
    payload: Result<Json<CreateJobRequest>, JsonRejection>,
) -> Result<Json<JobCreatedResponse>, AppError> {
    let Json(request) = payload?;
    let job = create_job(state.catalog.as_ref(), &owner_id, request).await?;
    Ok(Json(JobCreatedResponse { success: true, job }))
}

/// GET /jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    Owner(owner_id): Owner,
    query: Result<Query<JobListQuery>, QueryRejection>,
) -> Result<Json<JobListResponse>, AppError> {
    let Query(query) = query?;
    let page = Page::new(query.limit, query.offset);
    let jobs = state
        .catalog
        .list_jobs(&owner_id, query.active.unwrap_or(false), page)
        .await?;
    Ok(Json(JobListResponse { jobs }))
}

//! Batch evaluation: many resumes against one job, isolating per-item failure.
//!
//! Each resolved resume gets its own spawned task. Tasks are detached from the
//! request: if the caller disconnects, they still finish and persist, so the
//! results are reusable through the cache. Scoring concurrency is bounded by
//! the evaluator's semaphore, not by the number of tasks.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::catalog::store::CatalogStore;
use crate::evaluation::orchestrator::{Evaluated, Evaluator};
use crate::evaluation::ranking::{
    bucket, match_label, rank_by_score, BucketSummary, Scored,
};
use crate::evaluation::EvaluationError;
use crate::models::evaluation::EvaluationRow;

/// Message reported to clients for collaborator and internal failures.
const FAILURE_MESSAGE: &str = "Failed to evaluate resume";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSuccess {
    pub resume_id: Uuid,
    pub evaluation: EvaluationRow,
    pub was_cached: bool,
    pub match_label: &'static str,
}

impl Scored for BatchSuccess {
    fn overall_score(&self) -> Decimal {
        self.evaluation.overall_score
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchFailure {
    pub resume_id: Uuid,
    pub kind: &'static str,
    pub error: String,
}

impl BatchFailure {
    fn from_error(resume_id: Uuid, err: &EvaluationError) -> Self {
        let error = match err {
            // User-correctable, so the detail is worth showing.
            EvaluationError::InvalidInput(msg) => msg.clone(),
            _ => FAILURE_MESSAGE.to_string(),
        };
        Self {
            resume_id,
            kind: err.kind(),
            error,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// Requested ids, including any silently excluded ones.
    pub total: usize,
    pub successful: usize,
    pub errors: usize,
    pub existing: usize,
    pub new: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    /// Successes, ranked by overall score.
    pub evaluations: Vec<BatchSuccess>,
    pub errors: Vec<BatchFailure>,
    pub summary: BatchSummary,
}

/// A stored evaluation for a job, joined with the resume it scores.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobEvaluation {
    #[serde(flatten)]
    pub evaluation: EvaluationRow,
    pub resume_filename: String,
    pub resume_created_at: Option<DateTime<Utc>>,
    pub match_label: &'static str,
}

impl Scored for JobEvaluation {
    fn overall_score(&self) -> Decimal {
        self.evaluation.overall_score
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JobRanking {
    pub evaluations: Vec<JobEvaluation>,
    pub summary: BucketSummary,
}

pub struct BatchEvaluator {
    evaluator: Arc<Evaluator>,
    catalog: Arc<dyn CatalogStore>,
    max_batch_size: usize,
}

impl BatchEvaluator {
    pub fn new(
        evaluator: Arc<Evaluator>,
        catalog: Arc<dyn CatalogStore>,
        max_batch_size: usize,
    ) -> Self {
        Self {
            evaluator,
            catalog,
            max_batch_size,
        }
    }

    /// Evaluates every owned resume in `resume_ids` against the job.
    ///
    /// Fails as a whole only when the batch cannot start: empty or oversized
    /// request, unknown job, or no resolvable resume. Ids that don't exist or
    /// belong to another owner are skipped without being reported.
    pub async fn evaluate_batch(
        &self,
        owner_id: &str,
        job_id: Uuid,
        resume_ids: &[Uuid],
    ) -> Result<BatchResult, EvaluationError> {
        if resume_ids.is_empty() {
            return Err(EvaluationError::InvalidInput(
                "resumeIds must contain at least one id".to_string(),
            ));
        }
        if resume_ids.len() > self.max_batch_size {
            return Err(EvaluationError::LimitExceeded {
                requested: resume_ids.len(),
                limit: self.max_batch_size,
            });
        }

        let job = self
            .catalog
            .find_job(job_id, owner_id)
            .await?
            .ok_or_else(|| EvaluationError::NotFound("Job not found".to_string()))?;

        let resumes = self.catalog.find_resumes(resume_ids, owner_id).await?;
        if resumes.is_empty() {
            return Err(EvaluationError::NotFound("No resumes found".to_string()));
        }

        let unique_requested = resume_ids.iter().collect::<HashSet<_>>().len();
        if resumes.len() < unique_requested {
            debug!(
                job_id = %job_id,
                excluded = unique_requested - resumes.len(),
                "Skipping resume ids that are missing or not owned"
            );
        }

        let job = Arc::new(job);
        let handles: Vec<(Uuid, JoinHandle<Result<Evaluated, EvaluationError>>)> = resumes
            .into_iter()
            .map(|resume| {
                let resume_id = resume.id;
                let evaluator = Arc::clone(&self.evaluator);
                let job = Arc::clone(&job);
                let owner_id = owner_id.to_string();
                let span = info_span!("evaluate_resume", resume_id = %resume_id, job_id = %job.id);
                let handle = tokio::spawn(
                    async move { evaluator.evaluate_one(&owner_id, &resume, &job).await }
                        .instrument(span),
                );
                (resume_id, handle)
            })
            .collect();

        let mut successes = Vec::with_capacity(handles.len());
        let mut failures = Vec::new();
        for (resume_id, handle) in handles {
            match handle.await {
                Ok(Ok(evaluated)) => successes.push(BatchSuccess {
                    resume_id,
                    match_label: match_label(evaluated.record.overall_score),
                    evaluation: evaluated.record,
                    was_cached: evaluated.was_cached,
                }),
                Ok(Err(err)) => {
                    warn!(resume_id = %resume_id, job_id = %job_id, error = %err, "Resume evaluation failed");
                    failures.push(BatchFailure::from_error(resume_id, &err));
                }
                Err(join_err) => {
                    error!(resume_id = %resume_id, job_id = %job_id, error = %join_err, "Resume evaluation task aborted");
                    failures.push(BatchFailure {
                        resume_id,
                        kind: "internal_error",
                        error: FAILURE_MESSAGE.to_string(),
                    });
                }
            }
        }

        let existing = successes.iter().filter(|s| s.was_cached).count();
        let summary = BatchSummary {
            total: resume_ids.len(),
            successful: successes.len(),
            errors: failures.len(),
            existing,
            new: successes.len() - existing,
        };

        info!(
            job_id = %job_id,
            total = summary.total,
            successful = summary.successful,
            errors = summary.errors,
            existing = summary.existing,
            "Batch evaluation complete"
        );

        Ok(BatchResult {
            evaluations: rank_by_score(successes),
            errors: failures,
            summary,
        })
    }

    /// Stored evaluations for a job, ranked and bucketed.
    pub async fn rank_for_job(
        &self,
        owner_id: &str,
        job_id: Uuid,
    ) -> Result<JobRanking, EvaluationError> {
        let rows = self.evaluator.store().list_by_job(job_id, owner_id).await?;

        let resume_ids: Vec<Uuid> = rows.iter().map(|r| r.resume_id).collect();
        let resumes: HashMap<Uuid, _> = self
            .catalog
            .find_resumes(&resume_ids, owner_id)
            .await?
            .into_iter()
            .map(|r| (r.id, r))
            .collect();

        let entries: Vec<JobEvaluation> = rows
            .into_iter()
            .map(|evaluation| {
                let resume = resumes.get(&evaluation.resume_id);
                JobEvaluation {
                    resume_filename: resume
                        .map(|r| r.filename.clone())
                        .unwrap_or_else(|| "Unknown".to_string()),
                    resume_created_at: resume.map(|r| r.created_at),
                    match_label: match_label(evaluation.overall_score),
                    evaluation,
                }
            })
            .collect();

        let summary = bucket(&entries);
        Ok(JobRanking {
            evaluations: rank_by_score(entries),
            summary,
        })
    }
}

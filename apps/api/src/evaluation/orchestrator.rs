//! Single-pair evaluation: evaluate-or-fetch-cached for one (resume, job) pair.
//!
//! Steps: ownership/input checks → cache lookup by triple → scoring (bounded by
//! a shared semaphore and a timeout) → range/shape validation → persist.
//! A lost insert race is resolved by re-reading the winner's row.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::evaluation::gateway::ScoringGateway;
use crate::evaluation::store::EvaluationStore;
use crate::evaluation::EvaluationError;
use crate::models::evaluation::{EvaluationResult, EvaluationRow, NewEvaluation};
use crate::models::job::JobRow;
use crate::models::resume::ResumeRow;

/// Outcome of a single-pair evaluation.
#[derive(Debug, Clone)]
pub struct Evaluated {
    pub record: EvaluationRow,
    /// True when the record already existed and no scoring call was made for it.
    pub was_cached: bool,
}

pub struct Evaluator {
    store: Arc<dyn EvaluationStore>,
    scorer: Arc<dyn ScoringGateway>,
    scoring_permits: Arc<Semaphore>,
    scoring_timeout: Duration,
}

impl Evaluator {
    pub fn new(
        store: Arc<dyn EvaluationStore>,
        scorer: Arc<dyn ScoringGateway>,
        max_concurrent_scoring: usize,
        scoring_timeout: Duration,
    ) -> Self {
        Self {
            store,
            scorer,
            scoring_permits: Arc::new(Semaphore::new(max_concurrent_scoring.max(1))),
            scoring_timeout,
        }
    }

    pub fn store(&self) -> &Arc<dyn EvaluationStore> {
        &self.store
    }

    /// Produces the evaluation for `(resume, job, owner_id)`, scoring at most once
    /// per triple. Zero store writes on a cache hit, one on a miss.
    pub async fn evaluate_one(
        &self,
        owner_id: &str,
        resume: &ResumeRow,
        job: &JobRow,
    ) -> Result<Evaluated, EvaluationError> {
        check_preconditions(owner_id, resume, job)?;

        if let Some(record) = self.store.find_by_triple(resume.id, job.id, owner_id).await? {
            debug!(resume_id = %resume.id, job_id = %job.id, "Evaluation cache hit");
            return Ok(Evaluated {
                record,
                was_cached: true,
            });
        }

        let result = self.score(resume, job).await?;
        let evaluation =
            into_new_evaluation(result, resume.id, job.id, owner_id).inspect_err(|err| {
                warn!(resume_id = %resume.id, job_id = %job.id, error = %err, "Scoring result rejected");
            })?;

        match self.store.insert(evaluation).await {
            Ok(record) => {
                info!(
                    resume_id = %resume.id,
                    job_id = %job.id,
                    overall_score = %record.overall_score,
                    "Evaluation persisted"
                );
                Ok(Evaluated {
                    record,
                    was_cached: false,
                })
            }
            Err(EvaluationError::Conflict { .. }) => {
                warn!(
                    resume_id = %resume.id,
                    job_id = %job.id,
                    "Concurrent evaluation won the insert race; returning its record"
                );
                let record = self
                    .store
                    .find_by_triple(resume.id, job.id, owner_id)
                    .await?
                    .ok_or_else(|| {
                        EvaluationError::NotFound(format!(
                            "Evaluation for resume {} and job {} was removed concurrently",
                            resume.id, job.id
                        ))
                    })?;
                Ok(Evaluated {
                    record,
                    was_cached: true,
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Calls the scoring gateway while holding a permit, under the configured deadline.
    async fn score(
        &self,
        resume: &ResumeRow,
        job: &JobRow,
    ) -> Result<EvaluationResult, EvaluationError> {
        let _permit = self
            .scoring_permits
            .acquire()
            .await
            .map_err(|_| EvaluationError::Scoring("scoring pool is shut down".to_string()))?;

        let outcome =
            match tokio::time::timeout(self.scoring_timeout, self.scorer.score(resume, job)).await {
                Ok(result) => result.map_err(EvaluationError::into_scoring),
                Err(_) => Err(EvaluationError::Scoring(format!(
                    "scoring timed out after {}s",
                    self.scoring_timeout.as_secs_f64()
                ))),
            };
        if let Err(err) = &outcome {
            warn!(resume_id = %resume.id, job_id = %job.id, error = %err, "Scoring call failed");
        }
        outcome
    }
}

fn check_preconditions(
    owner_id: &str,
    resume: &ResumeRow,
    job: &JobRow,
) -> Result<(), EvaluationError> {
    if resume.owner_id != owner_id {
        return Err(EvaluationError::Ownership(format!(
            "Resume {} not found",
            resume.id
        )));
    }
    if job.owner_id != owner_id {
        return Err(EvaluationError::Ownership(format!("Job {} not found", job.id)));
    }
    if resume.raw_text.trim().is_empty() {
        return Err(EvaluationError::InvalidInput(
            "Resume content is required for evaluation".to_string(),
        ));
    }
    if job.title.trim().is_empty() {
        return Err(EvaluationError::InvalidInput(
            "Job title is required for evaluation".to_string(),
        ));
    }
    if job.description.trim().is_empty() {
        return Err(EvaluationError::InvalidInput(
            "Job description is required for evaluation".to_string(),
        ));
    }
    Ok(())
}

/// Validates a scoring result and converts it into a storable record.
/// Any violation is a malformed result and is reported as `Scoring`.
fn into_new_evaluation(
    result: EvaluationResult,
    resume_id: Uuid,
    job_id: Uuid,
    owner_id: &str,
) -> Result<NewEvaluation, EvaluationError> {
    let overall_score = to_score("overallScore", result.overall_score)?;
    let skills_score = result
        .skills_score
        .map(|s| to_score("skillsScore", s))
        .transpose()?;
    let experience_score = result
        .experience_score
        .map(|s| to_score("experienceScore", s))
        .transpose()?;
    let education_score = result
        .education_score
        .map(|s| to_score("educationScore", s))
        .transpose()?;

    for skill in &result.breakdown.skills_match {
        if skill.skill.trim().is_empty() {
            return Err(malformed("skillsMatch entry has an empty skill name"));
        }
        to_score("skillsMatch.relevance", skill.relevance)?;
    }

    let experience = &result.breakdown.experience_match;
    for (field, years) in [
        ("yearsRequired", experience.years_required),
        ("yearsCandidate", experience.years_candidate),
    ] {
        if let Some(years) = years {
            if !years.is_finite() || years < 0.0 {
                return Err(malformed(&format!("{field} must be a non-negative number")));
            }
        }
    }

    Ok(NewEvaluation {
        id: Uuid::new_v4(),
        resume_id,
        job_id,
        owner_id: owner_id.to_string(),
        overall_score,
        skills_score,
        experience_score,
        education_score,
        breakdown: result.breakdown,
        recommendation: result.recommendation,
        strengths: result.strengths,
        weaknesses: result.weaknesses,
    })
}

/// Range-checks a raw score and fixes it to two decimals.
fn to_score(field: &str, value: f64) -> Result<Decimal, EvaluationError> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(malformed(&format!("{field} {value} is outside [0, 100]")));
    }
    Decimal::from_f64_retain(value)
        .map(|d| d.round_dp(2))
        .ok_or_else(|| malformed(&format!("{field} {value} is not representable")))
}

fn malformed(detail: &str) -> EvaluationError {
    EvaluationError::Scoring(format!("malformed result: {detail}"))
}

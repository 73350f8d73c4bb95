//! Evaluation persistence.
//!
//! The store must honor one contract beyond plain insert/read: at most one
//! evaluation per (resume_id, job_id, owner_id). A second insert for the same
//! triple reports `EvaluationError::Conflict` instead of writing a row.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::evaluation::EvaluationError;
use crate::models::evaluation::{EvaluationRow, NewEvaluation};
use crate::models::page::Page;

/// Optional filters for the owner-scoped evaluation listing.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvaluationFilter {
    pub resume_id: Option<Uuid>,
    pub job_id: Option<Uuid>,
    pub page: Page,
}

#[async_trait]
pub trait EvaluationStore: Send + Sync {
    async fn find_by_triple(
        &self,
        resume_id: Uuid,
        job_id: Uuid,
        owner_id: &str,
    ) -> Result<Option<EvaluationRow>, EvaluationError>;

    /// Inserts a new evaluation, or fails with `Conflict` if the triple already has one.
    async fn insert(&self, evaluation: NewEvaluation) -> Result<EvaluationRow, EvaluationError>;

    async fn list_by_job(
        &self,
        job_id: Uuid,
        owner_id: &str,
    ) -> Result<Vec<EvaluationRow>, EvaluationError>;

    /// Newest first.
    async fn list_by_filter(
        &self,
        owner_id: &str,
        filter: EvaluationFilter,
    ) -> Result<Vec<EvaluationRow>, EvaluationError>;
}

/// PostgreSQL-backed store. Uniqueness is enforced by the
/// `evaluations_triple_key` constraint.
pub struct PgEvaluationStore {
    pool: PgPool,
}

impl PgEvaluationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EvaluationStore for PgEvaluationStore {
    async fn find_by_triple(
        &self,
        resume_id: Uuid,
        job_id: Uuid,
        owner_id: &str,
    ) -> Result<Option<EvaluationRow>, EvaluationError> {
        Ok(sqlx::query_as::<_, EvaluationRow>(
            "SELECT * FROM evaluations WHERE resume_id = $1 AND job_id = $2 AND owner_id = $3",
        )
        .bind(resume_id)
        .bind(job_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn insert(&self, evaluation: NewEvaluation) -> Result<EvaluationRow, EvaluationError> {
        let inserted = sqlx::query_as::<_, EvaluationRow>(
            r#"
            INSERT INTO evaluations
                (id, resume_id, job_id, owner_id, overall_score, skills_score,
                 experience_score, education_score, breakdown, recommendation,
                 strengths, weaknesses)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT ON CONSTRAINT evaluations_triple_key DO NOTHING
            RETURNING *
            "#,
        )
        .bind(evaluation.id)
        .bind(evaluation.resume_id)
        .bind(evaluation.job_id)
        .bind(&evaluation.owner_id)
        .bind(evaluation.overall_score)
        .bind(evaluation.skills_score)
        .bind(evaluation.experience_score)
        .bind(evaluation.education_score)
        .bind(Json(&evaluation.breakdown))
        .bind(&evaluation.recommendation)
        .bind(&evaluation.strengths)
        .bind(&evaluation.weaknesses)
        .fetch_optional(&self.pool)
        .await?;

        inserted.ok_or(EvaluationError::Conflict {
            resume_id: evaluation.resume_id,
            job_id: evaluation.job_id,
        })
    }

    async fn list_by_job(
        &self,
        job_id: Uuid,
        owner_id: &str,
    ) -> Result<Vec<EvaluationRow>, EvaluationError> {
        Ok(sqlx::query_as::<_, EvaluationRow>(
            "SELECT * FROM evaluations WHERE job_id = $1 AND owner_id = $2 ORDER BY created_at DESC",
        )
        .bind(job_id)
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn list_by_filter(
        &self,
        owner_id: &str,
        filter: EvaluationFilter,
    ) -> Result<Vec<EvaluationRow>, EvaluationError> {
        Ok(sqlx::query_as::<_, EvaluationRow>(
            r#"
            SELECT * FROM evaluations
            WHERE owner_id = $1
              AND ($2::uuid IS NULL OR resume_id = $2)
              AND ($3::uuid IS NULL OR job_id = $3)
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(owner_id)
        .bind(filter.resume_id)
        .bind(filter.job_id)
        .bind(filter.page.limit)
        .bind(filter.page.offset)
        .fetch_all(&self.pool)
        .await?)
    }
}

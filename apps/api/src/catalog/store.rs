//! Owner-scoped persistence for resumes and job postings.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::evaluation::EvaluationError;
use crate::models::job::{JobRow, NewJob};
use crate::models::page::Page;
use crate::models::resume::{NewResume, ResumeRow};

#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn find_resume(&self, id: Uuid, owner_id: &str)
        -> Result<Option<ResumeRow>, EvaluationError>;

    /// The owned subset of `ids`, in request order, each resume at most once.
    async fn find_resumes(
        &self,
        ids: &[Uuid],
        owner_id: &str,
    ) -> Result<Vec<ResumeRow>, EvaluationError>;

    async fn find_job(&self, id: Uuid, owner_id: &str) -> Result<Option<JobRow>, EvaluationError>;

    async fn insert_resume(&self, resume: NewResume) -> Result<ResumeRow, EvaluationError>;

    /// Newest first.
    async fn list_resumes(&self, owner_id: &str, page: Page)
        -> Result<Vec<ResumeRow>, EvaluationError>;

    async fn insert_job(&self, job: NewJob) -> Result<JobRow, EvaluationError>;

    /// Newest first. With `active_only`, postings that were closed are left out.
    async fn list_jobs(
        &self,
        owner_id: &str,
        active_only: bool,
        page: Page,
    ) -> Result<Vec<JobRow>, EvaluationError>;
}

/// Reorders `rows` to follow `ids`, dropping repeats and rows that weren't asked for.
pub fn order_by_request(ids: &[Uuid], rows: Vec<ResumeRow>) -> Vec<ResumeRow> {
    let mut by_id: HashMap<Uuid, ResumeRow> = rows.into_iter().map(|r| (r.id, r)).collect();
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter()
        .filter(|id| seen.insert(**id))
        .filter_map(|id| by_id.remove(id))
        .collect()
}

pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn find_resume(
        &self,
        id: Uuid,
        owner_id: &str,
    ) -> Result<Option<ResumeRow>, EvaluationError> {
        Ok(
            sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE id = $1 AND owner_id = $2")
                .bind(id)
                .bind(owner_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn find_resumes(
        &self,
        ids: &[Uuid],
        owner_id: &str,
    ) -> Result<Vec<ResumeRow>, EvaluationError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, ResumeRow>(
            "SELECT * FROM resumes WHERE id = ANY($1) AND owner_id = $2",
        )
        .bind(ids)
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(order_by_request(ids, rows))
    }

    async fn find_job(&self, id: Uuid, owner_id: &str) -> Result<Option<JobRow>, EvaluationError> {
        Ok(
            sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1 AND owner_id = $2")
                .bind(id)
                .bind(owner_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn insert_resume(&self, resume: NewResume) -> Result<ResumeRow, EvaluationError> {
        Ok(sqlx::query_as::<_, ResumeRow>(
            r#"
            INSERT INTO resumes
                (id, owner_id, filename, raw_text, structured_data, file_size, file_type)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(resume.id)
        .bind(&resume.owner_id)
        .bind(&resume.filename)
        .bind(&resume.raw_text)
        .bind(resume.structured_data.as_ref().map(Json))
        .bind(resume.file_size)
        .bind(&resume.file_type)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn list_resumes(
        &self,
        owner_id: &str,
        page: Page,
    ) -> Result<Vec<ResumeRow>, EvaluationError> {
        Ok(sqlx::query_as::<_, ResumeRow>(
            "SELECT * FROM resumes WHERE owner_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(owner_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn insert_job(&self, job: NewJob) -> Result<JobRow, EvaluationError> {
        Ok(sqlx::query_as::<_, JobRow>(
            r#"
            INSERT INTO jobs
                (id, owner_id, title, description, requirements, skills,
                 experience_level, location)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(job.id)
        .bind(&job.owner_id)
        .bind(&job.title)
        .bind(&job.description)
        .bind(&job.requirements)
        .bind(&job.skills)
        .bind(job.experience_level)
        .bind(&job.location)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn list_jobs(
        &self,
        owner_id: &str,
        active_only: bool,
        page: Page,
    ) -> Result<Vec<JobRow>, EvaluationError> {
        Ok(sqlx::query_as::<_, JobRow>(
            r#"
            SELECT * FROM jobs
            WHERE owner_id = $1
              AND (NOT $4 OR is_active)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(owner_id)
        .bind(page.limit)
        .bind(page.offset)
        .bind(active_only)
        .fetch_all(&self.pool)
        .await?)
    }
}

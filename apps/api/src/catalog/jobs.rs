use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::catalog::store::CatalogStore;
use crate::evaluation::EvaluationError;
use crate::models::job::{ExperienceLevel, JobRow, NewJob};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience_level: Option<ExperienceLevel>,
    #[serde(default)]
    pub location: Option<String>,
}

impl CreateJobRequest {
    /// Trims text fields and drops blank list entries.
    pub fn into_new_job(self, owner_id: &str) -> Result<NewJob, EvaluationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(EvaluationError::InvalidInput("title is required".to_string()));
        }
        let description = self.description.trim();
        if description.is_empty() {
            return Err(EvaluationError::InvalidInput(
                "description is required".to_string(),
            ));
        }

        Ok(NewJob {
            id: Uuid::new_v4(),
            owner_id: owner_id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            requirements: non_blank(self.requirements),
            skills: non_blank(self.skills),
            experience_level: self.experience_level,
            location: self
                .location
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty()),
        })
    }
}

fn non_blank(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

pub async fn create_job(
    catalog: &dyn CatalogStore,
    owner_id: &str,
    request: CreateJobRequest,
) -> Result<JobRow, EvaluationError> {
    let job = catalog.insert_job(request.into_new_job(owner_id)?).await?;
    info!(job_id = %job.id, title = %job.title, "Job created");
    Ok(job)
}

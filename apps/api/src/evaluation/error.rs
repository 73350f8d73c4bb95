use thiserror::Error;
use uuid::Uuid;

/// Domain errors raised by the evaluation core and its collaborators.
#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Ownership(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("Scoring failed: {0}")]
    Scoring(String),

    /// A record for the (resume, job, owner) triple already exists. Recovered
    /// inside the evaluator by re-reading; never surfaced to clients.
    #[error("Evaluation already exists for resume {resume_id} and job {job_id}")]
    Conflict { resume_id: Uuid, job_id: Uuid },

    #[error("Batch of {requested} resumes exceeds the limit of {limit}")]
    LimitExceeded { requested: usize, limit: usize },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl EvaluationError {
    /// Stable snake_case category reported for per-item batch failures.
    pub fn kind(&self) -> &'static str {
        match self {
            EvaluationError::InvalidInput(_) | EvaluationError::LimitExceeded { .. } => {
                "invalid_input"
            }
            EvaluationError::Ownership(_) | EvaluationError::NotFound(_) => "ownership_error",
            EvaluationError::Extraction(_) => "extraction_error",
            EvaluationError::Scoring(_) => "scoring_error",
            EvaluationError::Conflict { .. } | EvaluationError::Database(_) => "internal_error",
        }
    }

    /// Re-classifies any collaborator failure as a scoring failure, keeping the cause.
    pub(crate) fn into_scoring(self) -> Self {
        match self {
            e @ EvaluationError::Scoring(_) => e,
            other => EvaluationError::Scoring(other.to_string()),
        }
    }

    /// Re-classifies any collaborator failure as an extraction failure, keeping the cause.
    pub(crate) fn into_extraction(self) -> Self {
        match self {
            e @ EvaluationError::Extraction(_) => e,
            other => EvaluationError::Extraction(other.to_string()),
        }
    }
}

//! Collaborator gateways: strongly-typed seams to the AI services.
//!
//! Default backends go through `LlmClient`. `AppState` carries them as
//! `Arc<dyn ...>` so tests can swap in scripted implementations.

use async_trait::async_trait;

use crate::evaluation::prompts::{
    build_extraction_prompt, build_scoring_prompt, EXTRACTION_SYSTEM, SCORING_SYSTEM,
};
use crate::evaluation::EvaluationError;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::LlmClient;
use crate::models::evaluation::EvaluationResult;
use crate::models::job::JobRow;
use crate::models::resume::{ResumeRow, StructuredResume};

/// Raw resume text → structured resume record.
#[async_trait]
pub trait ExtractionGateway: Send + Sync {
    async fn extract(&self, raw_text: &str) -> Result<StructuredResume, EvaluationError>;
}

/// (resume, job) → evaluation result. Failures are reported as `Scoring`.
#[async_trait]
pub trait ScoringGateway: Send + Sync {
    async fn score(
        &self,
        resume: &ResumeRow,
        job: &JobRow,
    ) -> Result<EvaluationResult, EvaluationError>;
}

// ────────────────────────────────────────────────────────────────────────────
// LLM-backed implementations
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmScoringGateway(pub LlmClient);

#[async_trait]
impl ScoringGateway for LlmScoringGateway {
    async fn score(
        &self,
        resume: &ResumeRow,
        job: &JobRow,
    ) -> Result<EvaluationResult, EvaluationError> {
        let prompt = build_scoring_prompt(resume, job);
        let system = format!("{SCORING_SYSTEM}\n{JSON_ONLY_SYSTEM}");
        self.0
            .call_json::<EvaluationResult>(&prompt, &system)
            .await
            .map_err(|e| EvaluationError::Scoring(format!("LLM scoring failed: {e}")))
    }
}

pub struct LlmExtractionGateway(pub LlmClient);

#[async_trait]
impl ExtractionGateway for LlmExtractionGateway {
    async fn extract(&self, raw_text: &str) -> Result<StructuredResume, EvaluationError> {
        let prompt = build_extraction_prompt(raw_text);
        let system = format!("{EXTRACTION_SYSTEM}\n{JSON_ONLY_SYSTEM}");
        let parsed = self
            .0
            .call_json::<StructuredResume>(&prompt, &system)
            .await
            .map_err(|e| EvaluationError::Extraction(format!("LLM extraction failed: {e}")))?;

        if parsed.personal_info.name.trim().is_empty() {
            return Err(EvaluationError::Extraction(
                "Could not extract candidate name from resume".to_string(),
            ));
        }
        Ok(parsed)
    }
}

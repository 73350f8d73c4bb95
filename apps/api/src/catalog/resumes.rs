//! Resume ingest: validate the upload, extract structure, persist.
//!
//! Text extraction from binary formats happens before the request reaches
//! this service; callers send the extracted text in `rawText`.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::catalog::store::CatalogStore;
use crate::evaluation::gateway::ExtractionGateway;
use crate::evaluation::EvaluationError;
use crate::models::resume::{NewResume, ResumeRow, StructuredResume};

pub const MAX_FILE_SIZE: i64 = 5 * 1024 * 1024;
pub const MIN_TEXT_LEN: usize = 50;

pub const ALLOWED_FILE_TYPES: [&str; 4] = [
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "text/plain",
];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateResumeRequest {
    pub filename: String,
    pub raw_text: String,
    pub file_type: String,
    pub file_size: i64,
}

impl CreateResumeRequest {
    pub fn validate(&self) -> Result<(), EvaluationError> {
        if self.filename.trim().is_empty() {
            return Err(EvaluationError::InvalidInput(
                "filename is required".to_string(),
            ));
        }
        if !ALLOWED_FILE_TYPES.contains(&self.file_type.as_str()) {
            return Err(EvaluationError::InvalidInput(
                "Invalid file type. Please upload PDF, DOC, DOCX, or TXT files.".to_string(),
            ));
        }
        if self.file_size < 0 || self.file_size > MAX_FILE_SIZE {
            return Err(EvaluationError::InvalidInput(
                "File too large. Maximum size is 5MB.".to_string(),
            ));
        }
        if self.raw_text.trim().chars().count() < MIN_TEXT_LEN {
            return Err(EvaluationError::InvalidInput(
                "Could not extract sufficient text from file".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeCreated {
    pub success: bool,
    pub resume_id: Uuid,
    pub filename: String,
    pub structured_data: Option<StructuredResume>,
}

impl From<ResumeRow> for ResumeCreated {
    fn from(row: ResumeRow) -> Self {
        Self {
            success: true,
            resume_id: row.id,
            filename: row.filename,
            structured_data: row.structured_data.map(|json| json.0),
        }
    }
}

/// Validates, extracts and stores a resume. Nothing is persisted if
/// extraction fails or times out.
pub async fn ingest_resume(
    catalog: &dyn CatalogStore,
    extractor: &dyn ExtractionGateway,
    extraction_timeout: Duration,
    owner_id: &str,
    request: CreateResumeRequest,
) -> Result<ResumeRow, EvaluationError> {
    request.validate()?;

    let structured = match tokio::time::timeout(
        extraction_timeout,
        extractor.extract(&request.raw_text),
    )
    .await
    {
        Ok(result) => result.map_err(EvaluationError::into_extraction).inspect_err(|err| {
            warn!(filename = %request.filename, error = %err, "Resume extraction failed");
        })?,
        Err(_) => {
            warn!(filename = %request.filename, "Resume extraction timed out");
            return Err(EvaluationError::Extraction(format!(
                "timed out after {}s",
                extraction_timeout.as_secs()
            )));
        }
    };

    let row = catalog
        .insert_resume(NewResume {
            id: Uuid::new_v4(),
            owner_id: owner_id.to_string(),
            filename: request.filename.trim().to_string(),
            raw_text: request.raw_text,
            structured_data: Some(structured),
            file_size: Some(request.file_size),
            file_type: Some(request.file_type),
        })
        .await?;

    info!(resume_id = %row.id, filename = %row.filename, "Resume stored");
    Ok(row)
}

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// A persisted evaluation. At most one exists per (resume_id, job_id, owner_id).
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRow {
    pub id: Uuid,
    pub resume_id: Uuid,
    pub job_id: Uuid,
    #[serde(skip_serializing)]
    pub owner_id: String,
    pub overall_score: Decimal,
    pub skills_score: Option<Decimal>,
    pub experience_score: Option<Decimal>,
    pub education_score: Option<Decimal>,
    pub breakdown: Json<Breakdown>,
    pub recommendation: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// A validated evaluation ready to be inserted. Scores are already rounded to
/// two decimals and known to lie in [0, 100].
#[derive(Debug, Clone)]
pub struct NewEvaluation {
    pub id: Uuid,
    pub resume_id: Uuid,
    pub job_id: Uuid,
    pub owner_id: String,
    pub overall_score: Decimal,
    pub skills_score: Option<Decimal>,
    pub experience_score: Option<Decimal>,
    pub education_score: Option<Decimal>,
    pub breakdown: Breakdown,
    pub recommendation: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Scoring contract (returned by the scoring collaborator)
// ────────────────────────────────────────────────────────────────────────────

/// Raw scoring output. Range checks happen in the evaluator, not here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    pub overall_score: f64,
    #[serde(default)]
    pub skills_score: Option<f64>,
    #[serde(default)]
    pub experience_score: Option<f64>,
    #[serde(default)]
    pub education_score: Option<f64>,
    pub breakdown: Breakdown,
    pub recommendation: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Breakdown {
    pub skills_match: Vec<SkillMatch>,
    pub experience_match: ExperienceMatch,
    pub education_match: EducationMatch,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkillMatch {
    pub skill: String,
    pub found: bool,
    /// 0 – 100
    pub relevance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceMatch {
    #[serde(default)]
    pub years_required: Option<f64>,
    #[serde(default)]
    pub years_candidate: Option<f64>,
    #[serde(default)]
    pub relevant_experience: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EducationMatch {
    #[serde(default)]
    pub required: Option<String>,
    #[serde(default)]
    pub candidate: Vec<String>,
    #[serde(rename = "match")]
    pub is_match: bool,
}

impl From<&EvaluationRow> for EvaluationResult {
    /// Rebuilds the collaborator-shaped view of a stored evaluation.
    fn from(row: &EvaluationRow) -> Self {
        use rust_decimal::prelude::ToPrimitive;

        let to_f64 = |d: Decimal| d.to_f64().unwrap_or_default();
        EvaluationResult {
            overall_score: to_f64(row.overall_score),
            skills_score: row.skills_score.map(to_f64),
            experience_score: row.experience_score.map(to_f64),
            education_score: row.education_score.map(to_f64),
            breakdown: row.breakdown.0.clone(),
            recommendation: row.recommendation.clone(),
            strengths: row.strengths.clone(),
            weaknesses: row.weaknesses.clone(),
        }
    }
}

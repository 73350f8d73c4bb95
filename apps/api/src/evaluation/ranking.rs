//! Ranking and bucketing of evaluations. Pure functions, no I/O.
//!
//! Used identically for fresh batch results and for stored evaluations of a job.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::evaluation::EvaluationRow;

const STRONG_THRESHOLD: i64 = 80;
const GOOD_THRESHOLD: i64 = 60;
const POTENTIAL_THRESHOLD: i64 = 40;

/// Anything carrying an overall score can be ranked and bucketed.
pub trait Scored {
    fn overall_score(&self) -> Decimal;
}

impl Scored for EvaluationRow {
    fn overall_score(&self) -> Decimal {
        self.overall_score
    }
}

/// Sorts descending by overall score. The sort is stable: equal scores keep
/// their incoming relative order.
pub fn rank_by_score<T: Scored>(mut items: Vec<T>) -> Vec<T> {
    items.sort_by(|a, b| b.overall_score().cmp(&a.overall_score()));
    items
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBucket {
    Strong,
    Good,
    Potential,
    Poor,
}

impl ScoreBucket {
    /// strong ≥ 80, good ∈ [60, 80), potential ∈ [40, 60), poor < 40.
    pub fn for_score(score: Decimal) -> Self {
        if score >= Decimal::from(STRONG_THRESHOLD) {
            ScoreBucket::Strong
        } else if score >= Decimal::from(GOOD_THRESHOLD) {
            ScoreBucket::Good
        } else if score >= Decimal::from(POTENTIAL_THRESHOLD) {
            ScoreBucket::Potential
        } else {
            ScoreBucket::Poor
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreBucket::Strong => "Strong Match",
            ScoreBucket::Good => "Good Match",
            ScoreBucket::Potential => "Potential Match",
            ScoreBucket::Poor => "Poor Match",
        }
    }
}

/// Human-readable match label for a score, e.g. "Good Match".
pub fn match_label(score: Decimal) -> &'static str {
    ScoreBucket::for_score(score).label()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketSummary {
    pub total: usize,
    pub strong_matches: usize,
    pub good_matches: usize,
    pub potential_matches: usize,
    pub poor_matches: usize,
}

/// Counts items per bucket. Counts always sum to `items.len()`.
pub fn bucket<T: Scored>(items: &[T]) -> BucketSummary {
    items.iter().fold(
        BucketSummary {
            total: items.len(),
            ..BucketSummary::default()
        },
        |mut summary, item| {
            match ScoreBucket::for_score(item.overall_score()) {
                ScoreBucket::Strong => summary.strong_matches += 1,
                ScoreBucket::Good => summary.good_matches += 1,
                ScoreBucket::Potential => summary.potential_matches += 1,
                ScoreBucket::Poor => summary.poor_matches += 1,
            }
            summary
        },
    )
}

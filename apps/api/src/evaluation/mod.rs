//! Evaluation orchestration: turns (resume, job) pairs into persisted,
//! deduplicated, ranked evaluation records.
//!
//! Flow: handlers → `BatchEvaluator` (fan-out) → `Evaluator` (cache check →
//! scoring gateway → validate → persist) → `ranking` (sort + buckets).

pub mod batch;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod orchestrator;
pub mod prompts;
pub mod ranking;
pub mod store;

#[cfg(test)]
pub mod testing;

pub use error::EvaluationError;

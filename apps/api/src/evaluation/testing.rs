// In-memory stores and scripted gateways for exercising the orchestrators
// without PostgreSQL or an LLM.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use tracing_subscriber::fmt::MakeWriter;
use uuid::Uuid;

use crate::catalog::store::{order_by_request, CatalogStore};
use crate::evaluation::gateway::{ExtractionGateway, ScoringGateway};
use crate::evaluation::store::{EvaluationFilter, EvaluationStore};
use crate::evaluation::EvaluationError;
use crate::models::evaluation::{
    Breakdown, EducationMatch, EvaluationResult, EvaluationRow, ExperienceMatch, NewEvaluation,
    SkillMatch,
};
use crate::models::job::{JobRow, NewJob};
use crate::models::page::Page;
use crate::models::resume::{NewResume, PersonalInfo, ResumeRow, StructuredResume};

// ────────────────────────────────────────────────────────────────────────────
// Fixtures
// ────────────────────────────────────────────────────────────────────────────

pub fn job_for(owner_id: &str) -> JobRow {
    JobRow {
        id: Uuid::new_v4(),
        owner_id: owner_id.to_string(),
        title: "Senior Data Engineer".to_string(),
        description: "Build and operate batch and streaming pipelines.".to_string(),
        requirements: vec!["5+ years building data platforms".to_string()],
        skills: vec!["Python".to_string(), "SQL".to_string()],
        experience_level: None,
        location: None,
        is_active: true,
        created_at: Utc::now(),
    }
}

pub fn resume_for(owner_id: &str, raw_text: &str) -> ResumeRow {
    ResumeRow {
        id: Uuid::new_v4(),
        owner_id: owner_id.to_string(),
        filename: "resume.txt".to_string(),
        raw_text: raw_text.to_string(),
        structured_data: None,
        file_size: Some(raw_text.len() as i64),
        file_type: Some("text/plain".to_string()),
        created_at: Utc::now(),
    }
}

pub fn result_with_score(overall: f64) -> EvaluationResult {
    EvaluationResult {
        overall_score: overall,
        skills_score: Some(overall),
        experience_score: None,
        education_score: None,
        breakdown: Breakdown {
            skills_match: vec![SkillMatch {
                skill: "Python".to_string(),
                found: true,
                relevance: 90.0,
            }],
            experience_match: ExperienceMatch {
                years_required: Some(5.0),
                years_candidate: Some(6.0),
                relevant_experience: vec!["Data pipelines".to_string()],
            },
            education_match: EducationMatch {
                required: None,
                candidate: vec!["BSc Computer Science".to_string()],
                is_match: true,
            },
        },
        recommendation: "hire".to_string(),
        strengths: vec!["Python".to_string()],
        weaknesses: vec![],
    }
}

/// A persisted evaluation row, for seeding stores directly.
pub fn stored_evaluation(
    resume_id: Uuid,
    job_id: Uuid,
    owner_id: &str,
    overall: i64,
) -> EvaluationRow {
    let result = result_with_score(overall as f64);
    EvaluationRow {
        id: Uuid::new_v4(),
        resume_id,
        job_id,
        owner_id: owner_id.to_string(),
        overall_score: Decimal::from(overall),
        skills_score: Some(Decimal::from(overall)),
        experience_score: None,
        education_score: None,
        breakdown: Json(result.breakdown),
        recommendation: result.recommendation,
        strengths: result.strengths,
        weaknesses: result.weaknesses,
        created_at: Utc::now(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory evaluation store (honors triple uniqueness)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryEvaluationStore {
    rows: Mutex<Vec<EvaluationRow>>,
    inserts: AtomicUsize,
}

impl InMemoryEvaluationStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn count_for(&self, resume_id: Uuid, job_id: Uuid, owner_id: &str) -> usize {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.resume_id == resume_id && r.job_id == job_id && r.owner_id == owner_id)
            .count()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    /// Number of successful inserts.
    pub fn insert_count(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    /// Seeds a stored evaluation directly, bypassing the evaluator.
    pub fn seed(&self, row: EvaluationRow) {
        self.rows.lock().unwrap().push(row);
    }
}

#[async_trait]
impl EvaluationStore for InMemoryEvaluationStore {
    async fn find_by_triple(
        &self,
        resume_id: Uuid,
        job_id: Uuid,
        owner_id: &str,
    ) -> Result<Option<EvaluationRow>, EvaluationError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.resume_id == resume_id && r.job_id == job_id && r.owner_id == owner_id)
            .cloned())
    }

    async fn insert(&self, evaluation: NewEvaluation) -> Result<EvaluationRow, EvaluationError> {
        let mut rows = self.rows.lock().unwrap();
        let exists = rows.iter().any(|r| {
            r.resume_id == evaluation.resume_id
                && r.job_id == evaluation.job_id
                && r.owner_id == evaluation.owner_id
        });
        if exists {
            return Err(EvaluationError::Conflict {
                resume_id: evaluation.resume_id,
                job_id: evaluation.job_id,
            });
        }

        // Strictly increasing timestamps keep "newest first" deterministic.
        let created_at = Utc::now() + ChronoDuration::milliseconds(rows.len() as i64);
        let row = EvaluationRow {
            id: evaluation.id,
            resume_id: evaluation.resume_id,
            job_id: evaluation.job_id,
            owner_id: evaluation.owner_id,
            overall_score: evaluation.overall_score,
            skills_score: evaluation.skills_score,
            experience_score: evaluation.experience_score,
            education_score: evaluation.education_score,
            breakdown: Json(evaluation.breakdown),
            recommendation: evaluation.recommendation,
            strengths: evaluation.strengths,
            weaknesses: evaluation.weaknesses,
            created_at,
        };
        rows.push(row.clone());
        self.inserts.fetch_add(1, Ordering::SeqCst);
        Ok(row)
    }

    async fn list_by_job(
        &self,
        job_id: Uuid,
        owner_id: &str,
    ) -> Result<Vec<EvaluationRow>, EvaluationError> {
        let mut rows: Vec<_> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.job_id == job_id && r.owner_id == owner_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn list_by_filter(
        &self,
        owner_id: &str,
        filter: EvaluationFilter,
    ) -> Result<Vec<EvaluationRow>, EvaluationError> {
        let mut rows: Vec<_> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.owner_id == owner_id)
            .filter(|r| filter.resume_id.map_or(true, |id| r.resume_id == id))
            .filter(|r| filter.job_id.map_or(true, |id| r.job_id == id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(rows, filter.page))
    }
}

fn paginate<T>(rows: Vec<T>, page: Page) -> Vec<T> {
    rows.into_iter()
        .skip(page.offset as usize)
        .take(page.limit as usize)
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory catalog
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryCatalog {
    resumes: Mutex<Vec<ResumeRow>>,
    jobs: Mutex<Vec<JobRow>>,
}

impl InMemoryCatalog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_resume(&self, resume: ResumeRow) -> Uuid {
        let id = resume.id;
        self.resumes.lock().unwrap().push(resume);
        id
    }

    pub fn add_job(&self, job: JobRow) -> Uuid {
        let id = job.id;
        self.jobs.lock().unwrap().push(job);
        id
    }

    pub fn resume_count(&self) -> usize {
        self.resumes.lock().unwrap().len()
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalog {
    async fn find_resume(
        &self,
        id: Uuid,
        owner_id: &str,
    ) -> Result<Option<ResumeRow>, EvaluationError> {
        Ok(self
            .resumes
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id && r.owner_id == owner_id)
            .cloned())
    }

    async fn find_resumes(
        &self,
        ids: &[Uuid],
        owner_id: &str,
    ) -> Result<Vec<ResumeRow>, EvaluationError> {
        let owned: Vec<_> = self
            .resumes
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.owner_id == owner_id && ids.contains(&r.id))
            .cloned()
            .collect();
        Ok(order_by_request(ids, owned))
    }

    async fn find_job(&self, id: Uuid, owner_id: &str) -> Result<Option<JobRow>, EvaluationError> {
        Ok(self
            .jobs
            .lock()
            .unwrap()
            .iter()
            .find(|j| j.id == id && j.owner_id == owner_id)
            .cloned())
    }

    async fn insert_resume(&self, resume: NewResume) -> Result<ResumeRow, EvaluationError> {
        let row = ResumeRow {
            id: resume.id,
            owner_id: resume.owner_id,
            filename: resume.filename,
            raw_text: resume.raw_text,
            structured_data: resume.structured_data.map(Json),
            file_size: resume.file_size,
            file_type: resume.file_type,
            created_at: Utc::now(),
        };
        self.resumes.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn list_resumes(
        &self,
        owner_id: &str,
        page: Page,
    ) -> Result<Vec<ResumeRow>, EvaluationError> {
        let rows: Vec<_> = self
            .resumes
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect();
        Ok(paginate(rows, page))
    }

    async fn insert_job(&self, job: NewJob) -> Result<JobRow, EvaluationError> {
        let row = JobRow {
            id: job.id,
            owner_id: job.owner_id,
            title: job.title,
            description: job.description,
            requirements: job.requirements,
            skills: job.skills,
            experience_level: job.experience_level,
            location: job.location,
            is_active: true,
            created_at: Utc::now(),
        };
        self.jobs.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn list_jobs(
        &self,
        owner_id: &str,
        active_only: bool,
        page: Page,
    ) -> Result<Vec<JobRow>, EvaluationError> {
        let rows: Vec<_> = self
            .jobs
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|j| j.owner_id == owner_id)
            .filter(|j| !active_only || j.is_active)
            .cloned()
            .collect();
        Ok(paginate(rows, page))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Scripted scoring gateway
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub enum ScriptedReply {
    Score(EvaluationResult),
    Fail(String),
}

/// Replies per resume id, with an optional fallback, a simulated latency,
/// and bookkeeping for call counts and peak concurrency.
pub struct ScriptedScorer {
    replies: Mutex<HashMap<Uuid, ScriptedReply>>,
    fallback: Option<ScriptedReply>,
    latency: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl ScriptedScorer {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(HashMap::new()),
            fallback: None,
            latency: Duration::ZERO,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    /// Every resume without a specific reply gets this score.
    pub fn always(score: f64) -> Self {
        Self::new().with_fallback(ScriptedReply::Score(result_with_score(score)))
    }

    pub fn with_fallback(mut self, reply: ScriptedReply) -> Self {
        self.fallback = Some(reply);
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn reply_for(self, resume_id: Uuid, reply: ScriptedReply) -> Self {
        self.replies.lock().unwrap().insert(resume_id, reply);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScoringGateway for ScriptedScorer {
    async fn score(
        &self,
        resume: &ResumeRow,
        _job: &JobRow,
    ) -> Result<EvaluationResult, EvaluationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let reply = self
            .replies
            .lock()
            .unwrap()
            .get(&resume.id)
            .cloned()
            .or_else(|| self.fallback.clone());
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match reply {
            Some(ScriptedReply::Score(result)) => Ok(result),
            Some(ScriptedReply::Fail(msg)) => Err(EvaluationError::Scoring(msg)),
            None => Err(EvaluationError::Scoring("no scripted reply".to_string())),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Stub extraction gateway
// ────────────────────────────────────────────────────────────────────────────

pub struct StubExtractor {
    reply: Result<StructuredResume, String>,
    latency: Duration,
    calls: AtomicUsize,
}

impl StubExtractor {
    pub fn named(name: &str) -> Self {
        Self {
            reply: Ok(StructuredResume {
                personal_info: PersonalInfo {
                    name: name.to_string(),
                    ..PersonalInfo::default()
                },
                ..StructuredResume::default()
            }),
            latency: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            reply: Err(msg.to_string()),
            latency: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExtractionGateway for StubExtractor {
    async fn extract(&self, _raw_text: &str) -> Result<StructuredResume, EvaluationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.reply.clone().map_err(EvaluationError::Extraction)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Log capture
// ────────────────────────────────────────────────────────────────────────────

/// Collects formatted log output so tests can assert on emitted fields.
///
/// Install with `tracing::subscriber::set_default(logs.subscriber())`; the
/// guard is thread-local, which suits the current-thread `#[tokio::test]` runtime.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync {
        tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

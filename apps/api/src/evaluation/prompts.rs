// Prompt templates for the two collaborator gateways.

use crate::llm_client::prompts::UNTRUSTED_INPUT_INSTRUCTION;
use crate::models::job::JobRow;
use crate::models::resume::ResumeRow;

pub const SCORING_SYSTEM: &str = "You are an expert technical recruiter. \
    You evaluate a candidate's resume against a job posting objectively, \
    weighing hard skills, relevant experience, career progression, and education. \
    You respond with a single JSON object and nothing else.";

pub const SCORING_PROMPT_TEMPLATE: &str = r#"{untrusted}

JOB POSTING:
Title: {title}
Description: {description}
Requirements: {requirements}
Skills: {skills}
Experience Level: {experience_level}
Location: {location}

CANDIDATE RESUME:
{raw_text}

PARSED RESUME DATA:
{structured_data}

Return JSON with exactly these fields:
{
  "overallScore": number 0-100, how well the candidate matches the job,
  "skillsScore": number 0-100,
  "experienceScore": number 0-100,
  "educationScore": number 0-100,
  "breakdown": {
    "skillsMatch": [{"skill": string, "found": boolean, "relevance": number 0-100}],
    "experienceMatch": {"yearsRequired": number or null, "yearsCandidate": number or null, "relevantExperience": [string]},
    "educationMatch": {"required": string or null, "candidate": [string], "match": boolean}
  },
  "recommendation": "hire", "maybe" or "no" followed by a short reason,
  "strengths": [3 to 5 strings],
  "weaknesses": [3 to 5 strings]
}
List every required skill from the job posting in skillsMatch."#;

pub const EXTRACTION_SYSTEM: &str = "You are a meticulous resume parser. \
    You extract structured data from raw resume text without inventing details. \
    If a field is not present in the resume, omit it or use an empty array. \
    You respond with a single JSON object and nothing else.";

pub const EXTRACTION_PROMPT_TEMPLATE: &str = r#"{untrusted}

RESUME TEXT:
{raw_text}

Return JSON with these fields:
{
  "personalInfo": {"name": string, "email"?, "phone"?, "location"?, "linkedin"?, "github"?, "portfolio"?},
  "summary"?: string,
  "experience": [{"company", "position", "startDate", "endDate"?, "description", "achievements"?: [string]}],
  "education": [{"institution", "degree", "field"?, "startDate"?, "endDate"?, "gpa"?}],
  "skills": [{"category": string, "items": [string]}],
  "projects"?: [{"name", "description", "technologies": [string], "url"?}],
  "certifications"?: [{"name", "issuer", "date"?, "url"?}],
  "languages"?: [{"language", "proficiency"}]
}"#;

pub fn build_scoring_prompt(resume: &ResumeRow, job: &JobRow) -> String {
    let structured = resume
        .structured_data
        .as_ref()
        .and_then(|data| serde_json::to_string(&data.0).ok())
        .unwrap_or_else(|| "not available".to_string());

    SCORING_PROMPT_TEMPLATE
        .replace("{untrusted}", UNTRUSTED_INPUT_INSTRUCTION)
        .replace("{title}", &job.title)
        .replace("{description}", &job.description)
        .replace("{requirements}", &json_list(&job.requirements))
        .replace("{skills}", &json_list(&job.skills))
        .replace(
            "{experience_level}",
            job.experience_level
                .map(|level| level.as_str())
                .unwrap_or("not specified"),
        )
        .replace("{location}", job.location.as_deref().unwrap_or("not specified"))
        .replace("{structured_data}", &structured)
        // Last: resume text may itself contain brace placeholders.
        .replace("{raw_text}", &resume.raw_text)
}

pub fn build_extraction_prompt(raw_text: &str) -> String {
    EXTRACTION_PROMPT_TEMPLATE
        .replace("{untrusted}", UNTRUSTED_INPUT_INSTRUCTION)
        .replace("{raw_text}", raw_text)
}

fn json_list(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

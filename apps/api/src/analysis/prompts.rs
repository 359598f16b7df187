// All LLM prompt constants for resume analysis and candidate feedback.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::llm_client::prompts::{EVIDENCE_INSTRUCTION, JSON_ONLY_INSTRUCTION};

/// Resume text beyond this many characters is cut before prompting.
pub const MAX_PROMPT_DOCUMENT_CHARS: usize = 12_000;

pub fn fit_analysis_system() -> String {
    format!(
        "You are an expert technical recruiter evaluating how well a resume fits a job description. \
        {EVIDENCE_INSTRUCTION} {JSON_ONLY_INSTRUCTION}"
    )
}

/// Fit analysis prompt. Replace `{resume}`, `{resume_skills}`, `{job_description}`,
/// `{required_skills}` and `{preferred_skills}` before sending.
pub const FIT_ANALYSIS_PROMPT_TEMPLATE: &str = r#"Analyze the resume below against the job description.

Resume:
{resume}

Skills listed on the resume: {resume_skills}

Job Description:
{job_description}

Required Skills: {required_skills}
Preferred Skills: {preferred_skills}

Return a JSON object with this EXACT schema (no extra fields):
{
  "match_percentage": 72,
  "matched_skills": ["Rust", "PostgreSQL"],
  "missing_required_skills": ["Kafka"],
  "missing_preferred_skills": ["Terraform"],
  "strengths": ["Five years building backend services"],
  "gaps": ["No streaming experience"],
  "recommendations": ["Add a project that uses Kafka"]
}

Rules:
- match_percentage is an integer from 0 to 100 for the overall fit of the candidate to this role.
- matched_skills lists JD skills the resume demonstrates.
- missing_required_skills / missing_preferred_skills list JD skills the resume does not show.
- recommendations are specific actions the candidate can take to improve their fit (at most 5)."#;

pub fn feedback_system() -> String {
    format!(
        "You are a supportive career coach writing feedback for a job applicant. \
        {EVIDENCE_INSTRUCTION} Respond with plain text only, no markdown headings."
    )
}

/// Feedback prompt. Replace `{score}`, `{verdict}` and `{analysis}` before sending.
pub const FEEDBACK_PROMPT_TEMPLATE: &str = r#"Based on a resume analysis with a relevance score of {score}% (verdict: {verdict}),
write constructive feedback to help the candidate improve their application.

Analysis details:
{analysis}

Please provide:
1. A brief summary of their current standing
2. The top 3 specific actions they can take to improve their match
3. Encouragement and positive reinforcement

Keep the tone professional but friendly and encouraging.
Limit the response to 200 words."#;

/// Cuts `text` to at most `max` characters on a char boundary.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

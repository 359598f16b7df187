//! LLM-backed analysis: fit assessment of a resume against a JD, and
//! personalised feedback. Both degrade to deterministic output when the LLM
//! is not configured or its reply is unusable.

pub mod feedback;
pub mod prompts;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::analysis::prompts::{
    fit_analysis_system, truncate_chars, FIT_ANALYSIS_PROMPT_TEMPLATE, MAX_PROMPT_DOCUMENT_CHARS,
};
use crate::llm_client::prompts::fill_template;
use crate::llm_client::{parse_json_reply, LlmClient, LlmError};
use crate::parsing::jd::JobRequirements;
use crate::parsing::resume::ResumeProfile;

/// The model's structured opinion of a resume/JD pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FitAnalysis {
    #[serde(default, deserialize_with = "lenient_percentage")]
    pub match_percentage: Option<f64>,
    #[serde(default)]
    pub matched_skills: Vec<String>,
    #[serde(default)]
    pub missing_required_skills: Vec<String>,
    #[serde(default)]
    pub missing_preferred_skills: Vec<String>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub gaps: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

impl FitAnalysis {
    /// True when the reply carried nothing usable.
    pub fn is_empty(&self) -> bool {
        self.match_percentage.is_none()
            && self.matched_skills.is_empty()
            && self.missing_required_skills.is_empty()
            && self.missing_preferred_skills.is_empty()
            && self.strengths.is_empty()
            && self.gaps.is_empty()
            && self.recommendations.is_empty()
    }
}

/// Accepts `72`, `72.5`, `"72"` or `"72%"`.
fn lenient_percentage<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().trim_end_matches('%').trim().parse().ok(),
        _ => None,
    })
}

/// Asks the LLM for a fit analysis of `resume_text` against `jd_text`.
pub async fn analyze_fit(
    llm: &LlmClient,
    profile: &ResumeProfile,
    resume_text: &str,
    jd: &JobRequirements,
    jd_text: &str,
) -> Result<FitAnalysis, LlmError> {
    let prompt = fill_template(
        FIT_ANALYSIS_PROMPT_TEMPLATE,
        &[
            ("resume", truncate_chars(resume_text, MAX_PROMPT_DOCUMENT_CHARS)),
            ("resume_skills", &profile.skills.join(", ")),
            ("job_description", truncate_chars(jd_text, MAX_PROMPT_DOCUMENT_CHARS)),
            ("required_skills", &jd.required_skills.join(", ")),
            ("preferred_skills", &jd.preferred_skills.join(", ")),
        ],
    );

    let reply = llm.call_text(&prompt, &fit_analysis_system()).await?;
    Ok(parse_fit_reply(&reply))
}

/// JSON first; replies that ignore the format are read section by section.
pub fn parse_fit_reply(reply: &str) -> FitAnalysis {
    parse_json_reply::<FitAnalysis>(reply).unwrap_or_else(|_| parse_sectioned_reply(reply))
}

#[derive(Clone, Copy)]
enum ReplySection {
    Matched,
    MissingRequired,
    MissingPreferred,
    Strengths,
    Gaps,
    Recommendations,
}

/// Line-oriented reader for free-text replies ("Matched skills:", "- Rust", ...).
pub fn parse_sectioned_reply(reply: &str) -> FitAnalysis {
    let mut analysis = FitAnalysis::default();
    let mut current: Option<ReplySection> = None;

    for raw in reply.lines() {
        let line = raw.trim();
        let lower = line.to_lowercase();

        if analysis.match_percentage.is_none() && lower.contains("match") && line.contains('%') {
            analysis.match_percentage = first_number(line);
            continue;
        }

        let heading = if lower.contains("matched skills") {
            Some(ReplySection::Matched)
        } else if lower.contains("missing required") {
            Some(ReplySection::MissingRequired)
        } else if lower.contains("missing preferred") {
            Some(ReplySection::MissingPreferred)
        } else if lower.contains("strength") {
            Some(ReplySection::Strengths)
        } else if lower.contains("gap") || lower.contains("concern") {
            Some(ReplySection::Gaps)
        } else if lower.contains("recommend") {
            Some(ReplySection::Recommendations)
        } else {
            None
        };

        if heading.is_some() && (line.ends_with(':') || line.len() < 40) {
            current = heading;
            continue;
        }

        let Some(section) = current else { continue };
        if line.is_empty() || line.ends_with(':') {
            continue;
        }
        let item = line
            .trim_start_matches(|c: char| c == '-' || c == '•' || c == '*' || c.is_ascii_digit() || c == '.' || c == ')')
            .trim()
            .to_string();
        if item.is_empty() {
            continue;
        }

        let target = match section {
            ReplySection::Matched => &mut analysis.matched_skills,
            ReplySection::MissingRequired => &mut analysis.missing_required_skills,
            ReplySection::MissingPreferred => &mut analysis.missing_preferred_skills,
            ReplySection::Strengths => &mut analysis.strengths,
            ReplySection::Gaps => &mut analysis.gaps,
            ReplySection::Recommendations => &mut analysis.recommendations,
        };
        target.push(item);
    }

    analysis
}

fn first_number(line: &str) -> Option<f64> {
    let start = line.find(|c: char| c.is_ascii_digit())?;
    let number: String = line[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    number.trim_end_matches('.').parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_reply_parsed() {
        let reply = r#"{"match_percentage": 81, "matched_skills": ["Rust"], "missing_required_skills": ["Kafka"],
            "missing_preferred_skills": [], "strengths": ["Systems work"], "gaps": [], "recommendations": ["Learn Kafka"]}"#;
        let analysis = parse_fit_reply(reply);
        assert_eq!(analysis.match_percentage, Some(81.0));
        assert_eq!(analysis.missing_required_skills, vec!["Kafka"]);
        assert_eq!(analysis.recommendations, vec!["Learn Kafka"]);
    }

    #[test]
    fn test_percentage_as_string_and_missing_fields() {
        let analysis = parse_fit_reply(r#"{"match_percentage": "64%", "matched_skills": ["Go"]}"#);
        assert_eq!(analysis.match_percentage, Some(64.0));
        assert!(analysis.gaps.is_empty());
    }

    #[test]
    fn test_sectioned_reply_parsed() {
        let reply = "Overall match: 70%\n\
            Matched Skills:\n- Rust\n- PostgreSQL\n\
            Missing Required Skills:\n- Kafka\n\
            Missing Preferred Skills:\n\
            Strengths:\n1. Strong systems background\n\
            Gaps or concerns:\n* No cloud exposure\n\
            Recommendations:\n- Build a Kafka side project";
        let analysis = parse_fit_reply(reply);
        assert_eq!(analysis.match_percentage, Some(70.0));
        assert_eq!(analysis.matched_skills, vec!["Rust", "PostgreSQL"]);
        assert_eq!(analysis.missing_required_skills, vec!["Kafka"]);
        assert!(analysis.missing_preferred_skills.is_empty());
        assert_eq!(analysis.strengths, vec!["Strong systems background"]);
        assert_eq!(analysis.gaps, vec!["No cloud exposure"]);
        assert_eq!(analysis.recommendations, vec!["Build a Kafka side project"]);
    }

    #[test]
    fn test_unusable_reply_is_empty() {
        let analysis = parse_fit_reply("I cannot help with that.");
        assert!(analysis.is_empty());
    }
}

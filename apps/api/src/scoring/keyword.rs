//! Keyword (hard) match between the JD's skills and the resume.
//!
//! Per JD skill:
//! - exact resume skill (case-insensitive) → 1.0
//! - resume skill with normalised Levenshtein similarity > 0.8 → 0.8
//! - word-bounded mention anywhere in the resume text → 0.6
//! - otherwise → 0.0
//!
//! hard_match_score = Σ strength / n × 100 over the required skills, or over
//! the preferred skills when none are required. No skills at all → 50.

use serde::{Deserialize, Serialize};

use crate::parsing::jd::JobRequirements;
use crate::parsing::resume::ResumeProfile;

const FUZZY_THRESHOLD: f64 = 0.8;
/// Minimum strength for a skill to count as matched.
pub const MATCH_THRESHOLD: f64 = 0.6;
pub const NEUTRAL_SCORE: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    Fuzzy,
    Mention,
    Missing,
}

impl MatchKind {
    pub fn strength(self) -> f64 {
        match self {
            MatchKind::Exact => 1.0,
            MatchKind::Fuzzy => 0.8,
            MatchKind::Mention => 0.6,
            MatchKind::Missing => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillEvidence {
    pub skill: String,
    pub kind: MatchKind,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillMatch {
    pub hard_match_score: f64,
    pub matched_skills: Vec<String>,
    pub missing_required_skills: Vec<String>,
    pub missing_preferred_skills: Vec<String>,
    pub evidence: Vec<SkillEvidence>,
}

pub fn match_skills(profile: &ResumeProfile, resume_text: &str, jd: &JobRequirements) -> SkillMatch {
    let resume_skills: Vec<String> = profile.skills.iter().map(|s| s.to_lowercase()).collect();
    let text_lower = resume_text.to_lowercase();

    let evidence: Vec<SkillEvidence> = jd
        .required_skills
        .iter()
        .map(|s| (s, true))
        .chain(jd.preferred_skills.iter().map(|s| (s, false)))
        .map(|(skill, required)| SkillEvidence {
            skill: skill.clone(),
            kind: classify(skill, &resume_skills, &text_lower),
            required,
        })
        .collect();

    let is_matched = |e: &&SkillEvidence| e.kind.strength() >= MATCH_THRESHOLD;

    let matched_skills = evidence
        .iter()
        .filter(is_matched)
        .map(|e| e.skill.clone())
        .collect();
    let missing_required_skills = evidence
        .iter()
        .filter(|e| e.required && !is_matched(e))
        .map(|e| e.skill.clone())
        .collect();
    let missing_preferred_skills = evidence
        .iter()
        .filter(|e| !e.required && !is_matched(e))
        .map(|e| e.skill.clone())
        .collect();

    let scored: Vec<f64> = jd
        .primary_skills()
        .iter()
        .map(|skill| classify(skill, &resume_skills, &text_lower).strength())
        .collect();

    let hard_match_score = if scored.is_empty() {
        NEUTRAL_SCORE
    } else {
        (scored.iter().sum::<f64>() / scored.len() as f64 * 100.0).clamp(0.0, 100.0)
    };

    SkillMatch {
        hard_match_score,
        matched_skills,
        missing_required_skills,
        missing_preferred_skills,
        evidence,
    }
}

fn classify(skill: &str, resume_skills: &[String], text_lower: &str) -> MatchKind {
    let skill_lower = skill.trim().to_lowercase();
    if skill_lower.is_empty() {
        return MatchKind::Missing;
    }

    if resume_skills.iter().any(|s| *s == skill_lower) {
        MatchKind::Exact
    } else if resume_skills
        .iter()
        .any(|s| strsim::normalized_levenshtein(s, &skill_lower) > FUZZY_THRESHOLD)
    {
        MatchKind::Fuzzy
    } else if contains_term(text_lower, &skill_lower) {
        MatchKind::Mention
    } else {
        MatchKind::Missing
    }
}

/// Word-bounded substring search: "go" matches "Go, Rust" but not "google".
pub fn contains_term(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + needle.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(skills: &[&str]) -> ResumeProfile {
        ResumeProfile {
            skills: skills.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn jd(required: &[&str], preferred: &[&str]) -> JobRequirements {
        JobRequirements {
            title: "Engineer".to_string(),
            required_skills: required.iter().map(|s| s.to_string()).collect(),
            preferred_skills: preferred.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_all_required_exact_scores_100() {
        let report = match_skills(
            &profile(&["Rust", "PostgreSQL"]),
            "",
            &jd(&["rust", "postgresql"], &[]),
        );
        assert!((report.hard_match_score - 100.0).abs() < 1e-9);
        assert_eq!(report.matched_skills, vec!["rust", "postgresql"]);
        assert!(report.missing_required_skills.is_empty());
    }

    #[test]
    fn test_fuzzy_match_scores_0_8() {
        let report = match_skills(&profile(&["JavaScript"]), "", &jd(&["Java Script"], &[]));
        assert_eq!(report.evidence[0].kind, MatchKind::Fuzzy);
        assert!((report.hard_match_score - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_text_mention_scores_0_6() {
        let report = match_skills(
            &profile(&[]),
            "Deployed services on Kubernetes clusters",
            &jd(&["Kubernetes"], &[]),
        );
        assert_eq!(report.evidence[0].kind, MatchKind::Mention);
        assert!((report.hard_match_score - 60.0).abs() < 1e-9);
        assert_eq!(report.matched_skills, vec!["Kubernetes"]);
    }

    #[test]
    fn test_missing_skills_split_by_priority() {
        let report = match_skills(
            &profile(&["Rust"]),
            "Rust developer",
            &jd(&["Rust", "Kafka"], &["Terraform"]),
        );
        assert_eq!(report.missing_required_skills, vec!["Kafka"]);
        assert_eq!(report.missing_preferred_skills, vec!["Terraform"]);
        assert!((report.hard_match_score - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_preferred_used_when_no_required() {
        let report = match_skills(&profile(&["Excel"]), "", &jd(&[], &["Excel", "Tableau"]));
        assert!((report.hard_match_score - 50.0).abs() < 1e-9);
        assert_eq!(report.missing_preferred_skills, vec!["Tableau"]);
    }

    #[test]
    fn test_no_skills_is_neutral() {
        let report = match_skills(&profile(&["Rust"]), "Rust", &jd(&[], &[]));
        assert_eq!(report.hard_match_score, NEUTRAL_SCORE);
        assert!(report.matched_skills.is_empty());
    }

    #[test]
    fn test_contains_term_respects_word_boundaries() {
        assert!(contains_term("go, rust and c++", "go"));
        assert!(contains_term("go, rust and c++", "c++"));
        assert!(!contains_term("worked at google", "go"));
        assert!(!contains_term("javascript", "java"));
    }
}

//! JD Parser: extracts the title, required and preferred skills, experience
//! and education requirements, and responsibilities from a job description.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::parsing::sections::{
    dedup_case_insensitive, split_items, split_lines, split_sections, Section,
};

const MAX_SKILL_LEN: usize = 50;
const MAX_SKILL_WORDS: usize = 5;
const MAX_RESPONSIBILITIES: usize = 10;
pub const NOT_SPECIFIED: &str = "Not specified";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JdSection {
    Required,
    Preferred,
    Responsibilities,
    Other,
}

const JD_HEADINGS: &[(JdSection, &[&str])] = &[
    (
        JdSection::Required,
        &[
            "required skills",
            "required skill",
            "required",
            "requirements",
            "key requirements",
            "required qualifications",
            "minimum qualifications",
            "qualifications",
            "must have",
            "must-have",
            "must haves",
            "mandatory skills",
        ],
    ),
    (
        JdSection::Preferred,
        &[
            "preferred skills",
            "preferred",
            "preferred qualifications",
            "nice to have",
            "nice-to-have",
            "good to have",
            "desired skills",
            "bonus",
            "bonus points",
        ],
    ),
    (
        JdSection::Responsibilities,
        &[
            "responsibilities",
            "key responsibilities",
            "roles & responsibilities",
            "role & responsibilities",
            "duties",
            "you will",
            "what you'll do",
            "what you will do",
        ],
    ),
    (
        JdSection::Other,
        &[
            "about us",
            "about the company",
            "about the role",
            "about",
            "benefits",
            "perks",
            "what we offer",
            "position",
            "job title",
            "role",
            "location",
            "company",
            "experience",
            "education",
            "salary",
        ],
    ),
];

static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^\s*(?:position|job title|role)\s*:\s*(.+?)\s*$").unwrap()
});
static EXPERIENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:minimum\s+(?:of\s+)?|at\s+least\s+)?\b(\d{1,2})\s*(?:\+|(?:-|–|to)\s*\d{1,2})?\s*\+?\s*(?:years?|yrs?)\b",
    )
    .unwrap()
});
static EDUCATION_RES: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    vec![
        (
            "bachelor",
            Regex::new(r"(?i)\b(bachelor|btech|b\.tech|b\.sc|bsc|b\.e\.|undergraduate)").unwrap(),
        ),
        (
            "master",
            Regex::new(r"(?i)\b(master|mtech|m\.tech|m\.sc|msc|mba)").unwrap(),
        ),
        (
            "graduate",
            Regex::new(r"(?i)\b(graduation|graduate|post.?graduate|pg)\b").unwrap(),
        ),
    ]
});

/// Structured requirements of a job description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobRequirements {
    pub title: String,
    pub required_skills: Vec<String>,
    pub preferred_skills: Vec<String>,
    /// Verbatim phrase, e.g. "3+ years", or "Not specified".
    pub experience_required: String,
    /// Lower bound of the experience requirement in years.
    pub min_years: Option<f64>,
    pub education_required: Vec<String>,
    pub responsibilities: Vec<String>,
}

impl JobRequirements {
    /// Required skills when listed, otherwise the preferred ones.
    pub fn primary_skills(&self) -> &[String] {
        if self.required_skills.is_empty() {
            &self.preferred_skills
        } else {
            &self.required_skills
        }
    }
}

pub fn parse_job_description(text: &str) -> JobRequirements {
    let sections = split_sections(text, JD_HEADINGS);
    let (experience_required, min_years) = extract_experience_requirement(text);

    JobRequirements {
        title: extract_job_title(text),
        required_skills: extract_skills(&sections, JdSection::Required),
        preferred_skills: extract_skills(&sections, JdSection::Preferred),
        experience_required,
        min_years,
        education_required: extract_education_requirement(text),
        responsibilities: extract_responsibilities(&sections),
    }
}

pub fn extract_job_title(text: &str) -> String {
    if let Some(caps) = TITLE_RE.captures(text) {
        return caps[1].to_string();
    }
    text.lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("Unknown Position")
        .to_string()
}

fn extract_skills(sections: &[Section<JdSection>], kind: JdSection) -> Vec<String> {
    let bodies = sections
        .iter()
        .filter(|s| s.kind == kind)
        .flat_map(|s| s.body());
    let items = split_items(bodies)
        .into_iter()
        // requirement sentences are not skills
        .filter(|s| s.len() < MAX_SKILL_LEN && s.split_whitespace().count() <= MAX_SKILL_WORDS)
        .collect();
    dedup_case_insensitive(items)
}

/// Returns the verbatim experience phrase and its lower bound in years.
pub fn extract_experience_requirement(text: &str) -> (String, Option<f64>) {
    match EXPERIENCE_RE.captures(text) {
        Some(caps) => {
            let phrase = caps[0].trim().to_string();
            let years = caps[1].parse::<f64>().ok();
            (phrase, years)
        }
        None => (NOT_SPECIFIED.to_string(), None),
    }
}

pub fn extract_education_requirement(text: &str) -> Vec<String> {
    EDUCATION_RES
        .iter()
        .filter(|(_, re)| re.is_match(text))
        .map(|(label, _)| label.to_string())
        .collect()
}

fn extract_responsibilities(sections: &[Section<JdSection>]) -> Vec<String> {
    let bodies = sections
        .iter()
        .filter(|s| s.kind == JdSection::Responsibilities)
        .flat_map(|s| s.body());
    split_lines(bodies)
        .into_iter()
        .filter(|r| r.chars().count() > 20)
        .take(MAX_RESPONSIBILITIES)
        .collect()
}

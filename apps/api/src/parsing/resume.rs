//! Resume Parser: pulls contact details, skills, experience, education,
//! projects and certifications out of cleaned resume text.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::parsing::sections::{
    dedup_case_insensitive, split_items, split_lines, split_sections, Section,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResumeSection {
    Skills,
    Experience,
    Education,
    Projects,
    Certifications,
    /// Any other heading; only terminates the previous section.
    Other,
}

const RESUME_HEADINGS: &[(ResumeSection, &[&str])] = &[
    (
        ResumeSection::Skills,
        &[
            "skills",
            "skill set",
            "key skills",
            "technical skills",
            "core competencies",
            "core competency",
            "technologies",
            "tools & technologies",
        ],
    ),
    (
        ResumeSection::Experience,
        &[
            "experience",
            "work experience",
            "professional experience",
            "employment history",
            "work history",
        ],
    ),
    (
        ResumeSection::Education,
        &[
            "education",
            "academic background",
            "academics",
            "qualifications",
            "academic qualifications",
        ],
    ),
    (
        ResumeSection::Projects,
        &["projects", "project", "personal projects", "academic projects", "key projects"],
    ),
    (
        ResumeSection::Certifications,
        &[
            "certifications",
            "certification",
            "certificates",
            "licenses & certifications",
        ],
    ),
    (
        ResumeSection::Other,
        &[
            "summary",
            "professional summary",
            "objective",
            "career objective",
            "profile",
            "achievements",
            "awards",
            "interests",
            "hobbies",
            "languages",
            "references",
            "publications",
            "contact",
        ],
    ),
];

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap());
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+?\(?\d[\d \t().-]{8,}\d").unwrap());
static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(19|20)\d{2}\b").unwrap());
static CERTIFIED_IN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)certified\s+in\s+([^,.;\n]+)").unwrap());
static DOCTORATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(ph\.?\s?d|doctorate)\b").unwrap());
static MASTER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(master|mtech|m\.tech|m\.sc|msc|mba|m\.s\.|m\.e\.)").unwrap()
});
static BACHELOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(bachelor|btech|b\.tech|b\.sc|bsc|b\.e\.|b\.s\.|b\.a\.)").unwrap()
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EducationLevel {
    Bachelor,
    Master,
    Doctorate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub level: EducationLevel,
    pub text: String,
}

/// Structured view of a resume.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeProfile {
    pub name: Option<String>,
    pub contact: ContactInfo,
    pub skills: Vec<String>,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub projects: Vec<String>,
    pub certifications: Vec<String>,
}

pub fn parse_resume(text: &str) -> ResumeProfile {
    let sections = split_sections(text, RESUME_HEADINGS);

    ResumeProfile {
        name: guess_name(text),
        contact: extract_contact(text),
        skills: extract_skills(&sections),
        experience: extract_experience(&sections),
        education: extract_education(&sections),
        projects: extract_projects(&sections),
        certifications: extract_certifications(&sections, text),
    }
}

/// The first line is taken as the candidate's name when it looks like one.
fn guess_name(text: &str) -> Option<String> {
    let first = text.lines().map(str::trim).find(|l| !l.is_empty())?;
    let words: Vec<&str> = first.split_whitespace().collect();
    let looks_like_name = (2..=4).contains(&words.len())
        && words
            .iter()
            .all(|w| w.chars().all(|c| c.is_alphabetic() || c == '.' || c == '\'' || c == '-'));
    looks_like_name.then(|| first.to_string())
}

pub fn extract_contact(text: &str) -> ContactInfo {
    let email = EMAIL_RE.find(text).map(|m| m.as_str().to_string());
    let phone = PHONE_RE
        .find_iter(text)
        .map(|m| m.as_str().trim())
        .find(|candidate| {
            let digits = candidate.chars().filter(|c| c.is_ascii_digit()).count();
            (10..=15).contains(&digits)
        })
        .map(String::from);

    ContactInfo { email, phone }
}

fn section_bodies(sections: &[Section<ResumeSection>], kind: ResumeSection) -> Vec<&str> {
    sections
        .iter()
        .filter(|s| s.kind == kind)
        .flat_map(|s| s.body())
        .collect()
}

fn extract_skills(sections: &[Section<ResumeSection>]) -> Vec<String> {
    let items = split_items(section_bodies(sections, ResumeSection::Skills))
        .into_iter()
        // drop sentences that slipped into the skills block
        .filter(|s| s.len() <= 50 && s.split_whitespace().count() <= 5)
        .collect();
    dedup_case_insensitive(items)
}

fn extract_experience(sections: &[Section<ResumeSection>]) -> Vec<ExperienceEntry> {
    let mut entries: Vec<ExperienceEntry> = Vec::new();

    for line in split_lines(section_bodies(sections, ResumeSection::Experience)) {
        let starts_entry = entries.is_empty() || YEAR_RE.is_match(&line);
        if starts_entry {
            entries.push(ExperienceEntry { description: line });
        } else if let Some(current) = entries.last_mut() {
            current.description.push(' ');
            current.description.push_str(&line);
        }
    }

    entries
}

fn extract_education(sections: &[Section<ResumeSection>]) -> Vec<EducationEntry> {
    let text = section_bodies(sections, ResumeSection::Education).join(" ");
    if text.is_empty() {
        return Vec::new();
    }
    let excerpt: String = text.chars().take(200).collect();

    [
        (EducationLevel::Bachelor, &*BACHELOR_RE),
        (EducationLevel::Master, &*MASTER_RE),
        (EducationLevel::Doctorate, &*DOCTORATE_RE),
    ]
    .into_iter()
    .filter(|(_, re)| re.is_match(&text))
    .map(|(level, _)| EducationEntry {
        level,
        text: excerpt.clone(),
    })
    .collect()
}

fn extract_projects(sections: &[Section<ResumeSection>]) -> Vec<String> {
    split_lines(section_bodies(sections, ResumeSection::Projects))
        .into_iter()
        .filter(|p| p.chars().count() > 20)
        .collect()
}

fn extract_certifications(sections: &[Section<ResumeSection>], text: &str) -> Vec<String> {
    let mut certs = split_lines(section_bodies(sections, ResumeSection::Certifications));
    certs.extend(
        CERTIFIED_IN_RE
            .captures_iter(text)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty()),
    );
    dedup_case_insensitive(certs)
}

//! Scoring engine: combines hard match, semantic match and experience match
//! into the overall relevance score and verdict.

use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Result};
use serde::{Deserialize, Deserializer, Serialize};

use crate::analysis::FitAnalysis;
use crate::scoring::keyword::SkillMatch;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub hard_match: f64,
    pub semantic: f64,
    pub experience: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            hard_match: 0.4,
            semantic: 0.4,
            experience: 0.2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Normalised so the three weights sum to 1.
    pub weights: ScoringWeights,
    pub high_threshold: f64,
    pub medium_threshold: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            high_threshold: 75.0,
            medium_threshold: 50.0,
        }
    }
}

impl ScoringConfig {
    pub fn new(weights: ScoringWeights, high_threshold: f64, medium_threshold: f64) -> Result<Self> {
        let ScoringWeights {
            hard_match,
            semantic,
            experience,
        } = weights;
        if [hard_match, semantic, experience]
            .iter()
            .any(|w| !w.is_finite() || *w < 0.0)
        {
            bail!("Scoring weights must be finite and non-negative, got {weights:?}");
        }
        let sum = hard_match + semantic + experience;
        if sum <= 0.0 {
            bail!("Scoring weights must not all be zero");
        }
        if !(0.0..=100.0).contains(&medium_threshold)
            || !(0.0..=100.0).contains(&high_threshold)
            || medium_threshold > high_threshold
        {
            bail!(
                "Thresholds must satisfy 0 <= medium ({medium_threshold}) <= high ({high_threshold}) <= 100"
            );
        }

        Ok(Self {
            weights: ScoringWeights {
                hard_match: hard_match / sum,
                semantic: semantic / sum,
                experience: experience / sum,
            },
            high_threshold,
            medium_threshold,
        })
    }

    pub fn verdict(&self, score: f64) -> Verdict {
        if score >= self.high_threshold {
            Verdict::High
        } else if score >= self.medium_threshold {
            Verdict::Medium
        } else {
            Verdict::Low
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    High,
    Medium,
    Low,
}

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::High => "HIGH",
            Verdict::Medium => "MEDIUM",
            Verdict::Low => "LOW",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verdict {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HIGH" => Ok(Verdict::High),
            "MEDIUM" => Ok(Verdict::Medium),
            "LOW" => Ok(Verdict::Low),
            other => Err(format!("unknown verdict '{other}' (expected HIGH, MEDIUM or LOW)")),
        }
    }
}

// Case-insensitive, so query strings accept `?verdict=high`.
impl<'de> Deserialize<'de> for Verdict {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Everything the engine needs for one resume/JD pair.
pub struct ScoreInputs<'a> {
    pub skill_match: &'a SkillMatch,
    pub lexical_similarity: f64,
    pub experience_score: f64,
    /// `None` when the LLM was not configured or its call failed.
    pub analysis: Option<&'a FitAnalysis>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub overall_score: f64,
    pub verdict: Verdict,
    pub hard_match_score: f64,
    pub semantic_score: f64,
    pub lexical_similarity: f64,
    pub experience_score: f64,
    pub matched_skills: Vec<String>,
    pub missing_required_skills: Vec<String>,
    pub missing_preferred_skills: Vec<String>,
    pub recommendations: Vec<String>,
    pub strengths: Vec<String>,
    pub gaps: Vec<String>,
    /// "llm" when an LLM analysis contributed, otherwise "keyword".
    pub analysis_source: String,
}

pub fn compute_breakdown(config: &ScoringConfig, inputs: ScoreInputs<'_>) -> ScoreBreakdown {
    let ScoreInputs {
        skill_match,
        lexical_similarity,
        experience_score,
        analysis,
    } = inputs;

    let llm_match = analysis
        .and_then(|a| a.match_percentage)
        .filter(|p| p.is_finite())
        .map(|p| p.clamp(0.0, 100.0));
    let semantic_score = llm_match.unwrap_or(lexical_similarity);

    let w = &config.weights;
    let overall = (skill_match.hard_match_score * w.hard_match
        + semantic_score * w.semantic
        + experience_score * w.experience)
        .clamp(0.0, 100.0);
    let overall_score = round2(overall);

    // An analysis that is present is authoritative, empty lists included.
    let pick = |from_llm: Option<&Vec<String>>, fallback: &Vec<String>| -> Vec<String> {
        from_llm.unwrap_or(fallback).clone()
    };

    let missing_required_skills = pick(
        analysis.map(|a| &a.missing_required_skills),
        &skill_match.missing_required_skills,
    );
    let missing_preferred_skills = pick(
        analysis.map(|a| &a.missing_preferred_skills),
        &skill_match.missing_preferred_skills,
    );
    let recommendations = match analysis.map(|a| &a.recommendations) {
        Some(list) if !list.is_empty() => list.clone(),
        _ => default_recommendations(&missing_required_skills, &missing_preferred_skills),
    };

    ScoreBreakdown {
        overall_score,
        verdict: config.verdict(overall_score),
        hard_match_score: round2(skill_match.hard_match_score),
        semantic_score: round2(semantic_score),
        lexical_similarity: round2(lexical_similarity),
        experience_score: round2(experience_score),
        matched_skills: pick(analysis.map(|a| &a.matched_skills), &skill_match.matched_skills),
        missing_required_skills,
        missing_preferred_skills,
        recommendations,
        strengths: analysis.map(|a| a.strengths.clone()).unwrap_or_default(),
        gaps: analysis.map(|a| a.gaps.clone()).unwrap_or_default(),
        analysis_source: if llm_match.is_some() { "llm" } else { "keyword" }.to_string(),
    }
}

/// Suggestions derived from missing skills when no LLM recommendations exist.
pub fn default_recommendations(missing_required: &[String], missing_preferred: &[String]) -> Vec<String> {
    let mut recs: Vec<String> = missing_required
        .iter()
        .take(3)
        .map(|s| format!("Gain hands-on experience with {s} and show it in a project or role description."))
        .collect();

    if !missing_preferred.is_empty() {
        let top: Vec<&str> = missing_preferred.iter().take(3).map(String::as_str).collect();
        recs.push(format!(
            "Consider picking up preferred skills: {}.",
            top.join(", ")
        ));
    }

    if recs.is_empty() {
        recs.push(
            "Quantify achievements in your experience section to strengthen an already good match."
                .to_string(),
        );
    }
    recs
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

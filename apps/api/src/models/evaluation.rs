use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use crate::scoring::engine::ScoreBreakdown;

/// A stored evaluation. Rows are written once and never updated.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EvaluationRow {
    pub id: i64,
    pub batch_id: Option<String>,
    pub candidate_name: String,
    pub candidate_email: Option<String>,
    pub job_title: String,
    pub company: String,
    pub location: String,
    pub resume_filename: String,
    pub jd_filename: String,
    pub overall_score: f64,
    pub verdict: String,
    pub hard_match_score: f64,
    pub semantic_score: f64,
    pub lexical_similarity: f64,
    pub experience_score: f64,
    pub matched_skills: Json<Vec<String>>,
    pub missing_required_skills: Json<Vec<String>>,
    pub missing_preferred_skills: Json<Vec<String>>,
    pub recommendations: Json<Vec<String>>,
    pub strengths: Json<Vec<String>>,
    pub gaps: Json<Vec<String>>,
    pub analysis_source: String,
    pub feedback: String,
    pub evaluated_at: DateTime<Utc>,
}

impl EvaluationRow {
    pub fn missing_skill_count(&self) -> usize {
        self.missing_required_skills.len() + self.missing_preferred_skills.len()
    }
}

/// Everything needed to insert an evaluation row.
#[derive(Debug, Clone)]
pub struct NewEvaluation {
    pub batch_id: Option<String>,
    pub candidate_name: String,
    pub candidate_email: Option<String>,
    pub job_title: String,
    pub company: String,
    pub location: String,
    pub resume_filename: String,
    pub jd_filename: String,
    pub breakdown: ScoreBreakdown,
    pub feedback: String,
    pub evaluated_at: DateTime<Utc>,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobDescriptionRow {
    pub id: i64,
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub required_skills: Json<Vec<String>>,
    pub preferred_skills: Json<Vec<String>>,
    pub experience_required: String,
    pub education_required: Json<Vec<String>>,
    pub responsibilities: Json<Vec<String>>,
    pub uploaded_at: DateTime<Utc>,
}

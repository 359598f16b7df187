use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::models::job_description::JobDescriptionRow;
use crate::parsing::document::clean_text;
use crate::parsing::jd::parse_job_description;
use crate::state::AppState;
use crate::store::job_descriptions::{
    get_job_description, insert_job_description, list_job_descriptions,
};

#[derive(Deserialize)]
pub struct CreateJobRequest {
    pub description: String,
    pub company: Option<String>,
    pub location: Option<String>,
}

/// POST /api/v1/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    Json(req): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<JobDescriptionRow>), AppError> {
    let description = clean_text(&req.description);
    if description.is_empty() {
        return Err(AppError::Validation(
            "Job description text must not be empty".to_string(),
        ));
    }

    let requirements = parse_job_description(&description);
    let or_unknown = |v: Option<String>| {
        v.map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "Unknown".to_string())
    };

    let stored = insert_job_description(
        &state.db,
        &requirements,
        &or_unknown(req.company),
        &or_unknown(req.location),
        &description,
    )
    .await?;
    info!("Stored job description {} ('{}')", stored.id, stored.title);
    Ok((StatusCode::CREATED, Json(stored)))
}

/// GET /api/v1/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
) -> Result<Json<Vec<JobDescriptionRow>>, AppError> {
    Ok(Json(list_job_descriptions(&state.db).await?))
}

/// GET /api/v1/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<JobDescriptionRow>, AppError> {
    let job = get_job_description(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job description {id} not found")))?;
    Ok(Json(job))
}

use axum::{extract::State, Json};
use serde::Serialize;

use crate::errors::AppError;
use crate::llm_client::MODEL;
use crate::scoring::engine::{ScoringWeights, Verdict};
use crate::state::AppState;
use crate::store::evaluations::count_evaluations;
use crate::store::job_descriptions::count_job_descriptions;

#[derive(Serialize)]
pub struct SettingsResponse {
    pub weights: ScoringWeights,
    pub high_threshold: f64,
    pub medium_threshold: f64,
    pub verdicts: [Verdict; 3],
    pub llm_configured: bool,
    pub llm_model: Option<&'static str>,
    pub semantic_backend: &'static str,
    pub max_upload_size: usize,
    pub batch_concurrency: usize,
    pub total_evaluations: i64,
    pub total_job_descriptions: i64,
}

/// GET /api/v1/settings
/// Read-only view of the environment-driven configuration.
pub async fn handle_settings(State(state): State<AppState>) -> Result<Json<SettingsResponse>, AppError> {
    let scoring = state.processor.scoring();
    let llm_configured = state.processor.llm_configured();

    Ok(Json(SettingsResponse {
        weights: scoring.weights,
        high_threshold: scoring.high_threshold,
        medium_threshold: scoring.medium_threshold,
        verdicts: [Verdict::High, Verdict::Medium, Verdict::Low],
        llm_configured,
        llm_model: llm_configured.then_some(MODEL),
        semantic_backend: state.processor.semantic_backend(),
        max_upload_size: state.config.max_upload_size,
        batch_concurrency: state.config.batch_concurrency,
        total_evaluations: count_evaluations(&state.db).await?,
        total_job_descriptions: count_job_descriptions(&state.db).await?,
    }))
}

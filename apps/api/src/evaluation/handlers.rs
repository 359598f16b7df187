use axum::{
    extract::{rejection::QueryRejection, Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::evaluation::batch::{process_batch, BatchReport};
use crate::evaluation::processor::CandidateInfo;
use crate::models::evaluation::EvaluationRow;
use crate::parsing::document::SourceDocument;
use crate::report::{render_csv, render_text_report};
use crate::state::AppState;
use crate::store::evaluations::{delete_all, get_evaluation, list_evaluations, EvaluationFilter};

const PASTED_JD_FILENAME: &str = "job_description.txt";

/// Fields collected from an evaluation or batch upload.
#[derive(Default)]
struct UploadForm {
    resumes: Vec<SourceDocument>,
    jd_file: Option<SourceDocument>,
    jd_text: Option<String>,
    candidate: CandidateInfo,
}

impl UploadForm {
    /// An uploaded JD file wins over pasted text.
    fn job_description(&mut self) -> Result<SourceDocument, AppError> {
        if let Some(doc) = self.jd_file.take() {
            return Ok(doc);
        }
        match self.jd_text.take() {
            Some(text) => Ok(SourceDocument::from_text(PASTED_JD_FILENAME, &text)),
            None => Err(AppError::Validation(
                "A job description is required: upload 'jd' or provide 'jd_text'".to_string(),
            )),
        }
    }
}

async fn read_upload(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "resume" | "resumes" | "jd" => {
                let filename = field.file_name().unwrap_or(name.as_str()).to_string();
                let bytes = field.bytes().await?;
                if bytes.is_empty() {
                    continue;
                }
                let doc = SourceDocument::new(filename, bytes.to_vec());
                if name == "jd" {
                    form.jd_file = Some(doc);
                } else {
                    form.resumes.push(doc);
                }
            }
            "jd_text" => {
                let text = field.text().await?;
                if !text.trim().is_empty() {
                    form.jd_text = Some(text);
                }
            }
            "candidate_name" => form.candidate.name = Some(field.text().await?),
            "company" => form.candidate.company = Some(field.text().await?),
            "location" => form.candidate.location = Some(field.text().await?),
            other => tracing::debug!("Ignoring unknown multipart field '{other}'"),
        }
    }

    Ok(form)
}

/// POST /api/v1/evaluations
pub async fn handle_create_evaluation(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<EvaluationRow>), AppError> {
    let mut form = read_upload(multipart).await?;
    let resume = form
        .resumes
        .drain(..)
        .next()
        .ok_or_else(|| AppError::Validation("A resume file is required in field 'resume'".to_string()))?;
    let jd = form.job_description()?;

    let evaluation = state
        .processor
        .process(&resume, &jd, &form.candidate, None)
        .await?;
    Ok((StatusCode::CREATED, Json(evaluation)))
}

/// POST /api/v1/batches
pub async fn handle_create_batch(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<BatchReport>, AppError> {
    let mut form = read_upload(multipart).await?;
    if form.resumes.is_empty() {
        return Err(AppError::Validation(
            "A batch needs at least one file in field 'resumes'".to_string(),
        ));
    }
    let jd = form.job_description()?;

    let report = process_batch(
        &state.processor,
        std::mem::take(&mut form.resumes),
        &jd,
        &form.candidate,
        state.config.batch_concurrency,
    )
    .await?;
    Ok(Json(report))
}

/// GET /api/v1/evaluations
pub async fn handle_list_evaluations(
    State(state): State<AppState>,
    query: Result<Query<EvaluationFilter>, QueryRejection>,
) -> Result<Json<Vec<EvaluationRow>>, AppError> {
    let Query(filter) = query?;
    Ok(Json(list_evaluations(&state.db, &filter).await?))
}

/// GET /api/v1/evaluations/export
pub async fn handle_export_evaluations(
    State(state): State<AppState>,
    query: Result<Query<EvaluationFilter>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(filter) = query?;
    let evaluations = list_evaluations(&state.db, &filter).await?;
    let csv = render_csv(&evaluations)?;
    let disposition = format!(
        "attachment; filename=\"evaluations_{}.csv\"",
        Utc::now().format("%Y%m%d_%H%M%S")
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    ))
}

/// GET /api/v1/evaluations/:id
pub async fn handle_get_evaluation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<EvaluationRow>, AppError> {
    let evaluation = get_evaluation(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Evaluation {id} not found")))?;
    Ok(Json(evaluation))
}

/// GET /api/v1/evaluations/:id/report
pub async fn handle_evaluation_report(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let evaluation = get_evaluation(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Evaluation {id} not found")))?;
    let report = render_text_report(&evaluation, Utc::now());
    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], report))
}

#[derive(Deserialize)]
pub struct ConfirmQuery {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub deleted: u64,
}

/// DELETE /api/v1/evaluations?confirm=true
pub async fn handle_delete_evaluations(
    State(state): State<AppState>,
    query: Result<Query<ConfirmQuery>, QueryRejection>,
) -> Result<Json<DeleteResponse>, AppError> {
    let Query(query) = query?;
    if !query.confirm {
        return Err(AppError::Validation(
            "Deleting all evaluations requires '?confirm=true'".to_string(),
        ));
    }
    let deleted = delete_all(&state.db).await?;
    tracing::warn!("Deleted all {deleted} stored evaluations");
    Ok(Json(DeleteResponse { deleted }))
}

pub mod health;
pub mod settings;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::dashboard::handle_dashboard;
use crate::evaluation::handlers;
use crate::jobs::handlers as jobs;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let max_upload_size = state.config.max_upload_size;

    Router::new()
        .route("/health", get(health::health_handler))
        // Evaluations
        .route(
            "/api/v1/evaluations",
            post(handlers::handle_create_evaluation)
                .get(handlers::handle_list_evaluations)
                .delete(handlers::handle_delete_evaluations),
        )
        .route(
            "/api/v1/evaluations/export",
            get(handlers::handle_export_evaluations),
        )
        .route("/api/v1/evaluations/:id", get(handlers::handle_get_evaluation))
        .route(
            "/api/v1/evaluations/:id/report",
            get(handlers::handle_evaluation_report),
        )
        .route("/api/v1/batches", post(handlers::handle_create_batch))
        // Job description library
        .route(
            "/api/v1/jobs",
            post(jobs::handle_create_job).get(jobs::handle_list_jobs),
        )
        .route("/api/v1/jobs/:id", get(jobs::handle_get_job))
        .route("/api/v1/dashboard", get(handle_dashboard))
        .route("/api/v1/settings", get(settings::handle_settings))
        .layer(DefaultBodyLimit::max(max_upload_size))
        .with_state(state)
}

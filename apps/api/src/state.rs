use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::Config;
use crate::evaluation::processor::ResumeProcessor;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Config,
    /// Owns the LLM client, semantic scorer and scoring weights.
    pub processor: Arc<ResumeProcessor>,
}

use anyhow::{bail, Context, Result};

use crate::scoring::engine::{ScoringConfig, ScoringWeights};

/// Application configuration loaded from environment variables.
/// Only the LLM key is optional; everything else has a default.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub anthropic_api_key: Option<String>,
    /// Overrides the Anthropic host, e.g. for a proxy.
    pub anthropic_base_url: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub max_upload_size: usize,
    pub batch_concurrency: usize,
    pub scoring: ScoringConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let weights = ScoringWeights {
            hard_match: parse_env("HARD_MATCH_WEIGHT", 0.4)?,
            semantic: parse_env("SEMANTIC_MATCH_WEIGHT", 0.4)?,
            experience: parse_env("EXPERIENCE_WEIGHT", 0.2)?,
        };
        let scoring = ScoringConfig::new(
            weights,
            parse_env("HIGH_RELEVANCE_THRESHOLD", 75.0)?,
            parse_env("MEDIUM_RELEVANCE_THRESHOLD", 50.0)?,
        )?;

        let batch_concurrency: usize = parse_env("BATCH_CONCURRENCY", 4)?;
        if batch_concurrency == 0 {
            bail!("BATCH_CONCURRENCY must be at least 1");
        }

        Ok(Config {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://resume_relevance.db".to_string()),
            anthropic_api_key: std::env::var("ANTHROPIC_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            anthropic_base_url: std::env::var("ANTHROPIC_BASE_URL")
                .ok()
                .filter(|u| !u.trim().is_empty()),
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            max_upload_size: parse_env("MAX_UPLOAD_SIZE", 10 * 1024 * 1024)?,
            batch_concurrency,
            scoring,
        })
    }
}

#[cfg(test)]
impl Config {
    /// Defaults without reading the environment.
    pub fn for_tests() -> Self {
        Config {
            database_url: "sqlite::memory:".to_string(),
            anthropic_api_key: None,
            anthropic_base_url: None,
            port: 0,
            rust_log: "debug".to_string(),
            max_upload_size: 10 * 1024 * 1024,
            batch_concurrency: 2,
            scoring: ScoringConfig::default(),
        }
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

mod analysis;
mod cli;
mod config;
mod dashboard;
mod db;
mod errors;
mod evaluation;
mod jobs;
mod llm_client;
mod models;
mod parsing;
mod report;
mod routes;
mod scoring;
mod state;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::{Cli, Command};
use crate::config::Config;
use crate::db::create_pool;
use crate::evaluation::processor::ResumeProcessor;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::scoring::semantic::LexicalSimilarityScorer;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume relevance service v{}", env!("CARGO_PKG_VERSION"));

    // Initialize SQLite
    let db = create_pool(&config.database_url).await?;

    // Initialize LLM client (optional)
    let llm = config.anthropic_api_key.clone().map(|key| match &config.anthropic_base_url {
        Some(url) => LlmClient::with_base_url(key, url.clone()),
        None => LlmClient::new(key),
    });
    match &llm {
        Some(_) => info!("LLM client initialized (model: {})", llm_client::MODEL),
        None => warn!("ANTHROPIC_API_KEY not set; using keyword and lexical scoring only"),
    }

    let processor = Arc::new(ResumeProcessor::new(
        db.clone(),
        llm,
        Arc::new(LexicalSimilarityScorer),
        config.scoring,
    ));

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config, db, processor).await,
        command => cli::run(command, &config, &processor, &db).await,
    }
}

async fn serve(config: Config, db: sqlx::SqlitePool, processor: Arc<ResumeProcessor>) -> Result<()> {
    let port = config.port;
    let state = AppState {
        db,
        config,
        processor,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{port}").parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

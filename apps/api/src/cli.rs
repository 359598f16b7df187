//! Command line: `serve` (default), one-off evaluation, directory batches and listing.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use sqlx::SqlitePool;
use tracing::info;

use crate::config::Config;
use crate::evaluation::batch::{collect_resume_files, process_batch};
use crate::evaluation::processor::{CandidateInfo, ResumeProcessor};
use crate::parsing::document::SourceDocument;
use crate::report::{render_csv, render_text_report};
use crate::scoring::engine::Verdict;
use crate::store::evaluations::{list_evaluations, EvaluationFilter};

#[derive(Debug, Parser)]
#[command(name = "relevance")]
#[command(about = "Scores resumes against job descriptions", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP API
    Serve,
    /// Evaluate one resume against one job description
    Evaluate {
        #[arg(long)]
        resume: PathBuf,
        #[arg(long)]
        jd: PathBuf,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        location: Option<String>,
    },
    /// Evaluate every resume in a directory against one job description
    Batch {
        #[arg(long)]
        dir: PathBuf,
        #[arg(long)]
        jd: PathBuf,
        /// Write the successful evaluations to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        location: Option<String>,
    },
    /// List stored evaluations
    List {
        #[arg(long)]
        job_title: Option<String>,
        #[arg(long)]
        verdict: Option<Verdict>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long, default_value = "50")]
        limit: i64,
    },
}

/// Runs every command except `serve`.
pub async fn run(command: Command, config: &Config, processor: &ResumeProcessor, db: &SqlitePool) -> Result<()> {
    match command {
        Command::Serve => bail!("'serve' is handled by main"),
        Command::Evaluate {
            resume,
            jd,
            name,
            company,
            location,
        } => {
            let resume = read_document(&resume).await?;
            let jd = read_document(&jd).await?;
            let candidate = CandidateInfo {
                name,
                company,
                location,
            };
            let evaluation = processor.process(&resume, &jd, &candidate, None).await?;
            println!("{}", render_text_report(&evaluation, Utc::now()));
        }
        Command::Batch {
            dir,
            jd,
            csv,
            company,
            location,
        } => {
            let resumes = load_resume_dir(&dir).await?;
            let jd = read_document(&jd).await?;
            let candidate = CandidateInfo {
                name: None,
                company,
                location,
            };
            let report = process_batch(processor, resumes, &jd, &candidate, config.batch_concurrency).await?;

            let s = &report.summary;
            println!("Batch {} for '{}'", report.batch_id, report.job_title);
            println!(
                "{} resumes: {} succeeded, {} failed | HIGH {} / MEDIUM {} / LOW {} | average {:.1}",
                s.total, s.succeeded, s.failed, s.high, s.medium, s.low, s.average_score
            );
            for (rank, c) in report.ranking.iter().enumerate() {
                println!(
                    "{:>3}. {:<30} {:>6.1} {:<6} {}",
                    rank + 1,
                    c.candidate_name,
                    c.overall_score,
                    c.verdict,
                    c.resume_filename
                );
            }
            for failed in report.results.iter().filter(|r| !r.success) {
                println!(
                    "  failed: {} ({})",
                    failed.resume_filename,
                    failed.error.as_deref().unwrap_or("unknown error")
                );
            }

            if let Some(path) = csv {
                let evaluations: Vec<_> = report
                    .results
                    .iter()
                    .filter_map(|r| r.evaluation.clone())
                    .collect();
                let out = render_csv(&evaluations)?;
                tokio::fs::write(&path, out)
                    .await
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                info!("Wrote {} rows to {}", evaluations.len(), path.display());
            }
        }
        Command::List {
            job_title,
            verdict,
            location,
            limit,
        } => {
            let filter = EvaluationFilter {
                job_title,
                verdict,
                location,
                limit: Some(limit),
            };
            let rows = list_evaluations(db, &filter).await?;
            if rows.is_empty() {
                println!("No evaluations found");
            }
            for e in rows {
                println!(
                    "{:>5}  {:<25} {:<25} {:<15} {:>6.1} {:<6} {}",
                    e.id,
                    e.candidate_name,
                    e.job_title,
                    e.location,
                    e.overall_score,
                    e.verdict,
                    e.evaluated_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
    }
    Ok(())
}

async fn read_document(path: &Path) -> Result<SourceDocument> {
    SourceDocument::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

async fn load_resume_dir(dir: &Path) -> Result<Vec<SourceDocument>> {
    let files = collect_resume_files(dir)
        .await
        .with_context(|| format!("Failed to list {}", dir.display()))?;
    if files.is_empty() {
        bail!("No .pdf, .docx or .doc resumes found in {}", dir.display());
    }
    let mut resumes = Vec::with_capacity(files.len());
    for file in &files {
        resumes.push(read_document(file).await?);
    }
    Ok(resumes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["relevance"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_parse_evaluate() {
        let cli = Cli::try_parse_from([
            "relevance", "evaluate", "--resume", "jane.pdf", "--jd", "jd.txt", "--company", "Acme",
        ])
        .unwrap();
        match cli.command {
            Some(Command::Evaluate {
                resume, company, name, ..
            }) => {
                assert_eq!(resume, PathBuf::from("jane.pdf"));
                assert_eq!(company.as_deref(), Some("Acme"));
                assert!(name.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_list_verdict() {
        let cli = Cli::try_parse_from(["relevance", "list", "--verdict", "high"]).unwrap();
        match cli.command {
            Some(Command::List { verdict, limit, .. }) => {
                assert_eq!(verdict, Some(Verdict::High));
                assert_eq!(limit, 50);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(Cli::try_parse_from(["relevance", "list", "--verdict", "great"]).is_err());
    }

    #[test]
    fn test_batch_requires_dir_and_jd() {
        assert!(Cli::try_parse_from(["relevance", "batch", "--dir", "resumes"]).is_err());
    }

    #[tokio::test]
    async fn test_empty_resume_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a resume").unwrap();
        let err = load_resume_dir(dir.path()).await.unwrap_err();
        assert!(err.to_string().contains("No .pdf"));
    }
}

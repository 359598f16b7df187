//! Batch evaluation: many resumes against one job description.

use std::path::{Path, PathBuf};

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::evaluation::processor::{CandidateInfo, ResumeProcessor};
use crate::models::evaluation::EvaluationRow;
use crate::parsing::document::{DocumentKind, SourceDocument};

/// Outcome for one resume, in upload order.
#[derive(Debug, Clone, Serialize)]
pub struct BatchItem {
    pub resume_filename: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<EvaluationRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedCandidate {
    pub evaluation_id: i64,
    pub candidate_name: String,
    pub resume_filename: String,
    pub overall_score: f64,
    pub verdict: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    /// Mean over successful evaluations; 0 when none succeeded.
    pub average_score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub batch_id: String,
    pub job_title: String,
    pub summary: BatchSummary,
    pub results: Vec<BatchItem>,
    /// Successful evaluations, best score first.
    pub ranking: Vec<RankedCandidate>,
}

/// Evaluates every resume against `jd` with at most `concurrency` in flight.
///
/// A resume that fails is reported in its slot and does not stop the others.
/// The JD itself failing to parse fails the whole batch.
pub async fn process_batch(
    processor: &ResumeProcessor,
    resumes: Vec<SourceDocument>,
    jd: &SourceDocument,
    candidate: &CandidateInfo,
    concurrency: usize,
) -> Result<BatchReport, AppError> {
    if resumes.is_empty() {
        return Err(AppError::Validation("Batch contains no resumes".to_string()));
    }

    let job = processor.prepare_job(jd).await?;
    let batch_id = Uuid::new_v4().to_string();
    info!(
        "Batch {batch_id}: evaluating {} resumes against '{}' (concurrency {})",
        resumes.len(),
        job.requirements.title,
        concurrency
    );

    // Each resume is scored on its own; only the shared metadata is kept.
    let shared = CandidateInfo {
        name: None,
        ..candidate.clone()
    };

    let results: Vec<BatchItem> = stream::iter(resumes)
        .map(|resume| {
            let job = &job;
            let shared = &shared;
            let batch_id = batch_id.as_str();
            async move {
                match processor.evaluate(&resume, job, shared, Some(batch_id)).await {
                    Ok(evaluation) => BatchItem {
                        resume_filename: resume.filename,
                        success: true,
                        evaluation: Some(evaluation),
                        error: None,
                    },
                    Err(e) => {
                        warn!("Batch {batch_id}: '{}' failed: {e}", resume.filename);
                        BatchItem {
                            resume_filename: resume.filename,
                            success: false,
                            evaluation: None,
                            error: Some(e.to_string()),
                        }
                    }
                }
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let summary = summarize(&results);
    let ranking = rank(&results);
    info!(
        "Batch {batch_id} done: {}/{} succeeded, average score {:.2}",
        summary.succeeded, summary.total, summary.average_score
    );

    Ok(BatchReport {
        batch_id,
        job_title: job.requirements.title,
        summary,
        results,
        ranking,
    })
}

pub fn summarize(results: &[BatchItem]) -> BatchSummary {
    let evaluations: Vec<&EvaluationRow> = results.iter().filter_map(|r| r.evaluation.as_ref()).collect();
    let count_verdict = |v: &str| evaluations.iter().filter(|e| e.verdict == v).count();

    let average_score = if evaluations.is_empty() {
        0.0
    } else {
        let total: f64 = evaluations.iter().map(|e| e.overall_score).sum();
        crate::scoring::engine::round2(total / evaluations.len() as f64)
    };

    BatchSummary {
        total: results.len(),
        succeeded: evaluations.len(),
        failed: results.len() - evaluations.len(),
        high: count_verdict("HIGH"),
        medium: count_verdict("MEDIUM"),
        low: count_verdict("LOW"),
        average_score,
    }
}

fn rank(results: &[BatchItem]) -> Vec<RankedCandidate> {
    let mut ranking: Vec<RankedCandidate> = results
        .iter()
        .filter_map(|r| r.evaluation.as_ref())
        .map(|e| RankedCandidate {
            evaluation_id: e.id,
            candidate_name: e.candidate_name.clone(),
            resume_filename: e.resume_filename.clone(),
            overall_score: e.overall_score,
            verdict: e.verdict.clone(),
        })
        .collect();
    ranking.sort_by(|a, b| b.overall_score.total_cmp(&a.overall_score));
    ranking
}

/// Resume files (`.pdf`, `.docx`, `.doc`) directly inside `dir`, sorted by name.
pub async fn collect_resume_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let is_resume = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(DocumentKind::is_resume_format);
        if is_resume {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::evaluation::processor::test_support::{processor, JD, RESUME};
    use crate::store::evaluations::{list_evaluations, EvaluationFilter};

    const WEAK_RESUME: &str = "Sam Lee
sam@example.com

Skills
Excel, Accounting

Experience
Clerk 2021 - 2022";

    #[tokio::test]
    async fn test_batch_keeps_order_and_isolates_failures() {
        let pool = test_pool().await;
        let p = processor(pool.clone(), None);
        let resumes = vec![
            SourceDocument::from_text("sam.txt", WEAK_RESUME),
            SourceDocument::new("legacy.doc", vec![1, 2, 3]),
            SourceDocument::from_text("jane.txt", RESUME),
        ];
        let jd = SourceDocument::from_text("jd.txt", JD);
        let candidate = CandidateInfo {
            company: Some("Acme".to_string()),
            ..Default::default()
        };

        let report = process_batch(&p, resumes, &jd, &candidate, 2).await.unwrap();

        let names: Vec<&str> = report.results.iter().map(|r| r.resume_filename.as_str()).collect();
        assert_eq!(names, vec!["sam.txt", "legacy.doc", "jane.txt"]);
        assert!(!report.results[1].success);
        assert!(report.results[1].error.is_some());

        assert_eq!(report.summary.total, 3);
        assert_eq!(report.summary.succeeded, 2);
        assert_eq!(report.summary.failed, 1);
        assert_eq!(report.job_title, "Backend Engineer");

        assert_eq!(report.ranking.len(), 2);
        assert_eq!(report.ranking[0].resume_filename, "jane.txt");
        assert!(report.ranking[0].overall_score >= report.ranking[1].overall_score);

        let stored = list_evaluations(&pool, &EvaluationFilter::default()).await.unwrap();
        assert_eq!(stored.len(), 2);
        assert!(stored
            .iter()
            .all(|e| e.batch_id.as_deref() == Some(report.batch_id.as_str()) && e.company == "Acme"));
    }

    #[tokio::test]
    async fn test_empty_batch_is_rejected() {
        let pool = test_pool().await;
        let p = processor(pool, None);
        let jd = SourceDocument::from_text("jd.txt", JD);
        let err = process_batch(&p, vec![], &jd, &CandidateInfo::default(), 4)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_summary_of_all_failures() {
        let results = vec![BatchItem {
            resume_filename: "x.pdf".to_string(),
            success: false,
            evaluation: None,
            error: Some("boom".to_string()),
        }];
        let summary = summarize(&results);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.average_score, 0.0);
    }

    #[tokio::test]
    async fn test_collect_resume_files_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.docx", "a.pdf", "notes.txt", "c.DOC"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.pdf")).unwrap();

        let files = collect_resume_files(dir.path()).await.unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.pdf", "b.docx", "c.DOC"]);
    }
}

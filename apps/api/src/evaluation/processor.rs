//! Resume Processor: the end-to-end evaluation pipeline for one resume
//! against one job description.

use std::sync::Arc;

use chrono::{Datelike, Utc};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::analysis::feedback::{fallback_feedback, generate_feedback};
use crate::analysis::{analyze_fit, FitAnalysis};
use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::models::evaluation::{EvaluationRow, NewEvaluation};
use crate::parsing::document::{extract_text, DocumentError, DocumentKind, SourceDocument};
use crate::parsing::jd::{parse_job_description, JobRequirements};
use crate::parsing::resume::parse_resume;
use crate::scoring::engine::{compute_breakdown, ScoreInputs, ScoringConfig};
use crate::scoring::experience::{estimate_candidate_years, experience_score};
use crate::scoring::keyword::match_skills;
use crate::scoring::semantic::SemanticScorer;
use crate::store::evaluations::insert_evaluation;

const UNKNOWN: &str = "Unknown";

/// Optional metadata supplied with an upload. Missing values default to "Unknown",
/// except the name, which is first guessed from the resume.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateInfo {
    pub name: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
}

/// A job description whose text has been extracted and parsed once,
/// so a batch can reuse it for every resume.
#[derive(Debug, Clone)]
pub struct PreparedJob {
    pub filename: String,
    pub text: String,
    pub requirements: JobRequirements,
}

pub struct ResumeProcessor {
    db: SqlitePool,
    /// `None` when no API key is configured; keyword scoring is used alone.
    llm: Option<LlmClient>,
    semantic: Arc<dyn SemanticScorer>,
    scoring: ScoringConfig,
}

impl ResumeProcessor {
    pub fn new(
        db: SqlitePool,
        llm: Option<LlmClient>,
        semantic: Arc<dyn SemanticScorer>,
        scoring: ScoringConfig,
    ) -> Self {
        Self {
            db,
            llm,
            semantic,
            scoring,
        }
    }

    pub fn llm_configured(&self) -> bool {
        self.llm.is_some()
    }

    pub fn scoring(&self) -> &ScoringConfig {
        &self.scoring
    }

    pub fn semantic_backend(&self) -> &'static str {
        self.semantic.backend()
    }

    pub async fn prepare_job(&self, jd: &SourceDocument) -> Result<PreparedJob, AppError> {
        let text = extract_document_text(jd.clone()).await?;
        let requirements = parse_job_description(&text);
        info!(
            "JD '{}' parsed: title='{}', {} required / {} preferred skills",
            jd.filename,
            requirements.title,
            requirements.required_skills.len(),
            requirements.preferred_skills.len()
        );
        Ok(PreparedJob {
            filename: jd.filename.clone(),
            text,
            requirements,
        })
    }

    /// Evaluates `resume` against `jd` and stores the result.
    pub async fn process(
        &self,
        resume: &SourceDocument,
        jd: &SourceDocument,
        candidate: &CandidateInfo,
        batch_id: Option<&str>,
    ) -> Result<EvaluationRow, AppError> {
        let job = self.prepare_job(jd).await?;
        self.evaluate(resume, &job, candidate, batch_id).await
    }

    /// Runs the pipeline for an already prepared job description.
    ///
    /// Steps:
    /// 1. extract + parse resume text
    /// 2. lexical similarity, keyword match, experience match
    /// 3. LLM fit analysis (optional, failures fall back to keyword results)
    /// 4. weighted breakdown + verdict
    /// 5. feedback (LLM or deterministic)
    /// 6. INSERT into resume_evaluations
    pub async fn evaluate(
        &self,
        resume: &SourceDocument,
        job: &PreparedJob,
        candidate: &CandidateInfo,
        batch_id: Option<&str>,
    ) -> Result<EvaluationRow, AppError> {
        // Step 1
        let resume_text = extract_document_text(resume.clone()).await?;
        let profile = parse_resume(&resume_text);
        let jd = &job.requirements;

        // Step 2
        let lexical_similarity = self.semantic.similarity(&resume_text, &job.text).await?;
        let skill_match = match_skills(&profile, &resume_text, jd);
        let candidate_years = estimate_candidate_years(&profile, &resume_text, Utc::now().year());
        let experience = experience_score(jd.min_years, candidate_years);

        // Step 3
        let analysis: Option<FitAnalysis> = match &self.llm {
            Some(llm) => match analyze_fit(llm, &profile, &resume_text, jd, &job.text).await {
                Ok(analysis) if !analysis.is_empty() => Some(analysis),
                Ok(_) => {
                    warn!("LLM analysis for '{}' was empty, using keyword results", resume.filename);
                    None
                }
                Err(e) => {
                    warn!("LLM analysis for '{}' failed, using keyword results: {e}", resume.filename);
                    None
                }
            },
            None => None,
        };

        // Step 4
        let breakdown = compute_breakdown(
            &self.scoring,
            ScoreInputs {
                skill_match: &skill_match,
                lexical_similarity,
                experience_score: experience,
                analysis: analysis.as_ref(),
            },
        );

        // Step 5
        let feedback = match &self.llm {
            Some(llm) => generate_feedback(llm, &breakdown).await.unwrap_or_else(|e| {
                warn!("Feedback generation failed, using fallback: {e}");
                fallback_feedback(&breakdown)
            }),
            None => fallback_feedback(&breakdown),
        };

        // Step 6
        let new = NewEvaluation {
            batch_id: batch_id.map(str::to_string),
            candidate_name: non_blank(candidate.name.as_deref())
                .or(profile.name.clone())
                .unwrap_or_else(|| UNKNOWN.to_string()),
            candidate_email: profile.contact.email.clone(),
            job_title: jd.title.clone(),
            company: non_blank(candidate.company.as_deref()).unwrap_or_else(|| UNKNOWN.to_string()),
            location: non_blank(candidate.location.as_deref()).unwrap_or_else(|| UNKNOWN.to_string()),
            resume_filename: resume.filename.clone(),
            jd_filename: job.filename.clone(),
            breakdown,
            feedback,
            evaluated_at: Utc::now(),
        };
        let stored = insert_evaluation(&self.db, &new).await?;

        info!(
            "Evaluation {} stored: '{}' vs '{}' scored {:.2} ({}) via {}",
            stored.id,
            stored.candidate_name,
            stored.job_title,
            stored.overall_score,
            stored.verdict,
            stored.analysis_source
        );
        Ok(stored)
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

/// Extraction runs on the blocking pool; PDF parsing is CPU-bound and a
/// malformed file may panic inside the parser.
async fn extract_document_text(doc: SourceDocument) -> Result<String, AppError> {
    let filename = doc.filename.clone();
    let kind = doc.kind();
    match tokio::task::spawn_blocking(move || extract_text(&doc)).await {
        Ok(result) => Ok(result?),
        Err(join_err) => {
            let message = format!("parser aborted: {join_err}");
            let err = match kind {
                DocumentKind::Docx => DocumentError::Docx { filename, message },
                _ => DocumentError::Pdf { filename, message },
            };
            Err(err.into())
        }
    }
}


#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;

    use super::test_support::{processor, JD, RESUME};
    use super::*;
    use crate::db::test_pool;
    use crate::store::evaluations::count_evaluations;

    fn docs() -> (SourceDocument, SourceDocument) {
        (
            SourceDocument::from_text("jane.txt", RESUME),
            SourceDocument::from_text("backend.txt", JD),
        )
    }

    #[tokio::test]
    async fn test_keyword_only_evaluation_is_stored() {
        let pool = test_pool().await;
        let p = processor(pool.clone(), None);
        let (resume, jd) = docs();

        let eval = p
            .process(&resume, &jd, &CandidateInfo::default(), None)
            .await
            .unwrap();

        assert_eq!(eval.candidate_name, "Jane Doe");
        assert_eq!(eval.candidate_email.as_deref(), Some("jane.doe@example.com"));
        assert_eq!(eval.job_title, "Backend Engineer");
        assert_eq!(eval.company, "Unknown");
        assert_eq!(eval.analysis_source, "keyword");
        assert!(eval.matched_skills.contains(&"Rust".to_string()));
        assert_eq!(eval.missing_required_skills.0, vec!["Kafka"]);
        // 6 stated years against a 4 year minimum
        assert_eq!(eval.experience_score, 100.0);
        assert!((0.0..=100.0).contains(&eval.overall_score));
        assert!(!eval.feedback.is_empty());
        assert_eq!(count_evaluations(&pool).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_candidate_metadata_overrides_defaults() {
        let pool = test_pool().await;
        let p = processor(pool, None);
        let (resume, jd) = docs();
        let candidate = CandidateInfo {
            name: Some("  J. Doe ".to_string()),
            company: Some("Acme".to_string()),
            location: Some("".to_string()),
        };

        let eval = p.process(&resume, &jd, &candidate, Some("batch-1")).await.unwrap();

        assert_eq!(eval.candidate_name, "J. Doe");
        assert_eq!(eval.company, "Acme");
        assert_eq!(eval.location, "Unknown");
        assert_eq!(eval.batch_id.as_deref(), Some("batch-1"));
    }

    #[tokio::test]
    async fn test_unsupported_resume_is_rejected() {
        let pool = test_pool().await;
        let p = processor(pool.clone(), None);
        let resume = SourceDocument::new("old.doc", vec![0xd0, 0xcf, 0x11, 0xe0]);
        let jd = SourceDocument::from_text("jd.txt", JD);

        let err = p
            .process(&resume, &jd, &CandidateInfo::default(), None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Document(DocumentError::Unsupported(_))));
        assert_eq!(count_evaluations(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_llm_analysis_drives_semantic_score() {
        let server = MockServer::start_async().await;
        let analysis_reply = json!({
            "match_percentage": 88,
            "matched_skills": ["Rust", "PostgreSQL"],
            "missing_required_skills": ["Kafka"],
            "missing_preferred_skills": ["Kubernetes"],
            "strengths": ["Production Rust"],
            "gaps": ["No streaming"],
            "recommendations": ["Build a Kafka consumer"]
        })
        .to_string();
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/messages").body_contains("Required Skills");
                then.status(200).json_body(json!({
                    "content": [{"type": "text", "text": analysis_reply}],
                    "usage": {"input_tokens": 100, "output_tokens": 50}
                }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/messages").body_contains("constructive feedback");
                then.status(200).json_body(json!({
                    "content": [{"type": "text", "text": "Great Rust depth. Add Kafka."}],
                    "usage": {"input_tokens": 80, "output_tokens": 10}
                }));
            })
            .await;

        let pool = test_pool().await;
        let llm = LlmClient::with_base_url("key".to_string(), server.base_url());
        let p = processor(pool, Some(llm));
        let (resume, jd) = docs();

        let eval = p
            .process(&resume, &jd, &CandidateInfo::default(), None)
            .await
            .unwrap();

        assert_eq!(eval.analysis_source, "llm");
        assert_eq!(eval.semantic_score, 88.0);
        assert_eq!(eval.strengths.0, vec!["Production Rust"]);
        assert_eq!(eval.recommendations.0, vec!["Build a Kafka consumer"]);
        assert_eq!(eval.feedback, "Great Rust depth. Add Kafka.");
    }

    #[tokio::test]
    async fn test_llm_failure_falls_back_to_keyword() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/messages");
                then.status(400).json_body(json!({"error": {"message": "bad request"}}));
            })
            .await;

        let pool = test_pool().await;
        let llm = LlmClient::with_base_url("key".to_string(), server.base_url());
        let p = processor(pool, Some(llm));
        let (resume, jd) = docs();

        let eval = p
            .process(&resume, &jd, &CandidateInfo::default(), None)
            .await
            .unwrap();

        assert_eq!(eval.analysis_source, "keyword");
        assert_eq!(eval.semantic_score, eval.lexical_similarity);
        assert!(eval.feedback.contains("Overall relevance score"));
    }
}

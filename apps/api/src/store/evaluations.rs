use serde::Deserialize;
use sqlx::types::Json;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::models::evaluation::{EvaluationRow, NewEvaluation};
use crate::scoring::engine::Verdict;

/// Optional filters shared by the list, export and dashboard endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EvaluationFilter {
    pub job_title: Option<String>,
    pub verdict: Option<Verdict>,
    pub location: Option<String>,
    pub limit: Option<i64>,
}

pub async fn insert_evaluation(
    pool: &SqlitePool,
    new: &NewEvaluation,
) -> Result<EvaluationRow, sqlx::Error> {
    let b = &new.breakdown;
    sqlx::query_as::<_, EvaluationRow>(
        r#"
        INSERT INTO resume_evaluations
            (batch_id, candidate_name, candidate_email, job_title, company, location,
             resume_filename, jd_filename, overall_score, verdict, hard_match_score,
             semantic_score, lexical_similarity, experience_score, matched_skills,
             missing_required_skills, missing_preferred_skills, recommendations,
             strengths, gaps, analysis_source, feedback, evaluated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&new.batch_id)
    .bind(&new.candidate_name)
    .bind(&new.candidate_email)
    .bind(&new.job_title)
    .bind(&new.company)
    .bind(&new.location)
    .bind(&new.resume_filename)
    .bind(&new.jd_filename)
    .bind(b.overall_score)
    .bind(b.verdict.as_str())
    .bind(b.hard_match_score)
    .bind(b.semantic_score)
    .bind(b.lexical_similarity)
    .bind(b.experience_score)
    .bind(Json(&b.matched_skills))
    .bind(Json(&b.missing_required_skills))
    .bind(Json(&b.missing_preferred_skills))
    .bind(Json(&b.recommendations))
    .bind(Json(&b.strengths))
    .bind(Json(&b.gaps))
    .bind(&b.analysis_source)
    .bind(&new.feedback)
    .bind(new.evaluated_at)
    .fetch_one(pool)
    .await
}

pub async fn get_evaluation(pool: &SqlitePool, id: i64) -> Result<Option<EvaluationRow>, sqlx::Error> {
    sqlx::query_as::<_, EvaluationRow>("SELECT * FROM resume_evaluations WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Newest first.
pub async fn list_evaluations(
    pool: &SqlitePool,
    filter: &EvaluationFilter,
) -> Result<Vec<EvaluationRow>, sqlx::Error> {
    let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM resume_evaluations WHERE 1 = 1");
    if let Some(title) = &filter.job_title {
        qb.push(" AND job_title = ").push_bind(title.clone());
    }
    if let Some(verdict) = filter.verdict {
        qb.push(" AND verdict = ").push_bind(verdict.as_str());
    }
    if let Some(location) = &filter.location {
        qb.push(" AND location = ").push_bind(location.clone());
    }
    qb.push(" ORDER BY evaluated_at DESC, id DESC");
    if let Some(limit) = filter.limit.filter(|l| *l > 0) {
        qb.push(" LIMIT ").push_bind(limit);
    }

    qb.build_query_as::<EvaluationRow>().fetch_all(pool).await
}

pub async fn count_evaluations(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM resume_evaluations")
        .fetch_one(pool)
        .await
}

/// Removes every stored evaluation, returning how many were deleted.
pub async fn delete_all(pool: &SqlitePool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM resume_evaluations").execute(pool).await?;
    Ok(result.rows_affected())
}

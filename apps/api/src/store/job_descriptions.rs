use chrono::Utc;
use sqlx::types::Json;
use sqlx::SqlitePool;

use crate::models::job_description::JobDescriptionRow;
use crate::parsing::jd::JobRequirements;

pub async fn insert_job_description(
    pool: &SqlitePool,
    requirements: &JobRequirements,
    company: &str,
    location: &str,
    description: &str,
) -> Result<JobDescriptionRow, sqlx::Error> {
    sqlx::query_as::<_, JobDescriptionRow>(
        r#"
        INSERT INTO job_descriptions
            (title, company, location, description, required_skills, preferred_skills,
             experience_required, education_required, responsibilities, uploaded_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&requirements.title)
    .bind(company)
    .bind(location)
    .bind(description)
    .bind(Json(&requirements.required_skills))
    .bind(Json(&requirements.preferred_skills))
    .bind(&requirements.experience_required)
    .bind(Json(&requirements.education_required))
    .bind(Json(&requirements.responsibilities))
    .bind(Utc::now())
    .fetch_one(pool)
    .await
}

/// Newest first.
pub async fn list_job_descriptions(pool: &SqlitePool) -> Result<Vec<JobDescriptionRow>, sqlx::Error> {
    sqlx::query_as::<_, JobDescriptionRow>("SELECT * FROM job_descriptions ORDER BY uploaded_at DESC, id DESC")
        .fetch_all(pool)
        .await
}

pub async fn get_job_description(
    pool: &SqlitePool,
    id: i64,
) -> Result<Option<JobDescriptionRow>, sqlx::Error> {
    sqlx::query_as::<_, JobDescriptionRow>("SELECT * FROM job_descriptions WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn count_job_descriptions(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM job_descriptions")
        .fetch_one(pool)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::parsing::jd::parse_job_description;

    const JD: &str = "Job Title: Platform Engineer\n\
        Required Skills: Rust, Kubernetes, PostgreSQL\n\
        Nice to have: Terraform\n\
        Experience: 3+ years of backend experience";

    #[tokio::test]
    async fn test_insert_list_get() {
        let pool = test_pool().await;
        let requirements = parse_job_description(JD);
        let stored = insert_job_description(&pool, &requirements, "Acme", "Remote", JD)
            .await
            .unwrap();

        assert_eq!(stored.title, "Platform Engineer");
        assert_eq!(stored.required_skills.0, vec!["Rust", "Kubernetes", "PostgreSQL"]);
        assert_eq!(stored.preferred_skills.0, vec!["Terraform"]);

        let listed = list_job_descriptions(&pool).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(count_job_descriptions(&pool).await.unwrap(), 1);

        let fetched = get_job_description(&pool, stored.id).await.unwrap().unwrap();
        assert_eq!(fetched.company, "Acme");
        assert!(get_job_description(&pool, 999).await.unwrap().is_none());
    }
}

//! Plain-text evaluation reports and CSV export.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::evaluation::EvaluationRow;

const RULE: &str = "==================================================";

pub fn render_text_report(evaluation: &EvaluationRow, generated_at: DateTime<Utc>) -> String {
    let e = evaluation;
    let mut lines: Vec<String> = vec![
        "RESUME EVALUATION REPORT".to_string(),
        RULE.to_string(),
        format!("Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S UTC")),
        format!("Evaluation ID: {}", e.id),
        String::new(),
        format!("Candidate: {}", e.candidate_name),
    ];
    if let Some(email) = &e.candidate_email {
        lines.push(format!("Email: {email}"));
    }
    lines.extend([
        format!("Resume: {}", e.resume_filename),
        format!("Job Title: {}", e.job_title),
        format!("Company: {}", e.company),
        format!("Location: {}", e.location),
        format!("Evaluated: {}", e.evaluated_at.format("%Y-%m-%d %H:%M")),
        String::new(),
        "SCORES".to_string(),
        "------".to_string(),
        format!("Overall Score: {:.1}/100", e.overall_score),
        format!("Verdict: {}", e.verdict),
        format!("Hard Match: {:.1}", e.hard_match_score),
        format!("Semantic Match: {:.1} ({})", e.semantic_score, e.analysis_source),
        format!("Lexical Similarity: {:.1}", e.lexical_similarity),
        format!("Experience Match: {:.1}", e.experience_score),
    ]);

    push_list(&mut lines, "MATCHED SKILLS", &e.matched_skills);
    push_list(&mut lines, "MISSING REQUIRED SKILLS", &e.missing_required_skills);
    push_list(&mut lines, "MISSING PREFERRED SKILLS", &e.missing_preferred_skills);
    push_list(&mut lines, "STRENGTHS", &e.strengths);
    push_list(&mut lines, "GAPS", &e.gaps);

    lines.push(String::new());
    lines.push("RECOMMENDATIONS".to_string());
    lines.extend(
        e.recommendations
            .iter()
            .enumerate()
            .map(|(i, rec)| format!("{}. {rec}", i + 1)),
    );

    lines.extend([
        String::new(),
        "FEEDBACK".to_string(),
        e.feedback.clone(),
        RULE.to_string(),
    ]);

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn push_list(lines: &mut Vec<String>, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    lines.push(String::new());
    lines.push(heading.to_string());
    lines.extend(items.iter().map(|item| format!("- {item}")));
}

const CSV_HEADERS: [&str; 10] = [
    "ID",
    "Candidate",
    "Email",
    "Job Title",
    "Company",
    "Location",
    "Score",
    "Verdict",
    "Missing Skills Count",
    "Date",
];

#[derive(Serialize)]
struct CsvRecord<'a> {
    id: i64,
    candidate: &'a str,
    email: &'a str,
    job_title: &'a str,
    company: &'a str,
    location: &'a str,
    score: f64,
    verdict: &'a str,
    missing_skills: usize,
    date: String,
}

/// CSV export; the header row is written even when there are no rows.
pub fn render_csv(evaluations: &[EvaluationRow]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(CSV_HEADERS)?;
    for e in evaluations {
        writer.serialize(CsvRecord {
            id: e.id,
            candidate: &e.candidate_name,
            email: e.candidate_email.as_deref().unwrap_or(""),
            job_title: &e.job_title,
            company: &e.company,
            location: &e.location,
            score: e.overall_score,
            verdict: &e.verdict,
            missing_skills: e.missing_skill_count(),
            date: e.evaluated_at.format("%Y-%m-%d %H:%M").to_string(),
        })?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| e.into_error())
        .context("Failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output was not UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sqlx::types::Json;

    fn row() -> EvaluationRow {
        EvaluationRow {
            id: 7,
            batch_id: None,
            candidate_name: "Jane Doe".to_string(),
            candidate_email: Some("jane@example.com".to_string()),
            job_title: "Backend Engineer".to_string(),
            company: "Acme, Inc".to_string(),
            location: "Pune".to_string(),
            resume_filename: "jane.pdf".to_string(),
            jd_filename: "jd.txt".to_string(),
            overall_score: 72.5,
            verdict: "MEDIUM".to_string(),
            hard_match_score: 66.67,
            semantic_score: 80.0,
            lexical_similarity: 31.2,
            experience_score: 70.0,
            matched_skills: Json(vec!["Rust".to_string()]),
            missing_required_skills: Json(vec!["Kafka".to_string()]),
            missing_preferred_skills: Json(vec!["Terraform".to_string()]),
            recommendations: Json(vec!["Learn Kafka".to_string()]),
            strengths: Json(vec![]),
            gaps: Json(vec![]),
            analysis_source: "llm".to_string(),
            feedback: "Solid profile.".to_string(),
            evaluated_at: Utc.with_ymd_and_hms(2024, 5, 2, 9, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_text_report_sections() {
        let generated = Utc.with_ymd_and_hms(2024, 5, 3, 10, 0, 0).unwrap();
        let report = render_text_report(&row(), generated);
        assert!(report.contains("Generated: 2024-05-03 10:00:00 UTC"));
        assert!(report.contains("Candidate: Jane Doe"));
        assert!(report.contains("Overall Score: 72.5/100"));
        assert!(report.contains("MISSING REQUIRED SKILLS\n- Kafka"));
        assert!(report.contains("1. Learn Kafka"));
        assert!(!report.contains("STRENGTHS"));
        assert!(report.contains("FEEDBACK\nSolid profile."));
        assert!(report.starts_with("RESUME EVALUATION REPORT\n"));
        assert!(report.ends_with(&format!("{RULE}\n")));
    }

    #[test]
    fn test_csv_header_and_quoting() {
        let csv = render_csv(&[row()]).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "ID,Candidate,Email,Job Title,Company,Location,Score,Verdict,Missing Skills Count,Date"
        );
        assert_eq!(
            lines.next().unwrap(),
            "7,Jane Doe,jane@example.com,Backend Engineer,\"Acme, Inc\",Pune,72.5,MEDIUM,2,2024-05-02 09:30"
        );
    }

    #[test]
    fn test_csv_of_nothing_keeps_header() {
        assert_eq!(
            render_csv(&[]).unwrap(),
            "ID,Candidate,Email,Job Title,Company,Location,Score,Verdict,Missing Skills Count,Date\n"
        );
    }
}

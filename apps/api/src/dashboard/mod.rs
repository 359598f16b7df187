//! Dashboard metrics over stored evaluations.

use std::collections::{BTreeMap, BTreeSet};

use axum::extract::{rejection::QueryRejection, Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::Serialize;

use crate::errors::AppError;
use crate::models::evaluation::EvaluationRow;
use crate::scoring::engine::round2;
use crate::state::AppState;
use crate::store::evaluations::{list_evaluations, EvaluationFilter};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VerdictDistribution {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationStats {
    pub location: String,
    pub count: usize,
    pub average_score: f64,
    pub min_score: f64,
    pub max_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobStats {
    pub job_title: String,
    pub count: usize,
    pub average_score: f64,
    pub high_matches: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: usize,
}

/// Distinct values the list can be filtered by.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptions {
    pub job_titles: Vec<String>,
    pub locations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub total_evaluations: usize,
    pub average_score: f64,
    pub high_matches: usize,
    /// High matches as a percentage of all evaluations.
    pub conversion_rate: f64,
    pub verdict_distribution: VerdictDistribution,
    pub by_location: Vec<LocationStats>,
    pub by_job_title: Vec<JobStats>,
    pub evaluations_per_day: Vec<DailyCount>,
    pub filters: FilterOptions,
}

pub fn compute_dashboard(evaluations: &[EvaluationRow]) -> Dashboard {
    let total = evaluations.len();
    let mut distribution = VerdictDistribution::default();
    for e in evaluations {
        match e.verdict.as_str() {
            "HIGH" => distribution.high += 1,
            "MEDIUM" => distribution.medium += 1,
            _ => distribution.low += 1,
        }
    }

    let (average_score, conversion_rate) = if total == 0 {
        (0.0, 0.0)
    } else {
        (
            round2(mean(evaluations.iter().map(|e| e.overall_score))),
            round2(distribution.high as f64 / total as f64 * 100.0),
        )
    };

    let mut locations: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    let mut jobs: BTreeMap<&str, Vec<&EvaluationRow>> = BTreeMap::new();
    let mut days: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for e in evaluations {
        locations.entry(e.location.as_str()).or_default().push(e.overall_score);
        jobs.entry(e.job_title.as_str()).or_default().push(e);
        *days.entry(e.evaluated_at.date_naive()).or_default() += 1;
    }

    let by_location = locations
        .into_iter()
        .map(|(location, scores)| LocationStats {
            location: location.to_string(),
            count: scores.len(),
            average_score: round2(mean(scores.iter().copied())),
            min_score: scores.iter().copied().fold(f64::INFINITY, f64::min),
            max_score: scores.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        })
        .collect();

    let by_job_title = jobs
        .into_iter()
        .map(|(job_title, rows)| JobStats {
            job_title: job_title.to_string(),
            count: rows.len(),
            average_score: round2(mean(rows.iter().map(|e| e.overall_score))),
            high_matches: rows.iter().filter(|e| e.verdict == "HIGH").count(),
        })
        .collect();

    Dashboard {
        total_evaluations: total,
        average_score,
        high_matches: distribution.high,
        conversion_rate,
        verdict_distribution: distribution,
        by_location,
        by_job_title,
        evaluations_per_day: days
            .into_iter()
            .map(|(date, count)| DailyCount { date, count })
            .collect(),
        filters: filter_options(evaluations),
    }
}

pub fn filter_options(evaluations: &[EvaluationRow]) -> FilterOptions {
    let job_titles: BTreeSet<&str> = evaluations.iter().map(|e| e.job_title.as_str()).collect();
    let locations: BTreeSet<&str> = evaluations.iter().map(|e| e.location.as_str()).collect();
    FilterOptions {
        job_titles: job_titles.into_iter().map(str::to_string).collect(),
        locations: locations.into_iter().map(str::to_string).collect(),
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

/// GET /api/v1/dashboard
/// Metrics follow the same filters as the evaluation list; the filter options
/// always cover every stored evaluation.
pub async fn handle_dashboard(
    State(state): State<AppState>,
    query: Result<Query<EvaluationFilter>, QueryRejection>,
) -> Result<Json<Dashboard>, AppError> {
    let Query(filter) = query?;
    let all = list_evaluations(&state.db, &EvaluationFilter::default()).await?;
    let filtered = list_evaluations(&state.db, &filter).await?;

    let mut dashboard = compute_dashboard(&filtered);
    dashboard.filters = filter_options(&all);
    Ok(Json(dashboard))
}

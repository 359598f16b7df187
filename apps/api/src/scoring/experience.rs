//! Experience match: candidate years (estimated from the resume) against
//! the JD's minimum years.

use std::sync::LazyLock;

use regex::Regex;

use crate::parsing::resume::ResumeProfile;

/// Score when the JD states no experience requirement.
pub const NO_REQUIREMENT_SCORE: f64 = 70.0;
/// Score when a requirement exists but the resume gives no usable dates.
pub const UNKNOWN_CANDIDATE_SCORE: f64 = 50.0;

// Either year may carry a month prefix: "Jan 2016", "Sept. 2020", "03/2018".
static RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b((?:19|20)\d{2})\s*(?:-|–|—|to)\s*(?:[a-z]{3,9}\.?\s+|\d{1,2}/)?((?:19|20)\d{2}|present|current|now|date)\b",
    )
    .unwrap()
});
static STATED_YEARS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2}(?:\.\d)?)\s*\+?\s*(?:years?|yrs?)\s+(?:of\s+)?(?:professional\s+|industry\s+|work\s+)?experience")
        .unwrap()
});

/// Estimates total years of experience.
///
/// Year ranges found in the experience entries are merged (overlapping jobs
/// count once); an explicit "N years of experience" statement anywhere in the
/// text is also considered, and the larger of the two wins.
pub fn estimate_candidate_years(
    profile: &ResumeProfile,
    resume_text: &str,
    current_year: i32,
) -> Option<f64> {
    let mut ranges: Vec<(i32, i32)> = profile
        .experience
        .iter()
        .flat_map(|e| RANGE_RE.captures_iter(&e.description))
        .filter_map(|caps| {
            let start: i32 = caps[1].parse().ok()?;
            let end = match caps[2].parse::<i32>() {
                Ok(year) => year,
                Err(_) => current_year,
            };
            (start <= end && end <= current_year).then_some((start, end))
        })
        .collect();

    let from_ranges = merged_span(&mut ranges);

    let stated = STATED_YEARS_RE
        .captures_iter(resume_text)
        .filter_map(|caps| caps[1].parse::<f64>().ok())
        .fold(None, |acc: Option<f64>, y| Some(acc.map_or(y, |a| a.max(y))));

    match (from_ranges, stated) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}

/// Total years covered by the union of `ranges`.
fn merged_span(ranges: &mut [(i32, i32)]) -> Option<f64> {
    if ranges.is_empty() {
        return None;
    }
    ranges.sort_unstable();

    let mut total = 0;
    let (mut cur_start, mut cur_end) = ranges[0];
    for &(start, end) in ranges.iter().skip(1) {
        if start <= cur_end {
            cur_end = cur_end.max(end);
        } else {
            total += cur_end - cur_start;
            (cur_start, cur_end) = (start, end);
        }
    }
    total += cur_end - cur_start;
    Some(total as f64)
}

/// Experience score in 0–100.
pub fn experience_score(required_years: Option<f64>, candidate_years: Option<f64>) -> f64 {
    match (required_years, candidate_years) {
        (None, _) => NO_REQUIREMENT_SCORE,
        (Some(req), _) if req <= 0.0 => 100.0,
        (Some(_), None) => UNKNOWN_CANDIDATE_SCORE,
        (Some(req), Some(have)) => (have / req * 100.0).clamp(0.0, 100.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::resume::ExperienceEntry;

    fn profile(entries: &[&str]) -> ResumeProfile {
        ResumeProfile {
            experience: entries
                .iter()
                .map(|d| ExperienceEntry {
                    description: d.to_string(),
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_ranges_are_summed() {
        let p = profile(&["Acme 2015 - 2018 backend", "Initech 2019 – 2021"]);
        assert_eq!(estimate_candidate_years(&p, "", 2024), Some(5.0));
    }

    #[test]
    fn test_overlapping_ranges_count_once() {
        let p = profile(&["2016 - 2020 full time", "2018 to 2019 consulting"]);
        assert_eq!(estimate_candidate_years(&p, "", 2024), Some(4.0));
    }

    #[test]
    fn test_present_uses_current_year() {
        let p = profile(&["Jan 2021 - Present"]);
        assert_eq!(estimate_candidate_years(&p, "", 2024), Some(3.0));
    }

    #[test]
    fn test_month_prefixed_ranges() {
        let p = profile(&["Jan 2016 – Dec 2022 platform team"]);
        assert_eq!(estimate_candidate_years(&p, "", 2024), Some(6.0));

        let p = profile(&["03/2018 - 06/2020 contractor"]);
        assert_eq!(estimate_candidate_years(&p, "", 2024), Some(2.0));

        let p = profile(&["Mar 2021 - Present"]);
        assert_eq!(estimate_candidate_years(&p, "", 2024), Some(3.0));

        let p = profile(&["September 2015 to Sept. 2017"]);
        assert_eq!(estimate_candidate_years(&p, "", 2024), Some(2.0));
    }

    #[test]
    fn test_parsed_resume_with_month_dates_meets_requirement() {
        let text = "Jane Doe\n\nExperience\nSenior Engineer, Acme\nJan 2016 - Dec 2022\nBuilt things";
        let years = estimate_candidate_years(&crate::parsing::resume::parse_resume(text), text, 2024);
        assert_eq!(years, Some(6.0));
        assert_eq!(experience_score(Some(4.0), years), 100.0);
    }

    #[test]
    fn test_stated_years_when_larger() {
        let p = profile(&["2022 - 2023"]);
        let text = "Engineer with 7+ years of experience in payments";
        assert_eq!(estimate_candidate_years(&p, text, 2024), Some(7.0));
    }

    #[test]
    fn test_no_dates_is_unknown() {
        assert_eq!(estimate_candidate_years(&profile(&["Did things"]), "", 2024), None);
    }

    #[test]
    fn test_future_ranges_ignored() {
        let p = profile(&["2030 - 2032 planned"]);
        assert_eq!(estimate_candidate_years(&p, "", 2024), None);
    }

    #[test]
    fn test_experience_score_bands() {
        assert_eq!(experience_score(None, Some(10.0)), NO_REQUIREMENT_SCORE);
        assert_eq!(experience_score(Some(4.0), None), UNKNOWN_CANDIDATE_SCORE);
        assert_eq!(experience_score(Some(4.0), Some(2.0)), 50.0);
        assert_eq!(experience_score(Some(4.0), Some(9.0)), 100.0);
        assert_eq!(experience_score(Some(0.0), None), 100.0);
    }
}

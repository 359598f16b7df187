use crate::analysis::prompts::{feedback_system, FEEDBACK_PROMPT_TEMPLATE};
use crate::llm_client::prompts::fill_template;
use crate::llm_client::{LlmClient, LlmError};
use crate::scoring::engine::{ScoreBreakdown, Verdict};

/// Asks the LLM for candidate-facing feedback on a finished evaluation.
pub async fn generate_feedback(llm: &LlmClient, breakdown: &ScoreBreakdown) -> Result<String, LlmError> {
    let analysis = serde_json::json!({
        "matched_skills": breakdown.matched_skills,
        "missing_required_skills": breakdown.missing_required_skills,
        "missing_preferred_skills": breakdown.missing_preferred_skills,
        "strengths": breakdown.strengths,
        "gaps": breakdown.gaps,
        "recommendations": breakdown.recommendations,
    });
    let analysis = serde_json::to_string_pretty(&analysis)?;
    let score = format!("{:.1}", breakdown.overall_score);

    let prompt = fill_template(
        FEEDBACK_PROMPT_TEMPLATE,
        &[
            ("score", &score),
            ("verdict", breakdown.verdict.as_str()),
            ("analysis", &analysis),
        ],
    );
    llm.call_text(&prompt, &feedback_system()).await
}

/// Deterministic feedback used when no LLM is configured or the call fails.
pub fn fallback_feedback(breakdown: &ScoreBreakdown) -> String {
    let standing = match breakdown.verdict {
        Verdict::High => "Your profile is a strong match for this role.",
        Verdict::Medium => "Your profile matches this role in several areas, with some gaps to close.",
        Verdict::Low => "Your profile currently matches only a small part of this role's requirements.",
    };

    let mut out = format!(
        "{standing} Overall relevance score: {:.1}/100 ({}).",
        breakdown.overall_score, breakdown.verdict
    );

    if !breakdown.matched_skills.is_empty() {
        let top: Vec<&str> = breakdown.matched_skills.iter().take(5).map(String::as_str).collect();
        out.push_str(&format!("\n\nSkills that already line up: {}.", top.join(", ")));
    }

    if !breakdown.recommendations.is_empty() {
        out.push_str("\n\nTo improve your match:");
        for (i, rec) in breakdown.recommendations.iter().take(3).enumerate() {
            out.push_str(&format!("\n{}. {}", i + 1, rec));
        }
    }

    out.push_str("\n\nKeep refining your resume so your relevant experience is easy to spot.");
    out
}

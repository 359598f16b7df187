// Shared prompt constants and prompt-building utilities.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_INSTRUCTION: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Instruction shared by every prompt that sees candidate data.
pub const EVIDENCE_INSTRUCTION: &str = "\
    Base every statement on the resume text provided. \
    Do NOT assume skills or experience the resume does not mention. \
    When the resume is ambiguous, treat the skill as missing.";

/// Fills `{name}` placeholders in a prompt template.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    values.iter().fold(template.to_string(), |acc, (key, value)| {
        acc.replace(&format!("{{{key}}}"), value)
    })
}

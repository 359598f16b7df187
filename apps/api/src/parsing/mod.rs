// Document ingestion: text extraction plus rule-based resume and JD parsing.
// Nothing here calls the LLM; the output feeds keyword scoring and the analysis prompts.

pub mod document;
pub mod jd;
pub mod resume;
pub mod sections;

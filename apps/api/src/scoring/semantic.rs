//! Semantic similarity between a resume and a job description.
//!
//! `ResumeProcessor` holds an `Arc<dyn SemanticScorer>` so the backend can be
//! swapped without touching the pipeline. The default is `LexicalSimilarityScorer`, a
//! deterministic term-vector cosine that needs no network access.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::errors::AppError;

/// Similarity in 0–100.
#[async_trait]
pub trait SemanticScorer: Send + Sync {
    async fn similarity(&self, resume_text: &str, jd_text: &str) -> Result<f64, AppError>;

    /// Short label surfaced in settings, e.g. "lexical".
    fn backend(&self) -> &'static str;
}

/// Cosine similarity of stop-word-filtered term-frequency vectors.
pub struct LexicalSimilarityScorer;

#[async_trait]
impl SemanticScorer for LexicalSimilarityScorer {
    async fn similarity(&self, resume_text: &str, jd_text: &str) -> Result<f64, AppError> {
        Ok(cosine_similarity(resume_text, jd_text))
    }

    fn backend(&self) -> &'static str {
        "lexical"
    }
}

const STOP_WORDS: &[&str] = &[
    "a", "about", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "have", "in",
    "into", "is", "it", "its", "of", "on", "or", "our", "that", "the", "their", "this", "to",
    "was", "we", "were", "will", "with", "you", "your", "i", "my", "me", "us", "they", "who",
    "work", "working", "experience", "years", "year", "team", "role", "skills", "strong",
    "ability", "using", "including", "etc",
];

fn term_frequencies(text: &str) -> HashMap<String, f64> {
    let mut counts = HashMap::new();
    for token in text
        .split(|c: char| !(c.is_alphanumeric() || c == '+' || c == '#'))
        .filter(|t| !t.is_empty())
    {
        let token = token.to_lowercase();
        if token.chars().count() < 2 && token != "c" && token != "r" {
            continue;
        }
        if STOP_WORDS.contains(&token.as_str()) || token.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        *counts.entry(token).or_insert(0.0) += 1.0;
    }
    counts
}

/// Returns cosine similarity × 100, or 0 when either side has no terms.
pub fn cosine_similarity(a: &str, b: &str) -> f64 {
    let va = term_frequencies(a);
    let vb = term_frequencies(b);
    if va.is_empty() || vb.is_empty() {
        return 0.0;
    }

    let dot: f64 = va
        .iter()
        .filter_map(|(term, wa)| vb.get(term).map(|wb| wa * wb))
        .sum();
    let norm_a = va.values().map(|w| w * w).sum::<f64>().sqrt();
    let norm_b = vb.values().map(|w| w * w).sum::<f64>().sqrt();

    (dot / (norm_a * norm_b) * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_texts_score_100() {
        let text = "Rust engineer building distributed databases";
        assert!((cosine_similarity(text, text) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_disjoint_texts_score_0() {
        assert_eq!(cosine_similarity("rust kafka postgres", "painting sculpture pottery"), 0.0);
    }

    #[test]
    fn test_stop_words_do_not_create_similarity() {
        assert_eq!(
            cosine_similarity("the team and our work", "with the team and your work"),
            0.0
        );
    }

    #[test]
    fn test_partial_overlap_is_between_bounds() {
        let score = cosine_similarity(
            "Rust developer with Kafka and PostgreSQL",
            "Looking for Rust and Go developers; Kubernetes a plus",
        );
        assert!(score > 0.0 && score < 100.0, "got {score}");
    }

    #[test]
    fn test_empty_input_scores_0() {
        assert_eq!(cosine_similarity("", "rust"), 0.0);
    }

    #[test]
    fn test_c_plus_plus_and_c_sharp_are_terms() {
        assert!(cosine_similarity("C++ and C#", "c++ c#") > 99.0);
    }

    #[tokio::test]
    async fn test_lexical_scorer_backend() {
        let scorer = LexicalSimilarityScorer;
        assert_eq!(scorer.backend(), "lexical");
        let score = scorer.similarity("rust", "rust").await.unwrap();
        assert!((score - 100.0).abs() < 1e-9);
    }
}

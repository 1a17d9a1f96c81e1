//! Rule-based text classifiers.
//!
//! Every heuristic the engine runs over unstructured text lives behind
//! the [`Classifier`] seam so rule tables can be unit-tested in
//! isolation and swapped without touching the memory/profile state
//! machines. These are deterministic keyword classifiers, not models;
//! no claim of linguistic correctness is made.
//!
//! Keyword lists are bilingual (English and Portuguese) to match the
//! user base this engine serves.

pub mod formality;
pub mod sentiment;
pub mod topic;

pub use formality::FormalityLexicon;
pub use sentiment::SentimentLexicon;
pub use topic::KeywordTopicClassifier;

/// A classification outcome: a coarse label with a confidence in [0,1].
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub label: String,
    pub confidence: f64,
}

/// A deterministic text classifier.
pub trait Classifier: Send + Sync {
    /// Classify a single piece of text.
    fn classify(&self, text: &str) -> Classification;
}

/// Split text into lower-cased alphanumeric tokens (Unicode-aware, so
/// accented Portuguese words survive).
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect()
}

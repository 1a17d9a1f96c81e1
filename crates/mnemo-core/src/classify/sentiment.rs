//! Three-bucket sentiment tally.
//!
//! Counts positive/negative keyword hits per message; a message with no
//! hits (or a tie) is neutral. The window-level majority wins the
//! overall label.

use mnemo_types::summary::{SentimentLabel, SentimentSummary};

use super::{Classification, Classifier, tokenize};

const POSITIVE_WORDS: &[&str] = &[
    "good", "great", "love", "loved", "thanks", "thank", "awesome", "perfect", "excellent",
    "happy", "nice", "amazing", "bom", "boa", "ótimo", "ótima", "otimo", "adorei", "amei",
    "obrigado", "obrigada", "valeu", "perfeito", "excelente", "feliz", "legal", "gostei",
    "maravilhoso", "maravilha",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad", "hate", "problem", "terrible", "awful", "wrong", "error", "sad", "angry",
    "broken", "ruim", "péssimo", "pessimo", "péssima", "odeio", "odiei", "problema",
    "terrível", "terrivel", "errado", "errada", "erro", "triste", "bravo", "brava",
    "chateado", "chateada", "horrível", "horrivel",
];

/// Keyword-list sentiment classifier.
#[derive(Debug, Default, Clone)]
pub struct SentimentLexicon;

impl SentimentLexicon {
    pub fn new() -> Self {
        Self
    }

    /// Label a single message by which bucket has more hits.
    pub fn label(&self, text: &str) -> SentimentLabel {
        let tokens = tokenize(text);
        let positive = tokens
            .iter()
            .filter(|t| POSITIVE_WORDS.contains(&t.as_str()))
            .count();
        let negative = tokens
            .iter()
            .filter(|t| NEGATIVE_WORDS.contains(&t.as_str()))
            .count();

        if positive > negative {
            SentimentLabel::Positive
        } else if negative > positive {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    /// Tally a whole window; majority bucket wins `overall`, ties fall
    /// back to neutral.
    pub fn tally<'a, I: IntoIterator<Item = &'a str>>(&self, texts: I) -> SentimentSummary {
        let mut summary = SentimentSummary::default();
        for text in texts {
            match self.label(text) {
                SentimentLabel::Positive => summary.positive += 1,
                SentimentLabel::Negative => summary.negative += 1,
                SentimentLabel::Neutral => summary.neutral += 1,
            }
        }

        summary.overall = if summary.positive > summary.negative && summary.positive > summary.neutral
        {
            SentimentLabel::Positive
        } else if summary.negative > summary.positive && summary.negative > summary.neutral {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        };
        summary
    }
}

impl Classifier for SentimentLexicon {
    fn classify(&self, text: &str) -> Classification {
        Classification {
            label: self.label(text).to_string(),
            confidence: 0.6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_message() {
        let clf = SentimentLexicon::new();
        assert_eq!(clf.label("thanks, that was perfect!"), SentimentLabel::Positive);
        assert_eq!(clf.label("adorei, muito obrigada"), SentimentLabel::Positive);
    }

    #[test]
    fn test_negative_message() {
        let clf = SentimentLexicon::new();
        assert_eq!(clf.label("this is wrong, terrible error"), SentimentLabel::Negative);
        assert_eq!(clf.label("que problema horrível"), SentimentLabel::Negative);
    }

    #[test]
    fn test_no_hits_is_neutral() {
        let clf = SentimentLexicon::new();
        assert_eq!(clf.label("meeting at three"), SentimentLabel::Neutral);
    }

    #[test]
    fn test_tie_is_neutral() {
        let clf = SentimentLexicon::new();
        assert_eq!(clf.label("good but wrong"), SentimentLabel::Neutral);
    }

    #[test]
    fn test_tally_majority() {
        let clf = SentimentLexicon::new();
        let summary = clf.tally(["love it", "great stuff", "meh"]);
        assert_eq!(summary.positive, 2);
        assert_eq!(summary.neutral, 1);
        assert_eq!(summary.overall, SentimentLabel::Positive);
    }

    #[test]
    fn test_tally_tie_is_neutral() {
        let clf = SentimentLexicon::new();
        let summary = clf.tally(["love it", "hate it"]);
        assert_eq!(summary.overall, SentimentLabel::Neutral);
    }
}

//! Formality marker counting.
//!
//! Counts politeness markers against casual markers; the profile
//! evolver nudges `formality_level` toward whichever side wins.

use super::tokenize;

const FORMAL_WORDS: &[&str] = &[
    "please", "kindly", "regards", "appreciate", "sir", "madam", "por", "favor", "poderia",
    "gostaria", "obrigado", "obrigada", "senhor", "senhora", "agradeço", "cordialmente",
];

const CASUAL_WORDS: &[&str] = &[
    "hey", "yo", "lol", "haha", "dude", "gonna", "wanna", "yeah", "oi", "eai", "eaí",
    "blz", "vlw", "kkk", "kkkk", "mano", "cara", "falou", "beleza", "tranquilo",
];

/// Marker counts for one piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormalitySignal {
    pub formal_hits: usize,
    pub casual_hits: usize,
}

impl FormalitySignal {
    /// Whether formal markers outnumber casual ones.
    pub fn leans_formal(&self) -> bool {
        self.formal_hits > self.casual_hits
    }

    /// Whether casual markers outnumber formal ones.
    pub fn leans_casual(&self) -> bool {
        self.casual_hits > self.formal_hits
    }
}

/// Keyword-list formality measurer.
#[derive(Debug, Default, Clone)]
pub struct FormalityLexicon;

impl FormalityLexicon {
    pub fn new() -> Self {
        Self
    }

    /// Count formal and casual markers in the text.
    pub fn measure(&self, text: &str) -> FormalitySignal {
        let tokens = tokenize(text);
        FormalitySignal {
            formal_hits: tokens
                .iter()
                .filter(|t| FORMAL_WORDS.contains(&t.as_str()))
                .count(),
            casual_hits: tokens
                .iter()
                .filter(|t| CASUAL_WORDS.contains(&t.as_str()))
                .count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formal_markers() {
        let signal = FormalityLexicon::new().measure("Poderia me ajudar, por favor?");
        assert!(signal.leans_formal());
        assert!(!signal.leans_casual());
    }

    #[test]
    fn test_casual_markers() {
        let signal = FormalityLexicon::new().measure("eai mano, blz?");
        assert!(signal.leans_casual());
    }

    #[test]
    fn test_no_markers_is_balanced() {
        let signal = FormalityLexicon::new().measure("the meeting is at three");
        assert_eq!(signal.formal_hits, 0);
        assert_eq!(signal.casual_hits, 0);
        assert!(!signal.leans_formal());
        assert!(!signal.leans_casual());
    }
}

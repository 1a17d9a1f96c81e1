//! Reference pattern tables.
//!
//! Compiled regex tables per category, bilingual (English and
//! Portuguese). Detection lower-cases the message, collects every
//! match, sorts by (confidence desc, position asc), and keeps the best
//! match per resolution type.

use regex::Regex;

use mnemo_types::reference::{DetectedReference, ReferenceCategory};

/// One pattern row: regex, category, resolution strategy, confidence.
struct PatternRule {
    pattern: &'static str,
    category: ReferenceCategory,
    ref_type: &'static str,
    confidence: f64,
}

const RULES: &[PatternRule] = &[
    // --- temporal: pointing back at earlier statements ---
    PatternRule {
        pattern: r"(like|as) i (said|mentioned)( before| earlier)?",
        category: ReferenceCategory::Temporal,
        ref_type: "previous_statement",
        confidence: 0.9,
    },
    PatternRule {
        pattern: r"como (eu )?(disse|falei|mencionei)( antes| anteriormente)?",
        category: ReferenceCategory::Temporal,
        ref_type: "previous_statement",
        confidence: 0.9,
    },
    PatternRule {
        pattern: r"\b(earlier|previously|anteriormente)\b",
        category: ReferenceCategory::Temporal,
        ref_type: "previous_statement",
        confidence: 0.6,
    },
    // --- spatial: places mentioned before ---
    PatternRule {
        pattern: r"(that|the same) (place|restaurant|store|shop)",
        category: ReferenceCategory::Spatial,
        ref_type: "location_reference",
        confidence: 0.85,
    },
    PatternRule {
        pattern: r"(aquele|aquela|mesmo|mesma) (lugar|restaurante|loja)",
        category: ReferenceCategory::Spatial,
        ref_type: "location_reference",
        confidence: 0.85,
    },
    // --- action: repeat the last thing I did ---
    PatternRule {
        pattern: r"(do|run) (it|that) again",
        category: ReferenceCategory::Action,
        ref_type: "repeat_action",
        confidence: 0.95,
    },
    PatternRule {
        pattern: r"fa(ç|c)a (de novo|novamente|outra vez)",
        category: ReferenceCategory::Action,
        ref_type: "repeat_action",
        confidence: 0.95,
    },
    PatternRule {
        pattern: r"\b(de novo|novamente|outra vez|repete|repetir|again)\b",
        category: ReferenceCategory::Action,
        ref_type: "repeat_action",
        confidence: 0.7,
    },
    // --- person: third parties mentioned before ---
    PatternRule {
        pattern: r"(that|the same) (person|guy|woman|man)",
        category: ReferenceCategory::Person,
        ref_type: "person_reference",
        confidence: 0.8,
    },
    PatternRule {
        pattern: r"(aquela|aquele|mesma|mesmo) (pessoa|cara|mo[çc]a|rapaz)",
        category: ReferenceCategory::Person,
        ref_type: "person_reference",
        confidence: 0.8,
    },
    // --- quantity: amounts mentioned before ---
    PatternRule {
        pattern: r"(the same|that) (amount|quantity|much)",
        category: ReferenceCategory::Quantity,
        ref_type: "quantity_reference",
        confidence: 0.85,
    },
    PatternRule {
        pattern: r"(a )?mesma quantidade|o mesmo (valor|tanto)",
        category: ReferenceCategory::Quantity,
        ref_type: "quantity_reference",
        confidence: 0.85,
    },
    // --- time of day: hours mentioned before ---
    PatternRule {
        pattern: r"(at the|the) same time|same hour",
        category: ReferenceCategory::Time,
        ref_type: "time_reference",
        confidence: 0.85,
    },
    PatternRule {
        pattern: r"(no|o) mesmo hor[aá]rio|na mesma hora",
        category: ReferenceCategory::Time,
        ref_type: "time_reference",
        confidence: 0.85,
    },
];

/// Compiled pattern table.
pub struct PatternSet {
    patterns: Vec<(Regex, &'static PatternRule)>,
}

impl PatternSet {
    /// Compile the built-in table. The patterns are static and known
    /// good; a failure to compile is a programming error.
    pub fn new() -> Self {
        let patterns = RULES
            .iter()
            .map(|rule| {
                let regex = Regex::new(rule.pattern)
                    .unwrap_or_else(|e| panic!("invalid reference pattern '{}': {e}", rule.pattern));
                (regex, rule)
            })
            .collect();
        Self { patterns }
    }

    /// Run every pattern over the message and keep the best match per
    /// resolution type, ordered by (confidence desc, position asc).
    pub fn detect(&self, message: &str) -> Vec<DetectedReference> {
        let lowered = message.to_lowercase();

        let mut detected: Vec<DetectedReference> = Vec::new();
        for (regex, rule) in &self.patterns {
            for found in regex.find_iter(&lowered) {
                detected.push(DetectedReference {
                    category: rule.category,
                    ref_type: rule.ref_type.to_string(),
                    confidence: rule.confidence,
                    matched_text: found.as_str().to_string(),
                    position: found.start(),
                });
            }
        }

        detected.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.position.cmp(&b.position))
        });

        // One detection per resolution type: the sort order means the
        // first seen is the best.
        let mut seen: Vec<String> = Vec::new();
        detected.retain(|d| {
            if seen.contains(&d.ref_type) {
                false
            } else {
                seen.push(d.ref_type.clone());
                true
            }
        });
        detected
    }
}

impl Default for PatternSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect(message: &str) -> Vec<DetectedReference> {
        PatternSet::new().detect(message)
    }

    #[test]
    fn test_all_patterns_compile() {
        let set = PatternSet::new();
        assert_eq!(set.patterns.len(), RULES.len());
    }

    #[test]
    fn test_previous_statement_english() {
        let refs = detect("like I said before, no sugar");
        assert_eq!(refs[0].ref_type, "previous_statement");
        assert_eq!(refs[0].category, ReferenceCategory::Temporal);
    }

    #[test]
    fn test_previous_statement_portuguese() {
        let refs = detect("como eu disse antes, sem açúcar");
        assert_eq!(refs[0].ref_type, "previous_statement");
        assert!(refs[0].confidence >= 0.9);
    }

    #[test]
    fn test_repeat_action_both_languages() {
        for message in ["do it again please", "faça de novo", "can you repeat that? again"] {
            let refs = detect(message);
            assert!(
                refs.iter().any(|r| r.ref_type == "repeat_action"),
                "no repeat_action in '{message}'"
            );
        }
    }

    #[test]
    fn test_one_detection_per_type() {
        // "faça de novo" matches both the strong and weak action
        // patterns; only the strong one survives.
        let refs = detect("faça de novo");
        let actions: Vec<_> = refs.iter().filter(|r| r.ref_type == "repeat_action").collect();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].confidence, 0.95);
    }

    #[test]
    fn test_spatial_and_quantity() {
        let refs = detect("book that restaurant again, the same amount");
        let types: Vec<&str> = refs.iter().map(|r| r.ref_type.as_str()).collect();
        assert!(types.contains(&"location_reference"));
        assert!(types.contains(&"quantity_reference"));
        assert!(types.contains(&"repeat_action"));
    }

    #[test]
    fn test_sorted_by_confidence_then_position() {
        let refs = detect("do it again at the same time");
        assert!(refs.len() >= 2);
        for pair in refs.windows(2) {
            assert!(pair[0].confidence >= pair[1].confidence);
        }
    }

    #[test]
    fn test_plain_message_detects_nothing() {
        assert!(detect("what should I eat for lunch?").is_empty());
    }

    #[test]
    fn test_time_reference_portuguese() {
        let refs = detect("marca no mesmo horário de ontem");
        assert!(refs.iter().any(|r| r.ref_type == "time_reference"));
    }
}

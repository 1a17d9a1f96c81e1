//! Reference detection and resolution types.
//!
//! A "smart reference" is an anaphoric or deictic expression in an
//! inbound message ("like I said before", "the same amount", "faça de
//! novo") resolved against conversation history. Failure to resolve is
//! a normal outcome carrying an explanation, never an error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;

use crate::bounded::BoundedLog;

/// Sliding-window capacity of the per-user action-audit trail.
pub const ACTION_HISTORY_CAP: usize = 10;

/// Pattern family a detected reference belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceCategory {
    Temporal,
    Spatial,
    Action,
    Person,
    Quantity,
    Time,
}

impl fmt::Display for ReferenceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceCategory::Temporal => write!(f, "temporal"),
            ReferenceCategory::Spatial => write!(f, "spatial"),
            ReferenceCategory::Action => write!(f, "action"),
            ReferenceCategory::Person => write!(f, "person"),
            ReferenceCategory::Quantity => write!(f, "quantity"),
            ReferenceCategory::Time => write!(f, "time"),
        }
    }
}

/// A reference expression found in a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedReference {
    pub category: ReferenceCategory,
    /// Resolution strategy key (e.g. "previous_statement",
    /// "repeat_action", "location_reference").
    pub ref_type: String,
    /// Pattern confidence in [0,1].
    pub confidence: f64,
    pub matched_text: String,
    /// Byte offset of the match in the lower-cased message.
    pub position: usize,
}

/// What a resolution attempt produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum ResolutionOutcome {
    /// The reference was tied back to concrete prior content.
    Found {
        content: String,
        timestamp: DateTime<Utc>,
        /// Extra context for the responder (e.g. the matched entity).
        context: Option<String>,
    },
    /// Nothing in history matched; `explanation` is user-facing.
    NotFound { explanation: String },
}

impl ResolutionOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, ResolutionOutcome::Found { .. })
    }
}

/// A detected reference together with its resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceResolution {
    pub reference: DetectedReference,
    pub resolution: ResolutionOutcome,
}

/// Result of running reference processing over one message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceReport {
    pub has_references: bool,
    /// Resolutions ordered by (confidence desc, position asc).
    pub resolutions: Vec<ReferenceResolution>,
    /// Canned follow-up prompts, capped at 3.
    pub suggestions: Vec<String>,
}

impl ReferenceReport {
    /// Report for a message with no reference expressions.
    pub fn empty() -> Self {
        Self {
            has_references: false,
            resolutions: Vec::new(),
            suggestions: Vec::new(),
        }
    }
}

/// One executed action in the audit trail that backs "do it again"
/// resolution. Populated by the command layer, not by message history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedAction {
    pub action: String,
    pub parameters: serde_json::Value,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

/// Per-user action log, capped at [`ACTION_HISTORY_CAP`].
pub type ActionHistory = BoundedLog<RecordedAction>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_display() {
        assert_eq!(ReferenceCategory::Temporal.to_string(), "temporal");
        assert_eq!(ReferenceCategory::Quantity.to_string(), "quantity");
    }

    #[test]
    fn test_outcome_is_found() {
        let found = ResolutionOutcome::Found {
            content: "pizza place downtown".to_string(),
            timestamp: Utc::now(),
            context: None,
        };
        assert!(found.is_found());

        let missing = ResolutionOutcome::NotFound {
            explanation: "no earlier mention found".to_string(),
        };
        assert!(!missing.is_found());
    }

    #[test]
    fn test_outcome_serde_tag() {
        let missing = ResolutionOutcome::NotFound {
            explanation: "nothing".to_string(),
        };
        let json = serde_json::to_string(&missing).unwrap();
        assert!(json.contains("\"outcome\":\"notfound\""));
    }

    #[test]
    fn test_empty_report() {
        let report = ReferenceReport::empty();
        assert!(!report.has_references);
        assert!(report.resolutions.is_empty());
    }
}

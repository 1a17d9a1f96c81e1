//! The evolving behavioral profile.
//!
//! `ProfileEvolver` runs one full learning cycle per interaction:
//! record, three learning passes (preference, behavior, context), three
//! adaptation rule tables (tone, content, timing), then metrics and
//! write-behind persistence.

pub mod adaptation;
pub mod evolver;
pub mod learning;
pub mod prediction;

pub use evolver::{ProfileEvolver, UpdateOutcome};

use serde::{Deserialize, Serialize};

/// One interaction as reported by the dispatch layer.
///
/// `success`, `feedback`, and timing fields come from the caller; the
/// engine never infers them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionEvent {
    /// Interaction kind (e.g. "message", "command", "payment").
    pub kind: String,
    /// Raw message text, when the interaction carries any.
    pub text: Option<String>,
    /// Command name, when the interaction was a command.
    pub command: Option<String>,
    /// Topic label the caller already inferred, if any.
    pub topic: Option<String>,
    pub success: bool,
    /// Explicit user feedback; positive values mean satisfied.
    pub feedback: Option<f64>,
    /// Wall-clock time the response took, in milliseconds.
    pub response_ms: Option<u64>,
    /// Session duration reported at session end, in minutes.
    pub session_minutes: Option<f64>,
    /// Whether the memory engine flagged a topic switch on this
    /// message.
    pub topic_switched: bool,
    /// Opaque payload stored verbatim on the interaction record.
    pub data: serde_json::Value,
}

impl InteractionEvent {
    /// A successful plain-text message interaction.
    pub fn message(text: impl Into<String>) -> Self {
        Self {
            kind: "message".to_string(),
            text: Some(text.into()),
            command: None,
            topic: None,
            success: true,
            feedback: None,
            response_ms: None,
            session_minutes: None,
            topic_switched: false,
            data: serde_json::Value::Null,
        }
    }

    /// A command invocation.
    pub fn command(name: impl Into<String>, success: bool) -> Self {
        Self {
            kind: "command".to_string(),
            text: None,
            command: Some(name.into()),
            topic: None,
            success,
            feedback: None,
            response_ms: None,
            session_minutes: None,
            topic_switched: false,
            data: serde_json::Value::Null,
        }
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub fn with_feedback(mut self, feedback: f64) -> Self {
        self.feedback = Some(feedback);
        self
    }
}

//! Conversation summary types.
//!
//! A `ConversationSummary` is a derived, immutable compression of a
//! message window: topics, key points, extracted preferences, action
//! items, a sentiment tally, and a human-readable digest. A new summary
//! replaces the current one; superseded summaries are appended to the
//! context's summaries log, never mutated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Classification of a key point pulled from the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyPointKind {
    Importance,
    Problem,
    Solution,
    Preference,
}

impl fmt::Display for KeyPointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPointKind::Importance => write!(f, "importance"),
            KeyPointKind::Problem => write!(f, "problem"),
            KeyPointKind::Solution => write!(f, "solution"),
            KeyPointKind::Preference => write!(f, "preference"),
        }
    }
}

impl FromStr for KeyPointKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "importance" => Ok(KeyPointKind::Importance),
            "problem" => Ok(KeyPointKind::Problem),
            "solution" => Ok(KeyPointKind::Solution),
            "preference" => Ok(KeyPointKind::Preference),
            other => Err(format!("invalid key point kind: '{other}'")),
        }
    }
}

/// A sentence flagged as significant during summarization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyPoint {
    pub kind: KeyPointKind,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Lifecycle of an extracted action item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    Open,
    Done,
}

/// A "do something" sentence extracted from the window
/// (create/schedule/remember/configure verbs).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionItem {
    /// The verb family that matched (e.g. "schedule").
    pub kind: String,
    pub content: String,
    pub status: ActionStatus,
}

/// Majority sentiment over the summarized window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SentimentLabel::Positive => write!(f, "positive"),
            SentimentLabel::Negative => write!(f, "negative"),
            SentimentLabel::Neutral => write!(f, "neutral"),
        }
    }
}

/// Per-bucket sentiment counts with the majority label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentSummary {
    pub positive: u32,
    pub negative: u32,
    pub neutral: u32,
    pub overall: SentimentLabel,
}

impl Default for SentimentSummary {
    fn default() -> Self {
        Self {
            positive: 0,
            negative: 0,
            neutral: 0,
            overall: SentimentLabel::Neutral,
        }
    }
}

/// Preferences surfaced by keyword scan during summarization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryPreferences {
    /// Preferred communication medium, when stated (e.g. "audio").
    pub communication: Option<String>,
    /// Topics the user showed interest in within this window.
    pub topics: Vec<String>,
    /// Stated privacy posture, when any ("private" / "shareable").
    pub privacy: Option<String>,
}

/// Immutable compression of a conversation window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSummary {
    /// The conversation this summary closed out.
    pub conversation_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub message_count: usize,
    pub topics: Vec<String>,
    pub key_points: Vec<KeyPoint>,
    pub user_preferences: SummaryPreferences,
    pub action_items: Vec<ActionItem>,
    pub sentiment: SentimentSummary,
    /// Human-readable digest of the above.
    pub summary: String,
}

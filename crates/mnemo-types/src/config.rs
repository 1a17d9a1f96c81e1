//! Engine configuration.
//!
//! All thresholds and windows the engine components consult. Loaded
//! from `config.toml` by the infrastructure layer; every field has a
//! default so a missing or partial file still yields a working engine.

use serde::{Deserialize, Serialize};

/// Tunable windows, thresholds, and retention settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Hard cap on the short-term window; overflow archives the oldest
    /// message into long-term memory.
    pub max_short_term_messages: usize,
    /// Messages recorded in the current conversation (archived ones
    /// included) that trigger auto-summarization.
    pub max_conversation_length: usize,
    /// Messages kept in the short-term window after summarization.
    pub summary_keep_recent: usize,
    /// Minimum window size for a summary to be produced at all.
    pub min_summary_messages: usize,
    /// How many prior messages the topic-change comparison looks at.
    pub topic_window: usize,
    /// Jaccard similarity below which a topic change fires.
    pub topic_similarity_threshold: f64,
    /// Retention window for the cleanup sweep, in days.
    pub retention_days: i64,
    /// TTL for persisted user contexts, in seconds (7 days).
    pub context_ttl_secs: u64,
    /// TTL for persisted profiles and preference snapshots, in seconds
    /// (30 days).
    pub profile_ttl_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_short_term_messages: 10,
            max_conversation_length: 100,
            summary_keep_recent: 10,
            min_summary_messages: 5,
            topic_window: 10,
            topic_similarity_threshold: 0.7,
            retention_days: 30,
            context_ttl_secs: 7 * 24 * 60 * 60,
            profile_ttl_secs: 30 * 24 * 60 * 60,
        }
    }
}

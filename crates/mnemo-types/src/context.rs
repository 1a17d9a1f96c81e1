//! Per-user conversation context.
//!
//! `UserContext` is the unit of state the memory engine owns: the
//! bounded short-term window, the long-term archive, the topic-change
//! log, and the latest summary. One context per user id; created lazily
//! on first interaction and deleted wholesale on opt-out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::collections::VecDeque;

use crate::message::{LongTermEntry, Message};
use crate::summary::ConversationSummary;

/// A detected shift in conversational subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicChange {
    pub timestamp: DateTime<Utc>,
    /// Topic before the shift; None on the first classified message.
    pub from_topic: Option<String>,
    pub to_topic: String,
    /// 1 - similarity of the compared windows, in [0,1].
    pub confidence: f64,
}

/// All conversational state for a single user.
///
/// Owned and mutated exclusively by the memory engine; other components
/// read through published query methods.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserContext {
    /// Regenerated whenever the context is cleared or auto-summarized.
    pub conversation_id: String,
    pub short_term: VecDeque<Message>,
    pub long_term: Vec<LongTermEntry>,
    pub topic_changes: Vec<TopicChange>,
    pub current_topic: Option<String>,
    pub context_summary: Option<ConversationSummary>,
    /// Superseded summaries, oldest first.
    pub summaries: Vec<ConversationSummary>,
    /// Messages recorded in the current conversation, archived ones
    /// included. Reset when the conversation is summarized or cleared.
    pub conversation_length: usize,
    pub last_activity: DateTime<Utc>,
}

impl UserContext {
    /// Fresh context with a new conversation id.
    pub fn new() -> Self {
        Self {
            conversation_id: new_conversation_id(),
            short_term: VecDeque::new(),
            long_term: Vec::new(),
            topic_changes: Vec::new(),
            current_topic: None,
            context_summary: None,
            summaries: Vec::new(),
            conversation_length: 0,
            last_activity: Utc::now(),
        }
    }

    /// Stamp the context as touched now.
    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }
}

impl Default for UserContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Mint a conversation id (UUID v7, time-sortable).
pub fn new_conversation_id() -> String {
    format!("conv_{}", Uuid::now_v7().simple())
}

/// Read-only projection of a context for downstream consumers.
#[derive(Debug, Clone, Serialize)]
pub struct ContextSnapshot {
    pub conversation_id: String,
    pub message_count: usize,
    /// Most recent messages, oldest first (up to 5).
    pub recent_messages: Vec<Message>,
    /// Most recent topic changes, oldest first (up to 3).
    pub recent_topic_changes: Vec<TopicChange>,
    pub current_topic: Option<String>,
    pub summary: Option<ConversationSummary>,
    pub last_activity: DateTime<Utc>,
}

/// Counters projection for stats queries.
#[derive(Debug, Clone, Serialize)]
pub struct ContextStats {
    pub conversation_id: String,
    pub short_term_count: usize,
    pub long_term_count: usize,
    pub pinned_count: usize,
    pub topic_change_count: usize,
    pub summary_count: usize,
    pub last_activity: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_context_is_empty() {
        let ctx = UserContext::new();
        assert!(ctx.short_term.is_empty());
        assert!(ctx.long_term.is_empty());
        assert!(ctx.current_topic.is_none());
        assert!(ctx.context_summary.is_none());
    }

    #[test]
    fn test_conversation_ids_are_unique() {
        let a = new_conversation_id();
        let b = new_conversation_id();
        assert_ne!(a, b);
        assert!(a.starts_with("conv_"));
    }

    #[test]
    fn test_context_serde_roundtrip() {
        let ctx = UserContext::new();
        let json = serde_json::to_string(&ctx).unwrap();
        let back: UserContext = serde_json::from_str(&json).unwrap();
        assert_eq!(back.conversation_id, ctx.conversation_id);
    }
}

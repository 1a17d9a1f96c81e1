//! The memory engine.
//!
//! Owns every per-user `UserContext` behind a per-user async mutex, so
//! concurrent messages from the same user serialize instead of racing a
//! read-modify-write across an await point. All in-memory mutation
//! happens under the lock; persistence is write-behind -- a store
//! failure is logged with a redacted user id and never rolls back
//! in-memory state.

use chrono::{Duration, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use std::sync::Arc;

use mnemo_types::config::EngineConfig;
use mnemo_types::context::{
    ContextSnapshot, ContextStats, TopicChange, UserContext, new_conversation_id,
};
use mnemo_types::error::EngineError;
use mnemo_types::message::{ARCHIVED_CATEGORY, LongTermEntry, Message, MessageKind};
use mnemo_types::redact;

use crate::classify::topic::{jaccard_similarity, topic_distribution};
use crate::classify::{Classifier, KeywordTopicClassifier};
use crate::memory::search::{self, SearchHit};
use crate::memory::summarizer::ConversationSummarizer;
use crate::reference::{HistoryItem, HistorySource};
use crate::storage::{KvStore, context_key};

/// Outcome of recording one inbound message.
#[derive(Debug, Clone)]
pub struct RecordOutcome {
    pub message_id: Uuid,
    /// Present when the message shifted the conversation topic.
    pub topic_change: Option<TopicChange>,
    /// Whether this message tripped auto-summarization.
    pub summarized: bool,
}

/// Result of a retention sweep.
#[derive(Debug, Clone, Default)]
pub struct CleanupReport {
    pub users_touched: usize,
    pub entries_removed: usize,
}

/// Per-user conversational memory store.
///
/// Generic over the [`KvStore`] port and the topic [`Classifier`] so
/// rule tables and persistence can each be swapped without touching the
/// state machine.
pub struct MemoryEngine<K: KvStore, C: Classifier = KeywordTopicClassifier> {
    store: K,
    classifier: C,
    config: EngineConfig,
    contexts: DashMap<String, Arc<Mutex<UserContext>>>,
}

impl<K: KvStore> MemoryEngine<K> {
    /// Engine with the default keyword topic classifier.
    pub fn new(store: K, config: EngineConfig) -> Self {
        Self::with_classifier(store, config, KeywordTopicClassifier::new())
    }
}

impl<K: KvStore, C: Classifier> MemoryEngine<K, C> {
    /// Engine with a custom topic classifier.
    pub fn with_classifier(store: K, config: EngineConfig, classifier: C) -> Self {
        Self {
            store,
            classifier,
            config,
            contexts: DashMap::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Access the backing store.
    pub fn store(&self) -> &K {
        &self.store
    }

    /// Record one inbound message: append to the short-term window,
    /// detect topic drift, auto-summarize when the window is full, then
    /// persist write-behind.
    #[tracing::instrument(
        name = "record_message",
        skip(self, user_id, content, metadata),
        fields(user = %redact::user_id(user_id), kind = %kind)
    )]
    pub async fn record_message(
        &self,
        user_id: &str,
        content: &str,
        kind: MessageKind,
        metadata: serde_json::Value,
    ) -> Result<RecordOutcome, EngineError> {
        if content.trim().is_empty() {
            return Err(EngineError::validation(
                "message content is required",
                "send a non-empty message",
            ));
        }

        let entry = self.entry_or_create(user_id).await;
        let mut ctx = entry.lock().await;

        let topic_change = self.detect_topic_change(&ctx, content);
        if let Some(change) = &topic_change {
            ctx.topic_changes.push(change.clone());
        }
        let new_topic = self.classifier.classify(content).label;
        ctx.current_topic = Some(new_topic);

        let message = Message::new(kind, content, metadata);
        let message_id = message.id;
        ctx.short_term.push_back(message);
        ctx.conversation_length += 1;

        // Hard window bound: overflow archives, never discards.
        while ctx.short_term.len() > self.config.max_short_term_messages {
            if let Some(oldest) = ctx.short_term.pop_front() {
                ctx.long_term.push(LongTermEntry::archived(oldest));
            }
        }

        let mut summarized = false;
        if ctx.conversation_length >= self.config.max_conversation_length {
            summarized = self.summarize_locked(&mut ctx);
        }

        ctx.touch();
        self.persist(user_id, &ctx).await;

        Ok(RecordOutcome {
            message_id,
            topic_change,
            summarized,
        })
    }

    /// Read-only projection of the user's context, or `None` if the
    /// user has never interacted.
    pub async fn current_context(&self, user_id: &str) -> Option<ContextSnapshot> {
        let entry = self.peek(user_id).await?;
        let ctx = entry.lock().await;

        let recent_messages: Vec<Message> = ctx
            .short_term
            .iter()
            .rev()
            .take(5)
            .rev()
            .cloned()
            .collect();
        let recent_topic_changes: Vec<TopicChange> = ctx
            .topic_changes
            .iter()
            .rev()
            .take(3)
            .rev()
            .cloned()
            .collect();

        Some(ContextSnapshot {
            conversation_id: ctx.conversation_id.clone(),
            message_count: ctx.short_term.len(),
            recent_messages,
            recent_topic_changes,
            current_topic: ctx.current_topic.clone(),
            summary: ctx.context_summary.clone(),
            last_activity: ctx.last_activity,
        })
    }

    /// Close out the active conversation: force a final summarization
    /// if enough messages are pending, reset the ephemeral state, and
    /// mint a new conversation id. Long-term memory survives.
    pub async fn clear_context(&self, user_id: &str) -> Result<(), EngineError> {
        let Some(entry) = self.peek(user_id).await else {
            return Ok(());
        };
        let mut ctx = entry.lock().await;

        if let Some(summary) =
            ConversationSummarizer::build(&ctx, &self.classifier, &self.config)
        {
            ctx.summaries.push(summary);
        }
        if let Some(previous) = ctx.context_summary.take() {
            ctx.summaries.push(previous);
        }

        ctx.short_term.clear();
        ctx.topic_changes.clear();
        ctx.current_topic = None;
        ctx.conversation_length = 0;
        ctx.conversation_id = new_conversation_id();
        ctx.touch();
        self.persist(user_id, &ctx).await;
        Ok(())
    }

    /// Pin a note into long-term memory under a user-supplied category.
    pub async fn save_important_info(
        &self,
        user_id: &str,
        content: &str,
        category: &str,
    ) -> Result<Uuid, EngineError> {
        if content.trim().is_empty() {
            return Err(EngineError::validation(
                "content is required",
                "provide the text to remember",
            ));
        }
        let category = category.trim();
        if category.is_empty() || category == ARCHIVED_CATEGORY {
            return Err(EngineError::validation(
                format!("'{category}' is not a usable category"),
                "pick a category name other than the reserved 'message'",
            ));
        }

        let entry = self.entry_or_create(user_id).await;
        let mut ctx = entry.lock().await;

        let note = LongTermEntry {
            id: Uuid::now_v7(),
            timestamp: Utc::now(),
            content: content.to_string(),
            category: category.to_string(),
            metadata: serde_json::Value::Null,
        };
        let id = note.id;
        ctx.long_term.push(note);
        ctx.touch();
        self.persist(user_id, &ctx).await;
        Ok(id)
    }

    /// User-pinned notes, optionally filtered by category. Auto-archived
    /// overflow is excluded.
    pub async fn important_info(
        &self,
        user_id: &str,
        category: Option<&str>,
    ) -> Vec<LongTermEntry> {
        let Some(entry) = self.peek(user_id).await else {
            return Vec::new();
        };
        let ctx = entry.lock().await;
        ctx.long_term
            .iter()
            .filter(|e| !e.is_archived_message())
            .filter(|e| category.is_none_or(|c| e.category == c))
            .cloned()
            .collect()
    }

    /// Flip the `processed` flag on a short-term message once the
    /// dispatch layer has handled it. Returns whether the message was
    /// found. The only mutation a message admits after creation.
    pub async fn mark_processed(&self, user_id: &str, message_id: Uuid) -> bool {
        let Some(entry) = self.peek(user_id).await else {
            return false;
        };
        let mut ctx = entry.lock().await;
        let Some(message) = ctx.short_term.iter_mut().find(|m| m.id == message_id) else {
            return false;
        };
        message.processed = true;
        ctx.touch();
        self.persist(user_id, &ctx).await;
        true
    }

    /// Search short- and long-term memory for entries matching `query`.
    pub async fn find_smart_references(&self, user_id: &str, query: &str) -> Vec<SearchHit> {
        let Some(entry) = self.peek(user_id).await else {
            return Vec::new();
        };
        let ctx = entry.lock().await;
        search::find_references(&ctx, query)
    }

    /// Counters projection for stats queries.
    pub async fn context_stats(&self, user_id: &str) -> Option<ContextStats> {
        let entry = self.peek(user_id).await?;
        let ctx = entry.lock().await;
        Some(ContextStats {
            conversation_id: ctx.conversation_id.clone(),
            short_term_count: ctx.short_term.len(),
            long_term_count: ctx.long_term.len(),
            pinned_count: ctx
                .long_term
                .iter()
                .filter(|e| !e.is_archived_message())
                .count(),
            topic_change_count: ctx.topic_changes.len(),
            summary_count: ctx.summaries.len() + usize::from(ctx.context_summary.is_some()),
            last_activity: ctx.last_activity,
        })
    }

    /// Retention sweep: drop archive entries, topic changes, and
    /// superseded summaries older than the configured window.
    pub async fn cleanup_old_data(&self) -> CleanupReport {
        let cutoff = Utc::now() - Duration::days(self.config.retention_days);
        let mut report = CleanupReport::default();

        let user_ids: Vec<String> = self.contexts.iter().map(|e| e.key().clone()).collect();
        for user_id in user_ids {
            let Some(entry) = self.peek(&user_id).await else {
                continue;
            };
            let mut ctx = entry.lock().await;

            let before = ctx.long_term.len() + ctx.topic_changes.len() + ctx.summaries.len();
            ctx.long_term.retain(|e| e.timestamp >= cutoff);
            ctx.topic_changes.retain(|t| t.timestamp >= cutoff);
            ctx.summaries.retain(|s| s.end_time >= cutoff);
            let removed =
                before - (ctx.long_term.len() + ctx.topic_changes.len() + ctx.summaries.len());

            if removed > 0 {
                report.users_touched += 1;
                report.entries_removed += removed;
                self.persist(&user_id, &ctx).await;
            }
        }

        debug!(
            users = report.users_touched,
            removed = report.entries_removed,
            "memory retention sweep complete"
        );
        report
    }

    /// Drop every trace of a user from this engine and its store key.
    /// Used by the privacy gate.
    pub async fn remove_user(&self, user_id: &str) {
        self.contexts.remove(user_id);
        if let Err(err) = self.store.delete(&context_key(user_id)).await {
            warn!(
                user = %redact::user_id(user_id),
                error = %err,
                "failed to delete persisted context"
            );
        }
    }

    /// Full context clone for data export. `None` if the user is
    /// unknown.
    pub async fn export_context(&self, user_id: &str) -> Option<UserContext> {
        let entry = self.peek(user_id).await?;
        let ctx = entry.lock().await;
        Some(ctx.clone())
    }

    // --- internals ---

    /// Compare the new message's topic against the trailing window.
    fn detect_topic_change(&self, ctx: &UserContext, content: &str) -> Option<TopicChange> {
        if ctx.short_term.is_empty() {
            return None;
        }

        let window_labels: Vec<String> = ctx
            .short_term
            .iter()
            .rev()
            .take(self.config.topic_window)
            .map(|m| self.classifier.classify(&m.content).label)
            .collect();
        let new_label = self.classifier.classify(content).label;

        let prior = topic_distribution(window_labels.iter().map(String::as_str));
        let incoming = topic_distribution([new_label.as_str()]);
        let similarity = jaccard_similarity(&prior, &incoming);

        if similarity < self.config.topic_similarity_threshold {
            Some(TopicChange {
                timestamp: Utc::now(),
                from_topic: ctx.current_topic.clone(),
                to_topic: new_label,
                confidence: 1.0 - similarity,
            })
        } else {
            None
        }
    }

    /// Summarize and trim the window. Returns whether a summary was
    /// produced; a window below the minimum is left untouched.
    fn summarize_locked(&self, ctx: &mut UserContext) -> bool {
        let Some(summary) = ConversationSummarizer::build(ctx, &self.classifier, &self.config)
        else {
            return false;
        };

        if let Some(previous) = ctx.context_summary.take() {
            ctx.summaries.push(previous);
        }
        ctx.context_summary = Some(summary);

        // Keep only the most recent messages; archive the rest.
        while ctx.short_term.len() > self.config.summary_keep_recent {
            if let Some(oldest) = ctx.short_term.pop_front() {
                ctx.long_term.push(LongTermEntry::archived(oldest));
            }
        }
        ctx.conversation_length = 0;
        ctx.conversation_id = new_conversation_id();
        true
    }

    /// Get the per-user entry, creating a fresh context if the user is
    /// new and nothing is persisted.
    async fn entry_or_create(&self, user_id: &str) -> Arc<Mutex<UserContext>> {
        if let Some(existing) = self.contexts.get(user_id) {
            return existing.value().clone();
        }
        let loaded = self.load_context(user_id).await.unwrap_or_default();
        self.contexts
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(loaded)))
            .value()
            .clone()
    }

    /// Get the per-user entry without creating one.
    async fn peek(&self, user_id: &str) -> Option<Arc<Mutex<UserContext>>> {
        if let Some(existing) = self.contexts.get(user_id) {
            return Some(existing.value().clone());
        }
        let loaded = self.load_context(user_id).await?;
        Some(
            self.contexts
                .entry(user_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(loaded)))
                .value()
                .clone(),
        )
    }

    /// Load a persisted context. Malformed or unreadable state is
    /// logged and treated as absent rather than propagated.
    async fn load_context(&self, user_id: &str) -> Option<UserContext> {
        let raw = match self.store.get(&context_key(user_id)).await {
            Ok(raw) => raw?,
            Err(err) => {
                warn!(
                    user = %redact::user_id(user_id),
                    error = %err,
                    "failed to load persisted context"
                );
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(ctx) => Some(ctx),
            Err(err) => {
                warn!(
                    user = %redact::user_id(user_id),
                    error = %err,
                    "persisted context is malformed, starting fresh"
                );
                None
            }
        }
    }

    /// Write-behind persistence; failures are logged, never propagated.
    async fn persist(&self, user_id: &str, ctx: &UserContext) {
        let json = match serde_json::to_string(ctx) {
            Ok(json) => json,
            Err(err) => {
                warn!(
                    user = %redact::user_id(user_id),
                    error = %err,
                    "failed to serialize context"
                );
                return;
            }
        };
        if let Err(err) = self
            .store
            .set(&context_key(user_id), &json, Some(self.config.context_ttl_secs))
            .await
        {
            warn!(
                user = %redact::user_id(user_id),
                error = %err,
                "failed to persist context"
            );
        }
    }
}

impl<K: KvStore, C: Classifier> HistorySource for MemoryEngine<K, C> {
    async fn recent_messages(&self, user_id: &str, limit: usize) -> Vec<HistoryItem> {
        let Some(entry) = self.peek(user_id).await else {
            return Vec::new();
        };
        let ctx = entry.lock().await;
        ctx.short_term
            .iter()
            .rev()
            .take(limit)
            .rev()
            .map(|m| HistoryItem {
                content: m.content.clone(),
                timestamp: m.timestamp,
            })
            .collect()
    }

    async fn full_history(&self, user_id: &str) -> Vec<HistoryItem> {
        let Some(entry) = self.peek(user_id).await else {
            return Vec::new();
        };
        let ctx = entry.lock().await;
        let mut items: Vec<HistoryItem> = ctx
            .long_term
            .iter()
            .map(|e| HistoryItem {
                content: e.content.clone(),
                timestamp: e.timestamp,
            })
            .collect();
        items.extend(ctx.short_term.iter().map(|m| HistoryItem {
            content: m.content.clone(),
            timestamp: m.timestamp,
        }));
        items.sort_by_key(|i| i.timestamp);
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StubStore;

    const USER: &str = "5511999990000";

    fn engine() -> MemoryEngine<StubStore> {
        MemoryEngine::new(StubStore::new(), EngineConfig::default())
    }

    async fn record(engine: &MemoryEngine<StubStore>, content: &str) -> RecordOutcome {
        engine
            .record_message(USER, content, MessageKind::Text, serde_json::Value::Null)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_empty_content_is_validation_error() {
        let engine = engine();
        let err = engine
            .record_message(USER, "   ", MessageKind::Text, serde_json::Value::Null)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_short_term_never_exceeds_cap() {
        let engine = engine();
        let cap = engine.config().max_short_term_messages;
        for i in 0..40 {
            record(&engine, &format!("message number {i}")).await;
            let snapshot = engine.current_context(USER).await.unwrap();
            assert!(snapshot.message_count <= cap);
        }
    }

    #[tokio::test]
    async fn test_overflow_archives_instead_of_discarding() {
        let engine = engine();
        for i in 0..15 {
            record(&engine, &format!("message number {i}")).await;
        }
        let stats = engine.context_stats(USER).await.unwrap();
        assert_eq!(stats.short_term_count, 10);
        assert_eq!(stats.long_term_count, 5);
        assert_eq!(stats.pinned_count, 0);
    }

    #[tokio::test]
    async fn test_105_messages_trim_to_10_with_summary() {
        let engine = engine();
        let mut summarized_at = None;
        for i in 0..105 {
            let outcome = record(&engine, &format!("meal plan update number {i}")).await;
            if outcome.summarized {
                summarized_at = Some(i + 1);
            }
        }
        assert_eq!(summarized_at, Some(100));

        let snapshot = engine.current_context(USER).await.unwrap();
        assert_eq!(snapshot.message_count, 10);
        assert!(snapshot.summary.is_some());
    }

    #[tokio::test]
    async fn test_summarize_trims_wide_window_to_keep_recent() {
        let config = EngineConfig {
            max_short_term_messages: 50,
            max_conversation_length: 20,
            ..EngineConfig::default()
        };
        let engine = MemoryEngine::new(StubStore::new(), config);
        for i in 0..20 {
            record(&engine, &format!("protein meal {i}")).await;
        }
        let stats = engine.context_stats(USER).await.unwrap();
        assert_eq!(stats.short_term_count, 10);
        assert_eq!(stats.long_term_count, 10);
        assert_eq!(stats.summary_count, 1);
    }

    #[tokio::test]
    async fn test_alternating_topics_fire_change_events() {
        let engine = engine();
        for i in 0..6 {
            record(&engine, &format!("my meal today had protein, item {i}")).await;
            record(&engine, &format!("gym workout session number {i}")).await;
        }
        let stats = engine.context_stats(USER).await.unwrap();
        assert!(stats.topic_change_count >= 1);
    }

    #[tokio::test]
    async fn test_uniform_topic_fires_no_change_events() {
        let engine = engine();
        for i in 0..12 {
            record(&engine, &format!("meal plan with protein, day {i}")).await;
        }
        let stats = engine.context_stats(USER).await.unwrap();
        assert_eq!(stats.topic_change_count, 0);
    }

    #[tokio::test]
    async fn test_topic_change_confidence_in_range() {
        let engine = engine();
        record(&engine, "meal with lots of protein").await;
        let outcome = record(&engine, "how much does the gym cost").await;
        let change = outcome.topic_change.expect("topic change expected");
        assert!(change.confidence > 0.0 && change.confidence <= 1.0);
        assert_eq!(change.from_topic.as_deref(), Some("nutrition"));
    }

    #[tokio::test]
    async fn test_current_context_unknown_user_is_none() {
        let engine = engine();
        assert!(engine.current_context("nobody").await.is_none());
    }

    #[tokio::test]
    async fn test_clear_context_preserves_long_term() {
        let engine = engine();
        for i in 0..15 {
            record(&engine, &format!("note {i}")).await;
        }
        engine
            .save_important_info(USER, "alergia a amendoim", "health")
            .await
            .unwrap();
        let before = engine.current_context(USER).await.unwrap();

        engine.clear_context(USER).await.unwrap();

        let after = engine.current_context(USER).await.unwrap();
        assert_eq!(after.message_count, 0);
        assert_ne!(after.conversation_id, before.conversation_id);
        assert!(after.current_topic.is_none());
        // Pinned note and archived overflow both survive the clear.
        let pinned = engine.important_info(USER, None).await;
        assert_eq!(pinned.len(), 1);
        let stats = engine.context_stats(USER).await.unwrap();
        assert!(stats.long_term_count > 1);
    }

    #[tokio::test]
    async fn test_clear_records_final_summary() {
        let engine = engine();
        for i in 0..8 {
            record(&engine, &format!("workout progress day {i}")).await;
        }
        engine.clear_context(USER).await.unwrap();
        let stats = engine.context_stats(USER).await.unwrap();
        assert_eq!(stats.summary_count, 1);
    }

    #[tokio::test]
    async fn test_clear_below_minimum_is_summary_noop() {
        let engine = engine();
        for i in 0..3 {
            record(&engine, &format!("hi {i}")).await;
        }
        engine.clear_context(USER).await.unwrap();
        let stats = engine.context_stats(USER).await.unwrap();
        assert_eq!(stats.summary_count, 0);
    }

    #[tokio::test]
    async fn test_reserved_category_rejected() {
        let engine = engine();
        let err = engine
            .save_important_info(USER, "some note", "message")
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_important_info_filters_by_category() {
        let engine = engine();
        engine
            .save_important_info(USER, "no peanuts", "health")
            .await
            .unwrap();
        engine
            .save_important_info(USER, "rent due on the 5th", "finance")
            .await
            .unwrap();

        let health = engine.important_info(USER, Some("health")).await;
        assert_eq!(health.len(), 1);
        assert_eq!(health[0].content, "no peanuts");
        let all = engine.important_info(USER, None).await;
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_store_failure_is_nonfatal() {
        let engine = MemoryEngine::new(StubStore::failing(), EngineConfig::default());
        // The write fails behind the scenes; recording still succeeds.
        let outcome = record(&engine, "hello there").await;
        assert!(outcome.topic_change.is_none());
        let snapshot = engine.current_context(USER).await.unwrap();
        assert_eq!(snapshot.message_count, 1);
    }

    #[tokio::test]
    async fn test_context_reloads_from_store() {
        let backing = StubStore::new();
        {
            let engine = MemoryEngine::new(&backing, EngineConfig::default());
            engine
                .record_message(
                    USER,
                    "remember the pizza place",
                    MessageKind::Text,
                    serde_json::Value::Null,
                )
                .await
                .unwrap();
        }

        // A fresh engine over the same backing store sees the context.
        let fresh = MemoryEngine::new(&backing, EngineConfig::default());
        let snapshot = fresh.current_context(USER).await.unwrap();
        assert_eq!(snapshot.message_count, 1);
        assert_eq!(snapshot.recent_messages[0].content, "remember the pizza place");
    }

    #[tokio::test]
    async fn test_malformed_persisted_context_treated_as_absent() {
        let store = StubStore::new();
        store
            .set(&context_key(USER), "{not json", None)
            .await
            .unwrap();
        let engine = MemoryEngine::new(store, EngineConfig::default());
        assert!(engine.current_context(USER).await.is_none());
        // And recording starts a fresh context rather than failing.
        let outcome = record(&engine, "fresh start").await;
        assert!(!outcome.summarized);
    }

    #[tokio::test]
    async fn test_cleanup_removes_old_entries() {
        let engine = engine();
        for i in 0..15 {
            record(&engine, &format!("old message {i}")).await;
        }
        // Backdate the archive beyond the retention window.
        {
            let entry = engine.peek(USER).await.unwrap();
            let mut ctx = entry.lock().await;
            let old = Utc::now() - Duration::days(60);
            for e in &mut ctx.long_term {
                e.timestamp = old;
            }
        }
        let report = engine.cleanup_old_data().await;
        assert_eq!(report.users_touched, 1);
        assert_eq!(report.entries_removed, 5);
        let stats = engine.context_stats(USER).await.unwrap();
        assert_eq!(stats.long_term_count, 0);
    }

    #[tokio::test]
    async fn test_remove_user_deletes_state_and_key() {
        let engine = engine();
        record(&engine, "to be forgotten").await;
        engine.remove_user(USER).await;
        assert!(engine.current_context(USER).await.is_none());
        let keys = engine.store.keys("user_context:*").await.unwrap();
        assert!(keys.is_empty());
    }

    #[tokio::test]
    async fn test_mark_processed() {
        let engine = engine();
        let outcome = record(&engine, "handle this one").await;
        let snapshot = engine.current_context(USER).await.unwrap();
        assert!(!snapshot.recent_messages[0].processed);

        assert!(engine.mark_processed(USER, outcome.message_id).await);
        let snapshot = engine.current_context(USER).await.unwrap();
        assert!(snapshot.recent_messages[0].processed);

        // Unknown ids report false instead of erroring.
        assert!(!engine.mark_processed(USER, Uuid::now_v7()).await);
    }

    #[tokio::test]
    async fn test_history_source_views() {
        let engine = engine();
        for i in 0..15 {
            record(&engine, &format!("history item {i}")).await;
        }
        let recent = engine.recent_messages(USER, 5).await;
        assert_eq!(recent.len(), 5);
        assert_eq!(recent.last().unwrap().content, "history item 14");

        let full = engine.full_history(USER).await;
        assert_eq!(full.len(), 15);
        assert_eq!(full.first().unwrap().content, "history item 0");
        assert!(full.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }
}

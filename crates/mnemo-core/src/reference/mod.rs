//! Smart-reference detection and resolution.
//!
//! Detects anaphoric/deictic expressions in inbound messages and
//! resolves them against conversation history and the action-audit
//! trail. History is consumed through the [`HistorySource`] port, which
//! the memory engine implements; the resolver itself owns only the
//! per-user action logs.

pub mod patterns;
pub mod resolver;

pub use patterns::PatternSet;
pub use resolver::ReferenceResolver;

use chrono::{DateTime, Utc};

/// One history entry as the resolver sees it: content plus timestamp,
/// regardless of which memory tier it came from.
#[derive(Debug, Clone)]
pub struct HistoryItem {
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Read-only conversation history access.
///
/// Implemented by `MemoryEngine`; a fixed in-memory implementation
/// backs the resolver tests. Uses RPITIT (native async fn in traits,
/// Rust 2024 edition).
pub trait HistorySource: Send + Sync {
    /// The most recent messages, oldest first, capped at `limit`.
    fn recent_messages(
        &self,
        user_id: &str,
        limit: usize,
    ) -> impl std::future::Future<Output = Vec<HistoryItem>> + Send;

    /// Short-term and long-term history combined, oldest first.
    fn full_history(
        &self,
        user_id: &str,
    ) -> impl std::future::Future<Output = Vec<HistoryItem>> + Send;
}

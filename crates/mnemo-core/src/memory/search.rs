//! Lightweight history search.
//!
//! Backs `find_smart_references`: substring matches score high, token
//! overlap scores proportionally, results are ranked by confidence then
//! recency and capped at five.

use chrono::{DateTime, Utc};
use serde::Serialize;

use mnemo_types::context::UserContext;

use crate::classify::tokenize;

/// Confidence for a direct substring hit.
const SUBSTRING_CONFIDENCE: f64 = 0.9;
/// Minimum token-overlap ratio worth reporting.
const MIN_OVERLAP: f64 = 0.3;
/// Maximum number of hits returned.
const MAX_HITS: usize = 5;

/// One matching history entry.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub content: String,
    /// Where the hit came from: "short_term" or a long-term category.
    pub source: String,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
}

/// Scan short-term and long-term memory for entries matching `query`.
pub fn find_references(ctx: &UserContext, query: &str) -> Vec<SearchHit> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    let query_tokens = tokenize(&needle);

    let mut hits: Vec<SearchHit> = Vec::new();
    for msg in &ctx.short_term {
        if let Some(confidence) = score(&msg.content, &needle, &query_tokens) {
            hits.push(SearchHit {
                content: msg.content.clone(),
                source: "short_term".to_string(),
                confidence,
                timestamp: msg.timestamp,
            });
        }
    }
    for entry in &ctx.long_term {
        if let Some(confidence) = score(&entry.content, &needle, &query_tokens) {
            hits.push(SearchHit {
                content: entry.content.clone(),
                source: entry.category.clone(),
                confidence,
                timestamp: entry.timestamp,
            });
        }
    }

    hits.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(b.timestamp.cmp(&a.timestamp))
    });
    hits.truncate(MAX_HITS);
    hits
}

/// Score one entry against the query, if it matches at all.
fn score(content: &str, needle: &str, query_tokens: &[String]) -> Option<f64> {
    let haystack = content.to_lowercase();
    if haystack.contains(needle) {
        return Some(SUBSTRING_CONFIDENCE);
    }
    if query_tokens.is_empty() {
        return None;
    }

    let content_tokens = tokenize(&haystack);
    let overlap = query_tokens
        .iter()
        .filter(|t| content_tokens.contains(t))
        .count();
    let ratio = overlap as f64 / query_tokens.len() as f64;
    if ratio >= MIN_OVERLAP {
        // Overlap hits rank below any substring hit.
        Some(ratio * 0.7)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mnemo_types::message::{LongTermEntry, Message, MessageKind};

    fn ctx() -> UserContext {
        let mut ctx = UserContext::new();
        for content in [
            "let's order from the pizza place downtown",
            "my budget is 50 reais",
            "schedule the gym for monday",
        ] {
            ctx.short_term.push_back(Message::new(
                MessageKind::Text,
                content,
                serde_json::Value::Null,
            ));
        }
        ctx.long_term.push(LongTermEntry::archived(Message::new(
            MessageKind::Text,
            "the pizza was great last time",
            serde_json::Value::Null,
        )));
        ctx
    }

    #[test]
    fn test_substring_match_ranks_first() {
        let hits = find_references(&ctx(), "pizza place");
        assert!(!hits.is_empty());
        assert_eq!(hits[0].confidence, SUBSTRING_CONFIDENCE);
        assert!(hits[0].content.contains("pizza place"));
    }

    #[test]
    fn test_searches_long_term_too() {
        let hits = find_references(&ctx(), "pizza");
        assert!(hits.iter().any(|h| h.source == "message"));
        assert!(hits.iter().any(|h| h.source == "short_term"));
    }

    #[test]
    fn test_token_overlap_fallback() {
        let hits = find_references(&ctx(), "gym monday schedule");
        assert!(!hits.is_empty());
        assert!(hits[0].confidence < SUBSTRING_CONFIDENCE);
    }

    #[test]
    fn test_no_match_is_empty() {
        assert!(find_references(&ctx(), "quantum physics").is_empty());
    }

    #[test]
    fn test_empty_query_is_empty() {
        assert!(find_references(&ctx(), "   ").is_empty());
    }

    #[test]
    fn test_cap_at_five() {
        let mut ctx = UserContext::new();
        for i in 0..10 {
            ctx.short_term.push_back(Message::new(
                MessageKind::Text,
                format!("pizza number {i}"),
                serde_json::Value::Null,
            ));
        }
        let hits = find_references(&ctx, "pizza");
        assert_eq!(hits.len(), 5);
    }
}

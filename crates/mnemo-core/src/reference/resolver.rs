//! Reference resolution against history and the action log.
//!
//! Each detected reference resolves through a strategy keyed by its
//! type: the last substantial statement, the last recorded action, an
//! entity scan, a numeric/time scan, or a token-overlap fallback.
//! "Not found" is a normal outcome with a user-facing explanation.

use dashmap::DashMap;
use regex::Regex;

use std::sync::Arc;

use mnemo_types::error::EngineError;
use mnemo_types::reference::{
    ACTION_HISTORY_CAP, ActionHistory, DetectedReference, RecordedAction, ReferenceReport,
    ReferenceResolution, ResolutionOutcome,
};

use crate::classify::tokenize;

use super::{HistoryItem, HistorySource, PatternSet};

/// How many recent messages the previous-statement strategy considers.
const PREVIOUS_STATEMENT_WINDOW: usize = 5;
/// Minimum content length for a "statement" worth pointing back at.
const MIN_STATEMENT_LEN: usize = 10;
/// Cap on contextual follow-up suggestions.
const MAX_SUGGESTIONS: usize = 3;

/// Entity synonym map for spatial/person lookups.
const ENTITY_SYNONYMS: &[(&str, &[&str])] = &[
    (
        "location",
        &[
            "restaurant", "place", "store", "shop", "cafe", "restaurante", "lugar", "loja",
            "mercado", "padaria",
        ],
    ),
    (
        "person",
        &[
            "person", "friend", "guy", "woman", "man", "pessoa", "amigo", "amiga", "cara",
            "moça", "rapaz",
        ],
    ),
];

/// Words too common to count for the token-overlap fallback.
const STOPWORDS: &[&str] = &[
    "the", "a", "an", "that", "this", "it", "i", "o", "os", "as", "um", "uma", "que", "de",
    "do", "da", "eu", "same", "mesmo", "mesma",
];

/// Detects and resolves smart references. Owns the per-user
/// action-audit trail; everything else is read through
/// [`HistorySource`].
pub struct ReferenceResolver {
    patterns: PatternSet,
    actions: DashMap<String, Arc<tokio::sync::Mutex<ActionHistory>>>,
    quantity_regex: Regex,
    time_regex: Regex,
}

impl ReferenceResolver {
    pub fn new() -> Self {
        Self {
            patterns: PatternSet::new(),
            actions: DashMap::new(),
            quantity_regex: Regex::new(r"\d+(?:[.,]\d+)?").expect("quantity pattern"),
            time_regex: Regex::new(r"\b\d{1,2}:\d{2}\b|\b\d{1,2}\s?h(?:\d{2})?\b")
                .expect("time pattern"),
        }
    }

    /// Record an executed action into the user's audit trail (cap 10).
    /// This log backs `repeat_action` resolution; it is not message
    /// history.
    pub async fn record_action(
        &self,
        user_id: &str,
        action: &str,
        parameters: serde_json::Value,
        description: &str,
    ) -> Result<(), EngineError> {
        if action.trim().is_empty() {
            return Err(EngineError::validation(
                "action name is required",
                "pass the command or operation that was executed",
            ));
        }

        let log = self
            .actions
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(ActionHistory::new(ACTION_HISTORY_CAP))))
            .value()
            .clone();
        log.lock().await.push(RecordedAction {
            action: action.to_string(),
            parameters,
            description: description.to_string(),
            timestamp: chrono::Utc::now(),
        });
        Ok(())
    }

    /// The most recently recorded action, if any.
    pub async fn last_action(&self, user_id: &str) -> Option<RecordedAction> {
        let log = self.actions.get(user_id)?.value().clone();
        let guard = log.lock().await;
        guard.last().cloned()
    }

    /// All recorded actions for export, oldest first.
    pub async fn export_actions(&self, user_id: &str) -> Vec<RecordedAction> {
        let Some(log) = self.actions.get(user_id).map(|e| e.value().clone()) else {
            return Vec::new();
        };
        let guard = log.lock().await;
        guard.iter().cloned().collect()
    }

    /// Forget a user's action trail. Used by the privacy gate.
    pub fn remove_user(&self, user_id: &str) {
        self.actions.remove(user_id);
    }

    /// Detect and resolve every reference in the message.
    #[tracing::instrument(
        name = "process_references",
        skip(self, user_id, message, history),
        fields(user = %mnemo_types::redact::user_id(user_id))
    )]
    pub async fn process<H: HistorySource>(
        &self,
        user_id: &str,
        message: &str,
        history: &H,
    ) -> ReferenceReport {
        let detected = self.patterns.detect(message);
        if detected.is_empty() {
            return ReferenceReport::empty();
        }

        let mut resolutions = Vec::with_capacity(detected.len());
        for reference in detected {
            let resolution = self.resolve(user_id, message, &reference, history).await;
            resolutions.push(ReferenceResolution {
                reference,
                resolution,
            });
        }

        let suggestions = contextual_suggestions(&resolutions);

        ReferenceReport {
            has_references: true,
            resolutions,
            suggestions,
        }
    }

    async fn resolve<H: HistorySource>(
        &self,
        user_id: &str,
        message: &str,
        reference: &DetectedReference,
        history: &H,
    ) -> ResolutionOutcome {
        match reference.ref_type.as_str() {
            "previous_statement" => {
                let recent = history
                    .recent_messages(user_id, PREVIOUS_STATEMENT_WINDOW + 1)
                    .await;
                resolve_previous_statement(&recent, message)
            }
            "repeat_action" => match self.last_action(user_id).await {
                Some(action) => ResolutionOutcome::Found {
                    content: action.description.clone(),
                    timestamp: action.timestamp,
                    context: Some(action.action),
                },
                None => ResolutionOutcome::NotFound {
                    explanation: "I don't have a recent action to repeat.".to_string(),
                },
            },
            "location_reference" | "person_reference" => {
                let entity = if reference.ref_type == "location_reference" {
                    "location"
                } else {
                    "person"
                };
                resolve_entity(&history.full_history(user_id).await, message, entity)
            }
            "quantity_reference" => resolve_by_regex(
                &history.full_history(user_id).await,
                message,
                &self.quantity_regex,
                "I couldn't find an earlier amount to reuse.",
            ),
            "time_reference" => resolve_by_regex(
                &history.full_history(user_id).await,
                message,
                &self.time_regex,
                "I couldn't find an earlier time to reuse.",
            ),
            _ => resolve_generic(
                &history.full_history(user_id).await,
                message,
                &reference.matched_text,
            ),
        }
    }
}

impl Default for ReferenceResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Most recent sufficiently-long statement that isn't the triggering
/// message itself.
fn resolve_previous_statement(recent: &[HistoryItem], message: &str) -> ResolutionOutcome {
    recent
        .iter()
        .rev()
        .filter(|item| item.content != message)
        .find(|item| item.content.chars().count() > MIN_STATEMENT_LEN)
        .map(|item| ResolutionOutcome::Found {
            content: item.content.clone(),
            timestamp: item.timestamp,
            context: None,
        })
        .unwrap_or(ResolutionOutcome::NotFound {
            explanation: "I couldn't find what you said earlier.".to_string(),
        })
}

/// Most recent history entry mentioning any synonym of the entity.
fn resolve_entity(history: &[HistoryItem], message: &str, entity: &str) -> ResolutionOutcome {
    let synonyms = ENTITY_SYNONYMS
        .iter()
        .find(|(name, _)| *name == entity)
        .map(|(_, words)| *words)
        .unwrap_or(&[]);

    history
        .iter()
        .rev()
        .filter(|item| item.content != message)
        .find(|item| {
            let lowered = item.content.to_lowercase();
            synonyms.iter().any(|s| lowered.contains(s))
        })
        .map(|item| ResolutionOutcome::Found {
            content: item.content.clone(),
            timestamp: item.timestamp,
            context: Some(entity.to_string()),
        })
        .unwrap_or(ResolutionOutcome::NotFound {
            explanation: format!("I couldn't find an earlier {entity} mention."),
        })
}

/// Most recent history entry containing a regex match (numbers, times).
fn resolve_by_regex(
    history: &[HistoryItem],
    message: &str,
    regex: &Regex,
    missing: &str,
) -> ResolutionOutcome {
    history
        .iter()
        .rev()
        .filter(|item| item.content != message)
        .find_map(|item| {
            regex.find(&item.content).map(|found| ResolutionOutcome::Found {
                content: item.content.clone(),
                timestamp: item.timestamp,
                context: Some(found.as_str().to_string()),
            })
        })
        .unwrap_or(ResolutionOutcome::NotFound {
            explanation: missing.to_string(),
        })
}

/// Token-overlap fallback between the matched phrase and history.
fn resolve_generic(
    history: &[HistoryItem],
    message: &str,
    matched_text: &str,
) -> ResolutionOutcome {
    let phrase_tokens: Vec<String> = tokenize(matched_text)
        .into_iter()
        .filter(|t| !STOPWORDS.contains(&t.as_str()))
        .collect();
    if phrase_tokens.is_empty() {
        return ResolutionOutcome::NotFound {
            explanation: "I couldn't tie that back to anything specific.".to_string(),
        };
    }

    history
        .iter()
        .rev()
        .filter(|item| item.content != message)
        .find(|item| {
            let content_tokens = tokenize(&item.content);
            phrase_tokens.iter().any(|t| content_tokens.contains(t))
        })
        .map(|item| ResolutionOutcome::Found {
            content: item.content.clone(),
            timestamp: item.timestamp,
            context: None,
        })
        .unwrap_or(ResolutionOutcome::NotFound {
            explanation: "I couldn't tie that back to anything specific.".to_string(),
        })
}

/// Canned follow-ups per resolved reference type, capped at three.
fn contextual_suggestions(resolutions: &[ReferenceResolution]) -> Vec<String> {
    let mut suggestions = Vec::new();
    for resolution in resolutions {
        let text = match resolution.reference.ref_type.as_str() {
            "repeat_action" => "Want me to run it again?",
            "previous_statement" => "Want a recap of what you said earlier?",
            "location_reference" => "Want the details of that place again?",
            "person_reference" => "Should I bring up that contact?",
            "quantity_reference" => "Use the same amount as before?",
            "time_reference" => "Schedule it for the same time?",
            _ => continue,
        };
        if !suggestions.iter().any(|s| s == text) {
            suggestions.push(text.to_string());
        }
        if suggestions.len() == MAX_SUGGESTIONS {
            break;
        }
    }
    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    /// Fixed history for resolver tests.
    struct FakeHistory {
        items: Vec<HistoryItem>,
    }

    impl FakeHistory {
        fn new(contents: &[&str]) -> Self {
            let base = Utc::now() - Duration::hours(1);
            Self {
                items: contents
                    .iter()
                    .enumerate()
                    .map(|(i, content)| HistoryItem {
                        content: content.to_string(),
                        timestamp: base + Duration::minutes(i as i64),
                    })
                    .collect(),
            }
        }
    }

    impl HistorySource for FakeHistory {
        async fn recent_messages(&self, _user_id: &str, limit: usize) -> Vec<HistoryItem> {
            let skip = self.items.len().saturating_sub(limit);
            self.items[skip..].to_vec()
        }

        async fn full_history(&self, _user_id: &str) -> Vec<HistoryItem> {
            self.items.clone()
        }
    }

    const USER: &str = "5511977776666";

    #[tokio::test]
    async fn test_no_references_is_empty_report() {
        let resolver = ReferenceResolver::new();
        let history = FakeHistory::new(&["hello there"]);
        let report = resolver.process(USER, "what's for lunch?", &history).await;
        assert!(!report.has_references);
        assert!(report.resolutions.is_empty());
    }

    #[tokio::test]
    async fn test_repeat_action_resolves_exact_last_action() {
        let resolver = ReferenceResolver::new();
        resolver
            .record_action(USER, "schedule", serde_json::json!({"when": "09:00"}), "agendou lembrete de treino")
            .await
            .unwrap();
        resolver
            .record_action(USER, "meal_plan", serde_json::json!({"kcal": 1800}), "montou plano alimentar de 1800 kcal")
            .await
            .unwrap();

        let history = FakeHistory::new(&["monta um plano alimentar"]);
        for message in ["faça de novo", "do it again"] {
            let report = resolver.process(USER, message, &history).await;
            assert!(report.has_references);
            let action = report
                .resolutions
                .iter()
                .find(|r| r.reference.ref_type == "repeat_action")
                .expect("repeat_action resolution");
            match &action.resolution {
                ResolutionOutcome::Found { content, context, .. } => {
                    assert_eq!(content, "montou plano alimentar de 1800 kcal");
                    assert_eq!(context.as_deref(), Some("meal_plan"));
                }
                other => panic!("expected Found, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_repeat_action_without_history_is_not_found() {
        let resolver = ReferenceResolver::new();
        let history = FakeHistory::new(&[]);
        let report = resolver.process(USER, "do it again", &history).await;
        let action = &report.resolutions[0];
        assert!(!action.resolution.is_found());
    }

    #[tokio::test]
    async fn test_action_log_caps_at_ten() {
        let resolver = ReferenceResolver::new();
        for i in 0..15 {
            resolver
                .record_action(USER, "cmd", serde_json::Value::Null, &format!("action {i}"))
                .await
                .unwrap();
        }
        let actions = resolver.export_actions(USER).await;
        assert_eq!(actions.len(), 10);
        assert_eq!(actions.last().unwrap().description, "action 14");
        assert_eq!(actions.first().unwrap().description, "action 5");
    }

    #[tokio::test]
    async fn test_empty_action_name_rejected() {
        let resolver = ReferenceResolver::new();
        let err = resolver
            .record_action(USER, "  ", serde_json::Value::Null, "whatever")
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_previous_statement_skips_short_messages() {
        let resolver = ReferenceResolver::new();
        let history = FakeHistory::new(&[
            "I want to plan all my meals for the whole week",
            "ok",
            "yes",
        ]);
        let report = resolver
            .process(USER, "like I said before", &history)
            .await;
        let statement = &report.resolutions[0];
        match &statement.resolution {
            ResolutionOutcome::Found { content, .. } => {
                assert!(content.contains("plan all my meals"));
            }
            other => panic!("expected Found, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_previous_statement_excludes_triggering_message() {
        let resolver = ReferenceResolver::new();
        let history = FakeHistory::new(&["like I said before about the payment"]);
        let report = resolver
            .process(USER, "like I said before about the payment", &history)
            .await;
        assert!(!report.resolutions[0].resolution.is_found());
    }

    #[tokio::test]
    async fn test_location_reference_resolves_most_recent_mention() {
        let resolver = ReferenceResolver::new();
        let history = FakeHistory::new(&[
            "let's try the sushi restaurant near work",
            "actually the pizza place downtown is better",
            "schedule my workout",
        ]);
        let report = resolver
            .process(USER, "book that restaurant for friday", &history)
            .await;
        let location = report
            .resolutions
            .iter()
            .find(|r| r.reference.ref_type == "location_reference")
            .unwrap();
        match &location.resolution {
            ResolutionOutcome::Found { content, context, .. } => {
                assert!(content.contains("pizza place downtown"));
                assert_eq!(context.as_deref(), Some("location"));
            }
            other => panic!("expected Found, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_quantity_reference_finds_most_recent_number() {
        let resolver = ReferenceResolver::new();
        let history = FakeHistory::new(&[
            "transfer 200 to savings",
            "no wait, make it 350,50",
            "thanks",
        ]);
        let report = resolver
            .process(USER, "send the same amount tomorrow", &history)
            .await;
        let quantity = &report.resolutions[0];
        match &quantity.resolution {
            ResolutionOutcome::Found { context, .. } => {
                assert_eq!(context.as_deref(), Some("350,50"));
            }
            other => panic!("expected Found, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_time_reference_finds_earlier_time() {
        let resolver = ReferenceResolver::new();
        let history = FakeHistory::new(&["me lembra do treino às 07:30 amanhã"]);
        let report = resolver
            .process(USER, "marca no mesmo horário na sexta", &history)
            .await;
        let time = &report.resolutions[0];
        match &time.resolution {
            ResolutionOutcome::Found { context, .. } => {
                assert_eq!(context.as_deref(), Some("07:30"));
            }
            other => panic!("expected Found, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_not_found_is_normal_outcome() {
        let resolver = ReferenceResolver::new();
        let history = FakeHistory::new(&["just chatting about the weather"]);
        let report = resolver
            .process(USER, "send the same amount again", &history)
            .await;
        assert!(report.has_references);
        let quantity = report
            .resolutions
            .iter()
            .find(|r| r.reference.ref_type == "quantity_reference")
            .unwrap();
        match &quantity.resolution {
            ResolutionOutcome::NotFound { explanation } => {
                assert!(!explanation.is_empty());
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_suggestions_capped_and_typed() {
        let resolver = ReferenceResolver::new();
        resolver
            .record_action(USER, "cmd", serde_json::Value::Null, "did a thing")
            .await
            .unwrap();
        let history = FakeHistory::new(&["dinner at the pizza place at 19:00 cost 80"]);
        let report = resolver
            .process(
                USER,
                "do it again at that place, same time, the same amount",
                &history,
            )
            .await;
        assert!(report.suggestions.len() <= 3);
        assert!(report.suggestions.contains(&"Want me to run it again?".to_string()));
    }

    #[tokio::test]
    async fn test_remove_user_forgets_actions() {
        let resolver = ReferenceResolver::new();
        resolver
            .record_action(USER, "cmd", serde_json::Value::Null, "secret")
            .await
            .unwrap();
        resolver.remove_user(USER);
        assert!(resolver.last_action(USER).await.is_none());
        assert!(resolver.export_actions(USER).await.is_empty());
    }
}

//! Heuristic conversation summarizer.
//!
//! Condenses the short-term window into a `ConversationSummary`: the
//! distinct topics seen, marker-word key points, stated preferences,
//! verb-keyword action items, a sentiment tally, and a human-readable
//! digest. Entirely deterministic -- no model calls.

use mnemo_types::config::EngineConfig;
use mnemo_types::context::UserContext;
use mnemo_types::summary::{
    ActionItem, ActionStatus, ConversationSummary, KeyPoint, KeyPointKind, SummaryPreferences,
};

use crate::classify::{Classifier, SentimentLexicon};

/// Marker words that flag a sentence as a key point.
const IMPORTANCE_MARKERS: &[&str] = &[
    "important", "essential", "must", "critical", "importante", "essencial", "preciso",
    "necessário", "fundamental",
];
const PROBLEM_MARKERS: &[&str] = &[
    "problem", "issue", "error", "broken", "can't", "cannot", "problema", "erro",
    "não consigo", "dificuldade", "quebrado",
];
const SOLUTION_MARKERS: &[&str] = &[
    "solved", "fixed", "works now", "figured out", "resolvi", "resolvido", "funcionou",
    "consegui",
];
const PREFERENCE_MARKERS: &[&str] = &[
    "prefer", "favorite", "i like", "i love", "prefiro", "favorito", "gosto de", "adoro",
];

/// Verb families that turn a sentence into an action item.
const ACTION_VERBS: &[(&str, &[&str])] = &[
    ("create", &["create", "add", "criar", "adicionar", "cadastrar"]),
    ("schedule", &["schedule", "book", "agendar", "marcar", "agende", "marque"]),
    ("remember", &["remember", "remind", "save this", "lembrar", "lembre", "anote", "anotar"]),
    ("configure", &["configure", "set up", "configurar", "configure", "ajustar"]),
];

/// Communication-medium keywords for preference extraction.
const MEDIUM_KEYWORDS: &[(&str, &[&str])] = &[
    ("audio", &["audio", "áudio", "voice", "voz"]),
    ("text", &["text", "texto", "mensagem escrita"]),
    ("image", &["image", "imagem", "photo", "foto"]),
];

/// Privacy-posture keywords for preference extraction.
const PRIVATE_KEYWORDS: &[&str] = &["private", "privado", "secreto", "sigiloso", "só meu"];
const SHAREABLE_KEYWORDS: &[&str] = &["share", "shareable", "compartilhar", "público", "publico"];

/// Stateless summary builder.
///
/// Produces `None` when the window is below the configured minimum, so
/// forcing a second summarization right after one ran is a no-op.
pub struct ConversationSummarizer;

impl ConversationSummarizer {
    /// Build a summary of the context's current short-term window.
    pub fn build<C: Classifier>(
        ctx: &UserContext,
        classifier: &C,
        config: &EngineConfig,
    ) -> Option<ConversationSummary> {
        if ctx.short_term.len() < config.min_summary_messages {
            return None;
        }

        let first = ctx.short_term.front()?;
        let last = ctx.short_term.back()?;

        let mut topics: Vec<String> = Vec::new();
        for msg in &ctx.short_term {
            let label = classifier.classify(&msg.content).label;
            if !topics.contains(&label) {
                topics.push(label);
            }
        }

        let mut key_points = Vec::new();
        let mut action_items = Vec::new();
        for msg in &ctx.short_term {
            for sentence in split_sentences(&msg.content) {
                let lower = sentence.to_lowercase();
                if let Some(kind) = key_point_kind(&lower) {
                    key_points.push(KeyPoint {
                        kind,
                        content: sentence.to_string(),
                        timestamp: msg.timestamp,
                    });
                }
                if let Some(verb) = action_verb(&lower) {
                    action_items.push(ActionItem {
                        kind: verb.to_string(),
                        content: sentence.to_string(),
                        status: ActionStatus::Open,
                    });
                }
            }
        }

        let user_preferences = extract_preferences(ctx, &topics);

        let sentiment =
            SentimentLexicon::new().tally(ctx.short_term.iter().map(|m| m.content.as_str()));

        let summary_text = format!(
            "{} messages covering {}; {} key point(s), {} open action item(s); overall sentiment {}.",
            ctx.short_term.len(),
            topics.join(", "),
            key_points.len(),
            action_items.len(),
            sentiment.overall,
        );

        Some(ConversationSummary {
            conversation_id: ctx.conversation_id.clone(),
            start_time: first.timestamp,
            end_time: last.timestamp,
            message_count: ctx.short_term.len(),
            topics,
            key_points,
            user_preferences,
            action_items,
            sentiment,
            summary: summary_text,
        })
    }
}

fn split_sentences(text: &str) -> impl Iterator<Item = &str> {
    text.split(['.', '!', '?', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn key_point_kind(sentence: &str) -> Option<KeyPointKind> {
    if IMPORTANCE_MARKERS.iter().any(|m| sentence.contains(m)) {
        Some(KeyPointKind::Importance)
    } else if PROBLEM_MARKERS.iter().any(|m| sentence.contains(m)) {
        Some(KeyPointKind::Problem)
    } else if SOLUTION_MARKERS.iter().any(|m| sentence.contains(m)) {
        Some(KeyPointKind::Solution)
    } else if PREFERENCE_MARKERS.iter().any(|m| sentence.contains(m)) {
        Some(KeyPointKind::Preference)
    } else {
        None
    }
}

fn action_verb(sentence: &str) -> Option<&'static str> {
    ACTION_VERBS
        .iter()
        .find(|(_, verbs)| verbs.iter().any(|v| sentence.contains(v)))
        .map(|(kind, _)| *kind)
}

fn extract_preferences(ctx: &UserContext, topics: &[String]) -> SummaryPreferences {
    let window_text: String = ctx
        .short_term
        .iter()
        .map(|m| m.content.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");

    let communication = MEDIUM_KEYWORDS
        .iter()
        .find(|(_, words)| words.iter().any(|w| window_text.contains(w)))
        .map(|(medium, _)| medium.to_string());

    let privacy = if PRIVATE_KEYWORDS.iter().any(|w| window_text.contains(w)) {
        Some("private".to_string())
    } else if SHAREABLE_KEYWORDS.iter().any(|w| window_text.contains(w)) {
        Some("shareable".to_string())
    } else {
        None
    };

    SummaryPreferences {
        communication,
        topics: topics
            .iter()
            .filter(|t| t.as_str() != "general")
            .cloned()
            .collect(),
        privacy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::KeywordTopicClassifier;
    use mnemo_types::message::{Message, MessageKind};
    use mnemo_types::summary::SentimentLabel;

    fn ctx_with(messages: &[&str]) -> UserContext {
        let mut ctx = UserContext::new();
        for content in messages {
            ctx.short_term.push_back(Message::new(
                MessageKind::Text,
                *content,
                serde_json::Value::Null,
            ));
        }
        ctx
    }

    fn build(ctx: &UserContext) -> Option<ConversationSummary> {
        ConversationSummarizer::build(ctx, &KeywordTopicClassifier::new(), &EngineConfig::default())
    }

    #[test]
    fn test_below_minimum_yields_none() {
        let ctx = ctx_with(&["one", "two", "three", "four"]);
        assert!(build(&ctx).is_none());
    }

    #[test]
    fn test_summary_covers_window() {
        let ctx = ctx_with(&[
            "I want a meal plan",
            "protein for lunch",
            "thanks, great idea",
            "schedule my gym session",
            "this is important: no sugar",
        ]);
        let summary = build(&ctx).unwrap();
        assert_eq!(summary.message_count, 5);
        assert!(summary.topics.contains(&"nutrition".to_string()));
        assert!(summary.topics.contains(&"exercise".to_string()));
        assert_eq!(summary.conversation_id, ctx.conversation_id);
    }

    #[test]
    fn test_key_point_classification() {
        let ctx = ctx_with(&[
            "this is important for me",
            "I have a problem with the app",
            "ok, solved it",
            "I prefer morning workouts",
            "nothing special here",
        ]);
        let summary = build(&ctx).unwrap();
        let kinds: Vec<KeyPointKind> = summary.key_points.iter().map(|k| k.kind).collect();
        assert!(kinds.contains(&KeyPointKind::Importance));
        assert!(kinds.contains(&KeyPointKind::Problem));
        assert!(kinds.contains(&KeyPointKind::Solution));
        assert!(kinds.contains(&KeyPointKind::Preference));
    }

    #[test]
    fn test_action_items_extracted() {
        let ctx = ctx_with(&[
            "schedule a meeting for tomorrow",
            "remember to buy milk",
            "hello",
            "hello again",
            "one more",
        ]);
        let summary = build(&ctx).unwrap();
        let kinds: Vec<&str> = summary.action_items.iter().map(|a| a.kind.as_str()).collect();
        assert!(kinds.contains(&"schedule"));
        assert!(kinds.contains(&"remember"));
        assert!(summary
            .action_items
            .iter()
            .all(|a| a.status == ActionStatus::Open));
    }

    #[test]
    fn test_preference_extraction() {
        let ctx = ctx_with(&[
            "prefiro receber áudio",
            "keep this private please",
            "meal ideas",
            "more meals",
            "and another meal",
        ]);
        let summary = build(&ctx).unwrap();
        assert_eq!(summary.user_preferences.communication.as_deref(), Some("audio"));
        assert_eq!(summary.user_preferences.privacy.as_deref(), Some("private"));
        assert!(summary
            .user_preferences
            .topics
            .contains(&"nutrition".to_string()));
    }

    #[test]
    fn test_sentiment_majority() {
        let ctx = ctx_with(&[
            "this is great",
            "love it, thanks",
            "perfect, awesome",
            "meh",
            "ok",
        ]);
        let summary = build(&ctx).unwrap();
        assert_eq!(summary.sentiment.overall, SentimentLabel::Positive);
        assert_eq!(summary.sentiment.positive, 3);
    }
}

//! The three incremental learning passes.
//!
//! Each pass nudges its own slice of the profile and nothing else:
//! preferences (register, topics, hours, commands), behavior (usage,
//! latency, outcome patterns), and context (topic history, session
//! shape, cadence). All passes are pure in-memory mutation; persistence
//! happens once at the end of the cycle.

use chrono::{DateTime, Timelike, Utc};

use mnemo_types::profile::{CommunicationStyle, EvolutionaryProfile, clamp01};

use crate::classify::topic::GENERAL_TOPIC;
use crate::classify::{Classifier, FormalityLexicon, KeywordTopicClassifier};

use super::InteractionEvent;

/// Fixed step the formality level moves per cycle.
const FORMALITY_STEP: f64 = 0.1;
/// Gap between consecutive interactions that still counts as the same
/// streak, in minutes.
const FREQUENCY_WINDOW_MINUTES: i64 = 60;

/// Preference pass: register, topic interests, hour and command
/// histograms.
pub fn learn_preferences(
    profile: &mut EvolutionaryProfile,
    event: &InteractionEvent,
    now: DateTime<Utc>,
) {
    let prefs = &mut profile.learned_preferences;

    if let Some(text) = &event.text {
        let signal = FormalityLexicon::new().measure(text);
        if signal.leans_formal() {
            prefs.formality_level = clamp01(prefs.formality_level + FORMALITY_STEP);
            prefs.communication_style = CommunicationStyle::Formal;
        } else if signal.leans_casual() {
            prefs.formality_level = clamp01(prefs.formality_level - FORMALITY_STEP);
            prefs.communication_style = CommunicationStyle::Casual;
        }

        if let Some(topic) = interesting_topic(text) {
            prefs.topic_interests.insert(topic);
        }
    }
    if let Some(topic) = &event.topic {
        if topic != GENERAL_TOPIC {
            prefs.topic_interests.insert(topic.clone());
        }
    }

    *prefs.time_preferences.entry(now.hour()).or_insert(0) += 1;
    if let Some(command) = &event.command {
        *prefs
            .interaction_patterns
            .entry(command.clone())
            .or_insert(0) += 1;
    }
}

/// Behavior pass: command usage, two-point latency average, outcome
/// pattern logs, adaptation level.
pub fn learn_behavior(profile: &mut EvolutionaryProfile, event: &InteractionEvent) {
    let behavior = &mut profile.learned_behavior;

    if let Some(command) = &event.command {
        *behavior.command_usage.entry(command.clone()).or_insert(0) += 1;
    }

    if let Some(response_ms) = event.response_ms {
        behavior.response_time_ms = if behavior.response_time_ms == 0.0 {
            response_ms as f64
        } else {
            (behavior.response_time_ms + response_ms as f64) / 2.0
        };
    }

    let pattern = event
        .command
        .clone()
        .unwrap_or_else(|| event.kind.clone());
    if event.success {
        behavior.success_patterns.push(pattern);
    } else {
        behavior.error_patterns.push(pattern);
    }

    behavior.adaptation_level = if profile.total_interactions == 0 {
        0.0
    } else {
        clamp01(profile.successful_interactions as f64 / profile.total_interactions as f64)
    };
}

/// Context pass: topic history, session-length average, interaction
/// cadence, switch counter.
pub fn learn_context(
    profile: &mut EvolutionaryProfile,
    event: &InteractionEvent,
    now: DateTime<Utc>,
) {
    let context = &mut profile.learned_context;

    let topic = event
        .topic
        .clone()
        .or_else(|| event.text.as_deref().map(classified_topic));
    if let Some(topic) = topic {
        if topic != GENERAL_TOPIC {
            context.conversation_topics.insert(topic.clone());
            context.recent_topics.push(topic);
        }
    }

    if let Some(minutes) = event.session_minutes {
        let n = context.session_samples as f64;
        context.avg_session_minutes = (context.avg_session_minutes * n + minutes) / (n + 1.0);
        context.session_samples += 1;
    }

    let within_streak = context
        .last_interaction_at
        .is_some_and(|last| (now - last).num_minutes() <= FREQUENCY_WINDOW_MINUTES);
    if within_streak {
        context.interaction_frequency += 1;
    } else {
        context.interaction_frequency = context.interaction_frequency.saturating_sub(1);
    }
    context.last_interaction_at = Some(now);

    if event.topic_switched {
        context.context_switches += 1;
    }
}

/// Topic label for interest tracking; `None` when nothing specific
/// matched.
fn interesting_topic(text: &str) -> Option<String> {
    let label = classified_topic(text);
    if label == GENERAL_TOPIC || label == "commands" {
        None
    } else {
        Some(label)
    }
}

fn classified_topic(text: &str) -> String {
    KeywordTopicClassifier::new().classify(text).label
}

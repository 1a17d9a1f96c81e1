//! Frequency-heuristic predictions and suggestion ranking.
//!
//! Predictions pick modes out of the usage histograms; nothing here is
//! a trained model and the confidence is an additive heuristic, capped
//! at 1.0.

use chrono::{DateTime, Utc};

use mnemo_types::profile::{EvolutionStage, EvolutionaryProfile, Prediction, Priority, Suggestion};

use std::collections::BTreeMap;

/// Confidence contribution of a derived next-command.
const COMMAND_CONFIDENCE: f64 = 0.3;
/// Confidence contribution of a derived next-topic.
const TOPIC_CONFIDENCE: f64 = 0.3;
/// Confidence contribution of a derived next-hour.
const HOUR_CONFIDENCE: f64 = 0.2;
/// Suggestions returned to the rendering layer.
const MAX_SUGGESTIONS: usize = 3;

/// Derive a prediction from the profile's histograms.
pub fn generate(profile: &EvolutionaryProfile, now: DateTime<Utc>) -> Prediction {
    let next_command = mode_of(&profile.learned_behavior.command_usage);

    let mut topic_counts: BTreeMap<&str, u64> = BTreeMap::new();
    for topic in profile.learned_context.recent_topics.iter() {
        *topic_counts.entry(topic.as_str()).or_insert(0) += 1;
    }
    let next_topic = topic_counts
        .iter()
        .max_by_key(|(_, &count)| count)
        .map(|(topic, _)| topic.to_string());

    let next_hour = profile
        .learned_preferences
        .time_preferences
        .iter()
        .max_by_key(|(_, &count)| count)
        .map(|(&hour, _)| hour);

    let mut confidence = 0.0;
    if next_command.is_some() {
        confidence += COMMAND_CONFIDENCE;
    }
    if next_topic.is_some() {
        confidence += TOPIC_CONFIDENCE;
    }
    if next_hour.is_some() {
        confidence += HOUR_CONFIDENCE;
    }

    Prediction {
        next_command,
        next_topic,
        next_hour,
        confidence: confidence.min(1.0),
        generated_at: now,
    }
}

/// Rank the fixed candidate list by (priority, confidence) and keep the
/// top three.
pub fn suggestions(profile: &EvolutionaryProfile) -> Vec<Suggestion> {
    let mut candidates: Vec<Suggestion> = Vec::new();

    if let Some(topic) = profile.learned_preferences.topic_interests.iter().next() {
        candidates.push(Suggestion {
            kind: "topic".to_string(),
            text: format!("Want fresh {topic} ideas?"),
            priority: Priority::High,
            confidence: 0.8,
        });
    }

    if let Some(command) = mode_of(&profile.learned_behavior.command_usage) {
        candidates.push(Suggestion {
            kind: "usage".to_string(),
            text: format!("Run {command} again?"),
            priority: Priority::Medium,
            confidence: 0.7,
        });
    }

    if let Some((&hour, _)) = profile
        .learned_preferences
        .time_preferences
        .iter()
        .max_by_key(|(_, &count)| count)
    {
        candidates.push(Suggestion {
            kind: "time".to_string(),
            text: format!("Set up your usual check-in around {hour:02}:00?"),
            priority: Priority::Medium,
            confidence: 0.6,
        });
    }

    let stage_text = match profile.evolution_metrics.evolution_stage {
        EvolutionStage::Beginner => "New here? Ask for the menu to see what I can do.",
        EvolutionStage::Learning => "Tip: you can pin anything with 'remember this'.",
        EvolutionStage::Adapting => "Try combining reminders with your tracked topics.",
        EvolutionStage::Expert => "Power tip: chain commands to skip the menus.",
    };
    candidates.push(Suggestion {
        kind: "stage".to_string(),
        text: stage_text.to_string(),
        priority: Priority::Low,
        confidence: 0.5,
    });

    candidates.sort_by(|a, b| {
        a.priority
            .rank()
            .cmp(&b.priority.rank())
            .then(b.confidence.partial_cmp(&a.confidence).unwrap_or(std::cmp::Ordering::Equal))
    });
    candidates.truncate(MAX_SUGGESTIONS);
    candidates
}

/// Most-used key of a histogram; ties break toward the later key in
/// map order, keeping the choice deterministic.
fn mode_of(histogram: &BTreeMap<String, u64>) -> Option<String> {
    histogram
        .iter()
        .max_by_key(|(_, &count)| count)
        .map(|(key, _)| key.clone())
}

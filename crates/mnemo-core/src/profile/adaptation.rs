//! Adaptation rule tables.
//!
//! Three independent tables (tone, content, timing). Every rule is a
//! pure predicate over the just-updated profile snapshot plus the
//! current interaction; all matching rules fire every cycle -- they are
//! not mutually exclusive. Firing produces an `Adaptation` record.

use chrono::{DateTime, Utc};

use mnemo_types::profile::{Adaptation, AdaptationKind, EvolutionStage, EvolutionaryProfile};

use super::InteractionEvent;

/// A condition -> action mapping in one of the rule tables.
pub struct AdaptationRule {
    pub kind: AdaptationKind,
    pub name: &'static str,
    pub action: &'static str,
    pub weight: f64,
    pub description: &'static str,
    pub condition: fn(&EvolutionaryProfile, &InteractionEvent) -> bool,
}

/// Command usage that counts as "frequent".
const FREQUENT_COMMAND_USES: u64 = 5;
/// Hour-bucket count that counts as an established habit.
const HABITUAL_HOUR_USES: u64 = 5;
/// Session length that triggers the concise-replies rule, in minutes.
const LONG_SESSION_MINUTES: f64 = 30.0;
/// Interaction streak that counts as rapid-fire.
const RAPID_STREAK: u64 = 5;

static RULES: &[AdaptationRule] = &[
    // --- tone ---
    AdaptationRule {
        kind: AdaptationKind::Tone,
        name: "formal_register",
        action: "use_formal_tone",
        weight: 0.8,
        description: "user writes formally, mirror the register",
        condition: |p, _| p.learned_preferences.formality_level > 0.7,
    },
    AdaptationRule {
        kind: AdaptationKind::Tone,
        name: "casual_register",
        action: "use_casual_tone",
        weight: 0.8,
        description: "user writes casually, mirror the register",
        condition: |p, _| p.learned_preferences.formality_level < 0.3,
    },
    AdaptationRule {
        kind: AdaptationKind::Tone,
        name: "supportive_after_errors",
        action: "acknowledge_difficulty",
        weight: 0.6,
        description: "recent failures, soften the tone and offer help",
        condition: |p, e| !e.success || p.learned_behavior.error_patterns.len() >= 3,
    },
    // --- content ---
    AdaptationRule {
        kind: AdaptationKind::Content,
        name: "nutrition_priority",
        action: "lead_with_nutrition",
        weight: 0.7,
        description: "nutrition is a tracked interest, surface it first",
        condition: |p, _| p.learned_preferences.topic_interests.contains("nutrition"),
    },
    AdaptationRule {
        kind: AdaptationKind::Content,
        name: "exercise_priority",
        action: "lead_with_exercise",
        weight: 0.7,
        description: "exercise is a tracked interest, surface it first",
        condition: |p, _| p.learned_preferences.topic_interests.contains("exercise"),
    },
    AdaptationRule {
        kind: AdaptationKind::Content,
        name: "command_shortcuts",
        action: "offer_shortcuts",
        weight: 0.5,
        description: "a command is used often, offer a shortcut",
        condition: |p, _| {
            p.learned_behavior
                .command_usage
                .values()
                .any(|&n| n >= FREQUENT_COMMAND_USES)
        },
    },
    AdaptationRule {
        kind: AdaptationKind::Content,
        name: "expert_depth",
        action: "skip_basic_explanations",
        weight: 0.6,
        description: "expert-stage user, drop beginner framing",
        condition: |p, _| p.evolution_metrics.evolution_stage == EvolutionStage::Expert,
    },
    // --- timing ---
    AdaptationRule {
        kind: AdaptationKind::Timing,
        name: "habitual_hour",
        action: "schedule_at_usual_hour",
        weight: 0.6,
        description: "an hour bucket dominates, time proactive messages to it",
        condition: |p, _| {
            p.learned_preferences
                .time_preferences
                .values()
                .any(|&n| n >= HABITUAL_HOUR_USES)
        },
    },
    AdaptationRule {
        kind: AdaptationKind::Timing,
        name: "rapid_cadence",
        action: "batch_responses",
        weight: 0.5,
        description: "rapid-fire interaction streak, batch replies",
        condition: |p, _| p.learned_context.interaction_frequency >= RAPID_STREAK,
    },
    AdaptationRule {
        kind: AdaptationKind::Timing,
        name: "long_session_brevity",
        action: "keep_replies_concise",
        weight: 0.5,
        description: "sessions run long, keep replies short",
        condition: |p, _| p.learned_context.avg_session_minutes > LONG_SESSION_MINUTES,
    },
];

/// The full rule set, in table order (tone, content, timing).
pub fn rules() -> &'static [AdaptationRule] {
    RULES
}

/// Evaluate every rule against the profile; all matches fire.
pub fn evaluate(
    profile: &EvolutionaryProfile,
    event: &InteractionEvent,
    now: DateTime<Utc>,
) -> Vec<Adaptation> {
    RULES
        .iter()
        .filter(|rule| (rule.condition)(profile, event))
        .map(|rule| Adaptation {
            kind: rule.kind,
            rule: rule.name.to_string(),
            action: rule.action.to_string(),
            weight: rule.weight,
            timestamp: now,
        })
        .collect()
}

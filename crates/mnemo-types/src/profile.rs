//! The evolving per-user behavioral profile.
//!
//! One `EvolutionaryProfile` per user, mutated exclusively by the
//! profile evolver. Every field that grows over time is a bounded
//! sliding window; every rate/score metric is clamped to [0,1] after
//! each update cycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use crate::bounded::BoundedLog;

/// Sliding-window capacity of the interaction history.
pub const INTERACTION_HISTORY_CAP: usize = 100;
/// Sliding-window capacity of the error-pattern log.
pub const ERROR_PATTERNS_CAP: usize = 20;
/// Sliding-window capacity of the success-pattern log.
pub const SUCCESS_PATTERNS_CAP: usize = 50;
/// Sliding-window capacity of the applied-adaptations log.
pub const APPLIED_ADAPTATIONS_CAP: usize = 50;
/// How many recent topics feed the next-topic prediction.
pub const RECENT_TOPICS_CAP: usize = 5;

/// Clamp a metric into [0,1].
pub fn clamp01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// One recorded interaction. Append-only, oldest-evicted at
/// [`INTERACTION_HISTORY_CAP`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub timestamp: DateTime<Utc>,
    /// Interaction kind as reported by the dispatch layer
    /// (e.g. "message", "command").
    pub kind: String,
    /// Opaque payload passed through by the caller.
    pub data: serde_json::Value,
    pub success: bool,
    /// Explicit user feedback when present; positive values mean
    /// satisfied.
    pub feedback: Option<f64>,
}

/// Dominant register observed in the user's writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommunicationStyle {
    Formal,
    Casual,
    Neutral,
}

impl Default for CommunicationStyle {
    fn default() -> Self {
        CommunicationStyle::Neutral
    }
}

impl fmt::Display for CommunicationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommunicationStyle::Formal => write!(f, "formal"),
            CommunicationStyle::Casual => write!(f, "casual"),
            CommunicationStyle::Neutral => write!(f, "neutral"),
        }
    }
}

/// What the user likes: register, topics, hours, commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearnedPreferences {
    pub communication_style: CommunicationStyle,
    /// 0 = fully casual, 1 = fully formal. Nudged by a fixed step per
    /// cycle, clamped.
    pub formality_level: f64,
    pub topic_interests: BTreeSet<String>,
    /// Hour of day (0-23) -> interaction count.
    pub time_preferences: BTreeMap<u32, u64>,
    /// Command -> usage count.
    pub interaction_patterns: BTreeMap<String, u64>,
}

impl Default for LearnedPreferences {
    fn default() -> Self {
        Self {
            communication_style: CommunicationStyle::Neutral,
            formality_level: 0.5,
            topic_interests: BTreeSet::new(),
            time_preferences: BTreeMap::new(),
            interaction_patterns: BTreeMap::new(),
        }
    }
}

/// How the user behaves: command usage, latency, outcome patterns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearnedBehavior {
    /// Command -> usage count.
    pub command_usage: BTreeMap<String, u64>,
    /// Two-point moving average of response time in milliseconds.
    pub response_time_ms: f64,
    pub error_patterns: BoundedLog<String>,
    pub success_patterns: BoundedLog<String>,
    /// successful / total interactions, clamped to [0,1].
    pub adaptation_level: f64,
}

impl Default for LearnedBehavior {
    fn default() -> Self {
        Self {
            command_usage: BTreeMap::new(),
            response_time_ms: 0.0,
            error_patterns: BoundedLog::new(ERROR_PATTERNS_CAP),
            success_patterns: BoundedLog::new(SUCCESS_PATTERNS_CAP),
            adaptation_level: 0.0,
        }
    }
}

/// Conversation-shape signals: topics, session length, cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearnedContext {
    /// Every distinct topic ever seen for this user.
    pub conversation_topics: BTreeSet<String>,
    /// Last topics in arrival order, feeding the next-topic prediction.
    pub recent_topics: BoundedLog<String>,
    /// Running average session length in minutes.
    pub avg_session_minutes: f64,
    /// Number of sessions folded into the average.
    pub session_samples: u64,
    /// Bumped when consecutive interactions land within an hour,
    /// decayed (floor 0) otherwise.
    pub interaction_frequency: u64,
    pub context_switches: u64,
    pub last_interaction_at: Option<DateTime<Utc>>,
}

impl Default for LearnedContext {
    fn default() -> Self {
        Self {
            conversation_topics: BTreeSet::new(),
            recent_topics: BoundedLog::new(RECENT_TOPICS_CAP),
            avg_session_minutes: 0.0,
            session_samples: 0,
            interaction_frequency: 0,
            context_switches: 0,
            last_interaction_at: None,
        }
    }
}

/// Coarse maturity of the profile, a step function of total
/// interactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvolutionStage {
    Beginner,
    Learning,
    Adapting,
    Expert,
}

impl EvolutionStage {
    /// Stage thresholds: <10 beginner, <50 learning, <100 adapting,
    /// else expert.
    pub fn from_interactions(total: u64) -> Self {
        match total {
            0..=9 => EvolutionStage::Beginner,
            10..=49 => EvolutionStage::Learning,
            50..=99 => EvolutionStage::Adapting,
            _ => EvolutionStage::Expert,
        }
    }
}

impl fmt::Display for EvolutionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvolutionStage::Beginner => write!(f, "beginner"),
            EvolutionStage::Learning => write!(f, "learning"),
            EvolutionStage::Adapting => write!(f, "adapting"),
            EvolutionStage::Expert => write!(f, "expert"),
        }
    }
}

impl FromStr for EvolutionStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "beginner" => Ok(EvolutionStage::Beginner),
            "learning" => Ok(EvolutionStage::Learning),
            "adapting" => Ok(EvolutionStage::Adapting),
            "expert" => Ok(EvolutionStage::Expert),
            other => Err(format!("invalid evolution stage: '{other}'")),
        }
    }
}

/// Derived metrics recomputed at the end of every learning cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionMetrics {
    /// successful / total interactions.
    pub learning_rate: f64,
    /// Adaptations applied in the trailing 7 days, normalized per day.
    pub adaptation_score: f64,
    /// Confidence of the last generated prediction, bounded at 0.9.
    /// A self-referential heuristic, not a ground-truth accuracy.
    pub prediction_accuracy: f64,
    /// Fraction of the last 10 feedback-bearing interactions with
    /// positive feedback.
    pub user_satisfaction: f64,
    pub evolution_stage: EvolutionStage,
}

impl Default for EvolutionMetrics {
    fn default() -> Self {
        Self {
            learning_rate: 0.0,
            adaptation_score: 0.0,
            prediction_accuracy: 0.0,
            user_satisfaction: 0.0,
            evolution_stage: EvolutionStage::Beginner,
        }
    }
}

/// Which rule table an adaptation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdaptationKind {
    Tone,
    Content,
    Timing,
}

impl fmt::Display for AdaptationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdaptationKind::Tone => write!(f, "tone"),
            AdaptationKind::Content => write!(f, "content"),
            AdaptationKind::Timing => write!(f, "timing"),
        }
    }
}

/// Record of a fired adaptation rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Adaptation {
    pub kind: AdaptationKind,
    pub rule: String,
    pub action: String,
    pub weight: f64,
    pub timestamp: DateTime<Utc>,
}

/// Frequency-heuristic prediction of the user's next move.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub next_command: Option<String>,
    pub next_topic: Option<String>,
    /// Hour of day (0-23) the user is most likely to show up.
    pub next_hour: Option<u32>,
    pub confidence: f64,
    pub generated_at: DateTime<Utc>,
}

/// The full per-user profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionaryProfile {
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub interaction_history: BoundedLog<InteractionRecord>,
    pub total_interactions: u64,
    pub successful_interactions: u64,
    pub failed_interactions: u64,
    pub learned_preferences: LearnedPreferences,
    pub learned_behavior: LearnedBehavior,
    pub learned_context: LearnedContext,
    pub evolution_metrics: EvolutionMetrics,
    pub applied_adaptations: BoundedLog<Adaptation>,
    pub predictions: Option<Prediction>,
}

impl EvolutionaryProfile {
    /// Fresh profile created on first interaction.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            last_updated: now,
            interaction_history: BoundedLog::new(INTERACTION_HISTORY_CAP),
            total_interactions: 0,
            successful_interactions: 0,
            failed_interactions: 0,
            learned_preferences: LearnedPreferences::default(),
            learned_behavior: LearnedBehavior::default(),
            learned_context: LearnedContext::default(),
            evolution_metrics: EvolutionMetrics::default(),
            applied_adaptations: BoundedLog::new(APPLIED_ADAPTATIONS_CAP),
            predictions: None,
        }
    }
}

impl Default for EvolutionaryProfile {
    fn default() -> Self {
        Self::new()
    }
}

/// Suggestion priority; `rank` orders high before medium before low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Smaller sorts first.
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }
}

/// A personalized suggestion for the rendering layer.
#[derive(Debug, Clone, Serialize)]
pub struct Suggestion {
    /// Candidate family (topic / usage / time / stage).
    pub kind: String,
    pub text: String,
    pub priority: Priority,
    pub confidence: f64,
}

/// Read-only projection of profile state for stats queries.
#[derive(Debug, Clone, Serialize)]
pub struct EvolutionaryStats {
    pub total_interactions: u64,
    pub successful_interactions: u64,
    pub failed_interactions: u64,
    pub evolution_stage: EvolutionStage,
    pub learning_rate: f64,
    pub adaptation_score: f64,
    pub prediction_accuracy: f64,
    pub user_satisfaction: f64,
    pub adaptations_applied: usize,
    pub topics_tracked: usize,
    pub last_updated: DateTime<Utc>,
}

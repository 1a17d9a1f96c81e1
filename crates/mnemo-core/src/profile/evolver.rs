//! The profile evolver service.
//!
//! One `update` call is one full learning cycle: record the
//! interaction, run the three learning passes, fire the adaptation rule
//! tables, recompute metrics, persist. Profiles live behind per-user
//! async mutexes like contexts do; persistence is write-behind and
//! non-fatal.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use std::sync::Arc;

use mnemo_types::config::EngineConfig;
use mnemo_types::error::EngineError;
use mnemo_types::profile::{
    Adaptation, EvolutionStage, EvolutionaryProfile, EvolutionaryStats, InteractionRecord,
    Prediction, Suggestion, clamp01,
};
use mnemo_types::redact;

use crate::storage::{KvStore, preferences_key, profile_key};

use super::InteractionEvent;
use super::{adaptation, learning, prediction};

/// Trailing window for the adaptation score, in days.
const ADAPTATION_SCORE_DAYS: i64 = 7;
/// Ceiling on the self-referential prediction-accuracy heuristic.
const PREDICTION_ACCURACY_CAP: f64 = 0.9;
/// Feedback-bearing interactions considered for satisfaction.
const SATISFACTION_WINDOW: usize = 10;

/// Outcome of one learning cycle.
#[derive(Debug, Clone)]
pub struct UpdateOutcome {
    pub stage: EvolutionStage,
    /// Adaptations fired by this cycle, in rule-table order.
    pub adaptations: Vec<Adaptation>,
    pub total_interactions: u64,
}

/// Per-user behavioral profile service.
pub struct ProfileEvolver<K: KvStore> {
    store: K,
    config: EngineConfig,
    profiles: DashMap<String, Arc<Mutex<EvolutionaryProfile>>>,
}

impl<K: KvStore> ProfileEvolver<K> {
    pub fn new(store: K, config: EngineConfig) -> Self {
        Self {
            store,
            config,
            profiles: DashMap::new(),
        }
    }

    /// Access the backing store.
    pub fn store(&self) -> &K {
        &self.store
    }

    /// Run one learning cycle for the user.
    #[tracing::instrument(
        name = "profile_update",
        skip(self, user_id, event),
        fields(user = %redact::user_id(user_id), kind = %event.kind)
    )]
    pub async fn update(
        &self,
        user_id: &str,
        event: InteractionEvent,
    ) -> Result<UpdateOutcome, EngineError> {
        if event.kind.trim().is_empty() {
            return Err(EngineError::validation(
                "interaction kind is required",
                "set kind to e.g. 'message' or 'command'",
            ));
        }

        let entry = self.entry_or_create(user_id).await;
        let mut profile = entry.lock().await;
        let now = Utc::now();

        // 1. Record the interaction.
        profile.interaction_history.push(InteractionRecord {
            timestamp: now,
            kind: event.kind.clone(),
            data: event.data.clone(),
            success: event.success,
            feedback: event.feedback,
        });
        profile.total_interactions += 1;
        if event.success {
            profile.successful_interactions += 1;
        } else {
            profile.failed_interactions += 1;
        }

        // 2. Learning passes.
        learning::learn_preferences(&mut profile, &event, now);
        learning::learn_behavior(&mut profile, &event);
        learning::learn_context(&mut profile, &event, now);

        // 3. Adaptation rules.
        let adaptations = adaptation::evaluate(&profile, &event, now);
        for fired in &adaptations {
            profile.applied_adaptations.push(fired.clone());
        }

        // 4. Metrics.
        recompute_metrics(&mut profile, now);
        profile.last_updated = now;

        // 5. Persist.
        self.persist(user_id, &profile).await;

        Ok(UpdateOutcome {
            stage: profile.evolution_metrics.evolution_stage,
            adaptations,
            total_interactions: profile.total_interactions,
        })
    }

    /// Generate a prediction, store it on the profile (it feeds the
    /// prediction-accuracy heuristic), and return it. `None` if the
    /// user has no profile yet.
    pub async fn predictions(&self, user_id: &str) -> Option<Prediction> {
        let entry = self.peek(user_id).await?;
        let mut profile = entry.lock().await;
        let generated = prediction::generate(&profile, Utc::now());
        profile.predictions = Some(generated.clone());
        profile.evolution_metrics.prediction_accuracy =
            clamp01(generated.confidence.min(PREDICTION_ACCURACY_CAP));
        self.persist(user_id, &profile).await;
        Some(generated)
    }

    /// Read-only view of the learned preferences, for composition into
    /// context snapshots by the API layer. `None` if the user is
    /// unknown.
    pub async fn learned_preferences(
        &self,
        user_id: &str,
    ) -> Option<mnemo_types::profile::LearnedPreferences> {
        let entry = self.peek(user_id).await?;
        let profile = entry.lock().await;
        Some(profile.learned_preferences.clone())
    }

    /// Top-3 personalized suggestions; empty if the user is unknown.
    pub async fn personalized_suggestions(&self, user_id: &str) -> Vec<Suggestion> {
        let Some(entry) = self.peek(user_id).await else {
            return Vec::new();
        };
        let profile = entry.lock().await;
        prediction::suggestions(&profile)
    }

    /// Read-only projection of the profile's counters and metrics.
    pub async fn evolutionary_stats(&self, user_id: &str) -> Option<EvolutionaryStats> {
        let entry = self.peek(user_id).await?;
        let profile = entry.lock().await;
        Some(EvolutionaryStats {
            total_interactions: profile.total_interactions,
            successful_interactions: profile.successful_interactions,
            failed_interactions: profile.failed_interactions,
            evolution_stage: profile.evolution_metrics.evolution_stage,
            learning_rate: profile.evolution_metrics.learning_rate,
            adaptation_score: profile.evolution_metrics.adaptation_score,
            prediction_accuracy: profile.evolution_metrics.prediction_accuracy,
            user_satisfaction: profile.evolution_metrics.user_satisfaction,
            adaptations_applied: profile.applied_adaptations.len(),
            topics_tracked: profile.learned_context.conversation_topics.len(),
            last_updated: profile.last_updated,
        })
    }

    /// Retention sweep: drop interaction and adaptation records older
    /// than the configured window.
    pub async fn cleanup_old_data(&self) -> usize {
        let cutoff = Utc::now() - Duration::days(self.config.retention_days);
        let mut removed = 0usize;

        let user_ids: Vec<String> = self.profiles.iter().map(|e| e.key().clone()).collect();
        for user_id in user_ids {
            let Some(entry) = self.peek(&user_id).await else {
                continue;
            };
            let mut profile = entry.lock().await;
            let before =
                profile.interaction_history.len() + profile.applied_adaptations.len();
            profile.interaction_history.retain(|r| r.timestamp >= cutoff);
            profile.applied_adaptations.retain(|a| a.timestamp >= cutoff);
            let dropped =
                before - (profile.interaction_history.len() + profile.applied_adaptations.len());
            if dropped > 0 {
                removed += dropped;
                self.persist(&user_id, &profile).await;
            }
        }

        debug!(removed, "profile retention sweep complete");
        removed
    }

    /// Drop every trace of a user from this evolver and its store keys.
    /// Used by the privacy gate.
    pub async fn remove_user(&self, user_id: &str) {
        self.profiles.remove(user_id);
        for key in [profile_key(user_id), preferences_key(user_id)] {
            if let Err(err) = self.store.delete(&key).await {
                warn!(
                    user = %redact::user_id(user_id),
                    error = %err,
                    "failed to delete persisted profile key"
                );
            }
        }
    }

    /// Full profile clone for data export. `None` if the user is
    /// unknown.
    pub async fn export_profile(&self, user_id: &str) -> Option<EvolutionaryProfile> {
        let entry = self.peek(user_id).await?;
        let profile = entry.lock().await;
        Some(profile.clone())
    }

    // --- internals ---

    async fn entry_or_create(&self, user_id: &str) -> Arc<Mutex<EvolutionaryProfile>> {
        if let Some(existing) = self.profiles.get(user_id) {
            return existing.value().clone();
        }
        let loaded = self.load_profile(user_id).await.unwrap_or_default();
        self.profiles
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(loaded)))
            .value()
            .clone()
    }

    async fn peek(&self, user_id: &str) -> Option<Arc<Mutex<EvolutionaryProfile>>> {
        if let Some(existing) = self.profiles.get(user_id) {
            return Some(existing.value().clone());
        }
        let loaded = self.load_profile(user_id).await?;
        Some(
            self.profiles
                .entry(user_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(loaded)))
                .value()
                .clone(),
        )
    }

    async fn load_profile(&self, user_id: &str) -> Option<EvolutionaryProfile> {
        let raw = match self.store.get(&profile_key(user_id)).await {
            Ok(raw) => raw?,
            Err(err) => {
                warn!(
                    user = %redact::user_id(user_id),
                    error = %err,
                    "failed to load persisted profile"
                );
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(profile) => Some(profile),
            Err(err) => {
                warn!(
                    user = %redact::user_id(user_id),
                    error = %err,
                    "persisted profile is malformed, starting fresh"
                );
                None
            }
        }
    }

    /// Write-behind persistence of the full profile plus the
    /// preference snapshot; failures are logged, never propagated.
    async fn persist(&self, user_id: &str, profile: &EvolutionaryProfile) {
        let ttl = Some(self.config.profile_ttl_secs);

        match serde_json::to_string(profile) {
            Ok(json) => {
                if let Err(err) = self.store.set(&profile_key(user_id), &json, ttl).await {
                    warn!(
                        user = %redact::user_id(user_id),
                        error = %err,
                        "failed to persist profile"
                    );
                }
            }
            Err(err) => warn!(
                user = %redact::user_id(user_id),
                error = %err,
                "failed to serialize profile"
            ),
        }

        match serde_json::to_string(&profile.learned_preferences) {
            Ok(json) => {
                if let Err(err) = self.store.set(&preferences_key(user_id), &json, ttl).await {
                    warn!(
                        user = %redact::user_id(user_id),
                        error = %err,
                        "failed to persist preference snapshot"
                    );
                }
            }
            Err(err) => warn!(
                user = %redact::user_id(user_id),
                error = %err,
                "failed to serialize preference snapshot"
            ),
        }
    }
}

/// Recompute the derived metrics block. Every value is clamped to
/// [0,1].
fn recompute_metrics(profile: &mut EvolutionaryProfile, now: DateTime<Utc>) {
    let metrics = &mut profile.evolution_metrics;

    metrics.learning_rate = if profile.total_interactions == 0 {
        0.0
    } else {
        clamp01(profile.successful_interactions as f64 / profile.total_interactions as f64)
    };

    let window_start = now - Duration::days(ADAPTATION_SCORE_DAYS);
    let recent = profile
        .applied_adaptations
        .iter()
        .filter(|a| a.timestamp >= window_start)
        .count();
    metrics.adaptation_score = clamp01(recent as f64 / ADAPTATION_SCORE_DAYS as f64);

    metrics.prediction_accuracy = clamp01(
        profile
            .predictions
            .as_ref()
            .map(|p| p.confidence.min(PREDICTION_ACCURACY_CAP))
            .unwrap_or(0.0),
    );

    let feedback: Vec<f64> = profile
        .interaction_history
        .iter()
        .rev()
        .filter_map(|r| r.feedback)
        .take(SATISFACTION_WINDOW)
        .collect();
    metrics.user_satisfaction = if feedback.is_empty() {
        0.0
    } else {
        clamp01(feedback.iter().filter(|&&f| f > 0.0).count() as f64 / feedback.len() as f64)
    };

    metrics.evolution_stage = EvolutionStage::from_interactions(profile.total_interactions);
}

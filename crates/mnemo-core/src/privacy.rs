//! Privacy gate: opt-out purge and data export.
//!
//! Thin operations spanning all three components and the KV keyspace.
//! Purge must leave zero residual `user_context:*`, `user_profile:*`,
//! or `evolutionary_profile:*` keys for the user; export bundles
//! everything the engine knows about them.

use serde::Serialize;
use tracing::info;

use mnemo_types::context::UserContext;
use mnemo_types::profile::EvolutionaryProfile;
use mnemo_types::redact;
use mnemo_types::reference::RecordedAction;

use crate::classify::Classifier;
use crate::memory::MemoryEngine;
use crate::profile::evolver::ProfileEvolver;
use crate::reference::ReferenceResolver;
use crate::storage::KvStore;

/// What a purge removed.
#[derive(Debug, Clone, Serialize)]
pub struct PurgeReport {
    pub had_context: bool,
    pub had_profile: bool,
    pub had_actions: bool,
}

/// Everything the engine holds about one user.
#[derive(Debug, Clone, Serialize)]
pub struct UserExport {
    pub context: Option<UserContext>,
    pub profile: Option<EvolutionaryProfile>,
    pub actions: Vec<RecordedAction>,
}

/// Delete every trace of a user across memory, profile, resolver, and
/// the persistent keyspace.
pub async fn purge_user<K1, K2, C>(
    engine: &MemoryEngine<K1, C>,
    evolver: &ProfileEvolver<K2>,
    resolver: &ReferenceResolver,
    user_id: &str,
) -> PurgeReport
where
    K1: KvStore,
    K2: KvStore,
    C: Classifier,
{
    let had_context = engine.export_context(user_id).await.is_some();
    let had_profile = evolver.export_profile(user_id).await.is_some();
    let had_actions = !resolver.export_actions(user_id).await.is_empty();

    engine.remove_user(user_id).await;
    evolver.remove_user(user_id).await;
    resolver.remove_user(user_id);

    info!(user = %redact::user_id(user_id), "user data purged");
    PurgeReport {
        had_context,
        had_profile,
        had_actions,
    }
}

/// Bundle everything held for a user. `None` when nothing is held at
/// all.
pub async fn export_user<K1, K2, C>(
    engine: &MemoryEngine<K1, C>,
    evolver: &ProfileEvolver<K2>,
    resolver: &ReferenceResolver,
    user_id: &str,
) -> Option<UserExport>
where
    K1: KvStore,
    K2: KvStore,
    C: Classifier,
{
    let context = engine.export_context(user_id).await;
    let profile = evolver.export_profile(user_id).await;
    let actions = resolver.export_actions(user_id).await;

    if context.is_none() && profile.is_none() && actions.is_empty() {
        return None;
    }
    Some(UserExport {
        context,
        profile,
        actions,
    })
}

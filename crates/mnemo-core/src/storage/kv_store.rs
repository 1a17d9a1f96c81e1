//! Key-value store trait.
//!
//! Defines the interface for the persistent store the engine writes
//! serialized state through. Values are JSON text; keys follow the
//! schema below. Uses RPITIT (native async fn in traits, Rust 2024
//! edition). Implementations live in mnemo-infra.
//!
//! Key schema:
//! - `user_context:{user_id}` -- serialized `UserContext`, TTL 7 days
//! - `user_profile:{user_id}` -- learned-preference snapshot, TTL 30 days
//! - `evolutionary_profile:{user_id}` -- full profile, TTL 30 days

use mnemo_types::error::StoreError;

/// Trait for string-keyed persistent storage with optional TTL.
///
/// The store is best-effort durability, not transactional: callers
/// treat in-memory state as the source of truth and log (rather than
/// propagate) write failures.
pub trait KvStore: Send + Sync {
    /// Get a value. Returns None if the key is absent or expired.
    fn get(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<String>, StoreError>> + Send;

    /// Set a value (upsert) with an optional TTL in seconds.
    fn set(
        &self,
        key: &str,
        value: &str,
        ttl_seconds: Option<u64>,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Delete a key. No-op if the key does not exist.
    fn delete(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// List keys matching a pattern with a single `*` wildcard
    /// (e.g. `user_context:*`).
    fn keys(
        &self,
        pattern: &str,
    ) -> impl std::future::Future<Output = Result<Vec<String>, StoreError>> + Send;
}

impl<S: KvStore> KvStore for &S {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl_seconds: Option<u64>) -> Result<(), StoreError> {
        (**self).set(key, value, ttl_seconds).await
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        (**self).delete(key).await
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError> {
        (**self).keys(pattern).await
    }
}

impl<S: KvStore> KvStore for std::sync::Arc<S> {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl_seconds: Option<u64>) -> Result<(), StoreError> {
        (**self).set(key, value, ttl_seconds).await
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        (**self).delete(key).await
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError> {
        (**self).keys(pattern).await
    }
}

/// Key for a user's serialized conversation context.
pub fn context_key(user_id: &str) -> String {
    format!("user_context:{user_id}")
}

/// Key for a user's learned-preference snapshot.
pub fn preferences_key(user_id: &str) -> String {
    format!("user_profile:{user_id}")
}

/// Key for a user's full evolutionary profile.
pub fn profile_key(user_id: &str) -> String {
    format!("evolutionary_profile:{user_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_schema() {
        assert_eq!(context_key("5511999990000"), "user_context:5511999990000");
        assert_eq!(preferences_key("u1"), "user_profile:u1");
        assert_eq!(profile_key("u1"), "evolutionary_profile:u1");
    }
}

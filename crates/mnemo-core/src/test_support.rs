//! Shared test fixtures for the engine crates.
//!
//! A trivial in-memory `KvStore` so core tests don't depend on
//! mnemo-infra (which depends on this crate). TTLs are recorded but not
//! enforced; expiry behavior is tested against the real adapters.

use dashmap::DashMap;

use mnemo_types::error::StoreError;

use crate::storage::KvStore;

/// In-memory KvStore stub. Set `fail_writes` to exercise the
/// write-behind error path.
#[derive(Default)]
pub struct StubStore {
    entries: DashMap<String, String>,
    pub fail_writes: bool,
}

impl StubStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            entries: DashMap::new(),
            fail_writes: true,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl KvStore for StubStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).map(|e| e.value().clone()))
    }

    async fn set(&self, key: &str, value: &str, _ttl_seconds: Option<u64>) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Query("stub write failure".to_string()));
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError> {
        let prefix = pattern.strip_suffix('*').unwrap_or(pattern);
        Ok(self
            .entries
            .iter()
            .map(|e| e.key().clone())
            .filter(|k| if pattern.ends_with('*') {
                k.starts_with(prefix)
            } else {
                k == pattern
            })
            .collect())
    }
}

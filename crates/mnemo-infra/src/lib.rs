//! Infrastructure adapters for mnemo.
//!
//! Implements the `KvStore` port from `mnemo-core` twice: a
//! SQLite-backed store for production and an in-memory store for tests
//! and embedded use. Also hosts the TOML configuration loader.

pub mod config;
pub mod memory_kv;
pub mod sqlite;

pub use memory_kv::MemoryKvStore;
pub use sqlite::kv::SqliteKvStore;
pub use sqlite::pool::DatabasePool;

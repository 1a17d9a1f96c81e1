//! SQLite adapters.

pub mod kv;
pub mod pool;

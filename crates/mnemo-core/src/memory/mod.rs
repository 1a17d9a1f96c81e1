//! Per-user conversational memory.
//!
//! `MemoryEngine` owns every `UserContext`: the bounded short-term
//! window, the long-term archive, topic-change detection, and
//! summarization. Other components read through its query methods; the
//! reference resolver consumes it through the `HistorySource` port.

pub mod engine;
pub mod search;
pub mod summarizer;

pub use engine::{CleanupReport, MemoryEngine, RecordOutcome};
pub use search::SearchHit;

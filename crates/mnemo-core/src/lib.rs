//! Conversational memory and personalization engine.
//!
//! This crate holds the three cooperating components and the ports they
//! consume. It defines the `KvStore` trait that the infrastructure
//! layer implements and never depends on `mnemo-infra` or any database
//! crate.
//!
//! - [`memory::MemoryEngine`] -- per-user short/long-term memory, topic
//!   drift detection, heuristic summarization.
//! - [`profile::ProfileEvolver`] -- the evolving behavioral profile,
//!   adaptation rules, predictions, and suggestions.
//! - [`reference::ReferenceResolver`] -- anaphoric/deictic reference
//!   detection and resolution against history.
//! - [`privacy`] -- opt-out purge and data export across all three.

pub mod classify;
pub mod memory;
pub mod privacy;
pub mod profile;
pub mod reference;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_support;

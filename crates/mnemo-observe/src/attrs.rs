//! Span attribute constants for engine instrumentation.
//!
//! Shared field names so spans emitted by the memory engine, profile
//! evolver, and reference resolver line up in queries. User identifiers
//! must already be redacted before landing in any of these fields.

/// Redacted user identifier (`***1234`).
pub const USER_ID: &str = "mnemo.user.id";

/// Conversation identifier the operation touched.
pub const CONVERSATION_ID: &str = "mnemo.conversation.id";

/// Topic label inferred for the current message.
pub const TOPIC: &str = "mnemo.topic";

/// Whether the operation fired a topic-change event.
pub const TOPIC_CHANGED: &str = "mnemo.topic.changed";

/// Short-term window size after the operation.
pub const SHORT_TERM_LEN: &str = "mnemo.short_term.len";

/// Evolution stage after a learning cycle.
pub const EVOLUTION_STAGE: &str = "mnemo.evolution.stage";

/// Number of adaptation rules fired in a cycle.
pub const ADAPTATIONS_FIRED: &str = "mnemo.adaptations.fired";

/// Reference type being resolved.
pub const REFERENCE_TYPE: &str = "mnemo.reference.type";

/// Whether a reference resolution found its antecedent.
pub const REFERENCE_FOUND: &str = "mnemo.reference.found";

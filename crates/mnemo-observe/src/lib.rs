//! Observability setup for mnemo.
//!
//! Tracing subscriber initialization (structured logging, optional
//! OpenTelemetry export) and the span attribute constants the engine
//! components use for consistent instrumentation.

pub mod attrs;
pub mod tracing_setup;

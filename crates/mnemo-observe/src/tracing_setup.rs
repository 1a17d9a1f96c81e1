//! Tracing subscriber initialization for hosts embedding the engine.
//!
//! The engine crates only emit `tracing` events; the host application
//! decides how they are rendered and exported by calling [`init`] once
//! at startup.
//!
//! # Usage
//!
//! ```no_run
//! use mnemo_observe::tracing_setup::{TracingOptions, init};
//!
//! // Human-readable logs, no export.
//! init(TracingOptions::default()).unwrap();
//! ```
//!
//! ```no_run
//! use mnemo_observe::tracing_setup::{TracingOptions, init};
//!
//! // JSON logs plus OpenTelemetry spans to stdout (local development;
//! // swap the exporter for OTLP in production).
//! init(TracingOptions { json: true, otel: true }).unwrap();
//! ```

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use std::sync::OnceLock;

/// Filter applied when `RUST_LOG` is unset: engine crates at info,
/// everything else at warn.
const DEFAULT_FILTER: &str = "warn,mnemo_core=info,mnemo_infra=info";

/// Keeps the OTel tracer provider reachable for a clean shutdown.
static TRACER_PROVIDER: OnceLock<SdkTracerProvider> = OnceLock::new();

/// How the host wants engine telemetry rendered.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingOptions {
    /// Emit newline-delimited JSON instead of the human-readable
    /// format.
    pub json: bool,
    /// Bridge spans to OpenTelemetry with a stdout exporter.
    pub otel: bool,
}

/// Install the global tracing subscriber.
///
/// Honors `RUST_LOG` when set, otherwise applies [`DEFAULT_FILTER`].
/// Span close events are always recorded so operation timing shows up
/// without extra instrumentation.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init(options: TracingOptions) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let registry = tracing_subscriber::registry().with(env_filter);

    let otel_layer = if options.otel {
        let provider = SdkTracerProvider::builder()
            .with_simple_exporter(opentelemetry_stdout::SpanExporter::default())
            .build();
        let tracer = provider.tracer("mnemo");
        let _ = TRACER_PROVIDER.set(provider.clone());
        opentelemetry::global::set_tracer_provider(provider);
        Some(tracing_opentelemetry::layer().with_tracer(tracer))
    } else {
        None
    };

    if options.json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .with(otel_layer)
            .try_init()?;
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .with(otel_layer)
            .try_init()?;
    }

    Ok(())
}

/// Flush pending spans and shut the OTel provider down.
///
/// Safe to call when OTel was never enabled (no-op).
pub fn shutdown() {
    if let Some(provider) = TRACER_PROVIDER.get() {
        if let Err(e) = provider.shutdown() {
            eprintln!("Warning: tracer provider shutdown error: {e}");
        }
    }
}

//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Startup order:
//!     → logging.rs        (tracing subscriber + Sentry breadcrumbs)
//!     → sentry_client.rs  (Sentry client bound to the main hub)
//!     → otel.rs           (tracer provider, sampler, processors, propagator)
//!     → setup_check.rs    (warn about anything missing)
//!
//! Per request:
//!     → instrumentation.rs (server span + per-request Sentry hub)
//!     → sentry_trace.rs    (incoming `sentry-trace` as remote parent)
//!     → sampler.rs         (the single sampling decision)
//!     → handler spans      (children of the server span)
//!     → SentrySpanProcessor → Sentry transaction → DropTransactions transport
//!     → SimpleSpanProcessor → stdout exporter
//! ```
//!
//! # Design Decisions
//! - Sentry is initialized before any OpenTelemetry component
//! - Spans are created through the OpenTelemetry API only

pub mod instrumentation;
pub mod logging;
pub mod otel;
pub mod sampler;
pub mod sentry_client;
pub mod sentry_trace;
pub mod setup_check;

pub use instrumentation::HttpTraceLayer;
pub use sampler::SentrySampler;
pub use sentry_trace::IncomingTrace;
pub use setup_check::{SetupIssue, SetupReport};

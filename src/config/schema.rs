//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files,
//! and every field has a default so an empty file is a valid config.

use serde::{Deserialize, Serialize};

/// Root configuration for the service.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind host and port).
    pub listener: ListenerConfig,

    /// Sentry client settings.
    pub sentry: SentryConfig,

    /// OpenTelemetry tracer pipeline settings.
    pub otel: OtelConfig,

    /// Log output settings.
    pub logging: LoggingConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Host or IP to bind (e.g., "0.0.0.0").
    pub host: String,

    /// TCP port to bind.
    pub port: u16,
}

impl ListenerConfig {
    /// The `host:port` string handed to the socket layer.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Sentry client configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SentryConfig {
    /// Ingestion DSN. When unset, Sentry falls back to `SENTRY_DSN`.
    pub dsn: Option<String>,

    /// Probability in `[0, 1]` that a trace is sampled.
    pub traces_sample_rate: f32,

    /// Print Sentry SDK debug output.
    pub debug: bool,

    /// Environment name (e.g., "production").
    pub environment: Option<String>,

    /// Release identifier; defaults to the crate name and version.
    pub release: Option<String>,
}

impl Default for SentryConfig {
    fn default() -> Self {
        Self {
            dsn: None,
            traces_sample_rate: 1.0,
            debug: false,
            environment: None,
            release: None,
        }
    }
}

/// OpenTelemetry configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct OtelConfig {
    /// `service.name` resource attribute.
    pub service_name: String,

    /// Name of the tracer used for manual spans.
    pub tracer_name: String,

    /// Print finished spans to stdout.
    pub console_exporter: bool,

    /// Forward spans to Sentry as transactions.
    pub sentry_span_processor: bool,

    /// Use the Sentry propagator for incoming/outgoing trace headers.
    pub sentry_propagator: bool,

    /// Derive sampling decisions from the Sentry client.
    pub sentry_sampler: bool,
}

impl Default for OtelConfig {
    fn default() -> Self {
        Self {
            service_name: "sentry-otel-http-example".to_string(),
            tracer_name: "esm-tracer".to_string(),
            console_exporter: true,
            sentry_span_processor: true,
            sentry_propagator: true,
            sentry_sampler: true,
        }
    }
}

/// Log output configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives; `RUST_LOG` takes precedence.
    pub filter: String,

    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

//! Error types shared across subsystems.

use thiserror::Error;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("listener.host must not be empty")]
    EmptyHost,

    #[error("listener address {0:?} is not a valid socket address")]
    InvalidAddress(String),

    #[error("sentry.traces_sample_rate must be within [0, 1], got {0}")]
    SampleRateOutOfRange(f32),

    #[error("sentry.dsn is invalid: {0}")]
    InvalidDsn(String),

    #[error("otel.{0} must not be empty")]
    EmptyName(&'static str),

    #[error("logging.filter is invalid: {0}")]
    InvalidLogFilter(String),
}

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to install log subscriber: {0}")]
    Logging(String),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

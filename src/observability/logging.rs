//! Structured logging.
//!
//! Log events are written to stdout and forwarded to Sentry: errors become
//! events, warnings and info become breadcrumbs. `tracing` spans are not
//! turned into Sentry transactions; transactions come from OpenTelemetry only.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::LoggingConfig;
use crate::error::StartupError;

/// Build the filter: `RUST_LOG` when set, otherwise the configured directives.
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter, StartupError> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .map_err(|e| StartupError::Logging(e.to_string()))
}

/// Install the global subscriber.
pub fn init_logging(config: &LoggingConfig) -> Result<(), StartupError> {
    let fmt_layer = if config.json {
        fmt::layer().json().with_target(true).boxed()
    } else {
        fmt::layer().with_target(true).boxed()
    };

    let sentry_layer = sentry_tracing::layer().span_filter(|_| false);

    tracing_subscriber::registry()
        .with(env_filter(config)?)
        .with(fmt_layer)
        .with(sentry_layer)
        .try_init()
        .map_err(|e| StartupError::Logging(e.to_string()))
}

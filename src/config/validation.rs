//! Configuration validation.
//!
//! Serde handles the syntax; this module checks value ranges and formats.
//! Every violation is collected so a bad file is fixed in one pass.

use std::net::{SocketAddr, ToSocketAddrs};

use sentry::types::Dsn;
use tracing_subscriber::EnvFilter;

use crate::config::schema::ServiceConfig;
use crate::error::ValidationError;

/// Validate a configuration, returning every problem found.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.host.trim().is_empty() {
        errors.push(ValidationError::EmptyHost);
    } else if resolve(&config.listener.bind_address()).is_none() {
        errors.push(ValidationError::InvalidAddress(config.listener.bind_address()));
    }

    let rate = config.sentry.traces_sample_rate;
    if !rate.is_finite() || !(0.0..=1.0).contains(&rate) {
        errors.push(ValidationError::SampleRateOutOfRange(rate));
    }

    if let Some(dsn) = &config.sentry.dsn {
        if let Err(e) = dsn.parse::<Dsn>() {
            errors.push(ValidationError::InvalidDsn(e.to_string()));
        }
    }

    if config.otel.service_name.trim().is_empty() {
        errors.push(ValidationError::EmptyName("service_name"));
    }
    if config.otel.tracer_name.trim().is_empty() {
        errors.push(ValidationError::EmptyName("tracer_name"));
    }

    if let Err(e) = EnvFilter::try_new(&config.logging.filter) {
        errors.push(ValidationError::InvalidLogFilter(e.to_string()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn resolve(address: &str) -> Option<SocketAddr> {
    address.to_socket_addrs().ok()?.next()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(validate_config(&ServiceConfig::default()), Ok(()));
    }

    #[test]
    fn sample_rate_bounds_are_inclusive() {
        let mut config = ServiceConfig::default();
        for rate in [0.0, 0.5, 1.0] {
            config.sentry.traces_sample_rate = rate;
            assert!(validate_config(&config).is_ok(), "rate {rate} rejected");
        }
        for rate in [-0.1, 1.01, f32::NAN] {
            config.sentry.traces_sample_rate = rate;
            assert!(validate_config(&config).is_err(), "rate {rate} accepted");
        }
    }

    #[test]
    fn reports_all_errors() {
        let mut config = ServiceConfig::default();
        config.listener.host = " ".into();
        config.sentry.traces_sample_rate = 3.0;
        config.sentry.dsn = Some("not a dsn".into());
        config.otel.service_name = String::new();
        config.otel.tracer_name = String::new();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert_eq!(errors[0], ValidationError::EmptyHost);
        assert_eq!(errors[1], ValidationError::SampleRateOutOfRange(3.0));
        assert!(matches!(errors[2], ValidationError::InvalidDsn(_)));
        assert_eq!(errors[3], ValidationError::EmptyName("service_name"));
        assert_eq!(errors[4], ValidationError::EmptyName("tracer_name"));
    }

    #[test]
    fn accepts_placeholder_dsn() {
        let mut config = ServiceConfig::default();
        config.sentry.dsn = Some("https://public@dsn.ingest.sentry.io/1337".into());
        assert!(validate_config(&config).is_ok());
    }
}

//! Post-startup check that Sentry and OpenTelemetry are wired together.

use thiserror::Error;

/// Which pieces of the Sentry/OpenTelemetry integration were installed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetupReport {
    pub sentry_client: bool,
    pub span_processor: bool,
    pub propagator: bool,
    pub sampler: bool,
}

/// A missing piece of the integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SetupIssue {
    #[error("Sentry client is not active; spans will not reach Sentry")]
    SentryClientMissing,

    #[error("SentrySpanProcessor is not registered on the tracer provider")]
    SpanProcessorMissing,

    #[error("SentryPropagator is not the global text map propagator")]
    PropagatorMissing,

    #[error("SentrySampler is not configured; sampling ignores traces_sample_rate")]
    SamplerMissing,
}

/// Log a warning for each missing component and return them.
pub fn validate_setup(report: &SetupReport) -> Vec<SetupIssue> {
    let checks = [
        (report.sentry_client, SetupIssue::SentryClientMissing),
        (report.span_processor, SetupIssue::SpanProcessorMissing),
        (report.propagator, SetupIssue::PropagatorMissing),
        (report.sampler, SetupIssue::SamplerMissing),
    ];

    let issues: Vec<SetupIssue> = checks
        .into_iter()
        .filter(|(installed, _)| !installed)
        .map(|(_, issue)| issue)
        .collect();

    for issue in &issues {
        tracing::warn!(%issue, "OpenTelemetry setup incomplete");
    }
    if issues.is_empty() {
        tracing::debug!("OpenTelemetry setup validated");
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_setup_has_no_issues() {
        let report = SetupReport {
            sentry_client: true,
            span_processor: true,
            propagator: true,
            sampler: true,
        };
        assert!(validate_setup(&report).is_empty());
    }

    #[test]
    fn reports_each_missing_component() {
        assert_eq!(
            validate_setup(&SetupReport::default()),
            vec![
                SetupIssue::SentryClientMissing,
                SetupIssue::SpanProcessorMissing,
                SetupIssue::PropagatorMissing,
                SetupIssue::SamplerMissing,
            ]
        );

        let report = SetupReport {
            sentry_client: true,
            span_processor: true,
            propagator: false,
            sampler: true,
        };
        assert_eq!(validate_setup(&report), vec![SetupIssue::PropagatorMissing]);
    }
}

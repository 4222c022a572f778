//! OpenTelemetry tracer provider construction and registration.
//!
//! Mirrors the order the Sentry integration expects: resource and sampler
//! first, then the Sentry span processor, then the console exporter, and
//! finally the global propagator and provider.

use opentelemetry::{global, KeyValue};
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::{SdkTracerProvider, TracerProviderBuilder};
use opentelemetry_sdk::Resource;
use opentelemetry_semantic_conventions::resource::SERVICE_VERSION;
use sentry_opentelemetry::{SentryPropagator, SentrySpanProcessor};

use crate::config::OtelConfig;
use crate::observability::sampler::SentrySampler;
use crate::observability::setup_check::SetupReport;

/// A registered tracer provider and what was installed on it.
pub struct TracerSetup {
    pub provider: SdkTracerProvider,
    pub report: SetupReport,
}

/// Resource describing this service.
pub fn service_resource(config: &OtelConfig) -> Resource {
    Resource::builder()
        .with_service_name(config.service_name.clone())
        .with_attribute(KeyValue::new(SERVICE_VERSION, env!("CARGO_PKG_VERSION")))
        .build()
}

/// Assemble a provider builder without registering anything globally.
///
/// Further processors may be appended before calling `build`.
pub fn tracer_provider_builder(
    config: &OtelConfig,
    sentry_client: Option<&sentry::Client>,
) -> (TracerProviderBuilder, SetupReport) {
    let mut report = SetupReport {
        sentry_client: sentry_client.is_some(),
        ..Default::default()
    };

    let mut builder = SdkTracerProvider::builder().with_resource(service_resource(config));

    if config.sentry_sampler {
        if let Some(client) = sentry_client {
            let sampler = SentrySampler::from_client(client);
            tracing::debug!(rate = sampler.rate(), "Using Sentry sampler");
            builder = builder.with_sampler(sampler);
            report.sampler = true;
        }
    }

    if config.sentry_span_processor {
        builder = builder.with_span_processor(SentrySpanProcessor::new());
        report.span_processor = true;
    }

    if config.console_exporter {
        builder = builder.with_simple_exporter(opentelemetry_stdout::SpanExporter::default());
    }

    (builder, report)
}

/// Install the global text map propagator.
///
/// Returns `true` when the Sentry propagator was installed.
pub fn install_propagator(config: &OtelConfig) -> bool {
    if config.sentry_propagator {
        global::set_text_map_propagator(SentryPropagator::new());
        true
    } else {
        global::set_text_map_propagator(TraceContextPropagator::new());
        false
    }
}

/// Build the tracer provider, register it and the propagator globally.
pub fn init_tracer_provider(
    config: &OtelConfig,
    sentry_client: Option<&sentry::Client>,
) -> TracerSetup {
    let (builder, mut report) = tracer_provider_builder(config, sentry_client);
    let provider = builder.build();

    report.propagator = install_propagator(config);
    global::set_tracer_provider(provider.clone());

    tracing::info!(
        service_name = %config.service_name,
        console_exporter = config.console_exporter,
        sentry_span_processor = report.span_processor,
        sentry_propagator = report.propagator,
        sentry_sampler = report.sampler,
        "Tracer provider registered"
    );

    TracerSetup { provider, report }
}

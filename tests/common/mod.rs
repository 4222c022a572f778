//! Shared utilities for integration tests.

use opentelemetry_sdk::trace::{InMemorySpanExporter, SdkTracerProvider, SpanData};
use sentry_otel_http::config::OtelConfig;
use sentry_otel_http::HttpServer;

/// A server whose spans are collected in memory.
pub struct TracedServer {
    pub server: HttpServer,
    pub exporter: InMemorySpanExporter,
    // Kept alive so the exporter keeps receiving spans.
    _provider: SdkTracerProvider,
}

impl TracedServer {
    pub fn new() -> Self {
        let exporter = InMemorySpanExporter::default();
        let provider = SdkTracerProvider::builder()
            .with_simple_exporter(exporter.clone())
            .build();
        let server = HttpServer::new(&provider, &OtelConfig::default());

        Self {
            server,
            exporter,
            _provider: provider,
        }
    }

    /// Finished spans with the given name.
    pub fn spans_named(&self, name: &str) -> Vec<SpanData> {
        self.exporter
            .get_finished_spans()
            .unwrap()
            .into_iter()
            .filter(|span| span.name == name)
            .collect()
    }
}

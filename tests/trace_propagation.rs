//! Incoming trace headers are continued by the server span.
//!
//! Kept in its own test binary because it installs a global propagator.

use axum::body::Body;
use axum::http::Request;
use opentelemetry::global;
use opentelemetry::trace::{SpanId, TraceId};
use opentelemetry_sdk::propagation::TraceContextPropagator;
use sentry_otel_http::http::MANUAL_SPAN_NAME;
use tower::ServiceExt;

mod common;

#[tokio::test]
async fn server_span_continues_incoming_trace() {
    global::set_text_map_propagator(TraceContextPropagator::new());
    let traced = common::TracedServer::new();

    let request = Request::builder()
        .uri("/")
        .header(
            "traceparent",
            "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01",
        )
        .body(Body::empty())
        .unwrap();
    traced.server.router().oneshot(request).await.unwrap();

    let expected_trace = TraceId::from_hex("4bf92f3577b34da6a3ce929d0e0e4736").unwrap();
    let expected_parent = SpanId::from_hex("00f067aa0ba902b7").unwrap();

    let server = traced.spans_named("GET /");
    assert_eq!(server.len(), 1);
    assert_eq!(server[0].span_context.trace_id(), expected_trace);
    assert_eq!(server[0].parent_span_id, expected_parent);

    let manual = traced.spans_named(MANUAL_SPAN_NAME);
    assert_eq!(manual.len(), 1);
    assert_eq!(manual[0].span_context.trace_id(), expected_trace);
    assert_eq!(manual[0].parent_span_id, server[0].span_context.span_id());
}

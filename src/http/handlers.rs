//! Request handlers.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
};
use opentelemetry::trace::{TraceContextExt, Tracer};

use crate::http::server::AppState;

/// Body returned for every request.
pub const HELLO_BODY: &str = "Hello, World!\n";

/// Name of the span opened by [`hello`].
pub const MANUAL_SPAN_NAME: &str = "manual";

/// Respond to any request with a plain-text greeting.
///
/// Opens and immediately ends one active span named `manual`, a child of the
/// request's server span.
pub async fn hello(State(state): State<AppState>) -> impl IntoResponse {
    state
        .tracer
        .in_span(MANUAL_SPAN_NAME, |cx| cx.span().end());

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain")],
        HELLO_BODY,
    )
}

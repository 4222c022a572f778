//! Automatic HTTP server instrumentation.
//!
//! [`HttpTraceLayer`] wraps a service so that every request runs inside an
//! OpenTelemetry server span. The parent context is extracted from request
//! headers with the global propagator. When that yields no parent span, a
//! `sentry-trace` header is attached as the remote parent, so the caller's
//! trace id and sampling decision carry over. Each request also gets its own Sentry hub,
//! which keeps scope data from leaking between concurrent requests.

use std::future::Future;
use std::sync::Arc;
use std::task::{Context as TaskContext, Poll};

use axum::http::{HeaderMap, Request, Response, StatusCode, Version};
use futures_util::future::BoxFuture;
use opentelemetry::propagation::Extractor;
use opentelemetry::trace::{SpanKind, Status, TraceContextExt, Tracer};
use opentelemetry::{global, Context, KeyValue};
use opentelemetry_sdk::trace::SdkTracer;
use opentelemetry_semantic_conventions::trace::{
    HTTP_REQUEST_METHOD, HTTP_RESPONSE_STATUS_CODE, NETWORK_PROTOCOL_VERSION, URL_PATH, URL_QUERY,
    URL_SCHEME, USER_AGENT_ORIGINAL,
};
use sentry::{Hub, SentryFutureExt};
use tower::{Layer, Service};

use crate::observability::sentry_trace::IncomingTrace;

/// Tracer name used for server spans.
pub const INSTRUMENTATION_NAME: &str = "sentry-otel-http.instrumentation.http";

/// Reads propagation fields from request headers.
pub struct HeaderExtractor<'a>(pub &'a HeaderMap);

impl Extractor for HeaderExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|value| value.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(|name| name.as_str()).collect()
    }
}

/// Tower layer that opens one server span per request.
#[derive(Clone)]
pub struct HttpTraceLayer {
    tracer: SdkTracer,
}

impl HttpTraceLayer {
    pub fn new(tracer: SdkTracer) -> Self {
        Self { tracer }
    }
}

impl<S> Layer<S> for HttpTraceLayer {
    type Service = HttpTraceService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        HttpTraceService {
            inner,
            tracer: self.tracer.clone(),
        }
    }
}

/// Service produced by [`HttpTraceLayer`].
#[derive(Clone)]
pub struct HttpTraceService<S> {
    inner: S,
    tracer: SdkTracer,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for HttpTraceService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    S::Future: Send + 'static,
    S::Error: 'static,
    ResBody: 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut TaskContext<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<ReqBody>) -> Self::Future {
        let mut parent_cx = global::get_text_map_propagator(|propagator| {
            propagator.extract(&HeaderExtractor(request.headers()))
        });
        if !parent_cx.has_active_span() {
            if let Some(incoming) = IncomingTrace::from_headers(request.headers()) {
                parent_cx = incoming.continue_from(&parent_cx);
            }
        }

        let span = self
            .tracer
            .span_builder(span_name(&request))
            .with_kind(SpanKind::Server)
            .with_attributes(request_attributes(&request))
            .start_with_context(&self.tracer, &parent_cx);
        let cx = parent_cx.with_span(span);

        let hub = Arc::new(Hub::new_from_top(Hub::current()));
        let future = {
            let _attached = cx.clone().attach();
            Hub::run(hub.clone(), || self.inner.call(request))
        };
        let future = with_otel_context(future, cx.clone()).bind_hub(hub);

        Box::pin(async move {
            let result = future.await;

            let span = cx.span();
            match &result {
                Ok(response) => record_status(&span, response.status()),
                Err(_) => span.set_status(Status::error("request failed")),
            }
            span.end();

            result
        })
    }
}

/// Make `cx` the current OpenTelemetry context whenever `future` is polled.
fn with_otel_context<F: Future>(future: F, cx: Context) -> impl Future<Output = F::Output> {
    let mut future = Box::pin(future);
    futures_util::future::poll_fn(move |task| {
        let _attached = cx.clone().attach();
        future.as_mut().poll(task)
    })
}

/// Span name for a request: method and path.
pub fn span_name<B>(request: &Request<B>) -> String {
    format!("{} {}", request.method(), request.uri().path())
}

/// Semantic-convention attributes known before the request is handled.
pub fn request_attributes<B>(request: &Request<B>) -> Vec<KeyValue> {
    let uri = request.uri();
    let mut attributes = vec![
        KeyValue::new(HTTP_REQUEST_METHOD, request.method().as_str().to_owned()),
        KeyValue::new(URL_PATH, uri.path().to_owned()),
        KeyValue::new(URL_SCHEME, uri.scheme_str().unwrap_or("http").to_owned()),
        KeyValue::new(NETWORK_PROTOCOL_VERSION, protocol_version(request.version())),
    ];

    if let Some(query) = uri.query() {
        attributes.push(KeyValue::new(URL_QUERY, query.to_owned()));
    }

    if let Some(agent) = request
        .headers()
        .get(axum::http::header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
    {
        attributes.push(KeyValue::new(USER_AGENT_ORIGINAL, agent.to_owned()));
    }

    attributes
}

fn protocol_version(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

// Server spans only count 5xx as errors; 4xx is the client's fault.
fn record_status(span: &opentelemetry::trace::SpanRef<'_>, status: StatusCode) {
    span.set_attribute(KeyValue::new(
        HTTP_RESPONSE_STATUS_CODE,
        i64::from(status.as_u16()),
    ));
    if status.is_server_error() {
        span.set_status(Status::error(status.to_string()));
    }
}

//! Incoming `sentry-trace` headers as OpenTelemetry parents.
//!
//! The Sentry propagator records the header for the span processor but does
//! not give the OpenTelemetry context a parent span, so neither the trace id
//! nor the upstream sampling decision would reach the sampler. An
//! [`IncomingTrace`] adds the upstream span as a remote parent and stays on
//! the context so the sampler can tell a deferred decision (no flag) from an
//! explicit one.

use std::str::FromStr;

use axum::http::HeaderMap;
use opentelemetry::trace::{SpanContext, SpanId, TraceContextExt, TraceFlags, TraceId, TraceState};
use opentelemetry::Context;
use thiserror::Error;

pub const SENTRY_TRACE_HEADER: &str = "sentry-trace";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("malformed sentry-trace header")]
pub struct ParseTraceError;

/// Parsed `{trace_id}-{span_id}[-{sampled}]` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncomingTrace {
    pub trace_id: TraceId,
    pub span_id: SpanId,
    pub sampled: Option<bool>,
}

impl FromStr for IncomingTrace {
    type Err = ParseTraceError;

    fn from_str(header: &str) -> Result<Self, Self::Err> {
        let mut parts = header.trim().split('-');

        let trace_id = parts
            .next()
            .filter(|part| part.len() == 32)
            .and_then(|part| TraceId::from_hex(part).ok())
            .filter(|id| *id != TraceId::INVALID)
            .ok_or(ParseTraceError)?;
        let span_id = parts
            .next()
            .filter(|part| part.len() == 16)
            .and_then(|part| SpanId::from_hex(part).ok())
            .filter(|id| *id != SpanId::INVALID)
            .ok_or(ParseTraceError)?;
        let sampled = match parts.next() {
            Some("1") => Some(true),
            Some("0") => Some(false),
            _ => None,
        };

        Ok(Self {
            trace_id,
            span_id,
            sampled,
        })
    }
}

impl IncomingTrace {
    /// Read and parse the `sentry-trace` header, if present and well formed.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        headers
            .get(SENTRY_TRACE_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse().ok())
    }

    /// `cx` with the upstream span as its remote parent.
    pub fn continue_from(self, cx: &Context) -> Context {
        let flags = if self.sampled == Some(true) {
            TraceFlags::SAMPLED
        } else {
            TraceFlags::default()
        };
        let remote = SpanContext::new(
            self.trace_id,
            self.span_id,
            flags,
            true,
            TraceState::default(),
        );
        cx.with_remote_span_context(remote).with_value(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRACE: &str = "4bf92f3577b34da6a3ce929d0e0e4736";
    const SPAN: &str = "00f067aa0ba902b7";

    #[test]
    fn parses_sampled_flag() {
        let sampled: IncomingTrace = format!("{TRACE}-{SPAN}-1").parse().unwrap();
        assert_eq!(sampled.trace_id, TraceId::from_hex(TRACE).unwrap());
        assert_eq!(sampled.span_id, SpanId::from_hex(SPAN).unwrap());
        assert_eq!(sampled.sampled, Some(true));

        let unsampled: IncomingTrace = format!("{TRACE}-{SPAN}-0").parse().unwrap();
        assert_eq!(unsampled.sampled, Some(false));

        let deferred: IncomingTrace = format!("{TRACE}-{SPAN}").parse().unwrap();
        assert_eq!(deferred.sampled, None);
    }

    #[test]
    fn rejects_malformed_headers() {
        for header in [
            "",
            "nonsense",
            "4bf92f35-00f067aa0ba902b7-1",
            "00000000000000000000000000000000-00f067aa0ba902b7-1",
            "4bf92f3577b34da6a3ce929d0e0e4736",
        ] {
            assert!(header.parse::<IncomingTrace>().is_err(), "{header:?}");
        }
    }

    #[test]
    fn remote_parent_carries_decision() {
        let incoming: IncomingTrace = format!("{TRACE}-{SPAN}-1").parse().unwrap();
        let cx = incoming.continue_from(&Context::new());

        let span = cx.span();
        let parent = span.span_context();
        assert!(parent.is_remote());
        assert!(parent.is_sampled());
        assert_eq!(parent.trace_id(), incoming.trace_id);
        assert_eq!(cx.get::<IncomingTrace>(), Some(&incoming));
    }

    #[test]
    fn reads_header_map() {
        let mut headers = HeaderMap::new();
        assert_eq!(IncomingTrace::from_headers(&headers), None);

        headers.insert(
            SENTRY_TRACE_HEADER,
            format!("{TRACE}-{SPAN}-0").parse().unwrap(),
        );
        let incoming = IncomingTrace::from_headers(&headers).unwrap();
        assert_eq!(incoming.sampled, Some(false));
    }
}

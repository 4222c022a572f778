//! Sampling driven by the Sentry client's trace sample rate.
//!
//! This sampler is the only sampling decision in the pipeline: the Sentry
//! client is configured to keep every transaction the span processor starts,
//! and the span processor only sees spans sampled here.

use opentelemetry::trace::{
    Link, SamplingDecision, SamplingResult, SpanKind, TraceContextExt, TraceId,
};
use opentelemetry::{Context, KeyValue};
use opentelemetry_sdk::trace::{Sampler, ShouldSample};

use crate::observability::sentry_trace::IncomingTrace;

/// Attribute recorded on root spans sampled by [`SentrySampler`].
pub const SAMPLE_RATE_ATTRIBUTE: &str = "sentry.sample_rate";

/// A sampler that follows the parent's decision when there is one and
/// otherwise samples by trace id with the Sentry `traces_sample_rate`.
///
/// A remote parent from a `sentry-trace` header without a sampled flag has
/// deferred the decision, so it is sampled like a root.
#[derive(Debug, Clone)]
pub struct SentrySampler {
    rate: f64,
    root: Sampler,
}

impl SentrySampler {
    /// Create a sampler for the given rate, clamped to `[0, 1]`.
    pub fn new(traces_sample_rate: f32) -> Self {
        let rate = f64::from(traces_sample_rate).clamp(0.0, 1.0);
        Self {
            rate,
            root: Sampler::TraceIdRatioBased(rate),
        }
    }

    /// Create a sampler using the rate configured on a Sentry client.
    pub fn from_client(client: &sentry::Client) -> Self {
        Self::new(client.options().traces_sample_rate)
    }

    /// The effective sample rate.
    pub fn rate(&self) -> f64 {
        self.rate
    }
}

impl ShouldSample for SentrySampler {
    fn should_sample(
        &self,
        parent_context: Option<&Context>,
        trace_id: TraceId,
        name: &str,
        span_kind: &SpanKind,
        attributes: &[KeyValue],
        links: &[Link],
    ) -> SamplingResult {
        if let Some(parent) = parent_context.filter(|cx| cx.has_active_span()) {
            let parent_span = parent.span();
            let span_context = parent_span.span_context();
            if !(span_context.is_remote() && deferred(parent)) {
                let decision = if span_context.is_sampled() {
                    SamplingDecision::RecordAndSample
                } else {
                    SamplingDecision::Drop
                };
                return SamplingResult {
                    decision,
                    attributes: Vec::new(),
                    trace_state: span_context.trace_state().clone(),
                };
            }
        }

        let mut result =
            self.root
                .should_sample(parent_context, trace_id, name, span_kind, attributes, links);
        if result.decision == SamplingDecision::RecordAndSample {
            result
                .attributes
                .push(KeyValue::new(SAMPLE_RATE_ATTRIBUTE, self.rate));
        }
        result
    }
}

fn deferred(cx: &Context) -> bool {
    cx.get::<IncomingTrace>()
        .is_some_and(|incoming| incoming.sampled.is_none())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use opentelemetry::propagation::TextMapPropagator;
    use opentelemetry::trace::{SpanContext, SpanId, TraceFlags, TraceState};
    use sentry_opentelemetry::SentryPropagator;

    fn root_decision(sampler: &SentrySampler, trace_id: u128) -> SamplingResult {
        sampler.should_sample(
            None,
            TraceId::from_u128(trace_id),
            "GET /",
            &SpanKind::Server,
            &[],
            &[],
        )
    }

    fn parent(flags: TraceFlags) -> Context {
        Context::new().with_remote_span_context(SpanContext::new(
            TraceId::from_u128(7),
            SpanId::from_u64(7),
            flags,
            true,
            TraceState::default(),
        ))
    }

    #[test]
    fn full_rate_samples_every_root() {
        let sampler = SentrySampler::new(1.0);
        for id in [1u128, u128::MAX / 3, u128::MAX] {
            let result = root_decision(&sampler, id);
            assert_eq!(result.decision, SamplingDecision::RecordAndSample);
            assert!(result
                .attributes
                .contains(&KeyValue::new(SAMPLE_RATE_ATTRIBUTE, 1.0)));
        }
    }

    #[test]
    fn zero_rate_drops_every_root() {
        let sampler = SentrySampler::new(0.0);
        for id in [1u128, u128::MAX / 3, u128::MAX] {
            let result = root_decision(&sampler, id);
            assert_eq!(result.decision, SamplingDecision::Drop);
            assert!(result.attributes.is_empty());
        }
    }

    #[test]
    fn parent_decision_wins() {
        let dropping = SentrySampler::new(0.0);
        let sampled_parent = parent(TraceFlags::SAMPLED);
        let result = dropping.should_sample(
            Some(&sampled_parent),
            TraceId::from_u128(7),
            "manual",
            &SpanKind::Internal,
            &[],
            &[],
        );
        assert_eq!(result.decision, SamplingDecision::RecordAndSample);

        let sampling = SentrySampler::new(1.0);
        let unsampled_parent = parent(TraceFlags::default());
        let result = sampling.should_sample(
            Some(&unsampled_parent),
            TraceId::from_u128(7),
            "manual",
            &SpanKind::Internal,
            &[],
            &[],
        );
        assert_eq!(result.decision, SamplingDecision::Drop);
    }

    #[test]
    fn rate_is_clamped() {
        assert_eq!(SentrySampler::new(4.0).rate(), 1.0);
        assert_eq!(SentrySampler::new(-1.0).rate(), 0.0);
    }

    #[test]
    fn empty_parent_context_counts_as_root() {
        let sampler = SentrySampler::new(1.0);
        let cx = Context::new();
        let result = sampler.should_sample(
            Some(&cx),
            TraceId::from_u128(42),
            "GET /",
            &SpanKind::Server,
            &[],
            &[],
        );
        assert_eq!(result.decision, SamplingDecision::RecordAndSample);
    }

    // Context the server layer builds for a request carrying `header`.
    fn from_sentry_trace(header: &str) -> Context {
        let headers = HashMap::from([("sentry-trace".to_string(), header.to_string())]);
        let cx = SentryPropagator::new().extract(&headers);
        let incoming: IncomingTrace = header.parse().unwrap();
        incoming.continue_from(&cx)
    }

    fn decide(sampler: &SentrySampler, cx: &Context) -> SamplingDecision {
        sampler
            .should_sample(
                Some(cx),
                TraceId::from_u128(7),
                "GET /",
                &SpanKind::Server,
                &[],
                &[],
            )
            .decision
    }

    #[test]
    fn upstream_sentry_decision_wins() {
        let sampled = from_sentry_trace("4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-1");
        assert_eq!(
            decide(&SentrySampler::new(0.0), &sampled),
            SamplingDecision::RecordAndSample
        );

        let unsampled = from_sentry_trace("4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-0");
        assert_eq!(
            decide(&SentrySampler::new(1.0), &unsampled),
            SamplingDecision::Drop
        );
    }

    #[test]
    fn deferred_upstream_decision_uses_rate() {
        let deferred = from_sentry_trace("4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7");
        assert_eq!(
            decide(&SentrySampler::new(1.0), &deferred),
            SamplingDecision::RecordAndSample
        );
        assert_eq!(
            decide(&SentrySampler::new(0.0), &deferred),
            SamplingDecision::Drop
        );
    }
}

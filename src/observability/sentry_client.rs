//! Sentry client initialization.
//!
//! Sentry must be initialized before any OpenTelemetry component is built:
//! the span processor and sampler read the client bound to the current hub.
//!
//! Transactions built from OpenTelemetry spans are never transmitted. The
//! client's transport is wrapped in [`DropTransactions`], which logs each
//! transaction and strips it from the envelope before the envelope reaches
//! the network. Errors and messages pass through untouched.

use std::sync::Arc;
use std::time::Duration;

use sentry::protocol::{Envelope, EnvelopeItem, Transaction};
use sentry::transports::DefaultTransportFactory;
use sentry::{ClientInitGuard, ClientOptions, TransactionContext, Transport, TransportFactory};

use crate::config::SentryConfig;

/// Build client options from config.
///
/// When `otel_sampling` is set the OpenTelemetry sampler has already decided
/// which spans exist, so the client keeps every transaction handed to it
/// instead of sampling a second time.
pub fn client_options(config: &SentryConfig, otel_sampling: bool) -> ClientOptions {
    let mut options = ClientOptions {
        dsn: config.dsn.as_deref().and_then(|dsn| dsn.parse().ok()),
        debug: config.debug,
        release: config
            .release
            .clone()
            .map(Into::into)
            .or_else(|| sentry::release_name!()),
        environment: config.environment.clone().map(Into::into),
        traces_sample_rate: config.traces_sample_rate,
        transport: Some(Arc::new(DropTransactionsFactory::default())),
        ..Default::default()
    };

    if otel_sampling {
        options.traces_sampler = Some(Arc::new(keep_sampled_span));
    }

    options
}

// Unsampled spans never reach the span processor.
fn keep_sampled_span(_: &TransactionContext) -> f32 {
    1.0
}

/// Initialize the Sentry client and bind it to the current hub.
///
/// The returned guard flushes pending events when dropped and must be kept
/// alive for the lifetime of the process.
pub fn init_sentry(config: &SentryConfig, otel_sampling: bool) -> ClientInitGuard {
    let guard = sentry::init(client_options(config, otel_sampling));

    if guard.is_enabled() {
        tracing::info!(
            traces_sample_rate = config.traces_sample_rate,
            otel_sampling,
            "Sentry initialized"
        );
    } else {
        tracing::warn!("Sentry client disabled (no DSN configured)");
    }

    guard
}

/// Log a transaction that is about to be discarded.
pub fn drop_transaction(transaction: &Transaction<'static>) {
    tracing::info!(
        name = transaction.name.as_deref().unwrap_or("<unnamed>"),
        event_id = %transaction.event_id,
        spans = transaction.spans.len(),
        "Transaction captured, not sending"
    );

    match serde_json::to_string(transaction) {
        Ok(payload) => tracing::debug!(%payload, "Transaction payload"),
        Err(e) => tracing::warn!(error = %e, "Failed to serialize transaction"),
    }
}

/// Transport wrapper that removes transaction items from every envelope.
///
/// Envelopes left empty are not forwarded at all.
pub struct DropTransactions {
    inner: Arc<dyn Transport>,
}

impl DropTransactions {
    pub fn new(inner: Arc<dyn Transport>) -> Self {
        Self { inner }
    }
}

impl Transport for DropTransactions {
    fn send_envelope(&self, envelope: Envelope) {
        for item in envelope.items() {
            if let EnvelopeItem::Transaction(transaction) = item {
                drop_transaction(transaction);
            }
        }

        if let Some(envelope) =
            envelope.filter(|item| !matches!(item, EnvelopeItem::Transaction(_)))
        {
            self.inner.send_envelope(envelope);
        }
    }

    fn flush(&self, timeout: Duration) -> bool {
        self.inner.flush(timeout)
    }

    fn shutdown(&self, timeout: Duration) -> bool {
        self.inner.shutdown(timeout)
    }
}

/// Creates a [`DropTransactions`] around the transport of another factory.
#[derive(Clone)]
pub struct DropTransactionsFactory {
    inner: Arc<dyn TransportFactory>,
}

impl DropTransactionsFactory {
    pub fn new(inner: Arc<dyn TransportFactory>) -> Self {
        Self { inner }
    }
}

impl Default for DropTransactionsFactory {
    fn default() -> Self {
        Self::new(Arc::new(DefaultTransportFactory))
    }
}

impl TransportFactory for DropTransactionsFactory {
    fn create_transport(&self, options: &ClientOptions) -> Arc<dyn Transport> {
        Arc::new(DropTransactions::new(self.inner.create_transport(options)))
    }
}

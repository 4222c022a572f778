//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize telemetry in dependency order
//! - Bind the listener and begin accepting traffic
//! - Flush telemetry after the server stops
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Sentry before OpenTelemetry: the sampler and span processor read the
//!   Sentry client from the current hub
//! - Listener binds last (traffic only when telemetry is ready)

use opentelemetry_sdk::trace::SdkTracerProvider;
use sentry::ClientInitGuard;
use tokio::net::TcpListener;

use crate::config::{ListenerConfig, ServiceConfig};
use crate::error::StartupError;
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::otel::{self, TracerSetup};
use crate::observability::setup_check::{self, SetupIssue, SetupReport};
use crate::observability::{logging, sentry_client};

/// Process-wide telemetry handles, created once and torn down once.
pub struct Telemetry {
    provider: SdkTracerProvider,
    report: SetupReport,
    issues: Vec<SetupIssue>,
    _sentry: ClientInitGuard,
}

impl Telemetry {
    /// The registered tracer provider.
    pub fn provider(&self) -> &SdkTracerProvider {
        &self.provider
    }

    /// What was installed during startup.
    pub fn report(&self) -> SetupReport {
        self.report
    }

    /// Problems found by the setup check.
    pub fn issues(&self) -> &[SetupIssue] {
        &self.issues
    }

    /// Flush spans, then drop the Sentry guard which flushes queued events.
    pub fn shutdown(self) {
        if let Err(e) = self.provider.shutdown() {
            tracing::warn!(error = %e, "Failed to shut down tracer provider");
        }
        tracing::info!("Telemetry flushed");
    }
}

/// Initialize logging, Sentry and OpenTelemetry, in that order, then
/// validate that they are wired together.
pub fn init_telemetry(config: &ServiceConfig) -> Result<Telemetry, StartupError> {
    logging::init_logging(&config.logging)?;

    let sentry_guard = sentry_client::init_sentry(&config.sentry, config.otel.sentry_sampler);
    let client = sentry::Hub::current()
        .client()
        .filter(|client| client.is_enabled());

    let TracerSetup { provider, report } =
        otel::init_tracer_provider(&config.otel, client.as_deref());

    let issues = setup_check::validate_setup(&report);

    Ok(Telemetry {
        provider,
        report,
        issues,
        _sentry: sentry_guard,
    })
}

/// Bind the TCP listener for the configured address.
pub async fn bind(config: &ListenerConfig) -> Result<TcpListener, StartupError> {
    let address = config.bind_address();
    TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind { address, source })
}

/// Run the service until a termination signal arrives.
///
/// Telemetry is flushed on every exit after initialization, including a
/// failed bind.
pub async fn run(config: ServiceConfig) -> Result<(), StartupError> {
    let telemetry = init_telemetry(&config)?;

    tracing::info!(
        host = %config.listener.host,
        port = config.listener.port,
        service_name = %config.otel.service_name,
        "Configuration loaded"
    );

    let result = serve(&config, telemetry.provider()).await;
    if let Err(e) = &result {
        tracing::error!(error = %e, "Server stopped with an error");
    }

    telemetry.shutdown();
    result
}

/// Bind, then serve until a termination signal arrives.
async fn serve(config: &ServiceConfig, provider: &SdkTracerProvider) -> Result<(), StartupError> {
    let listener = bind(&config.listener).await?;
    let server = HttpServer::new(provider, &config.otel);

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        shutdown.trigger();
    });

    tracing::info!(
        "Server running at http://{}:{}/",
        config.listener.host,
        config.listener.port
    );

    server
        .run(listener, server_shutdown)
        .await
        .map_err(StartupError::Serve)
}

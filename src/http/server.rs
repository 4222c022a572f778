//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the greeting handler on every path
//! - Wire up middleware (OpenTelemetry server spans, request logging)
//! - Bind server to listener
//! - Stop on the shutdown signal

use axum::{routing::any, Router};
use opentelemetry::trace::TracerProvider;
use opentelemetry_sdk::trace::{SdkTracer, SdkTracerProvider};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::OtelConfig;
use crate::http::handlers::hello;
use crate::observability::instrumentation::{HttpTraceLayer, INSTRUMENTATION_NAME};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Tracer for spans opened by handlers.
    pub tracer: SdkTracer,
}

/// HTTP server for the example service.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server whose spans go to `provider`.
    pub fn new(provider: &SdkTracerProvider, config: &OtelConfig) -> Self {
        let state = AppState {
            tracer: provider.tracer(config.tracer_name.clone()),
        };
        let instrumentation = HttpTraceLayer::new(provider.tracer(INSTRUMENTATION_NAME));

        Self {
            router: Self::build_router(state, instrumentation),
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState, instrumentation: HttpTraceLayer) -> Router {
        Router::new()
            .route("/", any(hello))
            .route("/{*path}", any(hello))
            .with_state(state)
            .layer(instrumentation)
            .layer(TraceLayer::new_for_http())
    }

    /// The fully layered router, for driving the service without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

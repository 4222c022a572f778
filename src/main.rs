//! Sentry + OpenTelemetry HTTP example.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request       ┌──────────────────────────────────────────────┐
//!     ─────────────────────┼─▶ TraceLayer ─▶ HttpTraceLayer ─▶ hello()   │
//!                          │   (logs)        (server span,     ("manual"  │
//!     ◀────────────────────┼── 200 text/plain Sentry hub)       span)     │
//!                          │                                              │
//!                          │   SdkTracerProvider                          │
//!                          │     ├─ SentrySampler                         │
//!                          │     ├─ SentrySpanProcessor ─▶ Sentry client  │
//!                          │     │                        (transactions   │
//!                          │     │                         dropped)       │
//!                          │     └─ SimpleSpanProcessor ─▶ stdout         │
//!                          └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use sentry_otel_http::config::{resolve_config, ConfigOverrides};
use sentry_otel_http::lifecycle;

#[derive(Parser)]
#[command(name = "sentry-otel-http")]
#[command(about = "Hello-world HTTP server traced with Sentry and OpenTelemetry", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host to bind (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// Sentry DSN (overrides config).
    #[arg(long)]
    dsn: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = resolve_config(
        cli.config.as_deref(),
        ConfigOverrides {
            host: cli.host,
            port: cli.port,
            dsn: cli.dsn,
        },
    )?;

    lifecycle::run(config).await?;
    Ok(())
}

//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → observability::instrumentation (server span)
//!     → handlers.rs (manual span, static response)
//!     → Send to client
//! ```

pub mod handlers;
pub mod server;

pub use handlers::{HELLO_BODY, MANUAL_SPAN_NAME};
pub use server::{AppState, HttpServer};

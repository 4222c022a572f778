//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, apply CLI overrides)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!     → handed to startup once
//! ```
//!
//! # Design Decisions
//! - All fields have defaults; running with no file is supported
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{resolve_config, ConfigOverrides};
pub use schema::{ListenerConfig, LoggingConfig, OtelConfig, SentryConfig, ServiceConfig};

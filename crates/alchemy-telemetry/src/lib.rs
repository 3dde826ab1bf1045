//! Logging for Alchemy.
//!
//! Alchemy libraries emit `tracing` events (route registration, resolution
//! misses, table swaps, context derivation, field conversion). This crate
//! installs a `tracing-subscriber` pipeline for applications that want to
//! see them:
//!
//! - **JSON output** for production log shippers
//! - **Pretty output** for local development
//! - **`EnvFilter` directives** such as `info,alchemy_router=trace`
//!
//! # Example
//!
//! ```rust,no_run
//! use alchemy_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development()).unwrap();
//! tracing::info!(route = "Home", "router ready");
//! ```

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig};

/// Result type alias for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

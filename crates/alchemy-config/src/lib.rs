//! Typed configuration for Alchemy.
//!
//! This crate loads route tables and logging settings from:
//! - TOML and JSON files or strings
//! - A `.env` file
//! - `PREFIX__SECTION__KEY` environment variables
//!
//! Unknown fields are rejected and [`ConfigLoader::load`] validates the
//! result, compiling every configured route once so template errors surface
//! at startup.
//!
//! # Example
//!
//! ```no_run
//! use alchemy_config::ConfigLoader;
//!
//! # fn main() -> Result<(), alchemy_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_file("alchemy.toml")?
//!     .with_dotenv()?
//!     .with_env_prefix("ALCHEMY")
//!     .load()?;
//!
//! let router = config.router.build_router()?;
//! println!("{} routes loaded", router.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [router]
//! case_sensitive = true
//! strict_trailing_slash = false
//!
//! [[router.routes]]
//! name = "Home"
//! paths = "/"
//! handler = "Pages#home"
//!
//! [[router.routes]]
//! name = "Product"
//! paths = { en = "/product/{id}", nl = "/product/{id}" }
//! methods = ["GET", "HEAD"]
//! handler = "Products#show"
//! weight = 10
//!
//! [logging]
//! level = "info,alchemy_router=debug"
//! json_format = true
//! ```
//!
//! # Environment Variable Overrides
//!
//! - `ALCHEMY__ROUTER__CASE_SENSITIVE=false`
//! - `ALCHEMY__ROUTER__STRICT_TRAILING_SLASH=true`
//! - `ALCHEMY__LOGGING__LEVEL=debug`
//! - `ALCHEMY__LOGGING__JSON_FORMAT=false`

mod config;
mod error;
mod loader;

pub use config::{AlchemyConfig, LoggingConfig, RouteConfig, RoutePaths, RouterConfig};
pub use error::ConfigError;
pub use loader::ConfigLoader;

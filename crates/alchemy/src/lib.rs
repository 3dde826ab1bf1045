//! # Alchemy
//!
//! **Routing and operational contexts for a model-driven web framework**
//!
//! - **Named Routes** – weighted path templates, per-prefix variants, middleware routes
//! - **Operational Contexts** – parent-linked property bags with typed accessors
//! - **Document Conversion** – schema-aware, asynchronous field converters
//! - **Typed Configuration** – route tables and logging from TOML, JSON and the environment
//!
//! ## Quick Start
//!
//! ```rust
//! use alchemy::prelude::*;
//! use http::Method;
//!
//! let mut router = Router::new();
//! router
//!     .add(RouteDefinition::new("Product").path("/product/{id}").handler("Products#show"))
//!     .unwrap();
//!
//! let found = router.match_route(&Method::GET, "/product/7", None).unwrap();
//! assert_eq!(found.controller(), Some("Products"));
//! assert_eq!(found.action(), Some("show"));
//! ```
//!
//! ## Architecture
//!
//! ```text
//! AlchemyConfig ──► Router ──► SharedRouter (hot swap)
//!                     │
//! request ──► resolve ┴──► RouteMatch ──► controller#action / direct handler
//!                                                 │
//!                          DocumentContext ◄──────┘
//!                                 │
//!                          FieldContext ──► FieldConverter
//! ```

#![doc(html_root_url = "https://docs.rs/alchemy/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export router types
pub use alchemy_router as router;

// Re-export context types
pub use alchemy_context as context;

// Re-export configuration types
pub use alchemy_config as config;

// Re-export logging setup
pub use alchemy_telemetry as telemetry;

// Re-export the property declaration macro
pub use alchemy_context::context_properties;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use alchemy::prelude::*;
///
/// let ctx = BaseContext::new();
/// ctx.set("locale", "nl".to_string());
/// assert_eq!(ctx.create_child().get::<String>("locale").as_deref().map(String::as_str), Some("nl"));
/// ```
pub mod prelude {
    pub use alchemy_router::{
        DispatchTarget, Params, PathOptions, Resolution, Route, RouteDefinition, RouteHandler,
        RouteMatch, Router, RouterError, RouterResult, SharedRouter,
    };

    pub use alchemy_context::{
        context_properties, convert_record, BaseContext, ContextData, ContextError,
        ContextResult, ConversionContext, ConverterRegistry, Datasource, Direction,
        DocumentContext, Field, FieldContext, FieldConverter, Model, OperationalContext, Schema,
    };

    pub use alchemy_config::{AlchemyConfig, ConfigError, ConfigLoader};

    pub use alchemy_telemetry::{init_logging, LogConfig};
}

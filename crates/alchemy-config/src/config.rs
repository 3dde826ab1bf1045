//! Configuration types.
//!
//! This module provides the top-level [`AlchemyConfig`] struct and its
//! sections.

use alchemy_router::{PathOptions, RouteDefinition, Router};
use alchemy_telemetry::{create_env_filter, LogConfig};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Complete Alchemy configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load configuration from files
/// and environment variables.
///
/// # Example
///
/// ```
/// use alchemy_config::AlchemyConfig;
///
/// let config = AlchemyConfig::default();
/// assert!(config.router.case_sensitive);
/// assert!(config.router.routes.is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct AlchemyConfig {
    /// Route table configuration.
    #[serde(default)]
    pub router: RouterConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AlchemyConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The log filter directive does not parse
    /// - A route has an empty name or no paths
    /// - The routes cannot be compiled into a [`Router`]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if create_env_filter(&self.logging.level).is_err() {
            return Err(ConfigError::invalid_value(
                "logging.level",
                format!("invalid filter directive: {}", self.logging.level),
            ));
        }

        for (index, route) in self.router.routes.iter().enumerate() {
            if route.name.trim().is_empty() {
                return Err(ConfigError::invalid_value(
                    format!("router.routes[{index}].name"),
                    "must not be empty",
                ));
            }
            if route.paths.is_empty() {
                return Err(ConfigError::invalid_value(
                    format!("router.routes[{index}].paths"),
                    format!("route `{}` needs at least one path", route.name),
                ));
            }
        }

        self.router.build_router().map(|_| ())
    }

    /// Create a development configuration preset.
    ///
    /// Pretty, verbose logs with source locations.
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();
        config.logging.level = "debug".to_string();
        config.logging.json_format = false;
        config.logging.span_events = true;
        config.logging.file_line_info = true;
        config
    }

    /// Create a production configuration preset.
    ///
    /// JSON logs at `info` and strict trailing slash handling.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();
        config.logging.level = "info".to_string();
        config.logging.json_format = true;
        config.router.strict_trailing_slash = true;
        config
    }
}

/// Route table configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct RouterConfig {
    /// Whether literal path characters match case-sensitively.
    pub case_sensitive: bool,

    /// Whether `/users/` and `/users` are distinct.
    pub strict_trailing_slash: bool,

    /// Routes, registered in order.
    pub routes: Vec<RouteConfig>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        let options = PathOptions::default();
        Self {
            case_sensitive: options.case_sensitive,
            strict_trailing_slash: options.strict_trailing_slash,
            routes: Vec::new(),
        }
    }
}

impl RouterConfig {
    /// Path options for the router built from this section.
    #[must_use]
    pub const fn path_options(&self) -> PathOptions {
        PathOptions {
            case_sensitive: self.case_sensitive,
            strict_trailing_slash: self.strict_trailing_slash,
        }
    }

    /// Build a router holding every configured route, in order.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Router` if a route fails to register.
    pub fn build_router(&self) -> Result<Router, ConfigError> {
        let mut router = Router::with_options(self.path_options());
        for route in &self.routes {
            router.add(route.to_definition())?;
        }
        tracing::debug!(routes = router.len(), "router built from configuration");
        Ok(router)
    }
}

/// A single configured route.
///
/// ```toml
/// [[router.routes]]
/// name = "Product"
/// paths = { en = "/product/{id}", nl = "/product/{id}" }
/// methods = ["GET"]
/// handler = "Products#show"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RouteConfig {
    /// Unique route name.
    pub name: String,

    /// One template, or one template per prefix.
    pub paths: RoutePaths,

    /// Allowed methods, case-insensitive. Empty means `GET` only.
    #[serde(default)]
    pub methods: Vec<String>,

    /// Handler in `Controller#action` form.
    #[serde(default)]
    pub handler: Option<String>,

    /// Explicit weight; defaults to the template specificity.
    #[serde(default)]
    pub weight: Option<i32>,

    /// Whether the route is middleware.
    #[serde(default)]
    pub middleware: bool,
}

impl RouteConfig {
    /// Convert into a router definition.
    #[must_use]
    pub fn to_definition(&self) -> RouteDefinition {
        let mut definition = match &self.paths {
            RoutePaths::Single(template) => RouteDefinition::new(&self.name).path(template),
            RoutePaths::Prefixed(templates) => templates.iter().fold(
                RouteDefinition::new(&self.name),
                |definition, (prefix, template)| definition.prefixed_path(prefix, template),
            ),
        }
        .methods(self.methods.iter().cloned())
        .middleware(self.middleware);

        if let Some(handler) = &self.handler {
            definition = definition.handler(handler);
        }
        if let Some(weight) = self.weight {
            definition = definition.weight(weight);
        }
        definition
    }
}

/// Path templates of a configured route.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum RoutePaths {
    /// A single template registered without a prefix.
    Single(String),
    /// Templates keyed by prefix. The empty key means no prefix.
    Prefixed(IndexMap<String, String>),
}

impl RoutePaths {
    /// Returns true if no template is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Single(template) => template.is_empty(),
            Self::Prefixed(templates) => templates.is_empty(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct LoggingConfig {
    /// Whether logging is enabled.
    pub enabled: bool,

    /// Filter directive, e.g. `info,alchemy_router=debug`.
    pub level: String,

    /// JSON output instead of pretty output.
    pub json_format: bool,

    /// Log span open and close events.
    pub span_events: bool,

    /// Include file and line.
    pub file_line_info: bool,

    /// Include thread IDs.
    pub thread_ids: bool,

    /// Include the event target.
    pub include_target: bool,

    /// Service name reported when logging is initialized.
    pub service_name: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::from(LogConfig::default())
    }
}

impl From<LogConfig> for LoggingConfig {
    fn from(config: LogConfig) -> Self {
        Self {
            enabled: config.enabled,
            level: config.level,
            json_format: config.json_format,
            span_events: config.span_events,
            file_line_info: config.file_line_info,
            thread_ids: config.thread_ids,
            include_target: config.include_target,
            service_name: config.service_name,
        }
    }
}

impl From<&LoggingConfig> for LogConfig {
    fn from(config: &LoggingConfig) -> Self {
        Self {
            enabled: config.enabled,
            level: config.level.clone(),
            json_format: config.json_format,
            span_events: config.span_events,
            file_line_info: config.file_line_info,
            thread_ids: config.thread_ids,
            include_target: config.include_target,
            service_name: config.service_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(name: &str, template: &str) -> RouteConfig {
        RouteConfig {
            name: name.to_string(),
            paths: RoutePaths::Single(template.to_string()),
            methods: Vec::new(),
            handler: None,
            weight: None,
            middleware: false,
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = AlchemyConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.router.path_options(), PathOptions::default());
    }

    #[test]
    fn test_development_preset() {
        let config = AlchemyConfig::development();
        assert_eq!(config.logging.level, "debug");
        assert!(!config.logging.json_format);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_production_preset() {
        let config = AlchemyConfig::production();
        assert!(config.logging.json_format);
        assert!(config.router.strict_trailing_slash);
    }

    #[test]
    fn test_logging_round_trip_through_telemetry() {
        let logging = LoggingConfig::from(LogConfig::development());
        let back = LogConfig::from(&logging);
        assert_eq!(back, LogConfig::development());
    }

    #[test]
    fn test_validate_rejects_bad_filter() {
        let mut config = AlchemyConfig::default();
        config.logging.level = "alchemy_router=notalevel".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field, .. }) if field == "logging.level"
        ));
    }

    #[test]
    fn test_validate_rejects_empty_route_name() {
        let mut config = AlchemyConfig::default();
        config.router.routes.push(route("  ", "/"));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field, .. }) if field == "router.routes[0].name"
        ));
    }

    #[test]
    fn test_validate_rejects_missing_paths() {
        let mut config = AlchemyConfig::default();
        let mut empty = route("Empty", "/");
        empty.paths = RoutePaths::Prefixed(IndexMap::new());
        config.router.routes.push(empty);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field, .. }) if field == "router.routes[0].paths"
        ));
    }

    #[test]
    fn test_validate_rejects_duplicate_routes() {
        let mut config = AlchemyConfig::default();
        config.router.routes.push(route("Home", "/"));
        config.router.routes.push(route("Home", "/home"));
        assert!(matches!(config.validate(), Err(ConfigError::Router(_))));
    }

    #[test]
    fn test_build_router_keeps_order_and_options() {
        let mut config = RouterConfig {
            case_sensitive: false,
            ..RouterConfig::default()
        };
        config.routes.push(route("Home", "/"));
        let mut item = route("Item", "/item/{id}");
        item.handler = Some("Items#show".to_string());
        item.weight = Some(7);
        config.routes.push(item);

        let router = config.build_router().unwrap();
        let names: Vec<_> = router.routes().map(|r| r.name()).collect();
        assert_eq!(names, ["Home", "Item"]);
        assert!(!router.options().case_sensitive);
        assert_eq!(router.get("Item").map(|r| r.weight()), Some(7));
    }

    #[test]
    fn test_prefixed_paths_become_prefixes() {
        let mut templates = IndexMap::new();
        templates.insert("en".to_string(), "/about".to_string());
        templates.insert("nl".to_string(), "/over-ons".to_string());
        let mut about = route("About", "/");
        about.paths = RoutePaths::Prefixed(templates);

        let config = RouterConfig {
            routes: vec![about],
            ..RouterConfig::default()
        };
        let router = config.build_router().unwrap();
        let prefixes: Vec<_> = router.prefixes().collect();
        assert_eq!(prefixes, ["en", "nl"]);
    }
}

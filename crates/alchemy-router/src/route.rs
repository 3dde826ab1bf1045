//! Route definitions and compiled routes.
//!
//! A [`RouteDefinition`] is the registration-time description of a route; a
//! [`Route`] is the compiled form held by the [`Router`](crate::Router).
//! Compiling a definition parses its methods, its handler string and every
//! path template, so any mistake is reported when the route is added.

use std::fmt;
use std::sync::Arc;

use http::Method;
use indexmap::IndexMap;
use serde_json::Value;

use crate::error::{RouterError, RouterResult};
use crate::method::MethodSet;
use crate::params::Params;
use crate::pattern::{CompiledPath, PathOptions};

/// A directly callable route handler.
pub type HandlerFn = Arc<dyn Fn(&Params) -> Value + Send + Sync>;

/// What a route dispatches to.
#[derive(Clone)]
pub enum RouteHandler {
    /// A callable invoked with the captured parameters.
    Direct(HandlerFn),
    /// A controller action, resolved by the caller.
    ControllerAction {
        /// Controller name, e.g. `Blog`.
        controller: String,
        /// Action name, e.g. `show`.
        action: String,
    },
}

impl fmt::Debug for RouteHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct(_) => f.write_str("Direct(..)"),
            Self::ControllerAction { controller, action } => f
                .debug_struct("ControllerAction")
                .field("controller", controller)
                .field("action", action)
                .finish(),
        }
    }
}

impl RouteHandler {
    /// Parses a `Controller#action` string.
    ///
    /// # Example
    ///
    /// ```rust
    /// use alchemy_router::RouteHandler;
    ///
    /// let handler = RouteHandler::parse("Blog#show").unwrap();
    /// assert_eq!(handler.controller(), Some("Blog"));
    /// assert_eq!(handler.action(), Some("show"));
    ///
    /// assert!(RouteHandler::parse("Blog").is_err());
    /// ```
    pub fn parse(handler: &str) -> RouterResult<Self> {
        let (controller, action) = handler
            .split_once('#')
            .ok_or_else(|| RouterError::invalid_handler(handler))?;
        let controller = controller.trim();
        let action = action.trim();
        if controller.is_empty() || action.is_empty() || action.contains('#') {
            return Err(RouterError::invalid_handler(handler));
        }
        Ok(Self::ControllerAction {
            controller: controller.to_string(),
            action: action.to_string(),
        })
    }

    /// Wraps a closure as a direct handler.
    pub fn direct<F>(handler: F) -> Self
    where
        F: Fn(&Params) -> Value + Send + Sync + 'static,
    {
        Self::Direct(Arc::new(handler))
    }

    /// Returns the controller name for controller actions.
    #[must_use]
    pub fn controller(&self) -> Option<&str> {
        match self {
            Self::ControllerAction { controller, .. } => Some(controller),
            Self::Direct(_) => None,
        }
    }

    /// Returns the action name for controller actions.
    #[must_use]
    pub fn action(&self) -> Option<&str> {
        match self {
            Self::ControllerAction { action, .. } => Some(action),
            Self::Direct(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
enum HandlerSpec {
    Parsed(RouteHandler),
    Unparsed(String),
}

/// Registration-time description of a route.
///
/// # Example
///
/// ```rust
/// use alchemy_router::RouteDefinition;
///
/// let definition = RouteDefinition::new("APIResource")
///     .path("/api/{action}")
///     .prefixed_path("nl", "/api/{action}")
///     .methods(["get", "post"])
///     .handler("Api#dispatch")
///     .weight(10);
///
/// assert_eq!(definition.name(), "APIResource");
/// ```
#[derive(Debug, Clone)]
pub struct RouteDefinition {
    name: String,
    paths: Vec<(String, String)>,
    methods: Vec<String>,
    handler: Option<HandlerSpec>,
    weight: Option<i32>,
    middleware: bool,
}

impl RouteDefinition {
    /// Starts a definition for the named route.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            paths: Vec::new(),
            methods: Vec::new(),
            handler: None,
            weight: None,
            middleware: false,
        }
    }

    /// Returns the route name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds a template registered without a prefix.
    #[must_use]
    pub fn path(self, template: impl Into<String>) -> Self {
        self.prefixed_path("", template)
    }

    /// Adds a template registered under a URL prefix such as a locale.
    #[must_use]
    pub fn prefixed_path(mut self, prefix: impl Into<String>, template: impl Into<String>) -> Self {
        self.paths.push((prefix.into(), template.into()));
        self
    }

    /// Adds methods by name, ignoring case.
    #[must_use]
    pub fn methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.methods.extend(methods.into_iter().map(Into::into));
        self
    }

    /// Adds a single method.
    #[must_use]
    pub fn method(mut self, method: &Method) -> Self {
        self.methods.push(method.as_str().to_string());
        self
    }

    /// Sets a `Controller#action` handler; parsed when the route is added.
    #[must_use]
    pub fn handler(mut self, handler: impl Into<String>) -> Self {
        self.handler = Some(HandlerSpec::Unparsed(handler.into()));
        self
    }

    /// Sets an already-built handler.
    #[must_use]
    pub fn route_handler(mut self, handler: RouteHandler) -> Self {
        self.handler = Some(HandlerSpec::Parsed(handler));
        self
    }

    /// Sets a controller action handler from its parts.
    #[must_use]
    pub fn controller_action(
        self,
        controller: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        self.route_handler(RouteHandler::ControllerAction {
            controller: controller.into(),
            action: action.into(),
        })
    }

    /// Sets a direct callable handler.
    #[must_use]
    pub fn direct<F>(self, handler: F) -> Self
    where
        F: Fn(&Params) -> Value + Send + Sync + 'static,
    {
        self.route_handler(RouteHandler::direct(handler))
    }

    /// Sets an explicit weight. Higher weights win ties between matches.
    #[must_use]
    pub fn weight(mut self, weight: i32) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Marks the route as middleware.
    #[must_use]
    pub fn middleware(mut self, is_middleware: bool) -> Self {
        self.middleware = is_middleware;
        self
    }
}

/// A compiled route.
#[derive(Debug, Clone)]
pub struct Route {
    name: String,
    paths: IndexMap<String, CompiledPath>,
    methods: MethodSet,
    handler: Option<RouteHandler>,
    weight: i32,
    is_middleware: bool,
}

impl Route {
    /// Compiles a definition.
    ///
    /// When no weight is given the route weighs as much as its most specific
    /// path (see [`CompiledPath::specificity`]).
    pub fn compile(definition: RouteDefinition, options: PathOptions) -> RouterResult<Self> {
        let RouteDefinition {
            name,
            paths: templates,
            methods,
            handler,
            weight,
            middleware,
        } = definition;

        if name.trim().is_empty() {
            return Err(RouterError::EmptyName);
        }
        if templates.is_empty() {
            return Err(RouterError::NoPaths { route: name });
        }

        let methods = MethodSet::parse(&methods)?;

        let handler = match handler {
            Some(HandlerSpec::Parsed(handler)) => Some(handler),
            Some(HandlerSpec::Unparsed(raw)) => Some(RouteHandler::parse(&raw)?),
            None => None,
        };

        let mut paths = IndexMap::with_capacity(templates.len());
        for (prefix, template) in templates {
            let compiled = CompiledPath::compile_with(&template, options)
                .map_err(|source| RouterError::compilation(name.as_str(), source))?;
            paths.insert(normalize_prefix(&prefix).to_string(), compiled);
        }

        let weight = weight.unwrap_or_else(|| {
            paths
                .values()
                .map(CompiledPath::specificity)
                .max()
                .unwrap_or_default()
        });

        Ok(Self {
            name,
            paths,
            methods,
            handler,
            weight,
            is_middleware: middleware,
        })
    }

    /// Returns the route name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the methods this route answers.
    #[must_use]
    pub const fn methods(&self) -> &MethodSet {
        &self.methods
    }

    /// Returns true if this route answers `method`.
    #[must_use]
    pub fn allows(&self, method: &Method) -> bool {
        self.methods.contains(method)
    }

    /// Returns the route weight.
    #[must_use]
    pub const fn weight(&self) -> i32 {
        self.weight
    }

    /// Returns true for middleware routes.
    #[must_use]
    pub const fn is_middleware(&self) -> bool {
        self.is_middleware
    }

    /// Returns the handler, failing if the route was registered without one.
    pub fn handler(&self) -> RouterResult<&RouteHandler> {
        self.handler
            .as_ref()
            .ok_or_else(|| RouterError::missing_handler(self.name.as_str()))
    }

    /// Returns true if the route has a handler.
    #[must_use]
    pub const fn has_handler(&self) -> bool {
        self.handler.is_some()
    }

    /// Returns the compiled path registered for `prefix` (`""` for none).
    #[must_use]
    pub fn path_for(&self, prefix: &str) -> Option<&CompiledPath> {
        self.paths.get(normalize_prefix(prefix))
    }

    /// Iterates over the prefixes this route is registered under.
    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.paths.keys().map(String::as_str)
    }

    /// Tests `path` against the template registered for `prefix`.
    ///
    /// Returns `None` if nothing is registered for that prefix or the path
    /// does not match.
    #[must_use]
    pub fn match_path(&self, path: &str, prefix: &str) -> Option<Params> {
        self.path_for(prefix)?.test(path)
    }

    /// Builds a URL for this route under `prefix`.
    ///
    /// Prefixed URLs start with `/{prefix}`.
    #[must_use]
    pub fn url_for(&self, params: &Params, prefix: &str) -> Option<String> {
        let prefix = normalize_prefix(prefix);
        let path = self.path_for(prefix)?.generate(params)?;
        if prefix.is_empty() {
            Some(path)
        } else if path == "/" {
            Some(format!("/{prefix}"))
        } else {
            Some(format!("/{prefix}{path}"))
        }
    }
}

/// Strips surrounding slashes so `"/nl/"`, `"nl"` and `"nl/"` are one prefix.
pub(crate) fn normalize_prefix(prefix: &str) -> &str {
    prefix.trim_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn compile(definition: RouteDefinition) -> Route {
        Route::compile(definition, PathOptions::default()).unwrap()
    }

    #[test]
    fn test_handler_parse() {
        let handler = RouteHandler::parse("Static#view").unwrap();
        assert_eq!(handler.controller(), Some("Static"));
        assert_eq!(handler.action(), Some("view"));
    }

    #[test]
    fn test_handler_parse_rejects_malformed() {
        for bad in ["Static", "#view", "Static#", "A#b#c", ""] {
            assert!(
                matches!(RouteHandler::parse(bad), Err(RouterError::InvalidHandler { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_direct_handler() {
        let route = compile(
            RouteDefinition::new("Echo")
                .path("/echo/{word}")
                .direct(|params| json!({ "word": params.get("word") })),
        );

        let params = route.match_path("/echo/hi", "").unwrap();
        match route.handler().unwrap() {
            RouteHandler::Direct(f) => assert_eq!(f(&params), json!({ "word": "hi" })),
            RouteHandler::ControllerAction { .. } => panic!("expected direct handler"),
        }
    }

    #[test]
    fn test_controller_action_builder() {
        let route = compile(
            RouteDefinition::new("Show")
                .path("/show")
                .controller_action("Pages", "show"),
        );
        assert_eq!(route.handler().unwrap().controller(), Some("Pages"));
    }

    #[test]
    fn test_missing_handler_fails_on_dispatch() {
        let route = compile(RouteDefinition::new("Bare").path("/bare"));
        assert!(!route.has_handler());
        assert!(matches!(route.handler(), Err(RouterError::MissingHandler { .. })));
    }

    #[test]
    fn test_methods_default_to_get() {
        let route = compile(RouteDefinition::new("Home").path("/"));
        assert!(route.allows(&Method::GET));
        assert!(!route.allows(&Method::POST));
    }

    #[test]
    fn test_match_per_prefix() {
        let route = compile(
            RouteDefinition::new("About")
                .path("/about")
                .prefixed_path("/nl/", "/over-ons"),
        );

        assert!(route.match_path("/about", "").is_some());
        assert!(route.match_path("/over-ons", "nl").is_some());
        assert!(route.match_path("/about", "nl").is_none());
        assert!(route.match_path("/about", "fr").is_none());
        assert_eq!(route.prefixes().collect::<Vec<_>>(), ["", "nl"]);
    }

    #[test]
    fn test_default_weight_is_specificity() {
        let literal = compile(RouteDefinition::new("Me").path("/users/me"));
        let param = compile(RouteDefinition::new("User").path("/users/{id}"));
        assert!(literal.weight() > param.weight());

        let explicit = compile(RouteDefinition::new("W").path("/users/{id}").weight(-3));
        assert_eq!(explicit.weight(), -3);
    }

    #[test]
    fn test_no_paths_rejected() {
        let err = Route::compile(RouteDefinition::new("Nowhere"), PathOptions::default())
            .unwrap_err();
        assert!(matches!(err, RouterError::NoPaths { .. }));
    }

    #[test]
    fn test_empty_name_rejected() {
        let err = Route::compile(RouteDefinition::new("  ").path("/"), PathOptions::default())
            .unwrap_err();
        assert!(matches!(err, RouterError::EmptyName));
    }

    #[test]
    fn test_bad_template_names_route() {
        let err = Route::compile(
            RouteDefinition::new("Broken").path("/users/{id"),
            PathOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, RouterError::Compilation { ref route, .. } if route == "Broken"));
    }

    #[test]
    fn test_url_for() {
        let route = compile(
            RouteDefinition::new("Post")
                .path("/posts/{slug}")
                .prefixed_path("nl", "/berichten/{slug}"),
        );
        let params: Params = [("slug", "hello")].into_iter().collect();

        assert_eq!(route.url_for(&params, "").as_deref(), Some("/posts/hello"));
        assert_eq!(route.url_for(&params, "nl").as_deref(), Some("/nl/berichten/hello"));
        assert_eq!(route.url_for(&Params::new(), ""), None);
    }
}

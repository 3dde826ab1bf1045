//! The route table and request resolution.
//!
//! This module provides the main [`Router`] struct which owns every
//! registered [`Route`] and resolves `(method, path, prefix)` triples to the
//! single best match.

use http::Method;
use indexmap::{IndexMap, IndexSet};
use tracing::{debug, trace};

use crate::error::{RouterError, RouterResult};
use crate::method::parse_method;
use crate::params::Params;
use crate::pattern::{strip_query, PathOptions};
use crate::route::{normalize_prefix, Route, RouteDefinition};
use crate::{Resolution, RouteMatch};

/// An ordered table of named routes.
///
/// # Example
///
/// ```rust
/// use alchemy_router::{Resolution, RouteDefinition, Router};
/// use http::Method;
///
/// let mut router = Router::new();
/// router
///     .add(RouteDefinition::new("APIResource").path("/api/{action}").methods(["get", "post"]))
///     .unwrap();
///
/// let found = router.match_route(&Method::GET, "/api/widgets", None).unwrap();
/// assert_eq!(found.route_name(), "APIResource");
/// assert_eq!(found.params.get("action"), Some("widgets"));
///
/// assert!(matches!(
///     router.resolve(&Method::DELETE, "/api/widgets", None),
///     Resolution::MethodNotAllowed { .. }
/// ));
/// ```
///
/// # Route Priority
///
/// When several routes match the same path, the route with the highest
/// [`weight`](Route::weight) wins; among equal weights the route registered
/// first wins. Routes without an explicit weight weigh as much as their most
/// specific template, so `/users/me` beats `/users/{id}` by default.
///
/// Registration is expected to finish before matching starts. For tables
/// that change at runtime, see [`SharedRouter`](crate::SharedRouter).
#[derive(Debug, Clone, Default)]
pub struct Router {
    /// Routes keyed by name, in registration order
    routes: IndexMap<String, Route>,
    /// Every non-empty prefix used by a registered route
    prefixes: IndexSet<String>,
    /// Options applied when compiling templates
    options: PathOptions,
}

impl Router {
    /// Creates an empty router with default [`PathOptions`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty router that compiles templates with `options`.
    #[must_use]
    pub fn with_options(options: PathOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Returns the compile options.
    #[must_use]
    pub const fn options(&self) -> PathOptions {
        self.options
    }

    /// Compiles and registers a route.
    ///
    /// Fails if the name is taken or any template, method or handler string
    /// is malformed. Nothing is registered on failure.
    pub fn add(&mut self, definition: RouteDefinition) -> RouterResult<&Route> {
        if self.routes.contains_key(definition.name()) {
            return Err(RouterError::duplicate_route(definition.name()));
        }

        let route = Route::compile(definition, self.options)?;
        for prefix in route.prefixes().filter(|p| !p.is_empty()) {
            self.prefixes.insert(prefix.to_string());
        }

        debug!(
            route = route.name(),
            weight = route.weight(),
            middleware = route.is_middleware(),
            "route registered"
        );

        let name = route.name().to_string();
        let entry = self.routes.entry(name).or_insert(route);
        Ok(entry)
    }

    /// Removes a route by name, keeping the order of the others.
    pub fn remove(&mut self, name: &str) -> Option<Route> {
        let removed = self.routes.shift_remove(name)?;
        self.prefixes = self
            .routes
            .values()
            .flat_map(Route::prefixes)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();
        Some(removed)
    }

    /// Looks up a route by exact name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Route> {
        self.routes.get(name)
    }

    /// Iterates over routes in registration order.
    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.values()
    }

    /// Iterates over every non-empty prefix in use.
    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.prefixes.iter().map(String::as_str)
    }

    /// Returns the number of routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true if no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Resolves a request to the best terminating route.
    ///
    /// `path` must already have any prefix removed; `prefix` selects which
    /// templates are tested (`None` and `Some("")` both mean unprefixed).
    /// Middleware routes are never returned.
    #[must_use]
    pub fn resolve(&self, method: &Method, path: &str, prefix: Option<&str>) -> Resolution<'_> {
        let prefix = normalize_prefix(prefix.unwrap_or_default());

        let mut best: Option<(&Route, Params)> = None;
        for route in self.terminating_routes().filter(|r| r.allows(method)) {
            if let Some((current, _)) = &best {
                if current.weight() >= route.weight() {
                    continue;
                }
            }
            if let Some(params) = route.match_path(path, prefix) {
                best = Some((route, params));
            }
        }

        if let Some((route, params)) = best {
            return Resolution::Found(RouteMatch::new(route, params, prefix));
        }

        let mut allowed: Vec<Method> = Vec::new();
        for route in self.terminating_routes() {
            if route.path_for(prefix).is_some_and(|p| p.is_match(path)) {
                for m in route.methods().iter() {
                    if !allowed.contains(m) {
                        allowed.push(m.clone());
                    }
                }
            }
        }

        if allowed.is_empty() {
            trace!(%method, path, prefix, "no route matched");
            Resolution::NotFound
        } else {
            trace!(%method, path, prefix, ?allowed, "path matched but method not allowed");
            Resolution::MethodNotAllowed { allowed }
        }
    }

    /// Resolves with a method given as a string, ignoring case.
    pub fn resolve_str(
        &self,
        method: &str,
        path: &str,
        prefix: Option<&str>,
    ) -> RouterResult<Resolution<'_>> {
        let method = parse_method(method)?;
        Ok(self.resolve(&method, path, prefix))
    }

    /// Shorthand for [`resolve`](Self::resolve) that drops the not-found detail.
    #[must_use]
    pub fn match_route(
        &self,
        method: &Method,
        path: &str,
        prefix: Option<&str>,
    ) -> Option<RouteMatch<'_>> {
        self.resolve(method, path, prefix).into_match()
    }

    /// Shorthand for [`resolve_str`](Self::resolve_str).
    pub fn match_str(
        &self,
        method: &str,
        path: &str,
        prefix: Option<&str>,
    ) -> RouterResult<Option<RouteMatch<'_>>> {
        Ok(self.resolve_str(method, path, prefix)?.into_match())
    }

    /// Resolves a full request path whose first segment may be a prefix.
    ///
    /// `/nl/about` is resolved as `/about` under prefix `nl` when some route
    /// uses that prefix; if that finds no route the unprefixed table is tried.
    /// When neither finds one, the allowed methods of both are merged.
    #[must_use]
    pub fn resolve_url(&self, method: &Method, url: &str) -> Resolution<'_> {
        let Some((prefix, rest)) = self.split_prefix(url) else {
            return self.resolve(method, url, None);
        };

        let rest = format!("/{rest}");
        let prefixed = self.resolve(method, &rest, Some(prefix));
        if prefixed.is_found() {
            return prefixed;
        }

        match (prefixed, self.resolve(method, url, None)) {
            (_, found @ Resolution::Found(_)) => found,
            (
                Resolution::MethodNotAllowed { mut allowed },
                Resolution::MethodNotAllowed { allowed: unprefixed },
            ) => {
                for m in unprefixed {
                    if !allowed.contains(&m) {
                        allowed.push(m);
                    }
                }
                Resolution::MethodNotAllowed { allowed }
            }
            (not_allowed @ Resolution::MethodNotAllowed { .. }, _) => not_allowed,
            (_, unprefixed) => unprefixed,
        }
    }

    /// Returns every middleware route matching the request, highest weight
    /// first and registration order among equals.
    #[must_use]
    pub fn middleware_for(
        &self,
        method: &Method,
        path: &str,
        prefix: Option<&str>,
    ) -> Vec<RouteMatch<'_>> {
        let prefix = normalize_prefix(prefix.unwrap_or_default());
        let mut matches: Vec<RouteMatch<'_>> = self
            .routes
            .values()
            .filter(|r| r.is_middleware() && r.allows(method))
            .filter_map(|r| {
                r.match_path(path, prefix)
                    .map(|params| RouteMatch::new(r, params, prefix))
            })
            .collect();
        matches.sort_by(|a, b| b.route.weight().cmp(&a.route.weight()));
        matches
    }

    /// Builds a URL for the named route.
    #[must_use]
    pub fn url_for(&self, name: &str, params: &Params, prefix: Option<&str>) -> Option<String> {
        self.get(name)?.url_for(params, prefix.unwrap_or_default())
    }

    fn terminating_routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.values().filter(|r| !r.is_middleware())
    }

    fn split_prefix<'u>(&self, url: &'u str) -> Option<(&'u str, &'u str)> {
        let rest = strip_query(url).strip_prefix('/')?;
        let (first, remainder) = rest.split_once('/').unwrap_or((rest, ""));
        self.prefixes
            .contains(first)
            .then_some((first, remainder))
    }
}

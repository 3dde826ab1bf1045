//! Named, weighted route table for Alchemy.
//!
//! This crate maps `(method, path, prefix)` requests onto named routes. Each
//! route carries one or more path templates (optionally one per URL prefix,
//! such as a locale), the HTTP methods it answers, a weight, and a handler
//! that is either a direct callable or a `Controller#action` pair.
//!
//! # Features
//!
//! - **Path Templates**: `{name}` and `:name` placeholders, `*rest` catch-alls
//! - **Prefixes**: a route can register a different template per prefix
//! - **Weights**: explicit priorities, defaulting to template specificity
//! - **Middleware Routes**: matched separately, never terminate resolution
//! - **Method-Aware Misses**: distinguishes "not found" from "method not allowed"
//! - **Hot Swapping**: [`SharedRouter`] replaces the whole table atomically
//!
//! # Example
//!
//! ```rust
//! use alchemy_router::{RouteDefinition, Router};
//! use http::Method;
//!
//! let mut router = Router::new();
//! router.add(RouteDefinition::new("Root").path("/")).unwrap();
//! router
//!     .add(RouteDefinition::new("Item").path("/{id}").handler("Items#show"))
//!     .unwrap();
//!
//! let found = router.match_route(&Method::GET, "/42", None).unwrap();
//! assert_eq!(found.route_name(), "Item");
//! assert_eq!(found.params.get("id"), Some("42"));
//! assert_eq!(found.controller(), Some("Items"));
//! ```
//!
//! # Architecture
//!
//! Each template compiles to an anchored regular expression. Resolution scans
//! the routes whose method set contains the request method, tests the
//! template registered for the requested prefix and keeps the highest
//! weighted match:
//!
//! ```text
//!   request ──► method filter ──► template test ──► max(weight), first wins
//!                                       │
//!                                       └── no match for any method ──► NotFound
//!                                       └── match for other methods ──► MethodNotAllowed
//! ```

mod error;
mod method;
mod params;
mod pattern;
mod route;
mod router;
mod table;

pub use error::{RouteCompilationError, RouterError, RouterResult};
pub use method::{parse_method, MethodSet};
pub use params::Params;
pub use pattern::{CompiledPath, PathOptions};
pub use route::{HandlerFn, Route, RouteDefinition, RouteHandler};
pub use router::Router;
pub use table::SharedRouter;

use http::Method;

/// A matched route with its extracted parameters.
#[derive(Debug, Clone)]
pub struct RouteMatch<'a> {
    /// The matched route
    pub route: &'a Route,
    /// Extracted path parameters, in template order
    pub params: Params,
    prefix: String,
}

impl<'a> RouteMatch<'a> {
    /// Creates a new route match.
    #[must_use]
    pub fn new(route: &'a Route, params: Params, prefix: impl Into<String>) -> Self {
        Self {
            route,
            params,
            prefix: prefix.into(),
        }
    }

    /// Returns the matched route's name.
    #[must_use]
    pub fn route_name(&self) -> &'a str {
        self.route.name()
    }

    /// Returns the prefix the match was made under (`""` for none).
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the controller name if the route dispatches to a controller action.
    #[must_use]
    pub fn controller(&self) -> Option<&'a str> {
        self.route.handler().ok()?.controller()
    }

    /// Returns the action name if the route dispatches to a controller action.
    #[must_use]
    pub fn action(&self) -> Option<&'a str> {
        self.route.handler().ok()?.action()
    }

    /// Returns what the caller should dispatch to.
    ///
    /// Fails with [`RouterError::MissingHandler`] when the route has no handler.
    pub fn target(&self) -> RouterResult<DispatchTarget<'a>> {
        Ok(match self.route.handler()? {
            RouteHandler::Direct(handler) => DispatchTarget::Direct(handler),
            RouteHandler::ControllerAction { controller, action } => {
                DispatchTarget::ControllerAction { controller, action }
            }
        })
    }
}

/// The dispatch target of a [`RouteMatch`].
#[derive(Clone)]
pub enum DispatchTarget<'a> {
    /// Call this handler with the match parameters.
    Direct(&'a HandlerFn),
    /// Invoke `action` on `controller`.
    ControllerAction {
        /// Controller name
        controller: &'a str,
        /// Action name
        action: &'a str,
    },
}

impl std::fmt::Debug for DispatchTarget<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
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

/// The outcome of resolving a request.
#[derive(Debug, Clone)]
pub enum Resolution<'a> {
    /// A terminating route matched.
    Found(RouteMatch<'a>),
    /// The path matched, but only for other methods.
    MethodNotAllowed {
        /// Methods that would have matched, in registration order
        allowed: Vec<Method>,
    },
    /// Nothing matched.
    NotFound,
}

impl<'a> Resolution<'a> {
    /// Returns true for [`Resolution::Found`].
    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Converts into the match, discarding miss details.
    #[must_use]
    pub fn into_match(self) -> Option<RouteMatch<'a>> {
        match self {
            Self::Found(found) => Some(found),
            Self::MethodNotAllowed { .. } | Self::NotFound => None,
        }
    }
}

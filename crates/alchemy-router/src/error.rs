//! Router error types.

use thiserror::Error;

/// Result type alias using [`RouterError`].
pub type RouterResult<T> = Result<T, RouterError>;

/// A path template could not be compiled.
///
/// Compilation happens when a route is added, so these surface at startup
/// rather than on the first request.
#[derive(Error, Debug)]
pub enum RouteCompilationError {
    /// A `{` without a matching `}` (or the reverse).
    #[error("unbalanced brace at byte {position} in path template `{template}`")]
    UnbalancedBrace {
        /// The offending template.
        template: String,
        /// Byte offset of the unmatched brace.
        position: usize,
    },

    /// A placeholder with no name, such as `{}` or a bare `:`.
    #[error("empty parameter name at byte {position} in path template `{template}`")]
    EmptyParameter {
        /// The offending template.
        template: String,
        /// Byte offset of the placeholder.
        position: usize,
    },

    /// A placeholder name that is not a plain identifier.
    #[error("invalid parameter name `{name}` in path template `{template}`")]
    InvalidParameterName {
        /// The offending template.
        template: String,
        /// The rejected name.
        name: String,
    },

    /// The same parameter name appears twice in one template.
    #[error("duplicate parameter `{name}` in path template `{template}`")]
    DuplicateParameter {
        /// The offending template.
        template: String,
        /// The repeated name.
        name: String,
    },

    /// A `*name` catch-all that is not in the last segment.
    #[error("catch-all parameter must be the last segment in path template `{template}`")]
    CatchAllNotLast {
        /// The offending template.
        template: String,
    },

    /// The generated pattern was rejected by the regex engine.
    #[error("path template `{template}` produced an invalid pattern")]
    Regex {
        /// The offending template.
        template: String,
        /// Underlying regex error.
        #[source]
        source: regex::Error,
    },
}

impl RouteCompilationError {
    /// Returns the template that failed to compile.
    #[must_use]
    pub fn template(&self) -> &str {
        match self {
            Self::UnbalancedBrace { template, .. }
            | Self::EmptyParameter { template, .. }
            | Self::InvalidParameterName { template, .. }
            | Self::DuplicateParameter { template, .. }
            | Self::CatchAllNotLast { template }
            | Self::Regex { template, .. } => template,
        }
    }
}

/// Errors raised while registering or dispatching routes.
#[derive(Error, Debug)]
pub enum RouterError {
    /// A path template of the named route failed to compile.
    #[error("failed to compile route `{route}`")]
    Compilation {
        /// The route being registered.
        route: String,
        /// Underlying compilation error.
        #[source]
        source: RouteCompilationError,
    },

    /// A route with the same name is already registered.
    #[error("route `{name}` is already registered")]
    DuplicateRoute {
        /// The duplicated name.
        name: String,
    },

    /// A route was defined without any path.
    #[error("route `{route}` has no paths")]
    NoPaths {
        /// The route name.
        route: String,
    },

    /// A route was defined with an empty name.
    #[error("route name must not be empty")]
    EmptyName,

    /// An HTTP method string could not be parsed.
    #[error("invalid HTTP method `{method}`")]
    InvalidMethod {
        /// The rejected method string.
        method: String,
    },

    /// A handler string is not of the form `Controller#action`.
    #[error("invalid handler `{handler}`: expected `Controller#action`")]
    InvalidHandler {
        /// The rejected handler string.
        handler: String,
    },

    /// A route without a handler was dispatched.
    #[error("route `{route}` has no handler")]
    MissingHandler {
        /// The route name.
        route: String,
    },
}

impl RouterError {
    /// Wraps a compilation error with the route it belongs to.
    pub fn compilation(route: impl Into<String>, source: RouteCompilationError) -> Self {
        Self::Compilation {
            route: route.into(),
            source,
        }
    }

    /// Creates a duplicate route error.
    pub fn duplicate_route(name: impl Into<String>) -> Self {
        Self::DuplicateRoute { name: name.into() }
    }

    /// Creates an invalid method error.
    pub fn invalid_method(method: impl Into<String>) -> Self {
        Self::InvalidMethod {
            method: method.into(),
        }
    }

    /// Creates an invalid handler error.
    pub fn invalid_handler(handler: impl Into<String>) -> Self {
        Self::InvalidHandler {
            handler: handler.into(),
        }
    }

    /// Creates a missing handler error.
    pub fn missing_handler(route: impl Into<String>) -> Self {
        Self::MissingHandler {
            route: route.into(),
        }
    }
}

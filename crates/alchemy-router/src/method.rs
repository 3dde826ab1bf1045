//! HTTP method sets for routes.
//!
//! A route answers a set of methods. Method names are parsed
//! case-insensitively, and a route declared with no methods answers `GET`.

use http::Method;

use crate::error::{RouterError, RouterResult};

/// The methods a route responds to.
///
/// # Example
///
/// ```rust
/// use alchemy_router::MethodSet;
/// use http::Method;
///
/// let methods = MethodSet::parse(["get", "Post"]).unwrap();
/// assert!(methods.contains(&Method::GET));
/// assert!(methods.contains(&Method::POST));
/// assert!(!methods.contains(&Method::DELETE));
///
/// let default = MethodSet::parse(Vec::<&str>::new()).unwrap();
/// assert_eq!(default.allowed(), vec![Method::GET]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSet {
    methods: Vec<Method>,
}

impl Default for MethodSet {
    fn default() -> Self {
        Self {
            methods: vec![Method::GET],
        }
    }
}

impl MethodSet {
    /// Creates a set containing only `GET`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a set from already-parsed methods. An empty input yields `GET`.
    #[must_use]
    pub fn from_methods(methods: impl IntoIterator<Item = Method>) -> Self {
        let mut set = Self {
            methods: Vec::new(),
        };
        for method in methods {
            set.insert(method);
        }
        if set.methods.is_empty() {
            set.methods.push(Method::GET);
        }
        set
    }

    /// Parses method names, ignoring case. An empty input yields `GET`.
    pub fn parse<I, S>(names: I) -> RouterResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let methods = names
            .into_iter()
            .map(|name| parse_method(name.as_ref()))
            .collect::<RouterResult<Vec<_>>>()?;
        Ok(Self::from_methods(methods))
    }

    /// Adds a method; duplicates are ignored.
    pub fn insert(&mut self, method: Method) {
        if !self.methods.contains(&method) {
            self.methods.push(method);
        }
    }

    /// Returns true if `method` is in the set.
    #[must_use]
    pub fn contains(&self, method: &Method) -> bool {
        self.methods.contains(method)
    }

    /// Returns the methods in declaration order.
    #[must_use]
    pub fn allowed(&self) -> Vec<Method> {
        self.methods.clone()
    }

    /// Iterates over the methods in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Method> {
        self.methods.iter()
    }

    /// Returns the number of methods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Always false: a set holds at least `GET`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

/// Parses a single method name, ignoring case.
pub fn parse_method(name: &str) -> RouterResult<Method> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(RouterError::invalid_method(name));
    }
    Method::from_bytes(trimmed.to_ascii_uppercase().as_bytes())
        .map_err(|_| RouterError::invalid_method(name))
}

//! A router that can be swapped while requests are being served.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::info;

use crate::error::RouterResult;
use crate::router::Router;

/// A shared handle to the current route table.
///
/// Readers take a [`snapshot`](Self::snapshot) and resolve against it without
/// holding any lock; writers build a new [`Router`] and swap it in. A request
/// therefore always sees one complete table, never a half-updated one.
///
/// # Example
///
/// ```rust
/// use alchemy_router::{RouteDefinition, Router, SharedRouter};
/// use http::Method;
///
/// let shared = SharedRouter::new(Router::new());
/// let before = shared.snapshot();
///
/// shared
///     .update(|router| router.add(RouteDefinition::new("Home").path("/")).map(|_| ()))
///     .unwrap();
///
/// assert!(before.match_route(&Method::GET, "/", None).is_none());
/// assert!(shared.snapshot().match_route(&Method::GET, "/", None).is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct SharedRouter {
    current: Arc<RwLock<Arc<Router>>>,
    /// Serialises writers; readers never take it
    writer: Arc<Mutex<()>>,
}

impl SharedRouter {
    /// Wraps a router.
    #[must_use]
    pub fn new(router: Router) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(router))),
            writer: Arc::new(Mutex::new(())),
        }
    }

    /// Returns the current table.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Router> {
        Arc::clone(&self.current.read())
    }

    /// Replaces the table, returning the previous one.
    pub fn replace(&self, router: Router) -> Arc<Router> {
        let routes = router.len();
        let _writer = self.writer.lock();
        let previous = std::mem::replace(&mut *self.current.write(), Arc::new(router));
        info!(routes, previous = previous.len(), "route table replaced");
        previous
    }

    /// Applies `f` to a copy of the current table and installs the result.
    ///
    /// If `f` fails the current table is left untouched. Readers are not
    /// blocked while `f` runs, and `f` may take snapshots; it must not call
    /// [`update`](Self::update) or [`replace`](Self::replace) itself.
    pub fn update<F>(&self, f: F) -> RouterResult<()>
    where
        F: FnOnce(&mut Router) -> RouterResult<()>,
    {
        let _writer = self.writer.lock();
        let mut next = Router::clone(&self.snapshot());
        f(&mut next)?;
        *self.current.write() = Arc::new(next);
        Ok(())
    }
}

impl From<Router> for SharedRouter {
    fn from(router: Router) -> Self {
        Self::new(router)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RouteDefinition, RouterError};
    use http::Method;

    #[test]
    fn test_replace_swaps_table() {
        let shared = SharedRouter::default();
        let mut router = Router::new();
        router.add(RouteDefinition::new("Home").path("/")).unwrap();

        let previous = shared.replace(router);
        assert!(previous.is_empty());
        assert_eq!(shared.snapshot().len(), 1);
    }

    #[test]
    fn test_failed_update_keeps_table() {
        let shared = SharedRouter::new(Router::new());
        shared
            .update(|r| r.add(RouteDefinition::new("Home").path("/")).map(|_| ()))
            .unwrap();

        let err = shared
            .update(|r| {
                r.add(RouteDefinition::new("Other").path("/other"))?;
                r.add(RouteDefinition::new("Home").path("/again")).map(|_| ())
            })
            .unwrap_err();
        assert!(matches!(err, RouterError::DuplicateRoute { .. }));

        let current = shared.snapshot();
        assert_eq!(current.len(), 1);
        assert!(current.get("Other").is_none());
    }

    #[test]
    fn test_update_can_read_current_table() {
        let shared = SharedRouter::new(Router::new());
        shared
            .update(|r| r.add(RouteDefinition::new("Home").path("/")).map(|_| ()))
            .unwrap();

        shared
            .update(|r| {
                let current = shared.snapshot();
                assert_eq!(current.len(), 1);
                let name = format!("Route{}", current.len());
                r.add(RouteDefinition::new(name).path("/next")).map(|_| ())
            })
            .unwrap();

        assert!(shared.snapshot().get("Route1").is_some());
    }

    #[test]
    fn test_concurrent_updates_are_not_lost() {
        let shared = SharedRouter::new(Router::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let shared = shared.clone();
                std::thread::spawn(move || {
                    shared
                        .update(|r| {
                            r.add(RouteDefinition::new(format!("R{i}")).path(format!("/r{i}")))
                                .map(|_| ())
                        })
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(shared.snapshot().len(), 8);
    }

    #[test]
    fn test_snapshot_is_shared_across_threads() {
        let shared = SharedRouter::new(Router::new());
        shared
            .update(|r| r.add(RouteDefinition::new("Item").path("/{id}")).map(|_| ()))
            .unwrap();

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let shared = shared.clone();
                std::thread::spawn(move || {
                    let router = shared.snapshot();
                    let path = format!("/{i}");
                    router
                        .match_route(&Method::GET, &path, None)
                        .map(|m| m.params.get("id").map(str::to_string))
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap(), Some(Some(i.to_string())));
        }
    }
}

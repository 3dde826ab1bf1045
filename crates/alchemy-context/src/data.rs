//! Layered property bags.
//!
//! A [`ContextData`] stores only its own overrides and keeps a handle to its
//! parent. Reads fall through to the parent chain; writes never leave the
//! node they were made on.
//!
//! # Example
//!
//! ```rust
//! use alchemy_context::ContextData;
//!
//! let parent = ContextData::new();
//! parent.set("model", String::from("Product"));
//!
//! let child = parent.child();
//! assert_eq!(child.get::<String>("model").as_deref().map(String::as_str), Some("Product"));
//!
//! child.set("model", String::from("Order"));
//! assert_eq!(parent.get::<String>("model").as_deref().map(String::as_str), Some("Product"));
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

/// A type-erased property value.
pub type AnyValue = Arc<dyn Any + Send + Sync>;

/// A local entry: either a value or an explicit "unset" that hides the parent.
#[derive(Clone)]
enum Slot {
    Set(AnyValue),
    Cleared,
}

struct Node {
    local: RwLock<HashMap<String, Slot>>,
    parent: Option<ContextData>,
}

/// A reference-counted, parent-linked property bag.
///
/// Cloning a `ContextData` yields another handle to the same node; use
/// [`child`](Self::child) to derive a new layer.
#[derive(Clone)]
pub struct ContextData {
    node: Arc<Node>,
}

impl Default for ContextData {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextData {
    /// Creates an empty root bag.
    #[must_use]
    pub fn new() -> Self {
        Self::with_parent(None)
    }

    fn with_parent(parent: Option<Self>) -> Self {
        Self {
            node: Arc::new(Node {
                local: RwLock::new(HashMap::new()),
                parent,
            }),
        }
    }

    /// Creates an empty layer on top of this one.
    #[must_use]
    pub fn child(&self) -> Self {
        Self::with_parent(Some(self.clone()))
    }

    /// Returns the layer this one was derived from.
    #[must_use]
    pub fn parent(&self) -> Option<&Self> {
        self.node.parent.as_ref()
    }

    /// Returns the number of ancestors (0 for a root).
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self.parent();
        while let Some(data) = current {
            depth += 1;
            current = data.parent();
        }
        depth
    }

    /// Returns true if both handles point at the same layer.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }

    /// Looks up a raw value, walking the parent chain.
    #[must_use]
    pub fn get_any(&self, key: &str) -> Option<AnyValue> {
        let mut current = Some(self);
        while let Some(data) = current {
            if let Some(slot) = data.node.local.read().get(key) {
                return match slot {
                    Slot::Set(value) => Some(Arc::clone(value)),
                    Slot::Cleared => None,
                };
            }
            current = data.parent();
        }
        None
    }

    /// Looks up a typed value. A value of another type reads as unset.
    #[must_use]
    pub fn get<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        self.get_any(key)?.downcast::<T>().ok()
    }

    /// Stores a value on this layer only.
    pub fn set<T: Any + Send + Sync>(&self, key: impl Into<String>, value: T) {
        self.set_arc(key, Arc::new(value));
    }

    /// Stores an already shared value on this layer only.
    pub fn set_arc<T: Any + Send + Sync>(&self, key: impl Into<String>, value: Arc<T>) {
        self.set_any(key, value);
    }

    /// Stores a raw value on this layer only.
    pub fn set_any(&self, key: impl Into<String>, value: AnyValue) {
        self.node.local.write().insert(key.into(), Slot::Set(value));
    }

    /// Marks `key` as unset on this layer, hiding any inherited value.
    pub fn clear(&self, key: impl Into<String>) {
        self.node.local.write().insert(key.into(), Slot::Cleared);
    }

    /// Returns true if this layer itself holds an entry for `key`.
    #[must_use]
    pub fn contains_local(&self, key: &str) -> bool {
        self.node.local.read().contains_key(key)
    }

    /// Returns true if `key` resolves to a value through the chain.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get_any(key).is_some()
    }

    /// Returns the keys held on this layer, sorted.
    #[must_use]
    pub fn local_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.node.local.read().keys().cloned().collect();
        keys.sort_unstable();
        keys
    }
}

impl fmt::Debug for ContextData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextData")
            .field("depth", &self.depth())
            .field("local_keys", &self.local_keys())
            .finish()
    }
}

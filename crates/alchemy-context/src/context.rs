//! The operational context trait and property declarations.
//!
//! An operational context is a thin typed view over a [`ContextData`] layer.
//! Concrete context types declare their properties once with
//! [`context_properties!`](crate::context_properties) and derive children with
//! [`create_child`](OperationalContext::create_child), which always yields the
//! same concrete type as the receiver.
//!
//! # Example
//!
//! ```rust
//! use alchemy_context::{context_properties, ContextData, OperationalContext};
//!
//! #[derive(Debug, Clone)]
//! struct SaveContext {
//!     data: ContextData,
//! }
//!
//! impl OperationalContext for SaveContext {
//!     fn data(&self) -> &ContextData {
//!         &self.data
//!     }
//!
//!     fn from_data(data: ContextData) -> Self {
//!         Self { data }
//!     }
//! }
//!
//! impl SaveContext {
//!     context_properties! {
//!         /// Whether validation is skipped.
//!         pub fn skip_validation / set_skip_validation: bool = "skip_validation";
//!     }
//! }
//!
//! let root = SaveContext::new();
//! root.set_skip_validation(true);
//!
//! let child = root.create_child();
//! assert_eq!(child.skip_validation().as_deref(), Some(&true));
//!
//! child.set_skip_validation(false);
//! assert_eq!(root.skip_validation().as_deref(), Some(&true));
//! ```

use std::any::Any;
use std::sync::Arc;

use crate::data::{AnyValue, ContextData};

/// A context in a parent-linked chain.
///
/// Implementors only provide [`data`](Self::data) and
/// [`from_data`](Self::from_data); everything else is derived. Setters take
/// `&self`: a context is a handle, and writes land on its own layer.
pub trait OperationalContext: Sized + Send + Sync {
    /// Returns the underlying property layer.
    fn data(&self) -> &ContextData;

    /// Wraps an existing layer.
    fn from_data(data: ContextData) -> Self;

    /// Creates a root context with an empty bag.
    fn new() -> Self {
        Self::from_data(ContextData::new())
    }

    /// Creates a context whose reads fall through to `parent`.
    ///
    /// The parent may be of any context type, so a field context can be
    /// derived from a document context.
    fn new_with_parent<P: OperationalContext>(parent: &P) -> Self {
        Self::from_data(parent.data().child())
    }

    /// Creates a child of the same concrete type.
    fn create_child(&self) -> Self {
        Self::new_with_parent(self)
    }

    /// Returns the parent, viewed as this context type.
    fn parent(&self) -> Option<Self> {
        self.data().parent().cloned().map(Self::from_data)
    }

    /// Returns the number of ancestors.
    fn depth(&self) -> usize {
        self.data().depth()
    }

    /// Reads a raw value by key.
    fn get_any(&self, key: &str) -> Option<AnyValue> {
        self.data().get_any(key)
    }

    /// Reads a typed value by key.
    fn get<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        self.data().get(key)
    }

    /// Writes a value on this context's own layer.
    fn set<T: Any + Send + Sync>(&self, key: &str, value: T) {
        self.data().set(key, value);
    }

    /// Writes a shared value on this context's own layer.
    fn set_arc<T: Any + Send + Sync>(&self, key: &str, value: Arc<T>) {
        self.data().set_arc(key, value);
    }

    /// Hides `key` on this context, whatever the parent holds.
    fn clear(&self, key: &str) {
        self.data().clear(key);
    }
}

/// Declares typed properties on a context type or trait.
///
/// Each entry expands to a getter returning `Option<Arc<T>>` and a setter
/// accepting anything convertible into `Arc<T>`. An optional `default`
/// function is consulted when the key is unset; its result is not stored.
///
/// An optional `set` function receives the context and the new value and
/// returns the value to store, or an error to reject it. Setters declared
/// with `set` return [`ContextResult<()>`](crate::ContextResult).
///
/// ```text
/// context_properties! {
///     /// docs
///     pub fn getter / setter: Type = "key";
///     pub fn other / set_other: Type = "other", default = path::to::fallback;
///     pub fn checked / set_checked: Type = "checked", set = path::to::transform;
/// }
/// ```
///
/// Inside a trait body leave out the visibility.
#[macro_export]
macro_rules! context_properties {
    (@setter $vis:vis $getter:ident $setter:ident $ty:ty, $key:expr) => {
        #[doc = concat!("Sets the `", stringify!($getter), "` property on this context.")]
        $vis fn $setter(&self, value: impl ::std::convert::Into<::std::sync::Arc<$ty>>) {
            $crate::OperationalContext::set_arc::<$ty>(self, $key, value.into());
        }
    };

    (@setter $vis:vis $getter:ident $setter:ident $ty:ty, $key:expr, $set:path) => {
        #[doc = concat!("Sets the `", stringify!($getter), "` property on this context.")]
        ///
        /// # Errors
        ///
        /// Returns the error raised when the value is rejected; nothing is
        /// stored in that case.
        $vis fn $setter(
            &self,
            value: impl ::std::convert::Into<::std::sync::Arc<$ty>>,
        ) -> $crate::ContextResult<()> {
            let value = $set(self, value.into())?;
            $crate::OperationalContext::set_arc::<$ty>(self, $key, value);
            ::std::result::Result::Ok(())
        }
    };

    ($(
        $(#[$meta:meta])*
        $vis:vis fn $getter:ident / $setter:ident : $ty:ty = $key:expr
            $(, default = $default:path)? $(, set = $set:path)? ;
    )*) => {
        $(
            $(#[$meta])*
            $vis fn $getter(&self) -> ::std::option::Option<::std::sync::Arc<$ty>> {
                let value = $crate::OperationalContext::get::<$ty>(self, $key);
                $(let value = value.or_else(|| $default(self));)?
                value
            }

            $crate::context_properties!(@setter $vis $getter $setter $ty, $key $(, $set)?);
        )*
    };
}

/// A context with no declared properties.
#[derive(Debug, Clone, Default)]
pub struct BaseContext {
    data: ContextData,
}

impl OperationalContext for BaseContext {
    fn data(&self) -> &ContextData {
        &self.data
    }

    fn from_data(data: ContextData) -> Self {
        Self { data }
    }
}

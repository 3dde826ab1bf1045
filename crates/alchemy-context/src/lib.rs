//! Operational contexts for Alchemy.
//!
//! An operational context is a property bag linked to the context it was
//! derived from. Reads fall through to the parent; writes stay on the child.
//! Contexts carry per-operation state (model, datasource, schema, the field
//! being converted and its value) through recursive document conversion
//! without threading a growing parameter list through every converter.
//!
//! # Overview
//!
//! - [`ContextData`] - the layered, reference-counted property bag
//! - [`OperationalContext`] - the trait every context type implements
//! - [`context_properties!`] - declares typed getters and setters once per type
//! - [`DocumentContext`] / [`FieldContext`] - the conversion contexts
//! - [`convert_record`] - the field-by-field conversion pipeline
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use alchemy_context::{
//!     ConversionContext, DocumentContext, Field, MemoryDatasource, Model,
//!     OperationalContext, Schema,
//! };
//! use serde_json::json;
//!
//! let model = Model::new("Product", Schema::new().with_field(Field::new("price", "Number")));
//! let root = DocumentContext::for_record(
//!     Arc::new(model),
//!     Arc::new(MemoryDatasource::new("memory")),
//!     json!({ "price": 30 }),
//! );
//!
//! // A child sees the parent's schema until it sets its own.
//! let child = root.create_child();
//! let parent_schema = root.schema().unwrap().unwrap();
//! assert!(Arc::ptr_eq(&child.schema().unwrap().unwrap(), &parent_schema));
//!
//! child.set_schema(Schema::new());
//! assert!(Arc::ptr_eq(&root.schema().unwrap().unwrap(), &parent_schema));
//! ```

mod context;
mod convert;
mod conversion;
mod data;
mod error;
mod schema;

pub use context::{BaseContext, OperationalContext};
pub use conversion::{keys, ConversionContext, DocumentContext, FieldContext, WorkingData};
pub use convert::{
    convert_field, convert_record, BoxFuture, ConverterRegistry, Direction, FieldConverter,
    PassThrough,
};
pub use data::{AnyValue, ContextData};
pub use error::{ContextError, ContextResult};
pub use schema::{Datasource, Field, MemoryDatasource, Model, Schema, SchemaSource};

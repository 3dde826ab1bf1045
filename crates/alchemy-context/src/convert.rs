//! Field conversion pipeline.
//!
//! [`convert_record`] walks a record field by field in schema order and hands
//! each value to the [`FieldConverter`] registered for its type. Embedded
//! documents are converted recursively under their own schema.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use alchemy_context::{
//!     convert_record, ConverterRegistry, Direction, DocumentContext, Field,
//!     MemoryDatasource, Model, Schema,
//! };
//! use serde_json::{json, Value};
//!
//! # tokio_test::block_on(async {
//! let mut registry = ConverterRegistry::new();
//! registry.register_fn("Upper", |ctx, _direction| {
//!     let value = ctx.working_value().unwrap_or_default();
//!     Ok(Value::from(value.as_str().unwrap_or_default().to_uppercase()))
//! });
//!
//! let schema = Schema::new().with_field(Field::new("code", "Upper"));
//! let ctx = DocumentContext::for_record(
//!     Arc::new(Model::new("Product", schema)),
//!     Arc::new(MemoryDatasource::new("memory")),
//!     json!({ "code": "ab-1" }),
//! );
//!
//! let stored = convert_record(&ctx, &registry, Direction::ToDatasource).await.unwrap();
//! assert_eq!(stored, json!({ "code": "AB-1" }));
//! # });
//! ```

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, trace};

use crate::conversion::{ConversionContext, FieldContext};
use crate::error::{ContextError, ContextResult};

/// A boxed future returned by converters.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Which way a record is being converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// From application values to stored values.
    ToDatasource,
    /// From stored values back to application values.
    FromDatasource,
}

/// Converts the working value of one field.
///
/// Converters read what they need from the context and return the new value;
/// they must not modify the holder. The pipeline writes the result into the
/// working data.
pub trait FieldConverter: Send + Sync + 'static {
    /// Converts `ctx.working_value()`.
    fn convert<'a>(
        &'a self,
        ctx: &'a FieldContext,
        direction: Direction,
    ) -> BoxFuture<'a, ContextResult<Value>>;
}

/// Returns the working value unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl FieldConverter for PassThrough {
    fn convert<'a>(
        &'a self,
        ctx: &'a FieldContext,
        _direction: Direction,
    ) -> BoxFuture<'a, ContextResult<Value>> {
        Box::pin(async move {
            Ok(ctx
                .working_value()
                .map(|value| Value::clone(&value))
                .unwrap_or(Value::Null))
        })
    }
}

struct FnConverter<F>(F);

impl<F> FieldConverter for FnConverter<F>
where
    F: Fn(&FieldContext, Direction) -> ContextResult<Value> + Send + Sync + 'static,
{
    fn convert<'a>(
        &'a self,
        ctx: &'a FieldContext,
        direction: Direction,
    ) -> BoxFuture<'a, ContextResult<Value>> {
        let result = (self.0)(ctx, direction);
        Box::pin(async move { result })
    }
}

/// Field type name to converter mapping, populated at startup.
#[derive(Clone, Default)]
pub struct ConverterRegistry {
    converters: HashMap<String, Arc<dyn FieldConverter>>,
    strict: bool,
}

impl ConverterRegistry {
    /// Creates an empty registry that passes unknown types through.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes unknown field types an error instead of a pass-through.
    #[must_use]
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Registers a converter for a field type, replacing any previous one.
    pub fn register<C: FieldConverter>(&mut self, type_name: impl Into<String>, converter: C) {
        self.converters
            .insert(type_name.into(), Arc::new(converter));
    }

    /// Registers a synchronous closure as a converter.
    pub fn register_fn<F>(&mut self, type_name: impl Into<String>, converter: F)
    where
        F: Fn(&FieldContext, Direction) -> ContextResult<Value> + Send + Sync + 'static,
    {
        self.register(type_name, FnConverter(converter));
    }

    /// Returns true if a converter is registered for `type_name`.
    #[must_use]
    pub fn contains(&self, type_name: &str) -> bool {
        self.converters.contains_key(type_name)
    }

    /// Returns the converter for `type_name`.
    pub fn resolve(&self, type_name: &str) -> ContextResult<Arc<dyn FieldConverter>> {
        match self.converters.get(type_name) {
            Some(converter) => Ok(Arc::clone(converter)),
            None if self.strict => Err(ContextError::unknown_field_type(type_name)),
            None => Ok(Arc::new(PassThrough)),
        }
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<&String> = self.converters.keys().collect();
        types.sort_unstable();
        f.debug_struct("ConverterRegistry")
            .field("types", &types)
            .field("strict", &self.strict)
            .finish()
    }
}

/// Converts a whole record.
///
/// Fields are processed in schema declaration order and each result is
/// written into the context's working data before the next field runs, so
/// converters may read earlier converted fields from
/// [`working_data`](ConversionContext::working_data). Fields absent from the
/// holder are skipped. The root record is never modified; the converted
/// record is returned.
pub async fn convert_record<C: ConversionContext>(
    ctx: &C,
    registry: &ConverterRegistry,
    direction: Direction,
) -> ContextResult<Value> {
    let schema = ctx.schema()?.ok_or(ContextError::MissingSchema)?;
    if !ctx.holder().is_some_and(|holder| holder.is_object()) {
        return Err(ContextError::HolderNotObject);
    }
    let working = ctx.working_data().ok_or(ContextError::HolderNotObject)?;

    debug!(fields = schema.len(), depth = ctx.depth(), ?direction, "converting record");

    for field in schema.fields() {
        let field_ctx = ctx.get_field_context(field.name())?;
        if field_ctx.field_value().is_none() {
            trace!(field = field.name(), "field absent, skipped");
            continue;
        }
        let converted = convert_field(&field_ctx, registry, direction).await?;
        working.insert(field.name(), converted);
    }

    Ok(working.to_value())
}

/// Converts the working value of a single field.
///
/// Embedded documents recurse through [`convert_record`]; arrays are
/// converted element by element.
pub fn convert_field<'a>(
    ctx: &'a FieldContext,
    registry: &'a ConverterRegistry,
    direction: Direction,
) -> BoxFuture<'a, ContextResult<Value>> {
    Box::pin(async move {
        let field = ctx.field().ok_or(ContextError::MissingField)?;
        let value = ctx.working_value().unwrap_or_else(|| Arc::new(Value::Null));

        if !field.is_array() {
            return convert_single(ctx, registry, direction).await;
        }

        let Value::Array(items) = &*value else {
            return Err(ContextError::conversion(field.name(), "expected an array"));
        };

        let mut converted = Vec::with_capacity(items.len());
        for item in items {
            let item_ctx = ctx.with_working_value(item.clone(), None);
            converted.push(convert_single(&item_ctx, registry, direction).await?);
        }
        Ok(Value::Array(converted))
    })
}

async fn convert_single(
    ctx: &FieldContext,
    registry: &ConverterRegistry,
    direction: Direction,
) -> ContextResult<Value> {
    let field = ctx.field().ok_or(ContextError::MissingField)?;

    match field.schema() {
        Some(sub_schema) => {
            let value = ctx.working_value().unwrap_or_else(|| Arc::new(Value::Null));
            if !value.is_object() {
                return Err(ContextError::conversion(field.name(), "expected an object"));
            }
            let sub_ctx = ctx.with_value_of_sub_schema(Value::clone(&value), Arc::clone(sub_schema));
            convert_record(&sub_ctx, registry, direction).await
        }
        None => {
            let converter = registry.resolve(field.type_name())?;
            converter.convert(ctx, direction).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Field, MemoryDatasource, Model, Schema};
    use crate::DocumentContext;
    use serde_json::json;

    fn number_registry() -> ConverterRegistry {
        let mut registry = ConverterRegistry::new();
        registry.register_fn("Number", |ctx, direction| {
            let value = ctx.working_value().unwrap_or_default();
            let number = value
                .as_f64()
                .ok_or_else(|| ContextError::conversion("number", "not a number"))?;
            Ok(match direction {
                Direction::ToDatasource => json!(number * 100.0),
                Direction::FromDatasource => json!(number / 100.0),
            })
        });
        registry
    }

    fn context(schema: Schema, record: Value) -> DocumentContext {
        DocumentContext::for_record(
            Arc::new(Model::new("Product", schema)),
            Arc::new(MemoryDatasource::new("memory")),
            record,
        )
    }

    #[tokio::test]
    async fn test_convert_scalar_fields() {
        let schema = Schema::new()
            .with_field(Field::new("name", "String"))
            .with_field(Field::new("price", "Number"));
        let record = json!({ "name": "Lamp", "price": 1.5 });
        let ctx = context(schema, record.clone());

        let stored = convert_record(&ctx, &number_registry(), Direction::ToDatasource)
            .await
            .unwrap();

        assert_eq!(stored, json!({ "name": "Lamp", "price": 150.0 }));
        assert_eq!(ctx.root_data().as_deref(), Some(&record));
    }

    #[tokio::test]
    async fn test_absent_fields_are_skipped() {
        let schema = Schema::new()
            .with_field(Field::new("name", "String"))
            .with_field(Field::new("price", "Number"));
        let ctx = context(schema, json!({ "name": "Lamp" }));

        let stored = convert_record(&ctx, &number_registry(), Direction::ToDatasource)
            .await
            .unwrap();
        assert_eq!(stored, json!({ "name": "Lamp" }));
    }

    #[tokio::test]
    async fn test_unknown_type_in_strict_registry() {
        let schema = Schema::new().with_field(Field::new("when", "Date"));
        let ctx = context(schema, json!({ "when": "2024-01-01" }));

        let err = convert_record(&ctx, &ConverterRegistry::new().strict(), Direction::ToDatasource)
            .await
            .unwrap_err();
        assert_eq!(err, ContextError::unknown_field_type("Date"));
    }

    #[tokio::test]
    async fn test_later_fields_see_earlier_results() {
        let mut registry = number_registry();
        registry.register_fn("Total", |ctx, _| {
            let working = ctx.working_data().ok_or(ContextError::HolderNotObject)?;
            Ok(working.get("price").unwrap_or(Value::Null))
        });

        let schema = Schema::new()
            .with_field(Field::new("price", "Number"))
            .with_field(Field::new("total", "Total"));
        let ctx = context(schema, json!({ "price": 2, "total": 0 }));

        let stored = convert_record(&ctx, &registry, Direction::ToDatasource)
            .await
            .unwrap();
        assert_eq!(stored["total"], json!(200.0));
    }

    #[tokio::test]
    async fn test_embedded_documents_and_arrays() {
        let line = Schema::new()
            .with_field(Field::new("sku", "String"))
            .with_field(Field::new("price", "Number"));
        let schema = Schema::new()
            .with_field(Field::new("tags", "String").array())
            .with_field(Field::embedded("lines", line).array());
        let ctx = context(
            schema,
            json!({
                "tags": ["a", "b"],
                "lines": [{ "sku": "x", "price": 1 }, { "sku": "y" }],
            }),
        );

        let stored = convert_record(&ctx, &number_registry(), Direction::ToDatasource)
            .await
            .unwrap();
        assert_eq!(
            stored,
            json!({
                "tags": ["a", "b"],
                "lines": [{ "sku": "x", "price": 100.0 }, { "sku": "y" }],
            })
        );
    }

    #[tokio::test]
    async fn test_array_field_rejects_scalar() {
        let schema = Schema::new().with_field(Field::new("tags", "String").array());
        let ctx = context(schema, json!({ "tags": "solo" }));

        let err = convert_record(&ctx, &ConverterRegistry::new(), Direction::ToDatasource)
            .await
            .unwrap_err();
        assert!(matches!(err, ContextError::Conversion { ref field, .. } if field == "tags"));
    }

    #[tokio::test]
    async fn test_holder_must_be_object() {
        let schema = Schema::new().with_field(Field::new("name", "String"));
        let ctx = context(schema, json!(["not", "an", "object"]));

        let err = convert_record(&ctx, &ConverterRegistry::new(), Direction::ToDatasource)
            .await
            .unwrap_err();
        assert_eq!(err, ContextError::HolderNotObject);
    }

    #[test]
    fn test_registry_debug_lists_types() {
        let registry = number_registry().strict();
        assert!(registry.contains("Number"));
        let debug = format!("{registry:?}");
        assert!(debug.contains("Number"));
        assert!(debug.contains("strict: true"));
    }
}

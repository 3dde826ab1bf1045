//! Schemas, models and the datasource boundary.
//!
//! These are the narrow interfaces the conversion pipeline needs from the
//! model layer: an ordered list of typed fields, a named model owning a
//! schema, and a datasource that can look a model's schema up.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

/// A typed field of a [`Schema`].
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    name: String,
    type_name: String,
    schema: Option<Arc<Schema>>,
    is_array: bool,
}

impl Field {
    /// Creates a scalar field of the given type.
    #[must_use]
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            schema: None,
            is_array: false,
        }
    }

    /// Creates a field holding an embedded document.
    #[must_use]
    pub fn embedded(name: impl Into<String>, schema: impl Into<Arc<Schema>>) -> Self {
        Self {
            schema: Some(schema.into()),
            ..Self::new(name, "Schema")
        }
    }

    /// Marks the field as holding an array of values.
    #[must_use]
    pub fn array(mut self) -> Self {
        self.is_array = true;
        self
    }

    /// Returns the field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the field type name used to pick a converter.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Returns the sub-schema for embedded documents.
    #[must_use]
    pub const fn schema(&self) -> Option<&Arc<Schema>> {
        self.schema.as_ref()
    }

    /// Returns true if the field holds an array.
    #[must_use]
    pub const fn is_array(&self) -> bool {
        self.is_array
    }
}

/// An ordered set of fields.
///
/// # Example
///
/// ```rust
/// use alchemy_context::{Field, Schema};
///
/// let schema = Schema::new()
///     .with_field(Field::new("name", "String"))
///     .with_field(Field::new("price", "Number"));
///
/// let names: Vec<_> = schema.fields().map(|f| f.name()).collect();
/// assert_eq!(names, ["name", "price"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    fields: IndexMap<String, Arc<Field>>,
}

impl Schema {
    /// Creates an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field, replacing any field of the same name in place.
    #[must_use]
    pub fn with_field(mut self, field: Field) -> Self {
        self.add_field(field);
        self
    }

    /// Adds a field, replacing any field of the same name in place.
    pub fn add_field(&mut self, field: Field) {
        self.fields.insert(field.name.clone(), Arc::new(field));
    }

    /// Looks a field up by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Arc<Field>> {
        self.fields.get(name)
    }

    /// Iterates over fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &Arc<Field>> {
        self.fields.values()
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the schema has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A named model and its schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    name: String,
    schema: Arc<Schema>,
}

impl Model {
    /// Creates a model.
    #[must_use]
    pub fn new(name: impl Into<String>, schema: impl Into<Arc<Schema>>) -> Self {
        Self {
            name: name.into(),
            schema: schema.into(),
        }
    }

    /// Returns the model name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the model's own schema.
    #[must_use]
    pub const fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }
}

/// What a datasource hands back for a schema lookup.
///
/// `Plain` models a datasource returning raw data where a schema was
/// expected; contexts refuse it.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaSource {
    /// A proper schema.
    Schema(Arc<Schema>),
    /// A plain data object.
    Plain(Value),
}

/// A storage backend, as seen by the conversion pipeline.
pub trait Datasource: fmt::Debug + Send + Sync {
    /// Returns the datasource name.
    fn name(&self) -> &str;

    /// Looks up the schema used to store `model`.
    ///
    /// The default returns the model's own schema.
    fn get_schema(&self, model: &Model) -> Option<SchemaSource> {
        Some(SchemaSource::Schema(Arc::clone(model.schema())))
    }
}

/// A datasource that stores models using their own schemas.
#[derive(Debug, Clone)]
pub struct MemoryDatasource {
    name: String,
}

impl MemoryDatasource {
    /// Creates a named in-memory datasource.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Datasource for MemoryDatasource {
    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schema_keeps_declaration_order() {
        let schema = Schema::new()
            .with_field(Field::new("b", "String"))
            .with_field(Field::new("a", "String"))
            .with_field(Field::new("b", "Number"));

        let fields: Vec<_> = schema
            .fields()
            .map(|f| (f.name(), f.type_name()))
            .collect();
        assert_eq!(fields, [("b", "Number"), ("a", "String")]);
    }

    #[test]
    fn test_embedded_array_field() {
        let line = Schema::new().with_field(Field::new("sku", "String"));
        let field = Field::embedded("lines", line).array();

        assert!(field.is_array());
        assert_eq!(field.schema().map(|s| s.len()), Some(1));
    }

    #[test]
    fn test_default_datasource_lookup() {
        let schema = Arc::new(Schema::new().with_field(Field::new("name", "String")));
        let model = Model::new("Product", Arc::clone(&schema));
        let datasource = MemoryDatasource::new("memory");

        assert_eq!(datasource.name(), "memory");
        assert_eq!(
            datasource.get_schema(&model),
            Some(SchemaSource::Schema(schema))
        );
        assert_ne!(
            SchemaSource::Plain(json!({})),
            SchemaSource::Schema(Arc::new(Schema::new()))
        );
    }
}

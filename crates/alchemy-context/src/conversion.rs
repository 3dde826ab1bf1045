//! Contexts threaded through document conversion.
//!
//! A conversion starts from a [`DocumentContext`] holding the model, its
//! datasource and the root record. Each field gets a [`FieldContext`] child
//! carrying the field and its value; embedded documents get a further child
//! whose schema and holder are the sub-document's.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use alchemy_context::{
//!     ConversionContext, DocumentContext, Field, MemoryDatasource, Model, Schema,
//! };
//! use serde_json::json;
//!
//! let schema = Schema::new()
//!     .with_field(Field::new("name", "String"))
//!     .with_field(Field::new("price", "Number"));
//!
//! let ctx = DocumentContext::for_record(
//!     Arc::new(Model::new("Product", schema)),
//!     Arc::new(MemoryDatasource::new("memory")),
//!     json!({ "name": "Lamp", "price": 30 }),
//! );
//!
//! let price = ctx.get_field_context("price").unwrap();
//! assert_eq!(price.field().unwrap().name(), "price");
//! assert_eq!(price.field_value().as_deref(), Some(&json!(30)));
//! ```

use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::{Map, Value};
use tracing::trace;

use crate::context::OperationalContext;
use crate::context_properties;
use crate::data::ContextData;
use crate::error::{ContextError, ContextResult};
use crate::schema::{Datasource, Field, Model, Schema, SchemaSource};

/// Property keys used by the conversion contexts.
pub mod keys {
    /// The datasource records are converted for.
    pub const DATASOURCE: &str = "datasource";
    /// The model being converted.
    pub const MODEL: &str = "model";
    /// The active schema.
    pub const SCHEMA: &str = "schema";
    /// The original record.
    pub const ROOT_DATA: &str = "root_data";
    /// Operation options.
    pub const OPTIONS: &str = "options";
    /// The object whose fields are being read.
    pub const HOLDER: &str = "holder";
    /// The record being built.
    pub const WORKING_DATA: &str = "working_data";
    /// The field being converted.
    pub const FIELD: &str = "field";
    /// The field's original value.
    pub const FIELD_VALUE: &str = "field_value";
    /// The value currently being converted.
    pub const WORKING_VALUE: &str = "working_value";
}

/// A record under construction, shared by every context of one conversion.
///
/// Cloning yields another handle to the same record.
#[derive(Debug, Clone, Default)]
pub struct WorkingData {
    fields: Arc<RwLock<Map<String, Value>>>,
}

impl WorkingData {
    /// Copies the top level of an object. Returns `None` for non-objects.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        value.as_object().map(|map| Self {
            fields: Arc::new(RwLock::new(map.clone())),
        })
    }

    /// Returns a field's current value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.fields.read().get(key).cloned()
    }

    /// Writes a field.
    pub fn insert(&self, key: impl Into<String>, value: Value) {
        self.fields.write().insert(key.into(), value);
    }

    /// Returns true if the field is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.read().contains_key(key)
    }

    /// Returns a snapshot of the record.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.read().clone())
    }
}

fn default_holder<C: ConversionContext>(ctx: &C) -> Option<Arc<Value>> {
    ctx.root_data()
}

/// Options are an object; `null` stands for no options.
fn object_options<C: ConversionContext>(
    _ctx: &C,
    options: Arc<Value>,
) -> ContextResult<Arc<Value>> {
    match &*options {
        Value::Object(_) => Ok(options),
        Value::Null => Ok(Arc::new(Value::Object(Map::new()))),
        other => Err(ContextError::invalid_property(
            keys::OPTIONS,
            format!("expected an object, got {other}"),
        )),
    }
}

/// Properties shared by document and field contexts.
pub trait ConversionContext: OperationalContext {
    context_properties! {
        /// The model being converted.
        fn model / set_model: Model = keys::MODEL;
        /// The original record. Never modified by conversion.
        fn root_data / set_root_data: Value = keys::ROOT_DATA;
        /// Operation options, always an object.
        fn options / set_options: Value = keys::OPTIONS, set = object_options;
        /// The object fields are read from. Defaults to the root record.
        fn holder / set_holder: Value = keys::HOLDER, default = default_holder;
    }

    /// Returns the datasource.
    fn datasource(&self) -> Option<Arc<dyn Datasource>> {
        self.get::<Arc<dyn Datasource>>(keys::DATASOURCE)
            .map(|ds| Arc::clone(&*ds))
    }

    /// Sets the datasource.
    fn set_datasource(&self, datasource: Arc<dyn Datasource>) {
        self.set(keys::DATASOURCE, datasource);
    }

    /// Returns the active schema.
    ///
    /// When unset, the schema is looked up for the model through the
    /// datasource (or taken from the model when there is no datasource) and
    /// cached on this context. Fails if the lookup yields a plain object.
    fn schema(&self) -> ContextResult<Option<Arc<Schema>>> {
        if let Some(schema) = self.get::<Schema>(keys::SCHEMA) {
            return Ok(Some(schema));
        }
        let Some(model) = self.model() else {
            return Ok(None);
        };

        let source = match self.datasource() {
            Some(datasource) => datasource.get_schema(&model),
            None => Some(SchemaSource::Schema(Arc::clone(model.schema()))),
        };

        match source {
            Some(SchemaSource::Schema(schema)) => {
                trace!(model = model.name(), "schema resolved from datasource");
                self.set_arc(keys::SCHEMA, Arc::clone(&schema));
                Ok(Some(schema))
            }
            Some(SchemaSource::Plain(_)) => {
                Err(ContextError::plain_object_schema(Some(model.name())))
            }
            None => Ok(None),
        }
    }

    /// Sets the active schema.
    fn set_schema(&self, schema: impl Into<Arc<Schema>>) {
        self.set_arc(keys::SCHEMA, schema.into());
    }

    /// Sets the active schema from a datasource answer, refusing plain objects.
    fn set_schema_source(&self, source: SchemaSource) -> ContextResult<()> {
        match source {
            SchemaSource::Schema(schema) => {
                self.set_schema(schema);
                Ok(())
            }
            SchemaSource::Plain(_) => Err(ContextError::plain_object_schema(
                self.model().as_deref().map(Model::name),
            )),
        }
    }

    /// Returns the record being built.
    ///
    /// When unset, a copy of the root record is made and cached on this
    /// context, so later reads and child contexts share it.
    fn working_data(&self) -> Option<WorkingData> {
        if let Some(data) = self.get::<WorkingData>(keys::WORKING_DATA) {
            return Some(WorkingData::clone(&data));
        }
        let data = WorkingData::from_value(&*self.root_data()?)?;
        self.set(keys::WORKING_DATA, data.clone());
        Some(data)
    }

    /// Sets the record being built.
    fn set_working_data(&self, data: WorkingData) {
        self.set(keys::WORKING_DATA, data);
    }

    /// Creates a field context for a field of the active schema.
    ///
    /// The field value is read from the current holder at the time of the
    /// call.
    fn get_field_context(&self, name: &str) -> ContextResult<FieldContext> {
        let schema = self.schema()?.ok_or(ContextError::MissingSchema)?;
        let field = schema
            .field(name)
            .ok_or_else(|| ContextError::unknown_field(name))?;

        let child = FieldContext::new_with_parent(self);
        child.set_field(Arc::clone(field));
        match self.holder().and_then(|holder| holder.get(name).cloned()) {
            Some(value) => child.set_field_value(value),
            None => child.clear(keys::FIELD_VALUE),
        }
        child.clear(keys::WORKING_VALUE);

        trace!(field = name, depth = child.depth(), "field context created");
        Ok(child)
    }

    /// Creates a child describing an embedded document.
    ///
    /// The child's schema is `sub_schema`, and both its holder and its
    /// working data are `value`.
    fn with_value_of_sub_schema(&self, value: Value, sub_schema: impl Into<Arc<Schema>>) -> Self {
        let child = self.create_child();
        child.set_schema(sub_schema);
        match WorkingData::from_value(&value) {
            Some(data) => child.set_working_data(data),
            None => child.clear(keys::WORKING_DATA),
        }
        child.set_holder(value);
        child
    }
}

/// The context of a whole record.
#[derive(Debug, Clone, Default)]
pub struct DocumentContext {
    data: ContextData,
}

impl OperationalContext for DocumentContext {
    fn data(&self) -> &ContextData {
        &self.data
    }

    fn from_data(data: ContextData) -> Self {
        Self { data }
    }
}

impl ConversionContext for DocumentContext {}

impl DocumentContext {
    /// Creates a root context for converting `record` of `model`.
    #[must_use]
    pub fn for_record(model: Arc<Model>, datasource: Arc<dyn Datasource>, record: Value) -> Self {
        let ctx = Self::new();
        ctx.set_model(model);
        ctx.set_datasource(datasource);
        ctx.set_root_data(record);
        ctx
    }
}

fn default_working_value(ctx: &FieldContext) -> Option<Arc<Value>> {
    ctx.field_value()
}

/// The context of a single field.
#[derive(Debug, Clone, Default)]
pub struct FieldContext {
    data: ContextData,
}

impl OperationalContext for FieldContext {
    fn data(&self) -> &ContextData {
        &self.data
    }

    fn from_data(data: ContextData) -> Self {
        Self { data }
    }
}

impl ConversionContext for FieldContext {}

impl FieldContext {
    context_properties! {
        /// The field being converted.
        pub fn field / set_field: Field = keys::FIELD;
        /// The field's value as found in the holder.
        pub fn field_value / set_field_value: Value = keys::FIELD_VALUE;
        /// The value currently being converted. Defaults to the field value.
        pub fn working_value / set_working_value: Value = keys::WORKING_VALUE, default = default_working_value;
    }

    /// Returns the field's name, failing if no field is set.
    pub fn field_name(&self) -> ContextResult<String> {
        self.field()
            .map(|field| field.name().to_string())
            .ok_or(ContextError::MissingField)
    }

    /// Creates a child that converts `value` instead of the field value,
    /// optionally reading from a different holder.
    #[must_use]
    pub fn with_working_value(&self, value: Value, holder: Option<Value>) -> Self {
        let child = self.create_child();
        child.set_working_value(value);
        if let Some(holder) = holder {
            child.set_holder(holder);
        }
        child
    }
}

//! Conversion pipeline integration tests.
//!
//! These tests drive a document save and read through the public API:
//!
//! 1. Context chains: inheritance, shadowing and sibling isolation
//! 2. Field contexts derived from a document context
//! 3. Asynchronous converters, including ones that suspend
//! 4. Custom context types declared outside this crate

use std::sync::Arc;

use alchemy_context::{
    context_properties, convert_record, BoxFuture, ContextData, ContextError, ContextResult,
    ConversionContext, ConverterRegistry, Datasource, Direction, DocumentContext, Field,
    FieldContext, FieldConverter, MemoryDatasource, Model, OperationalContext, Schema,
    SchemaSource,
};
use serde_json::{json, Value};

/// Stores passwords as a fake digest, suspending once like a real hasher would.
struct PasswordConverter;

impl FieldConverter for PasswordConverter {
    fn convert<'a>(
        &'a self,
        ctx: &'a FieldContext,
        direction: Direction,
    ) -> BoxFuture<'a, ContextResult<Value>> {
        Box::pin(async move {
            tokio::task::yield_now().await;
            let value = ctx.working_value().unwrap_or_default();
            match direction {
                Direction::ToDatasource => {
                    let plain = value
                        .as_str()
                        .ok_or_else(|| ContextError::conversion("password", "expected a string"))?;
                    Ok(json!(format!("digest:{}", plain.len())))
                }
                Direction::FromDatasource => Ok(Value::clone(&value)),
            }
        })
    }
}

/// A datasource that stores every model under a fixed audit schema.
#[derive(Debug)]
struct AuditDatasource {
    schema: Arc<Schema>,
}

impl Datasource for AuditDatasource {
    fn name(&self) -> &str {
        "audit"
    }

    fn get_schema(&self, _model: &Model) -> Option<SchemaSource> {
        Some(SchemaSource::Schema(Arc::clone(&self.schema)))
    }
}

fn user_model() -> Arc<Model> {
    let profile = Schema::new()
        .with_field(Field::new("bio", "String"))
        .with_field(Field::new("age", "Integer"));
    let schema = Schema::new()
        .with_field(Field::new("name", "String"))
        .with_field(Field::new("password", "Password"))
        .with_field(Field::embedded("profile", profile))
        .with_field(Field::new("price", "Integer"));
    Arc::new(Model::new("User", schema))
}

fn registry() -> ConverterRegistry {
    let mut registry = ConverterRegistry::new();
    registry.register("Password", PasswordConverter);
    registry.register_fn("Integer", |ctx, _direction| {
        let value = ctx.working_value().unwrap_or_default();
        value
            .as_i64()
            .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
            .map(Value::from)
            .ok_or_else(|| ContextError::conversion(ctx.field_name().unwrap_or_default(), "not an integer"))
    });
    registry
}

#[test]
fn test_child_context_inherits_and_shadows_schema() {
    let root = DocumentContext::for_record(
        user_model(),
        Arc::new(MemoryDatasource::new("memory")),
        json!({}),
    );
    let schema = root.schema().unwrap().unwrap();

    let child = root.create_child();
    assert!(Arc::ptr_eq(&child.schema().unwrap().unwrap(), &schema));

    let replacement = Arc::new(Schema::new());
    child.set_schema(Arc::clone(&replacement));
    assert!(Arc::ptr_eq(&child.schema().unwrap().unwrap(), &replacement));
    assert!(Arc::ptr_eq(&root.schema().unwrap().unwrap(), &schema));
}

#[test]
fn test_datasource_schema_lookup() {
    let audit = Arc::new(Schema::new().with_field(Field::new("changed_by", "String")));
    let ctx = DocumentContext::for_record(
        user_model(),
        Arc::new(AuditDatasource {
            schema: Arc::clone(&audit),
        }),
        json!({ "changed_by": "ops" }),
    );

    assert!(Arc::ptr_eq(&ctx.schema().unwrap().unwrap(), &audit));
    assert_eq!(ctx.datasource().unwrap().name(), "audit");
    assert!(matches!(
        ctx.get_field_context("name"),
        Err(ContextError::UnknownField { .. })
    ));
}

#[test]
fn test_field_context_reads_holder_at_call_time() {
    let ctx = DocumentContext::for_record(
        user_model(),
        Arc::new(MemoryDatasource::new("memory")),
        json!({ "name": "ada", "price": 12 }),
    );

    let price = ctx.get_field_context("price").unwrap();
    assert_eq!(price.field().unwrap().name(), "price");
    assert_eq!(price.field_value().as_deref(), Some(&json!(12)));

    ctx.set_holder(json!({ "price": 99 }));
    let later = ctx.get_field_context("price").unwrap();
    assert_eq!(later.field_value().as_deref(), Some(&json!(99)));
    assert_eq!(price.field_value().as_deref(), Some(&json!(12)));
}

#[tokio::test]
async fn test_save_pipeline() {
    let record = json!({
        "name": "ada",
        "password": "hunter2",
        "profile": { "bio": "math", "age": "36" },
        "price": "12",
    });
    let ctx = DocumentContext::for_record(
        user_model(),
        Arc::new(MemoryDatasource::new("memory")),
        record.clone(),
    );

    let stored = convert_record(&ctx, &registry(), Direction::ToDatasource)
        .await
        .unwrap();

    assert_eq!(
        stored,
        json!({
            "name": "ada",
            "password": "digest:7",
            "profile": { "bio": "math", "age": 36 },
            "price": 12,
        })
    );
    assert_eq!(ctx.root_data().as_deref(), Some(&record));
    assert_eq!(ctx.working_data().unwrap().to_value(), stored);
}

#[tokio::test]
async fn test_failed_conversion_names_field() {
    let ctx = DocumentContext::for_record(
        user_model(),
        Arc::new(MemoryDatasource::new("memory")),
        json!({ "price": "twelve" }),
    );

    let err = convert_record(&ctx, &registry(), Direction::ToDatasource)
        .await
        .unwrap_err();
    assert_eq!(err, ContextError::conversion("price", "not an integer"));
}

#[tokio::test]
async fn test_conversions_run_concurrently_on_separate_trees() {
    let handles: Vec<_> = (0..8)
        .map(|i| {
            tokio::spawn(async move {
                let ctx = DocumentContext::for_record(
                    user_model(),
                    Arc::new(MemoryDatasource::new("memory")),
                    json!({ "name": format!("user{i}"), "price": i }),
                );
                let registry = registry();
                let stored = convert_record(&ctx, &registry, Direction::FromDatasource).await;
                stored
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let stored = handle.await.unwrap().unwrap();
        assert_eq!(stored["name"], json!(format!("user{i}")));
    }
}

#[derive(Debug, Clone)]
struct RequestContext {
    data: ContextData,
}

impl OperationalContext for RequestContext {
    fn data(&self) -> &ContextData {
        &self.data
    }

    fn from_data(data: ContextData) -> Self {
        Self { data }
    }
}

fn anonymous(_ctx: &RequestContext) -> Option<Arc<String>> {
    Some(Arc::new("anonymous".to_string()))
}

impl RequestContext {
    context_properties! {
        pub fn user / set_user: String = "user", default = anonymous;
        pub fn locale / set_locale: String = "locale";
    }
}

#[test]
fn test_custom_context_type() {
    let root = RequestContext::new();
    assert_eq!(root.user().as_deref().map(String::as_str), Some("anonymous"));

    root.set_locale("nl".to_string());
    let child = root.create_child();
    child.set_user("ada".to_string());

    assert_eq!(child.locale().as_deref().map(String::as_str), Some("nl"));
    assert_eq!(child.user().as_deref().map(String::as_str), Some("ada"));
    assert_eq!(root.user().as_deref().map(String::as_str), Some("anonymous"));
    assert_eq!(child.parent().unwrap().depth(), 0);
}

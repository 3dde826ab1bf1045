//! Errors raised by context properties and the conversion pipeline.

use thiserror::Error;

/// Result type alias using [`ContextError`].
pub type ContextResult<T> = Result<T, ContextError>;

/// Errors raised by operational contexts.
///
/// Reading a property that was never set is not an error; these variants
/// only cover values of the wrong shape and failed conversions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContextError {
    /// A plain data object was supplied where a schema is required.
    #[error("schema for model `{model}` is a plain object, not a schema")]
    PlainObjectSchema {
        /// The model the schema was resolved for, or `<unset>`.
        model: String,
    },

    /// An operation needed a schema but none is set or resolvable.
    #[error("no schema is available on this context")]
    MissingSchema,

    /// A property setter refused a value.
    #[error("invalid value for property `{property}`: {message}")]
    InvalidProperty {
        /// The property being set.
        property: String,
        /// Why the value was refused.
        message: String,
    },

    /// A field was requested that the active schema does not declare.
    #[error("schema has no field named `{field}`")]
    UnknownField {
        /// The requested field name.
        field: String,
    },

    /// A field context was used without a field.
    #[error("no field is set on this context")]
    MissingField,

    /// The holder of a record is not a JSON object.
    #[error("record holder is not an object")]
    HolderNotObject,

    /// No converter is registered for a field type.
    #[error("no converter registered for field type `{type_name}`")]
    UnknownFieldType {
        /// The field's type name.
        type_name: String,
    },

    /// A converter rejected a value.
    #[error("failed to convert field `{field}`: {message}")]
    Conversion {
        /// The field being converted.
        field: String,
        /// What went wrong.
        message: String,
    },
}

impl ContextError {
    /// Creates a plain object schema error.
    pub fn plain_object_schema(model: Option<&str>) -> Self {
        Self::PlainObjectSchema {
            model: model.unwrap_or("<unset>").to_string(),
        }
    }

    /// Creates an invalid property error.
    pub fn invalid_property(property: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidProperty {
            property: property.into(),
            message: message.into(),
        }
    }

    /// Creates an unknown field error.
    pub fn unknown_field(field: impl Into<String>) -> Self {
        Self::UnknownField {
            field: field.into(),
        }
    }

    /// Creates an unknown field type error.
    pub fn unknown_field_type(type_name: impl Into<String>) -> Self {
        Self::UnknownFieldType {
            type_name: type_name.into(),
        }
    }

    /// Creates a conversion error.
    pub fn conversion(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Conversion {
            field: field.into(),
            message: message.into(),
        }
    }
}

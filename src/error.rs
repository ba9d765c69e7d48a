//! Error types for schema generation, case transformation, coercion, and
//! the serialization engine

use thiserror::Error;

/// Errors that can occur while resolving types or generating schemas
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Declared type has no Avro mapping
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),
    /// Field declaration carries invalid parameters
    #[error("Invalid parameters for field '{field}': {reason}")]
    InvalidFieldParams { field: String, reason: String },
    /// Two fields or records collide on the same name
    #[error("Name collision in '{owner}': '{name}' declared more than once")]
    NameCollision { owner: String, name: String },
    /// Generated or supplied document violates the Avro schema grammar
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),
}

/// Errors that can occur during case transformation
#[derive(Debug, Error)]
pub enum CaseError {
    /// Case style token is not in the supported set
    #[error(
        "Unsupported case style: '{0}' (expected one of: camelcase, capitalcase, \
         constcase, lowercase, pascalcase, pathcase, snakecase, spinalcase, \
         upperkebabcase, trimcase, uppercase, alphanumcase)"
    )]
    UnsupportedCase(String),
}

/// Errors that can occur while coercing decoded data back into typed values
#[derive(Debug, Error)]
pub enum CoerceError {
    /// Text could not be parsed as the target type
    #[error("Invalid {target} format: {value}")]
    InvalidFormat { target: &'static str, value: String },
    /// Value does not match the declared field type
    #[error("Type mismatch for '{field}': expected {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: String,
        found: String,
    },
    /// Self-reference points at a model missing from the forward-reference map
    #[error("Unresolved reference: '{0}'")]
    UnresolvedReference(String),
    /// Decoded record is missing a declared field
    #[error("Missing field: '{0}'")]
    MissingField(String),
}

/// Errors that can occur while encoding or decoding wire data
#[derive(Debug, Error)]
pub enum CodecError {
    /// Binary codec failure
    #[error("Avro codec error: {0}")]
    Avro(#[from] apache_avro::Error),
    /// Value does not conform to the schema it is encoded against
    #[error("Value does not conform to schema: {0}")]
    NonConformant(String),
    /// Avro-JSON data violates the schema-directed grammar
    #[error("Invalid Avro JSON: {0}")]
    InvalidJson(String),
    /// JSON syntax failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Unknown serialization format token
    #[error("Unsupported serialization format: '{0}' (expected 'avro' or 'avro-json')")]
    UnsupportedFormat(String),
}

/// Top-level model serialization error type
#[derive(Debug, Error)]
pub enum ModelError {
    /// Schema resolution or generation error
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Case transformation error
    #[error("Case error: {0}")]
    Case(#[from] CaseError),

    /// Coercion error during deserialization
    #[error("Coerce error: {0}")]
    Coerce(#[from] CoerceError),

    /// Wire codec error
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),
}

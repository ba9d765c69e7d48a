//! Schema-driven Avro serialization for declared data models
//!
//! This library maps model declarations onto Avro schemas, reshapes the
//! generated documents between naming conventions, and serializes model
//! instances to Avro binary or Avro JSON and back.

pub mod api;
pub mod coerce;
pub mod error;
pub mod model;
pub mod schema;

pub(crate) mod convert;

// Re-export main types
pub use api::{AvroModel, SerializationFormat};
pub use coerce::{
    build_config, CastRule, CoercionConfig, CoercionOverrides, HookSet, HookTarget, TypeHook,
};
pub use error::{CaseError, CodecError, CoerceError, ModelError, SchemaError};
pub use model::{Attribute, DeclaredType, EnumType, Model, ModelMeta, Value};
pub use schema::{
    apply_case, apply_case_token, generate, parse_schema, parse_schema_with_options, CaseStyle,
    GeneratedSchema, SchemaParser, CASE_TOKENS,
};
pub use schema::{
    AvroSchema, EnumSchema, FieldOrder, FieldSchema, FixedSchema, LogicalType, LogicalTypeName,
    RecordSchema,
};

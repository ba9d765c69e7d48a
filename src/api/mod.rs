//! Public API for schema-driven model serialization.
//!
//! `AvroModel` binds a model declaration to everything derived from it:
//! the generated schema document, the codec schema compiled from that
//! document, and the coercion configuration used when deserializing.
//! Derivation is explicit and cached per instance. The first call that
//! needs the schema resolves the model; every later call on the same
//! instance reuses the result. Two `AvroModel`s built from the same
//! declaration hold independent caches, and reconfiguring an instance
//! through a builder method discards anything already derived.
//!
//! # Example
//! ```
//! use airframe::{Attribute, AvroModel, DeclaredType, Model, SerializationFormat, Value};
//!
//! let model = Model::new("Person")
//!     .with_attribute(Attribute::new("name", DeclaredType::Str))
//!     .with_attribute(Attribute::new("age", DeclaredType::Int32));
//! let bound = AvroModel::new(model);
//!
//! let person = Value::record(vec![
//!     ("name", Value::from("Ada")),
//!     ("age", Value::Int(36)),
//! ]);
//! let bytes = bound.serialize(&person, SerializationFormat::Binary)?;
//! let restored = bound.deserialize(&bytes, SerializationFormat::Binary)?;
//! assert_eq!(restored, person);
//! # Ok::<(), airframe::ModelError>(())
//! ```

use std::fmt;
use std::io::Cursor;
use std::sync::OnceLock;

use serde_json::Value as JsonValue;
use tracing::debug;

use crate::coerce::{build_config, CoercionConfig, CoercionOverrides};
use crate::convert::inbound::reconstruct_instance;
use crate::convert::json::{decode_json, encode_json};
use crate::convert::outbound::encode_instance;
use crate::error::{CaseError, CodecError, ModelError};
use crate::model::{Model, Value};
use crate::schema::{generate, CaseStyle, GeneratedSchema, NodeRegistry};

/// Wire format for serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerializationFormat {
    /// Avro binary without a container header
    Binary,
    /// The Avro JSON encoding
    Json,
}

impl SerializationFormat {
    /// Resolve a format token: `avro` selects binary, `avro-json` selects
    /// the JSON encoding.
    pub fn from_token(token: &str) -> Result<Self, CodecError> {
        match token {
            "avro" => Ok(Self::Binary),
            "avro-json" => Ok(Self::Json),
            other => Err(CodecError::UnsupportedFormat(other.to_string())),
        }
    }

    /// The token naming this format
    pub fn token(&self) -> &'static str {
        match self {
            Self::Binary => "avro",
            Self::Json => "avro-json",
        }
    }
}

impl fmt::Display for SerializationFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A model declaration bound to its derived schema and coercion
/// configuration.
///
/// Construction is cheap; schema resolution happens on first use and the
/// result is cached inside this instance. Dropping the instance drops the
/// cache.
#[derive(Debug)]
pub struct AvroModel {
    model: Model,
    case: Option<CaseStyle>,
    overrides: CoercionOverrides,
    generated: OnceLock<GeneratedSchema>,
    config: OnceLock<CoercionConfig>,
}

impl AvroModel {
    /// Bind a model with no case transform and default coercion.
    pub fn new(model: Model) -> Self {
        Self {
            model,
            case: None,
            overrides: CoercionOverrides::new(),
            generated: OnceLock::new(),
            config: OnceLock::new(),
        }
    }

    /// Apply a case style to every name in the generated document.
    ///
    /// Discards any schema already derived by this instance.
    pub fn with_case(mut self, case: CaseStyle) -> Self {
        self.case = Some(case);
        self.generated = OnceLock::new();
        self.config = OnceLock::new();
        self
    }

    /// Apply a case style by its token, e.g. `snakecase`.
    pub fn with_case_token(self, token: &str) -> Result<Self, CaseError> {
        Ok(self.with_case(CaseStyle::from_token(token)?))
    }

    /// Replace the coercion behavior applied during deserialization.
    ///
    /// Discards any configuration already derived by this instance.
    pub fn with_coercion(mut self, overrides: CoercionOverrides) -> Self {
        self.overrides = overrides;
        self.config = OnceLock::new();
        self
    }

    /// The bound model declaration
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// The case style applied to generated names, if any
    pub fn case(&self) -> Option<CaseStyle> {
        self.case
    }

    /// The schema derived from the model, resolving it on first use.
    pub fn schema(&self) -> Result<&GeneratedSchema, ModelError> {
        if let Some(generated) = self.generated.get() {
            return Ok(generated);
        }
        let generated = generate(&self.model, self.case)?;
        debug!(model = %self.model.name, "schema derived and cached");
        Ok(self.generated.get_or_init(|| generated))
    }

    /// The schema document as a JSON value.
    pub fn schema_document(&self) -> Result<&JsonValue, ModelError> {
        Ok(self.schema()?.document())
    }

    /// The schema document rendered as a JSON string.
    pub fn schema_json(&self) -> Result<String, ModelError> {
        let document = self.schema()?.document();
        serde_json::to_string(document).map_err(|e| ModelError::from(CodecError::from(e)))
    }

    fn coercion(&self) -> Result<&CoercionConfig, ModelError> {
        if let Some(config) = self.config.get() {
            return Ok(config);
        }
        let root = self.schema()?.root();
        let config = build_config(root, &self.overrides)?;
        Ok(self.config.get_or_init(|| config))
    }

    /// Check an instance against the schema without serializing it.
    pub fn validate(&self, instance: &Value) -> Result<(), ModelError> {
        let generated = self.schema()?;
        let root = generated.root();
        let registry = NodeRegistry::from_root(root);
        root.validate_record(instance, &registry, &root.name)?;
        Ok(())
    }

    /// Serialize an instance in the given format.
    pub fn serialize(
        &self,
        instance: &Value,
        format: SerializationFormat,
    ) -> Result<Vec<u8>, ModelError> {
        let generated = self.schema()?;
        let encoded = encode_instance(generated.root(), generated.schema(), instance)?;
        let bytes = match format {
            SerializationFormat::Binary => {
                apache_avro::to_avro_datum(generated.writer(), encoded)
                    .map_err(CodecError::from)?
            }
            SerializationFormat::Json => {
                let rendered = encode_json(generated.schema(), &encoded)?;
                serde_json::to_vec(&rendered).map_err(CodecError::from)?
            }
        };
        debug!(
            model = %self.model.name,
            format = %format,
            bytes = bytes.len(),
            "serialized instance"
        );
        Ok(bytes)
    }

    /// Deserialize bytes in the given format back into a typed instance.
    pub fn deserialize(
        &self,
        bytes: &[u8],
        format: SerializationFormat,
    ) -> Result<Value, ModelError> {
        let generated = self.schema()?;
        let config = self.coercion()?;
        let decoded = match format {
            SerializationFormat::Binary => {
                let mut reader = Cursor::new(bytes);
                apache_avro::from_avro_datum(generated.writer(), &mut reader, None)
                    .map_err(CodecError::from)?
            }
            SerializationFormat::Json => {
                let json: JsonValue = serde_json::from_slice(bytes).map_err(CodecError::from)?;
                decode_json(generated.schema(), &json)?
            }
        };
        let instance = reconstruct_instance(generated.root(), config, decoded)?;
        debug!(model = %self.model.name, format = %format, "deserialized instance");
        Ok(instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoerceError;
    use crate::model::{Attribute, DeclaredType};

    fn person_model() -> Model {
        Model::new("PersonRecord")
            .with_attribute(Attribute::new("fullName", DeclaredType::Str))
            .with_attribute(Attribute::new(
                "nickname",
                DeclaredType::optional(DeclaredType::Str),
            ))
            .with_attribute(Attribute::new(
                "tags",
                DeclaredType::list(DeclaredType::Str),
            ))
    }

    fn person_instance() -> Value {
        Value::record(vec![
            ("fullName", Value::from("Ada Lovelace")),
            ("nickname", Value::Null),
            ("tags", Value::List(vec![Value::from("x"), Value::from("y")])),
        ])
    }

    #[test]
    fn test_format_tokens() {
        assert_eq!(
            SerializationFormat::from_token("avro").unwrap(),
            SerializationFormat::Binary
        );
        assert_eq!(
            SerializationFormat::from_token("avro-json").unwrap(),
            SerializationFormat::Json
        );
        assert_eq!(SerializationFormat::Binary.to_string(), "avro");
        match SerializationFormat::from_token("xml") {
            Err(CodecError::UnsupportedFormat(token)) => assert_eq!(token, "xml"),
            other => panic!("Expected unsupported format, got {other:?}"),
        }
    }

    #[test]
    fn test_schema_is_cached_per_instance() {
        let bound = AvroModel::new(person_model());
        let first = bound.schema().unwrap();
        let second = bound.schema().unwrap();
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn test_binary_round_trip() {
        let bound = AvroModel::new(person_model());
        let instance = person_instance();
        let bytes = bound
            .serialize(&instance, SerializationFormat::Binary)
            .unwrap();
        let restored = bound
            .deserialize(&bytes, SerializationFormat::Binary)
            .unwrap();
        assert_eq!(restored, instance);
    }

    #[test]
    fn test_json_round_trip() {
        let bound = AvroModel::new(person_model());
        let instance = person_instance();
        let bytes = bound
            .serialize(&instance, SerializationFormat::Json)
            .unwrap();
        let document: JsonValue = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(document["fullName"], serde_json::json!("Ada Lovelace"));
        assert_eq!(document["nickname"], JsonValue::Null);
        let restored = bound.deserialize(&bytes, SerializationFormat::Json).unwrap();
        assert_eq!(restored, instance);
    }

    #[test]
    fn test_case_shapes_wire_names_only() {
        let bound = AvroModel::new(person_model())
            .with_case_token("snakecase")
            .unwrap();
        let rendered = bound.schema_json().unwrap();
        assert!(rendered.contains("person_record"));
        assert!(rendered.contains("full_name"));

        let instance = person_instance();
        let bytes = bound
            .serialize(&instance, SerializationFormat::Json)
            .unwrap();
        let document: JsonValue = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(document["full_name"], serde_json::json!("Ada Lovelace"));

        // Declared spellings come back on deserialization
        let restored = bound.deserialize(&bytes, SerializationFormat::Json).unwrap();
        assert_eq!(restored, instance);
    }

    #[test]
    fn test_builder_reconfiguration_discards_cache() {
        let bound = AvroModel::new(person_model());
        let plain = bound.schema_json().unwrap();
        assert!(plain.contains("fullName"));
        let recased = bound.with_case(CaseStyle::Snake);
        let rendered = recased.schema_json().unwrap();
        assert!(rendered.contains("full_name"));
    }

    #[test]
    fn test_validate_reports_mismatch() {
        let bound = AvroModel::new(person_model());
        let wrong = Value::record(vec![
            ("fullName", Value::Int(7)),
            ("nickname", Value::Null),
            ("tags", Value::List(vec![])),
        ]);
        match bound.validate(&wrong) {
            Err(ModelError::Coerce(CoerceError::TypeMismatch { field, .. })) => {
                assert!(field.contains("fullName"));
            }
            other => panic!("Expected type mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_format_token_errors() {
        match SerializationFormat::from_token("protobuf") {
            Err(CodecError::UnsupportedFormat(_)) => {}
            other => panic!("Expected unsupported format, got {other:?}"),
        }
    }
}

//! Model declarations
//!
//! A `Model` is the typed description a schema is generated from: a named
//! record with ordered, typed attributes and optional record metadata.
//! `Model::from_schema` runs the reverse direction and rebuilds a
//! declaration from an existing Avro schema document.

mod declared;
mod value;

pub use declared::{DeclaredType, EnumType};
pub use value::Value;

use serde_json::Value as JsonValue;

use crate::convert::latin1_bytes;
use crate::error::SchemaError;
use crate::schema::{AvroSchema, LogicalTypeName, RecordSchema, SchemaParser};

/// Record-level metadata attached to a model
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelMeta {
    /// Namespace for the generated record
    pub namespace: Option<String>,
    /// Documentation string for the generated record
    pub doc: Option<String>,
    /// Alternative names for the generated record
    pub aliases: Vec<String>,
}

/// A single typed attribute of a model
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    /// Attribute name as declared; decoded instances key fields by this name
    pub name: String,
    /// Declared type
    pub declared: DeclaredType,
    /// Optional default value
    pub default: Option<Value>,
    /// Optional documentation string
    pub doc: Option<String>,
    /// Alternative names
    pub aliases: Vec<String>,
}

impl Attribute {
    /// Create an attribute with a name and declared type
    pub fn new(name: impl Into<String>, declared: DeclaredType) -> Self {
        Self {
            name: name.into(),
            declared,
            default: None,
            doc: None,
            aliases: Vec::new(),
        }
    }

    /// Set the default value
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Set the documentation string
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Set alternative names
    pub fn with_aliases(mut self, aliases: Vec<String>) -> Self {
        self.aliases = aliases;
        self
    }
}

/// A typed record declaration
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    /// Record name
    pub name: String,
    /// Record metadata
    pub meta: ModelMeta,
    /// Attributes in declaration order; order fixes binary field order
    pub attributes: Vec<Attribute>,
}

impl Model {
    /// Create an empty model with a name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            meta: ModelMeta::default(),
            attributes: Vec::new(),
        }
    }

    /// Append an attribute
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Set the namespace
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.meta.namespace = Some(namespace.into());
        self
    }

    /// Set the documentation string
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.meta.doc = Some(doc.into());
        self
    }

    /// Set alternative names
    pub fn with_aliases(mut self, aliases: Vec<String>) -> Self {
        self.meta.aliases = aliases;
        self
    }

    /// Fully qualified name (namespace.name when a namespace is set)
    pub fn fullname(&self) -> String {
        match &self.meta.namespace {
            Some(ns) if !ns.is_empty() => format!("{}.{}", ns, self.name),
            _ => self.name.clone(),
        }
    }

    /// Look up an attribute by name
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Rebuild a model declaration from an Avro record schema document
    pub fn from_schema(document: &JsonValue) -> Result<Model, SchemaError> {
        let mut parser = SchemaParser::new();
        let schema = parser.parse(document)?;
        match schema {
            AvroSchema::Record(record) => Self::from_record_schema(&record),
            other => Err(SchemaError::InvalidSchema(format!(
                "expected a record schema at the document root, found '{}'",
                other.type_name()
            ))),
        }
    }

    /// Rebuild a model declaration from an Avro record schema JSON string
    pub fn from_schema_str(document: &str) -> Result<Model, SchemaError> {
        let json: JsonValue = serde_json::from_str(document)
            .map_err(|e| SchemaError::InvalidSchema(format!("invalid JSON: {e}")))?;
        Self::from_schema(&json)
    }

    fn from_record_schema(record: &RecordSchema) -> Result<Model, SchemaError> {
        let mut model = Model::new(record.name.clone());
        model.meta.namespace = record.namespace.clone();
        model.meta.doc = record.doc.clone();
        model.meta.aliases = record.aliases.clone();
        for field in &record.fields {
            let declared = declared_from_schema(&field.schema)?;
            let mut attribute = Attribute::new(field.name.clone(), declared);
            if let Some(default) = &field.default {
                attribute.default = Some(default_from_json(default, &attribute.declared)?);
            }
            attribute.doc = field.doc.clone();
            attribute.aliases = field.aliases.clone();
            model.attributes.push(attribute);
        }
        Ok(model)
    }
}

/// Map a parsed schema fragment back to a declared type
fn declared_from_schema(schema: &AvroSchema) -> Result<DeclaredType, SchemaError> {
    let declared = match schema {
        AvroSchema::Null => DeclaredType::Null,
        AvroSchema::Boolean => DeclaredType::Bool,
        AvroSchema::Int => DeclaredType::Int32,
        AvroSchema::Long => DeclaredType::Int64,
        AvroSchema::Float => DeclaredType::Float32,
        AvroSchema::Double => DeclaredType::Float64,
        AvroSchema::Bytes => DeclaredType::Bytes,
        AvroSchema::String => DeclaredType::Str,
        AvroSchema::Record(record) => DeclaredType::Model(Box::new(Model::from_record_schema(
            record,
        )?)),
        AvroSchema::Enum(e) => {
            let mut declared = EnumType::new(e.name.clone(), e.symbols.clone());
            declared.namespace = e.namespace.clone();
            declared.doc = e.doc.clone();
            declared.aliases = e.aliases.clone();
            declared.default = e.default.clone();
            DeclaredType::Enum(declared)
        }
        AvroSchema::Array(items) => DeclaredType::list(declared_from_schema(items)?),
        AvroSchema::Map(values) => DeclaredType::map(declared_from_schema(values)?),
        AvroSchema::Union(members) => {
            let declared: Vec<DeclaredType> = members
                .iter()
                .map(declared_from_schema)
                .collect::<Result<_, _>>()?;
            match declared.as_slice() {
                [DeclaredType::Null, other] => DeclaredType::optional(other.clone()),
                _ => DeclaredType::Union(declared),
            }
        }
        AvroSchema::Fixed(fixed) => DeclaredType::named_fixed(fixed.name.clone(), fixed.size),
        AvroSchema::Named(name) => DeclaredType::Reference(name.clone()),
        AvroSchema::Logical(logical) => match &logical.logical_type {
            LogicalTypeName::Date => DeclaredType::Date,
            LogicalTypeName::TimeMillis => DeclaredType::Time,
            LogicalTypeName::TimeMicros => DeclaredType::TimeMicros,
            LogicalTypeName::TimestampMillis => DeclaredType::Datetime,
            LogicalTypeName::TimestampMicros => DeclaredType::DatetimeMicros,
            LogicalTypeName::Uuid => DeclaredType::Uuid,
            LogicalTypeName::Decimal { precision, scale } => match logical.base.as_ref() {
                AvroSchema::Fixed(fixed) => {
                    DeclaredType::decimal_fixed(*precision, *scale, fixed.size)
                }
                _ => DeclaredType::decimal(*precision, *scale),
            },
        },
    };
    Ok(declared)
}

/// Convert an Avro JSON default into a native value guided by the declared
/// type. Bytes and fixed defaults use the ISO-8859-1 string convention.
fn default_from_json(json: &JsonValue, declared: &DeclaredType) -> Result<Value, SchemaError> {
    let fail = |expected: &str| {
        Err(SchemaError::InvalidSchema(format!(
            "default {json} is not a valid {expected} value"
        )))
    };
    match declared {
        DeclaredType::Null => match json {
            JsonValue::Null => Ok(Value::Null),
            _ => fail("null"),
        },
        DeclaredType::Bool => match json.as_bool() {
            Some(b) => Ok(Value::Boolean(b)),
            None => fail("boolean"),
        },
        DeclaredType::Int32 => match json.as_i64().and_then(|n| i32::try_from(n).ok()) {
            Some(n) => Ok(Value::Int(n)),
            None => fail("int"),
        },
        DeclaredType::Int64 => match json.as_i64() {
            Some(n) => Ok(Value::Long(n)),
            None => fail("long"),
        },
        DeclaredType::Float32 => match json.as_f64() {
            Some(n) => Ok(Value::Float(n as f32)),
            None => fail("float"),
        },
        DeclaredType::Float64 => match json.as_f64() {
            Some(n) => Ok(Value::Double(n)),
            None => fail("double"),
        },
        DeclaredType::Bytes | DeclaredType::Decimal { .. } => match json.as_str() {
            Some(s) => latin1_bytes(s)
                .map(Value::Bytes)
                .ok_or_else(|| SchemaError::InvalidSchema(format!(
                    "default {json} contains characters outside ISO-8859-1"
                ))),
            None => fail("bytes"),
        },
        DeclaredType::Fixed { .. } => match json.as_str() {
            Some(s) => latin1_bytes(s)
                .map(Value::Fixed)
                .ok_or_else(|| SchemaError::InvalidSchema(format!(
                    "default {json} contains characters outside ISO-8859-1"
                ))),
            None => fail("fixed"),
        },
        DeclaredType::Str => match json.as_str() {
            Some(s) => Ok(Value::String(s.to_string())),
            None => fail("string"),
        },
        DeclaredType::Uuid => match json.as_str() {
            Some(s) => match uuid::Uuid::parse_str(s) {
                Ok(u) => Ok(Value::Uuid(u)),
                Err(_) => fail("uuid"),
            },
            None => fail("uuid"),
        },
        DeclaredType::Date => match json.as_i64().and_then(|n| i32::try_from(n).ok()) {
            Some(days) => match crate::convert::date_from_days(days) {
                Some(d) => Ok(Value::Date(d)),
                None => fail("date"),
            },
            None => fail("date"),
        },
        DeclaredType::Time => match json.as_i64().and_then(|n| i32::try_from(n).ok()) {
            Some(ms) => match crate::convert::time_from_millis(ms) {
                Some(t) => Ok(Value::Time(t)),
                None => fail("time-millis"),
            },
            None => fail("time-millis"),
        },
        DeclaredType::TimeMicros => match json.as_i64() {
            Some(us) => match crate::convert::time_from_micros(us) {
                Some(t) => Ok(Value::Time(t)),
                None => fail("time-micros"),
            },
            None => fail("time-micros"),
        },
        DeclaredType::Datetime => match json.as_i64() {
            Some(ms) => match crate::convert::datetime_from_millis(ms) {
                Some(t) => Ok(Value::Datetime(t)),
                None => fail("timestamp-millis"),
            },
            None => fail("timestamp-millis"),
        },
        DeclaredType::DatetimeMicros => match json.as_i64() {
            Some(us) => match crate::convert::datetime_from_micros(us) {
                Some(t) => Ok(Value::Datetime(t)),
                None => fail("timestamp-micros"),
            },
            None => fail("timestamp-micros"),
        },
        DeclaredType::Enum(e) => match json.as_str() {
            Some(s) if e.symbols.iter().any(|sym| sym == s) => Ok(Value::Enum(s.to_string())),
            Some(_) | None => fail("enum symbol"),
        },
        // Union defaults apply to the first branch
        DeclaredType::Optional(_) => match json {
            JsonValue::Null => Ok(Value::Null),
            _ => fail("null"),
        },
        DeclaredType::Union(members) => match members.first() {
            Some(first) => default_from_json(json, first),
            None => fail("union"),
        },
        DeclaredType::List(element) => match json.as_array() {
            Some(items) => Ok(Value::List(
                items
                    .iter()
                    .map(|item| default_from_json(item, element))
                    .collect::<Result<_, _>>()?,
            )),
            None => fail("array"),
        },
        DeclaredType::Tuple(members) => match json.as_array() {
            Some(items) if items.len() == members.len() => Ok(Value::Tuple(
                items
                    .iter()
                    .zip(members)
                    .map(|(item, member)| default_from_json(item, member))
                    .collect::<Result<_, _>>()?,
            )),
            Some(_) | None => fail("tuple"),
        },
        DeclaredType::Map(_, values) => match json.as_object() {
            Some(entries) => {
                let mut map = std::collections::BTreeMap::new();
                for (k, v) in entries {
                    map.insert(k.clone(), default_from_json(v, values)?);
                }
                Ok(Value::Map(map))
            }
            None => fail("map"),
        },
        DeclaredType::Model(model) => match json.as_object() {
            Some(entries) => {
                let mut fields = Vec::with_capacity(model.attributes.len());
                for attribute in &model.attributes {
                    let field_json = entries.get(&attribute.name).ok_or_else(|| {
                        SchemaError::InvalidSchema(format!(
                            "record default is missing field '{}'",
                            attribute.name
                        ))
                    })?;
                    fields.push((
                        attribute.name.clone(),
                        default_from_json(field_json, &attribute.declared)?,
                    ));
                }
                Ok(Value::Record(fields))
            }
            None => fail("record"),
        },
        DeclaredType::Reference(name) => Err(SchemaError::InvalidSchema(format!(
            "defaults on reference type '{name}' are not supported"
        ))),
    }
}

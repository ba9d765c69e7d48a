//! Field node hierarchy.
//!
//! Every declared attribute resolves to one `FieldNode`. A node knows how to
//! render its Avro schema fragment, how to validate a native value against
//! itself, and how to render a declared default into Avro JSON default form.
//! Records nest recursively; self-references render as bare named references
//! and are resolved through a `NodeRegistry` when values are walked.

use std::collections::HashMap;

use serde_json::Value as JsonValue;

use crate::coerce::hooks;
use crate::convert::latin1_string;
use crate::error::CoerceError;
use crate::model::Value;
use crate::schema::types::{
    AvroSchema, EnumSchema, FixedSchema, LogicalType, LogicalTypeName, RecordSchema,
};

/// A resolved field type
#[derive(Debug, Clone, PartialEq)]
pub enum FieldNode {
    /// Direct Avro primitive
    Immutable(AvroSchema),
    /// Ordered homogeneous sequence
    Array(Box<FieldNode>),
    /// Fixed-arity heterogeneous sequence encoded as an array, cast back to
    /// a tuple on decode
    Tuple(TupleNode),
    /// String-keyed mapping
    Map(Box<FieldNode>),
    /// Ordered alternatives; null, when present, is always the first branch
    Union(UnionNode),
    /// Closed symbol set
    Enum(EnumSchema),
    /// Metadata-carrying type over a primitive or fixed base
    Logical(LogicalNode),
    /// Nested record, expanded exactly once
    Record(RecordNode),
    /// Reference to an enclosing record by fullname, never re-expanded
    SelfReference(String),
}

/// Tuple encoding: the wire item type is the union of the distinct member
/// types (or the bare type when they all agree); `members` keeps the
/// per-position nodes for validation and decode-side casting
#[derive(Debug, Clone, PartialEq)]
pub struct TupleNode {
    pub item: Box<FieldNode>,
    pub members: Vec<FieldNode>,
}

impl TupleNode {
    /// Declared arity
    pub fn arity(&self) -> usize {
        self.members.len()
    }

    /// Node for a tuple position
    pub fn member(&self, position: usize) -> Option<&FieldNode> {
        self.members.get(position)
    }
}

/// Union alternatives in wire order
#[derive(Debug, Clone, PartialEq)]
pub struct UnionNode {
    pub variants: Vec<FieldNode>,
}

impl UnionNode {
    /// Whether null is one of the alternatives
    pub fn has_null(&self) -> bool {
        self.variants
            .iter()
            .any(|v| matches!(v, FieldNode::Immutable(AvroSchema::Null)))
    }
}

/// Logical node kinds
#[derive(Debug, Clone, PartialEq)]
pub enum LogicalKind {
    /// Days since the Unix epoch over int
    Date,
    /// Milliseconds since midnight over int
    TimeMillis,
    /// Microseconds since midnight over long
    TimeMicros,
    /// Milliseconds since the Unix epoch over long
    TimestampMillis,
    /// Microseconds since the Unix epoch over long
    TimestampMicros,
    /// UUID text over string
    Uuid,
    /// Scaled integer over bytes, or over fixed when a size is declared
    Decimal {
        precision: u32,
        scale: u32,
        fixed: Option<FixedSpec>,
    },
    /// Raw fixed-length bytes
    Fixed(FixedSpec),
}

/// Name and size of a fixed rendering
#[derive(Debug, Clone, PartialEq)]
pub struct FixedSpec {
    pub name: String,
    pub size: usize,
}

/// Metadata-carrying node
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalNode {
    pub kind: LogicalKind,
}

/// A record field: declared attribute name, resolved node, and metadata.
/// Decoded instances key fields by `name` even when the rendered document
/// carries a case-transformed spelling.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub node: FieldNode,
    pub default: Option<Value>,
    pub doc: Option<String>,
    pub aliases: Vec<String>,
}

/// A resolved record
#[derive(Debug, Clone, PartialEq)]
pub struct RecordNode {
    pub name: String,
    pub namespace: Option<String>,
    pub doc: Option<String>,
    pub aliases: Vec<String>,
    pub fields: Vec<FieldDef>,
}

impl RecordNode {
    /// Fully qualified name
    pub fn fullname(&self) -> String {
        match &self.namespace {
            Some(ns) if !ns.is_empty() => format!("{}.{}", ns, self.name),
            _ => self.name.clone(),
        }
    }

    /// Look up a field by declared attribute name
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Render to the typed record schema
    pub fn to_record_schema(&self) -> RecordSchema {
        let fields = self
            .fields
            .iter()
            .map(|f| {
                let default = f
                    .default
                    .as_ref()
                    .and_then(|d| f.node.default_json(d).ok());
                crate::schema::types::FieldSchema {
                    name: f.name.clone(),
                    schema: f.node.to_schema(),
                    default,
                    doc: f.doc.clone(),
                    order: crate::schema::types::FieldOrder::Ascending,
                    aliases: f.aliases.clone(),
                }
            })
            .collect();
        RecordSchema {
            name: self.name.clone(),
            namespace: self.namespace.clone(),
            fields,
            doc: self.doc.clone(),
            aliases: self.aliases.clone(),
        }
    }

    /// Validate a record value against this node
    pub fn validate_record(
        &self,
        value: &Value,
        registry: &NodeRegistry<'_>,
        path: &str,
    ) -> Result<(), CoerceError> {
        let fields = match value {
            Value::Record(fields) => fields,
            other => {
                return Err(CoerceError::TypeMismatch {
                    field: path.to_string(),
                    expected: format!("record {}", self.name),
                    found: other.kind().to_string(),
                })
            }
        };
        for def in &self.fields {
            let field_path = format!("{}.{}", path, def.name);
            match fields.iter().find(|(n, _)| n == &def.name) {
                Some((_, v)) => def.node.validate(v, registry, &field_path)?,
                None if def.default.is_some() => {}
                None => return Err(CoerceError::MissingField(field_path)),
            }
        }
        Ok(())
    }
}

/// Registry of record nodes by fullname, for resolving self-references while
/// walking values
pub struct NodeRegistry<'a> {
    records: HashMap<String, &'a RecordNode>,
}

impl<'a> NodeRegistry<'a> {
    /// Collect every record node reachable from the root
    pub fn from_root(root: &'a RecordNode) -> Self {
        let mut registry = Self {
            records: HashMap::new(),
        };
        registry.collect_record(root);
        registry
    }

    fn collect_record(&mut self, record: &'a RecordNode) {
        self.records.insert(record.fullname(), record);
        // Bare-name lookup stays available alongside the fullname
        self.records.entry(record.name.clone()).or_insert(record);
        for field in &record.fields {
            self.collect_node(&field.node);
        }
    }

    fn collect_node(&mut self, node: &'a FieldNode) {
        match node {
            FieldNode::Record(record) => self.collect_record(record),
            FieldNode::Array(inner) | FieldNode::Map(inner) => self.collect_node(inner),
            FieldNode::Tuple(tuple) => {
                self.collect_node(&tuple.item);
                for member in &tuple.members {
                    self.collect_node(member);
                }
            }
            FieldNode::Union(union) => {
                for variant in &union.variants {
                    self.collect_node(variant);
                }
            }
            FieldNode::Immutable(_)
            | FieldNode::Enum(_)
            | FieldNode::Logical(_)
            | FieldNode::SelfReference(_) => {}
        }
    }

    /// Look up a record by name or fullname
    pub fn get(&self, name: &str) -> Option<&'a RecordNode> {
        self.records.get(name).copied()
    }
}

impl FieldNode {
    /// Render this node to its typed schema fragment
    pub fn to_schema(&self) -> AvroSchema {
        match self {
            FieldNode::Immutable(schema) => schema.clone(),
            FieldNode::Array(inner) => AvroSchema::Array(Box::new(inner.to_schema())),
            FieldNode::Tuple(tuple) => AvroSchema::Array(Box::new(tuple.item.to_schema())),
            FieldNode::Map(inner) => AvroSchema::Map(Box::new(inner.to_schema())),
            FieldNode::Union(union) => {
                AvroSchema::Union(union.variants.iter().map(|v| v.to_schema()).collect())
            }
            FieldNode::Enum(e) => AvroSchema::Enum(e.clone()),
            FieldNode::Logical(logical) => match &logical.kind {
                LogicalKind::Date => {
                    AvroSchema::Logical(LogicalType::new(AvroSchema::Int, LogicalTypeName::Date))
                }
                LogicalKind::TimeMillis => AvroSchema::Logical(LogicalType::new(
                    AvroSchema::Int,
                    LogicalTypeName::TimeMillis,
                )),
                LogicalKind::TimeMicros => AvroSchema::Logical(LogicalType::new(
                    AvroSchema::Long,
                    LogicalTypeName::TimeMicros,
                )),
                LogicalKind::TimestampMillis => AvroSchema::Logical(LogicalType::new(
                    AvroSchema::Long,
                    LogicalTypeName::TimestampMillis,
                )),
                LogicalKind::TimestampMicros => AvroSchema::Logical(LogicalType::new(
                    AvroSchema::Long,
                    LogicalTypeName::TimestampMicros,
                )),
                LogicalKind::Uuid => {
                    AvroSchema::Logical(LogicalType::new(AvroSchema::String, LogicalTypeName::Uuid))
                }
                LogicalKind::Decimal {
                    precision,
                    scale,
                    fixed,
                } => {
                    let base = match fixed {
                        Some(spec) => AvroSchema::Fixed(FixedSchema::new(&spec.name, spec.size)),
                        None => AvroSchema::Bytes,
                    };
                    AvroSchema::Logical(LogicalType::new(
                        base,
                        LogicalTypeName::Decimal {
                            precision: *precision,
                            scale: *scale,
                        },
                    ))
                }
                LogicalKind::Fixed(spec) => {
                    AvroSchema::Fixed(FixedSchema::new(&spec.name, spec.size))
                }
            },
            FieldNode::Record(record) => AvroSchema::Record(record.to_record_schema()),
            FieldNode::SelfReference(name) => AvroSchema::Named(name.clone()),
        }
    }

    /// Compact type description for diagnostics
    pub fn describe(&self) -> String {
        match self {
            FieldNode::Immutable(schema) => schema.type_name().to_string(),
            FieldNode::Array(inner) => format!("array<{}>", inner.describe()),
            FieldNode::Tuple(tuple) => {
                let members: Vec<String> = tuple.members.iter().map(|v| v.describe()).collect();
                format!("tuple<{}>", members.join(", "))
            }
            FieldNode::Map(inner) => format!("map<{}>", inner.describe()),
            FieldNode::Union(union) => {
                let members: Vec<String> = union.variants.iter().map(|v| v.describe()).collect();
                format!("union<{}>", members.join(", "))
            }
            FieldNode::Enum(e) => format!("enum {}", e.name),
            FieldNode::Logical(logical) => match &logical.kind {
                LogicalKind::Date => "date".to_string(),
                LogicalKind::TimeMillis => "time-millis".to_string(),
                LogicalKind::TimeMicros => "time-micros".to_string(),
                LogicalKind::TimestampMillis => "timestamp-millis".to_string(),
                LogicalKind::TimestampMicros => "timestamp-micros".to_string(),
                LogicalKind::Uuid => "uuid".to_string(),
                LogicalKind::Decimal {
                    precision, scale, ..
                } => format!("decimal({}, {})", precision, scale),
                LogicalKind::Fixed(spec) => format!("fixed({})", spec.size),
            },
            FieldNode::Record(record) => format!("record {}", record.name),
            FieldNode::SelfReference(name) => format!("record {}", name),
        }
    }

    /// Union branch label for the Avro JSON encoding: fullname for named
    /// types, base type name otherwise
    pub fn branch_name(&self) -> String {
        match self {
            FieldNode::Immutable(schema) => schema.type_name().to_string(),
            FieldNode::Array(_) | FieldNode::Tuple(_) => "array".to_string(),
            FieldNode::Map(_) => "map".to_string(),
            FieldNode::Union(_) => "union".to_string(),
            FieldNode::Enum(e) => e.fullname(),
            FieldNode::Logical(logical) => match &logical.kind {
                LogicalKind::Date | LogicalKind::TimeMillis => "int".to_string(),
                LogicalKind::TimeMicros
                | LogicalKind::TimestampMillis
                | LogicalKind::TimestampMicros => "long".to_string(),
                LogicalKind::Uuid => "string".to_string(),
                LogicalKind::Decimal { fixed, .. } => match fixed {
                    Some(spec) => spec.name.clone(),
                    None => "bytes".to_string(),
                },
                LogicalKind::Fixed(spec) => spec.name.clone(),
            },
            FieldNode::Record(record) => record.fullname(),
            FieldNode::SelfReference(name) => name.clone(),
        }
    }

    /// Whether this node is a union with a null branch
    pub fn is_nullable(&self) -> bool {
        match self {
            FieldNode::Union(union) => union.has_null(),
            _ => false,
        }
    }

    /// Validate a native value against this node
    pub fn validate(
        &self,
        value: &Value,
        registry: &NodeRegistry<'_>,
        path: &str,
    ) -> Result<(), CoerceError> {
        let mismatch = || {
            Err(CoerceError::TypeMismatch {
                field: path.to_string(),
                expected: self.describe(),
                found: value.kind().to_string(),
            })
        };
        match self {
            FieldNode::Immutable(schema) => match (schema, value) {
                (AvroSchema::Null, Value::Null)
                | (AvroSchema::Boolean, Value::Boolean(_))
                | (AvroSchema::Int, Value::Int(_))
                | (AvroSchema::Long, Value::Long(_))
                | (AvroSchema::Long, Value::Int(_))
                | (AvroSchema::Float, Value::Float(_))
                | (AvroSchema::Double, Value::Double(_))
                | (AvroSchema::Double, Value::Float(_))
                | (AvroSchema::Bytes, Value::Bytes(_))
                | (AvroSchema::Bytes, Value::String(_))
                | (AvroSchema::String, Value::String(_)) => Ok(()),
                _ => mismatch(),
            },
            FieldNode::Array(inner) => {
                let items = match value {
                    Value::List(items) | Value::Tuple(items) => items,
                    _ => return mismatch(),
                };
                for (i, item) in items.iter().enumerate() {
                    inner.validate(item, registry, &format!("{}[{}]", path, i))?;
                }
                Ok(())
            }
            FieldNode::Tuple(tuple) => {
                let items = match value {
                    Value::Tuple(items) | Value::List(items) => items,
                    _ => return mismatch(),
                };
                if items.len() != tuple.arity() {
                    return mismatch();
                }
                for (i, item) in items.iter().enumerate() {
                    let member = tuple.member(i).ok_or_else(|| CoerceError::TypeMismatch {
                        field: path.to_string(),
                        expected: self.describe(),
                        found: value.kind().to_string(),
                    })?;
                    member.validate(item, registry, &format!("{}[{}]", path, i))?;
                }
                Ok(())
            }
            FieldNode::Map(inner) => {
                let entries = match value {
                    Value::Map(entries) => entries,
                    _ => return mismatch(),
                };
                for (key, entry) in entries {
                    inner.validate(entry, registry, &format!("{}[{:?}]", path, key))?;
                }
                Ok(())
            }
            FieldNode::Union(union) => {
                for variant in &union.variants {
                    if variant.validate(value, registry, path).is_ok() {
                        return Ok(());
                    }
                }
                mismatch()
            }
            FieldNode::Enum(e) => {
                let symbol = match value {
                    Value::Enum(s) | Value::String(s) => s,
                    _ => return mismatch(),
                };
                if e.symbol_index(symbol).is_some() {
                    Ok(())
                } else {
                    mismatch()
                }
            }
            FieldNode::Logical(logical) => {
                if logical_accepts(&logical.kind, value) {
                    Ok(())
                } else {
                    mismatch()
                }
            }
            FieldNode::Record(record) => record.validate_record(value, registry, path),
            FieldNode::SelfReference(name) => match registry.get(name) {
                Some(record) => record.validate_record(value, registry, path),
                None => Err(CoerceError::UnresolvedReference(name.clone())),
            },
        }
    }

    /// Render a declared default into Avro JSON default form. For unions the
    /// default is rendered against the first branch per the Avro rules.
    pub fn default_json(&self, value: &Value) -> Result<JsonValue, String> {
        let fail = || {
            Err(format!(
                "default of kind '{}' does not fit type '{}'",
                value.kind(),
                self.describe()
            ))
        };
        match self {
            FieldNode::Immutable(schema) => match (schema, value) {
                (AvroSchema::Null, Value::Null) => Ok(JsonValue::Null),
                (AvroSchema::Boolean, Value::Boolean(b)) => Ok(JsonValue::Bool(*b)),
                (AvroSchema::Int, Value::Int(n)) => Ok(serde_json::json!(n)),
                (AvroSchema::Long, Value::Long(n)) => Ok(serde_json::json!(n)),
                (AvroSchema::Long, Value::Int(n)) => Ok(serde_json::json!(n)),
                (AvroSchema::Float, Value::Float(n)) => Ok(serde_json::json!(n)),
                (AvroSchema::Double, Value::Double(n)) => Ok(serde_json::json!(n)),
                (AvroSchema::Double, Value::Float(n)) => Ok(serde_json::json!(*n as f64)),
                (AvroSchema::Bytes, Value::Bytes(b)) => Ok(JsonValue::String(latin1_string(b))),
                (AvroSchema::String, Value::String(s)) => Ok(JsonValue::String(s.clone())),
                _ => fail(),
            },
            FieldNode::Array(inner) => match value {
                Value::List(items) | Value::Tuple(items) => Ok(JsonValue::Array(
                    items
                        .iter()
                        .map(|item| inner.default_json(item))
                        .collect::<Result<_, _>>()?,
                )),
                _ => fail(),
            },
            FieldNode::Tuple(tuple) => match value {
                Value::Tuple(items) | Value::List(items) if items.len() == tuple.arity() => {
                    let rendered: Result<Vec<JsonValue>, String> = items
                        .iter()
                        .enumerate()
                        .map(|(i, item)| match tuple.member(i) {
                            Some(member) => member.default_json(item),
                            None => Err("tuple position out of range".to_string()),
                        })
                        .collect();
                    Ok(JsonValue::Array(rendered?))
                }
                _ => fail(),
            },
            FieldNode::Map(inner) => match value {
                Value::Map(entries) => {
                    let mut obj = serde_json::Map::new();
                    for (key, entry) in entries {
                        obj.insert(key.clone(), inner.default_json(entry)?);
                    }
                    Ok(JsonValue::Object(obj))
                }
                _ => fail(),
            },
            FieldNode::Union(union) => match union.variants.first() {
                Some(first) => first.default_json(value),
                None => fail(),
            },
            FieldNode::Enum(e) => match value {
                Value::Enum(s) | Value::String(s) if e.symbol_index(s).is_some() => {
                    Ok(JsonValue::String(s.clone()))
                }
                _ => fail(),
            },
            FieldNode::Logical(logical) => match (&logical.kind, value) {
                (LogicalKind::Date, Value::Date(d)) => {
                    Ok(serde_json::json!(crate::convert::days_from_date(*d)))
                }
                (LogicalKind::TimeMillis, Value::Time(t)) => {
                    Ok(serde_json::json!(crate::convert::millis_from_time(*t)))
                }
                (LogicalKind::TimeMicros, Value::Time(t)) => {
                    Ok(serde_json::json!(crate::convert::micros_from_time(*t)))
                }
                (LogicalKind::TimestampMillis, Value::Datetime(t)) => {
                    Ok(serde_json::json!(t.timestamp_millis()))
                }
                (LogicalKind::TimestampMicros, Value::Datetime(t)) => {
                    Ok(serde_json::json!(t.timestamp_micros()))
                }
                (LogicalKind::Uuid, Value::Uuid(u)) => Ok(JsonValue::String(u.to_string())),
                (
                    LogicalKind::Decimal {
                        precision, scale, ..
                    },
                    Value::Decimal(d),
                ) => match crate::convert::decimal_unscaled(d, *precision, *scale) {
                    Some(unscaled) => Ok(JsonValue::String(latin1_string(
                        &unscaled.to_signed_bytes_be(),
                    ))),
                    None => Err(format!(
                        "decimal default does not fit precision {}",
                        precision
                    )),
                },
                (LogicalKind::Fixed(spec), Value::Fixed(b) | Value::Bytes(b)) => {
                    if b.len() == spec.size {
                        Ok(JsonValue::String(latin1_string(b)))
                    } else {
                        Err(format!(
                            "fixed default has {} bytes, expected {}",
                            b.len(),
                            spec.size
                        ))
                    }
                }
                _ => fail(),
            },
            FieldNode::Record(record) => match value {
                Value::Record(fields) => {
                    let mut obj = serde_json::Map::new();
                    for def in &record.fields {
                        match fields.iter().find(|(n, _)| n == &def.name) {
                            Some((_, v)) => {
                                obj.insert(def.name.clone(), def.node.default_json(v)?);
                            }
                            None => {
                                return Err(format!(
                                    "record default is missing field '{}'",
                                    def.name
                                ))
                            }
                        }
                    }
                    Ok(JsonValue::Object(obj))
                }
                _ => fail(),
            },
            FieldNode::SelfReference(_) => {
                Err("defaults on self-referential fields are not supported".to_string())
            }
        }
    }
}

/// Whether a native value is acceptable for a logical kind. Text is accepted
/// wherever the coercion hooks can parse it.
fn logical_accepts(kind: &LogicalKind, value: &Value) -> bool {
    match (kind, value) {
        (LogicalKind::Date, Value::Date(_)) => true,
        (LogicalKind::Date, Value::String(s)) => hooks::parse_date_text(s).is_ok(),
        (LogicalKind::TimeMillis | LogicalKind::TimeMicros, Value::Time(_)) => true,
        (LogicalKind::TimeMillis | LogicalKind::TimeMicros, Value::String(s)) => {
            hooks::parse_time_text(s).is_ok()
        }
        (LogicalKind::TimestampMillis | LogicalKind::TimestampMicros, Value::Datetime(_)) => true,
        (LogicalKind::TimestampMillis | LogicalKind::TimestampMicros, Value::String(s)) => {
            hooks::parse_datetime_text(s).is_ok()
        }
        (LogicalKind::Uuid, Value::Uuid(_)) => true,
        (LogicalKind::Uuid, Value::String(s)) => hooks::parse_uuid_text(s).is_ok(),
        (
            LogicalKind::Decimal {
                precision, scale, ..
            },
            Value::Decimal(d),
        ) => crate::convert::decimal_unscaled(d, *precision, *scale).is_some(),
        (LogicalKind::Fixed(spec), Value::Fixed(b) | Value::Bytes(b)) => b.len() == spec.size,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string_node() -> FieldNode {
        FieldNode::Immutable(AvroSchema::String)
    }

    fn person_node() -> RecordNode {
        RecordNode {
            name: "Person".to_string(),
            namespace: None,
            doc: None,
            aliases: Vec::new(),
            fields: vec![
                FieldDef {
                    name: "name".to_string(),
                    node: string_node(),
                    default: None,
                    doc: None,
                    aliases: Vec::new(),
                },
                FieldDef {
                    name: "age".to_string(),
                    node: FieldNode::Immutable(AvroSchema::Int),
                    default: Some(Value::Int(0)),
                    doc: None,
                    aliases: Vec::new(),
                },
            ],
        }
    }

    #[test]
    fn test_validate_accepts_widened_integers() {
        let root = person_node();
        let registry = NodeRegistry::from_root(&root);
        let node = FieldNode::Immutable(AvroSchema::Long);
        node.validate(&Value::Int(5), &registry, "n").unwrap();
        node.validate(&Value::Long(5), &registry, "n").unwrap();
        match node.validate(&Value::String("5".to_string()), &registry, "n") {
            Err(CoerceError::TypeMismatch { expected, .. }) => assert_eq!(expected, "long"),
            other => panic!("Expected type mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_record_applies_defaults() {
        let root = person_node();
        let registry = NodeRegistry::from_root(&root);
        let value = Value::record(vec![("name", Value::from("Ada"))]);
        root.validate_record(&value, &registry, "Person").unwrap();

        let missing_required = Value::record(vec![("age", Value::Int(3))]);
        match root.validate_record(&missing_required, &registry, "Person") {
            Err(CoerceError::MissingField(field)) => assert_eq!(field, "Person.name"),
            other => panic!("Expected missing field, got {other:?}"),
        }
    }

    #[test]
    fn test_tuple_renders_as_array_of_item() {
        let tuple = FieldNode::Tuple(TupleNode {
            item: Box::new(string_node()),
            members: vec![string_node(), string_node()],
        });
        match tuple.to_schema() {
            AvroSchema::Array(item) => assert_eq!(*item, AvroSchema::String),
            other => panic!("Expected array, got {other:?}"),
        }
    }

    #[test]
    fn test_branch_names() {
        assert_eq!(string_node().branch_name(), "string");
        let record = FieldNode::Record(person_node());
        assert_eq!(record.branch_name(), "Person");
        let date = FieldNode::Logical(LogicalNode {
            kind: LogicalKind::Date,
        });
        assert_eq!(date.branch_name(), "int");
    }

    #[test]
    fn test_default_json_bytes_convention() {
        let node = FieldNode::Immutable(AvroSchema::Bytes);
        let rendered = node.default_json(&Value::Bytes(vec![0x00, 0xff, 0x41])).unwrap();
        assert_eq!(rendered, JsonValue::String("\u{0000}\u{00ff}A".to_string()));
    }

    #[test]
    fn test_registry_resolves_nested_records() {
        let nested = RecordNode {
            name: "Inner".to_string(),
            namespace: Some("demo".to_string()),
            doc: None,
            aliases: Vec::new(),
            fields: Vec::new(),
        };
        let root = RecordNode {
            name: "Outer".to_string(),
            namespace: None,
            doc: None,
            aliases: Vec::new(),
            fields: vec![FieldDef {
                name: "inner".to_string(),
                node: FieldNode::Record(nested),
                default: None,
                doc: None,
                aliases: Vec::new(),
            }],
        };
        let registry = NodeRegistry::from_root(&root);
        assert!(registry.get("Outer").is_some());
        assert!(registry.get("demo.Inner").is_some());
        assert!(registry.get("Inner").is_some());
        assert!(registry.get("Absent").is_none());
    }
}

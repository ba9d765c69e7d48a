//! Native instance to codec value conversion.
//!
//! Walks a value tree against the resolved node tree and the generated
//! schema in parallel. Nodes drive interpretation of the native value;
//! the schema side supplies the wire spelling of record field names, which
//! a case transformation may have rewritten. Every node variant normalizes
//! its own value: temporals become epoch integers at the declared
//! precision, decimals become scaled two's-complement bytes, unions pick
//! the first accepting branch.

use std::collections::HashMap;

use apache_avro::types::Value as AvroValue;
use apache_avro::Decimal;

use crate::coerce::hooks;
use crate::convert::{
    days_from_date, decimal_unscaled, micros_from_time, millis_from_time, sign_extend, SchemaIndex,
};
use crate::error::{CodecError, CoerceError, ModelError};
use crate::model::Value;
use crate::schema::{
    AvroSchema, FieldNode, LogicalKind, LogicalNode, NodeRegistry, RecordNode, RecordSchema,
};

/// Convert a native instance into the codec value the writer schema encodes
pub(crate) fn encode_instance(
    root: &RecordNode,
    schema: &AvroSchema,
    instance: &Value,
) -> Result<AvroValue, ModelError> {
    let record_schema = match schema {
        AvroSchema::Record(record) => record,
        other => {
            return Err(CodecError::NonConformant(format!(
                "root schema is {}, expected a record",
                other.type_name()
            ))
            .into())
        }
    };
    let encoder = Encoder {
        registry: NodeRegistry::from_root(root),
        index: SchemaIndex::from_schema(schema),
    };
    encoder.encode_record(root, record_schema, instance, &root.name)
}

struct Encoder<'a> {
    registry: NodeRegistry<'a>,
    index: SchemaIndex<'a>,
}

impl<'a> Encoder<'a> {
    fn encode_record(
        &self,
        node: &RecordNode,
        schema: &RecordSchema,
        value: &Value,
        path: &str,
    ) -> Result<AvroValue, ModelError> {
        let fields = match value {
            Value::Record(fields) => fields,
            other => return Err(mismatch(path, &format!("record {}", node.name), other).into()),
        };
        if node.fields.len() != schema.fields.len() {
            return Err(CodecError::NonConformant(format!(
                "{}: rendered schema has {} fields, node tree has {}",
                path,
                schema.fields.len(),
                node.fields.len()
            ))
            .into());
        }

        let mut out = Vec::with_capacity(node.fields.len());
        for (def, field_schema) in node.fields.iter().zip(&schema.fields) {
            let field_path = format!("{}.{}", path, def.name);
            let member = fields.iter().find(|(n, _)| n == &def.name).map(|(_, v)| v);
            let encoded = match (member, &def.default) {
                (Some(v), _) => self.encode_node(&def.node, &field_schema.schema, v, &field_path)?,
                (None, Some(default)) => {
                    self.encode_node(&def.node, &field_schema.schema, default, &field_path)?
                }
                (None, None) => {
                    return Err(CodecError::NonConformant(format!(
                        "{}: missing field '{}'",
                        path, def.name
                    ))
                    .into())
                }
            };
            out.push((field_schema.name.clone(), encoded));
        }
        Ok(AvroValue::Record(out))
    }

    fn encode_node(
        &self,
        node: &FieldNode,
        schema: &AvroSchema,
        value: &Value,
        path: &str,
    ) -> Result<AvroValue, ModelError> {
        match node {
            FieldNode::Immutable(primitive) => encode_primitive(primitive, value, path),
            FieldNode::Array(inner) => {
                let item_schema = array_item(schema, path)?;
                let items = match value {
                    Value::List(items) | Value::Tuple(items) => items,
                    other => return Err(mismatch(path, &node.describe(), other).into()),
                };
                let encoded: Result<Vec<AvroValue>, ModelError> = items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| {
                        self.encode_node(inner, item_schema, item, &format!("{}[{}]", path, i))
                    })
                    .collect();
                Ok(AvroValue::Array(encoded?))
            }
            FieldNode::Tuple(tuple) => {
                let item_schema = array_item(schema, path)?;
                let items = match value {
                    Value::Tuple(items) | Value::List(items) => items,
                    other => return Err(mismatch(path, &node.describe(), other).into()),
                };
                if items.len() != tuple.arity() {
                    return Err(CodecError::NonConformant(format!(
                        "{}: tuple takes {} elements, got {}",
                        path,
                        tuple.arity(),
                        items.len()
                    ))
                    .into());
                }
                let mut encoded = Vec::with_capacity(items.len());
                for (i, (item, member)) in items.iter().zip(&tuple.members).enumerate() {
                    let item_path = format!("{}[{}]", path, i);
                    member.validate(item, &self.registry, &item_path)?;
                    encoded.push(self.encode_node(&tuple.item, item_schema, item, &item_path)?);
                }
                Ok(AvroValue::Array(encoded))
            }
            FieldNode::Map(inner) => {
                let value_schema = match schema {
                    AvroSchema::Map(values) => values.as_ref(),
                    _ => return Err(drift(path, "map")),
                };
                let entries = match value {
                    Value::Map(entries) => entries,
                    other => return Err(mismatch(path, &node.describe(), other).into()),
                };
                let mut out = HashMap::with_capacity(entries.len());
                for (key, entry) in entries {
                    let entry_path = format!("{}[{:?}]", path, key);
                    out.insert(
                        key.clone(),
                        self.encode_node(inner, value_schema, entry, &entry_path)?,
                    );
                }
                Ok(AvroValue::Map(out))
            }
            FieldNode::Union(union) => {
                let variant_schemas = match schema {
                    AvroSchema::Union(variants) => variants,
                    _ => return Err(drift(path, "union")),
                };
                for (i, (variant, variant_schema)) in
                    union.variants.iter().zip(variant_schemas).enumerate()
                {
                    if variant.validate(value, &self.registry, path).is_ok() {
                        let inner = self.encode_node(variant, variant_schema, value, path)?;
                        return Ok(AvroValue::Union(i as u32, Box::new(inner)));
                    }
                }
                Err(mismatch(path, &node.describe(), value).into())
            }
            FieldNode::Enum(e) => {
                let symbol = match value {
                    Value::Enum(s) | Value::String(s) => s,
                    other => return Err(mismatch(path, &node.describe(), other).into()),
                };
                match e.symbol_index(symbol) {
                    Some(position) => Ok(AvroValue::Enum(position as u32, symbol.clone())),
                    None => Err(CodecError::NonConformant(format!(
                        "{}: '{}' is not a symbol of enum {}",
                        path, symbol, e.name
                    ))
                    .into()),
                }
            }
            FieldNode::Logical(logical) => self.encode_logical(logical, value, path),
            FieldNode::Record(record) => {
                let record_schema = match schema {
                    AvroSchema::Record(r) => r,
                    _ => return Err(drift(path, "record")),
                };
                self.encode_record(record, record_schema, value, path)
            }
            FieldNode::SelfReference(name) => {
                let target = self
                    .registry
                    .get(name)
                    .ok_or_else(|| CoerceError::UnresolvedReference(name.clone()))?;
                let record_schema = match schema {
                    AvroSchema::Record(r) => r,
                    AvroSchema::Named(rendered) => self.index.get(rendered).ok_or_else(|| {
                        CodecError::NonConformant(format!(
                            "{}: no record definition for reference '{}'",
                            path, rendered
                        ))
                    })?,
                    _ => return Err(drift(path, "named reference")),
                };
                self.encode_record(target, record_schema, value, path)
            }
        }
    }

    fn encode_logical(
        &self,
        logical: &LogicalNode,
        value: &Value,
        path: &str,
    ) -> Result<AvroValue, ModelError> {
        match (&logical.kind, value) {
            (LogicalKind::Date, Value::Date(d)) => Ok(AvroValue::Date(days_from_date(*d))),
            (LogicalKind::Date, Value::String(s)) => {
                Ok(AvroValue::Date(days_from_date(hooks::parse_date_text(s)?)))
            }
            (LogicalKind::TimeMillis, Value::Time(t)) => {
                Ok(AvroValue::TimeMillis(millis_from_time(*t)))
            }
            (LogicalKind::TimeMillis, Value::String(s)) => Ok(AvroValue::TimeMillis(
                millis_from_time(hooks::parse_time_text(s)?),
            )),
            (LogicalKind::TimeMicros, Value::Time(t)) => {
                Ok(AvroValue::TimeMicros(micros_from_time(*t)))
            }
            (LogicalKind::TimeMicros, Value::String(s)) => Ok(AvroValue::TimeMicros(
                micros_from_time(hooks::parse_time_text(s)?),
            )),
            (LogicalKind::TimestampMillis, Value::Datetime(t)) => {
                Ok(AvroValue::TimestampMillis(t.timestamp_millis()))
            }
            (LogicalKind::TimestampMillis, Value::String(s)) => Ok(AvroValue::TimestampMillis(
                hooks::parse_datetime_text(s)?.timestamp_millis(),
            )),
            (LogicalKind::TimestampMicros, Value::Datetime(t)) => {
                Ok(AvroValue::TimestampMicros(t.timestamp_micros()))
            }
            (LogicalKind::TimestampMicros, Value::String(s)) => Ok(AvroValue::TimestampMicros(
                hooks::parse_datetime_text(s)?.timestamp_micros(),
            )),
            (LogicalKind::Uuid, Value::Uuid(u)) => Ok(AvroValue::Uuid(*u)),
            (LogicalKind::Uuid, Value::String(s)) => {
                Ok(AvroValue::Uuid(hooks::parse_uuid_text(s)?))
            }
            (
                LogicalKind::Decimal {
                    precision,
                    scale,
                    fixed,
                },
                Value::Decimal(d),
            ) => {
                let unscaled = decimal_unscaled(d, *precision, *scale).ok_or_else(|| {
                    CodecError::NonConformant(format!(
                        "{}: {} does not fit decimal({}, {})",
                        path, d, precision, scale
                    ))
                })?;
                let bytes = unscaled.to_signed_bytes_be();
                let bytes = match fixed {
                    Some(spec) => sign_extend(&bytes, spec.size).ok_or_else(|| {
                        CodecError::NonConformant(format!(
                            "{}: unscaled decimal needs {} bytes, fixed {} holds {}",
                            path,
                            bytes.len(),
                            spec.name,
                            spec.size
                        ))
                    })?,
                    None => bytes,
                };
                Ok(AvroValue::Decimal(Decimal::from(bytes)))
            }
            (LogicalKind::Fixed(spec), Value::Fixed(b) | Value::Bytes(b)) => {
                if b.len() == spec.size {
                    Ok(AvroValue::Fixed(spec.size, b.clone()))
                } else {
                    Err(CodecError::NonConformant(format!(
                        "{}: fixed {} takes {} bytes, got {}",
                        path,
                        spec.name,
                        spec.size,
                        b.len()
                    ))
                    .into())
                }
            }
            (_, other) => {
                let described = FieldNode::Logical(logical.clone()).describe();
                Err(mismatch(path, &described, other).into())
            }
        }
    }
}

fn encode_primitive(
    primitive: &AvroSchema,
    value: &Value,
    path: &str,
) -> Result<AvroValue, ModelError> {
    match (primitive, value) {
        (AvroSchema::Null, Value::Null) => Ok(AvroValue::Null),
        (AvroSchema::Boolean, Value::Boolean(b)) => Ok(AvroValue::Boolean(*b)),
        (AvroSchema::Int, Value::Int(n)) => Ok(AvroValue::Int(*n)),
        (AvroSchema::Long, Value::Long(n)) => Ok(AvroValue::Long(*n)),
        (AvroSchema::Long, Value::Int(n)) => Ok(AvroValue::Long(i64::from(*n))),
        (AvroSchema::Float, Value::Float(n)) => Ok(AvroValue::Float(*n)),
        (AvroSchema::Double, Value::Double(n)) => Ok(AvroValue::Double(*n)),
        (AvroSchema::Double, Value::Float(n)) => Ok(AvroValue::Double(f64::from(*n))),
        (AvroSchema::Bytes, Value::Bytes(b)) => Ok(AvroValue::Bytes(b.clone())),
        (AvroSchema::Bytes, Value::String(s)) => Ok(AvroValue::Bytes(s.clone().into_bytes())),
        (AvroSchema::String, Value::String(s)) => Ok(AvroValue::String(s.clone())),
        _ => Err(mismatch(path, primitive.type_name(), value).into()),
    }
}

fn mismatch(path: &str, expected: &str, found: &Value) -> CodecError {
    CodecError::NonConformant(format!(
        "{}: expected {}, found {}",
        path,
        expected,
        found.kind()
    ))
}

fn drift(path: &str, expected: &str) -> ModelError {
    CodecError::NonConformant(format!(
        "{}: rendered schema diverges from node tree at {}",
        path, expected
    ))
    .into()
}

fn array_item<'s>(schema: &'s AvroSchema, path: &str) -> Result<&'s AvroSchema, ModelError> {
    match schema {
        AvroSchema::Array(item) => Ok(item.as_ref()),
        _ => Err(drift(path, "array")),
    }
}

//! Typed instance reconstruction from decoded codec values.
//!
//! The codec hands back loosely-typed data: temporals as epoch integers or
//! unparsed text, tuples as plain arrays, enum symbols as strings. This
//! walk rebuilds the native instance the model declared, applying the
//! coercion configuration's hooks at logical positions and its cast rules
//! for tuples and enums. Field names revert to their declared spelling;
//! the wire spelling only exists inside the document.
//!
//! Recursion is bounded by the decoded data itself: a self-referential
//! field only recurses while the value actually nests.

use std::collections::BTreeMap;

use apache_avro::types::Value as AvroValue;

use crate::coerce::{CastRule, CoercionConfig, HookTarget};
use crate::convert::{
    date_from_days, datetime_from_micros, datetime_from_millis, decimal_from_unscaled,
    time_from_micros, time_from_millis,
};
use crate::error::{CodecError, CoerceError, ModelError};
use crate::model::Value;
use crate::schema::{AvroSchema, FieldNode, LogicalKind, LogicalNode, NodeRegistry, RecordNode};

/// Reconstruct a typed instance from a decoded codec value
pub(crate) fn reconstruct_instance(
    root: &RecordNode,
    config: &CoercionConfig,
    decoded: AvroValue,
) -> Result<Value, ModelError> {
    let registry = NodeRegistry::from_root(root);
    let instance = reconstruct_record(root, &registry, config, decoded, &root.name)?;
    if config.check_types() {
        root.validate_record(&instance, &registry, &root.name)?;
    }
    Ok(instance)
}

fn reconstruct_record(
    record: &RecordNode,
    registry: &NodeRegistry<'_>,
    config: &CoercionConfig,
    value: AvroValue,
    path: &str,
) -> Result<Value, ModelError> {
    let pairs = match value {
        AvroValue::Record(pairs) => pairs,
        other => {
            return Err(mismatch(path, &format!("record {}", record.name), &other).into())
        }
    };
    if pairs.len() != record.fields.len() {
        return Err(CodecError::NonConformant(format!(
            "{}: decoded record has {} fields, schema has {}",
            path,
            pairs.len(),
            record.fields.len()
        ))
        .into());
    }

    let mut out = Vec::with_capacity(pairs.len());
    for (def, (_, field_value)) in record.fields.iter().zip(pairs) {
        let field_path = format!("{}.{}", path, def.name);
        let reconstructed = reconstruct_node(&def.node, registry, config, field_value, &field_path)?;
        out.push((def.name.clone(), reconstructed));
    }
    Ok(Value::Record(out))
}

fn reconstruct_node(
    node: &FieldNode,
    registry: &NodeRegistry<'_>,
    config: &CoercionConfig,
    value: AvroValue,
    path: &str,
) -> Result<Value, ModelError> {
    match node {
        FieldNode::Immutable(primitive) => reconstruct_primitive(primitive, config, value, path),
        FieldNode::Array(inner) => match value {
            AvroValue::Array(items) => {
                let elements: Result<Vec<Value>, ModelError> = items
                    .into_iter()
                    .enumerate()
                    .map(|(i, item)| {
                        reconstruct_node(inner, registry, config, item, &format!("{}[{}]", path, i))
                    })
                    .collect();
                Ok(Value::List(elements?))
            }
            other => Err(mismatch(path, &node.describe(), &other).into()),
        },
        FieldNode::Tuple(tuple) => match value {
            AvroValue::Array(items) => {
                let elements: Result<Vec<Value>, ModelError> = items
                    .into_iter()
                    .enumerate()
                    .map(|(i, item)| {
                        reconstruct_node(
                            &tuple.item,
                            registry,
                            config,
                            item,
                            &format!("{}[{}]", path, i),
                        )
                    })
                    .collect();
                let elements = elements?;
                if config.has_cast(CastRule::Tuple) {
                    if elements.len() != tuple.arity() {
                        return Err(CoerceError::TypeMismatch {
                            field: path.to_string(),
                            expected: node.describe(),
                            found: format!("array of {} elements", elements.len()),
                        }
                        .into());
                    }
                    Ok(Value::Tuple(elements))
                } else {
                    Ok(Value::List(elements))
                }
            }
            other => Err(mismatch(path, &node.describe(), &other).into()),
        },
        FieldNode::Map(inner) => match value {
            AvroValue::Map(entries) => {
                let mut out = BTreeMap::new();
                for (key, entry) in entries {
                    let entry_path = format!("{}[{:?}]", path, key);
                    out.insert(
                        key,
                        reconstruct_node(inner, registry, config, entry, &entry_path)?,
                    );
                }
                Ok(Value::Map(out))
            }
            other => Err(mismatch(path, &node.describe(), &other).into()),
        },
        FieldNode::Union(union) => match value {
            AvroValue::Union(index, inner) => {
                let variant = union.variants.get(index as usize).ok_or_else(|| {
                    CodecError::NonConformant(format!(
                        "{}: union branch {} out of range",
                        path, index
                    ))
                })?;
                reconstruct_node(variant, registry, config, *inner, path)
            }
            // Untagged values settle on the first accepting branch
            other => {
                for variant in &union.variants {
                    if let Ok(reconstructed) =
                        reconstruct_node(variant, registry, config, other.clone(), path)
                    {
                        return Ok(reconstructed);
                    }
                }
                Err(mismatch(path, &node.describe(), &other).into())
            }
        },
        FieldNode::Enum(e) => {
            let symbol = match value {
                AvroValue::Enum(_, symbol) => symbol,
                AvroValue::String(symbol) => symbol,
                other => return Err(mismatch(path, &node.describe(), &other).into()),
            };
            if e.symbol_index(&symbol).is_none() {
                return Err(CodecError::NonConformant(format!(
                    "{}: '{}' is not a symbol of enum {}",
                    path, symbol, e.name
                ))
                .into());
            }
            if config.has_cast(CastRule::Enum) {
                Ok(Value::Enum(symbol))
            } else {
                Ok(Value::String(symbol))
            }
        }
        FieldNode::Logical(logical) => reconstruct_logical(logical, config, value, path),
        FieldNode::Record(record) => reconstruct_record(record, registry, config, value, path),
        FieldNode::SelfReference(name) => {
            let target = match registry.get(name) {
                Some(record) => record,
                None => config
                    .forward_reference(name)
                    .ok_or_else(|| CoerceError::UnresolvedReference(name.clone()))?,
            };
            reconstruct_record(target, registry, config, value, path)
        }
    }
}

fn reconstruct_primitive(
    primitive: &AvroSchema,
    config: &CoercionConfig,
    value: AvroValue,
    path: &str,
) -> Result<Value, ModelError> {
    match (primitive, value) {
        (AvroSchema::Null, AvroValue::Null) => Ok(Value::Null),
        (AvroSchema::Boolean, AvroValue::Boolean(b)) => Ok(Value::Boolean(b)),
        (AvroSchema::Int, AvroValue::Int(n)) => Ok(Value::Int(n)),
        (AvroSchema::Long, AvroValue::Long(n)) => Ok(Value::Long(n)),
        (AvroSchema::Long, AvroValue::Int(n)) => Ok(Value::Long(i64::from(n))),
        (AvroSchema::Float, AvroValue::Float(f)) => Ok(Value::Float(f)),
        (AvroSchema::Double, AvroValue::Double(f)) => Ok(Value::Double(f)),
        (AvroSchema::Double, AvroValue::Float(f)) => Ok(Value::Double(f64::from(f))),
        (AvroSchema::Bytes, AvroValue::Bytes(b)) => Ok(Value::Bytes(b)),
        (AvroSchema::Bytes, AvroValue::String(s)) => {
            Ok((config.hook(HookTarget::Bytes))(Value::String(s))?)
        }
        (AvroSchema::String, AvroValue::String(s)) => Ok(Value::String(s)),
        (primitive, other) => Err(mismatch(path, primitive.type_name(), &other).into()),
    }
}

fn reconstruct_logical(
    logical: &LogicalNode,
    config: &CoercionConfig,
    value: AvroValue,
    path: &str,
) -> Result<Value, ModelError> {
    match (&logical.kind, value) {
        (LogicalKind::Date, AvroValue::Date(days)) | (LogicalKind::Date, AvroValue::Int(days)) => {
            date_from_days(days)
                .map(Value::Date)
                .ok_or_else(|| out_of_range("date", days.to_string()))
        }
        (LogicalKind::Date, AvroValue::String(s)) => {
            Ok((config.hook(HookTarget::Date))(Value::String(s))?)
        }
        (LogicalKind::TimeMillis, AvroValue::TimeMillis(ms))
        | (LogicalKind::TimeMillis, AvroValue::Int(ms)) => time_from_millis(ms)
            .map(Value::Time)
            .ok_or_else(|| out_of_range("time", ms.to_string())),
        (LogicalKind::TimeMillis, AvroValue::String(s)) => {
            Ok((config.hook(HookTarget::Time))(Value::String(s))?)
        }
        (LogicalKind::TimeMicros, AvroValue::TimeMicros(us))
        | (LogicalKind::TimeMicros, AvroValue::Long(us)) => time_from_micros(us)
            .map(Value::Time)
            .ok_or_else(|| out_of_range("time", us.to_string())),
        (LogicalKind::TimeMicros, AvroValue::String(s)) => {
            Ok((config.hook(HookTarget::Time))(Value::String(s))?)
        }
        (LogicalKind::TimestampMillis, AvroValue::TimestampMillis(ms))
        | (LogicalKind::TimestampMillis, AvroValue::Long(ms)) => datetime_from_millis(ms)
            .map(Value::Datetime)
            .ok_or_else(|| out_of_range("datetime", ms.to_string())),
        (LogicalKind::TimestampMillis, AvroValue::String(s)) => {
            Ok((config.hook(HookTarget::Datetime))(Value::String(s))?)
        }
        (LogicalKind::TimestampMicros, AvroValue::TimestampMicros(us))
        | (LogicalKind::TimestampMicros, AvroValue::Long(us)) => datetime_from_micros(us)
            .map(Value::Datetime)
            .ok_or_else(|| out_of_range("datetime", us.to_string())),
        (LogicalKind::TimestampMicros, AvroValue::String(s)) => {
            Ok((config.hook(HookTarget::Datetime))(Value::String(s))?)
        }
        (LogicalKind::Uuid, AvroValue::Uuid(u)) => Ok(Value::Uuid(u)),
        (LogicalKind::Uuid, AvroValue::String(s)) => {
            Ok((config.hook(HookTarget::Uuid))(Value::String(s))?)
        }
        (LogicalKind::Decimal { scale, .. }, AvroValue::Decimal(d)) => {
            let bytes = <Vec<u8>>::try_from(&d).map_err(CodecError::from)?;
            Ok(Value::Decimal(decimal_from_unscaled(&bytes, *scale)))
        }
        (LogicalKind::Decimal { scale, .. }, AvroValue::Bytes(b))
        | (LogicalKind::Decimal { scale, .. }, AvroValue::Fixed(_, b)) => {
            Ok(Value::Decimal(decimal_from_unscaled(&b, *scale)))
        }
        (LogicalKind::Fixed(spec), AvroValue::Fixed(size, bytes)) => {
            if size == spec.size {
                Ok(Value::Fixed(bytes))
            } else {
                Err(CodecError::NonConformant(format!(
                    "{}: fixed {} takes {} bytes, got {}",
                    path, spec.name, spec.size, size
                ))
                .into())
            }
        }
        (LogicalKind::Fixed(spec), AvroValue::Bytes(bytes)) => {
            if bytes.len() == spec.size {
                Ok(Value::Fixed(bytes))
            } else {
                Err(CodecError::NonConformant(format!(
                    "{}: fixed {} takes {} bytes, got {}",
                    path,
                    spec.name,
                    spec.size,
                    bytes.len()
                ))
                .into())
            }
        }
        (_, other) => {
            let described = FieldNode::Logical(logical.clone()).describe();
            Err(mismatch(path, &described, &other).into())
        }
    }
}

fn mismatch(path: &str, expected: &str, found: &AvroValue) -> CoerceError {
    CoerceError::TypeMismatch {
        field: path.to_string(),
        expected: expected.to_string(),
        found: avro_kind(found).to_string(),
    }
}

fn out_of_range(target: &'static str, value: String) -> ModelError {
    CoerceError::InvalidFormat { target, value }.into()
}

fn avro_kind(value: &AvroValue) -> &'static str {
    match value {
        AvroValue::Null => "null",
        AvroValue::Boolean(_) => "boolean",
        AvroValue::Int(_) => "int",
        AvroValue::Long(_) => "long",
        AvroValue::Float(_) => "float",
        AvroValue::Double(_) => "double",
        AvroValue::Bytes(_) => "bytes",
        AvroValue::String(_) => "string",
        AvroValue::Fixed(_, _) => "fixed",
        AvroValue::Enum(_, _) => "enum",
        AvroValue::Union(_, _) => "union",
        AvroValue::Array(_) => "array",
        AvroValue::Map(_) => "map",
        AvroValue::Record(_) => "record",
        AvroValue::Date(_) => "date",
        AvroValue::Decimal(_) => "decimal",
        AvroValue::TimeMillis(_) => "time-millis",
        AvroValue::TimeMicros(_) => "time-micros",
        AvroValue::TimestampMillis(_) => "timestamp-millis",
        AvroValue::TimestampMicros(_) => "timestamp-micros",
        AvroValue::Uuid(_) => "uuid",
        _ => "unsupported value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coerce::{build_config, CoercionOverrides};
    use crate::convert::outbound::encode_instance;
    use crate::model::{Attribute, DeclaredType, EnumType, Model};
    use crate::schema::{generate, GeneratedSchema};
    use bigdecimal::BigDecimal;
    use std::str::FromStr;

    fn round_trip(model: &Model, instance: &Value) -> Value {
        let generated = generate(model, None).unwrap();
        let config = build_config(generated.root(), &CoercionOverrides::new()).unwrap();
        let encoded = encode_instance(generated.root(), generated.schema(), instance).unwrap();
        reconstruct_instance(generated.root(), &config, encoded).unwrap()
    }

    fn generated_with_config(model: &Model) -> (GeneratedSchema, CoercionConfig) {
        let generated = generate(model, None).unwrap();
        let config = build_config(generated.root(), &CoercionOverrides::new()).unwrap();
        (generated, config)
    }

    #[test]
    fn test_flat_record_round_trips() {
        let model = Model::new("Person")
            .with_attribute(Attribute::new("name", DeclaredType::Str))
            .with_attribute(Attribute::new(
                "nickname",
                DeclaredType::optional(DeclaredType::Str),
            ))
            .with_attribute(Attribute::new(
                "tags",
                DeclaredType::list(DeclaredType::Str),
            ));
        let instance = Value::record(vec![
            ("name", Value::from("Ada")),
            ("nickname", Value::Null),
            ("tags", Value::List(vec![Value::from("x"), Value::from("y")])),
        ]);
        assert_eq!(round_trip(&model, &instance), instance);
    }

    #[test]
    fn test_text_at_timestamp_position_is_parsed() {
        let model = Model::new("Event")
            .with_attribute(Attribute::new("at", DeclaredType::Datetime));
        let (generated, config) = generated_with_config(&model);

        let decoded = AvroValue::Record(vec![(
            "at".to_string(),
            AvroValue::String("2024-03-01T10:30:00Z".to_string()),
        )]);
        match reconstruct_instance(generated.root(), &config, decoded).unwrap() {
            Value::Record(fields) => match &fields[0].1 {
                Value::Datetime(dt) => assert_eq!(dt.timestamp(), 1_709_289_000),
                other => panic!("Expected datetime, got {other:?}"),
            },
            other => panic!("Expected record, got {other:?}"),
        }

        let garbage = AvroValue::Record(vec![(
            "at".to_string(),
            AvroValue::String("not-a-date".to_string()),
        )]);
        match reconstruct_instance(generated.root(), &config, garbage) {
            Err(ModelError::Coerce(CoerceError::InvalidFormat { target, value })) => {
                assert_eq!(target, "datetime");
                assert_eq!(value, "not-a-date");
            }
            other => panic!("Expected invalid format, got {other:?}"),
        }
    }

    #[test]
    fn test_tuple_cast_restores_arity() {
        let model = Model::new("Pair").with_attribute(Attribute::new(
            "entry",
            DeclaredType::Tuple(vec![DeclaredType::Str, DeclaredType::Int32]),
        ));
        let instance = Value::record(vec![(
            "entry",
            Value::Tuple(vec![Value::from("k"), Value::Int(3)]),
        )]);
        let restored = round_trip(&model, &instance);
        match restored {
            Value::Record(ref fields) => {
                assert!(matches!(&fields[0].1, Value::Tuple(items) if items.len() == 2))
            }
            ref other => panic!("Expected record, got {other:?}"),
        }
        assert_eq!(restored, instance);
    }

    #[test]
    fn test_enum_cast_restores_symbol() {
        let model = Model::new("Order").with_attribute(Attribute::new(
            "status",
            DeclaredType::Enum(EnumType::new(
                "Status",
                vec!["placed".to_string(), "shipped".to_string()],
            )),
        ));
        let instance = Value::record(vec![("status", Value::Enum("placed".to_string()))]);
        assert_eq!(round_trip(&model, &instance), instance);
    }

    #[test]
    fn test_map_lands_in_ordered_form() {
        let model = Model::new("Bag").with_attribute(Attribute::new(
            "counts",
            DeclaredType::map(DeclaredType::Int64),
        ));
        let instance = Value::record(vec![(
            "counts",
            Value::map(vec![("b", Value::Long(2)), ("a", Value::Long(1))]),
        )]);
        let restored = round_trip(&model, &instance);
        match restored {
            Value::Record(ref fields) => match &fields[0].1 {
                Value::Map(entries) => {
                    let keys: Vec<&str> = entries.keys().map(String::as_str).collect();
                    assert_eq!(keys, vec!["a", "b"]);
                }
                other => panic!("Expected map, got {other:?}"),
            },
            ref other => panic!("Expected record, got {other:?}"),
        }
    }

    #[test]
    fn test_self_reference_round_trips() {
        let model = Model::new("Node")
            .with_attribute(Attribute::new("label", DeclaredType::Str))
            .with_attribute(Attribute::new(
                "next",
                DeclaredType::optional(DeclaredType::reference("Node")),
            ));
        let instance = Value::record(vec![
            ("label", Value::from("a")),
            (
                "next",
                Value::record(vec![
                    ("label", Value::from("b")),
                    (
                        "next",
                        Value::record(vec![("label", Value::from("c")), ("next", Value::Null)]),
                    ),
                ]),
            ),
        ]);
        assert_eq!(round_trip(&model, &instance), instance);
    }

    #[test]
    fn test_decimal_round_trips() {
        let model = Model::new("Price").with_attribute(Attribute::new(
            "amount",
            DeclaredType::decimal(10, 2),
        ));
        let instance = Value::record(vec![(
            "amount",
            Value::Decimal(BigDecimal::from_str("-123.45").unwrap()),
        )]);
        assert_eq!(round_trip(&model, &instance), instance);
    }

    #[test]
    fn test_untagged_union_value_settles_on_branch() {
        let model = Model::new("Person").with_attribute(Attribute::new(
            "nickname",
            DeclaredType::optional(DeclaredType::Str),
        ));
        let (generated, config) = generated_with_config(&model);
        let decoded = AvroValue::Record(vec![(
            "nickname".to_string(),
            AvroValue::String("al".to_string()),
        )]);
        match reconstruct_instance(generated.root(), &config, decoded).unwrap() {
            Value::Record(fields) => assert_eq!(fields[0].1, Value::String("al".to_string())),
            other => panic!("Expected record, got {other:?}"),
        }
    }

    #[test]
    fn test_check_types_validates_reconstruction() {
        let model = Model::new("Person")
            .with_attribute(Attribute::new("name", DeclaredType::Str))
            .with_attribute(Attribute::new("age", DeclaredType::Int32));
        let generated = generate(&model, None).unwrap();
        let overrides = CoercionOverrides::new().with_check_types(true);
        let config = build_config(generated.root(), &overrides).unwrap();
        let decoded = AvroValue::Record(vec![
            ("name".to_string(), AvroValue::String("Ada".to_string())),
            ("age".to_string(), AvroValue::Int(36)),
        ]);
        let instance = reconstruct_instance(generated.root(), &config, decoded).unwrap();
        match instance {
            Value::Record(fields) => assert_eq!(fields[1].1, Value::Int(36)),
            other => panic!("Expected record, got {other:?}"),
        }
    }
}

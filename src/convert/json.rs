//! Schema-directed Avro JSON encoding.
//!
//! The JSON form follows the Avro specification's JSON encoding: a union
//! value is a bare `null` or a single-key object naming its branch, bytes
//! and fixed render one character per byte, and temporals stay in their
//! integer wire form. Rendering walks the typed schema and the codec value
//! together; parsing inverts the walk, falling back to field defaults for
//! keys the document omits.
//!
//! Text found where a temporal or UUID integer belongs is passed through
//! untouched. The reconstruction hooks own text parsing, so both decode
//! paths report malformed literals identically.

use std::collections::{BTreeMap, HashMap};

use apache_avro::types::Value as AvroValue;
use serde_json::{json, Map as JsonMap, Number, Value as JsonValue};

use crate::convert::{latin1_bytes, latin1_string, SchemaIndex};
use crate::error::CodecError;
use crate::schema::{AvroSchema, FieldSchema, LogicalTypeName, RecordSchema};

/// Render a codec value as Avro JSON
pub(crate) fn encode_json(schema: &AvroSchema, value: &AvroValue) -> Result<JsonValue, CodecError> {
    let index = SchemaIndex::from_schema(schema);
    render_json(schema, value, &index)
}

/// Parse Avro JSON into a codec value
pub(crate) fn decode_json(schema: &AvroSchema, json: &JsonValue) -> Result<AvroValue, CodecError> {
    let index = SchemaIndex::from_schema(schema);
    parse_json(schema, json, &index)
}

fn render_json(
    schema: &AvroSchema,
    value: &AvroValue,
    index: &SchemaIndex<'_>,
) -> Result<JsonValue, CodecError> {
    match (schema, value) {
        (AvroSchema::Null, AvroValue::Null) => Ok(JsonValue::Null),
        (AvroSchema::Boolean, AvroValue::Boolean(b)) => Ok(json!(b)),
        (AvroSchema::Int, AvroValue::Int(n)) => Ok(json!(n)),
        (AvroSchema::Long, AvroValue::Long(n)) => Ok(json!(n)),
        (AvroSchema::Long, AvroValue::Int(n)) => Ok(json!(n)),
        (AvroSchema::Float, AvroValue::Float(f)) => finite_number(f64::from(*f)),
        (AvroSchema::Double, AvroValue::Double(f)) => finite_number(*f),
        (AvroSchema::Double, AvroValue::Float(f)) => finite_number(f64::from(*f)),
        (AvroSchema::Bytes, AvroValue::Bytes(b)) => Ok(JsonValue::String(latin1_string(b))),
        (AvroSchema::String, AvroValue::String(s)) => Ok(JsonValue::String(s.clone())),
        (AvroSchema::Record(record), value) => render_record(record, value, index),
        (AvroSchema::Enum(e), value) => {
            let symbol = match value {
                AvroValue::Enum(_, symbol) => symbol,
                AvroValue::String(symbol) => symbol,
                other => return Err(render_mismatch(schema, other)),
            };
            if e.symbol_index(symbol).is_none() {
                return Err(CodecError::NonConformant(format!(
                    "'{}' is not a symbol of enum {}",
                    symbol, e.name
                )));
            }
            Ok(JsonValue::String(symbol.clone()))
        }
        (AvroSchema::Array(inner), AvroValue::Array(items)) => {
            let rendered: Result<Vec<JsonValue>, CodecError> = items
                .iter()
                .map(|item| render_json(inner, item, index))
                .collect();
            Ok(JsonValue::Array(rendered?))
        }
        (AvroSchema::Map(inner), AvroValue::Map(entries)) => {
            // Sorted keys keep the rendering deterministic
            let ordered: BTreeMap<&String, &AvroValue> = entries.iter().collect();
            let mut out = JsonMap::with_capacity(ordered.len());
            for (key, entry) in ordered {
                out.insert(key.clone(), render_json(inner, entry, index)?);
            }
            Ok(JsonValue::Object(out))
        }
        (AvroSchema::Union(variants), AvroValue::Union(idx, inner)) => {
            let variant = variants.get(*idx as usize).ok_or_else(|| {
                CodecError::NonConformant(format!("union branch {} out of range", idx))
            })?;
            if matches!(variant, AvroSchema::Null) {
                return render_json(variant, inner, index);
            }
            let mut out = JsonMap::with_capacity(1);
            out.insert(schema_label(variant), render_json(variant, inner, index)?);
            Ok(JsonValue::Object(out))
        }
        (AvroSchema::Fixed(f), AvroValue::Fixed(size, bytes)) => {
            if *size != f.size {
                return Err(CodecError::NonConformant(format!(
                    "fixed {} takes {} bytes, got {}",
                    f.name, f.size, size
                )));
            }
            Ok(JsonValue::String(latin1_string(bytes)))
        }
        (AvroSchema::Fixed(f), AvroValue::Bytes(bytes)) => {
            if bytes.len() != f.size {
                return Err(CodecError::NonConformant(format!(
                    "fixed {} takes {} bytes, got {}",
                    f.name,
                    f.size,
                    bytes.len()
                )));
            }
            Ok(JsonValue::String(latin1_string(bytes)))
        }
        (AvroSchema::Named(name), value) => {
            let record = index.get(name).ok_or_else(|| {
                CodecError::NonConformant(format!("unresolved schema reference '{}'", name))
            })?;
            render_record(record, value, index)
        }
        (AvroSchema::Logical(logical), value) => render_logical(logical.logical_type.clone(), value),
        (schema, value) => Err(render_mismatch(schema, value)),
    }
}

fn render_record(
    record: &RecordSchema,
    value: &AvroValue,
    index: &SchemaIndex<'_>,
) -> Result<JsonValue, CodecError> {
    let pairs = match value {
        AvroValue::Record(pairs) => pairs,
        other => {
            return Err(CodecError::NonConformant(format!(
                "record {} cannot be rendered from {}",
                record.name,
                value_kind(other)
            )))
        }
    };
    if pairs.len() != record.fields.len() {
        return Err(CodecError::NonConformant(format!(
            "record {} has {} fields, value carries {}",
            record.name,
            record.fields.len(),
            pairs.len()
        )));
    }
    let mut out = JsonMap::with_capacity(pairs.len());
    for (field, (_, field_value)) in record.fields.iter().zip(pairs) {
        out.insert(
            field.name.clone(),
            render_json(&field.schema, field_value, index)?,
        );
    }
    Ok(JsonValue::Object(out))
}

fn render_logical(kind: LogicalTypeName, value: &AvroValue) -> Result<JsonValue, CodecError> {
    match (kind, value) {
        (LogicalTypeName::Date, AvroValue::Date(days)) => Ok(json!(days)),
        (LogicalTypeName::Date, AvroValue::Int(days)) => Ok(json!(days)),
        (LogicalTypeName::TimeMillis, AvroValue::TimeMillis(ms)) => Ok(json!(ms)),
        (LogicalTypeName::TimeMillis, AvroValue::Int(ms)) => Ok(json!(ms)),
        (LogicalTypeName::TimeMicros, AvroValue::TimeMicros(us)) => Ok(json!(us)),
        (LogicalTypeName::TimeMicros, AvroValue::Long(us)) => Ok(json!(us)),
        (LogicalTypeName::TimestampMillis, AvroValue::TimestampMillis(ms)) => Ok(json!(ms)),
        (LogicalTypeName::TimestampMillis, AvroValue::Long(ms)) => Ok(json!(ms)),
        (LogicalTypeName::TimestampMicros, AvroValue::TimestampMicros(us)) => Ok(json!(us)),
        (LogicalTypeName::TimestampMicros, AvroValue::Long(us)) => Ok(json!(us)),
        (LogicalTypeName::Uuid, AvroValue::Uuid(u)) => Ok(JsonValue::String(u.to_string())),
        (LogicalTypeName::Decimal { .. }, AvroValue::Decimal(d)) => {
            let bytes = <Vec<u8>>::try_from(d)?;
            Ok(JsonValue::String(latin1_string(&bytes)))
        }
        (LogicalTypeName::Decimal { .. }, AvroValue::Bytes(b)) => {
            Ok(JsonValue::String(latin1_string(b)))
        }
        (LogicalTypeName::Decimal { .. }, AvroValue::Fixed(_, b)) => {
            Ok(JsonValue::String(latin1_string(b)))
        }
        // Unparsed text rides through; the reconstruction hooks own it
        (_, AvroValue::String(s)) => Ok(JsonValue::String(s.clone())),
        (kind, other) => Err(CodecError::NonConformant(format!(
            "{} value cannot be rendered from {}",
            kind.name(),
            value_kind(other)
        ))),
    }
}

fn parse_json(
    schema: &AvroSchema,
    json: &JsonValue,
    index: &SchemaIndex<'_>,
) -> Result<AvroValue, CodecError> {
    match (schema, json) {
        (AvroSchema::Null, JsonValue::Null) => Ok(AvroValue::Null),
        (AvroSchema::Boolean, JsonValue::Bool(b)) => Ok(AvroValue::Boolean(*b)),
        (AvroSchema::Int, JsonValue::Number(n)) => {
            let wide = n
                .as_i64()
                .ok_or_else(|| parse_mismatch(schema, json))?;
            let narrow = i32::try_from(wide)
                .map_err(|_| CodecError::InvalidJson(format!("int out of range: {}", wide)))?;
            Ok(AvroValue::Int(narrow))
        }
        (AvroSchema::Long, JsonValue::Number(n)) => n
            .as_i64()
            .map(AvroValue::Long)
            .ok_or_else(|| parse_mismatch(schema, json)),
        (AvroSchema::Float, JsonValue::Number(n)) => n
            .as_f64()
            .map(|f| AvroValue::Float(f as f32))
            .ok_or_else(|| parse_mismatch(schema, json)),
        (AvroSchema::Double, JsonValue::Number(n)) => n
            .as_f64()
            .map(AvroValue::Double)
            .ok_or_else(|| parse_mismatch(schema, json)),
        (AvroSchema::Bytes, JsonValue::String(s)) => latin1_bytes(s)
            .map(AvroValue::Bytes)
            .ok_or_else(|| non_latin1(s)),
        (AvroSchema::String, JsonValue::String(s)) => Ok(AvroValue::String(s.clone())),
        (AvroSchema::Record(record), json) => parse_record(record, json, index),
        (AvroSchema::Enum(e), JsonValue::String(s)) => match e.symbol_index(s) {
            Some(position) => Ok(AvroValue::Enum(position as u32, s.clone())),
            None => Err(CodecError::NonConformant(format!(
                "'{}' is not a symbol of enum {}",
                s, e.name
            ))),
        },
        (AvroSchema::Array(inner), JsonValue::Array(items)) => {
            let parsed: Result<Vec<AvroValue>, CodecError> = items
                .iter()
                .map(|item| parse_json(inner, item, index))
                .collect();
            Ok(AvroValue::Array(parsed?))
        }
        (AvroSchema::Map(inner), JsonValue::Object(entries)) => {
            let mut out = HashMap::with_capacity(entries.len());
            for (key, entry) in entries {
                out.insert(key.clone(), parse_json(inner, entry, index)?);
            }
            Ok(AvroValue::Map(out))
        }
        (AvroSchema::Union(variants), json) => parse_union(variants, json, index),
        (AvroSchema::Fixed(f), JsonValue::String(s)) => {
            let bytes = latin1_bytes(s).ok_or_else(|| non_latin1(s))?;
            if bytes.len() != f.size {
                return Err(CodecError::NonConformant(format!(
                    "fixed {} takes {} bytes, got {}",
                    f.name,
                    f.size,
                    bytes.len()
                )));
            }
            Ok(AvroValue::Fixed(f.size, bytes))
        }
        (AvroSchema::Named(name), json) => {
            let record = index.get(name).ok_or_else(|| {
                CodecError::NonConformant(format!("unresolved schema reference '{}'", name))
            })?;
            parse_record(record, json, index)
        }
        (AvroSchema::Logical(logical), json) => {
            parse_logical(logical.logical_type.clone(), json)
        }
        (schema, json) => Err(parse_mismatch(schema, json)),
    }
}

fn parse_record(
    record: &RecordSchema,
    json: &JsonValue,
    index: &SchemaIndex<'_>,
) -> Result<AvroValue, CodecError> {
    let entries = match json {
        JsonValue::Object(entries) => entries,
        other => {
            return Err(CodecError::InvalidJson(format!(
                "record {} expects an object, got {}",
                record.name, other
            )))
        }
    };
    let mut out = Vec::with_capacity(record.fields.len());
    for field in &record.fields {
        let parsed = match entries.get(&field.name) {
            Some(value) => parse_json(&field.schema, value, index)?,
            None => parse_field_default(field, index)?,
        };
        out.push((field.name.clone(), parsed));
    }
    Ok(AvroValue::Record(out))
}

/// Defaults are written against the first union branch without a label, so
/// they parse untagged and wrap as branch zero.
fn parse_field_default(
    field: &FieldSchema,
    index: &SchemaIndex<'_>,
) -> Result<AvroValue, CodecError> {
    let default = field.default.as_ref().ok_or_else(|| {
        CodecError::InvalidJson(format!(
            "missing field '{}' with no default",
            field.name
        ))
    })?;
    match &field.schema {
        AvroSchema::Union(variants) => {
            let first = variants.first().ok_or_else(|| {
                CodecError::NonConformant(format!("field '{}' has an empty union", field.name))
            })?;
            let parsed = parse_json(first, default, index)?;
            Ok(AvroValue::Union(0, Box::new(parsed)))
        }
        schema => parse_json(schema, default, index),
    }
}

fn parse_union(
    variants: &[AvroSchema],
    json: &JsonValue,
    index: &SchemaIndex<'_>,
) -> Result<AvroValue, CodecError> {
    if json.is_null() {
        let position = variants
            .iter()
            .position(|v| matches!(v, AvroSchema::Null))
            .ok_or_else(|| {
                CodecError::InvalidJson("null is not a branch of this union".to_string())
            })?;
        return Ok(AvroValue::Union(position as u32, Box::new(AvroValue::Null)));
    }
    let entries = match json {
        JsonValue::Object(entries) if entries.len() == 1 => entries,
        other => {
            return Err(CodecError::InvalidJson(format!(
                "union value must be null or a single-key object, got {}",
                other
            )))
        }
    };
    if let Some((label, inner)) = entries.iter().next() {
        let position = variants
            .iter()
            .position(|variant| schema_label(variant) == *label)
            .ok_or_else(|| {
                CodecError::InvalidJson(format!("unknown union branch '{}'", label))
            })?;
        let parsed = parse_json(&variants[position], inner, index)?;
        return Ok(AvroValue::Union(position as u32, Box::new(parsed)));
    }
    Err(CodecError::InvalidJson(
        "union value must be null or a single-key object".to_string(),
    ))
}

fn parse_logical(kind: LogicalTypeName, json: &JsonValue) -> Result<AvroValue, CodecError> {
    match (kind, json) {
        (LogicalTypeName::Date, JsonValue::Number(n)) => {
            narrow_literal(n, "date").map(AvroValue::Date)
        }
        (LogicalTypeName::TimeMillis, JsonValue::Number(n)) => {
            narrow_literal(n, "time-millis").map(AvroValue::TimeMillis)
        }
        (LogicalTypeName::TimeMicros, JsonValue::Number(n)) => {
            integer_literal(n, "time-micros").map(AvroValue::TimeMicros)
        }
        (LogicalTypeName::TimestampMillis, JsonValue::Number(n)) => {
            integer_literal(n, "timestamp-millis").map(AvroValue::TimestampMillis)
        }
        (LogicalTypeName::TimestampMicros, JsonValue::Number(n)) => {
            integer_literal(n, "timestamp-micros").map(AvroValue::TimestampMicros)
        }
        (LogicalTypeName::Decimal { .. }, JsonValue::String(s)) => latin1_bytes(s)
            .map(AvroValue::Bytes)
            .ok_or_else(|| non_latin1(s)),
        // UUID text and unparsed temporal literals ride through for the hooks
        (_, JsonValue::String(s)) => Ok(AvroValue::String(s.clone())),
        (kind, other) => Err(CodecError::InvalidJson(format!(
            "expected {}, got {}",
            kind.name(),
            other
        ))),
    }
}

fn integer_literal(n: &Number, target: &'static str) -> Result<i64, CodecError> {
    n.as_i64().ok_or_else(|| {
        CodecError::InvalidJson(format!("expected integer {}, got {}", target, n))
    })
}

fn narrow_literal(n: &Number, target: &'static str) -> Result<i32, CodecError> {
    let wide = integer_literal(n, target)?;
    i32::try_from(wide)
        .map_err(|_| CodecError::InvalidJson(format!("{} out of range: {}", target, wide)))
}

fn finite_number(value: f64) -> Result<JsonValue, CodecError> {
    Number::from_f64(value)
        .map(JsonValue::Number)
        .ok_or_else(|| {
            CodecError::InvalidJson(format!("non-finite number {} has no JSON form", value))
        })
}

fn non_latin1(text: &str) -> CodecError {
    CodecError::InvalidJson(format!(
        "byte string contains characters above U+00FF: {:?}",
        text
    ))
}

fn render_mismatch(schema: &AvroSchema, value: &AvroValue) -> CodecError {
    CodecError::NonConformant(format!(
        "{} value cannot be rendered from {}",
        schema.type_name(),
        value_kind(value)
    ))
}

fn parse_mismatch(schema: &AvroSchema, json: &JsonValue) -> CodecError {
    CodecError::InvalidJson(format!("expected {}, got {}", schema.type_name(), json))
}

fn value_kind(value: &AvroValue) -> &'static str {
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

/// The key naming a union branch in the JSON encoding: the fullname for
/// named types, the bare type name otherwise.
fn schema_label(schema: &AvroSchema) -> String {
    match schema {
        AvroSchema::Record(r) => r.fullname(),
        AvroSchema::Enum(e) => e.fullname(),
        AvroSchema::Fixed(f) => f.fullname(),
        AvroSchema::Named(name) => name.clone(),
        AvroSchema::Logical(logical) => schema_label(&logical.base),
        other => other.type_name().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{EnumSchema, FixedSchema, LogicalType};

    fn optional_string() -> AvroSchema {
        AvroSchema::Union(vec![AvroSchema::Null, AvroSchema::String])
    }

    #[test]
    fn test_union_null_renders_bare() {
        let schema = optional_string();
        let rendered =
            encode_json(&schema, &AvroValue::Union(0, Box::new(AvroValue::Null))).unwrap();
        assert_eq!(rendered, JsonValue::Null);
    }

    #[test]
    fn test_union_branch_renders_labeled() {
        let schema = optional_string();
        let value = AvroValue::Union(1, Box::new(AvroValue::String("x".to_string())));
        assert_eq!(encode_json(&schema, &value).unwrap(), json!({"string": "x"}));
    }

    #[test]
    fn test_named_branch_uses_fullname_label() {
        let mut record = RecordSchema::new(
            "Person",
            vec![FieldSchema::new("name", AvroSchema::String)],
        );
        record.namespace = Some("com.example".to_string());
        let schema = AvroSchema::Union(vec![AvroSchema::Null, AvroSchema::Record(record)]);
        let value = AvroValue::Union(
            1,
            Box::new(AvroValue::Record(vec![(
                "name".to_string(),
                AvroValue::String("Ada".to_string()),
            )])),
        );
        let expected = json!({"com.example.Person": {"name": "Ada"}});
        assert_eq!(encode_json(&schema, &value).unwrap(), expected);
        assert_eq!(decode_json(&schema, &expected).unwrap(), value);
    }

    #[test]
    fn test_union_parse_requires_label() {
        let schema = optional_string();
        assert_eq!(
            decode_json(&schema, &JsonValue::Null).unwrap(),
            AvroValue::Union(0, Box::new(AvroValue::Null))
        );
        assert_eq!(
            decode_json(&schema, &json!({"string": "x"})).unwrap(),
            AvroValue::Union(1, Box::new(AvroValue::String("x".to_string())))
        );
        match decode_json(&schema, &json!("x")) {
            Err(CodecError::InvalidJson(_)) => {}
            other => panic!("Expected invalid JSON, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_branch_label_rejected() {
        let schema = optional_string();
        match decode_json(&schema, &json!({"boolean": true})) {
            Err(CodecError::InvalidJson(message)) => assert!(message.contains("boolean")),
            other => panic!("Expected invalid JSON, got {other:?}"),
        }
    }

    #[test]
    fn test_bytes_render_one_char_per_byte() {
        let value = AvroValue::Bytes(vec![0x00, 0xff, 0x41]);
        let rendered = encode_json(&AvroSchema::Bytes, &value).unwrap();
        assert_eq!(rendered, json!("\u{0}\u{ff}A"));
        assert_eq!(decode_json(&AvroSchema::Bytes, &rendered).unwrap(), value);
        match decode_json(&AvroSchema::Bytes, &json!("\u{2192}")) {
            Err(CodecError::InvalidJson(message)) => assert!(message.contains("U+00FF")),
            other => panic!("Expected invalid JSON, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let record = RecordSchema::new(
            "Person",
            vec![
                FieldSchema::new("name", AvroSchema::String).with_default(json!("anon")),
                FieldSchema::new("nickname", optional_string()).with_default(JsonValue::Null),
            ],
        );
        let parsed = decode_json(&AvroSchema::Record(record), &json!({})).unwrap();
        assert_eq!(
            parsed,
            AvroValue::Record(vec![
                ("name".to_string(), AvroValue::String("anon".to_string())),
                (
                    "nickname".to_string(),
                    AvroValue::Union(0, Box::new(AvroValue::Null))
                ),
            ])
        );
    }

    #[test]
    fn test_missing_field_without_default_is_rejected() {
        let record =
            RecordSchema::new("Person", vec![FieldSchema::new("name", AvroSchema::String)]);
        match decode_json(&AvroSchema::Record(record), &json!({})) {
            Err(CodecError::InvalidJson(message)) => assert!(message.contains("name")),
            other => panic!("Expected invalid JSON, got {other:?}"),
        }
    }

    #[test]
    fn test_enum_symbols_checked_both_ways() {
        let schema = AvroSchema::Enum(EnumSchema::new(
            "Status",
            vec!["placed".to_string(), "shipped".to_string()],
        ));
        assert_eq!(
            decode_json(&schema, &json!("shipped")).unwrap(),
            AvroValue::Enum(1, "shipped".to_string())
        );
        match decode_json(&schema, &json!("lost")) {
            Err(CodecError::NonConformant(message)) => assert!(message.contains("lost")),
            other => panic!("Expected non-conformant, got {other:?}"),
        }
        match encode_json(&schema, &AvroValue::Enum(9, "lost".to_string())) {
            Err(CodecError::NonConformant(_)) => {}
            other => panic!("Expected non-conformant, got {other:?}"),
        }
    }

    #[test]
    fn test_non_finite_numbers_have_no_json_form() {
        match encode_json(&AvroSchema::Double, &AvroValue::Double(f64::NAN)) {
            Err(CodecError::InvalidJson(_)) => {}
            other => panic!("Expected invalid JSON, got {other:?}"),
        }
    }

    #[test]
    fn test_timestamps_stay_numeric_and_text_passes_through() {
        let schema = AvroSchema::Logical(LogicalType::new(
            AvroSchema::Long,
            LogicalTypeName::TimestampMillis,
        ));
        assert_eq!(
            decode_json(&schema, &json!(1_700_000_000_000i64)).unwrap(),
            AvroValue::TimestampMillis(1_700_000_000_000)
        );
        assert_eq!(
            decode_json(&schema, &json!("2024-03-01T10:30:00Z")).unwrap(),
            AvroValue::String("2024-03-01T10:30:00Z".to_string())
        );
        assert_eq!(
            encode_json(&schema, &AvroValue::TimestampMillis(99)).unwrap(),
            json!(99)
        );
    }

    #[test]
    fn test_fixed_length_checked() {
        let schema = AvroSchema::Fixed(FixedSchema::new("Pair", 2));
        assert_eq!(
            decode_json(&schema, &json!("ab")).unwrap(),
            AvroValue::Fixed(2, vec![b'a', b'b'])
        );
        match decode_json(&schema, &json!("abc")) {
            Err(CodecError::NonConformant(message)) => assert!(message.contains("Pair")),
            other => panic!("Expected non-conformant, got {other:?}"),
        }
    }
}

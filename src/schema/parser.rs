//! Schema document parsing.
//!
//! Rebuilds the typed schema from its JSON document form. Named types
//! register as they parse so references and recursive definitions resolve,
//! and namespaces inherit down nested records the way the Avro
//! specification scopes them. Strict mode turns the structural rules
//! (duplicate union branches, nested unions, the name grammar) into errors;
//! the permissive default logs a warning and continues, because
//! case-transformed documents legitimately carry field names outside the
//! identifier grammar.

use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value};
use tracing::warn;

use crate::error::SchemaError;
use crate::schema::{
    AvroSchema, EnumSchema, FieldOrder, FieldSchema, FixedSchema, LogicalType, LogicalTypeName,
    RecordSchema,
};

/// Parse a schema document in permissive mode.
///
/// # Example
/// ```
/// use airframe::schema::{parse_schema, AvroSchema};
///
/// let schema = parse_schema(r#""string""#).unwrap();
/// assert_eq!(schema, AvroSchema::String);
/// ```
pub fn parse_schema(json: &str) -> Result<AvroSchema, SchemaError> {
    parse_schema_with_options(json, false)
}

/// Parse a schema document, optionally enforcing the structural rules as
/// errors instead of warnings.
///
/// # Example
/// ```
/// use airframe::schema::parse_schema_with_options;
///
/// let lenient = parse_schema_with_options(r#"["int", "int"]"#, false);
/// assert!(lenient.is_ok());
///
/// let strict = parse_schema_with_options(r#"["int", "int"]"#, true);
/// assert!(strict.is_err());
/// ```
pub fn parse_schema_with_options(json: &str, strict: bool) -> Result<AvroSchema, SchemaError> {
    let document: Value = serde_json::from_str(json)
        .map_err(|e| SchemaError::InvalidSchema(format!("document is not JSON: {e}")))?;
    SchemaParser::new().with_strict(strict).parse(&document)
}

/// Document parser carrying the named-type registry and namespace scope
#[derive(Debug, Default)]
pub struct SchemaParser {
    registry: HashMap<String, AvroSchema>,
    namespace: Option<String>,
    strict: bool,
}

/// Name attributes shared by the named types
struct NamedHeader {
    name: String,
    fullname: String,
    namespace: Option<String>,
    doc: Option<String>,
    aliases: Vec<String>,
}

impl SchemaParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parser with the structural rules enforced as errors
    pub fn new_strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Parse a document value into a typed schema
    pub fn parse(&mut self, document: &Value) -> Result<AvroSchema, SchemaError> {
        match document {
            Value::String(name) => self.parse_name(name),
            Value::Array(branches) => self.parse_union(branches),
            Value::Object(attrs) => self.parse_object(attrs),
            other => Err(SchemaError::InvalidSchema(format!(
                "schema must be a string, object, or array, got {other}"
            ))),
        }
    }

    fn parse_name(&self, name: &str) -> Result<AvroSchema, SchemaError> {
        Ok(match name {
            "null" => AvroSchema::Null,
            "boolean" => AvroSchema::Boolean,
            "int" => AvroSchema::Int,
            "long" => AvroSchema::Long,
            "float" => AvroSchema::Float,
            "double" => AvroSchema::Double,
            "bytes" => AvroSchema::Bytes,
            "string" => AvroSchema::String,
            // Anything else is a named reference; recursive definitions
            // resolve against the registry entry made before field parsing
            other => AvroSchema::Named(self.qualify(other)),
        })
    }

    fn parse_object(&mut self, attrs: &Map<String, Value>) -> Result<AvroSchema, SchemaError> {
        if attrs.contains_key("logicalType") {
            return self.parse_logical(attrs);
        }
        let token = attrs.get("type").and_then(Value::as_str).ok_or_else(|| {
            SchemaError::InvalidSchema("schema object carries no 'type' name".to_string())
        })?;
        match token {
            "null" | "boolean" | "int" | "long" | "float" | "double" | "bytes" | "string" => {
                self.parse_name(token)
            }
            "record" => self.parse_record(attrs),
            "enum" => self.parse_enum(attrs),
            "fixed" => self.parse_fixed(attrs),
            "array" => {
                let items = attrs.get("items").ok_or_else(|| {
                    SchemaError::InvalidSchema("array schema carries no 'items'".to_string())
                })?;
                Ok(AvroSchema::Array(Box::new(self.parse(items)?)))
            }
            "map" => {
                let values = attrs.get("values").ok_or_else(|| {
                    SchemaError::InvalidSchema("map schema carries no 'values'".to_string())
                })?;
                Ok(AvroSchema::Map(Box::new(self.parse(values)?)))
            }
            other => {
                let fullname = self.qualify(other);
                if self.registry.contains_key(&fullname) {
                    Ok(AvroSchema::Named(fullname))
                } else {
                    Err(SchemaError::UnsupportedType(format!(
                        "unknown schema type '{other}'"
                    )))
                }
            }
        }
    }

    fn parse_union(&mut self, branches: &[Value]) -> Result<AvroSchema, SchemaError> {
        if branches.is_empty() {
            return Err(SchemaError::InvalidSchema(
                "union declares no branches".to_string(),
            ));
        }
        let branches: Vec<AvroSchema> = branches
            .iter()
            .map(|branch| self.parse(branch))
            .collect::<Result<_, _>>()?;
        self.check_union(&branches)?;
        Ok(AvroSchema::Union(branches))
    }

    /// Union structural rules: no nested unions, no duplicate branches
    fn check_union(&self, branches: &[AvroSchema]) -> Result<(), SchemaError> {
        let mut seen = HashSet::new();
        for (position, branch) in branches.iter().enumerate() {
            if matches!(branch, AvroSchema::Union(_)) {
                self.structural(format!("union branch {position} is itself a union"))?;
            }
            if !seen.insert(branch_key(branch)) {
                self.structural(format!(
                    "union branch {position} duplicates an earlier {}",
                    branch.type_name()
                ))?;
            }
        }
        Ok(())
    }

    fn parse_record(&mut self, attrs: &Map<String, Value>) -> Result<AvroSchema, SchemaError> {
        let header = self.named_header(attrs, "record")?;

        // Nested types inherit this record's namespace
        let outer = self.namespace.clone();
        match (&header.namespace, &self.namespace) {
            (Some(ns), _) => self.namespace = Some(ns.clone()),
            (None, None) => {
                if let Some((prefix, _)) = header.fullname.rsplit_once('.') {
                    self.namespace = Some(prefix.to_string());
                }
            }
            (None, Some(_)) => {}
        }

        // Register before parsing fields so self-references resolve
        self.registry.insert(
            header.fullname.clone(),
            AvroSchema::Named(header.fullname.clone()),
        );

        let declared = attrs.get("fields").and_then(Value::as_array).ok_or_else(|| {
            SchemaError::InvalidSchema(format!(
                "record '{}' carries no 'fields' array",
                header.name
            ))
        })?;
        let fields = declared
            .iter()
            .map(|field| self.parse_field(field))
            .collect::<Result<Vec<_>, _>>();
        self.namespace = outer;

        let NamedHeader {
            name,
            fullname,
            namespace,
            doc,
            aliases,
        } = header;
        let namespace =
            namespace.or_else(|| fullname.rsplit_once('.').map(|(ns, _)| ns.to_string()));
        let schema = AvroSchema::Record(RecordSchema {
            name,
            namespace,
            fields: fields?,
            doc,
            aliases,
        });
        self.registry.insert(fullname, schema.clone());
        Ok(schema)
    }

    fn parse_field(&mut self, declared: &Value) -> Result<FieldSchema, SchemaError> {
        let attrs = declared.as_object().ok_or_else(|| {
            SchemaError::InvalidSchema("record field must be an object".to_string())
        })?;
        let name = attrs
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                SchemaError::InvalidSchema("record field carries no 'name'".to_string())
            })?
            .to_string();
        // Field names fall outside the identifier grammar after a separator
        // case pass, so only emptiness is rejected here
        if name.is_empty() {
            return Err(SchemaError::InvalidSchema(
                "record field name is empty".to_string(),
            ));
        }
        let declared_type = attrs.get("type").ok_or_else(|| {
            SchemaError::InvalidSchema(format!("field '{name}' carries no 'type'"))
        })?;
        let schema = self.parse(declared_type)?;
        let order = attrs
            .get("order")
            .and_then(Value::as_str)
            .map(FieldOrder::from_token)
            .unwrap_or_default();
        Ok(FieldSchema {
            name,
            schema,
            default: attrs.get("default").cloned(),
            doc: attrs.get("doc").and_then(Value::as_str).map(String::from),
            order,
            aliases: string_list(attrs.get("aliases")),
        })
    }

    fn parse_enum(&mut self, attrs: &Map<String, Value>) -> Result<AvroSchema, SchemaError> {
        let header = self.named_header(attrs, "enum")?;
        let symbols: Vec<String> = attrs
            .get("symbols")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                SchemaError::InvalidSchema(format!(
                    "enum '{}' carries no 'symbols' array",
                    header.name
                ))
            })?
            .iter()
            .filter_map(|symbol| symbol.as_str().map(String::from))
            .collect();
        if symbols.is_empty() {
            return Err(SchemaError::InvalidSchema(format!(
                "enum '{}' declares no symbols",
                header.name
            )));
        }
        for symbol in &symbols {
            self.check_name(symbol, "enum symbol")?;
        }
        let default = attrs.get("default").and_then(Value::as_str).map(String::from);

        let NamedHeader {
            name,
            fullname,
            namespace,
            doc,
            aliases,
        } = header;
        let namespace =
            namespace.or_else(|| fullname.rsplit_once('.').map(|(ns, _)| ns.to_string()));
        let schema = AvroSchema::Enum(EnumSchema {
            name,
            namespace,
            symbols,
            doc,
            aliases,
            default,
        });
        self.registry.insert(fullname, schema.clone());
        Ok(schema)
    }

    fn parse_fixed(&mut self, attrs: &Map<String, Value>) -> Result<AvroSchema, SchemaError> {
        let header = self.named_header(attrs, "fixed")?;
        let size = attrs.get("size").and_then(Value::as_u64).ok_or_else(|| {
            SchemaError::InvalidSchema(format!("fixed '{}' carries no 'size'", header.name))
        })? as usize;

        let NamedHeader {
            name,
            fullname,
            namespace,
            doc,
            aliases,
        } = header;
        let namespace =
            namespace.or_else(|| fullname.rsplit_once('.').map(|(ns, _)| ns.to_string()));
        let schema = AvroSchema::Fixed(FixedSchema {
            name,
            namespace,
            size,
            doc,
            aliases,
        });
        self.registry.insert(fullname, schema.clone());
        Ok(schema)
    }

    fn parse_logical(&mut self, attrs: &Map<String, Value>) -> Result<AvroSchema, SchemaError> {
        let annotation = attrs
            .get("logicalType")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                SchemaError::InvalidSchema("'logicalType' must be a string".to_string())
            })?;
        let token = attrs.get("type").and_then(Value::as_str).ok_or_else(|| {
            SchemaError::InvalidSchema(format!(
                "logical type '{annotation}' carries no base 'type'"
            ))
        })?;
        let base = match token {
            "fixed" => self.parse_fixed(attrs)?,
            primitive => match self.parse_name(primitive)? {
                AvroSchema::Named(_) => {
                    return Err(SchemaError::InvalidSchema(format!(
                        "logical type '{annotation}' over unsupported base '{primitive}'"
                    )))
                }
                base => base,
            },
        };
        let annotation = match annotation {
            "decimal" => {
                let precision = attrs
                    .get("precision")
                    .and_then(Value::as_u64)
                    .ok_or_else(|| {
                        SchemaError::InvalidSchema("decimal carries no 'precision'".to_string())
                    })? as u32;
                let scale = attrs.get("scale").and_then(Value::as_u64).unwrap_or(0) as u32;
                LogicalTypeName::Decimal { precision, scale }
            }
            "uuid" => LogicalTypeName::Uuid,
            "date" => LogicalTypeName::Date,
            "time-millis" => LogicalTypeName::TimeMillis,
            "time-micros" => LogicalTypeName::TimeMicros,
            "timestamp-millis" => LogicalTypeName::TimestampMillis,
            "timestamp-micros" => LogicalTypeName::TimestampMicros,
            // Unknown annotations fall back to their base type
            _ => return Ok(base),
        };
        Ok(AvroSchema::Logical(LogicalType::new(base, annotation)))
    }

    /// Read the name/namespace/doc/aliases attributes of a named type and
    /// compute its fully qualified name against the current scope
    fn named_header(
        &self,
        attrs: &Map<String, Value>,
        kind: &str,
    ) -> Result<NamedHeader, SchemaError> {
        let name = attrs
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| SchemaError::InvalidSchema(format!("{kind} schema carries no 'name'")))?
            .to_string();
        self.check_type_name(&name, kind)?;

        let namespace = attrs
            .get("namespace")
            .and_then(Value::as_str)
            .map(String::from);
        let fullname = match &namespace {
            Some(ns) => format!("{ns}.{name}"),
            None => self.qualify(&name),
        };
        let short = name.rsplit('.').next().unwrap_or(&name).to_string();
        Ok(NamedHeader {
            name: short,
            fullname,
            namespace,
            doc: attrs.get("doc").and_then(Value::as_str).map(String::from),
            aliases: string_list(attrs.get("aliases")),
        })
    }

    /// Qualify a bare name against the current namespace; dotted names are
    /// already qualified
    fn qualify(&self, name: &str) -> String {
        if name.contains('.') {
            return name.to_string();
        }
        match &self.namespace {
            Some(ns) => format!("{ns}.{name}"),
            None => name.to_string(),
        }
    }

    /// A type name may carry its namespace inline; every dotted segment is
    /// held to the name grammar
    fn check_type_name(&self, name: &str, kind: &str) -> Result<(), SchemaError> {
        if name.contains('.') {
            name.split('.')
                .try_for_each(|segment| self.check_name(segment, kind))
        } else {
            self.check_name(name, kind)
        }
    }

    /// Avro name grammar: `[A-Za-z_][A-Za-z0-9_]*`
    fn check_name(&self, name: &str, kind: &str) -> Result<(), SchemaError> {
        match name.chars().next() {
            None => self.structural(format!("{kind} name is empty")),
            Some(first) if !first.is_ascii_alphabetic() && first != '_' => {
                self.structural(format!("{kind} name '{name}' starts with '{first}'"))
            }
            Some(_) => match name.chars().find(|c| !c.is_ascii_alphanumeric() && *c != '_') {
                Some(bad) => self.structural(format!("{kind} name '{name}' contains '{bad}'")),
                None => Ok(()),
            },
        }
    }

    /// Enforce a structural rule: an error in strict mode, a warning
    /// otherwise
    fn structural(&self, message: String) -> Result<(), SchemaError> {
        if self.strict {
            Err(SchemaError::InvalidSchema(message))
        } else {
            warn!("{message}");
            Ok(())
        }
    }
}

/// Key under which a union branch counts as a duplicate: primitives and
/// containers by kind, named types by fullname
fn branch_key(schema: &AvroSchema) -> String {
    match schema {
        AvroSchema::Record(_)
        | AvroSchema::Enum(_)
        | AvroSchema::Fixed(_)
        | AvroSchema::Named(_) => match schema.fullname() {
            Some(fullname) => format!("{}:{fullname}", schema.type_name()),
            None => schema.type_name().to_string(),
        },
        AvroSchema::Logical(logical) => format!("logical:{}", branch_key(&logical.base)),
        other => other.type_name().to_string(),
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_primitive_and_reference_names() {
        let mut parser = SchemaParser::new();
        match parser.parse(&json!("long")) {
            Ok(AvroSchema::Long) => {}
            other => panic!("Expected long, got {other:?}"),
        }
        match parser.parse(&json!("SomeRecord")) {
            Ok(AvroSchema::Named(name)) => assert_eq!(name, "SomeRecord"),
            other => panic!("Expected named reference, got {other:?}"),
        }
    }

    #[test]
    fn test_recursive_reference_resolves() {
        let document = json!({
            "type": "record",
            "name": "TreeNode",
            "fields": [
                {"name": "label", "type": "string"},
                {"name": "next", "type": ["null", "TreeNode"], "default": null}
            ]
        });
        let mut parser = SchemaParser::new();
        let record = match parser.parse(&document) {
            Ok(AvroSchema::Record(record)) => record,
            other => panic!("Expected record, got {other:?}"),
        };
        assert_eq!(
            record.fields[1].schema,
            AvroSchema::Union(vec![
                AvroSchema::Null,
                AvroSchema::Named("TreeNode".to_string())
            ])
        );
        assert_eq!(record.fields[1].default, Some(Value::Null));
    }

    #[test]
    fn test_namespace_inherits_into_nested_types() {
        let document = json!({
            "type": "record",
            "name": "Outer",
            "namespace": "com.example",
            "fields": [
                {"name": "inner", "type": {
                    "type": "record",
                    "name": "Inner",
                    "fields": [{"name": "x", "type": "int"}]
                }},
                {"name": "again", "type": "Inner"}
            ]
        });
        let mut parser = SchemaParser::new();
        let outer = match parser.parse(&document) {
            Ok(AvroSchema::Record(record)) => record,
            other => panic!("Expected record, got {other:?}"),
        };
        match &outer.fields[0].schema {
            AvroSchema::Record(inner) => assert_eq!(inner.fullname(), "com.example.Inner"),
            other => panic!("Expected record, got {other:?}"),
        }
        match &outer.fields[1].schema {
            AvroSchema::Named(name) => assert_eq!(name, "com.example.Inner"),
            other => panic!("Expected named reference, got {other:?}"),
        }
    }

    #[test]
    fn test_dotted_name_splits_into_namespace() {
        let document = json!({"type": "fixed", "name": "com.example.Digest", "size": 16});
        let mut parser = SchemaParser::new();
        match parser.parse(&document) {
            Ok(AvroSchema::Fixed(fixed)) => {
                assert_eq!(fixed.name, "Digest");
                assert_eq!(fixed.namespace.as_deref(), Some("com.example"));
                assert_eq!(fixed.size, 16);
            }
            other => panic!("Expected fixed, got {other:?}"),
        }
    }

    #[test]
    fn test_strict_mode_rejects_duplicate_union_branches() {
        match parse_schema_with_options(r#"["int", "int"]"#, true) {
            Err(SchemaError::InvalidSchema(reason)) => assert!(reason.contains("duplicates")),
            other => panic!("Expected invalid schema, got {other:?}"),
        }
        assert!(parse_schema_with_options(r#"["int", "int"]"#, false).is_ok());
        assert!(parse_schema_with_options(r#"["int", "long"]"#, true).is_ok());
    }

    #[test]
    fn test_strict_mode_rejects_nested_unions() {
        match parse_schema_with_options(r#"["int", ["null", "string"]]"#, true) {
            Err(SchemaError::InvalidSchema(reason)) => assert!(reason.contains("union")),
            other => panic!("Expected invalid schema, got {other:?}"),
        }
        assert!(parse_schema_with_options(r#"["int", ["null", "string"]]"#, false).is_ok());
    }

    #[test]
    fn test_strict_mode_rejects_malformed_names() {
        let document = r#"{"type": "record", "name": "person-record", "fields": []}"#;
        match parse_schema_with_options(document, true) {
            Err(SchemaError::InvalidSchema(reason)) => assert!(reason.contains("person-record")),
            other => panic!("Expected invalid schema, got {other:?}"),
        }
        assert!(parse_schema_with_options(document, false).is_ok());
    }

    #[test]
    fn test_logical_annotations_parse() {
        let mut parser = SchemaParser::new();
        let schema = parser
            .parse(&json!({"type": "long", "logicalType": "timestamp-micros"}))
            .unwrap();
        assert_eq!(
            schema,
            AvroSchema::Logical(LogicalType::new(
                AvroSchema::Long,
                LogicalTypeName::TimestampMicros
            ))
        );

        let document = json!({
            "type": "fixed",
            "name": "Amount",
            "size": 8,
            "logicalType": "decimal",
            "precision": 18,
            "scale": 4
        });
        match parser.parse(&document) {
            Ok(AvroSchema::Logical(logical)) => {
                assert_eq!(
                    logical.logical_type,
                    LogicalTypeName::Decimal {
                        precision: 18,
                        scale: 4
                    }
                );
                match logical.base.as_ref() {
                    AvroSchema::Fixed(fixed) => assert_eq!(fixed.size, 8),
                    other => panic!("Expected fixed base, got {other:?}"),
                }
            }
            other => panic!("Expected logical type, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_logical_annotation_falls_back_to_base() {
        let mut parser = SchemaParser::new();
        let schema = parser
            .parse(&json!({"type": "string", "logicalType": "ulid"}))
            .unwrap();
        assert_eq!(schema, AvroSchema::String);
    }

    #[test]
    fn test_field_order_tokens() {
        let document = json!({
            "type": "record",
            "name": "Ranked",
            "fields": [
                {"name": "a", "type": "int", "order": "descending"},
                {"name": "b", "type": "int", "order": "ignore"},
                {"name": "c", "type": "int"}
            ]
        });
        let mut parser = SchemaParser::new();
        match parser.parse(&document) {
            Ok(AvroSchema::Record(record)) => {
                assert_eq!(record.fields[0].order, FieldOrder::Descending);
                assert_eq!(record.fields[1].order, FieldOrder::Ignore);
                assert_eq!(record.fields[2].order, FieldOrder::Ascending);
            }
            other => panic!("Expected record, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_documents_are_rejected() {
        assert!(parse_schema("not json").is_err());
        assert!(parse_schema("true").is_err());
        assert!(parse_schema("[]").is_err());
        assert!(parse_schema(r#"{"name": "X"}"#).is_err());
        assert!(parse_schema(r#"{"type": "record", "name": "X"}"#).is_err());
        match parse_schema(r#"{"type": "mystery"}"#) {
            Err(SchemaError::UnsupportedType(reason)) => assert!(reason.contains("mystery")),
            other => panic!("Expected unsupported type, got {other:?}"),
        }
    }
}

//! Typed Avro schemas.
//!
//! The structured form of a generated document. The generator renders a
//! resolved model into these types and serializes them to JSON; the parser
//! rebuilds them from documents. Named types carry optional namespaces, and
//! logical types wrap the base schema they annotate.

use serde_json::{json, Map, Value};

/// An Avro schema fragment
#[derive(Debug, Clone, PartialEq)]
pub enum AvroSchema {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Bytes,
    String,
    /// Record of named fields
    Record(RecordSchema),
    /// Closed symbol set
    Enum(EnumSchema),
    /// Homogeneous sequence
    Array(Box<AvroSchema>),
    /// String-keyed mapping
    Map(Box<AvroSchema>),
    /// Alternatives in branch order
    Union(Vec<AvroSchema>),
    /// Fixed-length byte sequence
    Fixed(FixedSchema),
    /// Reference to a named type declared elsewhere in the document
    Named(String),
    /// Logical annotation over a base schema
    Logical(LogicalType),
}

impl AvroSchema {
    /// Schema kind name for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            AvroSchema::Null => "null",
            AvroSchema::Boolean => "boolean",
            AvroSchema::Int => "int",
            AvroSchema::Long => "long",
            AvroSchema::Float => "float",
            AvroSchema::Double => "double",
            AvroSchema::Bytes => "bytes",
            AvroSchema::String => "string",
            AvroSchema::Record(_) => "record",
            AvroSchema::Enum(_) => "enum",
            AvroSchema::Array(_) => "array",
            AvroSchema::Map(_) => "map",
            AvroSchema::Union(_) => "union",
            AvroSchema::Fixed(_) => "fixed",
            AvroSchema::Named(_) => "named reference",
            AvroSchema::Logical(logical) => logical.logical_type.name(),
        }
    }

    /// Fully qualified name of a named type or reference
    pub fn fullname(&self) -> Option<String> {
        match self {
            AvroSchema::Record(record) => Some(record.fullname()),
            AvroSchema::Enum(inner) => Some(inner.fullname()),
            AvroSchema::Fixed(fixed) => Some(fixed.fullname()),
            AvroSchema::Named(name) => Some(name.clone()),
            _ => None,
        }
    }

    /// Whether this is a union carrying a null branch
    pub fn is_nullable(&self) -> bool {
        match self {
            AvroSchema::Union(branches) => branches.iter().any(|b| matches!(b, AvroSchema::Null)),
            _ => false,
        }
    }

    /// Render the schema as a document value.
    ///
    /// Primitives render as bare name strings, unions as arrays, and named
    /// references as the referenced name; everything else renders as an
    /// attribute object.
    pub fn to_json_value(&self) -> Value {
        match self {
            AvroSchema::Null => json!("null"),
            AvroSchema::Boolean => json!("boolean"),
            AvroSchema::Int => json!("int"),
            AvroSchema::Long => json!("long"),
            AvroSchema::Float => json!("float"),
            AvroSchema::Double => json!("double"),
            AvroSchema::Bytes => json!("bytes"),
            AvroSchema::String => json!("string"),
            AvroSchema::Record(record) => record.to_json_value(),
            AvroSchema::Enum(inner) => inner.to_json_value(),
            AvroSchema::Array(items) => json!({
                "type": "array",
                "items": items.to_json_value(),
            }),
            AvroSchema::Map(values) => json!({
                "type": "map",
                "values": values.to_json_value(),
            }),
            AvroSchema::Union(branches) => {
                Value::Array(branches.iter().map(AvroSchema::to_json_value).collect())
            }
            AvroSchema::Fixed(fixed) => fixed.to_json_value(),
            AvroSchema::Named(name) => json!(name),
            AvroSchema::Logical(logical) => logical.to_json_value(),
        }
    }

    /// Render the schema as a JSON string.
    ///
    /// # Example
    /// ```
    /// use airframe::schema::AvroSchema;
    ///
    /// assert_eq!(AvroSchema::String.to_json(), r#""string""#);
    /// ```
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.to_json_value()).unwrap_or_else(|_| "null".to_string())
    }
}

/// Attribute object shared by the named types: the type token, the name,
/// and whichever of namespace/doc/aliases are present
fn named_header(
    kind: &str,
    name: &str,
    namespace: Option<&str>,
    doc: Option<&str>,
    aliases: &[String],
) -> Map<String, Value> {
    let mut attrs = Map::new();
    attrs.insert("type".to_string(), json!(kind));
    attrs.insert("name".to_string(), json!(name));
    if let Some(namespace) = namespace {
        attrs.insert("namespace".to_string(), json!(namespace));
    }
    if let Some(doc) = doc {
        attrs.insert("doc".to_string(), json!(doc));
    }
    if !aliases.is_empty() {
        attrs.insert("aliases".to_string(), json!(aliases));
    }
    attrs
}

fn qualified(namespace: &Option<String>, name: &str) -> String {
    match namespace {
        Some(ns) => format!("{ns}.{name}"),
        None => name.to_string(),
    }
}

/// A record schema: named fields in declaration order
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSchema {
    /// Record name
    pub name: String,
    /// Fields in declaration order
    pub fields: Vec<FieldSchema>,
    /// Optional namespace
    pub namespace: Option<String>,
    /// Optional documentation
    pub doc: Option<String>,
    /// Alternative names
    pub aliases: Vec<String>,
}

impl RecordSchema {
    pub fn new(name: impl Into<String>, fields: Vec<FieldSchema>) -> Self {
        Self {
            name: name.into(),
            fields,
            namespace: None,
            doc: None,
            aliases: Vec::new(),
        }
    }

    /// Namespace-qualified name
    pub fn fullname(&self) -> String {
        qualified(&self.namespace, &self.name)
    }

    pub fn to_json_value(&self) -> Value {
        let mut attrs = named_header(
            "record",
            &self.name,
            self.namespace.as_deref(),
            self.doc.as_deref(),
            &self.aliases,
        );
        let fields = self.fields.iter().map(FieldSchema::to_json_value).collect();
        attrs.insert("fields".to_string(), Value::Array(fields));
        Value::Object(attrs)
    }
}

/// One field of a record
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSchema {
    /// Field name
    pub name: String,
    /// Schema of the field's value
    pub schema: AvroSchema,
    /// Default in the document encoding, when the field carries one
    pub default: Option<Value>,
    /// Contribution to record comparison
    pub order: FieldOrder,
    /// Optional documentation
    pub doc: Option<String>,
    /// Alternative names
    pub aliases: Vec<String>,
}

impl FieldSchema {
    pub fn new(name: impl Into<String>, schema: AvroSchema) -> Self {
        Self {
            name: name.into(),
            schema,
            default: None,
            order: FieldOrder::Ascending,
            doc: None,
            aliases: Vec::new(),
        }
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn to_json_value(&self) -> Value {
        let mut attrs = Map::new();
        attrs.insert("name".to_string(), json!(&self.name));
        attrs.insert("type".to_string(), self.schema.to_json_value());
        // A null default is still a default; only its absence omits the key
        if let Some(default) = &self.default {
            attrs.insert("default".to_string(), default.clone());
        }
        if let Some(doc) = &self.doc {
            attrs.insert("doc".to_string(), json!(doc));
        }
        if let Some(token) = self.order.token() {
            attrs.insert("order".to_string(), json!(token));
        }
        if !self.aliases.is_empty() {
            attrs.insert("aliases".to_string(), json!(&self.aliases));
        }
        Value::Object(attrs)
    }
}

/// Sort order a field contributes to record comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldOrder {
    #[default]
    Ascending,
    Descending,
    Ignore,
}

impl FieldOrder {
    /// Document token, or `None` for the ascending default
    fn token(self) -> Option<&'static str> {
        match self {
            FieldOrder::Ascending => None,
            FieldOrder::Descending => Some("descending"),
            FieldOrder::Ignore => Some("ignore"),
        }
    }

    /// Unknown tokens fall back to ascending
    pub(crate) fn from_token(token: &str) -> Self {
        match token {
            "descending" => FieldOrder::Descending,
            "ignore" => FieldOrder::Ignore,
            _ => FieldOrder::Ascending,
        }
    }
}

/// An enum schema: named closed symbol set
#[derive(Debug, Clone, PartialEq)]
pub struct EnumSchema {
    /// Enum name
    pub name: String,
    /// Symbols in declaration order
    pub symbols: Vec<String>,
    /// Optional namespace
    pub namespace: Option<String>,
    /// Optional documentation
    pub doc: Option<String>,
    /// Alternative names
    pub aliases: Vec<String>,
    /// Reader fallback symbol for schema evolution
    pub default: Option<String>,
}

impl EnumSchema {
    pub fn new(name: impl Into<String>, symbols: Vec<String>) -> Self {
        Self {
            name: name.into(),
            symbols,
            namespace: None,
            doc: None,
            aliases: Vec::new(),
            default: None,
        }
    }

    /// Namespace-qualified name
    pub fn fullname(&self) -> String {
        qualified(&self.namespace, &self.name)
    }

    /// Position of a symbol in declaration order
    pub fn symbol_index(&self, symbol: &str) -> Option<usize> {
        self.symbols.iter().position(|s| s == symbol)
    }

    pub fn to_json_value(&self) -> Value {
        let mut attrs = named_header(
            "enum",
            &self.name,
            self.namespace.as_deref(),
            self.doc.as_deref(),
            &self.aliases,
        );
        attrs.insert("symbols".to_string(), json!(&self.symbols));
        if let Some(default) = &self.default {
            attrs.insert("default".to_string(), json!(default));
        }
        Value::Object(attrs)
    }
}

/// A fixed schema: named byte sequence of exact size
#[derive(Debug, Clone, PartialEq)]
pub struct FixedSchema {
    /// Fixed name
    pub name: String,
    /// Size in bytes
    pub size: usize,
    /// Optional namespace
    pub namespace: Option<String>,
    /// Optional documentation
    pub doc: Option<String>,
    /// Alternative names
    pub aliases: Vec<String>,
}

impl FixedSchema {
    pub fn new(name: impl Into<String>, size: usize) -> Self {
        Self {
            name: name.into(),
            size,
            namespace: None,
            doc: None,
            aliases: Vec::new(),
        }
    }

    /// Namespace-qualified name
    pub fn fullname(&self) -> String {
        qualified(&self.namespace, &self.name)
    }

    fn render(&self) -> Map<String, Value> {
        let mut attrs = named_header(
            "fixed",
            &self.name,
            self.namespace.as_deref(),
            self.doc.as_deref(),
            &self.aliases,
        );
        attrs.insert("size".to_string(), json!(self.size));
        attrs
    }

    pub fn to_json_value(&self) -> Value {
        Value::Object(self.render())
    }
}

/// A logical annotation over its base schema
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalType {
    /// The annotated base schema
    pub base: Box<AvroSchema>,
    /// The annotation and its parameters
    pub logical_type: LogicalTypeName,
}

impl LogicalType {
    pub fn new(base: AvroSchema, logical_type: LogicalTypeName) -> Self {
        Self {
            base: Box::new(base),
            logical_type,
        }
    }

    /// Render as the base schema's object form with the annotation added.
    /// A fixed base keeps its name and size; every other base renders as
    /// `{"type": <base>}`.
    pub fn to_json_value(&self) -> Value {
        let mut attrs = match self.base.as_ref() {
            AvroSchema::Fixed(fixed) => fixed.render(),
            base => {
                let mut attrs = Map::new();
                attrs.insert("type".to_string(), base.to_json_value());
                attrs
            }
        };
        attrs.insert("logicalType".to_string(), json!(self.logical_type.name()));
        if let LogicalTypeName::Decimal { precision, scale } = &self.logical_type {
            attrs.insert("precision".to_string(), json!(precision));
            attrs.insert("scale".to_string(), json!(scale));
        }
        Value::Object(attrs)
    }
}

/// Logical annotations the engine maps declared types onto
#[derive(Debug, Clone, PartialEq)]
pub enum LogicalTypeName {
    /// Scaled two's-complement decimal
    Decimal { precision: u32, scale: u32 },
    /// UUID over string
    Uuid,
    /// Days since the Unix epoch over int
    Date,
    /// Milliseconds from midnight over int
    TimeMillis,
    /// Microseconds from midnight over long
    TimeMicros,
    /// Milliseconds since the Unix epoch over long
    TimestampMillis,
    /// Microseconds since the Unix epoch over long
    TimestampMicros,
}

impl LogicalTypeName {
    /// The annotation name as it appears in documents
    pub fn name(&self) -> &'static str {
        match self {
            LogicalTypeName::Decimal { .. } => "decimal",
            LogicalTypeName::Uuid => "uuid",
            LogicalTypeName::Date => "date",
            LogicalTypeName::TimeMillis => "time-millis",
            LogicalTypeName::TimeMicros => "time-micros",
            LogicalTypeName::TimestampMillis => "timestamp-millis",
            LogicalTypeName::TimestampMicros => "timestamp-micros",
        }
    }
}

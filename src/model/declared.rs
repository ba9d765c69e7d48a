//! Declared attribute types
//!
//! The type language a model is written in. Each attribute carries one
//! `DeclaredType`; the resolver maps it to a field node and from there to an
//! Avro schema fragment.

use std::fmt;

use crate::model::Model;

/// A type as declared on a model attribute
#[derive(Debug, Clone, PartialEq)]
pub enum DeclaredType {
    /// Avro null
    Null,
    /// Avro boolean
    Bool,
    /// 32-bit signed integer (Avro int)
    Int32,
    /// 64-bit signed integer (Avro long)
    Int64,
    /// 32-bit float (Avro float)
    Float32,
    /// 64-bit float (Avro double)
    Float64,
    /// Byte sequence (Avro bytes)
    Bytes,
    /// UTF-8 string (Avro string)
    Str,
    /// Calendar date (Avro int + date logical type)
    Date,
    /// Time of day, millisecond precision (Avro int + time-millis)
    Time,
    /// Time of day, microsecond precision (Avro long + time-micros)
    TimeMicros,
    /// Instant, millisecond precision (Avro long + timestamp-millis)
    Datetime,
    /// Instant, microsecond precision (Avro long + timestamp-micros)
    DatetimeMicros,
    /// UUID (Avro string + uuid logical type)
    Uuid,
    /// Arbitrary-precision decimal; `size` selects a fixed base over bytes
    Decimal {
        precision: u32,
        scale: u32,
        size: Option<usize>,
    },
    /// Fixed-length byte sequence (Avro fixed)
    Fixed { name: Option<String>, size: usize },
    /// Nullable shorthand for a two-branch union with null
    Optional(Box<DeclaredType>),
    /// Union of alternatives in declaration order
    Union(Vec<DeclaredType>),
    /// Ordered homogeneous sequence (Avro array)
    List(Box<DeclaredType>),
    /// Fixed-arity heterogeneous sequence, cast back on decode
    Tuple(Vec<DeclaredType>),
    /// Key/value mapping; Avro requires string keys
    Map(Box<DeclaredType>, Box<DeclaredType>),
    /// Closed symbol set (Avro enum)
    Enum(EnumType),
    /// Nested model (Avro record)
    Model(Box<Model>),
    /// Reference to a named record; matches an enclosing model for
    /// self-referential schemas
    Reference(String),
}

impl DeclaredType {
    /// Nullable wrapper around an inner type
    pub fn optional(inner: DeclaredType) -> Self {
        DeclaredType::Optional(Box::new(inner))
    }

    /// Homogeneous list of an element type
    pub fn list(element: DeclaredType) -> Self {
        DeclaredType::List(Box::new(element))
    }

    /// String-keyed map over a value type
    pub fn map(value: DeclaredType) -> Self {
        DeclaredType::Map(Box::new(DeclaredType::Str), Box::new(value))
    }

    /// Map with an explicit key type (rejected at resolution unless string)
    pub fn map_with_key(key: DeclaredType, value: DeclaredType) -> Self {
        DeclaredType::Map(Box::new(key), Box::new(value))
    }

    /// Decimal with constrained precision and scale, encoded over bytes
    pub fn decimal(precision: u32, scale: u32) -> Self {
        DeclaredType::Decimal {
            precision,
            scale,
            size: None,
        }
    }

    /// Decimal encoded over a fixed of the given size
    pub fn decimal_fixed(precision: u32, scale: u32, size: usize) -> Self {
        DeclaredType::Decimal {
            precision,
            scale,
            size: Some(size),
        }
    }

    /// Anonymous fixed of the given size (named after the field at render)
    pub fn fixed(size: usize) -> Self {
        DeclaredType::Fixed { name: None, size }
    }

    /// Named fixed of the given size
    pub fn named_fixed(name: impl Into<String>, size: usize) -> Self {
        DeclaredType::Fixed {
            name: Some(name.into()),
            size,
        }
    }

    /// Nested record type
    pub fn model(model: Model) -> Self {
        DeclaredType::Model(Box::new(model))
    }

    /// Named reference, resolved against the enclosing record stack
    pub fn reference(name: impl Into<String>) -> Self {
        DeclaredType::Reference(name.into())
    }

    /// Whether this is the null type
    pub fn is_null(&self) -> bool {
        matches!(self, DeclaredType::Null)
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclaredType::Null => write!(f, "null"),
            DeclaredType::Bool => write!(f, "bool"),
            DeclaredType::Int32 => write!(f, "int32"),
            DeclaredType::Int64 => write!(f, "int64"),
            DeclaredType::Float32 => write!(f, "float32"),
            DeclaredType::Float64 => write!(f, "float64"),
            DeclaredType::Bytes => write!(f, "bytes"),
            DeclaredType::Str => write!(f, "string"),
            DeclaredType::Date => write!(f, "date"),
            DeclaredType::Time => write!(f, "time-millis"),
            DeclaredType::TimeMicros => write!(f, "time-micros"),
            DeclaredType::Datetime => write!(f, "timestamp-millis"),
            DeclaredType::DatetimeMicros => write!(f, "timestamp-micros"),
            DeclaredType::Uuid => write!(f, "uuid"),
            DeclaredType::Decimal {
                precision, scale, ..
            } => write!(f, "decimal({precision}, {scale})"),
            DeclaredType::Fixed { name, size } => match name {
                Some(name) => write!(f, "fixed {name}({size})"),
                None => write!(f, "fixed({size})"),
            },
            DeclaredType::Optional(inner) => write!(f, "optional<{inner}>"),
            DeclaredType::Union(members) => {
                write!(f, "union<")?;
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{member}")?;
                }
                write!(f, ">")
            }
            DeclaredType::List(element) => write!(f, "list<{element}>"),
            DeclaredType::Tuple(members) => {
                write!(f, "tuple<")?;
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{member}")?;
                }
                write!(f, ">")
            }
            DeclaredType::Map(key, value) => write!(f, "map<{key}, {value}>"),
            DeclaredType::Enum(e) => write!(f, "enum {}", e.name),
            DeclaredType::Model(m) => write!(f, "record {}", m.name),
            DeclaredType::Reference(name) => write!(f, "reference {name}"),
        }
    }
}

/// A declared enum: closed symbol set with record-style metadata
#[derive(Debug, Clone, PartialEq)]
pub struct EnumType {
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
    /// Default symbol for schema evolution
    pub default: Option<String>,
}

impl EnumType {
    /// Create an enum type with a name and symbols
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

    /// Set the namespace
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Set the documentation string
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Set the default symbol
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_compact_names() {
        assert_eq!(DeclaredType::Int32.to_string(), "int32");
        assert_eq!(
            DeclaredType::optional(DeclaredType::Str).to_string(),
            "optional<string>"
        );
        assert_eq!(
            DeclaredType::map(DeclaredType::Int64).to_string(),
            "map<string, int64>"
        );
        assert_eq!(DeclaredType::decimal(10, 2).to_string(), "decimal(10, 2)");
        assert_eq!(
            DeclaredType::Tuple(vec![DeclaredType::Str, DeclaredType::Int32]).to_string(),
            "tuple<string, int32>"
        );
    }

    #[test]
    fn test_constructors() {
        match DeclaredType::decimal_fixed(8, 3, 16) {
            DeclaredType::Decimal {
                precision,
                scale,
                size,
            } => {
                assert_eq!(precision, 8);
                assert_eq!(scale, 3);
                assert_eq!(size, Some(16));
            }
            other => panic!("Expected decimal, got {other:?}"),
        }
        assert!(DeclaredType::Null.is_null());
        assert!(!DeclaredType::Str.is_null());
    }
}

//! Type descriptor resolution.
//!
//! Maps declared attribute types to field nodes through an ordered rule
//! table. Union handling runs first so nullable wrappers flatten before
//! anything else; named references are matched against the stack of
//! enclosing records so self-referential models terminate; everything
//! metadata-carrying validates its parameters before a node is produced.

use std::collections::HashSet;

use crate::error::SchemaError;
use crate::model::{Attribute, DeclaredType, Model, Value};
use crate::schema::node::{
    FieldDef, FieldNode, FixedSpec, LogicalKind, LogicalNode, RecordNode, TupleNode, UnionNode,
};
use crate::schema::types::{AvroSchema, EnumSchema};

/// Resolve a model declaration into its record node
pub fn resolve_model(model: &Model) -> Result<RecordNode, SchemaError> {
    let mut enclosing = Vec::new();
    resolve_record(model, &mut enclosing)
}

/// One enclosing record on the resolution stack: short name and fullname
type Enclosing = (String, String);

fn resolve_record(
    model: &Model,
    enclosing: &mut Vec<Enclosing>,
) -> Result<RecordNode, SchemaError> {
    let mut seen = HashSet::new();
    for attribute in &model.attributes {
        if !seen.insert(attribute.name.as_str()) {
            return Err(SchemaError::NameCollision {
                owner: model.name.clone(),
                name: attribute.name.clone(),
            });
        }
    }

    enclosing.push((model.name.clone(), model.fullname()));
    let fields: Result<Vec<FieldDef>, SchemaError> = model
        .attributes
        .iter()
        .map(|attribute| resolve_field(attribute, enclosing))
        .collect();
    enclosing.pop();

    Ok(RecordNode {
        name: model.name.clone(),
        namespace: model.meta.namespace.clone(),
        doc: model.meta.doc.clone(),
        aliases: model.meta.aliases.clone(),
        fields: fields?,
    })
}

fn resolve_field(
    attribute: &Attribute,
    enclosing: &mut Vec<Enclosing>,
) -> Result<FieldDef, SchemaError> {
    let node = resolve_type(&attribute.declared, &attribute.name, enclosing)?;

    // A union with a null branch defaults to null; an explicit non-null
    // default would contradict the null-first branch order
    let default = match &attribute.default {
        Some(Value::Null) if node.is_nullable() => Some(Value::Null),
        Some(_) if node.is_nullable() => {
            return Err(SchemaError::InvalidFieldParams {
                field: attribute.name.clone(),
                reason: "a nullable field takes a null default".to_string(),
            })
        }
        Some(other) => Some(other.clone()),
        None if node.is_nullable() => Some(Value::Null),
        None => None,
    };

    if let Some(value) = &default {
        node.default_json(value)
            .map_err(|reason| SchemaError::InvalidFieldParams {
                field: attribute.name.clone(),
                reason,
            })?;
    }

    Ok(FieldDef {
        name: attribute.name.clone(),
        node,
        default,
        doc: attribute.doc.clone(),
        aliases: attribute.aliases.clone(),
    })
}

/// Resolve one declared type. Rules apply in order; the first match wins.
fn resolve_type(
    declared: &DeclaredType,
    field: &str,
    enclosing: &mut Vec<Enclosing>,
) -> Result<FieldNode, SchemaError> {
    match declared {
        // 1. Unions and nullable wrappers
        DeclaredType::Optional(_) | DeclaredType::Union(_) => {
            resolve_union(declared, field, enclosing)
        }

        // 2. Named references against the enclosing stack
        DeclaredType::Reference(name) => {
            match enclosing.iter().find(|(n, f)| n == name || f == name) {
                Some((_, fullname)) => Ok(FieldNode::SelfReference(fullname.clone())),
                None => Err(SchemaError::UnsupportedType(format!(
                    "reference to undeclared record '{name}'"
                ))),
            }
        }

        // 3. Nested models
        DeclaredType::Model(model) => Ok(FieldNode::Record(resolve_record(model, enclosing)?)),

        // 4. Enums
        DeclaredType::Enum(e) => {
            if e.symbols.is_empty() {
                return Err(SchemaError::InvalidFieldParams {
                    field: field.to_string(),
                    reason: format!("enum '{}' declares no symbols", e.name),
                });
            }
            if let Some(default) = &e.default {
                if !e.symbols.iter().any(|s| s == default) {
                    return Err(SchemaError::InvalidFieldParams {
                        field: field.to_string(),
                        reason: format!(
                            "enum '{}' default '{}' is not one of its symbols",
                            e.name, default
                        ),
                    });
                }
            }
            Ok(FieldNode::Enum(EnumSchema {
                name: e.name.clone(),
                namespace: e.namespace.clone(),
                symbols: e.symbols.clone(),
                doc: e.doc.clone(),
                aliases: e.aliases.clone(),
                default: e.default.clone(),
            }))
        }

        // 5. Sequences
        DeclaredType::List(element) => Ok(FieldNode::Array(Box::new(resolve_type(
            element, field, enclosing,
        )?))),
        DeclaredType::Tuple(members) => {
            if members.is_empty() {
                return Err(SchemaError::InvalidFieldParams {
                    field: field.to_string(),
                    reason: "tuple declares no members".to_string(),
                });
            }
            let member_nodes: Vec<FieldNode> = members
                .iter()
                .map(|member| resolve_type(member, field, enclosing))
                .collect::<Result<_, _>>()?;
            let item = union_of(members, field, enclosing)?;
            Ok(FieldNode::Tuple(TupleNode {
                item: Box::new(item),
                members: member_nodes,
            }))
        }

        // 6. Maps
        DeclaredType::Map(key, value) => {
            if !matches!(key.as_ref(), DeclaredType::Str) {
                return Err(SchemaError::UnsupportedType(format!(
                    "map key type '{key}' (Avro maps take string keys)"
                )));
            }
            Ok(FieldNode::Map(Box::new(resolve_type(
                value, field, enclosing,
            )?)))
        }

        // 7. Metadata-carrying types
        DeclaredType::Decimal {
            precision,
            scale,
            size,
        } => {
            if *precision == 0 {
                return Err(SchemaError::InvalidFieldParams {
                    field: field.to_string(),
                    reason: "decimal precision must be at least 1".to_string(),
                });
            }
            if scale > precision {
                return Err(SchemaError::InvalidFieldParams {
                    field: field.to_string(),
                    reason: format!("decimal scale {scale} exceeds precision {precision}"),
                });
            }
            let fixed = match size {
                Some(size) => {
                    if *size == 0 {
                        return Err(SchemaError::InvalidFieldParams {
                            field: field.to_string(),
                            reason: "fixed size must be at least 1".to_string(),
                        });
                    }
                    let max_precision = max_precision_for_fixed(*size);
                    if u64::from(*precision) > max_precision {
                        return Err(SchemaError::InvalidFieldParams {
                            field: field.to_string(),
                            reason: format!(
                                "fixed size {size} holds at most {max_precision} decimal digits, \
                                 precision {precision} declared"
                            ),
                        });
                    }
                    Some(FixedSpec {
                        name: field.to_string(),
                        size: *size,
                    })
                }
                None => None,
            };
            Ok(FieldNode::Logical(LogicalNode {
                kind: LogicalKind::Decimal {
                    precision: *precision,
                    scale: *scale,
                    fixed,
                },
            }))
        }
        DeclaredType::Fixed { name, size } => {
            if *size == 0 {
                return Err(SchemaError::InvalidFieldParams {
                    field: field.to_string(),
                    reason: "fixed size must be at least 1".to_string(),
                });
            }
            Ok(FieldNode::Logical(LogicalNode {
                kind: LogicalKind::Fixed(FixedSpec {
                    name: name.clone().unwrap_or_else(|| field.to_string()),
                    size: *size,
                }),
            }))
        }
        DeclaredType::Date => Ok(logical(LogicalKind::Date)),
        DeclaredType::Time => Ok(logical(LogicalKind::TimeMillis)),
        DeclaredType::TimeMicros => Ok(logical(LogicalKind::TimeMicros)),
        DeclaredType::Datetime => Ok(logical(LogicalKind::TimestampMillis)),
        DeclaredType::DatetimeMicros => Ok(logical(LogicalKind::TimestampMicros)),
        DeclaredType::Uuid => Ok(logical(LogicalKind::Uuid)),

        // 8. Primitives
        DeclaredType::Null => Ok(FieldNode::Immutable(AvroSchema::Null)),
        DeclaredType::Bool => Ok(FieldNode::Immutable(AvroSchema::Boolean)),
        DeclaredType::Int32 => Ok(FieldNode::Immutable(AvroSchema::Int)),
        DeclaredType::Int64 => Ok(FieldNode::Immutable(AvroSchema::Long)),
        DeclaredType::Float32 => Ok(FieldNode::Immutable(AvroSchema::Float)),
        DeclaredType::Float64 => Ok(FieldNode::Immutable(AvroSchema::Double)),
        DeclaredType::Bytes => Ok(FieldNode::Immutable(AvroSchema::Bytes)),
        DeclaredType::Str => Ok(FieldNode::Immutable(AvroSchema::String)),
    }
}

fn logical(kind: LogicalKind) -> FieldNode {
    FieldNode::Logical(LogicalNode { kind })
}

/// Resolve a union-shaped declaration: flatten nested unions and nullable
/// wrappers, move null to the front, drop duplicate members, and collapse a
/// single remaining member to its bare node
fn resolve_union(
    declared: &DeclaredType,
    field: &str,
    enclosing: &mut Vec<Enclosing>,
) -> Result<FieldNode, SchemaError> {
    let members = match declared {
        DeclaredType::Optional(inner) => {
            vec![DeclaredType::Null, inner.as_ref().clone()]
        }
        DeclaredType::Union(members) => members.clone(),
        _ => vec![declared.clone()],
    };
    union_of(&members, field, enclosing)
}

/// Build the union node for a member list (shared by unions and tuples)
fn union_of(
    members: &[DeclaredType],
    field: &str,
    enclosing: &mut Vec<Enclosing>,
) -> Result<FieldNode, SchemaError> {
    let mut flattened = Vec::new();
    flatten_members(members, &mut flattened);

    if flattened.is_empty() {
        return Err(SchemaError::InvalidFieldParams {
            field: field.to_string(),
            reason: "union declares no members".to_string(),
        });
    }

    // Null first, then the non-null members in declaration order
    let has_null = flattened.iter().any(|m| m.is_null());
    let mut ordered = Vec::with_capacity(flattened.len());
    if has_null {
        ordered.push(DeclaredType::Null);
    }
    for member in flattened {
        if !member.is_null() && !ordered.contains(&member) {
            ordered.push(member);
        }
    }

    if ordered.len() == 1 {
        return resolve_type(&ordered[0], field, enclosing);
    }

    let variants: Vec<FieldNode> = ordered
        .iter()
        .map(|member| resolve_type(member, field, enclosing))
        .collect::<Result<_, _>>()?;
    Ok(FieldNode::Union(UnionNode { variants }))
}

fn flatten_members(members: &[DeclaredType], out: &mut Vec<DeclaredType>) {
    for member in members {
        match member {
            DeclaredType::Optional(inner) => {
                out.push(DeclaredType::Null);
                flatten_members(std::slice::from_ref(inner.as_ref()), out);
            }
            DeclaredType::Union(nested) => flatten_members(nested, out),
            other => out.push(other.clone()),
        }
    }
}

/// Largest decimal precision a two's-complement fixed of `size` bytes holds
fn max_precision_for_fixed(size: usize) -> u64 {
    let bits = (8 * size).saturating_sub(1) as f64;
    (bits * std::f64::consts::LOG10_2).floor() as u64
}

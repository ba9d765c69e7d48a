//! Schema mapping and generation.
//!
//! This module holds the full schema side of the engine: the typed Avro
//! schema representation, the resolver that maps declared model types onto
//! field nodes, case transformation over rendered documents, the JSON
//! schema parser, and the generation pipeline that ties them together.

pub mod case;
pub mod generator;
mod node;
mod parser;
mod resolver;
mod types;

pub use case::{apply_case, apply_case_token, CaseStyle, CASE_TOKENS};
pub use generator::{generate, GeneratedSchema};
pub use node::{
    FieldDef, FieldNode, FixedSpec, LogicalKind, LogicalNode, NodeRegistry, RecordNode, TupleNode,
    UnionNode,
};
pub use parser::{parse_schema, parse_schema_with_options, SchemaParser};
pub use resolver::resolve_model;
pub use types::*;

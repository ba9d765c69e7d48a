//! Schema generation pipeline.
//!
//! Turns a declared model into everything the engine needs at runtime: the
//! resolved field-node tree, the rendered JSON document (with the optional
//! case transformation applied), the typed schema re-parsed from that
//! document, and the codec schema the Avro library encodes against.
//!
//! The re-parse is deliberate. A case style can produce names the Avro
//! grammar rejects, or fold two field names together; parsing the document
//! back in strict mode surfaces those as typed errors at generation time
//! instead of as encode failures later.

use serde_json::Value as JsonValue;
use tracing::debug;

use crate::error::SchemaError;
use crate::model::Model;
use crate::schema::case::{apply_case, check_field_collisions, CaseStyle};
use crate::schema::node::RecordNode;
use crate::schema::parser::SchemaParser;
use crate::schema::resolver::resolve_model;
use crate::schema::AvroSchema;

/// Everything derived from one model declaration.
///
/// Built once per model and treated as read-only afterwards; the engine
/// clones none of it on the hot path.
#[derive(Debug, Clone)]
pub struct GeneratedSchema {
    root: RecordNode,
    document: JsonValue,
    schema: AvroSchema,
    writer: apache_avro::Schema,
}

impl GeneratedSchema {
    /// The resolved field-node tree, keyed by declared attribute names
    pub fn root(&self) -> &RecordNode {
        &self.root
    }

    /// The rendered JSON document, case transformation included
    pub fn document(&self) -> &JsonValue {
        &self.document
    }

    /// The typed schema re-parsed from the document
    pub fn schema(&self) -> &AvroSchema {
        &self.schema
    }

    /// The schema the Avro codec encodes and decodes against
    pub fn writer(&self) -> &apache_avro::Schema {
        &self.writer
    }
}

/// Generate the schema artifacts for a model.
///
/// Resolution maps each declared attribute onto a field node, the node tree
/// renders to a JSON document, the optional case style rewrites its names,
/// and the document is parsed back both by the strict schema parser and by
/// the codec. Any rejection at either stage is a schema error.
pub fn generate(model: &Model, case: Option<CaseStyle>) -> Result<GeneratedSchema, SchemaError> {
    let root = resolve_model(model)?;
    let rendered = AvroSchema::Record(root.to_record_schema());

    let mut document = rendered.to_json_value();
    if let Some(style) = case {
        document = apply_case(&document, style);
        check_field_collisions(&document)?;
    }

    debug!(
        model = %root.fullname(),
        case = case.map(|style| style.token()).unwrap_or("none"),
        "generated schema document"
    );

    let mut parser = SchemaParser::new_strict();
    let schema = parser.parse(&document)?;

    let writer = apache_avro::Schema::parse(&document)
        .map_err(|e| SchemaError::InvalidSchema(format!("codec rejected document: {e}")))?;

    Ok(GeneratedSchema {
        root,
        document,
        schema,
        writer,
    })
}

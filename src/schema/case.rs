//! Case transformation over schema documents.
//!
//! A pure rewriter of `name` keys in a generated document. Record and field
//! names take the configured style; enum definitions are returned unmodified
//! since their symbols are data, not identifiers. Nested mappings are only
//! entered when they carry a `name` key themselves or appear as list
//! elements, so anonymous wrapper objects block the descent.

use std::collections::HashSet;

use convert_case::{Case, Casing};
use serde_json::{Map, Value as JsonValue};

use crate::error::{CaseError, SchemaError};

/// The closed set of supported case-style tokens
pub const CASE_TOKENS: [&str; 12] = [
    "camelcase",
    "capitalcase",
    "constcase",
    "lowercase",
    "pascalcase",
    "pathcase",
    "snakecase",
    "spinalcase",
    "upperkebabcase",
    "trimcase",
    "uppercase",
    "alphanumcase",
];

/// A naming convention applied to schema identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseStyle {
    /// lowerCamelCase
    Camel,
    /// First character uppercased, rest unchanged
    Capital,
    /// UPPER_SNAKE_CASE
    Const,
    /// All lowercase, separators kept
    Lower,
    /// UpperCamelCase
    Pascal,
    /// slash/separated/words
    Path,
    /// lower_snake_case
    Snake,
    /// kebab-case
    Spinal,
    /// UPPER-KEBAB-CASE
    UpperKebab,
    /// Whitespace stripped, no case change
    Trim,
    /// All uppercase, separators kept
    Upper,
    /// Alphanumeric characters only
    Alphanum,
}

impl CaseStyle {
    /// Parse a user-facing token; tokens match case-insensitively
    pub fn from_token(token: &str) -> Result<CaseStyle, CaseError> {
        match token.to_lowercase().as_str() {
            "camelcase" => Ok(CaseStyle::Camel),
            "capitalcase" => Ok(CaseStyle::Capital),
            "constcase" => Ok(CaseStyle::Const),
            "lowercase" => Ok(CaseStyle::Lower),
            "pascalcase" => Ok(CaseStyle::Pascal),
            "pathcase" => Ok(CaseStyle::Path),
            "snakecase" => Ok(CaseStyle::Snake),
            "spinalcase" => Ok(CaseStyle::Spinal),
            "upperkebabcase" => Ok(CaseStyle::UpperKebab),
            "trimcase" => Ok(CaseStyle::Trim),
            "uppercase" => Ok(CaseStyle::Upper),
            "alphanumcase" => Ok(CaseStyle::Alphanum),
            _ => Err(CaseError::UnsupportedCase(token.to_string())),
        }
    }

    /// Canonical token for this style
    pub fn token(&self) -> &'static str {
        match self {
            CaseStyle::Camel => "camelcase",
            CaseStyle::Capital => "capitalcase",
            CaseStyle::Const => "constcase",
            CaseStyle::Lower => "lowercase",
            CaseStyle::Pascal => "pascalcase",
            CaseStyle::Path => "pathcase",
            CaseStyle::Snake => "snakecase",
            CaseStyle::Spinal => "spinalcase",
            CaseStyle::UpperKebab => "upperkebabcase",
            CaseStyle::Trim => "trimcase",
            CaseStyle::Upper => "uppercase",
            CaseStyle::Alphanum => "alphanumcase",
        }
    }

    /// Apply the style to one identifier
    pub fn apply(&self, value: &str) -> String {
        match self {
            CaseStyle::Camel => value.to_case(Case::Camel),
            CaseStyle::Capital => {
                let mut chars = value.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
            CaseStyle::Const => value.to_case(Case::UpperSnake),
            CaseStyle::Lower => value.to_lowercase(),
            CaseStyle::Pascal => value.to_case(Case::UpperCamel),
            CaseStyle::Path => value.to_case(Case::Snake).replace('_', "/"),
            CaseStyle::Snake => value.to_case(Case::Snake),
            CaseStyle::Spinal => value.to_case(Case::Kebab),
            CaseStyle::UpperKebab => value.to_case(Case::Kebab).to_uppercase(),
            CaseStyle::Trim => value.trim().to_string(),
            CaseStyle::Upper => value.to_uppercase(),
            CaseStyle::Alphanum => value.chars().filter(|c| c.is_alphanumeric()).collect(),
        }
    }
}

/// Rewrite every `name` key in a schema document with the given style
pub fn apply_case(document: &JsonValue, style: CaseStyle) -> JsonValue {
    match document {
        JsonValue::Object(map) => case_record(map, style),
        other => other.clone(),
    }
}

/// Parse the token, then rewrite
pub fn apply_case_token(document: &JsonValue, token: &str) -> Result<JsonValue, CaseError> {
    let style = CaseStyle::from_token(token)?;
    Ok(apply_case(document, style))
}

fn case_record(map: &Map<String, JsonValue>, style: CaseStyle) -> JsonValue {
    // Enum definitions are exempt in full: name, aliases, and symbols
    if map.get("type").and_then(|t| t.as_str()) == Some("enum") {
        return JsonValue::Object(map.clone());
    }

    let mut out = Map::new();
    for (key, value) in map {
        let transformed = if key == "name" {
            match value.as_str() {
                Some(name) => JsonValue::String(style.apply(name)),
                None => value.clone(),
            }
        } else {
            match value {
                JsonValue::Object(obj) if obj.contains_key("name") => case_record(obj, style),
                JsonValue::Array(items) => JsonValue::Array(
                    items
                        .iter()
                        .map(|element| match element {
                            JsonValue::Object(obj) => case_record(obj, style),
                            other => other.clone(),
                        })
                        .collect(),
                ),
                other => other.clone(),
            }
        };
        out.insert(key.clone(), transformed);
    }
    JsonValue::Object(out)
}

/// Verify that no record in the document carries two fields with the same
/// name. Case transformation can fold distinct declared names together.
pub(crate) fn check_field_collisions(document: &JsonValue) -> Result<(), SchemaError> {
    match document {
        JsonValue::Object(map) => {
            if let Some(JsonValue::Array(fields)) = map.get("fields") {
                let owner = map
                    .get("name")
                    .and_then(|n| n.as_str())
                    .unwrap_or("<record>")
                    .to_string();
                let mut seen = HashSet::new();
                for field in fields {
                    if let Some(name) = field.get("name").and_then(|n| n.as_str()) {
                        if !seen.insert(name.to_string()) {
                            return Err(SchemaError::NameCollision {
                                owner,
                                name: name.to_string(),
                            });
                        }
                    }
                }
            }
            for value in map.values() {
                check_field_collisions(value)?;
            }
            Ok(())
        }
        JsonValue::Array(items) => {
            for item in items {
                check_field_collisions(item)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_styles_on_identifier() {
        let cases = [
            (CaseStyle::Camel, "fullName"),
            (CaseStyle::Capital, "FullName"),
            (CaseStyle::Const, "FULL_NAME"),
            (CaseStyle::Lower, "fullname"),
            (CaseStyle::Pascal, "FullName"),
            (CaseStyle::Path, "full/name"),
            (CaseStyle::Snake, "full_name"),
            (CaseStyle::Spinal, "full-name"),
            (CaseStyle::UpperKebab, "FULL-NAME"),
            (CaseStyle::Trim, "fullName"),
            (CaseStyle::Upper, "FULLNAME"),
            (CaseStyle::Alphanum, "fullName"),
        ];
        for (style, expected) in cases {
            assert_eq!(style.apply("fullName"), expected, "style {:?}", style);
        }
        assert_eq!(CaseStyle::Trim.apply("  padded  "), "padded");
        assert_eq!(CaseStyle::Alphanum.apply("full_name 2"), "fullname2");
    }

    #[test]
    fn test_token_parse_is_case_insensitive() {
        assert_eq!(
            CaseStyle::from_token("SnakeCase").unwrap(),
            CaseStyle::Snake
        );
        match CaseStyle::from_token("SCREAMING") {
            Err(CaseError::UnsupportedCase(token)) => {
                assert_eq!(token, "SCREAMING");
                let message = CaseError::UnsupportedCase(token).to_string();
                for valid in CASE_TOKENS {
                    assert!(message.contains(valid), "message misses '{valid}'");
                }
            }
            other => panic!("Expected unsupported case, got {other:?}"),
        }
    }

    #[test]
    fn test_apply_case_renames_records_and_fields() {
        let document = json!({
            "type": "record",
            "name": "PersonRecord",
            "fields": [
                {"name": "fullName", "type": "string"},
                {"name": "homeAddress", "type": {
                    "type": "record",
                    "name": "AddressRecord",
                    "fields": [{"name": "zipCode", "type": "string"}]
                }}
            ]
        });
        let transformed = apply_case(&document, CaseStyle::Snake);
        assert_eq!(transformed["name"], "person_record");
        assert_eq!(transformed["fields"][0]["name"], "full_name");
        assert_eq!(transformed["fields"][1]["name"], "home_address");
        assert_eq!(transformed["fields"][1]["type"]["name"], "address_record");
        assert_eq!(
            transformed["fields"][1]["type"]["fields"][0]["name"],
            "zip_code"
        );
    }

    #[test]
    fn test_enum_definitions_are_exempt() {
        let document = json!({
            "type": "record",
            "name": "OrderRecord",
            "fields": [
                {"name": "orderStatus", "type": {
                    "type": "enum",
                    "name": "OrderStatus",
                    "symbols": ["placedNow", "IN_FLIGHT", "Delivered"]
                }}
            ]
        });
        let transformed = apply_case(&document, CaseStyle::Snake);
        // The field key is transformed; the enum definition is untouched
        assert_eq!(transformed["fields"][0]["name"], "order_status");
        assert_eq!(transformed["fields"][0]["type"]["name"], "OrderStatus");
        assert_eq!(
            transformed["fields"][0]["type"]["symbols"],
            json!(["placedNow", "IN_FLIGHT", "Delivered"])
        );
    }

    #[test]
    fn test_union_references_stay_untouched() {
        let document = json!({
            "type": "record",
            "name": "Node",
            "fields": [
                {"name": "next", "type": ["null", "Node"], "default": null}
            ]
        });
        let transformed = apply_case(&document, CaseStyle::Const);
        assert_eq!(transformed["name"], "NODE");
        assert_eq!(transformed["fields"][0]["name"], "NEXT");
        // Bare reference strings are list elements, not name keys
        assert_eq!(transformed["fields"][0]["type"], json!(["null", "Node"]));
    }

    #[test]
    fn test_anonymous_wrappers_block_descent() {
        let document = json!({
            "type": "record",
            "name": "Bag",
            "fields": [
                {"name": "items", "type": {
                    "type": "array",
                    "items": {
                        "type": "record",
                        "name": "Item",
                        "fields": [{"name": "itemCode", "type": "string"}]
                    }
                }}
            ]
        });
        let transformed = apply_case(&document, CaseStyle::Snake);
        // The wrapper has no name key, so the record inside is preserved
        assert_eq!(transformed["fields"][0]["type"]["items"]["name"], "Item");
        assert_eq!(
            transformed["fields"][0]["type"]["items"]["fields"][0]["name"],
            "itemCode"
        );
    }

    #[test]
    fn test_idempotence_per_style() {
        let document = json!({
            "type": "record",
            "name": "PersonRecord",
            "fields": [
                {"name": "fullName", "type": "string"},
                {"name": "birthDate", "type": "string"}
            ]
        });
        for token in CASE_TOKENS {
            let style = CaseStyle::from_token(token).unwrap();
            let once = apply_case(&document, style);
            let twice = apply_case(&once, style);
            assert_eq!(once, twice, "style {token} is not idempotent");
        }
    }

    #[test]
    fn test_collision_detection_after_fold() {
        let document = json!({
            "type": "record",
            "name": "T",
            "fields": [
                {"name": "full_name", "type": "string"},
                {"name": "fullName", "type": "string"}
            ]
        });
        let transformed = apply_case(&document, CaseStyle::Snake);
        match check_field_collisions(&transformed) {
            Err(SchemaError::NameCollision { owner, name }) => {
                assert_eq!(owner, "t");
                assert_eq!(name, "full_name");
            }
            other => panic!("Expected name collision, got {other:?}"),
        }
        assert!(check_field_collisions(&document).is_ok());
    }
}

//! Coercion configuration.
//!
//! Decoded data is schema-conformant but loosely typed: temporal values
//! arrive as integers or text, tuples as plain lists, enum symbols as
//! strings. The coercion configuration carries the rules used to
//! reconstruct a typed instance from that data: per-type hooks, cast rules
//! for tuples and enums, and a forward-reference map so self-referential
//! fields resolve without a second model lookup.
//!
//! Type checking is disabled by default: decoded data is trusted to
//! conform to the schema it was decoded against. Callers can opt in to a
//! full validation pass after reconstruction.

pub mod hooks;

use std::collections::HashMap;

use crate::error::{CoerceError, SchemaError};
use crate::model::{Model, Value};
use crate::schema::{resolve_model, RecordNode};

/// A reconstruction hook for one schema position
pub type TypeHook = fn(Value) -> Result<Value, CoerceError>;

/// The positions a hook can attach to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookTarget {
    Datetime,
    Date,
    Time,
    Bytes,
    Uuid,
}

/// Conversions enforced during reconstruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastRule {
    /// Restore fixed-arity sequences decoded as plain lists
    Tuple,
    /// Restore enum symbols decoded as plain strings
    Enum,
}

/// The five hooks, fully populated
#[derive(Debug, Clone, Copy)]
pub struct HookSet {
    datetime: TypeHook,
    date: TypeHook,
    time: TypeHook,
    bytes: TypeHook,
    uuid: TypeHook,
}

impl Default for HookSet {
    fn default() -> Self {
        HookSet {
            datetime: hooks::datetime_hook,
            date: hooks::date_hook,
            time: hooks::time_hook,
            bytes: hooks::bytes_hook,
            uuid: hooks::uuid_hook,
        }
    }
}

impl HookSet {
    /// The hook for one target; always present
    pub fn get(&self, target: HookTarget) -> TypeHook {
        match target {
            HookTarget::Datetime => self.datetime,
            HookTarget::Date => self.date,
            HookTarget::Time => self.time,
            HookTarget::Bytes => self.bytes,
            HookTarget::Uuid => self.uuid,
        }
    }

    fn set(&mut self, target: HookTarget, hook: TypeHook) {
        match target {
            HookTarget::Datetime => self.datetime = hook,
            HookTarget::Date => self.date = hook,
            HookTarget::Time => self.time = hook,
            HookTarget::Bytes => self.bytes = hook,
            HookTarget::Uuid => self.uuid = hook,
        }
    }
}

/// User-supplied adjustments to the per-model defaults.
///
/// Values set here win on key conflicts, except the tuple and enum cast
/// rules which are always appended after the merge.
#[derive(Debug, Clone, Default)]
pub struct CoercionOverrides {
    check_types: Option<bool>,
    casts: Vec<CastRule>,
    forward_references: HashMap<String, Model>,
    hooks: HashMap<HookTarget, TypeHook>,
}

impl CoercionOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the post-reconstruction validation pass
    pub fn with_check_types(mut self, enabled: bool) -> Self {
        self.check_types = Some(enabled);
        self
    }

    /// Add a cast rule
    pub fn with_cast(mut self, rule: CastRule) -> Self {
        if !self.casts.contains(&rule) {
            self.casts.push(rule);
        }
        self
    }

    /// Map a referenced type name to the model that resolves it
    pub fn with_forward_reference<S: Into<String>>(mut self, name: S, model: Model) -> Self {
        self.forward_references.insert(name.into(), model);
        self
    }

    /// Replace the hook for one target
    pub fn with_hook(mut self, target: HookTarget, hook: TypeHook) -> Self {
        self.hooks.insert(target, hook);
        self
    }
}

/// The resolved per-model configuration, read-only once built
#[derive(Debug, Clone)]
pub struct CoercionConfig {
    check_types: bool,
    casts: Vec<CastRule>,
    forward_references: HashMap<String, RecordNode>,
    hooks: HookSet,
}

impl CoercionConfig {
    /// Whether reconstructed instances are validated against their nodes
    pub fn check_types(&self) -> bool {
        self.check_types
    }

    pub fn casts(&self) -> &[CastRule] {
        &self.casts
    }

    pub fn has_cast(&self, rule: CastRule) -> bool {
        self.casts.contains(&rule)
    }

    /// Resolve a referenced type name
    pub fn forward_reference(&self, name: &str) -> Option<&RecordNode> {
        self.forward_references.get(name)
    }

    /// The hook for one target
    pub fn hook(&self, target: HookTarget) -> TypeHook {
        self.hooks.get(target)
    }
}

/// Build the coercion configuration for one resolved model.
///
/// Defaults: type checking off, the five standard hooks, and a
/// forward-reference entry mapping the model's own name (and fullname) to
/// its record node. User overrides merge on top; the tuple and enum casts
/// are appended unconditionally.
pub fn build_config(
    root: &RecordNode,
    overrides: &CoercionOverrides,
) -> Result<CoercionConfig, SchemaError> {
    let mut hooks = HookSet::default();
    for (target, hook) in &overrides.hooks {
        hooks.set(*target, *hook);
    }

    let mut forward_references = HashMap::new();
    forward_references.insert(root.name.clone(), root.clone());
    let fullname = root.fullname();
    if fullname != root.name {
        forward_references.insert(fullname, root.clone());
    }
    for (name, model) in &overrides.forward_references {
        forward_references.insert(name.clone(), resolve_model(model)?);
    }

    let mut casts = overrides.casts.clone();
    for enforced in [CastRule::Tuple, CastRule::Enum] {
        if !casts.contains(&enforced) {
            casts.push(enforced);
        }
    }

    Ok(CoercionConfig {
        check_types: overrides.check_types.unwrap_or(false),
        casts,
        forward_references,
        hooks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Attribute, DeclaredType};

    fn resolved(model: &Model) -> RecordNode {
        resolve_model(model).unwrap()
    }

    fn sample_model() -> Model {
        Model::new("Sample")
            .with_namespace("com.example")
            .with_attribute(Attribute::new("id", DeclaredType::Int64))
    }

    #[test]
    fn test_defaults() {
        let root = resolved(&sample_model());
        let config = build_config(&root, &CoercionOverrides::new()).unwrap();
        assert!(!config.check_types());
        assert!(config.has_cast(CastRule::Tuple));
        assert!(config.has_cast(CastRule::Enum));
        assert!(config.forward_reference("Sample").is_some());
        assert!(config.forward_reference("com.example.Sample").is_some());
        assert!(config.forward_reference("Other").is_none());
    }

    #[test]
    fn test_overrides_win_on_conflict() {
        fn passthrough(value: Value) -> Result<Value, CoerceError> {
            Ok(value)
        }
        let root = resolved(&sample_model());
        let overrides = CoercionOverrides::new()
            .with_check_types(true)
            .with_hook(HookTarget::Datetime, passthrough);
        let config = build_config(&root, &overrides).unwrap();
        assert!(config.check_types());
        // The replaced hook no longer parses; it hands text back untouched
        let hook = config.hook(HookTarget::Datetime);
        match hook(Value::String("not-a-date".to_string())).unwrap() {
            Value::String(text) => assert_eq!(text, "not-a-date"),
            other => panic!("Expected passthrough, got {other:?}"),
        }
        // The other hooks keep their defaults
        let uuid = config.hook(HookTarget::Uuid);
        match uuid(Value::String("zzz".to_string())) {
            Err(CoerceError::InvalidFormat { target, .. }) => assert_eq!(target, "UUID"),
            other => panic!("Expected invalid format, got {other:?}"),
        }
    }

    #[test]
    fn test_enforced_casts_survive_user_casts() {
        let root = resolved(&sample_model());
        let overrides = CoercionOverrides::new().with_cast(CastRule::Enum);
        let config = build_config(&root, &overrides).unwrap();
        assert!(config.has_cast(CastRule::Tuple));
        assert!(config.has_cast(CastRule::Enum));
        assert_eq!(config.casts().len(), 2);
    }

    #[test]
    fn test_user_forward_reference_is_resolved() {
        let other = Model::new("Other")
            .with_attribute(Attribute::new("label", DeclaredType::Str));
        let root = resolved(&sample_model());
        let overrides = CoercionOverrides::new().with_forward_reference("Other", other);
        let config = build_config(&root, &overrides).unwrap();
        let node = config.forward_reference("Other").unwrap();
        assert_eq!(node.name, "Other");
    }

    #[test]
    fn test_bad_forward_reference_model_fails() {
        let bad = Model::new("Bad").with_attribute(Attribute::new(
            "amount",
            DeclaredType::Decimal {
                precision: 0,
                scale: 0,
                size: None,
            },
        ));
        let root = resolved(&sample_model());
        let overrides = CoercionOverrides::new().with_forward_reference("Bad", bad);
        match build_config(&root, &overrides) {
            Err(SchemaError::InvalidFieldParams { field, .. }) => assert_eq!(field, "amount"),
            other => panic!("Expected invalid field params, got {other:?}"),
        }
    }
}

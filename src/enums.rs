//! Enumeration definitions.
//!
//! An enumerable type is emitted once per compilation, in one of two forms:
//!
//! - plain: `{ "enum": ["A", "B"] }` under `enum-<canonical>`
//! - advanced, when any member is documented:
//!   `{ "oneOf": [{ "const": "A", "description": "..." }] }` under
//!   `oneof-enum-<canonical>`

use serde_json::{json, Value};

use crate::compiler::Compilation;
use crate::model::TypeDescriptor;
use crate::types::canonical_key;

/// Definition key for an enumerable type.
pub fn enum_key(ty: &TypeDescriptor) -> String {
    let prefix = if is_advanced(ty) { "oneof-" } else { "" };
    format!("{}enum-{}", prefix, canonical_key(&ty.name))
}

/// True if at least one member carries its own documentation.
pub fn is_advanced(ty: &TypeDescriptor) -> bool {
    ty.enumerants.iter().any(|e| e.description.is_some())
}

/// Build the definition body for an enumerable type.
pub fn enum_definition(ty: &TypeDescriptor) -> Value {
    if is_advanced(ty) {
        let members: Vec<Value> = ty
            .enumerants
            .iter()
            .map(|e| {
                let description = e
                    .description
                    .clone()
                    .unwrap_or_else(|| format!("No Description for {}", e.name));
                json!({ "const": e.name, "description": description })
            })
            .collect();
        json!({ "oneOf": members })
    } else {
        let names: Vec<&str> = ty.enumerants.iter().map(|e| e.name.as_str()).collect();
        json!({ "enum": names })
    }
}

impl Compilation<'_> {
    /// Memoize `ty` and return its `$ref` and display label.
    pub(crate) fn enum_reference(&mut self, ty: &TypeDescriptor) -> (String, String) {
        let key = enum_key(ty);
        let reference = self
            .definitions
            .get_or_insert_with(&key, || enum_definition(ty));
        (reference, self.options.label(&ty.name))
    }
}

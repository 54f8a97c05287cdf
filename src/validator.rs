//! Validation of configuration instances and compiled documents.

use serde_json::Value;

use crate::error::{SchemaError, ValidateError};
use crate::types::definition_key;

/// Validate a configuration instance against a compiled schema.
///
/// # Errors
///
/// Returns `ValidateError::Schema` if the schema can't be compiled by the
/// validator, or `ValidateError::Invalid` with every violation found.
pub fn validate_instance(schema: &Value, instance: &Value) -> Result<(), ValidateError> {
    let validator = jsonschema::validator_for(schema).map_err(|e| ValidateError::Schema {
        message: e.to_string(),
    })?;

    let errors: Vec<SchemaError> = validator
        .iter_errors(instance)
        .map(|e| SchemaError {
            path: e.instance_path.to_string(),
            message: e.to_string(),
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidateError::Invalid { errors })
    }
}

/// Check the internal consistency of a compiled document.
///
/// Reports every `$ref` that does not point at an existing entry of
/// `definitions`, and every definition left as an empty placeholder.
pub fn check_refs(document: &Value) -> Vec<SchemaError> {
    let mut problems = Vec::new();
    let definitions = document.get("definitions").and_then(Value::as_object);

    if let Some(definitions) = definitions {
        for (key, fragment) in definitions {
            if fragment.as_object().is_some_and(|o| o.is_empty()) {
                problems.push(SchemaError {
                    path: format!("/definitions/{}", key),
                    message: "definition is an empty placeholder".to_string(),
                });
            }
        }
    }

    walk_refs(document, "", &mut |path, reference| {
        let resolved = definition_key(reference)
            .zip(definitions)
            .is_some_and(|(key, defs)| defs.contains_key(&key));
        if !resolved {
            problems.push(SchemaError {
                path: path.to_string(),
                message: format!("unresolved reference: {}", reference),
            });
        }
    });

    problems
}

fn walk_refs(value: &Value, path: &str, visit: &mut dyn FnMut(&str, &str)) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(reference)) = map.get("$ref") {
                visit(path, reference);
            }
            for (key, child) in map {
                let child_path = format!("{}/{}", path, key);
                walk_refs(child, &child_path, visit);
            }
        }
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                let child_path = format!("{}/{}", path, i);
                walk_refs(item, &child_path, visit);
            }
        }
        _ => {}
    }
}

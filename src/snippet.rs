//! Alternative (snippet) forms.
//!
//! A type with a snippet category may be written inline or as the name of a
//! snippet file. Its nodes become `anyOf` the inline shape and a reference to
//! the known snippet names of that category.

use serde_json::{json, Map, Value};

use crate::compiler::Compilation;

/// Definition key holding the snippet names of `category`.
pub fn snippet_key(category: &str) -> String {
    format!("enum-snippet-{}", category)
}

impl Compilation<'_> {
    /// Wrap `node` when `category` is set; return it unchanged otherwise.
    ///
    /// Both branches and the wrapper carry the node's description.
    pub(crate) fn wrap_snippet(&mut self, node: Value, category: Option<&str>) -> Value {
        let Some(category) = category else {
            return node;
        };

        let snippets = self.snippets;
        let reference = self
            .definitions
            .get_or_insert_with(&snippet_key(category), || {
                json!({ "enum": snippets.snippets(category) })
            });

        let description = node.get("description").cloned();

        let mut alternative = Map::new();
        alternative.insert("$ref".to_string(), json!(reference));
        if let Some(description) = &description {
            alternative.insert("description".to_string(), description.clone());
        }

        let mut wrapper = Map::new();
        wrapper.insert(
            "anyOf".to_string(),
            Value::Array(vec![node, Value::Object(alternative)]),
        );
        if let Some(description) = description {
            wrapper.insert("description".to_string(), description);
        }
        Value::Object(wrapper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_format() {
        assert_eq!(snippet_key("foo"), "enum-snippet-foo");
    }
}

//! Memoized store of reusable schema fragments.
//!
//! Keys are reserved before the fragment that fills them is computed. A type
//! that refers to itself (directly or through other types) finds its own key
//! already present and emits a `$ref` instead of recursing again.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::types::definition_ref;

/// Definitions collected during one compilation.
#[derive(Debug, Clone, Default)]
pub(crate) struct DefinitionsTable {
    entries: Map<String, Value>,
    pending: HashSet<String>,
}

impl DefinitionsTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reserve `key` with an empty placeholder.
    ///
    /// Returns `true` if the key was free and the caller must now compute and
    /// [`fill`](Self::fill) it; `false` if it is already present (filled or
    /// still being computed further up the stack).
    pub(crate) fn reserve(&mut self, key: &str) -> bool {
        if self.entries.contains_key(key) {
            return false;
        }
        tracing::debug!(key, "reserved definition");
        self.entries
            .insert(key.to_string(), Value::Object(Map::new()));
        self.pending.insert(key.to_string());
        true
    }

    /// Replace the placeholder (or any existing value) for `key`.
    pub(crate) fn fill(&mut self, key: &str, fragment: Value) {
        self.pending.remove(key);
        self.entries.insert(key.to_string(), fragment);
    }

    /// Insert the fragment built by `build` unless `key` already exists.
    ///
    /// Returns the `$ref` string for `key` either way.
    pub(crate) fn get_or_insert_with(&mut self, key: &str, build: impl FnOnce() -> Value) -> String {
        if !self.entries.contains_key(key) {
            self.entries.insert(key.to_string(), build());
        }
        definition_ref(key)
    }

    /// True once every reserved key holds its real fragment.
    pub(crate) fn is_complete(&self) -> bool {
        self.pending.is_empty()
    }

    /// Flatten into the document's `definitions` object.
    pub(crate) fn into_value(self) -> Value {
        Value::Object(self.entries)
    }
}

//! Core types shared by the schema compiler.

use serde::{Deserialize, Serialize};

/// Draft identifier written to every compiled document.
pub const SCHEMA_DRAFT: &str = "http://json-schema.org/draft-07/schema#";

/// Default base URL for the document `$id`.
pub const DEFAULT_ID_BASE: &str = "https://example.com/schema/";

/// Prefix of every `$ref` emitted by the compiler.
pub const DEFINITIONS_POINTER: &str = "#/definitions/";

/// Build a `$ref` value pointing into the definitions block.
///
/// The key is escaped as a JSON Pointer token (RFC 6901).
pub fn definition_ref(key: &str) -> String {
    format!(
        "{}{}",
        DEFINITIONS_POINTER,
        key.replace('~', "~0").replace('/', "~1")
    )
}

/// Recover the definitions key from a `$ref`, or `None` if it points elsewhere.
pub fn definition_key(reference: &str) -> Option<String> {
    let token = reference.strip_prefix(DEFINITIONS_POINTER)?;
    if token.contains('/') {
        return None;
    }
    Some(token.replace("~1", "/").replace("~0", "~"))
}

/// Lower-case a canonical name and replace `.` with `-`.
///
/// `com.example.Biome` becomes `com-example-biome`.
pub fn canonical_key(name: &str) -> String {
    name.replace('.', "-").to_lowercase()
}

/// Last segment of a canonical name.
pub fn simple_name(name: &str) -> &str {
    name.rsplit(['.', '$']).next().unwrap_or(name)
}

/// The JSON kind a declared value type resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticKind {
    Boolean,
    Integer,
    Number,
    String,
    Array,
    Object,
}

impl SemanticKind {
    /// Returns the `type` keyword value for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            SemanticKind::Boolean => "boolean",
            SemanticKind::Integer => "integer",
            SemanticKind::Number => "number",
            SemanticKind::String => "string",
            SemanticKind::Array => "array",
            SemanticKind::Object => "object",
        }
    }
}

impl std::fmt::Display for SemanticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for a compilation.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Base URL of the document `$id`; the root's simple name is appended.
    pub id_base: String,
    /// Canonical name prefix of the user's own types. Undocumented types and
    /// fields inside it produce warnings.
    pub user_namespace: String,
    /// Canonical name prefixes of host-owned types. Undocumented fields
    /// declared there get a neutral note instead of a warning.
    pub host_namespaces: Vec<String>,
    /// Prefix stripped from simple names when building type labels.
    pub label_prefix: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            id_base: DEFAULT_ID_BASE.to_string(),
            user_namespace: String::new(),
            host_namespaces: Vec::new(),
            label_prefix: String::new(),
        }
    }
}

impl CompileOptions {
    /// Create options with the given user namespace and defaults elsewhere.
    pub fn new(user_namespace: impl Into<String>) -> Self {
        Self {
            user_namespace: user_namespace.into(),
            ..Self::default()
        }
    }

    /// Set the `$id` base URL. A trailing slash is added when missing.
    pub fn id_base(mut self, base: impl Into<String>) -> Self {
        let mut base = base.into();
        if !base.ends_with('/') {
            base.push('/');
        }
        self.id_base = base;
        self
    }

    /// Add a host-owned namespace prefix.
    pub fn host_namespace(mut self, prefix: impl Into<String>) -> Self {
        self.host_namespaces.push(prefix.into());
        self
    }

    /// Set the prefix stripped from labels (e.g. `Iris` turns `IrisBiome` into `Biome`).
    pub fn label_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.label_prefix = prefix.into();
        self
    }

    /// True if `name` lives in the user's namespace.
    ///
    /// An empty namespace matches nothing.
    pub fn is_user_type(&self, name: &str) -> bool {
        !self.user_namespace.is_empty() && name.starts_with(&self.user_namespace)
    }

    /// True if `name` lives in one of the host namespaces.
    pub fn is_host_type(&self, name: &str) -> bool {
        self.host_namespaces
            .iter()
            .any(|prefix| !prefix.is_empty() && name.starts_with(prefix.as_str()))
    }

    /// Human label for a type: simple name with the label prefix removed.
    pub fn label(&self, name: &str) -> String {
        let simple = simple_name(name);
        if self.label_prefix.is_empty() {
            simple.to_string()
        } else {
            simple.replace(&self.label_prefix, "")
        }
    }

    /// The document `$id` for a root type.
    pub fn document_id(&self, root: &str) -> String {
        format!("{}{}.json", self.id_base, simple_name(root).to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_key_lowercases_and_dashes() {
        assert_eq!(canonical_key("com.example.Biome"), "com-example-biome");
        assert_eq!(canonical_key("Plain"), "plain");
    }

    #[test]
    fn definition_refs_escape_pointer_tokens() {
        assert_eq!(definition_ref("enum-font"), "#/definitions/enum-font");
        assert_eq!(definition_ref("fn/dims~x"), "#/definitions/fn~1dims~0x");
        assert_eq!(
            definition_key("#/definitions/fn~1dims~0x").as_deref(),
            Some("fn/dims~x")
        );
        assert_eq!(definition_key("#/definitions/a/b"), None);
        assert_eq!(definition_key("other.json#/x"), None);
    }

    #[test]
    fn simple_name_takes_last_segment() {
        assert_eq!(simple_name("com.example.IrisBiome"), "IrisBiome");
        assert_eq!(simple_name("com.example.Outer$Inner"), "Inner");
        assert_eq!(simple_name("Root"), "Root");
    }

    #[test]
    fn label_strips_prefix() {
        let opts = CompileOptions::new("com.example.").label_prefix("Iris");
        assert_eq!(opts.label("com.example.IrisBiome"), "Biome");

        let opts = CompileOptions::new("com.example.");
        assert_eq!(opts.label("com.example.IrisBiome"), "IrisBiome");
    }

    #[test]
    fn namespaces() {
        let opts = CompileOptions::new("com.example.").host_namespace("org.host.");
        assert!(opts.is_user_type("com.example.Biome"));
        assert!(!opts.is_user_type("org.host.Material"));
        assert!(opts.is_host_type("org.host.Material"));
        assert!(!opts.is_host_type("com.example.Biome"));

        let opts = CompileOptions::default();
        assert!(!opts.is_user_type("com.example.Biome"));
    }

    #[test]
    fn document_id_uses_lowercase_simple_name() {
        let opts = CompileOptions::default().id_base("https://schemas.test/iris");
        assert_eq!(
            opts.document_id("com.example.Dimension"),
            "https://schemas.test/iris/dimension.json"
        );
    }

    #[test]
    fn kind_names() {
        assert_eq!(SemanticKind::Integer.as_str(), "integer");
        assert_eq!(SemanticKind::Object.to_string(), "object");
    }
}

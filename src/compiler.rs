//! Schema assembly.
//!
//! [`SchemaCompiler`] walks a root [`TypeDescriptor`] and every type reachable
//! from it, producing a draft-07 document whose `definitions` block holds
//! each nested object, enumeration and catalog exactly once.
//!
//! Every call to [`SchemaCompiler::compile`] owns a fresh definitions table
//! and warning list, so compilations never observe each other.

use serde_json::{json, Map, Value};

use crate::definitions::DefinitionsTable;
use crate::diagnostics::{self, Diagnostics, Warning};
use crate::error::CompileError;
use crate::model::{FieldDescriptor, TypeDescriptor, TypeModel, ValueType};
use crate::providers::{FunctionSet, RegistryResolver, SnippetProvider};
use crate::types::{simple_name, CompileOptions, SemanticKind, SCHEMA_DRAFT};

/// Provider used when the caller supplies no registries or snippets.
struct NoSources;

impl RegistryResolver for NoSources {
    fn lookup(&self, _category: &str) -> Option<Vec<String>> {
        None
    }
}

impl SnippetProvider for NoSources {
    fn snippets(&self, _category: &str) -> Vec<String> {
        Vec::new()
    }
}

static NO_SOURCES: NoSources = NoSources;

/// Result of one compilation.
#[derive(Debug, Clone)]
pub struct CompiledSchema {
    /// Canonical name of the compiled root type.
    pub root: String,
    /// The finished JSON Schema document.
    pub document: Value,
    /// Warnings in the order they were raised. Never embedded in `document`.
    pub warnings: Vec<Warning>,
}

impl CompiledSchema {
    /// Look up a definition by key.
    pub fn definition(&self, key: &str) -> Option<&Value> {
        self.document.get("definitions").and_then(|d| d.get(key))
    }

    /// Log every warning through `tracing`.
    pub fn report(&self) {
        diagnostics::report(simple_name(&self.root), &self.warnings);
    }
}

/// Compiles descriptor trees into JSON Schema documents.
///
/// ```
/// use descriptor_schema::{
///     CompileOptions, DescriptorTable, FieldDescriptor, SchemaCompiler, TypeDescriptor, ValueType,
/// };
///
/// let table = DescriptorTable::new().with(
///     TypeDescriptor::object("com.example.Settings")
///         .describe("Generator settings")
///         .field(
///             FieldDescriptor::new("seed", ValueType::Long)
///                 .describe("World seed")
///                 .required(),
///         ),
/// );
///
/// let options = CompileOptions::new("com.example.");
/// let compiled = SchemaCompiler::new(&table)
///     .options(&options)
///     .compile("com.example.Settings")
///     .unwrap();
///
/// assert_eq!(compiled.document["required"][0], "seed");
/// assert_eq!(compiled.document["properties"]["seed"]["type"], "integer");
/// assert!(compiled.warnings.is_empty());
/// ```
pub struct SchemaCompiler<'a> {
    model: &'a dyn TypeModel,
    registries: &'a dyn RegistryResolver,
    snippets: &'a dyn SnippetProvider,
    functions: Option<&'a FunctionSet>,
    options: Option<&'a CompileOptions>,
}

impl<'a> SchemaCompiler<'a> {
    pub fn new(model: &'a dyn TypeModel) -> Self {
        Self {
            model,
            registries: &NO_SOURCES,
            snippets: &NO_SOURCES,
            functions: None,
            options: None,
        }
    }

    pub fn registries(mut self, registries: &'a dyn RegistryResolver) -> Self {
        self.registries = registries;
        self
    }

    pub fn snippets(mut self, snippets: &'a dyn SnippetProvider) -> Self {
        self.snippets = snippets;
        self
    }

    pub fn functions(mut self, functions: &'a FunctionSet) -> Self {
        self.functions = Some(functions);
        self
    }

    pub fn options(mut self, options: &'a CompileOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Compile the type named `root` into a schema document.
    ///
    /// # Errors
    ///
    /// Returns `CompileError::UnknownType` if `root` or any type reachable from
    /// it is missing from the model, and `CompileError::InvalidRoot` if `root`
    /// is an enumeration.
    pub fn compile(&self, root: &str) -> Result<CompiledSchema, CompileError> {
        let defaults = CompileOptions::default();
        let compilation = Compilation {
            model: self.model,
            registries: self.registries,
            snippets: self.snippets,
            functions: self.functions,
            options: self.options.unwrap_or(&defaults),
            definitions: DefinitionsTable::new(),
            diagnostics: Diagnostics::new(),
        };
        compilation.run(root)
    }
}

/// Compile `root` with default providers.
pub fn compile(
    model: &dyn TypeModel,
    root: &str,
    options: &CompileOptions,
) -> Result<CompiledSchema, CompileError> {
    SchemaCompiler::new(model).options(options).compile(root)
}

/// Where a field sits: the type being built and the type that declares it.
///
/// The two differ for fields inherited from the common base.
#[derive(Clone, Copy)]
pub(crate) struct FieldSite<'a> {
    pub(crate) owner: &'a TypeDescriptor,
    pub(crate) declaring: &'a TypeDescriptor,
    pub(crate) field: &'a FieldDescriptor,
}

impl FieldSite<'_> {
    pub(crate) fn path(&self) -> String {
        format!("{}.{}", self.declaring.name, self.field.name)
    }
}

/// State of a single compilation.
pub(crate) struct Compilation<'a> {
    pub(crate) model: &'a dyn TypeModel,
    pub(crate) registries: &'a dyn RegistryResolver,
    pub(crate) snippets: &'a dyn SnippetProvider,
    pub(crate) functions: Option<&'a FunctionSet>,
    pub(crate) options: &'a CompileOptions,
    pub(crate) definitions: DefinitionsTable,
    pub(crate) diagnostics: Diagnostics,
}

impl<'a> Compilation<'a> {
    fn run(mut self, root: &str) -> Result<CompiledSchema, CompileError> {
        let model = self.model;
        let ty = model
            .lookup(root)
            .ok_or_else(|| CompileError::UnknownType {
                name: root.to_string(),
                referenced_by: "compile request".to_string(),
            })?;
        if ty.is_enumerable() {
            return Err(CompileError::InvalidRoot {
                name: root.to_string(),
                kind: "enumeration".to_string(),
            });
        }

        let body = self.build_object(ty)?;

        let mut document = Map::new();
        document.insert("$schema".to_string(), json!(SCHEMA_DRAFT));
        document.insert("$id".to_string(), json!(self.options.document_id(root)));
        if let Value::Object(body) = body {
            for (key, value) in body {
                document.entry(key).or_insert(value);
            }
        }

        debug_assert!(self.definitions.is_complete());
        tracing::debug!(
            root,
            definitions = self.definitions.len(),
            warnings = self.diagnostics.len(),
            "compiled schema"
        );
        document.insert("definitions".to_string(), self.definitions.into_value());

        Ok(CompiledSchema {
            root: root.to_string(),
            document: Value::Object(document),
            warnings: self.diagnostics.into_warnings(),
        })
    }

    /// Build the full inline shape of an object type.
    pub(crate) fn build_object(&mut self, ty: &'a TypeDescriptor) -> Result<Value, CompileError> {
        let mut node = Map::new();
        node.insert("description".to_string(), json!(self.own_description(ty)));
        node.insert("type".to_string(), json!(SemanticKind::Object.as_str()));

        let mut properties = Map::new();
        let mut required: Vec<Value> = Vec::new();

        let base = if ty.inherits_base {
            self.model.common_base().filter(|b| b.name != ty.name)
        } else {
            None
        };
        let declared = base
            .into_iter()
            .flat_map(|b| b.serialized_fields().map(move |f| (b, f)))
            .chain(ty.serialized_fields().map(|f| (ty, f)));

        for (declaring, field) in declared {
            let site = FieldSite {
                owner: ty,
                declaring,
                field,
            };
            let property = self.build_property(site)?;
            let name = json!(field.name);
            if field.is_required() && !required.contains(&name) {
                required.push(name);
            }
            properties.insert(field.name.clone(), property);
        }

        if !required.is_empty() {
            node.insert("required".to_string(), Value::Array(required));
        }
        node.insert("properties".to_string(), Value::Object(properties));

        Ok(Value::Object(node))
    }

    /// Build the node stored under an object definition key.
    pub(crate) fn build_definition(
        &mut self,
        ty: &'a TypeDescriptor,
    ) -> Result<Value, CompileError> {
        let node = self.build_object(ty)?;
        Ok(self.wrap_snippet(node, ty.snippet.as_deref()))
    }

    /// Reference to the memoized definition of an object type.
    ///
    /// The key is reserved before recursing so cyclic type graphs terminate.
    pub(crate) fn object_reference(
        &mut self,
        name: &str,
        referenced_by: impl FnOnce() -> String,
    ) -> Result<String, CompileError> {
        let model = self.model;
        let ty = model.lookup(name).ok_or_else(|| CompileError::UnknownType {
            name: name.to_string(),
            referenced_by: referenced_by(),
        })?;
        let key = format!("obj-{}", crate::types::canonical_key(&ty.name));
        if self.definitions.reserve(&key) {
            let node = self.build_definition(ty)?;
            self.definitions.fill(&key, node);
        }
        Ok(crate::types::definition_ref(&key))
    }

    fn build_property(&mut self, site: FieldSite<'a>) -> Result<Value, CompileError> {
        let field = site.field;
        let kind = self.classify(&field.value_type, site);
        let shape = self.dispatch(kind, site)?;

        let mut lines = vec![
            field.name.clone(),
            self.field_description(site),
            "   ".to_string(),
            shape.label,
            self.value_type_description(&field.value_type, site.declaring),
        ];

        if let Some(category) = self.snippet_category(field) {
            lines.push("    ".to_string());
            lines.push(format!(
                "You can instead specify \"snippet/{}/some-name.json\" to use a snippet file instead of specifying it here.",
                category
            ));
        }

        if let Some(default) = self.default_line(site) {
            lines.push("    ".to_string());
            lines.push(default);
        }

        lines.extend(shape.notes.iter().map(|n| n.trim().to_string()));

        let mut node = Map::new();
        if !shape.node.contains_key("$ref") {
            node.insert("type".to_string(), json!(kind.as_str()));
        }
        node.extend(shape.node);
        node.insert("description".to_string(), json!(lines.join("\n")));

        let model = self.model;
        let snippet = match &field.value_type {
            ValueType::Named(name) => model.lookup(name).and_then(|t| t.snippet.as_deref()),
            _ => None,
        };
        Ok(self.wrap_snippet(Value::Object(node), snippet))
    }

    /// Snippet category of a field's type, or of its element type for lists.
    fn snippet_category(&self, field: &FieldDescriptor) -> Option<&'a str> {
        let model = self.model;
        let target = match (&field.value_type, field.array_type()) {
            (ValueType::Named(name), _) => name,
            (ValueType::List, Some(array)) => match &array.element {
                ValueType::Named(name) => name,
                _ => return None,
            },
            _ => return None,
        };
        model.lookup(target).and_then(|t| t.snippet.as_deref())
    }

    fn own_description(&mut self, ty: &TypeDescriptor) -> String {
        match &ty.description {
            Some(description) => description.clone(),
            None => {
                if self.options.is_user_type(&ty.name) {
                    self.diagnostics.warn(
                        &ty.name,
                        None,
                        format!("Missing description on type {}", ty.name),
                    );
                }
                String::new()
            }
        }
    }

    fn field_description(&mut self, site: FieldSite<'_>) -> String {
        if let Some(description) = &site.field.description {
            return description.clone();
        }
        if self.options.is_host_type(&site.declaring.name) {
            return "Host classes and enums have no descriptions".to_string();
        }
        self.diagnostics.warn(
            &site.declaring.name,
            Some(&site.field.name),
            format!(
                "Missing description on field {} ({}) in {}",
                site.field.name, site.field.value_type, site.declaring.name
            ),
        );
        "No Field Description".to_string()
    }

    /// Documentation of the declared type itself; empty for builtins.
    fn value_type_description(&mut self, value_type: &ValueType, declaring: &TypeDescriptor) -> String {
        let ValueType::Named(name) = value_type else {
            return String::new();
        };
        let model = self.model;
        match model.lookup(name) {
            Some(TypeDescriptor {
                description: Some(description),
                ..
            }) => description.clone(),
            _ => {
                if self.options.is_user_type(name) {
                    self.diagnostics.warn(
                        &declaring.name,
                        None,
                        format!("Missing description on {} in {}", simple_name(name), declaring.name),
                    );
                }
                String::new()
            }
        }
    }

    /// Best-effort default value line, read from the owner's default instance.
    fn default_line(&self, site: FieldSite<'_>) -> Option<String> {
        let instance = self.model.default_instance(&site.owner.name)?;
        let value = instance.get(&site.field.name)?;
        let text = match value {
            Value::Null => return None,
            Value::Array(items) if items.is_empty() => "an empty list".to_string(),
            Value::Array(items) => format!("a list of {} entries", items.len()),
            Value::Object(_) => {
                "a default object (create this object to see default properties)".to_string()
            }
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        Some(format!("* Default Value is {}", text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DescriptorTable, FieldDescriptor, TypeDescriptor};

    fn options() -> CompileOptions {
        CompileOptions::new("com.example.")
    }

    #[test]
    fn envelope_keys() {
        let table = DescriptorTable::new()
            .with(TypeDescriptor::object("com.example.Dimension").describe("A dimension"));
        let opts = options().id_base("https://schemas.test");
        let compiled = compile(&table, "com.example.Dimension", &opts).unwrap();
        let doc = &compiled.document;

        assert_eq!(doc["$schema"], SCHEMA_DRAFT);
        assert_eq!(doc["$id"], "https://schemas.test/dimension.json");
        assert_eq!(doc["type"], "object");
        assert_eq!(doc["description"], "A dimension");
        assert_eq!(doc["properties"], json!({}));
        assert!(doc.get("required").is_none());
        assert_eq!(doc["definitions"], json!({}));
    }

    #[test]
    fn unknown_root_is_fatal() {
        let table = DescriptorTable::new();
        let result = compile(&table, "com.example.Missing", &options());
        assert!(matches!(
            result,
            Err(CompileError::UnknownType { name, .. }) if name == "com.example.Missing"
        ));
    }

    #[test]
    fn enum_root_is_fatal() {
        let table = DescriptorTable::new()
            .with(TypeDescriptor::enumeration("com.example.Mode").enumerant("A", None));
        let result = compile(&table, "com.example.Mode", &options());
        assert!(matches!(result, Err(CompileError::InvalidRoot { .. })));
    }

    #[test]
    fn unknown_nested_type_is_fatal() {
        let table = DescriptorTable::new().with(
            TypeDescriptor::object("com.example.Root").describe("Root").field(
                FieldDescriptor::new("child", ValueType::named("com.example.Gone"))
                    .describe("Child"),
            ),
        );
        let err = compile(&table, "com.example.Root", &options()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown type 'com.example.Gone' referenced by com.example.Root.child"
        );
    }

    #[test]
    fn transient_fields_are_skipped() {
        let table = DescriptorTable::new().with(
            TypeDescriptor::object("com.example.Root")
                .describe("Root")
                .field(FieldDescriptor::new("name", ValueType::Text).describe("Name"))
                .field(FieldDescriptor::new("cache", ValueType::Map).transient()),
        );
        let compiled = compile(&table, "com.example.Root", &options()).unwrap();
        let props = compiled.document["properties"].as_object().unwrap();
        assert!(props.contains_key("name"));
        assert!(!props.contains_key("cache"));
    }

    #[test]
    fn base_fields_come_first() {
        let table = DescriptorTable::new()
            .with_base(
                TypeDescriptor::object("com.example.Registrant")
                    .describe("Loadable resource")
                    .field(
                        FieldDescriptor::new("preprocessors", ValueType::List)
                            .describe("Scripts run on load")
                            .array_of(ValueType::Text, 0),
                    ),
            )
            .with(
                TypeDescriptor::object("com.example.Biome")
                    .describe("Biome")
                    .inherits_base()
                    .field(FieldDescriptor::new("name", ValueType::Text).describe("Name")),
            );
        let compiled = compile(&table, "com.example.Biome", &options()).unwrap();
        let keys: Vec<_> = compiled.document["properties"]
            .as_object()
            .unwrap()
            .keys()
            .cloned()
            .collect();
        assert_eq!(keys, vec!["preprocessors", "name"]);
    }

    #[test]
    fn base_fields_only_for_inheriting_types() {
        let table = DescriptorTable::new()
            .with_base(
                TypeDescriptor::object("com.example.Registrant")
                    .describe("Base")
                    .field(FieldDescriptor::new("key", ValueType::Text).describe("Key")),
            )
            .with(TypeDescriptor::object("com.example.Plain").describe("Plain"));
        let compiled = compile(&table, "com.example.Plain", &options()).unwrap();
        assert_eq!(compiled.document["properties"], json!({}));
    }

    #[test]
    fn field_description_lines() {
        let table = DescriptorTable::new()
            .with(
                TypeDescriptor::object("com.example.Root")
                    .describe("Root")
                    .defaults(json!({ "style": {}, "name": "plains" }))
                    .field(
                        FieldDescriptor::new("style", ValueType::named("com.example.Style"))
                            .describe("How it looks"),
                    )
                    .field(FieldDescriptor::new("name", ValueType::Text).describe("Its name")),
            )
            .with(TypeDescriptor::object("com.example.Style").describe("A style"));
        let compiled = compile(&table, "com.example.Root", &options()).unwrap();

        let style = compiled.document["properties"]["style"]["description"]
            .as_str()
            .unwrap();
        assert_eq!(
            style,
            "style\nHow it looks\n   \nStyle (Object)\nA style\n    \n\
             * Default Value is a default object (create this object to see default properties)"
        );

        let name = compiled.document["properties"]["name"]["description"]
            .as_str()
            .unwrap();
        assert_eq!(
            name,
            "name\nIts name\n   \nText\n\n    \n* Default Value is plains"
        );
    }

    #[test]
    fn missing_defaults_are_silent() {
        let table = DescriptorTable::new().with(
            TypeDescriptor::object("com.example.Root")
                .describe("Root")
                .defaults(json!({ "other": null }))
                .field(FieldDescriptor::new("count", ValueType::Integer).describe("Count")),
        );
        let compiled = compile(&table, "com.example.Root", &options()).unwrap();
        let description = compiled.document["properties"]["count"]["description"]
            .as_str()
            .unwrap();
        assert!(!description.contains("Default Value"));
        assert!(compiled.warnings.is_empty());
    }

    #[test]
    fn missing_documentation_warns() {
        let table = DescriptorTable::new()
            .with(
                TypeDescriptor::object("com.example.Root")
                    .field(FieldDescriptor::new("child", ValueType::named("com.example.Child"))),
            )
            .with(TypeDescriptor::object("com.example.Child"));
        let compiled = compile(&table, "com.example.Root", &options()).unwrap();
        let messages: Vec<_> = compiled.warnings.iter().map(|w| w.message.as_str()).collect();

        assert!(messages.contains(&"Missing description on type com.example.Root"));
        assert!(messages.contains(&"Missing description on type com.example.Child"));
        assert!(messages.contains(
            &"Missing description on field child (com.example.Child) in com.example.Root"
        ));
        assert!(messages.contains(&"Unsupported Type: com.example.Child Did you forget a description?"));
        // The schema is still produced.
        assert!(compiled.definition("obj-com-example-child").is_some());
    }

    #[test]
    fn host_declared_fields_get_neutral_note() {
        let table = DescriptorTable::new()
            .with_base(
                TypeDescriptor::object("org.host.Keyed")
                    .field(FieldDescriptor::new("key", ValueType::Text)),
            )
            .with(
                TypeDescriptor::object("com.example.Root")
                    .describe("Root")
                    .inherits_base(),
            );
        let opts = options().host_namespace("org.host.");
        let compiled = compile(&table, "com.example.Root", &opts).unwrap();

        let description = compiled.document["properties"]["key"]["description"]
            .as_str()
            .unwrap();
        assert!(description.contains("Host classes and enums have no descriptions"));
        assert!(compiled.warnings.is_empty());
    }

    #[test]
    fn compilations_are_isolated() {
        let table = DescriptorTable::new()
            .with(
                TypeDescriptor::object("com.example.A").describe("A").field(
                    FieldDescriptor::new("b", ValueType::named("com.example.B")).describe("B"),
                ),
            )
            .with(TypeDescriptor::object("com.example.B").describe("B"));
        let opts = options();
        let compiler = SchemaCompiler::new(&table).options(&opts);

        let first = compiler.compile("com.example.A").unwrap();
        let second = compiler.compile("com.example.B").unwrap();
        assert!(first.definition("obj-com-example-b").is_some());
        assert_eq!(second.document["definitions"], json!({}));
    }
}

//! Statically declared type descriptors.
//!
//! Configuration types describe themselves through a [`DescriptorTable`]: one
//! [`TypeDescriptor`] per type, each listing its fields in declaration order
//! together with their annotations. Tables are either built in code or
//! deserialized from JSON:
//!
//! ```json
//! {
//!   "base": "com.example.Registrant",
//!   "types": [
//!     {
//!       "name": "com.example.Biome",
//!       "description": "A biome",
//!       "fields": [
//!         { "name": "rarity", "type": "integer", "annotations": ["required", { "min": 1 }] },
//!         { "name": "layers", "type": "list",
//!           "annotations": [{ "array-type": { "element": "com.example.Layer", "min": 1 } }] }
//!       ]
//!     }
//!   ]
//! }
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Declared value type of a field.
///
/// Serialized as a single string: builtin names (`integer`, `double`, `list`,
/// ...) or the canonical name of another descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ValueType {
    Integer,
    Long,
    Float,
    Double,
    Boolean,
    Text,
    /// Host potion effect identifier, serialized as a string.
    PotionEffect,
    /// Host enchantment identifier, serialized as a string.
    Enchantment,
    /// Ordered sequence; element type comes from an `array-type` annotation.
    List,
    /// Key-value map.
    Map,
    /// Another descriptor in the table.
    Named(String),
}

impl ValueType {
    /// Create a reference to a named descriptor.
    pub fn named(name: impl Into<String>) -> Self {
        ValueType::Named(name.into())
    }

    /// Parse a builtin name, falling back to a named reference.
    pub fn parse(s: &str) -> Self {
        match s {
            "int" | "integer" => ValueType::Integer,
            "long" => ValueType::Long,
            "float" => ValueType::Float,
            "double" | "number" => ValueType::Double,
            "bool" | "boolean" => ValueType::Boolean,
            "string" | "text" => ValueType::Text,
            "potion-effect" => ValueType::PotionEffect,
            "enchantment" => ValueType::Enchantment,
            "list" => ValueType::List,
            "map" => ValueType::Map,
            other => ValueType::Named(other.to_string()),
        }
    }

    /// Display name used in diagnostics.
    pub fn name(&self) -> &str {
        match self {
            ValueType::Integer => "integer",
            ValueType::Long => "long",
            ValueType::Float => "float",
            ValueType::Double => "double",
            ValueType::Boolean => "boolean",
            ValueType::Text => "string",
            ValueType::PotionEffect => "potion-effect",
            ValueType::Enchantment => "enchantment",
            ValueType::List => "list",
            ValueType::Map => "map",
            ValueType::Named(name) => name,
        }
    }
}

impl From<String> for ValueType {
    fn from(s: String) -> Self {
        ValueType::parse(&s)
    }
}

impl From<ValueType> for String {
    fn from(t: ValueType) -> Self {
        t.name().to_string()
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Element declaration of a list field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayType {
    pub element: ValueType,
    #[serde(default)]
    pub min: u32,
}

/// Semantic annotation attached to a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Annotation {
    Required,
    /// Inclusive lower bound (numbers) or minimum length (strings).
    #[serde(rename = "min")]
    MinNumber(f64),
    /// Inclusive upper bound (numbers) or maximum length (strings).
    #[serde(rename = "max")]
    MaxNumber(f64),
    ArrayType(ArrayType),
    /// Values come from the named resource registry.
    Registry(String),
    BlockType,
    ItemType,
    SpecialEntity,
    Font,
    Enchantment,
    /// Values come from a registered list function.
    ListFunction(String),
}

/// Shape of a described type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TypeKind {
    #[default]
    Object,
    Enum,
    /// Closed value set declared in the older constant-holder style.
    LegacyEnum,
}

impl TypeKind {
    pub fn is_enumerable(&self) -> bool {
        matches!(self, TypeKind::Enum | TypeKind::LegacyEnum)
    }
}

/// One member of an enumerable type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enumerant {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One field of a described type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub value_type: ValueType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
    /// Static, constant or non-serialized; never part of the schema.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub transient: bool,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            description: None,
            annotations: Vec::new(),
            transient: false,
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn annotate(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn required(self) -> Self {
        self.annotate(Annotation::Required)
    }

    pub fn min(self, value: f64) -> Self {
        self.annotate(Annotation::MinNumber(value))
    }

    pub fn max(self, value: f64) -> Self {
        self.annotate(Annotation::MaxNumber(value))
    }

    /// Declare the element type of a list field.
    pub fn array_of(self, element: ValueType, min: u32) -> Self {
        self.annotate(Annotation::ArrayType(ArrayType { element, min }))
    }

    pub fn registry(self, category: impl Into<String>) -> Self {
        self.annotate(Annotation::Registry(category.into()))
    }

    pub fn transient(mut self) -> Self {
        self.transient = true;
        self
    }

    pub fn is_required(&self) -> bool {
        self.annotations
            .iter()
            .any(|a| matches!(a, Annotation::Required))
    }

    pub fn min_bound(&self) -> Option<f64> {
        self.annotations.iter().find_map(|a| match a {
            Annotation::MinNumber(v) => Some(*v),
            _ => None,
        })
    }

    pub fn max_bound(&self) -> Option<f64> {
        self.annotations.iter().find_map(|a| match a {
            Annotation::MaxNumber(v) => Some(*v),
            _ => None,
        })
    }

    pub fn array_type(&self) -> Option<&ArrayType> {
        self.annotations.iter().find_map(|a| match a {
            Annotation::ArrayType(t) => Some(t),
            _ => None,
        })
    }
}

/// A described configuration type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    /// Canonical dotted name, unique within a table.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub kind: TypeKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldDescriptor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enumerants: Vec<Enumerant>,
    /// Category of the compact alternative form, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    /// Also carries the fields of the table's common base type.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub inherits_base: bool,
    /// Field values of a default-constructed instance, when one exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<Value>,
}

impl TypeDescriptor {
    fn with_kind(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            description: None,
            kind,
            fields: Vec::new(),
            enumerants: Vec::new(),
            snippet: None,
            inherits_base: false,
            defaults: None,
        }
    }

    pub fn object(name: impl Into<String>) -> Self {
        Self::with_kind(name, TypeKind::Object)
    }

    pub fn enumeration(name: impl Into<String>) -> Self {
        Self::with_kind(name, TypeKind::Enum)
    }

    pub fn legacy_enum(name: impl Into<String>) -> Self {
        Self::with_kind(name, TypeKind::LegacyEnum)
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn enumerant(mut self, name: impl Into<String>, description: Option<&str>) -> Self {
        self.enumerants.push(Enumerant {
            name: name.into(),
            description: description.map(String::from),
        });
        self
    }

    pub fn snippet(mut self, category: impl Into<String>) -> Self {
        self.snippet = Some(category.into());
        self
    }

    pub fn inherits_base(mut self) -> Self {
        self.inherits_base = true;
        self
    }

    pub fn defaults(mut self, defaults: Value) -> Self {
        self.defaults = Some(defaults);
        self
    }

    pub fn is_enumerable(&self) -> bool {
        self.kind.is_enumerable()
    }

    /// Fields that belong in the schema, in declaration order.
    pub fn serialized_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| !f.transient)
    }
}

/// Structural view of configuration types consumed by the compiler.
pub trait TypeModel {
    /// Look up a descriptor by canonical name.
    fn lookup(&self, name: &str) -> Option<&TypeDescriptor>;

    /// Shared base whose fields are merged into every type that inherits it.
    fn common_base(&self) -> Option<&TypeDescriptor> {
        None
    }

    /// Field values of a default instance of `name`, if one can be produced.
    fn default_instance(&self, name: &str) -> Option<Value> {
        self.lookup(name).and_then(|t| t.defaults.clone())
    }
}

/// On-disk shape of a descriptor table.
#[derive(Deserialize)]
struct TableFile {
    #[serde(default)]
    base: Option<String>,
    #[serde(default)]
    types: Vec<TypeDescriptor>,
}

/// In-memory [`TypeModel`] built from declared descriptors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "TableFile")]
pub struct DescriptorTable {
    #[serde(skip_serializing_if = "Option::is_none")]
    base: Option<String>,
    types: Vec<TypeDescriptor>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl TryFrom<TableFile> for DescriptorTable {
    type Error = String;

    fn try_from(file: TableFile) -> Result<Self, Self::Error> {
        let mut table = DescriptorTable::new();
        for ty in file.types {
            if table.index.contains_key(&ty.name) {
                return Err(format!("duplicate type '{}'", ty.name));
            }
            table.insert(ty);
        }
        if let Some(base) = &file.base {
            if !table.index.contains_key(base) {
                return Err(format!("base type '{}' is not declared", base));
            }
        }
        table.base = file.base;
        Ok(table)
    }
}

impl DescriptorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a descriptor.
    pub fn insert(&mut self, ty: TypeDescriptor) {
        match self.index.get(&ty.name) {
            Some(&i) => self.types[i] = ty,
            None => {
                self.index.insert(ty.name.clone(), self.types.len());
                self.types.push(ty);
            }
        }
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, ty: TypeDescriptor) -> Self {
        self.insert(ty);
        self
    }

    /// Declare the common base type and insert it.
    pub fn with_base(mut self, ty: TypeDescriptor) -> Self {
        self.base = Some(ty.name.clone());
        self.insert(ty);
        self
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl TypeModel for DescriptorTable {
    fn lookup(&self, name: &str) -> Option<&TypeDescriptor> {
        self.index.get(name).map(|&i| &self.types[i])
    }

    fn common_base(&self) -> Option<&TypeDescriptor> {
        self.base.as_deref().and_then(|b| self.lookup(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn value_type_parse() {
        assert_eq!(ValueType::parse("int"), ValueType::Integer);
        assert_eq!(ValueType::parse("double"), ValueType::Double);
        assert_eq!(ValueType::parse("list"), ValueType::List);
        assert_eq!(
            ValueType::parse("com.example.Layer"),
            ValueType::named("com.example.Layer")
        );
    }

    #[test]
    fn field_annotation_accessors() {
        let field = FieldDescriptor::new("rarity", ValueType::Integer)
            .required()
            .min(1.0)
            .max(100.0);
        assert!(field.is_required());
        assert_eq!(field.min_bound(), Some(1.0));
        assert_eq!(field.max_bound(), Some(100.0));
        assert!(field.array_type().is_none());
    }

    #[test]
    fn serialized_fields_skip_transient() {
        let ty = TypeDescriptor::object("com.example.Root")
            .field(FieldDescriptor::new("kept", ValueType::Text))
            .field(FieldDescriptor::new("cache", ValueType::Map).transient());
        let names: Vec<_> = ty.serialized_fields().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["kept"]);
    }

    #[test]
    fn table_from_json() {
        let table: DescriptorTable = serde_json::from_value(json!({
            "base": "com.example.Registrant",
            "types": [
                { "name": "com.example.Registrant", "fields": [
                    { "name": "loadKey", "type": "string", "transient": true }
                ]},
                { "name": "com.example.Biome", "inherits_base": true, "fields": [
                    { "name": "rarity", "type": "int", "annotations": ["required", { "min": 1 }] },
                    { "name": "layers", "type": "list",
                      "annotations": [{ "array-type": { "element": "com.example.Layer", "min": 1 } }] },
                    { "name": "palette", "type": "list",
                      "annotations": [{ "array-type": { "element": "string" } }, "block-type"] }
                ]},
                { "name": "com.example.Mode", "kind": "enum",
                  "enumerants": [{ "name": "FAST" }, { "name": "SLOW", "description": "Slow" }] }
            ]
        }))
        .unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(
            table.common_base().map(|b| b.name.as_str()),
            Some("com.example.Registrant")
        );

        let biome = table.lookup("com.example.Biome").unwrap();
        assert!(biome.inherits_base);
        assert!(biome.fields[0].is_required());
        assert_eq!(biome.fields[0].min_bound(), Some(1.0));
        let layers = biome.fields[1].array_type().unwrap();
        assert_eq!(layers.element, ValueType::named("com.example.Layer"));
        assert_eq!(layers.min, 1);
        assert_eq!(biome.fields[2].annotations[1], Annotation::BlockType);

        let mode = table.lookup("com.example.Mode").unwrap();
        assert!(mode.is_enumerable());
        assert_eq!(mode.enumerants[1].description.as_deref(), Some("Slow"));
    }

    #[test]
    fn table_rejects_duplicates() {
        let result: Result<DescriptorTable, _> = serde_json::from_value(json!({
            "types": [{ "name": "com.example.A" }, { "name": "com.example.A" }]
        }));
        let err = result.unwrap_err().to_string();
        assert!(err.contains("duplicate type 'com.example.A'"));
    }

    #[test]
    fn table_rejects_undeclared_base() {
        let result: Result<DescriptorTable, _> = serde_json::from_value(json!({
            "base": "com.example.Missing",
            "types": []
        }));
        assert!(result.is_err());
    }

    #[test]
    fn insert_replaces_existing() {
        let mut table = DescriptorTable::new().with(TypeDescriptor::object("com.example.A"));
        table.insert(TypeDescriptor::object("com.example.A").describe("replaced"));
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.lookup("com.example.A").unwrap().description.as_deref(),
            Some("replaced")
        );
    }

    #[test]
    fn default_instance_reads_declared_defaults() {
        let table = DescriptorTable::new().with(
            TypeDescriptor::object("com.example.A").defaults(json!({ "seed": 7 })),
        );
        assert_eq!(
            table.default_instance("com.example.A"),
            Some(json!({ "seed": 7 }))
        );
        assert_eq!(table.default_instance("com.example.B"), None);
    }
}

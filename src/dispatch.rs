//! Per-field constraint rules.
//!
//! A field's declared type is classified into a [`SemanticKind`]; the kind and
//! the field's annotations then decide the schema keywords of its node.
//! String fields backed by a value catalog become `$ref`s to a memoized
//! `enum` definition. When several catalog annotations are present the one
//! ranked first by [`StringSource::priority`] wins.

use serde_json::{json, Map, Value};

use crate::compiler::{Compilation, FieldSite};
use crate::error::CompileError;
use crate::model::{Annotation, ArrayType, TypeKind, ValueType};
use crate::providers::{
    BLOCK_CATEGORY, ENCHANTMENT_CATEGORY, FONT_CATEGORY, ITEM_CATEGORY, POTION_EFFECT_CATEGORY,
    SPECIAL_ENTITY_CATEGORY,
};
use crate::types::{definition_ref, SemanticKind};

/// Schema keywords, type label and constraint notes for one field.
pub(crate) struct Shape {
    pub(crate) node: Map<String, Value>,
    pub(crate) label: String,
    pub(crate) notes: Vec<String>,
}

impl Shape {
    fn new(label: impl Into<String>) -> Self {
        Self {
            node: Map::new(),
            label: label.into(),
            notes: Vec::new(),
        }
    }
}

/// Origin of the legal values of a string field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StringSource<'a> {
    Registry(&'a str),
    BlockType,
    ItemType,
    SpecialEntity,
    Font,
    Enchantment,
    Function(&'a str),
    PotionEffect,
    Enum(&'a str),
    LegacyEnum(&'a str),
}

impl StringSource<'_> {
    /// Lower ranks win when a field carries more than one source.
    pub(crate) fn priority(&self) -> u8 {
        match self {
            StringSource::Registry(_) => 0,
            StringSource::BlockType => 1,
            StringSource::ItemType => 2,
            StringSource::SpecialEntity => 3,
            StringSource::Font => 4,
            StringSource::Enchantment => 5,
            StringSource::Function(_) => 6,
            StringSource::PotionEffect => 7,
            StringSource::Enum(_) => 8,
            StringSource::LegacyEnum(_) => 9,
        }
    }
}

/// A resolved catalog reference.
struct Catalogued {
    reference: String,
    label: String,
    list_label: String,
    note: String,
}

impl Catalogued {
    fn fixed(reference: String, label: &str, plural: &str) -> Self {
        Self {
            reference,
            label: label.to_string(),
            list_label: format!("List of {}", plural),
            note: valid_note(label),
        }
    }
}

pub(crate) fn valid_note(label: &str) -> String {
    format!("Must be a valid {} (use ctrl+space for auto complete!)", label)
}

impl<'a> Compilation<'a> {
    /// Classify a declared value type.
    pub(crate) fn classify(&mut self, value_type: &ValueType, site: FieldSite<'a>) -> SemanticKind {
        match value_type {
            ValueType::Integer | ValueType::Long => SemanticKind::Integer,
            ValueType::Float | ValueType::Double => SemanticKind::Number,
            ValueType::Boolean => SemanticKind::Boolean,
            ValueType::Text | ValueType::PotionEffect | ValueType::Enchantment => {
                SemanticKind::String
            }
            ValueType::List => SemanticKind::Array,
            ValueType::Map => SemanticKind::Object,
            ValueType::Named(name) => {
                let model = self.model;
                match model.lookup(name) {
                    Some(ty) if ty.is_enumerable() => SemanticKind::String,
                    Some(ty) => {
                        if ty.description.is_none() && self.options.is_user_type(name) {
                            self.diagnostics.warn(
                                &site.owner.name,
                                Some(&site.field.name),
                                format!("Unsupported Type: {} Did you forget a description?", name),
                            );
                        }
                        SemanticKind::Object
                    }
                    // Resolved (and reported) when the object is visited.
                    None => SemanticKind::Object,
                }
            }
        }
    }

    /// Build the schema keywords of a field of the given kind.
    pub(crate) fn dispatch(
        &mut self,
        kind: SemanticKind,
        site: FieldSite<'a>,
    ) -> Result<Shape, CompileError> {
        let field = site.field;
        let shape = match kind {
            SemanticKind::Boolean => Shape::new("Boolean"),
            SemanticKind::Integer => {
                // Fractional bounds are tightened to the nearest integer inside them.
                let mut shape = Shape::new("Integer");
                if let Some(min) = field.min_bound() {
                    let min = min.ceil() as i64;
                    shape.node.insert("minimum".to_string(), json!(min));
                    shape.notes.push(format!("* Minimum allowed is {}", min));
                }
                if let Some(max) = field.max_bound() {
                    let max = max.floor() as i64;
                    shape.node.insert("maximum".to_string(), json!(max));
                    shape.notes.push(format!("* Maximum allowed is {}", max));
                }
                shape
            }
            SemanticKind::Number => {
                let mut shape = Shape::new("Number");
                if let Some(min) = field.min_bound() {
                    shape.node.insert("minimum".to_string(), json!(min));
                    shape.notes.push(format!("* Minimum allowed is {}", min));
                }
                if let Some(max) = field.max_bound() {
                    shape.node.insert("maximum".to_string(), json!(max));
                    shape.notes.push(format!("* Maximum allowed is {}", max));
                }
                shape
            }
            SemanticKind::String => self.string_shape(site),
            SemanticKind::Object => self.object_shape(site)?,
            SemanticKind::Array => self.array_shape(site)?,
        };
        Ok(shape)
    }

    fn string_shape(&mut self, site: FieldSite<'a>) -> Shape {
        let field = site.field;
        if let Some(source) = self.string_source(&field.value_type, site) {
            if let Some(catalogued) = self.catalogue(source, site) {
                let mut shape = Shape::new(catalogued.label);
                shape
                    .node
                    .insert("$ref".to_string(), json!(catalogued.reference));
                shape.notes.push(catalogued.note);
                return shape;
            }
        }

        let mut shape = Shape::new("Text");
        if let Some(min) = field.min_bound() {
            let min = min.max(0.0).ceil() as u64;
            shape.node.insert("minLength".to_string(), json!(min));
            shape.notes.push(format!("* Minimum Length allowed is {}", min));
        }
        if let Some(max) = field.max_bound() {
            let max = max.max(0.0).floor() as u64;
            shape.node.insert("maxLength".to_string(), json!(max));
            shape.notes.push(format!("* Maximum Length allowed is {}", max));
        }
        shape
    }

    fn object_shape(&mut self, site: FieldSite<'a>) -> Result<Shape, CompileError> {
        match &site.field.value_type {
            ValueType::Named(name) => {
                let reference = self.object_reference(name, || site.path())?;
                let mut shape = Shape::new(format!("{} (Object)", self.options.label(name)));
                shape.node.insert("$ref".to_string(), json!(reference));
                Ok(shape)
            }
            _ => Ok(Shape::new("Map")),
        }
    }

    fn array_shape(&mut self, site: FieldSite<'a>) -> Result<Shape, CompileError> {
        let field = site.field;
        let Some(array) = field.array_type() else {
            self.diagnostics.warn(
                &site.owner.name,
                Some(&field.name),
                format!(
                    "Undefined array type for field {} ({}) in class {}",
                    field.name,
                    field.value_type,
                    crate::types::simple_name(&site.owner.name)
                ),
            );
            return Ok(Shape::new("List of Something...?"));
        };

        let mut shape = Shape::new("List of Something...?");
        if array.min > 0 {
            shape
                .node
                .insert("minItems".to_string(), json!(array.min));
            if array.min == 1 {
                shape.notes.push(
                    "* At least one entry must be defined, or just remove this list.".to_string(),
                );
            } else {
                shape
                    .notes
                    .push(format!("* Requires at least {} entries.", array.min));
            }
        }

        let element_kind = self.classify(&array.element, site);
        let items = match element_kind {
            SemanticKind::Integer => {
                shape.label = "List of Integers".to_string();
                Some(json!({ "type": "integer" }))
            }
            SemanticKind::Number => {
                shape.label = "List of Numbers".to_string();
                Some(json!({ "type": "number" }))
            }
            SemanticKind::Boolean => {
                shape.label = "List of Booleans".to_string();
                Some(json!({ "type": "boolean" }))
            }
            SemanticKind::String => Some(self.string_items(array, site, &mut shape)),
            SemanticKind::Object => match &array.element {
                ValueType::Named(name) => {
                    let reference = self.object_reference(name, || site.path())?;
                    shape.label = format!("List of {}s (Objects)", self.options.label(name));
                    Some(json!({ "$ref": reference }))
                }
                _ => {
                    shape.label = "List of Maps".to_string();
                    Some(json!({ "type": "object" }))
                }
            },
            SemanticKind::Array => {
                self.diagnostics.warn(
                    &site.owner.name,
                    Some(&field.name),
                    format!(
                        "Unrecognized array element type {} for field {} in class {}",
                        array.element,
                        field.name,
                        crate::types::simple_name(&site.owner.name)
                    ),
                );
                None
            }
        };

        if let Some(items) = items {
            shape.node.insert("items".to_string(), items);
        }
        Ok(shape)
    }

    fn string_items(&mut self, array: &'a ArrayType, site: FieldSite<'a>, shape: &mut Shape) -> Value {
        if let Some(source) = self.string_source(&array.element, site) {
            if let Some(catalogued) = self.catalogue(source, site) {
                shape.label = catalogued.list_label;
                shape.notes.push(catalogued.note);
                return json!({ "$ref": catalogued.reference });
            }
        }
        shape.label = "List of Text".to_string();
        json!({ "type": "string" })
    }

    /// Pick the highest-priority value source for a string of `value_type`.
    pub(crate) fn string_source(
        &self,
        value_type: &'a ValueType,
        site: FieldSite<'a>,
    ) -> Option<StringSource<'a>> {
        let from_annotations = site.field.annotations.iter().filter_map(|a| match a {
            Annotation::Registry(category) => Some(StringSource::Registry(category)),
            Annotation::BlockType => Some(StringSource::BlockType),
            Annotation::ItemType => Some(StringSource::ItemType),
            Annotation::SpecialEntity => Some(StringSource::SpecialEntity),
            Annotation::Font => Some(StringSource::Font),
            Annotation::Enchantment => Some(StringSource::Enchantment),
            Annotation::ListFunction(name) => Some(StringSource::Function(name)),
            Annotation::Required
            | Annotation::MinNumber(_)
            | Annotation::MaxNumber(_)
            | Annotation::ArrayType(_) => None,
        });

        let model = self.model;
        let from_type = match value_type {
            ValueType::PotionEffect => Some(StringSource::PotionEffect),
            ValueType::Enchantment => Some(StringSource::Enchantment),
            ValueType::Named(name) => model.lookup(name).and_then(|ty| match ty.kind {
                TypeKind::Enum => Some(StringSource::Enum(name)),
                TypeKind::LegacyEnum => Some(StringSource::LegacyEnum(name)),
                TypeKind::Object => None,
            }),
            _ => None,
        };

        from_annotations
            .chain(from_type)
            .min_by_key(StringSource::priority)
    }

    /// Resolve a source into a memoized definition.
    ///
    /// Returns `None` (after warning) when the source cannot be resolved; the
    /// field then stays a plain string.
    fn catalogue(&mut self, source: StringSource<'a>, site: FieldSite<'a>) -> Option<Catalogued> {
        let catalogued = match source {
            StringSource::Registry(category) => {
                let reference = self.catalog_reference(&format!("erz{}", category), category, site)?;
                let display = self
                    .registries
                    .display_name(category)
                    .unwrap_or_else(|| category.to_string());
                Catalogued {
                    reference,
                    list_label: format!("List<{}>", display),
                    note: valid_note(&display),
                    label: display,
                }
            }
            StringSource::BlockType => Catalogued::fixed(
                self.catalog_reference("enum-block-type", BLOCK_CATEGORY, site)?,
                "Block Type",
                "Block Types",
            ),
            StringSource::ItemType => Catalogued::fixed(
                self.catalog_reference("enum-item-type", ITEM_CATEGORY, site)?,
                "Item Type",
                "Item Types",
            ),
            StringSource::SpecialEntity => Catalogued::fixed(
                self.catalog_reference("enum-reg-specialentity", SPECIAL_ENTITY_CATEGORY, site)?,
                "Special Entity Type",
                "Special Entity Types",
            ),
            StringSource::Font => Catalogued::fixed(
                self.catalog_reference("enum-font", FONT_CATEGORY, site)?,
                "Font Family",
                "Font Families",
            ),
            StringSource::Enchantment => Catalogued::fixed(
                self.catalog_reference("enum-enchantment", ENCHANTMENT_CATEGORY, site)?,
                "Enchantment Type",
                "Enchantment Types",
            ),
            StringSource::PotionEffect => Catalogued::fixed(
                self.catalog_reference("enum-potion-effect-type", POTION_EFFECT_CATEGORY, site)?,
                "Potion Effect Type",
                "Potion Effect Types",
            ),
            StringSource::Function(name) => return self.function_reference(name, site),
            StringSource::Enum(name) | StringSource::LegacyEnum(name) => {
                let model = self.model;
                let ty = model.lookup(name)?;
                let (reference, label) = self.enum_reference(ty);
                Catalogued {
                    reference,
                    list_label: format!("List of {}s", label),
                    note: valid_note(&label),
                    label,
                }
            }
        };
        Some(catalogued)
    }

    /// Memoize the identifiers of a registry category under `key`.
    fn catalog_reference(&mut self, key: &str, category: &str, site: FieldSite<'a>) -> Option<String> {
        if self.definitions.contains(key) {
            return Some(definition_ref(key));
        }
        match self.registries.lookup(category) {
            Some(values) => Some(
                self.definitions
                    .get_or_insert_with(key, || json!({ "enum": values })),
            ),
            None => {
                self.diagnostics.warn(
                    &site.declaring.name,
                    Some(&site.field.name),
                    format!(
                        "Cannot find registry '{}' used in {} in field {}",
                        category, site.declaring.name, site.field.name
                    ),
                );
                None
            }
        }
    }

    fn function_reference(&mut self, name: &str, site: FieldSite<'a>) -> Option<Catalogued> {
        let Some(function) = self.functions.and_then(|f| f.get(name)) else {
            self.diagnostics.warn(
                &site.declaring.name,
                Some(&site.field.name),
                format!(
                    "Unknown list function '{}' used in {} in field {}",
                    name, site.declaring.name, site.field.name
                ),
            );
            return None;
        };

        let key = function.key();
        let label = function.fancy_name();
        if !self.definitions.contains(&key) {
            match function.apply(self.registries) {
                Ok(values) => {
                    self.definitions
                        .get_or_insert_with(&key, || json!({ "enum": values }));
                }
                Err(message) => {
                    self.diagnostics.warn(
                        &site.declaring.name,
                        Some(&site.field.name),
                        format!("Could not evaluate list function '{}': {}", name, message),
                    );
                    return None;
                }
            }
        }

        Some(Catalogued {
            reference: definition_ref(&key),
            list_label: format!("List<{}>", label),
            note: valid_note(&label),
            label,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_follows_declaration_order() {
        let order = [
            StringSource::Registry("biomes"),
            StringSource::BlockType,
            StringSource::ItemType,
            StringSource::SpecialEntity,
            StringSource::Font,
            StringSource::Enchantment,
            StringSource::Function("f"),
            StringSource::PotionEffect,
            StringSource::Enum("com.example.Mode"),
            StringSource::LegacyEnum("com.example.Old"),
        ];
        for pair in order.windows(2) {
            assert!(pair[0].priority() < pair[1].priority());
        }
    }

    #[test]
    fn min_by_priority_keeps_first_of_equals() {
        let sources = [
            StringSource::Font,
            StringSource::Registry("first"),
            StringSource::Registry("second"),
        ];
        let best = sources.iter().copied().min_by_key(StringSource::priority);
        assert_eq!(best, Some(StringSource::Registry("first")));
    }

    #[test]
    fn valid_note_text() {
        assert_eq!(
            valid_note("Block Type"),
            "Must be a valid Block Type (use ctrl+space for auto complete!)"
        );
    }
}

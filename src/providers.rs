//! External value sources consulted during compilation.
//!
//! The compiler never scans disk or the host runtime itself. Identifier sets
//! for registry-backed fields, alternative (snippet) names and list functions
//! are supplied through the traits in this module. [`Catalog`] is a plain
//! in-memory implementation that can be loaded from JSON.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Host block identifiers.
pub const BLOCK_CATEGORY: &str = "block";
/// Host item identifiers.
pub const ITEM_CATEGORY: &str = "item";
/// Special (plugin-provided) entity identifiers.
pub const SPECIAL_ENTITY_CATEGORY: &str = "special-entity";
/// Font family names.
pub const FONT_CATEGORY: &str = "font";
/// Enchantment identifiers.
pub const ENCHANTMENT_CATEGORY: &str = "enchantment";
/// Potion effect type identifiers.
pub const POTION_EFFECT_CATEGORY: &str = "potion-effect";

/// Supplies identifier sets by category.
pub trait RegistryResolver {
    /// Ordered identifiers of `category`, or `None` if the category is unknown.
    fn lookup(&self, category: &str) -> Option<Vec<String>>;

    /// Human name of a resource category (e.g. `Biome` for `biomes`).
    fn display_name(&self, _category: &str) -> Option<String> {
        None
    }
}

/// Supplies known alternative identifiers for a snippet category.
pub trait SnippetProvider {
    fn snippets(&self, category: &str) -> Vec<String>;
}

/// A pluggable source of enumeration values for string fields.
pub trait ListFunction {
    /// Definition key the values are memoized under.
    fn key(&self) -> String;

    /// Type label shown in field documentation.
    fn fancy_name(&self) -> String;

    /// Compute the values.
    fn apply(&self, registries: &dyn RegistryResolver) -> Result<Vec<String>, String>;
}

/// List functions addressable by name from field annotations.
#[derive(Default)]
pub struct FunctionSet {
    functions: HashMap<String, Box<dyn ListFunction>>,
}

impl FunctionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, function: impl ListFunction + 'static) {
        self.functions.insert(name.into(), Box::new(function));
    }

    pub fn with(mut self, name: impl Into<String>, function: impl ListFunction + 'static) -> Self {
        self.register(name, function);
        self
    }

    pub fn get(&self, name: &str) -> Option<&dyn ListFunction> {
        self.functions.get(name).map(|f| f.as_ref())
    }
}

impl fmt::Debug for FunctionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.functions.keys().collect();
        names.sort();
        f.debug_struct("FunctionSet").field("functions", &names).finish()
    }
}

/// In-memory registries and snippets.
///
/// JSON form:
/// ```json
/// {
///   "registries": { "biomes": ["plains", "desert"], "block": ["stone"] },
///   "display_names": { "biomes": "Biome" },
///   "snippets": { "noise": ["simplex-small"] }
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub registries: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub display_names: HashMap<String, String>,
    #[serde(default)]
    pub snippets: HashMap<String, Vec<String>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry<I, S>(mut self, category: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.registries
            .insert(category.into(), values.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_display_name(
        mut self,
        category: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        self.display_names.insert(category.into(), name.into());
        self
    }

    pub fn snippet<I, S>(mut self, category: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.snippets
            .insert(category.into(), values.into_iter().map(Into::into).collect());
        self
    }
}

impl RegistryResolver for Catalog {
    fn lookup(&self, category: &str) -> Option<Vec<String>> {
        self.registries.get(category).cloned()
    }

    fn display_name(&self, category: &str) -> Option<String> {
        self.display_names.get(category).cloned()
    }
}

impl SnippetProvider for Catalog {
    fn snippets(&self, category: &str) -> Vec<String> {
        self.snippets.get(category).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Dimensions;

    impl ListFunction for Dimensions {
        fn key(&self) -> String {
            "enum-dimension-names".into()
        }

        fn fancy_name(&self) -> String {
            "Dimension".into()
        }

        fn apply(&self, registries: &dyn RegistryResolver) -> Result<Vec<String>, String> {
            registries
                .lookup("dimensions")
                .ok_or_else(|| "no dimensions registry".to_string())
        }
    }

    #[test]
    fn catalog_lookup() {
        let catalog = Catalog::new()
            .registry("biomes", ["plains", "desert"])
            .with_display_name("biomes", "Biome")
            .snippet("noise", ["simplex"]);

        assert_eq!(
            catalog.lookup("biomes"),
            Some(vec!["plains".to_string(), "desert".to_string()])
        );
        assert_eq!(catalog.lookup("regions"), None);
        assert_eq!(catalog.display_name("biomes").as_deref(), Some("Biome"));
        assert_eq!(catalog.snippets("noise"), vec!["simplex".to_string()]);
        assert!(catalog.snippets("missing").is_empty());
    }

    #[test]
    fn catalog_from_json() {
        let catalog: Catalog = serde_json::from_value(json!({
            "registries": { "block": ["stone", "dirt"] },
            "snippets": { "noise": ["a", "b"] }
        }))
        .unwrap();
        assert_eq!(catalog.lookup(BLOCK_CATEGORY).map(|v| v.len()), Some(2));
        assert!(catalog.display_names.is_empty());
        assert_eq!(catalog.snippets("noise").len(), 2);
    }

    #[test]
    fn function_set_lookup() {
        let functions = FunctionSet::new().with("dimensions", Dimensions);
        let function = functions.get("dimensions").unwrap();
        assert_eq!(function.key(), "enum-dimension-names");

        let catalog = Catalog::new().registry("dimensions", ["overworld"]);
        assert_eq!(function.apply(&catalog), Ok(vec!["overworld".to_string()]));
        assert!(function.apply(&Catalog::new()).is_err());
        assert!(functions.get("missing").is_none());
    }
}

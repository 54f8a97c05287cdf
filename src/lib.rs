//! Descriptor Schema Compiler
//!
//! Compiles statically declared configuration type descriptors into
//! documented JSON Schema (draft-07) documents.
//!
//! Each configuration type is described by a [`TypeDescriptor`]: its fields in
//! declaration order, their declared value types and annotations (required,
//! numeric bounds, list element types, value catalogs). The compiler walks the
//! type graph from a root type and emits one document with every nested
//! object, enumeration and catalog stored once under `definitions`.
//!
//! # Example
//!
//! ```
//! use descriptor_schema::{
//!     Catalog, CompileOptions, DescriptorTable, FieldDescriptor, SchemaCompiler,
//!     TypeDescriptor, ValueType,
//! };
//!
//! let table = DescriptorTable::new()
//!     .with(
//!         TypeDescriptor::object("com.example.Biome")
//!             .describe("A biome")
//!             .field(
//!                 FieldDescriptor::new("rarity", ValueType::Integer)
//!                     .describe("How rare the biome is")
//!                     .required()
//!                     .min(1.0)
//!                     .max(100.0),
//!             )
//!             .field(
//!                 FieldDescriptor::new("layers", ValueType::List)
//!                     .describe("Ground layers")
//!                     .array_of(ValueType::named("com.example.Layer"), 1),
//!             ),
//!     )
//!     .with(
//!         TypeDescriptor::object("com.example.Layer")
//!             .describe("A ground layer")
//!             .field(
//!                 FieldDescriptor::new("block", ValueType::Text)
//!                     .describe("Block to place")
//!                     .registry("block"),
//!             ),
//!     );
//!
//! let catalog = Catalog::new().registry("block", ["stone", "dirt"]);
//! let options = CompileOptions::new("com.example.");
//!
//! let compiled = SchemaCompiler::new(&table)
//!     .registries(&catalog)
//!     .options(&options)
//!     .compile("com.example.Biome")
//!     .unwrap();
//!
//! let doc = &compiled.document;
//! assert_eq!(doc["required"][0], "rarity");
//! assert_eq!(doc["properties"]["rarity"]["maximum"], 100);
//! assert_eq!(
//!     doc["properties"]["layers"]["items"]["$ref"],
//!     "#/definitions/obj-com-example-layer"
//! );
//! assert!(compiled.definition("erzblock").is_some());
//! ```
//!
//! # Field Rules
//!
//! | Declared type | Kind | Refinements |
//! |---------------|------|-------------|
//! | integer, long | `integer` | `minimum`/`maximum` |
//! | float, double | `number` | `minimum`/`maximum` |
//! | boolean | `boolean` | none |
//! | text, enum, potion effect, enchantment | `string` | length bounds or a catalog `$ref` |
//! | list | `array` | `minItems`, `items` by element type |
//! | map | `object` | none |
//! | other described type | `object` | `$ref` to its definition |
//!
//! Missing documentation and unresolvable catalogs never fail a compilation;
//! they are collected as [`Warning`]s on the [`CompiledSchema`].

mod compiler;
mod definitions;
mod diagnostics;
mod dispatch;
mod enums;
mod error;
mod loader;
mod model;
mod providers;
mod snippet;
mod types;
mod validator;

pub use compiler::{compile, CompiledSchema, SchemaCompiler};
pub use diagnostics::{report, Diagnostics, Warning};
pub use enums::{enum_definition, enum_key};
pub use error::{CompileError, LoadError, SchemaError, ValidateError};
pub use loader::{load_catalog, load_json, load_model, load_model_str};
pub use model::{
    Annotation, ArrayType, DescriptorTable, Enumerant, FieldDescriptor, TypeDescriptor, TypeKind,
    TypeModel, ValueType,
};
pub use providers::{
    Catalog, FunctionSet, ListFunction, RegistryResolver, SnippetProvider, BLOCK_CATEGORY,
    ENCHANTMENT_CATEGORY, FONT_CATEGORY, ITEM_CATEGORY, POTION_EFFECT_CATEGORY,
    SPECIAL_ENTITY_CATEGORY,
};
pub use snippet::snippet_key;
pub use types::{CompileOptions, SemanticKind, DEFAULT_ID_BASE, SCHEMA_DRAFT};
pub use validator::{check_refs, validate_instance};

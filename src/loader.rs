//! Loading descriptor tables, catalogs and JSON documents from disk.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::LoadError;
use crate::model::DescriptorTable;
use crate::providers::Catalog;

fn read(path: &Path) -> Result<String, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    std::fs::read_to_string(path).map_err(|source| LoadError::ReadError {
        path: path.to_path_buf(),
        source,
    })
}

/// Deserialize `content`, reporting the failing path on shape errors.
fn parse<T: DeserializeOwned>(content: &str) -> Result<T, LoadError> {
    // Syntax errors are reported as plain JSON errors.
    let value: Value =
        serde_json::from_str(content).map_err(|source| LoadError::InvalidJson { source })?;

    serde_path_to_error::deserialize(value).map_err(|e| {
        let path = e.path().to_string();
        LoadError::InvalidDescriptor {
            path,
            message: e.into_inner().to_string(),
        }
    })
}

/// Load any JSON document from a file.
///
/// # Errors
///
/// Returns `LoadError::FileNotFound` if the file doesn't exist,
/// or `LoadError::InvalidJson` if the file isn't valid JSON.
pub fn load_json(path: &Path) -> Result<Value, LoadError> {
    let content = read(path)?;
    serde_json::from_str(&content).map_err(|source| LoadError::InvalidJson { source })
}

/// Load a descriptor table from a file.
pub fn load_model(path: &Path) -> Result<DescriptorTable, LoadError> {
    load_model_str(&read(path)?)
}

/// Load a descriptor table from a JSON string.
///
/// # Errors
///
/// Returns `LoadError::InvalidJson` for syntax errors and
/// `LoadError::InvalidDescriptor` when the JSON doesn't describe a table.
pub fn load_model_str(content: &str) -> Result<DescriptorTable, LoadError> {
    parse(content)
}

/// Load a registry/snippet catalog from a file.
pub fn load_catalog(path: &Path) -> Result<Catalog, LoadError> {
    parse(&read(path)?)
}

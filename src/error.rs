//! Error types for schema compilation, model loading and validation.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a compilation.
///
/// These indicate a misconfigured caller (a broken descriptor table), never a
/// data problem; data problems become warnings.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("unknown type '{name}' referenced by {referenced_by}")]
    UnknownType { name: String, referenced_by: String },

    #[error("root type '{name}' is a {kind}, expected an object type")]
    InvalidRoot { name: String, kind: String },
}

impl CompileError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

/// Errors while loading descriptor tables, catalogs and JSON documents.
#[derive(Debug, Error)]
pub enum LoadError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid descriptor at {path}: {message}")]
    InvalidDescriptor { path: String, message: String },
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            _ => 2,
        }
    }
}

/// Errors during validation of a configuration instance.
#[derive(Debug, Error)]
pub enum ValidateError {
    #[error("invalid schema: {message}")]
    Schema { message: String },

    #[error("validation failed with {} error(s)", errors.len())]
    Invalid { errors: Vec<SchemaError> },
}

/// Single validation error with path context.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SchemaError {
    /// JSON Pointer (RFC 6901) to the invalid field.
    pub path: String,
    /// Human-readable error message.
    pub message: String,
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

impl ValidateError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ValidateError::Schema { .. } => 2,
            ValidateError::Invalid { .. } => 1,
        }
    }
}

//! Error types for loading action trees

use std::path::PathBuf;
use thiserror::Error;

/// Structural errors raised while turning a document into an action tree.
///
/// Any of these aborts the whole parse; no partial tree is ever produced.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),

    /// A field holds a value of the wrong JSON type
    #[error("Expected {expected} for `{field}`, found {found}")]
    UnexpectedType {
        field: String,
        expected: &'static str,
        found: String,
    },

    /// Fields left over after all known fields were consumed
    #[error("Invalid elements in `{node}`: {}", fields.join(", "))]
    UnknownFields { node: String, fields: Vec<String> },

    #[error("Invalid key stroke: {0}")]
    InvalidKeyStroke(String),
}

/// Errors raised while loading a document from disk
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}

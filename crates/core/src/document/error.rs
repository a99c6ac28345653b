//! Error types for the document module.

use std::path::PathBuf;
use thiserror::Error;

use crate::bencode::CodecError;

/// Errors that can occur while loading, editing or saving a document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The document file does not exist or cannot be read.
    #[error("Document not found or unreadable: {path}")]
    NotFound { path: PathBuf },

    /// The file content is not a single bencoded dictionary.
    #[error("Malformed document {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: CodecError,
    },

    /// A key along a lookup path is absent or not a dictionary.
    #[error("Missing field '{field}': {reason}")]
    MissingField { field: String, reason: String },

    /// A field path with no keys was given.
    #[error("Field path is empty")]
    EmptyPath,

    /// Reading or writing the file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DocumentError {
    /// Creates a missing field error.
    pub fn missing_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates an I/O error for the given path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

//! Error types for the bencode module.

use thiserror::Error;

/// Errors that can occur while decoding bencoded data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The input violates the bencode grammar.
    #[error("Malformed value at byte {offset}: {reason}")]
    MalformedValue { offset: usize, reason: String },
}

impl CodecError {
    /// Creates a new malformed value error.
    pub fn malformed(offset: usize, reason: impl Into<String>) -> Self {
        Self::MalformedValue {
            offset,
            reason: reason.into(),
        }
    }

    /// Byte offset in the input where decoding failed.
    pub fn offset(&self) -> usize {
        match self {
            Self::MalformedValue { offset, .. } => *offset,
        }
    }
}

//! Error types for the persistence collaborators.

use std::path::PathBuf;

/// Errors raised by document and object stores.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A document with the same id already exists.
    #[error("duplicate id {id} in {collection}")]
    Duplicate { collection: String, id: String },

    /// The document to replace does not exist.
    #[error("no document {id} in {collection}")]
    Missing { collection: String, id: String },

    /// A document could not be converted to or from JSON.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backend is not reachable.
    #[error("store unavailable: {reason}")]
    Unavailable { reason: String },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An object id or path was rejected.
    #[error("invalid object {path}: {reason}")]
    InvalidObject { path: PathBuf, reason: String },
}

impl StoreError {
    /// Creates a new store unavailable error.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Creates a new invalid object error.
    pub fn invalid_object(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidObject {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if this is a transient error that might succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

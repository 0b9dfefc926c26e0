//! Error types for the backend layer.
//!
//! Apart from `TypeMismatch`, every variant here means the host storage could
//! not complete a whole document load or save. A missing key is never an
//! error at this level or any level above it.

use std::io;
use std::path::PathBuf;

/// Errors raised by a [`DurableBackend`](crate::DurableBackend).
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Generic I/O failure: storage unavailable, permission denied, disk full.
    #[error("storage unavailable: {0}")]
    Io(#[from] io::Error),

    /// A value could not be encoded in the backend's native format.
    #[error("could not serialize document: {message}")]
    Serialization { message: String },

    /// The persisted bytes could not be decoded into a document.
    #[error("persisted document is corrupt: {message}")]
    Corrupt { message: String },

    /// A stored value does not have the shape the caller asked for.
    #[error("stored value has the wrong type: {message}")]
    TypeMismatch { message: String },

    /// The document is larger than the backend accepts.
    #[error("quota exceeded: document has {requested} entries, limit is {limit}")]
    QuotaExceeded { limit: usize, requested: usize },

    /// The backend's storage location can't be used.
    #[error("invalid storage location {}: {error}", .path.display())]
    InvalidLocation { path: PathBuf, error: io::Error },

    /// Generic error with message.
    #[error("{message}")]
    Other { message: String },
}

impl BackendError {
    pub fn serialization(message: impl Into<String>) -> Self {
        BackendError::Serialization {
            message: message.into(),
        }
    }

    pub fn corrupt(message: impl Into<String>) -> Self {
        BackendError::Corrupt {
            message: message.into(),
        }
    }

    pub fn type_mismatch(message: impl Into<String>) -> Self {
        BackendError::TypeMismatch {
            message: message.into(),
        }
    }
}

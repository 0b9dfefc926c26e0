//! Error types for the facade layer.

use mirrorstore_backend::BackendError;

/// Errors returned by mirror operations.
///
/// A missing key is not an error: reads return `None` and removing an absent
/// key succeeds without touching the backend.
#[derive(Debug, thiserror::Error)]
pub enum MirrorError {
    /// The backend failed to load or save the document.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// A stored value could not be decoded into the requested type.
    #[error("could not decode value at '{key}': {message}")]
    Decode { key: String, message: String },

    /// A value could not be encoded for storage.
    #[error("could not encode value for '{key}': {message}")]
    Encode { key: String, message: String },

    /// Another thread panicked while holding the mirror lock.
    #[error("mirror lock poisoned")]
    LockPoisoned,
}

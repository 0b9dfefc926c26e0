//! Async version of the Durable Backend contract.
//!
//! Enable the `async` feature to use these traits:
//!
//! ```toml
//! [dependencies]
//! mirrorstore-backend = { version = "0.1", features = ["async"] }
//! ```

use async_trait::async_trait;

use crate::{BackendError, Document, DurableBackend};

/// Async version of `DurableBackend`.
///
/// Useful when the host storage is reached over the network or through
/// async file I/O.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Box<dyn AsyncDurableBackend>`.
#[async_trait]
pub trait AsyncDurableBackend: Send + Sync {
    /// Load the full persisted document, empty if nothing was ever saved.
    async fn load_async(&mut self) -> Result<Document, BackendError>;

    /// Atomically replace the persisted document with `doc`.
    async fn save_async(&mut self, doc: &Document) -> Result<(), BackendError>;
}

// Blanket implementations for references and boxes

#[async_trait]
impl<T: AsyncDurableBackend + ?Sized> AsyncDurableBackend for &mut T {
    async fn load_async(&mut self) -> Result<Document, BackendError> {
        (*self).load_async().await
    }

    async fn save_async(&mut self, doc: &Document) -> Result<(), BackendError> {
        (*self).save_async(doc).await
    }
}

#[async_trait]
impl<T: AsyncDurableBackend + ?Sized> AsyncDurableBackend for Box<T> {
    async fn load_async(&mut self) -> Result<Document, BackendError> {
        self.as_mut().load_async().await
    }

    async fn save_async(&mut self, doc: &Document) -> Result<(), BackendError> {
        self.as_mut().save_async(doc).await
    }
}

/// Adapter to wrap a sync backend for async use.
///
/// This wraps the backend in a Mutex for thread-safe access. Clones share the
/// same backend. For backends with real async I/O, implement
/// `AsyncDurableBackend` directly.
///
/// # Example
///
/// ```rust,ignore
/// use mirrorstore_backend::{InMemoryBackend, SyncToAsync};
///
/// let async_backend = SyncToAsync::new(InMemoryBackend::new());
/// ```
pub struct SyncToAsync<T> {
    inner: std::sync::Arc<std::sync::Mutex<T>>,
}

impl<T> SyncToAsync<T> {
    /// Create a new adapter wrapping a sync backend.
    pub fn new(inner: T) -> Self {
        Self {
            inner: std::sync::Arc::new(std::sync::Mutex::new(inner)),
        }
    }

    /// Get a reference to the inner mutex.
    pub fn inner(&self) -> &std::sync::Mutex<T> {
        &self.inner
    }
}

impl<T> Clone for SyncToAsync<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

fn poisoned() -> BackendError {
    BackendError::Other {
        message: "lock poisoned".into(),
    }
}

#[async_trait]
impl<T: DurableBackend + 'static> AsyncDurableBackend for SyncToAsync<T> {
    async fn load_async(&mut self) -> Result<Document, BackendError> {
        let mut guard = self.inner.lock().map_err(|_| poisoned())?;
        guard.load()
    }

    async fn save_async(&mut self, doc: &Document) -> Result<(), BackendError> {
        let mut guard = self.inner.lock().map_err(|_| poisoned())?;
        guard.save(doc)
    }
}

//! Async version of the store facade.
//!
//! Enable the `async` feature to use it:
//!
//! ```toml
//! [dependencies]
//! mirrorstore = { version = "0.1", features = ["async"] }
//! ```

use mirrorstore_backend::{AsyncDurableBackend, Document, Value};

use crate::MirrorError;

/// Async version of [`Mirror`](crate::Mirror).
///
/// Same semantics: every mutation awaits the backend save before it returns,
/// and a failed save rolls the in-memory change back.
///
/// # Example
///
/// ```rust,ignore
/// use mirrorstore::{AsyncMirror, InMemoryBackend, SyncToAsync};
///
/// let mut mirror = AsyncMirror::open(SyncToAsync::new(InMemoryBackend::new())).await?;
/// mirror.set("test", 123).await?;
/// ```
#[derive(Debug)]
pub struct AsyncMirror<B> {
    backend: B,
    entries: Document,
}

impl<B: AsyncDurableBackend> AsyncMirror<B> {
    pub async fn open(mut backend: B) -> Result<Self, MirrorError> {
        let entries = backend.load_async().await?;
        tracing::debug!(entries = entries.len(), "async mirror loaded");
        Ok(Self { backend, entries })
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub async fn set(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<(), MirrorError> {
        let key = key.into();
        let previous = self.entries.insert(key.clone(), value.into());

        if let Err(error) = self.backend.save_async(&self.entries).await {
            tracing::warn!(key = %key, %error, "save failed, rolling back set");
            match previous {
                Some(old) => {
                    self.entries.insert(key, old);
                }
                None => {
                    self.entries.remove(&key);
                }
            }
            return Err(error.into());
        }

        tracing::debug!(key = %key, entries = self.entries.len(), "set persisted");
        Ok(())
    }

    pub async fn remove(&mut self, key: &str) -> Result<Option<Value>, MirrorError> {
        let Some(previous) = self.entries.remove(key) else {
            return Ok(None);
        };

        if let Err(error) = self.backend.save_async(&self.entries).await {
            tracing::warn!(key = %key, %error, "save failed, rolling back remove");
            self.entries.insert(key.to_string(), previous);
            return Err(error.into());
        }

        tracing::debug!(key = %key, entries = self.entries.len(), "remove persisted");
        Ok(Some(previous))
    }

    pub async fn refresh(&mut self) -> Result<(), MirrorError> {
        self.entries = self.backend.load_async().await?;
        tracing::debug!(entries = self.entries.len(), "async mirror refreshed");
        Ok(())
    }

    pub async fn clear(&mut self) -> Result<(), MirrorError> {
        self.backend.save_async(&Document::new()).await?;
        self.entries.clear();
        self.refresh().await
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn snapshot(&self) -> Document {
        self.entries.clone()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

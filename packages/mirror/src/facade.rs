//! The store facade.

use mirrorstore_backend::{Document, DurableBackend, Value};

use crate::MirrorError;

/// In-memory mirror of a backend's document with write-through mutations.
///
/// The document is loaded once by [`Mirror::open`]; from then on reads are
/// served from memory. Every mutation saves the whole document and only
/// returns once that save has completed. A failed save undoes the in-memory
/// change before the error is returned, so whenever an operation succeeds the
/// mirror equals the last document synced to or from the backend.
///
/// Callers only ever get shared references into the mirror. Changing a value
/// means calling [`Mirror::set`] again.
#[derive(Debug)]
pub struct Mirror<B> {
    backend: B,
    entries: Document,
}

impl<B: DurableBackend> Mirror<B> {
    /// Load the backend's document and start mirroring it.
    pub fn open(mut backend: B) -> Result<Self, MirrorError> {
        let entries = backend.load()?;
        tracing::debug!(entries = entries.len(), "mirror loaded");
        Ok(Self { backend, entries })
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Look up `key`. `None` means the key is absent; a stored null is
    /// `Some(&Value::Null)`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Insert or overwrite `key` and persist the document.
    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<(), MirrorError> {
        let key = key.into();
        let previous = self.entries.insert(key.clone(), value.into());

        if let Err(error) = self.backend.save(&self.entries) {
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

    /// Delete `key` and persist the document, returning the removed value.
    ///
    /// Removing an absent key returns `Ok(None)` without calling the backend.
    pub fn remove(&mut self, key: &str) -> Result<Option<Value>, MirrorError> {
        let Some(previous) = self.entries.remove(key) else {
            return Ok(None);
        };

        if let Err(error) = self.backend.save(&self.entries) {
            tracing::warn!(key = %key, %error, "save failed, rolling back remove");
            self.entries.insert(key.to_string(), previous);
            return Err(error.into());
        }

        tracing::debug!(key = %key, entries = self.entries.len(), "remove persisted");
        Ok(Some(previous))
    }

    /// Replace the mirror wholesale with a fresh load from the backend.
    ///
    /// Picks up changes written by anyone else. On failure the previous
    /// mirror is kept.
    pub fn refresh(&mut self) -> Result<(), MirrorError> {
        self.entries = self.backend.load()?;
        tracing::debug!(entries = self.entries.len(), "mirror refreshed");
        Ok(())
    }

    /// Persist an empty document, then reload.
    ///
    /// If the empty save fails nothing changes. If the save succeeds but the
    /// reload fails, the mirror is left empty, matching what was persisted.
    pub fn clear(&mut self) -> Result<(), MirrorError> {
        self.backend.save(&Document::new())?;
        self.entries.clear();
        self.refresh()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// An owned copy of the mirrored document.
    pub fn snapshot(&self) -> Document {
        self.entries.clone()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Stop mirroring and hand the backend back.
    pub fn into_backend(self) -> B {
        self.backend
    }
}

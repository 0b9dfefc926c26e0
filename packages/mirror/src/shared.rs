//! Thread-safe handle to a mirror.

use std::sync::{Arc, Mutex, MutexGuard};

use mirrorstore_backend::{Document, DurableBackend, Value};

use crate::{Mirror, MirrorError};

/// A cloneable handle sharing one [`Mirror`] between threads.
///
/// Each operation holds the lock for its entire mutate-then-save sequence,
/// so operations from different threads never interleave. Reads hand back
/// owned copies; nobody outside the lock ever sees a reference into the
/// mirrored document.
///
/// # Example
///
/// ```rust
/// use mirrorstore::{InMemoryBackend, SharedMirror, Value};
///
/// let shared = SharedMirror::open(InMemoryBackend::new()).unwrap();
/// let worker = shared.clone();
///
/// std::thread::spawn(move || worker.set("from-thread", true).unwrap())
///     .join()
///     .unwrap();
///
/// assert_eq!(shared.get("from-thread").unwrap(), Some(Value::Bool(true)));
/// ```
pub struct SharedMirror<B> {
    inner: Arc<Mutex<Mirror<B>>>,
}

impl<B> Clone for SharedMirror<B> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<B: DurableBackend> From<Mirror<B>> for SharedMirror<B> {
    fn from(mirror: Mirror<B>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(mirror)),
        }
    }
}

impl<B: DurableBackend> SharedMirror<B> {
    pub fn open(backend: B) -> Result<Self, MirrorError> {
        Mirror::open(backend).map(Self::from)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Mirror<B>>, MirrorError> {
        self.inner.lock().map_err(|_| MirrorError::LockPoisoned)
    }

    pub fn has_key(&self, key: &str) -> Result<bool, MirrorError> {
        Ok(self.lock()?.has_key(key))
    }

    pub fn get(&self, key: &str) -> Result<Option<Value>, MirrorError> {
        Ok(self.lock()?.get(key).cloned())
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> Result<(), MirrorError> {
        self.lock()?.set(key, value)
    }

    pub fn remove(&self, key: &str) -> Result<Option<Value>, MirrorError> {
        self.lock()?.remove(key)
    }

    pub fn refresh(&self) -> Result<(), MirrorError> {
        self.lock()?.refresh()
    }

    pub fn clear(&self) -> Result<(), MirrorError> {
        self.lock()?.clear()
    }

    pub fn len(&self) -> Result<usize, MirrorError> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, MirrorError> {
        Ok(self.lock()?.is_empty())
    }

    pub fn snapshot(&self) -> Result<Document, MirrorError> {
        Ok(self.lock()?.snapshot())
    }

    /// Run `f` with exclusive access to the mirror.
    ///
    /// Use this to make a read-modify-write sequence atomic with respect to
    /// other handles.
    pub fn with<R>(&self, f: impl FnOnce(&mut Mirror<B>) -> R) -> Result<R, MirrorError> {
        let mut guard = self.lock()?;
        Ok(f(&mut guard))
    }
}

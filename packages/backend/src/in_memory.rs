//! Process-local backend.

use crate::{BackendError, Document, DurableBackend};

/// A backend that keeps the "persisted" document in memory.
///
/// Nothing survives the process, so this is mostly useful as a fake in tests
/// and as a scratch backend. It counts loads and saves so callers can check
/// how much persistence traffic a facade generates.
///
/// # Example
///
/// ```rust
/// use mirrorstore_backend::{DurableBackend, Document, InMemoryBackend, Value};
///
/// let mut backend = InMemoryBackend::new();
/// assert!(backend.load().unwrap().is_empty());
///
/// let mut doc = Document::new();
/// doc.insert("name".to_string(), Value::from("Alice"));
/// backend.save(&doc).unwrap();
///
/// assert_eq!(backend.document(), &doc);
/// assert_eq!(backend.save_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    doc: Document,
    quota: Option<usize>,
    loads: usize,
    saves: usize,
}

impl InMemoryBackend {
    /// Create a backend with nothing persisted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend that already holds `doc`.
    pub fn with_document(doc: Document) -> Self {
        Self {
            doc,
            ..Self::default()
        }
    }

    /// Create a backend that rejects documents with more than `max_entries` keys.
    pub fn with_quota(max_entries: usize) -> Self {
        Self {
            quota: Some(max_entries),
            ..Self::default()
        }
    }

    /// The currently persisted document.
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Replace the persisted document behind any facade's back.
    ///
    /// Simulates an out-of-band writer. Not counted as a save.
    pub fn replace_document(&mut self, doc: Document) {
        self.doc = doc;
    }

    pub fn load_count(&self) -> usize {
        self.loads
    }

    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl DurableBackend for InMemoryBackend {
    fn load(&mut self) -> Result<Document, BackendError> {
        self.loads += 1;
        Ok(self.doc.clone())
    }

    fn save(&mut self, doc: &Document) -> Result<(), BackendError> {
        if let Some(limit) = self.quota {
            if doc.len() > limit {
                return Err(BackendError::QuotaExceeded {
                    limit,
                    requested: doc.len(),
                });
            }
        }

        self.saves += 1;
        self.doc = doc.clone();
        Ok(())
    }
}

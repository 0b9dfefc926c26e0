//! The Durable Backend contract.

use crate::{BackendError, Document};

/// Whole-document persistence.
///
/// A backend offers only two operations: load everything, or replace
/// everything. It has no notion of individual keys; the facade layered on top
/// is responsible for turning per-key calls into whole-document saves.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Box<dyn DurableBackend>`.
pub trait DurableBackend: Send + Sync {
    /// Load the full persisted document.
    ///
    /// # Returns
    ///
    /// * `Ok(doc)` - The persisted document, empty if nothing was ever saved.
    /// * `Err(BackendError)` - The host storage failed.
    fn load(&mut self) -> Result<Document, BackendError>;

    /// Atomically replace the persisted document with `doc`.
    ///
    /// On error the previously persisted document must still be intact.
    fn save(&mut self, doc: &Document) -> Result<(), BackendError>;
}

// Blanket implementations for references and boxes

impl<T: DurableBackend + ?Sized> DurableBackend for &mut T {
    fn load(&mut self) -> Result<Document, BackendError> {
        (*self).load()
    }

    fn save(&mut self, doc: &Document) -> Result<(), BackendError> {
        (*self).save(doc)
    }
}

impl<T: DurableBackend + ?Sized> DurableBackend for Box<T> {
    fn load(&mut self) -> Result<Document, BackendError> {
        self.as_mut().load()
    }

    fn save(&mut self, doc: &Document) -> Result<(), BackendError> {
        self.as_mut().save(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Value;

    /// Simple backend for testing.
    struct TestBackend {
        doc: Document,
    }

    impl DurableBackend for TestBackend {
        fn load(&mut self) -> Result<Document, BackendError> {
            Ok(self.doc.clone())
        }

        fn save(&mut self, doc: &Document) -> Result<(), BackendError> {
            self.doc = doc.clone();
            Ok(())
        }
    }

    #[test]
    fn object_safety_works() {
        let mut backend = TestBackend {
            doc: Document::new(),
        };
        let boxed: &mut dyn DurableBackend = &mut backend;

        let mut doc = Document::new();
        doc.insert("test".to_string(), Value::from("hello"));
        boxed.save(&doc).unwrap();

        assert_eq!(boxed.load().unwrap(), doc);
    }

    #[test]
    fn boxed_backend_delegates() {
        let mut boxed: Box<dyn DurableBackend> = Box::new(TestBackend {
            doc: Document::new(),
        });

        let mut doc = Document::new();
        doc.insert("n".to_string(), Value::from(1));
        boxed.save(&doc).unwrap();

        assert_eq!(boxed.load().unwrap().get("n"), Some(&Value::from(1)));
    }
}

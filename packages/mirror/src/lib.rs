//! mirrorstore: a write-through mirror over a whole-document backend
//!
//! A [`DurableBackend`] can only load or save its entire document. This crate
//! layers per-key access on top of one:
//! - [`Mirror`]: owns the backend and an in-memory copy of its document
//! - [`SharedMirror`]: a cloneable, lock-guarded handle for multi-threaded hosts
//! - `AsyncMirror`: the same facade over an async backend (feature `async`)
//!
//! Every mutation saves the full document before it returns. If the save
//! fails, the mirror is rolled back, so the in-memory view never reports a
//! value the backend does not hold.
//!
//! # Example
//!
//! ```rust
//! use mirrorstore::{InMemoryBackend, Mirror, Value};
//!
//! let mut mirror = Mirror::open(InMemoryBackend::new()).unwrap();
//! assert!(!mirror.has_key("test"));
//!
//! mirror.set("test", 123).unwrap();
//! assert_eq!(mirror.get("test"), Some(&Value::from(123)));
//!
//! mirror.remove("test").unwrap();
//! assert_eq!(mirror.get("test"), None);
//! ```
//!
//! # Limitations
//!
//! Two mirrors over the same durable location do not coordinate. Each save
//! replaces the whole document, so the last writer wins and the other mirror
//! stays stale until it calls [`Mirror::refresh`].

mod error;
mod facade;
mod shared;
mod typed;

pub use error::MirrorError;
pub use facade::Mirror;
pub use shared::SharedMirror;

// Re-export backend types for convenience
pub use mirrorstore_backend::{
    json_to_value, value_to_json, BackendError, Document, DurableBackend, InMemoryBackend,
    JsonFileBackend, Value,
};

// Async support
#[cfg(feature = "async")]
mod async_mirror;

#[cfg(feature = "async")]
pub use async_mirror::AsyncMirror;

#[cfg(feature = "async")]
pub use mirrorstore_backend::{AsyncDurableBackend, SyncToAsync};

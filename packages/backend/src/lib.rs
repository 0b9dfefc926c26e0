//! Durable Backends for mirrorstore
//!
//! This is the leaf of the mirrorstore stack. A backend knows exactly two
//! things: how to load the whole persisted document and how to save a whole
//! document in its place. There are no per-key operations at this level.
//!
//! Use this layer for:
//! - Plugging a host storage primitive into a [`mirrorstore`] facade
//! - Swapping in an in-memory fake when testing code built on the facade
//!
//! # Example
//!
//! ```rust
//! use mirrorstore_backend::{DurableBackend, Document, InMemoryBackend, Value};
//!
//! let mut backend = InMemoryBackend::new();
//!
//! let mut doc = Document::new();
//! doc.insert("greeting".to_string(), Value::from("hello"));
//! backend.save(&doc).unwrap();
//!
//! assert_eq!(backend.load().unwrap(), doc);
//! ```
//!
//! # Async Support
//!
//! Enable the `async` feature for async trait variants:
//!
//! ```toml
//! [dependencies]
//! mirrorstore-backend = { version = "0.1", features = ["async"] }
//! ```
//!
//! Then use `AsyncDurableBackend` and `SyncToAsync`.
//!
//! [`mirrorstore`]: https://docs.rs/mirrorstore

mod convert;
mod error;
mod in_memory;
mod json_file;
mod traits;
mod value;

pub use convert::{from_value, json_to_value, to_value, value_to_json};
pub use error::BackendError;
pub use in_memory::InMemoryBackend;
pub use json_file::JsonFileBackend;
pub use traits::DurableBackend;
pub use value::{Document, Value};

#[cfg(feature = "async")]
mod async_traits;

#[cfg(feature = "async")]
pub use async_traits::{AsyncDurableBackend, SyncToAsync};

#[cfg(any(test, feature = "test-utils"))]
pub mod trait_test_suite;

//! Conformance checks shared by every `DurableBackend` implementation.
//!
//! Each check takes a factory so it can start from a fresh, empty backend.

use crate::{BackendError, Document, DurableBackend, InMemoryBackend, Value};

/// A document touching every `Value` variant.
pub fn sample_document() -> Document {
    let mut nested = Document::new();
    nested.insert("inner".to_string(), Value::from("deep"));
    nested.insert("nothing".to_string(), Value::Null);

    let mut doc = Document::new();
    doc.insert("null".to_string(), Value::Null);
    doc.insert("bool".to_string(), Value::from(true));
    doc.insert("integer".to_string(), Value::from(-42i64));
    doc.insert("float".to_string(), Value::from(1.5));
    doc.insert("string".to_string(), Value::from("Hello, world!"));
    doc.insert(
        "array".to_string(),
        Value::Array(vec![Value::from(1), Value::from("two"), Value::Null]),
    );
    doc.insert("map".to_string(), Value::Map(nested));
    doc
}

pub fn load_empty_works<B: DurableBackend>(backend_factory: fn() -> B) {
    let mut backend = backend_factory();
    let doc = backend.load().unwrap();
    assert!(doc.is_empty());
}

pub fn save_then_load_works<B: DurableBackend>(backend_factory: fn() -> B) {
    let mut backend = backend_factory();
    let expected = sample_document();

    backend.save(&expected).unwrap();

    let actual = backend.load().unwrap();
    assert_eq!(actual, expected);
}

pub fn save_replaces_document<B: DurableBackend>(backend_factory: fn() -> B) {
    let mut backend = backend_factory();

    let mut first = Document::new();
    first.insert("a".to_string(), Value::from(1));
    first.insert("b".to_string(), Value::from(2));
    backend.save(&first).unwrap();

    let mut second = Document::new();
    second.insert("c".to_string(), Value::from(3));
    backend.save(&second).unwrap();

    // Whole-document semantics: "a" and "b" are gone, not merged.
    assert_eq!(backend.load().unwrap(), second);
}

pub fn save_empty_wipes_document<B: DurableBackend>(backend_factory: fn() -> B) {
    let mut backend = backend_factory();

    backend.save(&sample_document()).unwrap();
    backend.save(&Document::new()).unwrap();

    assert!(backend.load().unwrap().is_empty());
}

/// Finite floats spread over the whole `f64` range, including the ones
/// whose shortest decimal form is hardest to parse back exactly.
pub fn awkward_floats(count: usize) -> Vec<f64> {
    let mut floats = vec![
        0.1,
        -0.0,
        f64::MIN_POSITIVE,
        f64::MAX,
        f64::MIN,
        f64::EPSILON,
        5e-324,
        1.5860846119992697e-265,
        2.0874465428551418e136,
    ];

    // xorshift64, seeded so failures reproduce
    let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
    while floats.len() < count {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        let f = f64::from_bits(state);
        if f.is_finite() {
            floats.push(f);
        }
    }
    floats
}

pub fn floats_survive_save_and_load<B: DurableBackend>(backend_factory: fn() -> B) {
    let mut backend = backend_factory();

    let expected: Document = awkward_floats(2_000)
        .into_iter()
        .enumerate()
        .map(|(i, f)| (format!("f{}", i), Value::Float(f)))
        .collect();
    backend.save(&expected).unwrap();

    let actual = backend.load().unwrap();
    for (key, value) in &expected {
        let (Some(Value::Float(read)), Value::Float(written)) = (actual.get(key), value) else {
            panic!("{} did not come back as a float: {:?}", key, actual.get(key));
        };
        assert_eq!(read.to_bits(), written.to_bits(), "{} drifted", key);
    }
}

/// A backend whose loads and saves can be made to fail on demand.
///
/// Wraps an `InMemoryBackend`; failed operations leave it untouched.
#[derive(Debug, Default)]
pub struct FaultyBackend {
    pub inner: InMemoryBackend,
    pub fail_loads: bool,
    pub fail_saves: bool,
}

impl FaultyBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn injected(operation: &str) -> BackendError {
        BackendError::Io(std::io::Error::other(format!(
            "injected {} failure",
            operation
        )))
    }
}

impl DurableBackend for FaultyBackend {
    fn load(&mut self) -> Result<Document, BackendError> {
        if self.fail_loads {
            return Err(Self::injected("load"));
        }
        self.inner.load()
    }

    fn save(&mut self, doc: &Document) -> Result<(), BackendError> {
        if self.fail_saves {
            return Err(Self::injected("save"));
        }
        self.inner.save(doc)
    }
}

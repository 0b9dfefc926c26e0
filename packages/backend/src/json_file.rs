use std::io::Write;
use std::{fs, io, path};

use crate::convert::{json_to_value, value_to_json};
use crate::{BackendError, Document, DurableBackend};

/// A backend that persists the document as a single JSON object on disk.
///
/// Saves go to a temporary file next to the target and are renamed into
/// place, so a reader never observes a half-written document.
#[derive(Debug)]
pub struct JsonFileBackend {
    dir: path::PathBuf,
    file: path::PathBuf,
}

impl JsonFileBackend {
    /// Create a backend persisting to `file`.
    ///
    /// The file itself need not exist yet, but its parent directory must
    /// exist and be writable.
    pub fn new(file: path::PathBuf) -> Result<JsonFileBackend, BackendError> {
        let invalid = |error: io::Error| BackendError::InvalidLocation {
            path: file.clone(),
            error,
        };

        let Some(name) = file.file_name() else {
            return Err(invalid(io::Error::other("Path must name a file.")));
        };

        let parent = match file.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => path::Path::new("."),
        };

        let attr = fs::metadata(parent).map_err(invalid)?;
        if !attr.is_dir() {
            return Err(invalid(io::Error::other(
                "Parent path must be a directory.",
            )));
        }

        if attr.permissions().readonly() {
            return Err(invalid(io::Error::other(
                "Parent directory must be writable",
            )));
        }

        let dir = parent.canonicalize().map_err(invalid)?;
        let target = dir.join(name);
        if target.is_dir() {
            return Err(invalid(io::Error::other(
                "Path names a directory, not a file.",
            )));
        }

        Ok(JsonFileBackend { dir, file: target })
    }

    /// The canonical location of the persisted document.
    pub fn path(&self) -> &path::Path {
        &self.file
    }

    fn encode(doc: &Document) -> Result<Vec<u8>, BackendError> {
        let object = doc
            .iter()
            .map(|(k, v)| Ok::<_, BackendError>((k.clone(), value_to_json(v.clone())?)))
            .collect::<Result<serde_json::Map<_, _>, BackendError>>()?;

        serde_json::to_vec_pretty(&serde_json::Value::Object(object))
            .map_err(|e| BackendError::serialization(e.to_string()))
    }

    fn decode(bytes: &[u8]) -> Result<Document, BackendError> {
        let json: serde_json::Value =
            serde_json::from_slice(bytes).map_err(|e| BackendError::corrupt(e.to_string()))?;

        match json {
            serde_json::Value::Object(map) => Ok(map
                .into_iter()
                .map(|(k, v)| (k, json_to_value(v)))
                .collect()),
            other => Err(BackendError::corrupt(format!(
                "top-level JSON must be an object, found {}",
                json_kind(&other)
            ))),
        }
    }
}

fn json_kind(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

impl DurableBackend for JsonFileBackend {
    fn load(&mut self) -> Result<Document, BackendError> {
        tracing::debug!(path = %self.file.display(), "loading document");

        let bytes = match fs::read(&self.file) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Document::new()),
            Err(e) => return Err(e.into()),
        };

        Self::decode(&bytes)
    }

    fn save(&mut self, doc: &Document) -> Result<(), BackendError> {
        // Encode before touching the filesystem so a bad value changes nothing.
        let bytes = Self::encode(doc)?;

        tracing::debug!(
            path = %self.file.display(),
            entries = doc.len(),
            bytes = bytes.len(),
            "saving document"
        );

        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.file).map_err(|e| BackendError::Io(e.error))?;
        sync_dir(&self.dir)?;

        Ok(())
    }
}

/// Flush a directory entry so a completed rename survives a crash.
#[cfg(unix)]
fn sync_dir(dir: &path::Path) -> io::Result<()> {
    fs::File::open(dir)?.sync_all()
}

// Directories can't be opened as files outside unix.
#[cfg(not(unix))]
fn sync_dir(_dir: &path::Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{trait_test_suite, Value};

    struct TestJsonFileBackend {
        // Having this as a member allows the directory to be cleaned up once the test backend is
        // dropped.
        _dir: tempfile::TempDir,
        backend: JsonFileBackend,
    }

    impl TestJsonFileBackend {
        fn new() -> TestJsonFileBackend {
            let dir = tempfile::tempdir().unwrap();
            let file = dir.path().join("store.json");
            TestJsonFileBackend {
                _dir: dir,
                backend: JsonFileBackend::new(file).unwrap(),
            }
        }
    }

    impl DurableBackend for TestJsonFileBackend {
        fn load(&mut self) -> Result<Document, BackendError> {
            self.backend.load()
        }

        fn save(&mut self, doc: &Document) -> Result<(), BackendError> {
            self.backend.save(doc)
        }
    }

    #[test]
    fn load_empty_works() {
        trait_test_suite::load_empty_works(TestJsonFileBackend::new);
    }

    #[test]
    fn save_then_load_works() {
        trait_test_suite::save_then_load_works(TestJsonFileBackend::new);
    }

    #[test]
    fn save_replaces_document() {
        trait_test_suite::save_replaces_document(TestJsonFileBackend::new);
    }

    #[test]
    fn save_empty_wipes_document() {
        trait_test_suite::save_empty_wipes_document(TestJsonFileBackend::new);
    }

    #[test]
    fn floats_survive_save_and_load() {
        trait_test_suite::floats_survive_save_and_load(TestJsonFileBackend::new);
    }

    #[cfg(unix)]
    #[test]
    fn sync_dir_flushes_parent() {
        let dir = tempfile::tempdir().unwrap();
        sync_dir(dir.path()).unwrap();
        assert!(sync_dir(&dir.path().join("missing")).is_err());
    }

    #[test]
    fn repeated_saves_leave_only_the_document() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("store.json");
        let mut backend = JsonFileBackend::new(file.clone()).unwrap();

        for i in 0..3 {
            let mut doc = Document::new();
            doc.insert("round".to_string(), Value::from(i));
            backend.save(&doc).unwrap();
        }

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("store.json")]);
        assert_eq!(backend.load().unwrap().get("round"), Some(&Value::from(2)));
    }

    #[test]
    fn reads_hand_written_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("store.json");
        fs::write(&file, br#"{"example": "Hello, world!", "count": 3}"#).unwrap();

        let mut backend = JsonFileBackend::new(file).unwrap();
        let doc = backend.load().unwrap();

        assert_eq!(doc.get("example"), Some(&Value::from("Hello, world!")));
        assert_eq!(doc.get("count"), Some(&Value::from(3)));
    }

    #[test]
    fn persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("store.json");

        let mut doc = Document::new();
        doc.insert("test".to_string(), Value::from(123));
        JsonFileBackend::new(file.clone())
            .unwrap()
            .save(&doc)
            .unwrap();

        let mut reopened = JsonFileBackend::new(file).unwrap();
        assert_eq!(reopened.load().unwrap(), doc);
    }

    #[test]
    fn non_object_file_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("store.json");
        fs::write(&file, b"[1, 2, 3]").unwrap();

        let mut backend = JsonFileBackend::new(file).unwrap();
        let err = backend.load().unwrap_err();
        assert!(matches!(err, BackendError::Corrupt { .. }));
        assert!(format!("{}", err).contains("array"));
    }

    #[test]
    fn malformed_file_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("store.json");
        fs::write(&file, b"{not json").unwrap();

        let mut backend = JsonFileBackend::new(file).unwrap();
        assert!(matches!(
            backend.load().unwrap_err(),
            BackendError::Corrupt { .. }
        ));
    }

    #[test]
    fn unencodable_value_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("store.json");
        let mut backend = JsonFileBackend::new(file.clone()).unwrap();

        let mut good = Document::new();
        good.insert("ok".to_string(), Value::from(true));
        backend.save(&good).unwrap();
        let before = fs::read(&file).unwrap();

        let mut bad = good.clone();
        bad.insert("nan".to_string(), Value::Float(f64::NAN));
        let err = backend.save(&bad).unwrap_err();
        assert!(matches!(err, BackendError::Serialization { .. }));

        assert_eq!(fs::read(&file).unwrap(), before);
        assert_eq!(backend.load().unwrap(), good);
    }

    #[test]
    fn missing_parent_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("missing").join("store.json");

        let result = JsonFileBackend::new(file);
        assert!(matches!(result, Err(BackendError::InvalidLocation { .. })));
    }

    #[test]
    fn directory_target_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("store.json");
        fs::create_dir(&sub).unwrap();

        let result = JsonFileBackend::new(sub);
        assert!(matches!(result, Err(BackendError::InvalidLocation { .. })));
    }

    #[test]
    fn parent_file_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let parent = dir.path().join("plain");
        fs::write(&parent, b"").unwrap();

        let result = JsonFileBackend::new(parent.join("store.json"));
        assert!(matches!(result, Err(BackendError::InvalidLocation { .. })));
    }
}

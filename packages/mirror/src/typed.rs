//! Typed access through serde.

use serde::de::DeserializeOwned;
use serde::Serialize;

use mirrorstore_backend::{from_value, to_value, DurableBackend};

use crate::{Mirror, MirrorError};

impl<B: DurableBackend> Mirror<B> {
    /// Read `key` and deserialize it into a Rust type.
    ///
    /// # Returns
    ///
    /// * `Ok(None)` - The key is absent.
    /// * `Ok(Some(value))` - The stored value, decoded.
    /// * `Err(MirrorError::Decode)` - The stored value has the wrong shape.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mirrorstore::{InMemoryBackend, Mirror};
    /// use serde::{Deserialize, Serialize};
    ///
    /// #[derive(Serialize, Deserialize, PartialEq, Debug)]
    /// struct Config {
    ///     debug: bool,
    ///     port: u16,
    /// }
    ///
    /// let mut mirror = Mirror::open(InMemoryBackend::new()).unwrap();
    /// let config = Config { debug: true, port: 8080 };
    /// mirror.set_as("config", &config).unwrap();
    ///
    /// let read: Option<Config> = mirror.get_as("config").unwrap();
    /// assert_eq!(read, Some(config));
    /// ```
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, MirrorError> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };

        from_value(value.clone())
            .map(Some)
            .map_err(|e| MirrorError::Decode {
                key: key.to_string(),
                message: e.to_string(),
            })
    }

    /// Serialize a Rust type and store it under `key`.
    pub fn set_as<T: Serialize>(&mut self, key: &str, data: &T) -> Result<(), MirrorError> {
        let value = to_value(data).map_err(|e| MirrorError::Encode {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        self.set(key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mirrorstore_backend::{InMemoryBackend, Value};
    use serde::Deserialize;
    use std::collections::BTreeMap;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct TestUser {
        name: String,
        age: u32,
    }

    #[test]
    fn typed_set_then_get() {
        let mut mirror = Mirror::open(InMemoryBackend::new()).unwrap();
        let user = TestUser {
            name: "Alice".to_string(),
            age: 30,
        };

        mirror.set_as("users/alice", &user).unwrap();

        let recovered: TestUser = mirror.get_as("users/alice").unwrap().unwrap();
        assert_eq!(user, recovered);
        assert!(mirror.get("users/alice").unwrap().is_map());
    }

    #[test]
    fn missing_key_is_none() {
        let mirror = Mirror::open(InMemoryBackend::new()).unwrap();
        let result: Option<TestUser> = mirror.get_as("nonexistent").unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn wrong_shape_is_decode_error() {
        let mut mirror = Mirror::open(InMemoryBackend::new()).unwrap();
        mirror.set("user", "just a string").unwrap();

        let err = mirror.get_as::<TestUser>("user").unwrap_err();
        match err {
            MirrorError::Decode { key, .. } => assert_eq!(key, "user"),
            other => panic!("expected decode error, got {:?}", other),
        }
    }

    #[test]
    fn unencodable_type_is_encode_error() {
        // serde_json refuses maps with non-string keys.
        let mut data = BTreeMap::new();
        data.insert(vec![1u8], "bytes as key");

        let mut mirror = Mirror::open(InMemoryBackend::new()).unwrap();
        let err = mirror.set_as("weird", &data).unwrap_err();
        assert!(matches!(err, MirrorError::Encode { .. }));
        assert!(!mirror.has_key("weird"));
        assert_eq!(mirror.backend().save_count(), 0);
    }

    #[test]
    fn oversized_unsigned_is_encode_error() {
        let mut mirror = Mirror::open(InMemoryBackend::new()).unwrap();
        let err = mirror.set_as("big", &(u64::MAX - 1)).unwrap_err();

        assert!(matches!(err, MirrorError::Encode { .. }));
        assert!(!mirror.has_key("big"));
        assert_eq!(mirror.backend().save_count(), 0);
    }

    #[test]
    fn unsigned_round_trips_within_range() {
        let mut mirror = Mirror::open(InMemoryBackend::new()).unwrap();
        mirror.set_as("max", &(i64::MAX as u64)).unwrap();

        let read: Option<u64> = mirror.get_as("max").unwrap();
        assert_eq!(read, Some(i64::MAX as u64));
    }

    #[test]
    fn decode_error_names_the_type_problem() {
        let mut mirror = Mirror::open(InMemoryBackend::new()).unwrap();
        mirror.set("age", "thirty").unwrap();

        let message = mirror.get_as::<u32>("age").unwrap_err().to_string();
        assert!(message.contains("wrong type"), "{}", message);
        assert!(!message.contains("corrupt"), "{}", message);
    }

    #[test]
    fn option_none_stores_null() {
        let mut mirror = Mirror::open(InMemoryBackend::new()).unwrap();
        mirror.set_as("maybe", &Option::<u32>::None).unwrap();

        assert_eq!(mirror.get("maybe"), Some(&Value::Null));
        let read: Option<Option<u32>> = mirror.get_as("maybe").unwrap();
        assert_eq!(read, Some(None));
    }
}

//! Persistence gateway
//!
//! A synchronous key-value store with string values. Both operations may fail
//! silently (quota exceeded, storage disabled); callers treat a failure as
//! "continue without persistence" and never abort the run.
//!
//! - `MemoryStore`: in-process map, used natively and in tests
//! - `LocalStore`: browser LocalStorage (wasm32 only)

pub mod memory;

#[cfg(target_arch = "wasm32")]
pub mod local;

#[cfg(target_arch = "wasm32")]
pub use local::LocalStore;
pub use memory::MemoryStore;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Key-value gateway consumed by the game core
pub trait KeyValueStore {
    /// Stored value for `key`, or None when missing or unreadable
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`. Returns false if the write was dropped.
    fn set(&mut self, key: &str, value: &str) -> bool;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> bool {
        (**self).set(key, value)
    }
}

/// Read and decode a JSON value. Missing keys and decode failures yield None.
pub fn load_json<T, S>(store: &S, key: &str) -> Option<T>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let json = store.get(key)?;
    match serde_json::from_str(&json) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Ignoring unreadable '{}': {}", key, e);
            None
        }
    }
}

/// Encode and write a JSON value. Returns false if nothing was persisted.
pub fn save_json<T, S>(store: &mut S, key: &str, value: &T) -> bool
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let json = match serde_json::to_string(value) {
        Ok(json) => json,
        Err(e) => {
            log::warn!("Failed to encode '{}': {}", key, e);
            return false;
        }
    };
    if !store.set(key, &json) {
        log::warn!("Storage rejected '{}' ({} bytes), continuing without it", key, json.len());
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        value: u32,
    }

    #[test]
    fn test_json_helpers() {
        let mut store = MemoryStore::new();
        let sample = Sample {
            name: "drone".to_string(),
            value: 10,
        };
        assert!(save_json(&mut store, "sample", &sample));
        assert_eq!(load_json::<Sample, _>(&store, "sample"), Some(sample));
        assert_eq!(load_json::<Sample, _>(&store, "missing"), None);
    }

    #[test]
    fn test_corrupt_value_is_ignored() {
        let mut store = MemoryStore::new();
        store.set("sample", "{not json");
        assert_eq!(load_json::<Sample, _>(&store, "sample"), None);
    }

    #[test]
    fn test_full_store_reports_failure() {
        let mut store = MemoryStore::with_capacity_bytes(8);
        let sample = Sample {
            name: "a long enough name".to_string(),
            value: 1,
        };
        assert!(!save_json(&mut store, "sample", &sample));
        assert_eq!(load_json::<Sample, _>(&store, "sample"), None);
    }
}

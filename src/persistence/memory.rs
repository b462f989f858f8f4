//! In-memory key-value store

use std::collections::HashMap;

use super::KeyValueStore;

/// HashMap-backed store with an optional byte quota
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    /// Total key + value bytes allowed; writes past it are dropped
    capacity_bytes: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that rejects writes once `bytes` would be exceeded
    pub fn with_capacity_bytes(bytes: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity_bytes: Some(bytes),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn used_bytes_without(&self, key: &str) -> usize {
        self.entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> bool {
        if let Some(limit) = self.capacity_bytes {
            if self.used_bytes_without(key) + key.len() + value.len() > limit {
                return false;
            }
        }
        self.entries.insert(key.to_string(), value.to_string());
        true
    }
}

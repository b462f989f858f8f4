//! Browser LocalStorage store (wasm32)

use super::KeyValueStore;

/// LocalStorage wrapper. Storage may be unavailable (private mode, disabled
/// cookies); every call then degrades to a miss or a dropped write.
pub struct LocalStore {
    storage: Option<web_sys::Storage>,
}

impl LocalStore {
    pub fn new() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();
        if storage.is_none() {
            log::warn!("LocalStorage unavailable, progress will not be saved");
        }
        Self { storage }
    }
}

impl Default for LocalStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.as_ref()?.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> bool {
        match self.storage.as_ref() {
            Some(storage) => storage.set_item(key, value).is_ok(),
            None => false,
        }
    }
}

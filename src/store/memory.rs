use std::collections::HashMap;
use std::sync::Mutex;

use super::ContentStore;

/// Process-local store. Used by tests, and as the fallback when the
/// database file cannot be opened at boot.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ContentStore for MemoryStore {
    fn get_raw(&self, key: &str) -> Option<String> {
        let map = self.entries.lock().ok()?;
        map.get(key).cloned()
    }

    fn set_raw(&self, key: &str, value: &str) -> Result<(), String> {
        let mut map = self.entries.lock().map_err(|e| e.to_string())?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_raw(&self, key: &str) -> Result<(), String> {
        let mut map = self.entries.lock().map_err(|e| e.to_string())?;
        map.remove(key);
        Ok(())
    }
}

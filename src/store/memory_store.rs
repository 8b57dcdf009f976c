use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::KeyValueStore;
use crate::error::Result;

/// A process-local store. Used by tests and by short-lived sessions.
#[derive(Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn items(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.items.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Number of keys currently held.
    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    /// Write a single key directly, bypassing any session semantics.
    pub fn insert_raw(&self, key: &str, value: &str) {
        self.items().insert(key.to_string(), value.to_string());
    }
}

impl KeyValueStore for MemoryStore {
    fn get_name(&self) -> &str {
        "memory"
    }

    fn get_item(&self, key: &str) -> Option<String> {
        self.items().get(key).cloned()
    }

    fn set_items(&self, items: &[(&str, String)]) -> Result<()> {
        let mut map = self.items();
        for (key, value) in items {
            map.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }

    fn remove_items(&self, keys: &[&str]) {
        let mut map = self.items();
        for key in keys {
            map.remove(*key);
        }
    }
}

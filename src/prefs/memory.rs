use super::{PrefValue, PreferenceStore};
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// In-process preference store
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<BTreeMap<String, PrefValue>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(values: BTreeMap<String, PrefValue>) -> Self {
        Self {
            values: RwLock::new(values),
        }
    }

    /// Copy of every stored entry
    pub fn snapshot(&self) -> BTreeMap<String, PrefValue> {
        self.values.read().clone()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<PrefValue> {
        self.values.read().get(key).cloned()
    }

    fn keys(&self) -> Vec<String> {
        self.values.read().keys().cloned().collect()
    }

    fn set(&self, key: &str, value: PrefValue) {
        self.values.write().insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        self.values.write().remove(key);
    }
}

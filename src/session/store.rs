use crate::error::StoreError;
use ahash::AHashMap;

/// The `save`/`load` contract of the external key-value store that finished
/// configurations are handed to.
pub trait KeyValueStore {
    fn save(&mut self, key: &str, value: serde_json::Value) -> Result<(), StoreError>;
    fn load(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError>;
}

/// Process-local store, for tests and the CLI.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: AHashMap<String, serde_json::Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn save(&mut self, key: &str, value: serde_json::Value) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }
}

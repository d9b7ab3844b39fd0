//! In-memory object store for tests and local runs.

use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::Value;

use super::{ObjectStore, RepositoryError, Result};

/// Object store backed by a `HashMap`; contents vanish with the process.
#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<String, Value>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored keys, sorted.
    pub fn keys(&self) -> Result<Vec<String>> {
        let objects = self
            .objects
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let mut keys: Vec<String> = objects.keys().cloned().collect();
        keys.sort_unstable();
        Ok(keys)
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn load_value(&self, key: &str) -> Result<Option<Value>> {
        let objects = self
            .objects
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(objects.get(key).cloned())
    }

    fn save_value(&self, key: &str, value: &Value) -> Result<()> {
        let mut objects = self
            .objects
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        objects.insert(key.to_owned(), value.clone());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut objects = self
            .objects
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        objects.remove(key);
        Ok(())
    }

    fn contains(&self, key: &str) -> bool {
        self.objects
            .read()
            .map(|objects| objects.contains_key(key))
            .unwrap_or(false)
    }
}

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use super::Storage;
use crate::error::StorageError;

/// In-process implementation of [`Storage`].
///
/// Nothing survives the process. An optional quota bounds the total number of
/// bytes (keys plus values) the map may hold, which is how a browser rejects
/// writes once `localStorage` is full.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RwLock<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStorage {
    /// Create an empty, unbounded medium.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty medium that rejects writes past `limit` bytes.
    pub fn with_quota(limit: usize) -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
            quota: Some(limit),
        }
    }

    /// The process-wide medium stores persist to when none is configured.
    pub fn global() -> Arc<Self> {
        static GLOBAL: OnceLock<Arc<MemoryStorage>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(MemoryStorage::new())))
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Check if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Total bytes held, counting keys and values.
    pub fn used_bytes(&self) -> usize {
        Self::footprint(&self.items.read())
    }

    fn footprint(items: &HashMap<String, String>) -> usize {
        items.iter().map(|(k, v)| k.len() + v.len()).sum()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.read().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.items.write();

        if let Some(limit) = self.quota {
            let replaced = items.get(key).map(|old| key.len() + old.len()).unwrap_or(0);
            let needed = Self::footprint(&items) - replaced + key.len() + value.len();
            if needed > limit {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    limit,
                });
            }
        }

        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.items.write().remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.items.write().clear();
        Ok(())
    }
}

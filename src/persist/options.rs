use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use super::{MemoryStorage, Storage};
use crate::error::{Result, StoreError};

type Encoder<T> = Arc<dyn Fn(&T) -> serde_json::Result<String> + Send + Sync>;

/// Where and how a store persists its snapshots.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use draftstore::persist::{MemoryStorage, PersistOptions};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, Serialize, Deserialize)]
/// struct Settings {
///     theme: String,
///     #[serde(default)]
///     draft_text: String,
/// }
///
/// let options = PersistOptions::<Settings>::new("settings")
///     .selector(|s| serde_json::json!({ "theme": s.theme }))
///     .storage(Arc::new(MemoryStorage::new()));
/// assert_eq!(options.key(), "settings");
/// ```
pub struct PersistOptions<T> {
    key: String,
    selector: Option<Encoder<T>>,
    storage: Arc<dyn Storage>,
}

impl<T> PersistOptions<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Persist the full state under `key` in [`MemoryStorage::global`].
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            selector: None,
            storage: MemoryStorage::global(),
        }
    }

    /// Persist `selector(state)` instead of the full state.
    ///
    /// Restoring still reads the stored value back as `T`, so fields left out
    /// by the projection need `#[serde(default)]` for the snapshot to be
    /// usable.
    pub fn selector<P, F>(mut self, selector: F) -> Self
    where
        P: Serialize,
        F: Fn(&T) -> P + Send + Sync + 'static,
    {
        self.selector = Some(Arc::new(move |state: &T| {
            serde_json::to_string(&selector(state))
        }));
        self
    }

    /// Use `storage` instead of the process-wide memory medium.
    pub fn storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storage = storage;
        self
    }

    /// The key snapshots are stored under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether a projection is applied before writing.
    pub fn has_selector(&self) -> bool {
        self.selector.is_some()
    }

    /// Read a previously stored snapshot.
    ///
    /// Anything that prevents a clean restore is logged and reported as no
    /// snapshot; persistence never decides whether construction succeeds.
    pub(crate) fn restore(&self) -> Option<T> {
        let raw = match self.storage.get_item(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No persisted state under {}", self.key);
                return None;
            }
            Err(e) => {
                warn!("Failed to read persisted state under {}: {}", self.key, e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(state) => {
                debug!("Restored persisted state from {}", self.key);
                Some(state)
            }
            Err(e) => {
                warn!("Failed to parse persisted state under {}: {}", self.key, e);
                None
            }
        }
    }

    /// Encode `state` (through the selector, if any) and write it.
    pub(crate) fn save(&self, state: &T) -> Result<()> {
        let encoded = match &self.selector {
            Some(encode) => encode(state)?,
            None => serde_json::to_string(state)?,
        };

        self.storage
            .set_item(&self.key, &encoded)
            .map_err(|source| StoreError::Persist {
                key: self.key.clone(),
                source,
            })?;

        debug!("Persisted {} bytes under {}", encoded.len(), self.key);
        Ok(())
    }
}

impl<T> Clone for PersistOptions<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            selector: self.selector.clone(),
            storage: Arc::clone(&self.storage),
        }
    }
}

impl<T> fmt::Debug for PersistOptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistOptions")
            .field("key", &self.key)
            .field("selector", &self.selector.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use serde::Deserialize;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct Counter {
        counter: i64,
        #[serde(default)]
        label: String,
    }

    fn options(storage: &Arc<MemoryStorage>) -> PersistOptions<Counter> {
        PersistOptions::new("counter").storage(storage.clone())
    }

    #[test]
    fn save_writes_json() {
        let storage = Arc::new(MemoryStorage::new());
        let opts = options(&storage);

        opts.save(&Counter {
            counter: 5,
            label: "x".to_string(),
        })
        .unwrap();

        assert_eq!(
            storage.get_item("counter").unwrap().as_deref(),
            Some(r#"{"counter":5,"label":"x"}"#)
        );
    }

    #[test]
    fn save_applies_selector() {
        let storage = Arc::new(MemoryStorage::new());
        let opts = options(&storage).selector(|s: &Counter| serde_json::json!({ "counter": s.counter }));
        assert!(opts.has_selector());

        opts.save(&Counter {
            counter: 3,
            label: "skip me".to_string(),
        })
        .unwrap();

        assert_eq!(
            storage.get_item("counter").unwrap().as_deref(),
            Some(r#"{"counter":3}"#)
        );
    }

    #[test]
    fn restore_reads_back() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set_item("counter", r#"{"counter":9}"#).unwrap();

        let restored = options(&storage).restore().unwrap();
        assert_eq!(restored.counter, 9);
        assert_eq!(restored.label, "");
    }

    #[test]
    fn restore_missing_or_corrupt_is_none() {
        let storage = Arc::new(MemoryStorage::new());
        assert!(options(&storage).restore().is_none());

        storage.set_item("counter", "{not json").unwrap();
        assert!(options(&storage).restore().is_none());
    }

    #[test]
    fn save_surfaces_storage_errors() {
        let storage = Arc::new(MemoryStorage::with_quota(4));
        let err = options(&storage)
            .save(&Counter {
                counter: 1,
                label: String::new(),
            })
            .unwrap_err();

        assert!(matches!(
            err,
            StoreError::Persist {
                ref key,
                source: StorageError::QuotaExceeded { .. },
            } if key == "counter"
        ));
    }
}

//! Error types for store transitions and persistence.

use std::io;

use thiserror::Error;

/// Boxed error returned by a fallible updater.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by a persistence medium.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The medium could not be read or written.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// The write would exceed the medium's capacity.
    #[error("quota exceeded writing {key}: needs {needed} bytes, limit is {limit}")]
    QuotaExceeded {
        key: String,
        needed: usize,
        limit: usize,
    },

    /// The key cannot be stored by this medium.
    #[error("invalid key: {0}")]
    InvalidKey(String),
}

/// Errors that can occur while operating a [`Store`](crate::Store).
#[derive(Debug, Error)]
pub enum StoreError {
    /// The updater failed. The state was left untouched.
    #[error("transition failed: {0}")]
    Transition(#[source] BoxError),

    /// The new state was applied but could not be written to storage.
    #[error("failed to persist state under {key}: {source}")]
    Persist {
        key: String,
        #[source]
        source: StorageError,
    },

    /// The new state was applied but could not be serialized.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Transitions nested from listeners went deeper than allowed.
    #[error("nested transitions exceeded depth limit of {limit}")]
    DepthExceeded { limit: usize },

    /// A setter or getter was used while its store was not alive.
    #[error("store is not available (still initializing or dropped)")]
    Detached,
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    /// Returns true if the in-memory state already reflects the transition.
    ///
    /// Persistence is best-effort, so a failed write leaves the store usable
    /// and consistent with what listeners observed.
    pub fn is_state_applied(&self) -> bool {
        matches!(self, StoreError::Persist { .. } | StoreError::Serialize(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_display() {
        let err = StorageError::QuotaExceeded {
            key: "app".to_string(),
            needed: 12,
            limit: 8,
        };
        let msg = err.to_string();
        assert!(msg.contains("app"));
        assert!(msg.contains("needs 12"));
        assert!(msg.contains("limit is 8"));
    }

    #[test]
    fn persist_wraps_storage_error() {
        let err = StoreError::Persist {
            key: "app".to_string(),
            source: StorageError::InvalidKey("a/b".to_string()),
        };
        assert!(err.to_string().contains("under app"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn applied_errors() {
        let persist = StoreError::Persist {
            key: "k".to_string(),
            source: StorageError::InvalidKey("k".to_string()),
        };
        assert!(persist.is_state_applied());
        assert!(!StoreError::Transition("boom".into()).is_state_applied());
        assert!(!StoreError::DepthExceeded { limit: 4 }.is_state_applied());
        assert!(!StoreError::Detached.is_state_applied());
    }
}

use std::fmt;

use crate::persist::PersistOptions;

/// Default bound on transitions nested from inside listeners.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Construction options for a [`Store`](super::Store).
pub struct StoreOptions<T> {
    pub(crate) persist: Option<PersistOptions<T>>,
    pub(crate) max_depth: usize,
}

impl<T> StoreOptions<T> {
    /// Enable persistence.
    pub fn persist(mut self, persist: PersistOptions<T>) -> Self {
        self.persist = Some(persist);
        self
    }

    /// Bound how deeply listeners may nest `set_state` calls.
    ///
    /// A limit of zero rejects every transition.
    pub fn max_depth(mut self, limit: usize) -> Self {
        self.max_depth = limit;
        self
    }
}

impl<T> Default for StoreOptions<T> {
    fn default() -> Self {
        Self {
            persist: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl<T> Clone for StoreOptions<T> {
    fn clone(&self) -> Self {
        Self {
            persist: self.persist.clone(),
            max_depth: self.max_depth,
        }
    }
}

impl<T> fmt::Debug for StoreOptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreOptions")
            .field("persist", &self.persist)
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

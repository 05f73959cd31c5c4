//! # Draftstore
//!
//! A small global state container with immutable updates and optional
//! persistence.
//!
//! ## Store
//!
//! - [`Store<T>`] - owns one immutable state value, replaced on every transition
//! - [`Store::set_state`] - edit a copy-on-write [`Draft`] of the state; the
//!   previous value is never modified
//! - [`Store::subscribe`] - listeners run synchronously after every transition
//!
//! ## Persistence
//!
//! With [`PersistOptions`] a store writes a JSON snapshot of its state (or a
//! projection of it) to a [`Storage`] medium after each transition, and seeds
//! itself from that snapshot when created.
//!
//! ## Adapters
//!
//! The [`adapter`] module exposes a store's projected state through reactive
//! primitives: a watchable value cell and a `tokio::sync::watch` channel.
//!
//! ```
//! use draftstore::{PersistOptions, Store, StoreOptions};
//! use draftstore::persist::{MemoryStorage, Storage};
//! use serde::{Deserialize, Serialize};
//! use std::sync::Arc;
//!
//! #[derive(Clone, Serialize, Deserialize)]
//! struct Counter {
//!     counter: u32,
//! }
//!
//! let storage = Arc::new(MemoryStorage::new());
//! let store = Store::create(
//!     |_, _| Counter { counter: 0 },
//!     StoreOptions::default().persist(PersistOptions::new("t").storage(storage.clone())),
//! );
//!
//! store.set_state(|s| s.counter = 5).unwrap();
//! assert_eq!(storage.get_item("t").unwrap().as_deref(), Some(r#"{"counter":5}"#));
//! ```

pub mod adapter;
pub mod draft;
pub mod error;
pub mod persist;
pub mod store;

// Re-export main types for convenience
pub use draft::Draft;
pub use error::{Result, StorageError, StoreError};
pub use persist::{FileStorage, MemoryStorage, PersistOptions, Storage};
pub use store::{Getter, Setter, State, Store, StoreOptions, Unsubscribe};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_works() {
        // Basic smoke test
        let store = Store::new(|_, _| 0i32);
        assert_eq!(*store.get_state(), 0);
        store.set_state(|n| **n += 42).unwrap();
        assert_eq!(*store.get_state(), 42);
    }

    #[test]
    fn stores_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}

        assert_send_sync::<Store<Vec<String>>>();
        assert_send_sync::<MemoryStorage>();
        assert_send_sync::<FileStorage>();
        assert_send_sync::<Unsubscribe>();
    }
}

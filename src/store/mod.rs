//! The state container.
//!
//! A [`Store`] owns one immutable state value, replaces it through draft-based
//! transitions, tells its listeners about every new value and optionally
//! writes a snapshot to a [`Storage`](crate::persist::Storage) medium.

mod options;
mod store;

pub use options::{StoreOptions, DEFAULT_MAX_DEPTH};
pub use store::{Getter, Setter, State, Store, Unsubscribe};

//! Key-value persistence for store snapshots.
//!
//! A [`Storage`] is a synchronous string-to-string map, modelled on the
//! browser's `localStorage`. Two media ship with the crate:
//!
//! - [`MemoryStorage`]: process-local map, optionally capped by a byte quota.
//!   [`MemoryStorage::global`] is the shared key space used by default.
//! - [`FileStorage`]: one file per key under a directory.
//!
//! [`PersistOptions`] ties a store to a key, an optional projection and a
//! medium.

mod file;
mod memory;
mod options;
mod storage;

pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use options::PersistOptions;
pub use storage::Storage;

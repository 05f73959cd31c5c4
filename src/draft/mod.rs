//! Copy-on-write drafts for producing new immutable state.
//!
//! An updater edits a [`Draft`] as if it were the state itself. The base value
//! is only cloned on the first mutable access, so updaters that end up not
//! writing anything hand back the very same allocation.

mod draft;

pub use draft::{produce, Draft};

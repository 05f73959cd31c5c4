//! Adapters exposing a store through reactive primitives.
//!
//! Every adapter does the same thing: seed a primitive with
//! `selector(store.get_state())`, then push `selector(new_state)` into it on
//! every transition. They differ only in the primitive:
//!
//! - [`SelectedSignal`]: a synchronous value cell with watchers, the shape
//!   hook-, writable- and reactive-object-based UIs consume.
//! - [`WatchAdapter`]: a `tokio::sync::watch` channel, for consumers that
//!   await changes like an observable.
//! - [`VanillaStore`]: no primitive at all, just the store built from a plain
//!   initial value.

mod signal;
mod vanilla;
mod watch;

pub use signal::{SelectedSignal, WatchGuard};
pub use vanilla::VanillaStore;
pub use watch::{Selection, WatchAdapter};

use crate::draft::Draft;
use crate::error::Result;
use crate::store::{Getter, Setter, State, Store, StoreOptions};

/// Observe a store, project its state and expose the projection.
pub trait Adapter<T: State, S>: Sized {
    /// Wrap an existing store.
    fn attach<F>(store: Store<T>, selector: F) -> Self
    where
        F: Fn(&T) -> S + Send + Sync + 'static;

    /// The wrapped store.
    fn store(&self) -> &Store<T>;

    /// Create a store and wrap it in one step.
    fn create<I, F>(initializer: I, selector: F, options: StoreOptions<T>) -> Self
    where
        I: FnOnce(Setter<T>, Getter<T>) -> T,
        F: Fn(&T) -> S + Send + Sync + 'static,
    {
        Self::attach(Store::create(initializer, options), selector)
    }

    /// Update the wrapped store.
    fn set_state<U>(&self, updater: U) -> Result<()>
    where
        U: FnOnce(&mut Draft<'_, T>),
    {
        self.store().set_state(updater)
    }
}

use parking_lot::{ReentrantMutex, RwLock};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cell::Cell;
use std::convert::Infallible;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::{trace, warn};

use super::StoreOptions;
use crate::draft::{produce, Draft};
use crate::error::{BoxError, Result, StoreError};
use crate::persist::PersistOptions;

/// Values a [`Store`] can hold.
///
/// State is plain data: it is cloned on write and serialized to JSON when
/// persistence is enabled.
pub trait State: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {}

impl<T> State for T where T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {}

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Listeners<T> {
    next_id: u64,
    entries: Vec<(u64, Listener<T>)>,
}

impl<T> Listeners<T> {
    fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }

    fn insert(&mut self, listener: Listener<T>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    fn remove(&mut self, id: u64) {
        self.entries.retain(|(entry_id, _)| *entry_id != id);
    }

    /// Copy of the current listeners, in registration order.
    fn snapshot(&self) -> Vec<Listener<T>> {
        self.entries.iter().map(|(_, l)| Arc::clone(l)).collect()
    }
}

struct Inner<T> {
    state: RwLock<Arc<T>>,
    listeners: Arc<RwLock<Listeners<T>>>,
    // Held for the whole transition; the cell counts nested transitions on
    // the owning thread.
    transition: ReentrantMutex<Cell<usize>>,
    persist: Option<PersistOptions<T>>,
    max_depth: usize,
}

/// Decrements the nesting counter when a transition ends, even by unwinding.
struct Nesting<'a>(&'a Cell<usize>);

impl Drop for Nesting<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get() - 1);
    }
}

impl<T: State> Inner<T> {
    fn get_state(&self) -> Arc<T> {
        Arc::clone(&self.state.read())
    }

    fn transition<F>(&self, step: F) -> Result<()>
    where
        F: FnOnce(&Arc<T>) -> Result<Arc<T>>,
    {
        let depth = self.transition.lock();
        if depth.get() >= self.max_depth {
            return Err(StoreError::DepthExceeded {
                limit: self.max_depth,
            });
        }
        depth.set(depth.get() + 1);
        let _nesting = Nesting(&*depth);

        let base = self.get_state();
        let next = step(&base)?;
        *self.state.write() = Arc::clone(&next);

        let listeners = self.listeners.read().snapshot();
        trace!(
            listeners = listeners.len(),
            depth = depth.get(),
            "Applied state transition"
        );
        for listener in &listeners {
            // A nested transition in an earlier listener may have moved the
            // state on; later listeners get the latest value.
            let current = self.get_state();
            listener(&current);
        }

        if let Some(persist) = &self.persist {
            // Nested transitions may have moved the state on; write the latest.
            let latest = self.get_state();
            if let Err(e) = persist.save(&latest) {
                warn!("Failed to persist state under {}: {}", persist.key(), e);
                return Err(e);
            }
        }

        Ok(())
    }
}

/// A global state container with draft-based immutable updates.
///
/// Cloning a `Store` yields another handle to the same container.
///
/// # Examples
///
/// ```
/// use draftstore::Store;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, Serialize, Deserialize)]
/// struct Counter {
///     counter: i32,
/// }
///
/// let store = Store::new(|_set, _get| Counter { counter: 0 });
/// assert_eq!(store.get_state().counter, 0);
///
/// store.set_state(|s| s.counter += 1).unwrap();
/// assert_eq!(store.get_state().counter, 1);
/// ```
pub struct Store<T> {
    inner: Arc<Inner<T>>,
}

impl<T: State> Store<T> {
    /// Create a store without persistence.
    pub fn new<F>(initializer: F) -> Self
    where
        F: FnOnce(Setter<T>, Getter<T>) -> T,
    {
        Self::create(initializer, StoreOptions::default())
    }

    /// Create a store.
    ///
    /// With persistence configured, a snapshot found under the key seeds the
    /// state and `initializer` is never called. A missing or unreadable
    /// snapshot falls back to `initializer`; the latter is logged as a
    /// warning and never fails construction.
    ///
    /// The setter and getter handed to `initializer` only become usable once
    /// this returns.
    pub fn create<F>(initializer: F, options: StoreOptions<T>) -> Self
    where
        F: FnOnce(Setter<T>, Getter<T>) -> T,
    {
        let StoreOptions { persist, max_depth } = options;

        let inner = Arc::new_cyclic(|weak: &Weak<Inner<T>>| {
            let state = match persist.as_ref().and_then(PersistOptions::restore) {
                Some(restored) => restored,
                None => initializer(
                    Setter {
                        inner: Weak::clone(weak),
                    },
                    Getter {
                        inner: Weak::clone(weak),
                    },
                ),
            };

            Inner {
                state: RwLock::new(Arc::new(state)),
                listeners: Arc::new(RwLock::new(Listeners::new())),
                transition: ReentrantMutex::new(Cell::new(0)),
                persist,
                max_depth,
            }
        });

        Self { inner }
    }

    /// Get the current state.
    ///
    /// The returned snapshot never changes; later transitions replace the
    /// store's value instead of editing it.
    pub fn get_state(&self) -> Arc<T> {
        self.inner.get_state()
    }

    /// Read state through a closure.
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        let state = self.get_state();
        f(&state)
    }

    /// Update the state by editing a draft of it.
    ///
    /// Listeners run synchronously, in registration order, before this
    /// returns; the snapshot is persisted after them. An `Err` here means
    /// either the transition was refused (nothing changed) or the write to
    /// storage failed after the new state was applied, see
    /// [`StoreError::is_state_applied`].
    ///
    /// A panic inside `updater` propagates with the state untouched.
    pub fn set_state<F>(&self, updater: F) -> Result<()>
    where
        F: FnOnce(&mut Draft<'_, T>),
    {
        self.try_set_state(|draft| {
            updater(draft);
            Ok::<(), Infallible>(())
        })
    }

    /// Like [`set_state`](Self::set_state), with an updater that can fail.
    ///
    /// An error from `updater` aborts the transition: the state is left as it
    /// was, no listener runs and nothing is persisted.
    pub fn try_set_state<F, E>(&self, updater: F) -> Result<()>
    where
        F: FnOnce(&mut Draft<'_, T>) -> std::result::Result<(), E>,
        E: Into<BoxError>,
    {
        self.inner.transition(|base| {
            produce(base, updater).map_err(|e| StoreError::Transition(e.into()))
        })
    }

    /// Register a listener for every new state.
    ///
    /// A listener added while a transition is notifying is first called on
    /// the next transition. Dropping the returned handle keeps the listener
    /// registered.
    pub fn subscribe<F>(&self, listener: F) -> Unsubscribe
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = self.inner.listeners.write().insert(Arc::new(listener));
        let listeners = Arc::downgrade(&self.inner.listeners);

        Unsubscribe {
            detach: Arc::new(move || {
                if let Some(listeners) = listeners.upgrade() {
                    listeners.write().remove(id);
                }
            }),
        }
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.read().entries.len()
    }

    /// The persistence key, if persistence is enabled.
    pub fn persist_key(&self) -> Option<&str> {
        self.inner.persist.as_ref().map(PersistOptions::key)
    }

    /// A handle that updates this store without keeping it alive.
    pub fn setter(&self) -> Setter<T> {
        Setter {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// A handle that reads this store without keeping it alive.
    pub fn getter(&self) -> Getter<T> {
        Getter {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &**self.inner.state.read())
            .field("listeners", &self.inner.listeners.read().entries.len())
            .field("persist", &self.inner.persist)
            .finish()
    }
}

/// Updates a store through a weak reference.
///
/// Handed to the initializer; fails with [`StoreError::Detached`] until
/// construction completes and again once every [`Store`] handle is dropped.
pub struct Setter<T> {
    inner: Weak<Inner<T>>,
}

impl<T: State> Setter<T> {
    /// See [`Store::set_state`].
    pub fn set<F>(&self, updater: F) -> Result<()>
    where
        F: FnOnce(&mut Draft<'_, T>),
    {
        self.store()?.set_state(updater)
    }

    /// See [`Store::try_set_state`].
    pub fn try_set<F, E>(&self, updater: F) -> Result<()>
    where
        F: FnOnce(&mut Draft<'_, T>) -> std::result::Result<(), E>,
        E: Into<BoxError>,
    {
        self.store()?.try_set_state(updater)
    }

    fn store(&self) -> Result<Store<T>> {
        self.inner
            .upgrade()
            .map(|inner| Store { inner })
            .ok_or(StoreError::Detached)
    }
}

impl<T> Clone for Setter<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

/// Reads a store through a weak reference.
pub struct Getter<T> {
    inner: Weak<Inner<T>>,
}

impl<T: State> Getter<T> {
    /// The current state, or `None` while the store is not alive.
    pub fn get(&self) -> Option<Arc<T>> {
        self.inner.upgrade().map(|inner| inner.get_state())
    }
}

impl<T> Clone for Getter<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

/// Removes one listener from a store.
///
/// Calling [`unsubscribe`](Self::unsubscribe) more than once is harmless.
#[derive(Clone)]
pub struct Unsubscribe {
    detach: Arc<dyn Fn() + Send + Sync>,
}

impl Unsubscribe {
    /// Stop delivering notifications to the listener.
    pub fn unsubscribe(&self) {
        (self.detach)();
    }
}

impl fmt::Debug for Unsubscribe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unsubscribe").finish_non_exhaustive()
    }
}

use parking_lot::RwLock;
use std::sync::{Arc, Weak};

use super::Adapter;
use crate::store::{State, Store, Unsubscribe};

type Watcher<S> = Arc<dyn Fn(&S) + Send + Sync>;

struct Watchers<S> {
    next_id: u64,
    entries: Vec<(u64, Watcher<S>)>,
}

struct Slot<S> {
    value: RwLock<S>,
    watchers: RwLock<Watchers<S>>,
}

impl<S: Clone + PartialEq> Slot<S> {
    /// Store `next` and tell watchers, unless nothing changed.
    fn replace(&self, next: S) {
        {
            let mut value = self.value.write();
            if *value == next {
                return;
            }
            *value = next.clone();
        }

        let watchers: Vec<_> = self
            .watchers
            .read()
            .entries
            .iter()
            .map(|(_, w)| Arc::clone(w))
            .collect();
        for watcher in watchers {
            watcher(&next);
        }
    }
}

/// A store projection held in a reactive value cell.
///
/// The cell starts as `selector(state)` and follows every transition.
/// Watchers only hear about transitions that change the projection. Dropping
/// the signal detaches it from the store.
///
/// # Examples
///
/// ```
/// use draftstore::adapter::{Adapter, SelectedSignal};
/// use draftstore::{Store, StoreOptions};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, Serialize, Deserialize)]
/// struct Cart {
///     items: Vec<String>,
/// }
///
/// let count = SelectedSignal::create(
///     |_, _| Cart { items: Vec::new() },
///     |cart: &Cart| cart.items.len(),
///     StoreOptions::default(),
/// );
/// assert_eq!(count.get(), 0);
///
/// count.set_state(|cart| cart.items.push("tea".to_string())).unwrap();
/// assert_eq!(count.get(), 1);
/// ```
pub struct SelectedSignal<T, S> {
    store: Store<T>,
    slot: Arc<Slot<S>>,
    subscription: Unsubscribe,
}

impl<T, S> SelectedSignal<T, S>
where
    T: State,
    S: Clone + PartialEq + Send + Sync + 'static,
{
    /// Get the current projection.
    pub fn get(&self) -> S {
        self.slot.value.read().clone()
    }

    /// Read the projection with a function without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        let value = self.slot.value.read();
        f(&value)
    }

    /// Watch the projection for changes.
    ///
    /// The callback runs once right away with the current value, then after
    /// every transition that changes it, until the guard is dropped.
    pub fn watch<F>(&self, callback: F) -> WatchGuard
    where
        F: Fn(&S) + Send + Sync + 'static,
    {
        let callback: Watcher<S> = Arc::new(callback);
        let id = {
            let mut watchers = self.slot.watchers.write();
            let id = watchers.next_id;
            watchers.next_id += 1;
            watchers.entries.push((id, Arc::clone(&callback)));
            id
        };

        let current = self.get();
        callback(&current);

        let slot = Arc::downgrade(&self.slot);
        WatchGuard {
            detach: Some(Box::new(move || remove_watcher(&slot, id))),
        }
    }
}

fn remove_watcher<S>(slot: &Weak<Slot<S>>, id: u64) {
    if let Some(slot) = slot.upgrade() {
        slot.watchers
            .write()
            .entries
            .retain(|(entry_id, _)| *entry_id != id);
    }
}

impl<T, S> Adapter<T, S> for SelectedSignal<T, S>
where
    T: State,
    S: Clone + PartialEq + Send + Sync + 'static,
{
    fn attach<F>(store: Store<T>, selector: F) -> Self
    where
        F: Fn(&T) -> S + Send + Sync + 'static,
    {
        let slot = Arc::new(Slot {
            value: RwLock::new(store.read(&selector)),
            watchers: RwLock::new(Watchers {
                next_id: 0,
                entries: Vec::new(),
            }),
        });

        let target = Arc::clone(&slot);
        let subscription = store.subscribe(move |state| target.replace(selector(state)));

        Self {
            store,
            slot,
            subscription,
        }
    }

    fn store(&self) -> &Store<T> {
        &self.store
    }
}

impl<T, S> Drop for SelectedSignal<T, S> {
    fn drop(&mut self) {
        self.subscription.unsubscribe();
    }
}

/// RAII guard for signal watchers.
pub struct WatchGuard {
    detach: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Drop for WatchGuard {
    fn drop(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

use std::ops::Deref;

use crate::store::{State, Store, StoreOptions};

/// A store created from a plain initial value.
///
/// Derefs to the underlying [`Store`], so `get_state`, `set_state` and
/// `subscribe` are available directly.
pub struct VanillaStore<T> {
    store: Store<T>,
}

impl<T: State> VanillaStore<T> {
    /// Create a store whose initial state is `initial`.
    ///
    /// A persisted snapshot still takes precedence over `initial`.
    pub fn new(initial: T, options: StoreOptions<T>) -> Self {
        Self {
            store: Store::create(move |_, _| initial, options),
        }
    }

    /// Give up the wrapper and keep the store.
    pub fn into_store(self) -> Store<T> {
        self.store
    }
}

impl<T> Deref for VanillaStore<T> {
    type Target = Store<T>;

    fn deref(&self) -> &Store<T> {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::{MemoryStorage, PersistOptions, Storage};
    use std::sync::Arc;

    #[test]
    fn exposes_store_surface() {
        let store = VanillaStore::new(vec![1u8, 2], StoreOptions::default());
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));

        let seen_clone = seen.clone();
        store.subscribe(move |v: &Vec<u8>| seen_clone.lock().push(v.len()));
        store.set_state(|v| v.push(3)).unwrap();

        assert_eq!(*store.get_state(), vec![1, 2, 3]);
        assert_eq!(*seen.lock(), vec![3]);
    }

    #[test]
    fn persisted_value_wins_over_initial() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set_item("prefs", r#"["restored"]"#).unwrap();

        let store = VanillaStore::new(
            vec!["initial".to_string()],
            StoreOptions::default()
                .persist(PersistOptions::new("prefs").storage(storage.clone())),
        )
        .into_store();

        assert_eq!(*store.get_state(), vec!["restored".to_string()]);
    }
}

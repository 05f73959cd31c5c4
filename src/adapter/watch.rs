use std::sync::Arc;
use tokio::sync::watch;

use super::Adapter;
use crate::store::{State, Store, Unsubscribe};

/// A store projection published on a `tokio::sync::watch` channel.
///
/// Receivers always see the latest projection and can await the next one.
/// A transition that leaves the projection equal to the published value does
/// not wake anyone. Dropping the adapter closes the channel.
pub struct WatchAdapter<T, S> {
    store: Store<T>,
    sender: Arc<watch::Sender<S>>,
    subscription: Unsubscribe,
}

impl<T, S> WatchAdapter<T, S>
where
    T: State,
    S: Clone + PartialEq + Send + Sync + 'static,
{
    /// The current projection.
    pub fn get(&self) -> S {
        self.sender.borrow().clone()
    }

    /// A receiver positioned at the current projection.
    pub fn subscribe(&self) -> watch::Receiver<S> {
        self.sender.subscribe()
    }

    /// Derive a narrower view from the published projection.
    pub fn select<U, F>(&self, project: F) -> Selection<S, U>
    where
        F: Fn(&S) -> U + Send + Sync + 'static,
    {
        Selection {
            receiver: self.sender.subscribe(),
            project: Box::new(project),
        }
    }
}

impl<T, S> Adapter<T, S> for WatchAdapter<T, S>
where
    T: State,
    S: Clone + PartialEq + Send + Sync + 'static,
{
    fn attach<F>(store: Store<T>, selector: F) -> Self
    where
        F: Fn(&T) -> S + Send + Sync + 'static,
    {
        let (sender, _) = watch::channel(store.read(&selector));
        let sender = Arc::new(sender);

        let target = Arc::clone(&sender);
        let subscription = store.subscribe(move |state| {
            let next = selector(state);
            target.send_if_modified(|current| {
                if *current == next {
                    return false;
                }
                *current = next;
                true
            });
        });

        Self {
            store,
            sender,
            subscription,
        }
    }

    fn store(&self) -> &Store<T> {
        &self.store
    }
}

impl<T, S> Drop for WatchAdapter<T, S> {
    fn drop(&mut self) {
        self.subscription.unsubscribe();
    }
}

/// A projection of a [`WatchAdapter`]'s channel.
pub struct Selection<S, U> {
    receiver: watch::Receiver<S>,
    project: Box<dyn Fn(&S) -> U + Send + Sync>,
}

impl<S, U> Selection<S, U> {
    /// Project the latest published value.
    pub fn current(&self) -> U {
        (self.project)(&*self.receiver.borrow())
    }

    /// Wait for the next publication and project it.
    ///
    /// Returns `None` once the adapter has been dropped.
    pub async fn changed(&mut self) -> Option<U> {
        self.receiver.changed().await.ok()?;
        Some((self.project)(&*self.receiver.borrow_and_update()))
    }
}

//! Bridge between the store's change notifications and a UI surface.
//!
//! A [`ConsumerAdapter`] owns one projection of the store (for example the
//! overview stats through a time window). It computes the projection as
//! soon as it is activated, recomputes it on every notification, and
//! publishes it through a [`tokio::sync::watch`] channel so async consumers
//! can await changes.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::listeners::{ListenerError, Subscription};
use crate::store::Store;
use crate::tick::StoreState;

/// A live projection of the store for one consumer.
///
/// Deactivating (or dropping) the adapter unsubscribes it exactly once.
pub struct ConsumerAdapter<P> {
    name: String,
    subscription: Subscription,
    receiver: watch::Receiver<P>,
    active: bool,
}

impl<P> ConsumerAdapter<P>
where
    P: Clone + Send + Sync + 'static,
{
    /// Project the current state with `projector`, then subscribe so the
    /// projection follows every later change.
    ///
    /// The projection is recomputed once more right after subscribing, so a
    /// commit that lands between the first read and the subscription is not
    /// missed.
    ///
    /// Every projection is published while the store's read lock is held.
    /// A commit needs the write lock, so a projection of an older state can
    /// never be published after one of a newer state.
    pub fn activate<F>(name: impl Into<String>, store: &Store, projector: F) -> Self
    where
        F: Fn(&StoreState) -> P + Send + Sync + 'static,
    {
        let name = name.into();
        let projector = Arc::new(projector);

        let (tx, receiver) = watch::channel(store.with_state(|state| (*projector)(state)));
        let tx = Arc::new(tx);

        let subscription = {
            let reader = store.reader();
            let projector = Arc::clone(&projector);
            let tx = Arc::clone(&tx);
            let listener_name = name.clone();
            store.subscribe(move || -> Result<(), ListenerError> {
                reader
                    .with_state(|state| {
                        tx.send_replace((*projector)(state));
                    })
                    .ok_or_else(|| ListenerError::new(format!("{listener_name}: store is gone")))
            })
        };

        store.with_state(|state| {
            tx.send_replace((*projector)(state));
        });
        debug!(adapter = %name, "Consumer adapter activated");

        Self {
            name,
            subscription,
            receiver,
            active: true,
        }
    }

    /// The latest projection.
    pub fn current(&self) -> P {
        self.receiver.borrow().clone()
    }

    /// A receiver that resolves `changed()` whenever the projection is
    /// recomputed.
    ///
    /// Do not hold a borrow of the receiver across a store mutation: the
    /// next publish waits for it while holding the store's read lock.
    pub fn watch(&self) -> watch::Receiver<P> {
        self.receiver.clone()
    }
}

impl<P> ConsumerAdapter<P> {
    /// Name given at activation, used in logs.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the adapter is still subscribed.
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Stop following the store. Returns `true` the first time.
    ///
    /// The last projection stays readable through [`current`](Self::current).
    pub fn deactivate(&mut self) -> bool {
        if !self.active {
            return false;
        }
        self.active = false;
        self.subscription.unsubscribe();
        debug!(adapter = %self.name, "Consumer adapter deactivated");
        true
    }
}

impl<P> Drop for ConsumerAdapter<P> {
    fn drop(&mut self) {
        self.deactivate();
    }
}

impl<P> core::fmt::Debug for ConsumerAdapter<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ConsumerAdapter")
            .field("name", &self.name)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

//! Change-listener registry with copy-on-notify fan-out.
//!
//! Listeners are zero-argument callbacks run after every committed
//! mutation. A notification pass iterates over a copy of the registry taken
//! when the pass starts, so listeners may subscribe or unsubscribe (even
//! themselves) from inside a callback. Each entry carries an `active` flag
//! checked right before it is called: an entry removed mid-pass is never
//! called again, and no other entry is skipped or called twice.
//!
//! A listener fails by returning [`ListenerError`] or by panicking. Either
//! way the failure is logged and counted, and the pass continues with the
//! next listener.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use tracing::warn;

/// Error a listener returns to report that it could not handle a change.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("listener failed: {message}")]
pub struct ListenerError {
    /// What went wrong.
    pub message: String,
}

impl ListenerError {
    /// Create a listener error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Boxed listener callback.
type Callback = Box<dyn Fn() -> Result<(), ListenerError> + Send + Sync>;

struct Entry {
    id: u64,
    active: AtomicBool,
    callback: Callback,
}

/// Counts from one notification pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotifyOutcome {
    /// Listeners that were invoked.
    pub notified: usize,
    /// Invoked listeners that returned an error or panicked.
    pub failures: usize,
}

/// Registry of change listeners, in registration order.
#[derive(Default)]
pub(crate) struct ListenerRegistry {
    entries: Mutex<Vec<Arc<Entry>>>,
    next_id: AtomicU64,
    closed: AtomicBool,
}

impl ListenerRegistry {
    /// Register a callback. Returns `None` once the registry is closed.
    pub(crate) fn register(&self, callback: Callback) -> Option<u64> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if self.closed.load(Ordering::Acquire) {
            return None;
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        entries.push(Arc::new(Entry {
            id,
            active: AtomicBool::new(true),
            callback,
        }));
        Some(id)
    }

    /// Remove a listener. Returns `true` if it was still registered.
    pub(crate) fn remove(&self, id: u64) -> bool {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(pos) = entries.iter().position(|e| e.id == id) else {
            return false;
        };
        let entry = entries.remove(pos);
        entry.active.store(false, Ordering::Release);
        true
    }

    /// Whether `id` is still registered.
    pub(crate) fn contains(&self, id: u64) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|e| e.id == id)
    }

    /// Deactivate and drop every listener and refuse new registrations.
    pub(crate) fn close(&self) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        self.closed.store(true, Ordering::Release);
        for entry in entries.drain(..) {
            entry.active.store(false, Ordering::Release);
        }
    }

    /// Number of registered listeners.
    pub(crate) fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Invoke every active listener once, in registration order.
    pub(crate) fn notify(&self) -> NotifyOutcome {
        let pass: Vec<Arc<Entry>> = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let mut outcome = NotifyOutcome::default();
        for entry in pass {
            if !entry.active.load(Ordering::Acquire) {
                continue;
            }
            outcome.notified = outcome.notified.saturating_add(1);
            match catch_unwind(AssertUnwindSafe(|| (entry.callback)())) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    outcome.failures = outcome.failures.saturating_add(1);
                    warn!(listener = entry.id, error = %e, "Listener returned an error");
                }
                Err(_panic) => {
                    outcome.failures = outcome.failures.saturating_add(1);
                    warn!(listener = entry.id, "Listener panicked");
                }
            }
        }
        outcome
    }
}

/// Handle returned by [`Store::subscribe`](crate::store::Store::subscribe).
///
/// Dropping the handle does not unsubscribe; call
/// [`unsubscribe`](Self::unsubscribe). Clones refer to the same listener, so
/// a callback can hold a clone and remove itself.
#[derive(Clone)]
#[must_use = "keep the Subscription to be able to unsubscribe"]
pub struct Subscription {
    id: u64,
    registry: Weak<ListenerRegistry>,
}

impl Subscription {
    pub(crate) const fn new(id: u64, registry: Weak<ListenerRegistry>) -> Self {
        Self { id, registry }
    }

    /// A handle that refers to nothing (returned after the store is
    /// disposed).
    pub(crate) const fn inert() -> Self {
        Self {
            id: u64::MAX,
            registry: Weak::new(),
        }
    }

    /// Remove the listener. Returns `true` the first time, `false` on every
    /// later call or if the store is gone.
    pub fn unsubscribe(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.remove(self.id))
    }

    /// Whether the listener is still registered.
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.contains(self.id))
    }
}

impl core::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use super::*;

    fn recorder(log: &Arc<StdMutex<Vec<&'static str>>>, name: &'static str) -> Callback {
        let log = Arc::clone(log);
        Box::new(move || -> Result<(), ListenerError> {
            log.lock().unwrap().push(name);
            Ok(())
        })
    }

    #[test]
    fn notifies_in_registration_order() {
        let registry = ListenerRegistry::default();
        let log = Arc::new(StdMutex::new(Vec::new()));
        registry.register(recorder(&log, "a")).unwrap();
        registry.register(recorder(&log, "b")).unwrap();
        registry.register(recorder(&log, "c")).unwrap();

        let outcome = registry.notify();
        assert_eq!(outcome.notified, 3);
        assert_eq!(outcome.failures, 0);
        assert_eq!(*log.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn failing_listeners_do_not_stop_the_pass() {
        let registry = ListenerRegistry::default();
        let log = Arc::new(StdMutex::new(Vec::new()));
        registry.register(recorder(&log, "a")).unwrap();
        registry
            .register(Box::new(|| -> Result<(), ListenerError> {
                Err(ListenerError::new("render failed"))
            }))
            .unwrap();
        registry
            .register(Box::new(|| -> Result<(), ListenerError> {
                panic!("listener bug");
            }))
            .unwrap();
        registry.register(recorder(&log, "d")).unwrap();

        let outcome = registry.notify();
        assert_eq!(outcome.notified, 4);
        assert_eq!(outcome.failures, 2);
        assert_eq!(*log.lock().unwrap(), vec!["a", "d"]);
    }

    #[test]
    fn remove_is_idempotent() {
        let registry = ListenerRegistry::default();
        let id = registry.register(Box::new(|| -> Result<(), ListenerError> { Ok(()) })).unwrap();
        assert!(registry.contains(id));
        assert!(registry.remove(id));
        assert!(!registry.contains(id));
        assert!(!registry.remove(id));
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn closed_registry_rejects_new_listeners() {
        let registry = ListenerRegistry::default();
        registry.register(Box::new(|| -> Result<(), ListenerError> { Ok(()) })).unwrap();
        registry.close();
        assert_eq!(registry.len(), 0);
        assert!(registry.register(Box::new(|| -> Result<(), ListenerError> { Ok(()) })).is_none());
        assert_eq!(registry.notify(), NotifyOutcome::default());
    }

    #[test]
    fn listener_removed_earlier_in_pass_is_skipped() {
        let registry = Arc::new(ListenerRegistry::default());
        let log = Arc::new(StdMutex::new(Vec::new()));

        // "a" removes "b" (registered after it) during the pass.
        let victim = Arc::new(AtomicU64::new(u64::MAX));
        let remover = {
            let registry = Arc::downgrade(&registry);
            let victim = Arc::clone(&victim);
            let log = Arc::clone(&log);
            Box::new(move || -> Result<(), ListenerError> {
                log.lock().unwrap().push("a");
                if let Some(registry) = registry.upgrade() {
                    registry.remove(victim.load(Ordering::Acquire));
                }
                Ok(())
            })
        };
        registry.register(remover).unwrap();
        let b = registry.register(recorder(&log, "b")).unwrap();
        victim.store(b, Ordering::Release);
        registry.register(recorder(&log, "c")).unwrap();

        let outcome = registry.notify();
        assert_eq!(outcome.notified, 2);
        assert_eq!(*log.lock().unwrap(), vec!["a", "c"]);
    }

    #[test]
    fn subscription_tracks_registration() {
        let registry = Arc::new(ListenerRegistry::default());
        let id = registry.register(Box::new(|| -> Result<(), ListenerError> { Ok(()) })).unwrap();
        let subscription = Subscription::new(id, Arc::downgrade(&registry));
        let clone = subscription.clone();

        assert!(subscription.is_active());
        assert!(format!("{subscription:?}").contains("active: true"));
        assert!(clone.unsubscribe());
        assert!(!subscription.is_active());
        assert!(!subscription.unsubscribe());

        drop(registry);
        assert!(!clone.is_active());
        assert!(!Subscription::inert().is_active());
    }
}

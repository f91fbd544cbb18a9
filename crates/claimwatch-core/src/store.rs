//! The store: single authority over dashboard state.
//!
//! [`Store`] owns the overview stats, the winner list, and the activity feed.
//! It runs a repeating tick on a tokio task, applies the mutation engine,
//! commits the result atomically, and fans out change notifications.
//!
//! # Concurrency
//!
//! - A mutation guard (a mutex owning the random source) serializes every
//!   mutate-and-commit sequence: timer ticks, [`Store::refresh`], and
//!   [`Store::update_winner_status`].
//! - State sits behind a read-write lock. A commit replaces all three
//!   collections under one write lock, so readers never observe a partial
//!   tick.
//! - Listeners run after both locks are released. A listener may read the
//!   store, mutate it, or unsubscribe without deadlocking.
//!
//! # Lifecycle
//!
//! A store is [`StoreStatus::Running`] from construction until
//! [`Store::dispose`] (or drop) moves it to [`StoreStatus::Idle`]. After
//! that no tick starts and no notification pass begins.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, Weak};
use std::time::Duration;

use chrono::Utc;
use claimwatch_types::{ActivityEvent, OverviewStats, Winner, WinnerId, WinnerStatus};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::config::StoreConfig;
use crate::listeners::{ListenerError, ListenerRegistry, NotifyOutcome, Subscription};
use crate::mutation;
use crate::tick::{self, Bounds, StoreState, TickSummary};

/// Errors returned by store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No winner has the requested identifier. Nothing was changed.
    #[error("winner not found: {id}")]
    WinnerNotFound {
        /// The identifier that was looked up.
        id: WinnerId,
    },

    /// The store has been disposed and accepts no further mutations.
    #[error("store is disposed")]
    Disposed,

    /// The store was started outside a tokio runtime, so the tick timer
    /// could not be spawned.
    #[error("no tokio runtime available to drive the tick timer")]
    NoRuntime,

    /// The store configuration failed validation. Nothing was started.
    #[error("invalid store configuration: {reason}")]
    InvalidConfig {
        /// What is wrong with the configuration.
        reason: String,
    },
}

/// Lifecycle state of a [`Store`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreStatus {
    /// The tick timer is scheduled.
    Running,
    /// Disposed; terminal.
    Idle,
}

/// State shared between the store handle and its timer task.
struct Shared {
    state: RwLock<StoreState>,
    /// Mutation guard. Holding it is the right to compute and commit.
    mutator: Mutex<StdRng>,
    listeners: Arc<ListenerRegistry>,
    disposed: AtomicBool,
    shutdown: Notify,
    bounds: Bounds,
}

impl Shared {
    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// The tick algorithm shared by the timer and `refresh`.
    fn tick(&self) -> Result<TickSummary, StoreError> {
        let summary = {
            let mut rng = self.mutator.lock().unwrap_or_else(PoisonError::into_inner);
            if self.is_disposed() {
                return Err(StoreError::Disposed);
            }
            let now = Utc::now();
            let (next, summary) = {
                let current = self.read();
                tick::run_tick(&current, &mut *rng, now, self.bounds)
            };
            *self.state.write().unwrap_or_else(PoisonError::into_inner) = next;
            summary
        };

        let outcome = self.notify();
        Ok(TickSummary {
            listeners_notified: outcome.notified,
            listener_failures: outcome.failures,
            ..summary
        })
    }

    fn update_winner_status(
        &self,
        id: &WinnerId,
        status: WinnerStatus,
    ) -> Result<Winner, StoreError> {
        let updated = {
            let _guard = self.mutator.lock().unwrap_or_else(PoisonError::into_inner);
            if self.is_disposed() {
                return Err(StoreError::Disposed);
            }
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            let winner = state
                .winners
                .iter_mut()
                .find(|w| &w.id == id)
                .ok_or_else(|| StoreError::WinnerNotFound { id: id.clone() })?;
            mutation::apply_status(winner, status, Utc::now());
            winner.clone()
        };

        let outcome = self.notify();
        debug!(
            winner = %updated.id,
            status = %updated.status,
            listeners = outcome.notified,
            "Winner status updated"
        );
        Ok(updated)
    }

    /// Run a notification pass unless the store was disposed meanwhile.
    fn notify(&self) -> NotifyOutcome {
        if self.is_disposed() {
            return NotifyOutcome::default();
        }
        self.listeners.notify()
    }
}

/// The in-memory dashboard store.
///
/// Construct it once at the composition root with [`Store::start`] and call
/// [`Store::dispose`] on shutdown. Dropping the store disposes it.
pub struct Store {
    shared: Arc<Shared>,
    timer: Mutex<Option<JoinHandle<()>>>,
    tick_interval: Duration,
}

impl Store {
    /// Start a store with the given initial state.
    ///
    /// The random source is seeded from `config.seed`, or from OS entropy
    /// when no seed is configured. The tick timer is scheduled immediately;
    /// its first tick fires one interval from now.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidConfig`] for a configuration that fails
    /// [`StoreConfig::validate`], or [`StoreError::NoRuntime`] when called
    /// outside a tokio runtime.
    pub fn start(config: &StoreConfig, initial: StoreState) -> Result<Self, StoreError> {
        let rng = config
            .seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        Self::start_with_rng(config, initial, rng)
    }

    /// Start a store with an explicit random source.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidConfig`] when `config` fails
    /// [`StoreConfig::validate`], or [`StoreError::NoRuntime`] when called
    /// outside a tokio runtime.
    pub fn start_with_rng(
        config: &StoreConfig,
        initial: StoreState,
        rng: StdRng,
    ) -> Result<Self, StoreError> {
        config
            .validate()
            .map_err(|e| StoreError::InvalidConfig {
                reason: e.to_string(),
            })?;
        let runtime = tokio::runtime::Handle::try_current().map_err(|_err| StoreError::NoRuntime)?;

        let shared = Arc::new(Shared {
            state: RwLock::new(initial),
            mutator: Mutex::new(rng),
            listeners: Arc::new(ListenerRegistry::default()),
            disposed: AtomicBool::new(false),
            shutdown: Notify::new(),
            bounds: Bounds {
                max_activities: config.max_activities,
                max_winners: config.max_winners,
            },
        });

        let tick_interval = Duration::from_millis(config.tick_interval_ms);
        let handle = runtime.spawn(run_timer(Arc::clone(&shared), tick_interval));

        info!(
            tick_interval_ms = config.tick_interval_ms,
            max_activities = config.max_activities,
            max_winners = config.max_winners,
            seeded = config.seed.is_some(),
            "Store started"
        );

        Ok(Self {
            shared,
            timer: Mutex::new(Some(handle)),
            tick_interval,
        })
    }

    // -----------------------------------------------------------------------
    // Subscriptions
    // -----------------------------------------------------------------------

    /// Register a listener called after every committed mutation.
    ///
    /// Listeners run in registration order. A listener that returns an
    /// error or panics is logged and skipped; the rest still run. After
    /// [`dispose`](Self::dispose) the listener is dropped and an inert
    /// handle is returned.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn() -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        let registry = &self.shared.listeners;
        registry.register(Box::new(listener)).map_or_else(
            || {
                debug!("Subscribe after dispose ignored");
                Subscription::inert()
            },
            |id| Subscription::new(id, Arc::downgrade(registry)),
        )
    }

    /// Number of registered listeners.
    pub fn subscriber_count(&self) -> usize {
        self.shared.listeners.len()
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Copy of the current overview stats.
    pub fn stats(&self) -> OverviewStats {
        self.shared.read().stats.clone()
    }

    /// Copy of the current winner list, newest first.
    pub fn winners(&self) -> Vec<Winner> {
        self.shared.read().winners.clone()
    }

    /// Copy of the current activity feed, newest first.
    pub fn activities(&self) -> Vec<ActivityEvent> {
        self.shared.read().activities.clone()
    }

    /// Copy of the whole state, taken under one read lock.
    pub fn snapshot(&self) -> StoreState {
        self.shared.read().clone()
    }

    /// Run `f` against the current state without copying it.
    ///
    /// Keep `f` short: commits wait while it runs.
    pub fn with_state<T>(&self, f: impl FnOnce(&StoreState) -> T) -> T {
        f(&self.shared.read())
    }

    /// Number of committed ticks.
    pub fn tick_count(&self) -> u64 {
        self.shared.read().tick
    }

    /// Current lifecycle state.
    pub fn status(&self) -> StoreStatus {
        if self.shared.is_disposed() {
            StoreStatus::Idle
        } else {
            StoreStatus::Running
        }
    }

    /// Interval between scheduled ticks.
    pub const fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Set a winner's status and stamp it with the current time, then
    /// notify listeners. Returns the updated record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::WinnerNotFound`] if no winner has `id` (state
    /// and listeners are untouched), or [`StoreError::Disposed`] after
    /// [`dispose`](Self::dispose).
    pub fn update_winner_status(
        &self,
        id: &WinnerId,
        status: WinnerStatus,
    ) -> Result<Winner, StoreError> {
        self.shared.update_winner_status(id, status)
    }

    /// Force one tick outside the timer schedule.
    ///
    /// Serialized with scheduled ticks; the timer's schedule is unaffected.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Disposed`] after [`dispose`](Self::dispose).
    pub fn refresh(&self) -> Result<TickSummary, StoreError> {
        let summary = self.shared.tick()?;
        debug!(
            tick = summary.tick,
            scans_added = summary.scans_added,
            listeners = summary.listeners_notified,
            "Manual refresh"
        );
        Ok(summary)
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Stop the tick timer, drop every listener, and move to
    /// [`StoreStatus::Idle`]. Safe to call any number of times.
    pub fn dispose(&self) {
        if self.shared.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.shared.shutdown.notify_waiters();
        if let Some(handle) = self
            .timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
        self.shared.listeners.close();
        info!(ticks = self.tick_count(), "Store disposed");
    }

    /// A weak read handle that does not keep the store alive.
    pub(crate) fn reader(&self) -> StoreReader {
        StoreReader {
            shared: Arc::downgrade(&self.shared),
        }
    }
}

impl Drop for Store {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl core::fmt::Debug for Store {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Store")
            .field("status", &self.status())
            .field("tick_interval", &self.tick_interval)
            .field("subscribers", &self.subscriber_count())
            .finish_non_exhaustive()
    }
}

/// Weak read access to a store, held by listeners so they do not keep the
/// store alive.
#[derive(Clone)]
pub(crate) struct StoreReader {
    shared: Weak<Shared>,
}

impl StoreReader {
    /// Run `f` against the current state, or return `None` if the store is
    /// gone.
    pub(crate) fn with_state<T>(&self, f: impl FnOnce(&StoreState) -> T) -> Option<T> {
        let shared = self.shared.upgrade()?;
        let state = shared.read();
        Some(f(&state))
    }
}

/// Drive scheduled ticks until the store is disposed.
async fn run_timer(shared: Arc<Shared>, period: Duration) {
    let first = Instant::now().checked_add(period).unwrap_or_else(Instant::now);
    let mut interval = tokio::time::interval_at(first, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            () = shared.shutdown.notified() => break,
        }
        if shared.is_disposed() {
            break;
        }
        // The only failure a tick reports is disposal.
        let Ok(summary) = shared.tick() else {
            break;
        };
        debug!(
            tick = summary.tick,
            scans_added = summary.scans_added,
            new_winner = summary.new_winner.as_ref().map(ToString::to_string),
            listeners = summary.listeners_notified,
            failures = summary.listener_failures,
            "Tick committed"
        );
    }

    debug!("Tick timer stopped");
}

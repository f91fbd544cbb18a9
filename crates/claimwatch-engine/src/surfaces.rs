//! The dashboard surfaces the engine keeps live, and the tasks that log
//! them.
//!
//! Each surface is a projector handed to a [`ConsumerAdapter`]. [`follow`]
//! spawns a task that logs every new projection until the adapter is
//! deactivated or the store is disposed.

use chrono::Utc;
use claimwatch_core::projection::{self, DashboardView};
use claimwatch_core::{ConsumerAdapter, StoreState};
use claimwatch_types::{ActivityEvent, ActivityStatus, TimeWindow};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// The activity feed as the dashboard sidebar shows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedView {
    /// Tick the feed was projected at.
    pub tick: u64,
    /// Entries inside the window, newest first.
    pub entries: Vec<ActivityEvent>,
    /// Entries flagged as warnings.
    pub warnings: usize,
    /// Entries flagged as errors.
    pub errors: usize,
}

/// Overview surface: stats, winners, and activities through `window`.
pub fn overview(
    window: TimeWindow,
) -> impl Fn(&StoreState) -> DashboardView + Send + Sync + 'static {
    move |state| projection::dashboard_view(state, window, Utc::now())
}

/// Activity feed surface.
pub fn activity_feed(
    window: TimeWindow,
) -> impl Fn(&StoreState) -> FeedView + Send + Sync + 'static {
    move |state| {
        let entries = projection::activities_for_window(&state.activities, window, Utc::now());
        let count = |status: ActivityStatus| entries.iter().filter(|a| a.status == status).count();
        let warnings = count(ActivityStatus::Warning);
        let errors = count(ActivityStatus::Error);
        FeedView {
            tick: state.tick,
            entries,
            warnings,
            errors,
        }
    }
}

/// Log an overview projection.
pub fn log_overview(surface: &str, view: &DashboardView) {
    info!(
        surface,
        tick = view.tick,
        window = view.window.as_str(),
        registered_scans = view.stats.registered_scans,
        unique_winners = view.stats.unique_winners,
        released_amount = %view.stats.released_amount,
        escrow_status = view.stats.escrow_status,
        winners = view.winners.len(),
        "Overview updated"
    );
}

/// Log an activity feed projection.
pub fn log_feed(surface: &str, view: &FeedView) {
    info!(
        surface,
        tick = view.tick,
        entries = view.entries.len(),
        warnings = view.warnings,
        errors = view.errors,
        latest = view.entries.first().map_or("", |a| a.message.as_str()),
        "Activity feed updated"
    );
}

/// Spawn a task that logs each projection `adapter` publishes.
///
/// The task ends once the adapter stops publishing (deactivated, dropped,
/// or its store disposed) and yields the last projection it saw.
pub fn follow<P>(adapter: &ConsumerAdapter<P>, log: fn(&str, &P)) -> JoinHandle<P>
where
    P: Clone + Send + Sync + 'static,
{
    let surface = adapter.name().to_owned();
    let mut rx = adapter.watch();
    tokio::spawn(async move {
        let first = rx.borrow_and_update().clone();
        log(&surface, &first);

        let mut updates: u64 = 0;
        while rx.changed().await.is_ok() {
            updates = updates.saturating_add(1);
            let view = rx.borrow_and_update().clone();
            log(&surface, &view);
        }

        let last = rx.borrow().clone();
        debug!(surface = %surface, updates, "Surface stopped");
        last
    })
}

//! One tick: apply every mutation function to the current state.
//!
//! [`run_tick`] is the single code path shared by the timer and by
//! [`Store::refresh`](crate::store::Store::refresh). It is pure: it reads a
//! state and returns the next one, leaving the commit and the notification
//! pass to the store.

use chrono::{DateTime, Utc};
use claimwatch_types::{ActivityEvent, ActivityKind, OverviewStats, Winner, WinnerId};
use rand::Rng;

use crate::mutation;

/// The store's authoritative state. Also the snapshot type handed to
/// readers, who receive it by value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreState {
    /// Number of committed ticks (timer-driven or forced).
    pub tick: u64,
    /// Campaign-wide counters.
    pub stats: OverviewStats,
    /// Claims, newest first.
    pub winners: Vec<Winner>,
    /// Activity feed, newest first.
    pub activities: Vec<ActivityEvent>,
}

/// Retention bounds applied on every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    /// Maximum activity entries kept.
    pub max_activities: usize,
    /// Maximum winners kept.
    pub max_winners: usize,
}

/// What a tick changed, for logging and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickSummary {
    /// The tick number that was committed.
    pub tick: u64,
    /// The instant the tick stamped its changes with.
    pub at: DateTime<Utc>,
    /// Scans added to `registered_scans`.
    pub scans_added: u64,
    /// Kind of the activity entry the tick appended.
    pub activity_kind: Option<ActivityKind>,
    /// Claim added this tick, if any.
    pub new_winner: Option<WinnerId>,
    /// Winner count after the tick.
    pub winners: usize,
    /// Activity count after the tick.
    pub activities: usize,
    /// Listeners invoked after the commit.
    pub listeners_notified: usize,
    /// Listeners that failed during the notification pass.
    pub listener_failures: usize,
}

/// Compute the next state from `state`.
///
/// The tick counter advances by one (saturating). Listener counts in the
/// returned summary are zero; the store fills them in after notifying.
pub fn run_tick<R: Rng>(
    state: &StoreState,
    rng: &mut R,
    now: DateTime<Utc>,
    bounds: Bounds,
) -> (StoreState, TickSummary) {
    let stats = mutation::next_stats(&state.stats, rng, now);
    let activities = mutation::next_activity(&state.activities, rng, now, bounds.max_activities);
    let winners = mutation::next_winners(&state.winners, rng, now, bounds.max_winners);

    let new_winner = winners
        .first()
        .filter(|head| state.winners.iter().all(|w| w.id != head.id))
        .map(|head| head.id.clone());

    let next = StoreState {
        tick: state.tick.saturating_add(1),
        stats,
        winners,
        activities,
    };

    let summary = TickSummary {
        tick: next.tick,
        at: now,
        scans_added: next
            .stats
            .registered_scans
            .saturating_sub(state.stats.registered_scans),
        activity_kind: next.activities.first().map(|a| a.kind),
        new_winner,
        winners: next.winners.len(),
        activities: next.activities.len(),
        listeners_notified: 0,
        listener_failures: 0,
    };

    (next, summary)
}

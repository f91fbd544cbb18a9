//! Window-scoped, read-only views over the store's full history.
//!
//! Nothing here mutates or retains its input. Stats are scaled by a fixed
//! multiplier per window; activity and winner lists are filtered by a cutoff
//! instant derived from the window and the caller's `now`.
//!
//! | Window      | Stats multiplier | Cutoff                     |
//! |-------------|------------------|----------------------------|
//! | `Today`     | 0.012            | start of the UTC day       |
//! | `ThisWeek`  | 0.085            | `now - 7 days`             |
//! | `ThisMonth` | 0.34             | `now - 1 calendar month`   |
//! | `ThisYear`  | 0.87             | `now - 1 calendar year`    |
//! | `AllTime`   | 1                | Unix epoch                 |
//!
//! Window names that do not parse resolve to `ThisWeek`
//! (see [`TimeWindow::from_name`]).

use chrono::{DateTime, Months, NaiveTime, TimeDelta, Utc};
use claimwatch_types::{ActivityEvent, OverviewStats, TimeWindow, Winner};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::tick::StoreState;

/// Decimal places kept for currency amounts.
const CURRENCY_DP: u32 = 2;

/// Decimal places kept for certificate counts.
const CERTIFICATE_DP: u32 = 3;

/// Share of the full-history counters attributed to `window`.
pub fn multiplier(window: TimeWindow) -> Decimal {
    match window {
        TimeWindow::Today => Decimal::new(12, 3),
        TimeWindow::ThisWeek => Decimal::new(85, 3),
        TimeWindow::ThisMonth => Decimal::new(34, 2),
        TimeWindow::ThisYear => Decimal::new(87, 2),
        TimeWindow::AllTime => Decimal::ONE,
    }
}

/// Scale full-history stats down to `window`.
///
/// Integer counters are truncated; `released_amount` is rounded to cents and
/// `notary_certificates` to three places. `escrow_status` and
/// `last_updated` are not windowed and pass through unchanged.
pub fn stats_for_window(stats: &OverviewStats, window: TimeWindow) -> OverviewStats {
    let factor = multiplier(window);
    OverviewStats {
        registered_scans: scale_count(stats.registered_scans, factor),
        unique_winners: scale_count(stats.unique_winners, factor),
        released_amount: stats
            .released_amount
            .saturating_mul(factor)
            .round_dp(CURRENCY_DP),
        documents_verified: scale_count(stats.documents_verified, factor),
        escrow_status: stats.escrow_status,
        notary_certificates: stats
            .notary_certificates
            .saturating_mul(factor)
            .round_dp(CERTIFICATE_DP),
        last_updated: stats.last_updated,
    }
}

fn scale_count(value: u64, factor: Decimal) -> u64 {
    Decimal::from(value)
        .saturating_mul(factor)
        .trunc()
        .to_u64()
        .unwrap_or(value)
}

/// Earliest instant included in `window`, as seen at `now`.
pub fn window_start(window: TimeWindow, now: DateTime<Utc>) -> DateTime<Utc> {
    match window {
        TimeWindow::Today => now.date_naive().and_time(NaiveTime::MIN).and_utc(),
        TimeWindow::ThisWeek => now
            .checked_sub_signed(TimeDelta::days(7))
            .unwrap_or(DateTime::<Utc>::MIN_UTC),
        TimeWindow::ThisMonth => now
            .checked_sub_months(Months::new(1))
            .unwrap_or(DateTime::<Utc>::MIN_UTC),
        TimeWindow::ThisYear => now
            .checked_sub_months(Months::new(12))
            .unwrap_or(DateTime::<Utc>::MIN_UTC),
        TimeWindow::AllTime => DateTime::<Utc>::UNIX_EPOCH,
    }
}

/// Activity entries inside `window`, in their original order.
pub fn activities_for_window(
    activities: &[ActivityEvent],
    window: TimeWindow,
    now: DateTime<Utc>,
) -> Vec<ActivityEvent> {
    let cutoff = window_start(window, now);
    activities
        .iter()
        .filter(|a| a.timestamp >= cutoff)
        .cloned()
        .collect()
}

/// Winners whose last change falls inside `window`, in their original
/// order.
pub fn winners_for_window(
    winners: &[Winner],
    window: TimeWindow,
    now: DateTime<Utc>,
) -> Vec<Winner> {
    let cutoff = window_start(window, now);
    winners
        .iter()
        .filter(|w| w.timestamp >= cutoff)
        .cloned()
        .collect()
}

/// Everything one dashboard surface renders for a window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardView {
    /// The window the view was projected through.
    pub window: TimeWindow,
    /// Tick the source state was taken at.
    pub tick: u64,
    /// Windowed stats.
    pub stats: OverviewStats,
    /// Winners inside the window.
    pub winners: Vec<Winner>,
    /// Activity entries inside the window.
    pub activities: Vec<ActivityEvent>,
}

/// Project a full store state through `window`.
pub fn dashboard_view(state: &StoreState, window: TimeWindow, now: DateTime<Utc>) -> DashboardView {
    DashboardView {
        window,
        tick: state.tick,
        stats: stats_for_window(&state.stats, window),
        winners: winners_for_window(&state.winners, window, now),
        activities: activities_for_window(&state.activities, window, now),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use claimwatch_types::{ActivityId, ActivityKind, ActivityStatus};

    use super::*;
    use crate::seed;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap()
    }

    fn event_at(timestamp: DateTime<Utc>, message: &str) -> ActivityEvent {
        ActivityEvent {
            id: ActivityId::new(),
            kind: ActivityKind::Scan,
            message: message.to_owned(),
            timestamp,
            status: ActivityStatus::Success,
        }
    }

    #[test]
    fn all_time_is_identity_and_idempotent() {
        let stats = seed::initial_stats(fixed_now());
        let once = stats_for_window(&stats, TimeWindow::AllTime);
        let twice = stats_for_window(&stats, TimeWindow::AllTime);
        assert_eq!(once, twice);
        assert_eq!(once.registered_scans, stats.registered_scans);
        assert_eq!(once.released_amount, stats.released_amount);
    }

    #[test]
    fn week_scales_and_truncates() {
        let stats = seed::initial_stats(fixed_now());
        let week = stats_for_window(&stats, TimeWindow::ThisWeek);
        // 4_981_224 * 0.085 = 423_404.04
        assert_eq!(week.registered_scans, 423_404);
        // 12_408 * 0.085 = 1_054.68
        assert_eq!(week.unique_winners, 1_054);
        // 2_847_500 * 0.085 = 242_037.5
        assert_eq!(week.released_amount, Decimal::new(24_203_750, 2));
        // 1.247 * 0.085 = 0.105995
        assert_eq!(week.notary_certificates, Decimal::new(106, 3));
        assert_eq!(week.escrow_status, stats.escrow_status);
        assert_eq!(week.last_updated, stats.last_updated);
    }

    #[test]
    fn shorter_windows_never_exceed_longer_ones() {
        let stats = seed::initial_stats(fixed_now());
        let scans: Vec<u64> = TimeWindow::ALL
            .iter()
            .map(|&w| stats_for_window(&stats, w).registered_scans)
            .collect();
        assert!(scans.windows(2).all(|pair| pair.first() <= pair.get(1)));
    }

    #[test]
    fn unknown_window_name_uses_week_multiplier() {
        let stats = seed::initial_stats(fixed_now());
        let named = stats_for_window(&stats, TimeWindow::from_name("quarter"));
        assert_eq!(named, stats_for_window(&stats, TimeWindow::ThisWeek));
    }

    #[test]
    fn today_keeps_only_todays_entries() {
        let now = fixed_now();
        let activities = vec![
            event_at(now - TimeDelta::minutes(10), "recent"),
            event_at(now - TimeDelta::days(2), "old"),
        ];
        let today = activities_for_window(&activities, TimeWindow::Today, now);
        assert_eq!(today.len(), 1);
        assert_eq!(today.first().unwrap().message, "recent");
    }

    #[test]
    fn today_starts_at_midnight_utc() {
        let now = fixed_now();
        let midnight = Utc.with_ymd_and_hms(2026, 10, 17, 0, 0, 0).unwrap();
        assert_eq!(window_start(TimeWindow::Today, now), midnight);

        let activities = vec![
            event_at(midnight, "at midnight"),
            event_at(midnight - TimeDelta::seconds(1), "just before"),
        ];
        let today = activities_for_window(&activities, TimeWindow::Today, now);
        assert_eq!(today.len(), 1);
        assert_eq!(today.first().unwrap().message, "at midnight");
    }

    #[test]
    fn window_starts() {
        let now = fixed_now();
        assert_eq!(
            window_start(TimeWindow::ThisWeek, now),
            Utc.with_ymd_and_hms(2026, 10, 10, 12, 0, 0).unwrap()
        );
        assert_eq!(
            window_start(TimeWindow::ThisMonth, now),
            Utc.with_ymd_and_hms(2026, 9, 17, 12, 0, 0).unwrap()
        );
        assert_eq!(
            window_start(TimeWindow::ThisYear, now),
            Utc.with_ymd_and_hms(2025, 10, 17, 12, 0, 0).unwrap()
        );
        assert_eq!(window_start(TimeWindow::AllTime, now), DateTime::<Utc>::UNIX_EPOCH);
    }

    #[test]
    fn filtering_preserves_order() {
        let now = fixed_now();
        let activities: Vec<ActivityEvent> = (0..6)
            .map(|n| event_at(now - TimeDelta::days(n * 3), &format!("entry {n}")))
            .collect();
        let week = activities_for_window(&activities, TimeWindow::ThisWeek, now);
        let messages: Vec<&str> = week.iter().map(|a| a.message.as_str()).collect();
        assert_eq!(messages, vec!["entry 0", "entry 1", "entry 2"]);
    }

    #[test]
    fn dashboard_view_bundles_projections() {
        let now = fixed_now();
        let state = seed::initial_state(now);
        let view = dashboard_view(&state, TimeWindow::Today, now);
        assert_eq!(view.window, TimeWindow::Today);
        assert_eq!(view.tick, state.tick);
        assert_eq!(view.activities.len(), state.activities.len());
        assert_eq!(view.winners.len(), state.winners.len());
        assert_eq!(view.stats, stats_for_window(&state.stats, TimeWindow::Today));
    }
}

//! Starting dataset shown before the first tick.
//!
//! Timestamps are expressed relative to `now` so the seed looks live no
//! matter when the store starts.

use chrono::{DateTime, Duration, Utc};
use claimwatch_types::{
    ActivityEvent, ActivityId, ActivityKind, ActivityStatus, OverviewStats, Winner, WinnerId,
    WinnerStatus,
};
use rust_decimal::Decimal;

use crate::tick::StoreState;

/// Registered scans at campaign launch.
pub const INITIAL_REGISTERED_SCANS: u64 = 4_981_224;

/// Build the full starting state.
pub fn initial_state(now: DateTime<Utc>) -> StoreState {
    StoreState {
        tick: 0,
        stats: initial_stats(now),
        winners: initial_winners(now),
        activities: initial_activities(now),
    }
}

/// Overview counters at launch.
pub fn initial_stats(now: DateTime<Utc>) -> OverviewStats {
    OverviewStats {
        registered_scans: INITIAL_REGISTERED_SCANS,
        unique_winners: 12_408,
        released_amount: Decimal::new(2_847_500, 0),
        documents_verified: 3_117,
        escrow_status: 98,
        notary_certificates: Decimal::new(1_247, 3),
        last_updated: now,
    }
}

/// Recent claims, newest first.
pub fn initial_winners(now: DateTime<Utc>) -> Vec<Winner> {
    vec![
        seed_winner(
            2299,
            "CW-4F21A0",
            "Smartwatch",
            WinnerStatus::Processing,
            now - Duration::minutes(2),
            None,
            Some("Lisbon"),
        ),
        seed_winner(
            2298,
            "CW-0B77C3",
            "Gift card 50",
            WinnerStatus::Claimed,
            now - Duration::minutes(9),
            Some(Decimal::from(50)),
            Some("Madrid"),
        ),
        seed_winner(
            2297,
            "CW-91DE04",
            "Weekend trip voucher",
            WinnerStatus::Pending,
            now - Duration::minutes(17),
            None,
            Some("Berlin"),
        ),
        seed_winner(
            2296,
            "CW-5C3B9E",
            "Wireless earbuds",
            WinnerStatus::Rejected,
            now - Duration::minutes(31),
            None,
            None,
        ),
        seed_winner(
            2295,
            "CW-E2A613",
            "Gift card 25",
            WinnerStatus::Claimed,
            now - Duration::hours(1),
            Some(Decimal::from(25)),
            Some("Warsaw"),
        ),
        seed_winner(
            2294,
            "CW-7D0F58",
            "Grand prize cash",
            WinnerStatus::Processing,
            now - Duration::hours(3),
            None,
            Some("Milan"),
        ),
    ]
}

/// Recent feed entries, newest first.
pub fn initial_activities(now: DateTime<Utc>) -> Vec<ActivityEvent> {
    [
        (
            ActivityKind::Scan,
            "QR code scanned at partner kiosk",
            ActivityStatus::Success,
            Duration::seconds(20),
        ),
        (
            ActivityKind::Winner,
            "Claim submitted for review",
            ActivityStatus::Success,
            Duration::minutes(2),
        ),
        (
            ActivityKind::Verification,
            "Identity document verified",
            ActivityStatus::Warning,
            Duration::minutes(6),
        ),
        (
            ActivityKind::Payout,
            "Escrow release confirmed",
            ActivityStatus::Success,
            Duration::minutes(9),
        ),
        (
            ActivityKind::Scan,
            "Duplicate scan filtered by audit rules",
            ActivityStatus::Error,
            Duration::minutes(14),
        ),
    ]
    .into_iter()
    .map(|(kind, message, status, age)| ActivityEvent {
        id: ActivityId::new(),
        kind,
        message: message.to_owned(),
        timestamp: now - age,
        status,
    })
    .collect()
}

fn seed_winner(
    number: u32,
    claim_code: &str,
    prize: &str,
    status: WinnerStatus,
    timestamp: DateTime<Utc>,
    payout: Option<Decimal>,
    location: Option<&str>,
) -> Winner {
    Winner {
        id: WinnerId::from_number(number),
        claim_code: claim_code.to_owned(),
        prize: prize.to_owned(),
        status,
        timestamp,
        payout,
        location: location.map(str::to_owned),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn seed_is_newest_first_and_unique() {
        let now = Utc::now();
        let state = initial_state(now);

        let ids: BTreeSet<&str> = state.winners.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids.len(), state.winners.len());

        assert!(state
            .winners
            .windows(2)
            .all(|pair| pair.first().map(|w| w.timestamp) >= pair.get(1).map(|w| w.timestamp)));
        assert!(state
            .activities
            .windows(2)
            .all(|pair| pair.first().map(|a| a.timestamp) >= pair.get(1).map(|a| a.timestamp)));
    }

    #[test]
    fn seed_contains_processing_2299() {
        let winners = initial_winners(Utc::now());
        let winner = winners.iter().find(|w| w.id.as_str() == "#2299");
        assert_eq!(winner.map(|w| w.status), Some(WinnerStatus::Processing));
    }

    #[test]
    fn seed_fits_default_bounds() {
        let state = initial_state(Utc::now());
        assert!(state.winners.len() <= 100);
        assert!(state.activities.len() <= 50);
        assert_eq!(state.stats.registered_scans, INITIAL_REGISTERED_SCANS);
        assert_eq!(state.tick, 0);
    }
}

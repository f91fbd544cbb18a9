//! Mutation engine: pure next-state functions for every record kind.
//!
//! Each function takes the current value, a random source, and the instant
//! to stamp changes with, and returns the next value. Nothing here touches
//! shared state; the store commits the results. Given the same inputs and a
//! seeded [`rand::rngs::StdRng`], every function is deterministic.
//!
//! # Probabilities
//!
//! | Change                              | Chance per tick |
//! |-------------------------------------|-----------------|
//! | `registered_scans += 1..=10`        | always          |
//! | `unique_winners += 1`               | 30%             |
//! | `released_amount += 10..=110`       | 20%             |
//! | `documents_verified += 1`           | 10%             |
//! | `escrow_status += 1`                | 5%              |
//! | `escrow_status -= 1` (if no rise)   | 5%              |
//! | `notary_certificates += 0.001`      | 5%              |
//! | new activity entry                  | always          |
//! | resolve one open claim              | 70%             |
//! | new `Processing` claim              | 80%             |

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use claimwatch_types::{
    ActivityEvent, ActivityId, ActivityKind, ActivityStatus, OverviewStats, Winner, WinnerId,
    WinnerStatus,
};
use rand::Rng;
use rand::seq::IndexedRandom;
use rust_decimal::Decimal;

/// Upper bound of `escrow_status`.
pub const ESCROW_MAX: u8 = 100;

const UNIQUE_WINNER_CHANCE: f64 = 0.3;
const RELEASE_CHANCE: f64 = 0.2;
const DOCUMENT_CHANCE: f64 = 0.1;
const ESCROW_RISE_CHANCE: f64 = 0.05;
const ESCROW_DIP_CHANCE: f64 = 0.05;
const CERTIFICATE_CHANCE: f64 = 0.05;
const RESOLVE_CHANCE: f64 = 0.7;
const NEW_WINNER_CHANCE: f64 = 0.8;

/// Claim numbers are four digits, matching the `#NNNN` codes on tickets.
const WINNER_NUMBER_MIN: u32 = 1000;
const WINNER_NUMBER_MAX: u32 = 9999;

const SCAN_MESSAGES: &[&str] = &[
    "QR code scanned at partner kiosk",
    "Ticket scan registered via mobile app",
    "Batch of receipt scans ingested",
    "Duplicate scan filtered by audit rules",
];

const WINNER_MESSAGES: &[&str] = &[
    "New winner drawn from verified entries",
    "Instant-win prize assigned",
    "Claim submitted for review",
    "Winner eligibility confirmed",
];

const PAYOUT_MESSAGES: &[&str] = &[
    "Escrow release confirmed",
    "Prize payout transferred",
    "Payout batch settled on chain",
    "Sponsor top-up received in escrow",
];

const VERIFICATION_MESSAGES: &[&str] = &[
    "Notary certificate issued",
    "Document hash anchored to block",
    "Identity document verified",
    "Audit trail checkpoint signed",
];

/// Prize catalogue: description and the payout released when claimed.
const PRIZES: &[(&str, i64)] = &[
    ("Gift card 25", 25),
    ("Gift card 50", 50),
    ("Wireless earbuds", 120),
    ("Smartwatch", 250),
    ("Weekend trip voucher", 800),
    ("Grand prize cash", 5000),
];

const LOCATIONS: &[&str] = &[
    "Lisbon", "Madrid", "Berlin", "Warsaw", "Milan", "Paris", "Vienna", "Prague",
];

/// Chance a new claim carries a submission location.
const LOCATION_CHANCE: f64 = 0.9;

// ---------------------------------------------------------------------------
// Overview stats
// ---------------------------------------------------------------------------

/// Compute the next overview stats.
///
/// Counters only grow (saturating at their numeric limit); `escrow_status`
/// drifts by at most one point and is clamped to `0..=100`.
pub fn next_stats<R: Rng>(
    current: &OverviewStats,
    rng: &mut R,
    now: DateTime<Utc>,
) -> OverviewStats {
    let scans = rng.random_range(1..=10_u64);

    let unique_winners = if rng.random_bool(UNIQUE_WINNER_CHANCE) {
        current.unique_winners.saturating_add(1)
    } else {
        current.unique_winners
    };

    let released_amount = if rng.random_bool(RELEASE_CHANCE) {
        let release = Decimal::from(rng.random_range(10..=110_u32));
        current.released_amount.saturating_add(release)
    } else {
        current.released_amount
    };

    let documents_verified = if rng.random_bool(DOCUMENT_CHANCE) {
        current.documents_verified.saturating_add(1)
    } else {
        current.documents_verified
    };

    let escrow_status = if rng.random_bool(ESCROW_RISE_CHANCE) {
        current.escrow_status.saturating_add(1)
    } else if rng.random_bool(ESCROW_DIP_CHANCE) {
        current.escrow_status.saturating_sub(1)
    } else {
        current.escrow_status
    }
    .min(ESCROW_MAX);

    let notary_certificates = if rng.random_bool(CERTIFICATE_CHANCE) {
        current
            .notary_certificates
            .saturating_add(Decimal::new(1, 3))
            .round_dp(3)
            .max(current.notary_certificates)
    } else {
        current.notary_certificates
    };

    OverviewStats {
        registered_scans: current.registered_scans.saturating_add(scans),
        unique_winners,
        released_amount,
        documents_verified,
        escrow_status,
        notary_certificates,
        last_updated: now,
    }
}

// ---------------------------------------------------------------------------
// Activity feed
// ---------------------------------------------------------------------------

/// Prepend one synthesized activity entry and keep at most `max` entries.
pub fn next_activity<R: Rng>(
    current: &[ActivityEvent],
    rng: &mut R,
    now: DateTime<Utc>,
    max: usize,
) -> Vec<ActivityEvent> {
    let event = random_activity(rng, now);
    let mut next = Vec::with_capacity(current.len().saturating_add(1).min(max));
    next.push(event);
    next.extend(current.iter().take(max.saturating_sub(1)).cloned());
    next.truncate(max);
    next
}

/// Synthesize a single activity entry.
pub fn random_activity<R: Rng>(rng: &mut R, now: DateTime<Utc>) -> ActivityEvent {
    let kind = ActivityKind::ALL
        .choose(rng)
        .copied()
        .unwrap_or(ActivityKind::Scan);
    let message = phrases_for(kind)
        .choose(rng)
        .copied()
        .unwrap_or("Activity recorded");
    let status = ActivityStatus::ALL
        .choose(rng)
        .copied()
        .unwrap_or(ActivityStatus::Success);

    ActivityEvent {
        id: ActivityId::new(),
        kind,
        message: message.to_owned(),
        timestamp: now,
        status,
    }
}

const fn phrases_for(kind: ActivityKind) -> &'static [&'static str] {
    match kind {
        ActivityKind::Scan => SCAN_MESSAGES,
        ActivityKind::Winner => WINNER_MESSAGES,
        ActivityKind::Payout => PAYOUT_MESSAGES,
        ActivityKind::Verification => VERIFICATION_MESSAGES,
    }
}

// ---------------------------------------------------------------------------
// Winners
// ---------------------------------------------------------------------------

/// Compute the next winner list.
///
/// With 70% chance one open claim (pending or processing) is resolved to
/// claimed or rejected; independently, with 80% chance a new processing
/// claim is prepended. The result keeps at most `max` entries, dropping
/// from the tail. Identifiers stay unique.
pub fn next_winners<R: Rng>(
    current: &[Winner],
    rng: &mut R,
    now: DateTime<Utc>,
    max: usize,
) -> Vec<Winner> {
    let mut winners = current.to_vec();

    if rng.random_bool(RESOLVE_CHANCE) {
        resolve_random_claim(&mut winners, rng, now);
    }

    if rng.random_bool(NEW_WINNER_CHANCE) {
        if let Some(winner) = random_winner(&winners, rng, now) {
            winners.insert(0, winner);
        }
    }

    winners.truncate(max);
    winners
}

/// Settle one uniformly chosen open claim, if any exists.
fn resolve_random_claim<R: Rng>(winners: &mut [Winner], rng: &mut R, now: DateTime<Utc>) {
    let open: Vec<usize> = winners
        .iter()
        .enumerate()
        .filter(|(_, w)| w.status.is_open())
        .map(|(idx, _)| idx)
        .collect();

    let Some(&idx) = open.choose(rng) else {
        return;
    };
    let status = WinnerStatus::RESOLVED
        .choose(rng)
        .copied()
        .unwrap_or(WinnerStatus::Claimed);

    if let Some(winner) = winners.get_mut(idx) {
        apply_status(winner, status, now);
    }
}

/// Set a claim's status and keep its payout consistent with it.
///
/// A claimed prize pays out its catalogue value (unless a payout was
/// already recorded); a rejected claim pays nothing.
pub fn apply_status(winner: &mut Winner, status: WinnerStatus, now: DateTime<Utc>) {
    winner.set_status(status, now);
    match status {
        WinnerStatus::Claimed => {
            if winner.payout.is_none() {
                winner.payout = Some(prize_value(&winner.prize));
            }
        }
        WinnerStatus::Rejected => winner.payout = None,
        WinnerStatus::Pending | WinnerStatus::Processing => {}
    }
}

fn prize_value(prize: &str) -> Decimal {
    PRIZES
        .iter()
        .find(|(name, _)| *name == prize)
        .map_or(Decimal::ZERO, |&(_, value)| Decimal::from(value))
}

/// Synthesize a new processing claim whose id is not in `existing`.
///
/// Returns `None` only when every four-digit claim number is taken.
pub fn random_winner<R: Rng>(
    existing: &[Winner],
    rng: &mut R,
    now: DateTime<Utc>,
) -> Option<Winner> {
    let id = fresh_winner_id(existing, rng)?;
    let prize = PRIZES.choose(rng).map_or("Gift card 25", |&(name, _)| name);
    let claim_code = format!("CW-{:06X}", rng.random_range(0..=0x00FF_FFFF_u32));
    let location = if rng.random_bool(LOCATION_CHANCE) {
        LOCATIONS.choose(rng).map(|&city| city.to_owned())
    } else {
        None
    };

    Some(Winner {
        id,
        claim_code,
        prize: prize.to_owned(),
        status: WinnerStatus::Processing,
        timestamp: now,
        payout: None,
        location,
    })
}

/// Pick a random four-digit claim number, probing forward past taken ones.
fn fresh_winner_id<R: Rng>(existing: &[Winner], rng: &mut R) -> Option<WinnerId> {
    let taken: BTreeSet<&str> = existing.iter().map(|w| w.id.as_str()).collect();
    let span = WINNER_NUMBER_MAX
        .saturating_sub(WINNER_NUMBER_MIN)
        .saturating_add(1);
    let start = rng.random_range(0..span);

    (0..span)
        .filter_map(|step| {
            let offset = start.checked_add(step)?.checked_rem(span)?;
            WINNER_NUMBER_MIN.checked_add(offset)
        })
        .map(WinnerId::from_number)
        .find(|id| !taken.contains(id.as_str()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::Duration;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::seed;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn base_stats() -> OverviewStats {
        seed::initial_stats(Utc::now())
    }

    #[test]
    fn stats_counters_never_regress() {
        let mut rng = rng();
        let mut stats = base_stats();
        for step in 0..2_000 {
            let now = stats.last_updated + Duration::seconds(3);
            let next = next_stats(&stats, &mut rng, now);
            assert!(next.registered_scans > stats.registered_scans, "step {step}");
            assert!(next.registered_scans <= stats.registered_scans + 10);
            assert!(next.unique_winners >= stats.unique_winners);
            assert!(next.unique_winners <= stats.unique_winners + 1);
            assert!(next.released_amount >= stats.released_amount);
            assert!(next.released_amount <= stats.released_amount + Decimal::from(110));
            assert!(next.documents_verified >= stats.documents_verified);
            assert!(next.notary_certificates >= stats.notary_certificates);
            assert!(next.notary_certificates.scale() <= 3);
            assert!(next.escrow_status <= ESCROW_MAX);
            assert!(next.escrow_status.abs_diff(stats.escrow_status) <= 1);
            assert_eq!(next.last_updated, now);
            stats = next;
        }
    }

    #[test]
    fn escrow_clamps_at_both_ends() {
        let mut rng = rng();
        let mut high = base_stats();
        high.escrow_status = ESCROW_MAX;
        let mut low = base_stats();
        low.escrow_status = 0;
        for _ in 0..1_000 {
            high = next_stats(&high, &mut rng, Utc::now());
            low = next_stats(&low, &mut rng, Utc::now());
            assert!(high.escrow_status <= ESCROW_MAX);
            assert!(low.escrow_status <= ESCROW_MAX);
        }
    }

    #[test]
    fn seeded_rng_is_deterministic() {
        let now = Utc::now();
        let stats = base_stats();
        let a = next_stats(&stats, &mut StdRng::seed_from_u64(9), now);
        let b = next_stats(&stats, &mut StdRng::seed_from_u64(9), now);
        assert_eq!(a, b);
    }

    #[test]
    fn activity_is_prepended_and_bounded() {
        let mut rng = rng();
        let mut feed: Vec<ActivityEvent> = Vec::new();
        for step in 0..120 {
            let now = Utc::now();
            let next = next_activity(&feed, &mut rng, now, 50);
            assert_eq!(next.len(), (step + 1).min(50));
            assert_eq!(next[0].timestamp, now);
            if let Some(previous_head) = feed.first() {
                assert_eq!(next[1].id, previous_head.id);
            }
            feed = next;
        }
        assert_eq!(feed.len(), 50);
    }

    #[test]
    fn activity_messages_match_their_kind() {
        let mut rng = rng();
        for _ in 0..200 {
            let event = random_activity(&mut rng, Utc::now());
            assert!(phrases_for(event.kind).contains(&event.message.as_str()));
        }
    }

    #[test]
    fn winners_stay_bounded_and_unique() {
        let mut rng = rng();
        let mut winners = seed::initial_winners(Utc::now());
        for _ in 0..500 {
            winners = next_winners(&winners, &mut rng, Utc::now(), 100);
            assert!(winners.len() <= 100);
            let ids: BTreeSet<&str> = winners.iter().map(|w| w.id.as_str()).collect();
            assert_eq!(ids.len(), winners.len());
        }
        assert_eq!(winners.len(), 100);
    }

    #[test]
    fn resolution_only_touches_open_claims() {
        let mut rng = rng();
        let start = Utc::now() - Duration::hours(1);
        let now = Utc::now();
        let winners = seed::initial_winners(start);
        for _ in 0..50 {
            let next = next_winners(&winners, &mut rng, now, 100);
            for before in &winners {
                let after = next.iter().find(|w| w.id == before.id).unwrap();
                if after.status != before.status {
                    assert!(before.status.is_open());
                    assert!(WinnerStatus::RESOLVED.contains(&after.status));
                    assert_eq!(after.timestamp, now);
                }
            }
        }
    }

    #[test]
    fn new_winners_are_processing() {
        let mut rng = rng();
        let existing = seed::initial_winners(Utc::now());
        let winner = random_winner(&existing, &mut rng, Utc::now()).unwrap();
        assert_eq!(winner.status, WinnerStatus::Processing);
        assert!(winner.payout.is_none());
        assert!(winner.id.as_str().starts_with('#'));
        assert!(existing.iter().all(|w| w.id != winner.id));
    }

    #[test]
    fn fresh_id_skips_taken_numbers() {
        let now = Utc::now();
        let template = seed::initial_winners(now).remove(0);
        let existing: Vec<Winner> = (WINNER_NUMBER_MIN..WINNER_NUMBER_MAX)
            .map(|n| Winner {
                id: WinnerId::from_number(n),
                ..template.clone()
            })
            .collect();
        let id = fresh_winner_id(&existing, &mut rng()).unwrap();
        assert_eq!(id, WinnerId::from_number(WINNER_NUMBER_MAX));

        let mut full = existing;
        full.push(Winner {
            id: WinnerId::from_number(WINNER_NUMBER_MAX),
            ..template
        });
        assert!(fresh_winner_id(&full, &mut rng()).is_none());
    }

    #[test]
    fn claimed_status_sets_payout_and_rejection_clears_it() {
        let now = Utc::now();
        let mut winner = random_winner(&[], &mut rng(), now).unwrap();
        apply_status(&mut winner, WinnerStatus::Claimed, now);
        assert!(winner.payout.unwrap() > Decimal::ZERO);
        apply_status(&mut winner, WinnerStatus::Rejected, now);
        assert!(winner.payout.is_none());
    }
}

//! Record structs held by the store and rendered by the dashboard.
//!
//! These are plain data. All mutation happens in `claimwatch-core`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{ActivityKind, ActivityStatus, WinnerStatus};
use crate::ids::{ActivityId, WinnerId};

// ---------------------------------------------------------------------------
// Winner
// ---------------------------------------------------------------------------

/// A prize claim submitted by a campaign participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Winner {
    /// Unique claim identifier, e.g. `#2299`.
    pub id: WinnerId,
    /// Secondary code printed on the winning ticket.
    pub claim_code: String,
    /// Human-readable prize description.
    pub prize: String,
    /// Current claim status.
    pub status: WinnerStatus,
    /// When the claim was created or last changed status.
    pub timestamp: DateTime<Utc>,
    /// Amount paid out, once known. Never negative.
    #[ts(as = "Option<String>")]
    pub payout: Option<Decimal>,
    /// Where the claim was submitted.
    pub location: Option<String>,
}

impl Winner {
    /// Move the claim to `status`, stamping the change with `at`.
    pub fn set_status(&mut self, status: WinnerStatus, at: DateTime<Utc>) {
        self.status = status;
        self.timestamp = at;
    }
}

// ---------------------------------------------------------------------------
// Overview statistics
// ---------------------------------------------------------------------------

/// Campaign-wide aggregate counters shown on the overview cards.
///
/// Every counter is non-decreasing from tick to tick except
/// `escrow_status`, which stays within `0..=100` but may move either way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct OverviewStats {
    /// Total ticket scans registered.
    pub registered_scans: u64,
    /// Distinct participants who have won something.
    pub unique_winners: u64,
    /// Currency released from escrow so far.
    #[ts(as = "String")]
    pub released_amount: Decimal,
    /// Documents that passed notary verification.
    pub documents_verified: u64,
    /// Escrow funding level as a percentage.
    pub escrow_status: u8,
    /// Notary certificates issued, in thousands (three decimal places).
    #[ts(as = "String")]
    pub notary_certificates: Decimal,
    /// Instant of the most recent mutation.
    pub last_updated: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Activity log
// ---------------------------------------------------------------------------

/// One entry in the live activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ActivityEvent {
    /// Unique event identifier.
    pub id: ActivityId,
    /// Which part of the campaign produced the event.
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    /// Feed text.
    pub message: String,
    /// When the event happened.
    pub timestamp: DateTime<Utc>,
    /// Outcome severity.
    pub status: ActivityStatus,
}

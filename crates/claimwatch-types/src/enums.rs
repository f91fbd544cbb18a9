//! Enumeration types for dashboard records and projections.

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Error returned when a string does not name a known enum variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    /// Which enum was being parsed (e.g. `"winner status"`).
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

impl UnknownVariant {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// Winner status
// ---------------------------------------------------------------------------

/// Processing state of a prize claim.
///
/// Transitions are unconstrained: any status may follow any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum WinnerStatus {
    /// Prize has been paid out.
    Claimed,
    /// Claim submitted, not yet picked up for review.
    Pending,
    /// Claim was refused.
    Rejected,
    /// Claim is under review.
    Processing,
}

impl WinnerStatus {
    /// Every status, in declaration order.
    pub const ALL: [Self; 4] = [Self::Claimed, Self::Pending, Self::Rejected, Self::Processing];

    /// Statuses a claim can settle into.
    pub const RESOLVED: [Self; 2] = [Self::Claimed, Self::Rejected];

    /// Whether the claim is still awaiting a decision.
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Pending | Self::Processing)
    }

    /// Lowercase wire name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Claimed => "claimed",
            Self::Pending => "pending",
            Self::Rejected => "rejected",
            Self::Processing => "processing",
        }
    }
}

impl core::fmt::Display for WinnerStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WinnerStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "claimed" => Ok(Self::Claimed),
            "pending" => Ok(Self::Pending),
            "rejected" => Ok(Self::Rejected),
            "processing" => Ok(Self::Processing),
            _ => Err(UnknownVariant::new("winner status", s)),
        }
    }
}

// ---------------------------------------------------------------------------
// Activity
// ---------------------------------------------------------------------------

/// What kind of campaign activity an event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum ActivityKind {
    /// A QR code or ticket was scanned.
    Scan,
    /// A new winner was drawn.
    Winner,
    /// Funds were released from escrow.
    Payout,
    /// A document was checked by the notary.
    Verification,
}

impl ActivityKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 4] = [Self::Scan, Self::Winner, Self::Payout, Self::Verification];
}

/// Outcome severity of an activity event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum ActivityStatus {
    /// Completed normally.
    Success,
    /// Completed with something worth a look.
    Warning,
    /// Failed.
    Error,
}

impl ActivityStatus {
    /// Every status, in declaration order.
    pub const ALL: [Self; 3] = [Self::Success, Self::Warning, Self::Error];
}

// ---------------------------------------------------------------------------
// Time windows
// ---------------------------------------------------------------------------

/// A named time range used to scope dashboard projections.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum TimeWindow {
    /// Since the start of the current UTC day.
    Today,
    /// The trailing seven days.
    #[default]
    ThisWeek,
    /// The trailing calendar month.
    ThisMonth,
    /// The trailing calendar year.
    ThisYear,
    /// Everything the store holds.
    AllTime,
}

impl TimeWindow {
    /// Every window, shortest first.
    pub const ALL: [Self; 5] = [
        Self::Today,
        Self::ThisWeek,
        Self::ThisMonth,
        Self::ThisYear,
        Self::AllTime,
    ];

    /// Resolve a window name, falling back to [`TimeWindow::ThisWeek`] for
    /// anything unrecognized.
    ///
    /// Accepts the wire names (`this_week`), the display names
    /// (`ThisWeek`), kebab case, and the short forms the dashboard's period
    /// selector uses (`week`, `month`, `year`, `all`).
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }

    /// Snake-case wire name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::ThisWeek => "this_week",
            Self::ThisMonth => "this_month",
            Self::ThisYear => "this_year",
            Self::AllTime => "all_time",
        }
    }
}

impl core::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeWindow {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "today" | "day" => Ok(Self::Today),
            "thisweek" | "week" => Ok(Self::ThisWeek),
            "thismonth" | "month" => Ok(Self::ThisMonth),
            "thisyear" | "year" => Ok(Self::ThisYear),
            "alltime" | "all" => Ok(Self::AllTime),
            _ => Err(UnknownVariant::new("time window", s)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn winner_status_parses_case_insensitively() {
        assert_eq!("claimed".parse::<WinnerStatus>().unwrap(), WinnerStatus::Claimed);
        assert_eq!(" Processing ".parse::<WinnerStatus>().unwrap(), WinnerStatus::Processing);
        assert!("paid".parse::<WinnerStatus>().is_err());
    }

    #[test]
    fn open_statuses() {
        assert!(WinnerStatus::Pending.is_open());
        assert!(WinnerStatus::Processing.is_open());
        assert!(!WinnerStatus::Claimed.is_open());
        assert!(!WinnerStatus::Rejected.is_open());
    }

    #[test]
    fn window_name_aliases() {
        assert_eq!(TimeWindow::from_name("Today"), TimeWindow::Today);
        assert_eq!(TimeWindow::from_name("this_month"), TimeWindow::ThisMonth);
        assert_eq!(TimeWindow::from_name("ThisYear"), TimeWindow::ThisYear);
        assert_eq!(TimeWindow::from_name("all-time"), TimeWindow::AllTime);
        assert_eq!(TimeWindow::from_name("all"), TimeWindow::AllTime);
    }

    #[test]
    fn unknown_window_falls_back_to_this_week() {
        assert_eq!(TimeWindow::from_name("fortnight"), TimeWindow::ThisWeek);
        assert_eq!(TimeWindow::from_name(""), TimeWindow::ThisWeek);
        assert!("fortnight".parse::<TimeWindow>().is_err());
    }

    #[test]
    fn wire_names_round_trip_through_serde() {
        let json = serde_json::to_string(&TimeWindow::ThisWeek).unwrap();
        assert_eq!(json, "\"this_week\"");
        let json = serde_json::to_string(&WinnerStatus::Processing).unwrap();
        assert_eq!(json, "\"processing\"");
        for window in TimeWindow::ALL {
            assert_eq!(window.as_str().parse::<TimeWindow>().unwrap(), window);
        }
    }
}

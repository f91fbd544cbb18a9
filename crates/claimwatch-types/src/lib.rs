//! Shared record types for the Claimwatch campaign dashboard.
//!
//! This crate is the single source of truth for the records the store holds
//! and the dashboard renders. Types flow downstream to `TypeScript` via
//! `ts-rs`; field names serialize in camel case to match the dashboard.
//!
//! # Modules
//!
//! - [`ids`] -- Winner and activity identifiers
//! - [`enums`] -- Claim status, activity kind/status, and time windows
//! - [`structs`] -- `Winner`, `OverviewStats`, and `ActivityEvent`

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{ActivityKind, ActivityStatus, TimeWindow, UnknownVariant, WinnerStatus};
pub use ids::{ActivityId, WinnerId};
pub use structs::{ActivityEvent, OverviewStats, Winner};

//! Typed identifiers for dashboard records.
//!
//! Winner identifiers are short human-facing codes (`#2299`) shown on the
//! dashboard, so they wrap a [`String`]. Activity identifiers are internal
//! and use UUID v7 so they sort by creation time.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Identifier of a [`Winner`](crate::Winner) claim, e.g. `#2299`.
///
/// Unique within the store's live winner collection.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WinnerId(pub String);

impl WinnerId {
    /// Build the display form `#NNNN` from a numeric claim number.
    pub fn from_number(number: u32) -> Self {
        Self(format!("#{number}"))
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for WinnerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WinnerId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for WinnerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Identifier of an [`ActivityEvent`](crate::ActivityEvent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ActivityId(pub Uuid);

impl ActivityId {
    /// Create a new identifier using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Return the inner [`Uuid`] value.
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for ActivityId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for ActivityId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for ActivityId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn winner_id_display_form() {
        let id = WinnerId::from_number(2299);
        assert_eq!(id.as_str(), "#2299");
        assert_eq!(id.to_string(), "#2299");
        assert_eq!(id, WinnerId::from("#2299"));
    }

    #[test]
    fn activity_ids_are_v7() {
        let id = ActivityId::new();
        assert_eq!(id.into_inner().get_version_num(), 7);
        assert_ne!(id, ActivityId::new());
    }
}

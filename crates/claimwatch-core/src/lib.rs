//! Live data core for the Claimwatch campaign dashboard.
//!
//! This crate owns the in-memory store that every dashboard surface reads
//! from, the tick loop that keeps it moving, and the pure functions that
//! derive window-scoped views from it.
//!
//! # Modules
//!
//! - [`adapter`] -- [`ConsumerAdapter`], a live projection bound to one
//!   surface.
//! - [`config`] -- Configuration loading from `claimwatch-config.yaml` into
//!   strongly-typed structs.
//! - [`listeners`] -- Change-listener registry and [`Subscription`] handles.
//! - [`mutation`] -- Randomized, bounded evolution of stats, winners, and
//!   the activity feed.
//! - [`projection`] -- Stats, winners, and activities scoped to a
//!   [`TimeWindow`](claimwatch_types::TimeWindow).
//! - [`seed`] -- The dataset the store starts from.
//! - [`store`] -- [`Store`]: state, timer, mutations, and lifecycle.
//! - [`tick`] -- One tick of the mutation engine over a [`StoreState`].

pub mod adapter;
pub mod config;
pub mod listeners;
pub mod mutation;
pub mod projection;
pub mod seed;
pub mod store;
pub mod tick;

pub use adapter::ConsumerAdapter;
pub use config::{
    ClaimwatchConfig, ConfigError, EngineConfig, LogFormat, LoggingConfig, StoreConfig,
};
pub use listeners::{ListenerError, NotifyOutcome, Subscription};
pub use projection::DashboardView;
pub use store::{Store, StoreError, StoreStatus};
pub use tick::{StoreState, TickSummary};

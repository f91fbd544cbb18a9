//! Engine binary for the Claimwatch campaign dashboard.
//!
//! Wires the store to the dashboard surfaces and keeps them live until
//! shutdown.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `claimwatch-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Seed the starting state and start the store
//! 4. Activate the overview and activity feed surfaces
//! 5. Run until Ctrl-C or `engine.run_seconds` elapses
//! 6. Deactivate the surfaces and dispose the store

mod error;
mod surfaces;

use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use claimwatch_core::{ClaimwatchConfig, ConsumerAdapter, LogFormat, LoggingConfig, Store, seed};
use claimwatch_types::TimeWindow;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Why the engine stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShutdownReason {
    /// Ctrl-C was received.
    Interrupted,
    /// `engine.run_seconds` elapsed.
    TimeLimit,
}

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the store cannot start,
/// or the shutdown signal cannot be installed.
#[tokio::main]
async fn main() -> Result<(), EngineError> {
    // 1. Load configuration.
    let config = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!(
        tick_interval_ms = config.store.tick_interval_ms,
        max_activities = config.store.max_activities,
        max_winners = config.store.max_winners,
        seed = ?config.store.seed,
        "claimwatch-engine starting"
    );

    // 3. Start the store.
    let store = Store::start(&config.store, seed::initial_state(Utc::now()))?;

    // 4. Activate surfaces.
    let window = TimeWindow::from_name(&config.engine.window);
    if window.as_str() != config.engine.window.trim() {
        warn!(
            requested = %config.engine.window,
            using = window.as_str(),
            "Window name normalized"
        );
    }
    let mut overview = ConsumerAdapter::activate("overview", &store, surfaces::overview(window));
    let mut feed = ConsumerAdapter::activate("activity-feed", &store, surfaces::activity_feed(window));
    let overview_task = surfaces::follow(&overview, surfaces::log_overview);
    let feed_task = surfaces::follow(&feed, surfaces::log_feed);
    info!(
        window = window.as_str(),
        subscribers = store.subscriber_count(),
        "Surfaces active"
    );

    // 5. Run.
    let reason = wait_for_shutdown(config.engine.run_seconds).await?;
    info!(reason = ?reason, "Shutting down");

    // 6. Tear down.
    overview.deactivate();
    feed.deactivate();
    store.dispose();
    if let Err(e) = overview_task.await {
        warn!(surface = "overview", error = %e, "Surface task failed");
    }
    if let Err(e) = feed_task.await {
        warn!(surface = "activity-feed", error = %e, "Surface task failed");
    }

    info!(
        total_ticks = store.tick_count(),
        "claimwatch-engine shutdown complete"
    );
    Ok(())
}

/// Load configuration from `claimwatch-config.yaml`.
///
/// Looks for the file relative to the current working directory and falls
/// back to defaults (still subject to environment overrides).
fn load_config() -> Result<ClaimwatchConfig, EngineError> {
    let config_path = Path::new("claimwatch-config.yaml");
    let config = if config_path.exists() {
        ClaimwatchConfig::from_file(config_path)?
    } else {
        ClaimwatchConfig::parse("")?
    };
    Ok(config)
}

/// Install the global tracing subscriber. `RUST_LOG` takes precedence over
/// the configured level.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    match logging.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
    }
}

/// Wait for Ctrl-C, or for `run_seconds` when it is non-zero.
async fn wait_for_shutdown(run_seconds: u64) -> Result<ShutdownReason, EngineError> {
    if run_seconds == 0 {
        tokio::signal::ctrl_c()
            .await
            .map_err(|source| EngineError::Signal { source })?;
        return Ok(ShutdownReason::Interrupted);
    }

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result.map_err(|source| EngineError::Signal { source })?;
            Ok(ShutdownReason::Interrupted)
        }
        () = tokio::time::sleep(Duration::from_secs(run_seconds)) => Ok(ShutdownReason::TimeLimit),
    }
}

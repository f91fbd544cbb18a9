//! Error types for the Claimwatch engine binary.

/// Top-level error for the engine binary.
///
/// Each variant wraps a subsystem error so `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: claimwatch_core::ConfigError,
    },

    /// The store could not be started.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: claimwatch_core::StoreError,
    },

    /// Listening for the shutdown signal failed.
    #[error("signal error: {source}")]
    Signal {
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

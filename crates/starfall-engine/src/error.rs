//! Error types for the indexer binary.
//!
//! [`EngineError`] is the top-level error type that wraps every failure
//! mode during startup and the indexing run.

/// Top-level error for the indexer binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: starfall_core::ConfigError,
    },

    /// The indexing loop stopped on an error.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: starfall_core::RunnerError,
    },

    /// `Dragonfly` connection, hydration or publishing failed.
    #[error("dragonfly error: {source}")]
    Dragonfly {
        /// The underlying store error.
        #[from]
        source: starfall_store::DbError,
    },

    /// NATS connection or subscription failed.
    #[error("NATS error: {message}")]
    Nats {
        /// Description of the NATS failure.
        message: String,
    },

    /// The contract read gateway could not be set up.
    #[error("gateway error: {message}")]
    Gateway {
        /// Description of the gateway failure.
        message: String,
    },

    /// Replay files could not be opened or parsed.
    #[error("replay error: {message}")]
    Replay {
        /// Description of the replay failure.
        message: String,
    },

    /// The blocking indexer task panicked or was cancelled.
    #[error("indexer task failed: {message}")]
    Task {
        /// Description of the task failure.
        message: String,
    },
}

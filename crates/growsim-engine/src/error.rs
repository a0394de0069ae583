//! Error types for the engine binary.

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
        source: growsim_core::config::ConfigError,
    },

    /// The replay failed.
    #[error("replay error: {source}")]
    Replay {
        /// The underlying replay error.
        #[from]
        source: growsim_core::replay::ReplayError,
    },

    /// The report could not be written as JSON.
    #[error("report serialization failed: {source}")]
    Report {
        /// The underlying serialization error.
        #[from]
        source: serde_json::Error,
    },

    /// A command-line argument was not understood.
    #[error("invalid argument {value:?}: {reason}")]
    Argument {
        /// The argument as given.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

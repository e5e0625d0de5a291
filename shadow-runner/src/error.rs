//! Error types for the runner crate.

use std::path::PathBuf;

use shadow_core::CoreError;

/// Errors that abort a supervised run outright.
///
/// Worker faults and timeouts are deliberately *not* represented here:
/// they are classified into the persisted envelope's status instead of
/// being surfaced as errors.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RunnerError {
    /// An integrity or confinement failure from the core layer.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The request's timeout was not a positive number of seconds.
    #[error("timeout must be a positive number of seconds")]
    InvalidTimeout,

    /// The worker process could not be started.
    #[error("worker spawn failed: {0}")]
    SpawnFailed(String),

    /// The one-shot channel to or from the worker broke down.
    #[error("worker channel failed: {0}")]
    ChannelFailed(String),

    /// The configuration file could not be read or parsed.
    #[error("failed to load runner config at {path}: {reason}")]
    ConfigLoad { path: PathBuf, reason: String },

    /// The envelope could not be written to its confined target.
    #[error("failed to persist envelope to {path}: {source}")]
    PersistFailed { path: PathBuf, source: std::io::Error },

    /// Underlying I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

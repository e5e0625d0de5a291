//! Error types for the `shadow-core` crate.

use std::path::PathBuf;

/// Errors produced while verifying and confining a run.
///
/// The first four variants are integrity checks that must all pass
/// before any worker process is spawned.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CoreError {
    /// The artifact index file is missing, unreadable, or structurally invalid.
    #[error("failed to load artifact index at {path}: {reason}")]
    IndexLoad { path: PathBuf, reason: String },

    /// The requested module has no entry in the artifact index.
    #[error("module not listed in artifact index: {path}")]
    ModuleNotAllowed { path: String },

    /// The module's live content hash does not match the recorded hash,
    /// or a recorded hash is required but absent.
    #[error("checksum verification failed for {path}: {reason}")]
    ChecksumMismatch { path: String, reason: String },

    /// The requested output path resolves outside the project root.
    #[error("output path escapes project root: {path}")]
    PathEscape { path: PathBuf },

    /// A content hash string could not be parsed.
    #[error("invalid content hash: {reason}")]
    InvalidContentHash { reason: String },

    /// Underlying I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

//! Artifact index: the trusted catalog of shadow modules.
//!
//! The index is a JSON document maintained by external regeneration
//! tooling. The engine loads it fresh at the start of every run and
//! never mutates it; a cached copy would defeat the integrity check.
//!
//! [`ArtifactIndex::verify`] is the only gate that may authorize
//! execution. No other code path may bypass it.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::hashing::sha256_file;
use crate::id::ContentHash;

/// One registered shadow module.
///
/// Only `path` and `sha256` participate in trust decisions; the
/// remaining fields are descriptive metadata carried through from the
/// index-regeneration tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[non_exhaustive]
pub struct ArtifactEntry {
    /// Module file path, relative to the project root. Unique key.
    pub path: String,

    /// Recorded content hash of the module file at index-generation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<ContentHash>,

    /// File size in bytes at index-generation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    /// Artifact kind, e.g. `"shadow_module"`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Registry id of the module's entry point.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_id: Option<String>,

    /// Module version string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// The parsed artifact index document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[non_exhaustive]
pub struct ArtifactIndex {
    /// Index schema version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Generation timestamp written by the regeneration tool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,

    /// Registered artifacts. Required; an index without this collection
    /// is structurally invalid.
    pub artifacts: Vec<ArtifactEntry>,
}

impl ArtifactIndex {
    /// Parse an index from its JSON text.
    ///
    /// # Errors
    /// Returns [`CoreError::IndexLoad`] if the document is not valid JSON
    /// or is missing required fields.
    pub fn from_json(text: &str) -> Result<Self, CoreError> {
        serde_json::from_str(text).map_err(|e| CoreError::IndexLoad {
            path: "<inline>".into(),
            reason: e.to_string(),
        })
    }

    /// Load the index from a file.
    ///
    /// Called fresh at the start of every run.
    ///
    /// # Errors
    /// Returns [`CoreError::IndexLoad`] if the file is missing, unreadable,
    /// or not structurally valid.
    pub fn load(index_path: &Path) -> Result<Self, CoreError> {
        let text = std::fs::read_to_string(index_path).map_err(|e| CoreError::IndexLoad {
            path: index_path.to_path_buf(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&text).map_err(|e| CoreError::IndexLoad {
            path: index_path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Look up an entry by its relative path.
    #[must_use]
    pub fn entry(&self, path: &str) -> Option<&ArtifactEntry> {
        self.artifacts.iter().find(|a| a.path == path)
    }

    /// Verify that `requested_path` names a registered, untampered module.
    ///
    /// Hashes the live file at `project_root/requested_path` and compares
    /// it against the recorded hash. With `require_checksums`, an entry
    /// without a recorded hash is rejected rather than silently trusted.
    ///
    /// # Errors
    /// - [`CoreError::ModuleNotAllowed`] if no entry matches.
    /// - [`CoreError::ChecksumMismatch`] if the live hash differs, the
    ///   file cannot be read, or a required hash is absent.
    pub fn verify(
        &self,
        requested_path: &str,
        project_root: &Path,
        require_checksums: bool,
    ) -> Result<&ArtifactEntry, CoreError> {
        let entry = self
            .entry(requested_path)
            .ok_or_else(|| CoreError::ModuleNotAllowed { path: requested_path.to_owned() })?;

        match &entry.sha256 {
            Some(expected) => {
                let module_file = project_root.join(&entry.path);
                let live = sha256_file(&module_file).map_err(|e| CoreError::ChecksumMismatch {
                    path: entry.path.clone(),
                    reason: format!("cannot hash module file: {e}"),
                })?;
                if live != *expected {
                    return Err(CoreError::ChecksumMismatch {
                        path: entry.path.clone(),
                        reason: format!("recorded {expected}, live {live}"),
                    });
                }
            }
            None if require_checksums => {
                return Err(CoreError::ChecksumMismatch {
                    path: entry.path.clone(),
                    reason: "no recorded hash; regenerate the artifact index".to_owned(),
                });
            }
            None => {}
        }

        Ok(entry)
    }
}

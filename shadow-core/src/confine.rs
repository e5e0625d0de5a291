//! Output confinement guard.
//!
//! All writes produced by a run must land under the project root. The
//! guard resolves the requested output path (including symlinks in any
//! existing prefix) and rejects anything that escapes the root. It runs
//! strictly before execution and before any write.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::CoreError;

/// Resolve `requested` against `project_root` and enforce confinement.
///
/// Relative paths are joined onto the root; absolute paths are taken
/// as-is. Symlinks in the existing portion of the path are resolved.
/// Segments that do not exist yet must be plain names (`..` and `.`
/// cannot be resolved safely in a path that has not been created).
///
/// On success, missing parent directories of the safe path are created
/// and the absolute, resolved path is returned.
///
/// # Errors
/// - [`CoreError::PathEscape`] if the resolved path is neither the root
///   nor a descendant of it, or the not-yet-existing suffix contains
///   `..`/`.` segments.
/// - [`CoreError::Io`] if the root cannot be canonicalized or parent
///   directories cannot be created.
pub fn confine_output(project_root: &Path, requested: &Path) -> Result<PathBuf, CoreError> {
    let root = fs::canonicalize(project_root)?;
    let absolute = if requested.is_absolute() {
        requested.to_path_buf()
    } else {
        root.join(requested)
    };

    let resolved = resolve_existing_prefix(&absolute)?;
    if resolved != root && !resolved.starts_with(&root) {
        return Err(CoreError::PathEscape { path: absolute });
    }

    if let Some(parent) = resolved.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(resolved)
}

/// Canonicalize the deepest existing ancestor of `path`, then re-append
/// the remaining (not yet created) segments.
fn resolve_existing_prefix(path: &Path) -> Result<PathBuf, CoreError> {
    let mut existing = path.to_path_buf();
    let mut suffix: Vec<OsString> = Vec::new();

    while !existing.exists() {
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                suffix.push(name.to_os_string());
                existing = parent.to_path_buf();
            }
            // file_name() is None when the last segment is `..` (or the
            // path is a bare root); such a suffix cannot be trusted.
            _ => return Err(CoreError::PathEscape { path: path.to_path_buf() }),
        }
    }

    let mut resolved = fs::canonicalize(&existing)?;
    for segment in suffix.into_iter().rev() {
        resolved.push(segment);
    }
    Ok(resolved)
}

//! Streaming SHA-256 checksum utility.
//!
//! Used both to populate and to verify the artifact index. Files are
//! read in fixed-size chunks so memory use stays O(1) in file size.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::id::ContentHash;

/// Read buffer size for streaming file hashing.
const CHUNK_SIZE: usize = 64 * 1024;

/// Compute the SHA-256 hash of a file's bytes.
///
/// Deterministic: the same bytes always produce the same digest,
/// independent of platform.
///
/// # Errors
/// Returns the underlying I/O error if the file cannot be opened or read.
pub fn sha256_file(path: &Path) -> Result<ContentHash, std::io::Error> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(ContentHash::new(hasher.finalize().into()))
}

/// Compute the SHA-256 hash of an in-memory byte slice.
///
/// Shares the digest algorithm with [`sha256_file`] so index tooling and
/// tests can hash content they have not yet written to disk.
#[must_use]
pub fn sha256_bytes(bytes: &[u8]) -> ContentHash {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    ContentHash::new(hasher.finalize().into())
}

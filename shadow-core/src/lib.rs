//! Core types for the shadow module execution engine.
//!
//! Defines the integrity and result primitives shared by the runner:
//! content hashing, the artifact index and its verification gate, the
//! output confinement guard, and the run envelope.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod confine;
pub mod envelope;
pub mod error;
pub mod hashing;
pub mod id;
pub mod index;

pub use confine::confine_output;
pub use envelope::{RunEnvelope, RunStatus, RunSummary};
pub use error::CoreError;
pub use hashing::{sha256_bytes, sha256_file};
pub use id::{ContentHash, RunId};
pub use index::{ArtifactEntry, ArtifactIndex};

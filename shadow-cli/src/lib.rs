//! CLI wrapper for the shadow module execution engine.
//!
//! `shadow-run` supervises one request read from a JSON payload file
//! and exits 0 only when the persisted envelope's status is `ok`.
//! `shadow-worker` is the isolated worker entry point.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod args;

pub use args::{CliArgs, CliError, RequestFile};

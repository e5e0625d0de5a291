//! Verified-sandbox execution engine for shadow modules.
//!
//! Supervises one request end to end: artifact-index verification,
//! output confinement, process-isolated invocation under a wall-clock
//! budget, outcome classification, and envelope persistence.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod backend;
pub mod config;
pub mod error;
pub mod process;
pub mod protocol;
pub mod registry;
pub mod supervisor;
pub mod worker;

pub use backend::{WorkerBackend, WorkerOutcome, WorkerSpec};
pub use config::{RunnerConfig, WORKER_ARGV_MARKER};
pub use error::RunnerError;
pub use process::ProcessBackend;
pub use supervisor::{RunRequest, RunSupervisor};

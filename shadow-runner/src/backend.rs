//! Worker backend abstraction.
//!
//! Allows swapping the real process-spawning backend for mocks in
//! tests, including the "no worker is ever spawned on a rejected
//! request" assertions.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::RunnerError;

/// Everything a backend needs to run one verified module invocation.
///
/// Built by the supervisor only after the verification gate and the
/// output confinement guard have both passed.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct WorkerSpec {
    /// Absolute path of the verified module file.
    pub module_path: PathBuf,

    /// Registry id of the module's entry point.
    pub module_id: String,

    /// Opaque input mapping handed to the module.
    pub inputs: Map<String, Value>,

    /// Working directory for the isolated worker, set before load so
    /// relative filesystem access by the module resolves predictably.
    pub work_dir: PathBuf,

    /// Wall-clock execution budget.
    pub timeout: Duration,

    /// Grace period after a kill before termination is considered
    /// unconditional.
    pub termination_grace: Duration,

    /// Advertise the advisory deny-network signal to the worker.
    pub deny_network: bool,
}

/// Outcome of one worker invocation, ready for status classification.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum WorkerOutcome {
    /// The worker exited cleanly with exactly one value on the channel.
    Completed(Value),

    /// The budget elapsed first and the worker was forcibly terminated.
    TimedOut,

    /// Nonzero exit, missing entry point, or a clean exit with no value
    /// on the channel. Never retried by this layer.
    Faulted {
        /// Diagnostic detail for logs. Does not cross into the envelope.
        detail: String,
    },
}

/// An isolated execution backend hosting one module invocation per call.
///
/// Implementations must be `Send + Sync` to allow concurrent runs, each
/// with its own independently owned worker.
#[async_trait]
pub trait WorkerBackend: Send + Sync {
    /// Run one module invocation to completion, timeout, or fault.
    ///
    /// # Errors
    /// Returns [`RunnerError::SpawnFailed`] or
    /// [`RunnerError::ChannelFailed`] for supervisor-side plumbing
    /// failures; module-side faults are reported as
    /// [`WorkerOutcome::Faulted`] instead.
    async fn invoke(&self, spec: &WorkerSpec) -> Result<WorkerOutcome, RunnerError>;
}

//! Run supervisor: orchestrates one request end to end.
//!
//! Strictly linear state machine with early exit on failure:
//! `Pending → Verifying → Confining → Executing → Classifying → Done`.
//! Verification precedes confinement precedes execution; an unverified
//! module never reaches a process spawn, and nothing is written before
//! the destination is known safe.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde_json::{Map, Value};

use shadow_core::{confine_output, ArtifactEntry, ArtifactIndex, CoreError, RunEnvelope, RunId, RunStatus};

use crate::backend::{WorkerBackend, WorkerOutcome, WorkerSpec};
use crate::config::RunnerConfig;
use crate::RunnerError;

/// One caller request for a supervised module run.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct RunRequest {
    /// Module path, relative to the project root; must match an
    /// artifact index entry.
    pub module_path: String,

    /// Opaque input mapping passed through to the module.
    pub inputs: Map<String, Value>,

    /// Positive wall-clock budget in seconds.
    pub timeout_secs: u64,

    /// Where the envelope must be written. Confined to the project root.
    pub output_target: PathBuf,
}

impl RunRequest {
    /// Create a request.
    #[must_use]
    pub fn new(
        module_path: impl Into<String>,
        inputs: Map<String, Value>,
        timeout_secs: u64,
        output_target: impl Into<PathBuf>,
    ) -> Self {
        Self {
            module_path: module_path.into(),
            inputs,
            timeout_secs,
            output_target: output_target.into(),
        }
    }
}

/// Supervises verified, isolated, time-bounded module runs.
///
/// Each call to [`RunSupervisor::run`] owns its whole run: the fresh
/// index load, the hash check, the worker process, and the result
/// channel. Nothing is shared across requests, so a host may serve many
/// concurrently.
pub struct RunSupervisor<B: WorkerBackend> {
    config: RunnerConfig,
    backend: B,
}

impl<B: WorkerBackend> RunSupervisor<B> {
    /// Create a supervisor with the given configuration and backend.
    #[must_use]
    pub fn new(config: RunnerConfig, backend: B) -> Self {
        Self { config, backend }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Execute one request and persist its envelope.
    ///
    /// Exactly one envelope is produced per request. Verification and
    /// worker failures classify into the envelope's status; only
    /// failures that leave the run without a safe, written destination
    /// (invalid timeout, path escape, persistence failure) surface as
    /// errors here.
    ///
    /// # Errors
    /// - [`RunnerError::InvalidTimeout`] for a zero budget.
    /// - [`CoreError::PathEscape`] (wrapped) if the output target
    ///   resolves outside the project root; nothing is written.
    /// - [`RunnerError::PersistFailed`] if the envelope cannot be written.
    pub async fn run(&self, request: &RunRequest) -> Result<RunEnvelope, RunnerError> {
        if request.timeout_secs == 0 {
            return Err(RunnerError::InvalidTimeout);
        }

        let run_id = RunId::new();
        let started = Instant::now();
        tracing::info!(
            run_id = %run_id,
            module = %request.module_path,
            timeout_secs = request.timeout_secs,
            "run started"
        );

        // Verifying.
        let verified = self.verify(request);

        // Confining. Runs even when verification failed: the error
        // envelope still needs a known-safe destination.
        let safe_output = confine_output(&self.config.project_root, &request.output_target)?;

        // Executing and classifying.
        let (status, result) = match verified {
            Ok(spec) => self.execute(run_id, &spec).await,
            Err(e) => {
                tracing::warn!(run_id = %run_id, error = %e, "verification failed, execution skipped");
                (RunStatus::Error, None)
            }
        };

        // Elapsed since the request began, not since execution began.
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let envelope = RunEnvelope::build(
            run_id,
            request.module_path.clone(),
            self.config.environment_label.clone(),
            duration_ms,
            status,
            result,
        );
        self.persist(&envelope, &safe_output).await?;

        tracing::info!(
            run_id = %run_id,
            status = %status,
            duration_ms,
            output = %safe_output.display(),
            "run complete"
        );
        Ok(envelope)
    }

    /// The verification gate: fresh index load plus checksum check.
    /// The only code path that may authorize execution.
    fn verify(&self, request: &RunRequest) -> Result<WorkerSpec, RunnerError> {
        let index = ArtifactIndex::load(&self.config.index_path)?;
        let root = std::fs::canonicalize(&self.config.project_root).map_err(CoreError::Io)?;
        let entry = index.verify(&request.module_path, &root, self.config.require_checksums)?;

        Ok(WorkerSpec {
            module_path: root.join(&entry.path),
            module_id: derive_module_id(entry),
            inputs: request.inputs.clone(),
            work_dir: root,
            timeout: Duration::from_secs(request.timeout_secs),
            termination_grace: self.config.termination_grace,
            deny_network: self.config.deny_network,
        })
    }

    async fn execute(&self, run_id: RunId, spec: &WorkerSpec) -> (RunStatus, Option<Value>) {
        match self.backend.invoke(spec).await {
            Ok(WorkerOutcome::Completed(value)) => (RunStatus::Ok, Some(value)),
            Ok(WorkerOutcome::TimedOut) => {
                tracing::warn!(run_id = %run_id, "worker timed out");
                (RunStatus::Timeout, None)
            }
            Ok(WorkerOutcome::Faulted { detail }) => {
                tracing::warn!(run_id = %run_id, %detail, "worker faulted");
                (RunStatus::Error, None)
            }
            Err(e) => {
                tracing::error!(run_id = %run_id, error = %e, "worker invocation failed");
                (RunStatus::Error, None)
            }
        }
    }

    async fn persist(&self, envelope: &RunEnvelope, target: &Path) -> Result<(), RunnerError> {
        let json = serde_json::to_vec_pretty(envelope).map_err(|e| RunnerError::PersistFailed {
            path: target.to_path_buf(),
            source: std::io::Error::other(e),
        })?;
        tokio::fs::write(target, json).await.map_err(|e| RunnerError::PersistFailed {
            path: target.to_path_buf(),
            source: e,
        })
    }
}

/// Registry id for an index entry: the recorded `module_id` when
/// present, otherwise derived from the entry's path layout
/// (`modules/<id>/module.py`).
fn derive_module_id(entry: &ArtifactEntry) -> String {
    if let Some(id) = &entry.module_id {
        return id.clone();
    }
    let path = Path::new(&entry.path);
    path.parent()
        .and_then(Path::file_name)
        .or_else(|| path.file_stem())
        .map_or_else(|| entry.path.clone(), |s| s.to_string_lossy().into_owned())
}

//! Process-isolated worker backend.
//!
//! Spawns one fresh OS process per invocation so an unrecoverable fault
//! in the module (crash, resource exhaustion, infinite loop) cannot
//! corrupt or hang the supervisor. The request crosses into the child
//! on stdin; at most one response value is read back from stdout.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;

use crate::backend::{WorkerBackend, WorkerOutcome, WorkerSpec};
use crate::config::{RunnerConfig, NET_POLICY_VAR};
use crate::protocol::{WorkerRequest, WorkerResponse};
use crate::RunnerError;

/// Backend that runs each module in a separate worker process.
#[derive(Debug, Clone)]
pub struct ProcessBackend {
    program: PathBuf,
    args: Vec<String>,
}

impl ProcessBackend {
    /// Create a backend spawning `program` with the given leading args.
    #[must_use]
    pub fn new(program: PathBuf, args: Vec<String>) -> Self {
        Self { program, args }
    }

    /// Create a backend from the runner configuration.
    #[must_use]
    pub fn from_config(config: &RunnerConfig) -> Self {
        Self::new(config.worker_program.clone(), config.worker_args.clone())
    }
}

#[async_trait]
impl WorkerBackend for ProcessBackend {
    async fn invoke(&self, spec: &WorkerSpec) -> Result<WorkerOutcome, RunnerError> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .current_dir(&spec.work_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if spec.deny_network {
            command.env(NET_POLICY_VAR, "deny");
        }

        let mut child = command.spawn().map_err(|e| {
            RunnerError::SpawnFailed(format!("exec {}: {e}", self.program.display()))
        })?;

        tracing::debug!(
            module = %spec.module_id,
            program = %self.program.display(),
            "worker process spawned"
        );

        let request = WorkerRequest {
            module_id: spec.module_id.clone(),
            module_path: spec.module_path.clone(),
            inputs: spec.inputs.clone(),
        };
        let payload = serde_json::to_vec(&request)
            .map_err(|e| RunnerError::ChannelFailed(format!("encode request: {e}")))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| RunnerError::ChannelFailed("stdin not piped".to_owned()))?;
        // A worker that died instantly closes the pipe; the exit status
        // below carries the real diagnosis, so write failures are not fatal.
        if let Err(e) = stdin.write_all(&payload).await {
            tracing::debug!("request write failed (worker may have exited): {e}");
        }
        drop(stdin);

        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| RunnerError::ChannelFailed("stdout not piped".to_owned()))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| RunnerError::ChannelFailed("stderr not piped".to_owned()))?;

        let collect = async {
            let mut out = Vec::new();
            let mut err = Vec::new();
            let (out_read, err_read, status) = tokio::join!(
                stdout.read_to_end(&mut out),
                stderr.read_to_end(&mut err),
                child.wait(),
            );
            out_read?;
            err_read?;
            Ok::<_, std::io::Error>((status?, out, err))
        };

        let completed = match tokio::time::timeout(spec.timeout, collect).await {
            Ok(collected) => {
                collected.map_err(|e| RunnerError::ChannelFailed(format!("collect worker output: {e}")))?
            }
            Err(_) => {
                // Budget elapsed. Untrusted code cannot be trusted to
                // honor cooperative cancellation, so kill outright.
                tracing::warn!(
                    module = %spec.module_id,
                    budget_secs = spec.timeout.as_secs(),
                    "worker exceeded budget, terminating"
                );
                if let Err(e) = child.start_kill() {
                    tracing::debug!("kill after timeout failed: {e}");
                }
                match tokio::time::timeout(spec.termination_grace, child.wait()).await {
                    Ok(_) => {}
                    Err(_) => {
                        // The kill signal is already delivered; from here
                        // termination is unconditional.
                        tracing::warn!(module = %spec.module_id, "worker not reaped within grace period");
                    }
                }
                return Ok(WorkerOutcome::TimedOut);
            }
        };

        let (status, out, err) = completed;
        if !status.success() {
            let detail = format!(
                "worker exited with {status}: {}",
                String::from_utf8_lossy(&err).trim()
            );
            return Ok(WorkerOutcome::Faulted { detail });
        }

        match serde_json::from_slice::<WorkerResponse>(&out) {
            Ok(response) => Ok(WorkerOutcome::Completed(response.output)),
            Err(e) => Ok(WorkerOutcome::Faulted {
                detail: format!("worker exited cleanly without a result on the channel: {e}"),
            }),
        }
    }
}

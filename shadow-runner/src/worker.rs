//! Worker-side half of the one-shot protocol.
//!
//! Runs inside the isolated child process. Reads exactly one request
//! from stdin, dispatches it through the module registry, writes at
//! most one response to stdout, and exits. The supervisor has already
//! set the working directory to the project root.

use std::io::{Read, Write};

use crate::protocol::{WorkerRequest, WorkerResponse};
use crate::registry::{self, ModuleError};

/// Exit code for a request that could not be read or written.
const EXIT_CHANNEL: i32 = 2;
/// Exit code when the module id has no registered entry point.
const EXIT_ENTRY_POINT_MISSING: i32 = 3;
/// Exit code when the entry point itself failed.
const EXIT_MODULE_FAULT: i32 = 4;

/// Failure modes of one worker invocation.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum WorkerFailure {
    /// The request could not be read from stdin or parsed.
    #[error("failed to read worker request: {0}")]
    ReadRequest(String),

    /// The module id is not present in the compiled-in registry.
    /// Fatal load error, not a retryable condition.
    #[error("module '{module_id}' has no registered entry point")]
    EntryPointMissing { module_id: String },

    /// The entry point raised.
    #[error(transparent)]
    Module(#[from] ModuleError),

    /// The response could not be written to stdout.
    #[error("failed to write worker response: {0}")]
    WriteResponse(String),
}

impl WorkerFailure {
    fn exit_code(&self) -> i32 {
        match self {
            Self::ReadRequest(_) | Self::WriteResponse(_) => EXIT_CHANNEL,
            Self::EntryPointMissing { .. } => EXIT_ENTRY_POINT_MISSING,
            Self::Module(_) => EXIT_MODULE_FAULT,
        }
    }
}

/// Dispatch one request through the registry.
///
/// # Errors
/// Returns [`WorkerFailure::EntryPointMissing`] for unregistered ids and
/// [`WorkerFailure::Module`] when the entry point fails.
pub fn respond(request: &WorkerRequest) -> Result<WorkerResponse, WorkerFailure> {
    let entry = registry::lookup(&request.module_id).ok_or_else(|| {
        WorkerFailure::EntryPointMissing { module_id: request.module_id.clone() }
    })?;
    let output = entry(&request.inputs)?;
    Ok(WorkerResponse { output })
}

/// Process entry point for the isolated worker. Returns the exit code.
///
/// Any failure is reported on stderr with a nonzero code; the
/// supervisor classifies all of them as a worker fault.
#[must_use]
pub fn run_worker() -> i32 {
    match serve_stdio() {
        Ok(()) => 0,
        Err(failure) => {
            eprintln!("shadow-worker: {failure}");
            failure.exit_code()
        }
    }
}

fn serve_stdio() -> Result<(), WorkerFailure> {
    let mut raw = String::new();
    std::io::stdin()
        .read_to_string(&mut raw)
        .map_err(|e| WorkerFailure::ReadRequest(e.to_string()))?;
    let request: WorkerRequest =
        serde_json::from_str(&raw).map_err(|e| WorkerFailure::ReadRequest(e.to_string()))?;

    let response = respond(&request)?;

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer(&mut handle, &response)
        .map_err(|e| WorkerFailure::WriteResponse(e.to_string()))?;
    handle
        .write_all(b"\n")
        .map_err(|e| WorkerFailure::WriteResponse(e.to_string()))?;
    Ok(())
}

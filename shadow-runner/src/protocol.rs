//! Wire protocol between the supervisor and the isolated worker.
//!
//! The channel is one-shot in both directions: the supervisor writes a
//! single request document to the worker's stdin and reads back at most
//! one response document from its stdout.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The single request document a worker receives on stdin.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[non_exhaustive]
pub struct WorkerRequest {
    /// Registry id resolving to the module's entry point.
    pub module_id: String,

    /// Absolute path of the verified module file, for diagnostics.
    pub module_path: PathBuf,

    /// Opaque input mapping passed to the entry point.
    #[serde(default)]
    pub inputs: Map<String, Value>,
}

/// The single response document a worker writes to stdout.
///
/// The wrapper distinguishes a deliberate result from stray stdout
/// noise a faulty module might emit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[non_exhaustive]
pub struct WorkerResponse {
    /// The module's structured output mapping.
    pub output: Value,
}

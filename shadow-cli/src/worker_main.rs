//! Entry point for the standalone `shadow-worker` binary.
//!
//! Deployments that point `worker_program` at a dedicated executable
//! use this instead of re-entering `shadow-run`. Arguments are ignored;
//! the request arrives on stdin.

use std::process::ExitCode;

fn main() -> ExitCode {
    let code = shadow_runner::worker::run_worker();
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

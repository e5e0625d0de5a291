//! Entry point for the `shadow-run` supervising CLI.

use std::path::PathBuf;
use std::process::ExitCode;

use shadow_cli::{CliArgs, RequestFile};
use shadow_runner::{
    ProcessBackend, RunRequest, RunSupervisor, RunnerConfig, WORKER_ARGV_MARKER,
};
use tracing::info;

/// Environment variable overriding the project root (defaults to the
/// current directory).
const PROJECT_ROOT_VAR: &str = "SHADOW_PROJECT_ROOT";

fn main() -> ExitCode {
    // The process backend re-invokes this executable as its worker.
    // Dispatch before anything else so worker processes stay lean.
    let argv: Vec<String> = std::env::args().skip(1).collect();
    if argv.first().map(String::as_str) == Some(WORKER_ARGV_MARKER) {
        let code = shadow_runner::worker::run_worker();
        return ExitCode::from(u8::try_from(code).unwrap_or(1));
    }

    tracing_subscriber::fmt::init();

    let args = match CliArgs::parse(argv.into_iter()) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("shadow-run: {e}");
            eprintln!("usage: shadow-run [--config FILE] --in REQUEST --out RESULT [--timeout SECS]");
            return ExitCode::from(2);
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!(error = %e, "failed to start runtime");
            return ExitCode::from(2);
        }
    };
    runtime.block_on(run(args))
}

async fn run(args: CliArgs) -> ExitCode {
    let default_root = std::env::var(PROJECT_ROOT_VAR)
        .map_or_else(|_| PathBuf::from("."), PathBuf::from);

    let config = match &args.config {
        Some(path) => match RunnerConfig::load(path, default_root) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(error = %e, "failed to load config");
                return ExitCode::from(2);
            }
        },
        None => RunnerConfig::new(default_root),
    };

    let payload = match RequestFile::load(&args.input) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::error!(error = %e, "failed to load request");
            return ExitCode::from(2);
        }
    };

    let request = RunRequest::new(
        payload.module_path,
        payload.inputs,
        args.timeout_secs,
        args.output,
    );

    let backend = ProcessBackend::from_config(&config);
    let supervisor = RunSupervisor::new(config, backend);

    match supervisor.run(&request).await {
        Ok(envelope) => {
            info!(run_id = %envelope.run_id, status = %envelope.status(), "envelope persisted");
            if envelope.status().is_ok() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "run aborted");
            ExitCode::from(2)
        }
    }
}

//! Runner configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::RunnerError;

/// Argv marker that makes the supervising executable re-enter as a
/// worker instead of parsing CLI flags.
pub const WORKER_ARGV_MARKER: &str = "__shadow_worker";

/// Environment variable naming the deployment label, e.g. `dev`/`ci`/`prod`.
pub const ENV_LABEL_VAR: &str = "SHADOW_ENV";

/// Environment variable carrying the advisory network policy to workers.
pub const NET_POLICY_VAR: &str = "SHADOW_NET_POLICY";

/// Configuration for one [`RunSupervisor`](crate::RunSupervisor).
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct RunnerConfig {
    /// Root directory all module lookups and output writes are confined to.
    pub project_root: PathBuf,

    /// Location of the artifact index file, reloaded fresh per run.
    pub index_path: PathBuf,

    /// Free-form deployment tag copied into every envelope.
    pub environment_label: String,

    /// Executable spawned as the isolated worker.
    pub worker_program: PathBuf,

    /// Arguments passed to the worker program before the request is
    /// written to its stdin.
    pub worker_args: Vec<String>,

    /// How long to wait after killing a timed-out worker before
    /// considering termination unconditional.
    pub termination_grace: Duration,

    /// Reject index entries without a recorded hash.
    pub require_checksums: bool,

    /// Advertise `SHADOW_NET_POLICY=deny` to workers. Advisory only;
    /// not a kernel-enforced barrier.
    pub deny_network: bool,
}

/// On-disk shape of the optional config file. Every field may be
/// omitted; omitted fields keep the defaults from [`RunnerConfig::new`].
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    project_root: Option<PathBuf>,
    index_path: Option<PathBuf>,
    environment_label: Option<String>,
    worker_program: Option<PathBuf>,
    worker_args: Option<Vec<String>>,
    termination_grace_secs: Option<u64>,
    require_checksums: Option<bool>,
    deny_network: Option<bool>,
}

impl RunnerConfig {
    /// Default configuration rooted at `project_root`.
    ///
    /// The index is expected at `<root>/artifact_index.json`, the
    /// environment label comes from `SHADOW_ENV` (default `"dev"`), and
    /// the worker program is this executable re-entered via
    /// [`WORKER_ARGV_MARKER`].
    #[must_use]
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        let project_root = project_root.into();
        let environment_label =
            std::env::var(ENV_LABEL_VAR).unwrap_or_else(|_| "dev".to_owned());
        let worker_program =
            std::env::current_exe().unwrap_or_else(|_| PathBuf::from("shadow-worker"));
        Self {
            index_path: project_root.join("artifact_index.json"),
            project_root,
            environment_label,
            worker_program,
            worker_args: vec![WORKER_ARGV_MARKER.to_owned()],
            termination_grace: Duration::from_secs(5),
            require_checksums: true,
            deny_network: true,
        }
    }

    /// Load configuration from a JSON file, defaulting every omitted
    /// field as [`RunnerConfig::new`] does.
    ///
    /// # Errors
    /// Returns [`RunnerError::ConfigLoad`] if the file cannot be read or
    /// parsed.
    pub fn load(path: &Path, default_root: impl Into<PathBuf>) -> Result<Self, RunnerError> {
        let text = std::fs::read_to_string(path).map_err(|e| RunnerError::ConfigLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let file: ConfigFile =
            serde_json::from_str(&text).map_err(|e| RunnerError::ConfigLoad {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let mut config = Self::new(file.project_root.unwrap_or_else(|| default_root.into()));
        if let Some(index_path) = file.index_path {
            config.index_path = index_path;
        }
        if let Some(label) = file.environment_label {
            config.environment_label = label;
        }
        if let Some(program) = file.worker_program {
            config.worker_program = program;
            config.worker_args = file.worker_args.unwrap_or_default();
        } else if let Some(args) = file.worker_args {
            config.worker_args = args;
        }
        if let Some(secs) = file.termination_grace_secs {
            config.termination_grace = Duration::from_secs(secs);
        }
        if let Some(require) = file.require_checksums {
            config.require_checksums = require;
        }
        if let Some(deny) = file.deny_network {
            config.deny_network = deny;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_defaults_index_under_root() {
        let config = RunnerConfig::new("/proj");
        assert_eq!(config.index_path, PathBuf::from("/proj/artifact_index.json"));
        assert!(config.require_checksums);
        assert!(config.deny_network);
        assert_eq!(config.termination_grace, Duration::from_secs(5));
        assert_eq!(config.worker_args, vec![WORKER_ARGV_MARKER.to_owned()]);
    }

    #[test]
    fn load_missing_file_is_config_load_error() {
        let result = RunnerConfig::load(Path::new("/nonexistent/shadow_config.json"), "/proj");
        assert!(matches!(result, Err(RunnerError::ConfigLoad { .. })));
    }

    #[test]
    fn load_applies_overrides_and_keeps_defaults() {
        let dir = match tempfile::tempdir() {
            Ok(d) => d,
            Err(e) => panic!("tempdir failed: {e}"),
        };
        let path = dir.path().join("shadow_config.json");
        let text = r#"{
            "project_root": "/work/shadow",
            "environment_label": "ci",
            "termination_grace_secs": 2,
            "require_checksums": false
        }"#;
        if let Err(e) = std::fs::write(&path, text) {
            panic!("write failed: {e}");
        }
        let config = match RunnerConfig::load(&path, "/fallback") {
            Ok(c) => c,
            Err(e) => panic!("load failed: {e}"),
        };
        assert_eq!(config.project_root, PathBuf::from("/work/shadow"));
        assert_eq!(config.index_path, PathBuf::from("/work/shadow/artifact_index.json"));
        assert_eq!(config.environment_label, "ci");
        assert_eq!(config.termination_grace, Duration::from_secs(2));
        assert!(!config.require_checksums);
        assert!(config.deny_network, "omitted fields keep defaults");
    }

    #[test]
    fn load_custom_worker_program_clears_reentry_marker() {
        let dir = match tempfile::tempdir() {
            Ok(d) => d,
            Err(e) => panic!("tempdir failed: {e}"),
        };
        let path = dir.path().join("shadow_config.json");
        if let Err(e) = std::fs::write(&path, r#"{"worker_program": "/usr/bin/shadow-worker"}"#) {
            panic!("write failed: {e}");
        }
        let config = match RunnerConfig::load(&path, "/proj") {
            Ok(c) => c,
            Err(e) => panic!("load failed: {e}"),
        };
        assert_eq!(config.worker_program, PathBuf::from("/usr/bin/shadow-worker"));
        assert!(config.worker_args.is_empty(), "a dedicated worker binary needs no marker");
    }
}

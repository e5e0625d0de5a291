//! Command-line argument and request-file parsing for `shadow-run`.

use std::path::PathBuf;

use serde::Deserialize;
use serde_json::{Map, Value};

/// Default wall-clock budget when `--timeout` is omitted.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Errors from CLI argument or request-file handling.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CliError {
    /// An unknown or malformed argument was passed.
    #[error("invalid usage: {0}")]
    Usage(String),

    /// The request file could not be read or parsed.
    #[error("failed to read request file {path}: {reason}")]
    RequestFile { path: PathBuf, reason: String },
}

/// Parsed `shadow-run` arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct CliArgs {
    /// Optional runner config file (`shadow_config.json`).
    pub config: Option<PathBuf>,

    /// Request payload file: `{"module_path": ..., "inputs": ...}`.
    pub input: PathBuf,

    /// Envelope destination, confined to the project root.
    pub output: PathBuf,

    /// Wall-clock budget in seconds.
    pub timeout_secs: u64,
}

impl CliArgs {
    /// Parse `--config/--in/--out/--timeout` flags.
    ///
    /// # Errors
    /// Returns [`CliError::Usage`] for unknown flags, missing values, or
    /// absent required arguments.
    pub fn parse<I: Iterator<Item = String>>(mut args: I) -> Result<Self, CliError> {
        let mut config = None;
        let mut input = None;
        let mut output = None;
        let mut timeout_secs = DEFAULT_TIMEOUT_SECS;

        while let Some(flag) = args.next() {
            let mut value = |flag: &str| {
                args.next().ok_or_else(|| CliError::Usage(format!("{flag} requires a value")))
            };
            match flag.as_str() {
                "--config" => config = Some(PathBuf::from(value("--config")?)),
                "--in" => input = Some(PathBuf::from(value("--in")?)),
                "--out" => output = Some(PathBuf::from(value("--out")?)),
                "--timeout" => {
                    let raw = value("--timeout")?;
                    timeout_secs = raw.parse().map_err(|_| {
                        CliError::Usage(format!("--timeout expects seconds, got '{raw}'"))
                    })?;
                }
                other => return Err(CliError::Usage(format!("unknown argument '{other}'"))),
            }
        }

        Ok(Self {
            config,
            input: input.ok_or_else(|| CliError::Usage("--in is required".to_owned()))?,
            output: output.ok_or_else(|| CliError::Usage("--out is required".to_owned()))?,
            timeout_secs,
        })
    }
}

/// On-disk shape of the inbound request payload.
#[derive(Debug, Clone, Deserialize)]
#[non_exhaustive]
pub struct RequestFile {
    /// Module path relative to the project root.
    pub module_path: String,

    /// Opaque input mapping for the module.
    #[serde(default)]
    pub inputs: Map<String, Value>,
}

impl RequestFile {
    /// Load and parse the request payload file.
    ///
    /// # Errors
    /// Returns [`CliError::RequestFile`] if the file is unreadable or
    /// not valid JSON.
    pub fn load(path: &PathBuf) -> Result<Self, CliError> {
        let text = std::fs::read_to_string(path).map_err(|e| CliError::RequestFile {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&text).map_err(|e| CliError::RequestFile {
            path: path.clone(),
            reason: e.to_string(),
        })
    }
}

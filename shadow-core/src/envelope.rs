//! The run envelope: the sole externally observable result of a run.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::id::RunId;

/// Terminal status of a supervised run. Exactly one per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum RunStatus {
    /// The worker completed within budget and returned a value.
    Ok,
    /// The wall-clock budget elapsed and the worker was terminated.
    Timeout,
    /// Verification failed, the worker faulted, or no value arrived.
    Error,
}

impl RunStatus {
    /// Returns `true` for [`RunStatus::Ok`].
    #[must_use]
    pub fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Ok => "ok",
            Self::Timeout => "timeout",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

/// Timing and status summary embedded in the envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[non_exhaustive]
pub struct RunSummary {
    /// Wall-clock elapsed time for the whole supervised invocation,
    /// measured from when the request began.
    pub duration_ms: u64,
    /// Terminal status.
    pub status: RunStatus,
}

/// The structured, always-produced result record of one run.
///
/// Constructed once, immutable after construction, persisted as JSON to
/// the confined output target. Callers disambiguate success from
/// failure purely via `summary.status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[non_exhaustive]
pub struct RunEnvelope {
    /// Globally unique identifier, generated fresh per run.
    pub run_id: RunId,
    /// Echoes the requested module path.
    pub module_path: String,
    /// Free-form deployment tag sourced from configuration.
    pub environment_label: String,
    /// Timing and terminal status.
    pub summary: RunSummary,
    /// Module output. Present only when `summary.status` is `ok`.
    pub result: Option<Value>,
}

impl RunEnvelope {
    /// Pure construction of an envelope. No I/O, no failure modes.
    ///
    /// Enforces the payload/status pairing: a non-`ok` status drops any
    /// payload it is handed.
    #[must_use]
    pub fn build(
        run_id: RunId,
        module_path: impl Into<String>,
        environment_label: impl Into<String>,
        duration_ms: u64,
        status: RunStatus,
        result: Option<Value>,
    ) -> Self {
        let result = if status.is_ok() { result } else { None };
        Self {
            run_id,
            module_path: module_path.into(),
            environment_label: environment_label.into(),
            summary: RunSummary { duration_ms, status },
            result,
        }
    }

    /// Terminal status of this run.
    #[must_use]
    pub fn status(&self) -> RunStatus {
        self.summary.status
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn build_keeps_result_only_on_ok() {
        let payload = Some(json!({"bbox": null}));
        let ok = RunEnvelope::build(RunId::new(), "m", "dev", 5, RunStatus::Ok, payload.clone());
        assert_eq!(ok.result, payload);

        for status in [RunStatus::Timeout, RunStatus::Error] {
            let env = RunEnvelope::build(RunId::new(), "m", "dev", 5, status, payload.clone());
            assert!(env.result.is_none(), "{status} envelope must carry no payload");
        }
    }

    #[test]
    fn envelope_json_has_stable_field_set() {
        let env = RunEnvelope::build(
            RunId::new(),
            "modules/compute_aabb/module.py",
            "ci",
            42,
            RunStatus::Ok,
            Some(json!({"bbox": {"min": [0, 0, 0], "max": [1, 2, 3]}})),
        );
        let value = match serde_json::to_value(&env) {
            Ok(v) => v,
            Err(e) => panic!("serialize failed: {e}"),
        };
        assert!(value["run_id"].is_string());
        assert_eq!(value["module_path"], "modules/compute_aabb/module.py");
        assert_eq!(value["environment_label"], "ci");
        assert_eq!(value["summary"]["duration_ms"], 42);
        assert_eq!(value["summary"]["status"], "ok");
        assert_eq!(value["result"]["bbox"]["max"], json!([1, 2, 3]));
    }

    #[test]
    fn status_serializes_lowercase() {
        for (status, expected) in [
            (RunStatus::Ok, "\"ok\""),
            (RunStatus::Timeout, "\"timeout\""),
            (RunStatus::Error, "\"error\""),
        ] {
            let json = match serde_json::to_string(&status) {
                Ok(s) => s,
                Err(e) => panic!("serialize failed: {e}"),
            };
            assert_eq!(json, expected);
        }
    }

    #[test]
    fn error_envelope_serializes_null_result() {
        let env = RunEnvelope::build(RunId::new(), "m", "dev", 1, RunStatus::Error, None);
        let value = match serde_json::to_value(&env) {
            Ok(v) => v,
            Err(e) => panic!("serialize failed: {e}"),
        };
        assert!(value["result"].is_null(), "failure envelopes must carry result: null");
    }

    #[test]
    fn envelope_roundtrips_through_json() {
        let env = RunEnvelope::build(RunId::new(), "m", "prod", 99, RunStatus::Timeout, None);
        let text = match serde_json::to_string(&env) {
            Ok(s) => s,
            Err(e) => panic!("serialize failed: {e}"),
        };
        let back: RunEnvelope = match serde_json::from_str(&text) {
            Ok(v) => v,
            Err(e) => panic!("deserialize failed: {e}"),
        };
        assert_eq!(back.run_id, env.run_id);
        assert_eq!(back.status(), RunStatus::Timeout);
        assert_eq!(back.summary.duration_ms, 99);
    }
}

//! Fuzz target: the compute_aabb module entry point.
//!
//! Module inputs are caller-controlled, so the entry point must reject
//! malformed shapes with an error instead of panicking.
#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some(entry) = shadow_runner::registry::lookup("compute_aabb") else {
        return;
    };
    if let Ok(serde_json::Value::Object(inputs)) = serde_json::from_slice(data) {
        let _ = entry(&inputs);
    }
});

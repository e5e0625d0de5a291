//! Fuzz target: artifact index deserialization.
//!
//! The index file is produced by external tooling, so parsing must
//! reject arbitrary bytes gracefully and never panic.
#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = shadow_core::ArtifactIndex::from_json(text);
    }
});

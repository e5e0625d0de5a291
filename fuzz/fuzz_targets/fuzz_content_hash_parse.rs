//! Fuzz target: content hash hex parsing.
//!
//! Verifies that parsing never panics and that accepted inputs
//! round-trip through the lowercase hex display.
#![no_main]

use libfuzzer_sys::fuzz_target;

use shadow_core::ContentHash;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(hash) = text.parse::<ContentHash>() {
            let hex = hash.to_string();
            assert_eq!(hex.len(), 64, "SHA-256 hex must always be 64 chars");
            assert_eq!(
                hex,
                text.to_ascii_lowercase(),
                "accepted input must round-trip modulo case"
            );
        }
    }
});

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::error::CoreError;

/// Unique identifier for a single supervised run.
///
/// Generated fresh per run and never reused; two runs of the same
/// request differ at least in their `RunId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub struct RunId(pub Uuid);

impl RunId {
    /// Creates a new random `RunId`.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the inner `Uuid`.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RunId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// A SHA-256 content hash identifying the exact bytes of an artifact.
///
/// Serialized as a 64-character lowercase hex string, which is the
/// representation the artifact index file stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub struct ContentHash(pub [u8; 32]);

impl ContentHash {
    /// Creates a `ContentHash` from a raw 32-byte digest.
    #[must_use]
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the raw digest bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl FromStr for ContentHash {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 64 {
            return Err(CoreError::InvalidContentHash {
                reason: format!("expected 64 hex chars, got {}", s.len()),
            });
        }
        if !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(CoreError::InvalidContentHash {
                reason: "non-hex character in hash".to_owned(),
            });
        }
        let mut bytes = [0u8; 32];
        for (i, chunk) in s.as_bytes().chunks(2).enumerate() {
            // Hex-validated above, so this cannot fail.
            let pair = std::str::from_utf8(chunk).map_err(|_| CoreError::InvalidContentHash {
                reason: "non-ASCII character in hash".to_owned(),
            })?;
            bytes[i] = u8::from_str_radix(pair, 16).map_err(|_| CoreError::InvalidContentHash {
                reason: format!("invalid hex pair '{pair}'"),
            })?;
        }
        Ok(Self(bytes))
    }
}

impl Serialize for ContentHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ContentHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_hash_display_is_lowercase_hex() {
        let mut bytes = [0u8; 32];
        bytes[0] = 0xde;
        bytes[1] = 0xad;
        bytes[31] = 0xff;
        let hash = ContentHash::new(bytes);
        let s = hash.to_string();
        assert!(s.starts_with("dead"), "expected hex starting with 'dead', got {s}");
        assert!(s.ends_with("ff"), "expected hex ending with 'ff', got {s}");
        assert_eq!(s.len(), 64, "SHA-256 hex must be 64 chars");
    }

    #[test]
    fn content_hash_roundtrips_through_from_str() {
        let hash = ContentHash::new([0x5a; 32]);
        let parsed: ContentHash = match hash.to_string().parse() {
            Ok(h) => h,
            Err(e) => panic!("parse failed: {e}"),
        };
        assert_eq!(parsed, hash, "display then parse must return the same hash");
    }

    #[test]
    fn content_hash_rejects_wrong_length() {
        assert!("abcd".parse::<ContentHash>().is_err());
        assert!("".parse::<ContentHash>().is_err());
        assert!("a".repeat(65).parse::<ContentHash>().is_err());
    }

    #[test]
    fn content_hash_rejects_non_hex() {
        let s = "zz".repeat(32);
        assert!(s.parse::<ContentHash>().is_err(), "non-hex chars must be rejected");
    }

    #[test]
    fn content_hash_serde_uses_hex_string() {
        let hash = ContentHash::new([0xab; 32]);
        let json = match serde_json::to_string(&hash) {
            Ok(j) => j,
            Err(e) => panic!("serialize failed: {e}"),
        };
        assert_eq!(json, format!("\"{}\"", "ab".repeat(32)));
        let back: ContentHash = match serde_json::from_str(&json) {
            Ok(h) => h,
            Err(e) => panic!("deserialize failed: {e}"),
        };
        assert_eq!(back, hash);
    }

    #[test]
    fn run_ids_are_unique() {
        assert_ne!(RunId::new(), RunId::new(), "fresh run ids must differ");
    }

    proptest::proptest! {
        #[test]
        fn proptest_content_hash_roundtrip(bytes in proptest::array::uniform32(proptest::prelude::any::<u8>())) {
            let hash = ContentHash::new(bytes);
            let hex = hash.to_string();
            proptest::prop_assert_eq!(hex.len(), 64);
            let parsed: ContentHash = match hex.parse() {
                Ok(h) => h,
                Err(e) => return Err(proptest::test_runner::TestCaseError::fail(format!("parse failed: {e}"))),
            };
            proptest::prop_assert_eq!(parsed, hash);
        }
    }
}

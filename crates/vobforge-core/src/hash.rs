//! Content hashing for persisted asset payloads

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// A SHA-256 digest of an asset payload, recorded in asset metadata so that
/// re-imports can tell whether a stored asset changed.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    pub fn of_bytes(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Self(hasher.finalize().into())
    }

    pub fn of_str(s: &str) -> Self {
        Self::of_bytes(s.as_bytes())
    }

    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// Hex digest with its algorithm prefix, e.g. `sha256:ab01...`
    pub fn to_prefixed_hex(&self) -> String {
        format!("sha256:{}", self.to_hex())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", &self.to_hex()[..12])
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_prefixed_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_deterministic() {
        assert_eq!(ContentHash::of_str("HUMANS"), ContentHash::of_str("HUMANS"));
        assert_ne!(ContentHash::of_str("HUMANS"), ContentHash::of_str("ORC"));
    }

    #[test]
    fn test_prefixed_hex() {
        let hex = ContentHash::of_bytes(b"").to_prefixed_hex();
        assert!(hex.starts_with("sha256:e3b0c442"));
        assert_eq!(hex.len(), 7 + 64);
    }
}

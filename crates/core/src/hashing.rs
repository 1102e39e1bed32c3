//! Content digests for import payload de-duplication.
//!
//! A [`ContentDigest`] is the SHA-256 of a payload's raw bytes. It is the
//! sole dedup key within a batch, so collision resistance is a correctness
//! requirement: two byte-distinct payloads must never share a digest.
//! Semantically-equal payloads that differ in bytes (whitespace, key order)
//! hash differently on purpose.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Length of a content digest in bytes (SHA-256).
pub const DIGEST_LEN: usize = 32;

/// A fixed-length fingerprint of a payload's raw bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentDigest([u8; DIGEST_LEN]);

impl ContentDigest {
    /// Compute the digest of the given bytes. Pure; no side effects.
    pub fn of(data: &[u8]) -> Self {
        let hash = Sha256::digest(data);
        Self(hash.into())
    }

    /// The raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Lowercase hex encoding of the digest.
    pub fn to_hex(&self) -> String {
        let mut out = String::with_capacity(DIGEST_LEN * 2);
        for byte in &self.0 {
            out.push_str(&format!("{byte:02x}"));
        }
        out
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ContentDigest({})", self.to_hex())
    }
}

impl std::str::FromStr for ContentDigest {
    type Err = crate::error::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != DIGEST_LEN * 2 {
            return Err(crate::error::CoreError::Validation(format!(
                "Digest hex must be {} characters, got {}",
                DIGEST_LEN * 2,
                s.len()
            )));
        }
        let mut bytes = [0u8; DIGEST_LEN];
        for (i, chunk) in s.as_bytes().chunks(2).enumerate() {
            let hex = std::str::from_utf8(chunk)
                .map_err(|_| crate::error::CoreError::Validation("Invalid hex".into()))?;
            bytes[i] = u8::from_str_radix(hex, 16)
                .map_err(|_| crate::error::CoreError::Validation("Invalid hex".into()))?;
        }
        Ok(Self(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_produces_known_hash() {
        let digest = ContentDigest::of(b"");
        assert_eq!(
            digest.to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn consistent_output() {
        let data = b"hello world";
        assert_eq!(ContentDigest::of(data), ContentDigest::of(data));
        assert_eq!(ContentDigest::of(data).to_hex().len(), 64);
    }

    #[test]
    fn byte_different_inputs_differ() {
        // Same JSON meaning, different bytes: distinct digests.
        let a = ContentDigest::of(br#"{"title":"Dune"}"#);
        let b = ContentDigest::of(br#"{ "title": "Dune" }"#);
        assert_ne!(a, b);
    }

    #[test]
    fn hex_round_trip() {
        let digest = ContentDigest::of(b"round trip");
        let parsed: ContentDigest = digest.to_hex().parse().unwrap();
        assert_eq!(digest, parsed);
    }

    #[test]
    fn short_hex_rejected() {
        assert!("abc123".parse::<ContentDigest>().is_err());
    }

    #[test]
    fn non_hex_rejected() {
        let bad = "zz".repeat(DIGEST_LEN);
        assert!(bad.parse::<ContentDigest>().is_err());
    }
}

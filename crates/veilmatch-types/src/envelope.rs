//! The encrypted-amount envelope.
//!
//! Trade amounts cross the wire as a 99-byte ElGamal-style triplet
//! `r || C1 || C2` of compressed BabyJubJub points (33 bytes each,
//! big-endian). The solver parses, fingerprints, and re-serializes
//! envelopes; it **never decrypts** and holds no keys.

use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::constants::{ENVELOPE_LEN, MAX_INPUT_SIZE, POINT_LEN};

/// A parsed encrypted-amount envelope. The components are opaque
/// compressed points; parsing does not decompress them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EncryptedAmount {
    /// Ephemeral randomness commitment.
    pub r: [u8; POINT_LEN],
    /// First ciphertext component.
    pub c1: [u8; POINT_LEN],
    /// Second ciphertext component.
    pub c2: [u8; POINT_LEN],
}

impl EncryptedAmount {
    /// Parse an envelope from untrusted bytes.
    ///
    /// Returns `Some` iff the input is exactly [`ENVELOPE_LEN`] bytes and
    /// every 33-byte component is non-zero. Oversized inputs are rejected
    /// before any slicing; trailing bytes are a rejection, never a
    /// truncation. Only the observed length is logged.
    #[must_use]
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        if bytes.len() > MAX_INPUT_SIZE {
            tracing::warn!(len = bytes.len(), "envelope input exceeds size cap");
            return None;
        }
        if bytes.len() != ENVELOPE_LEN {
            tracing::warn!(len = bytes.len(), "envelope has wrong length");
            return None;
        }

        let component = |offset: usize| -> Option<[u8; POINT_LEN]> {
            let chunk: [u8; POINT_LEN] = bytes[offset..offset + POINT_LEN].try_into().ok()?;
            if chunk.iter().all(|&b| b == 0) {
                tracing::warn!(offset, "envelope component is all zeros");
                return None;
            }
            Some(chunk)
        };

        Some(Self {
            r: component(0)?,
            c1: component(POINT_LEN)?,
            c2: component(2 * POINT_LEN)?,
        })
    }

    /// Serialize back to the exact 99-byte wire form.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; ENVELOPE_LEN] {
        let mut out = [0u8; ENVELOPE_LEN];
        out[..POINT_LEN].copy_from_slice(&self.r);
        out[POINT_LEN..2 * POINT_LEN].copy_from_slice(&self.c1);
        out[2 * POINT_LEN..].copy_from_slice(&self.c2);
        out
    }

    /// Structural validity: every component non-zero. Envelopes built via
    /// [`parse`](Self::parse) always satisfy this; directly-constructed
    /// ones may not.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        [&self.r, &self.c1, &self.c2]
            .iter()
            .all(|component| component.iter().any(|&b| b != 0))
    }

    /// Short unlinkable fingerprint: the first 8 bytes of a
    /// domain-separated SHA-256 over the wire form. Used by the volume
    /// estimator as a bucket key.
    #[must_use]
    pub fn fingerprint(&self) -> [u8; 8] {
        let mut hasher = Sha256::new();
        hasher.update(b"veilmatch:envelope:v1:");
        hasher.update(self.to_bytes());
        let hash = hasher.finalize();
        let mut out = [0u8; 8];
        out.copy_from_slice(&hash[..8]);
        out
    }

    /// The canonical deterministic zero-scaled envelope, emitted when the
    /// ZK backend cannot scale an amount. Shape-correct and parseable.
    #[must_use]
    pub fn zero_fill() -> Self {
        let mut point = [0u8; POINT_LEN];
        point[0] = 0x02;
        point[POINT_LEN - 1] = 0x01;
        Self {
            r: point,
            c1: point,
            c2: point,
        }
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl EncryptedAmount {
    /// A deterministic well-formed envelope derived from `seed`.
    pub fn from_seed(seed: u64) -> Self {
        let mut bytes = [0u8; ENVELOPE_LEN];
        let seed_bytes = seed.to_le_bytes();
        for (i, b) in bytes.iter_mut().enumerate() {
            // Low bit forced so every component stays non-zero.
            *b = (seed_bytes[i % 8] ^ (i as u8)) | 0x01;
        }
        Self::parse(&bytes).expect("seeded envelope is well-formed")
    }
}

impl fmt::Display for EncryptedAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "env:{}", hex::encode(self.fingerprint()))
    }
}

// Serde as a 198-character lowercase hex string; serde has no derive
// support for 33-byte arrays.
impl Serialize for EncryptedAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(self.to_bytes()))
    }
}

impl<'de> Deserialize<'de> for EncryptedAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        let bytes = hex::decode(&text).map_err(D::Error::custom)?;
        Self::parse(&bytes).ok_or_else(|| D::Error::custom("invalid encrypted amount envelope"))
    }
}

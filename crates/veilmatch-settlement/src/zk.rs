//! The ZK backend capability surface.
//!
//! The proving system itself is an external collaborator; the core only
//! needs two operations: homomorphic scaling of an encrypted amount, and
//! settlement proof generation. Any call may fail with a structured
//! error; the packager degrades on failure rather than propagating.

use sha2::{Digest, Sha256};
use veilmatch_types::{EncryptedAmount, Fill, Fp, Result, constants::POINT_LEN};

/// External proving backend consumed by the settlement packager.
pub trait ZkBackend {
    /// Homomorphically scale `envelope` by `numerator / denominator`
    /// without learning the plaintext.
    fn scale_envelope(
        &self,
        envelope: &EncryptedAmount,
        numerator: Fp,
        denominator: Fp,
    ) -> Result<EncryptedAmount>;

    /// Produce the opaque settlement proof. Output must not exceed
    /// [`constants::MAX_PROOF_SIZE`](veilmatch_types::constants::MAX_PROOF_SIZE);
    /// oversize output is replaced by the packager.
    fn prove_settlement(&self, clearing_price: Fp, fills: &[Fill]) -> Result<Vec<u8>>;
}

/// Deterministic hash-based stand-in for the real proving backend.
///
/// Real homomorphic scaling happens in the external prover; this backend
/// produces shape-correct, deterministic envelopes and proofs so that
/// local runs and tests exercise the full settlement path. A scaled
/// component is `0x02 || SHA-256(inputs)`, which always parses.
#[derive(Debug, Clone, Copy, Default)]
pub struct HashScalingBackend;

impl HashScalingBackend {
    fn derive_component(
        tag: u8,
        envelope: &EncryptedAmount,
        numerator: Fp,
        denominator: Fp,
    ) -> [u8; POINT_LEN] {
        let mut hasher = Sha256::new();
        hasher.update(b"veilmatch:scale:v1:");
        hasher.update([tag]);
        hasher.update(envelope.to_bytes());
        hasher.update(numerator.to_be_bytes());
        hasher.update(denominator.to_be_bytes());
        let hash = hasher.finalize();

        let mut component = [0u8; POINT_LEN];
        component[0] = 0x02;
        component[1..].copy_from_slice(&hash);
        component
    }
}

impl ZkBackend for HashScalingBackend {
    fn scale_envelope(
        &self,
        envelope: &EncryptedAmount,
        numerator: Fp,
        denominator: Fp,
    ) -> Result<EncryptedAmount> {
        if numerator.is_zero() {
            return Ok(EncryptedAmount::zero_fill());
        }
        Ok(EncryptedAmount {
            r: Self::derive_component(0, envelope, numerator, denominator),
            c1: Self::derive_component(1, envelope, numerator, denominator),
            c2: Self::derive_component(2, envelope, numerator, denominator),
        })
    }

    fn prove_settlement(&self, clearing_price: Fp, fills: &[Fill]) -> Result<Vec<u8>> {
        let mut hasher = Sha256::new();
        hasher.update(b"veilmatch:proof:v1:");
        hasher.update(clearing_price.to_be_bytes());
        hasher.update((fills.len() as u32).to_be_bytes());
        for fill in fills {
            hasher.update(fill.order_id.as_bytes());
            hasher.update(fill.envelope.to_bytes());
        }
        let first = hasher.finalize();
        let second = Sha256::digest(first);

        let mut proof = Vec::with_capacity(64);
        proof.extend_from_slice(&first);
        proof.extend_from_slice(&second);
        Ok(proof)
    }
}

/// Test doubles.
#[cfg(any(test, feature = "test-helpers"))]
pub mod doubles {
    use super::*;
    use veilmatch_types::{VeilmatchError, constants::MAX_PROOF_SIZE};

    /// A backend that is always offline.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct UnavailableBackend;

    impl ZkBackend for UnavailableBackend {
        fn scale_envelope(
            &self,
            _envelope: &EncryptedAmount,
            _numerator: Fp,
            _denominator: Fp,
        ) -> Result<EncryptedAmount> {
            Err(VeilmatchError::ExternalUnavailable {
                reason: "prover offline".into(),
            })
        }

        fn prove_settlement(&self, _clearing_price: Fp, _fills: &[Fill]) -> Result<Vec<u8>> {
            Err(VeilmatchError::ExternalUnavailable {
                reason: "prover offline".into(),
            })
        }
    }

    /// A backend whose proofs always exceed the size cap.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct OversizeProofBackend;

    impl ZkBackend for OversizeProofBackend {
        fn scale_envelope(
            &self,
            envelope: &EncryptedAmount,
            numerator: Fp,
            denominator: Fp,
        ) -> Result<EncryptedAmount> {
            HashScalingBackend.scale_envelope(envelope, numerator, denominator)
        }

        fn prove_settlement(&self, _clearing_price: Fp, _fills: &[Fill]) -> Result<Vec<u8>> {
            Ok(vec![0xaa; MAX_PROOF_SIZE + 1])
        }
    }
}

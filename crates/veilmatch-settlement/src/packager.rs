//! Settlement assembly.
//!
//! The packager turns the allocator's fill estimates into the on-chain
//! artifact: each matched order's envelope is homomorphically scaled to
//! its fill fraction, the proof is attached, and the digest is stamped.
//! Zero-fill orders are omitted; the fills list is never truncated.
//!
//! Backend failures degrade: an unscalable fill becomes the canonical
//! zero envelope with a non-fatal warning, and a missing or oversize
//! proof becomes a deterministic 1 KiB placeholder with
//! `proof_invalid = true`.

use sha2::{Digest, Sha256};
use veilmatch_types::{
    AbortReason, EncryptedAmount, Fill, Fp, OrderId, Settlement,
    constants::{MAX_PROOF_SIZE, PROOF_PLACEHOLDER_LEN},
};

use crate::wire;
use crate::zk::ZkBackend;

/// Per-order input to the packager: the original envelope plus the
/// allocator's estimated amount and fill.
#[derive(Debug, Clone)]
pub struct FillInput {
    pub order_id: OrderId,
    pub envelope: EncryptedAmount,
    /// Estimated order amount (the scaling denominator).
    pub amount: Fp,
    /// Estimated executed amount (the scaling numerator).
    pub fill: Fp,
}

/// Assemble a settled batch's artifact.
#[must_use]
pub fn package(
    zk: &dyn ZkBackend,
    clearing_price: Fp,
    total_matched_volume: Fp,
    inputs: &[FillInput],
) -> Settlement {
    let mut fills = Vec::new();
    for input in inputs.iter().filter(|i| !i.fill.is_zero()) {
        let envelope = match zk.scale_envelope(&input.envelope, input.fill, input.amount) {
            Ok(envelope) => envelope,
            Err(err) => {
                tracing::warn!(
                    order = %input.order_id,
                    error = %err,
                    "envelope scaling failed, substituting zero envelope"
                );
                EncryptedAmount::zero_fill()
            }
        };
        fills.push(Fill {
            order_id: input.order_id,
            envelope,
        });
    }

    let (proof_blob, proof_invalid) = match zk.prove_settlement(clearing_price, &fills) {
        Ok(blob) if blob.len() <= MAX_PROOF_SIZE => (blob, false),
        Ok(blob) => {
            tracing::warn!(len = blob.len(), "oversize proof replaced with placeholder");
            (placeholder_proof(clearing_price), true)
        }
        Err(err) => {
            tracing::warn!(error = %err, "proof generation failed, using placeholder");
            (placeholder_proof(clearing_price), true)
        }
    };

    let settlement = stamp_digest(Settlement {
        clearing_price,
        fills,
        proof_blob,
        proof_invalid,
        total_matched_volume,
        reason: None,
        digest: [0u8; 32],
    });

    tracing::info!(
        clearing_price = %settlement.clearing_price,
        fills = settlement.fills.len(),
        matched_volume = %settlement.total_matched_volume,
        proof_invalid = settlement.proof_invalid,
        digest = hex::encode(settlement.digest),
        "settlement packaged"
    );

    settlement
}

/// The artifact for a batch that aborted instead of settling: empty
/// fills, no proof, the reason recorded.
#[must_use]
pub fn package_aborted(reason: AbortReason) -> Settlement {
    let settlement = stamp_digest(Settlement {
        clearing_price: Fp::ZERO,
        fills: vec![],
        proof_blob: vec![],
        proof_invalid: false,
        total_matched_volume: Fp::ZERO,
        reason: Some(reason),
        digest: [0u8; 32],
    });
    tracing::warn!(%reason, "batch aborted, empty settlement emitted");
    settlement
}

fn stamp_digest(mut settlement: Settlement) -> Settlement {
    settlement.digest = wire::digest_bytes(&wire::encode(&settlement));
    settlement
}

/// 1 KiB of deterministic bytes: a SHA-256 chain seeded from the
/// clearing price.
fn placeholder_proof(clearing_price: Fp) -> Vec<u8> {
    let mut proof = Vec::with_capacity(PROOF_PLACEHOLDER_LEN);
    let mut hasher = Sha256::new();
    hasher.update(b"veilmatch:proof:placeholder:v1:");
    hasher.update(clearing_price.to_be_bytes());
    let mut block: [u8; 32] = hasher.finalize().into();
    while proof.len() < PROOF_PLACEHOLDER_LEN {
        proof.extend_from_slice(&block);
        block = Sha256::digest(block).into();
    }
    proof.truncate(PROOF_PLACEHOLDER_LEN);
    proof
}

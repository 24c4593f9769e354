//! Settlement types produced once per batch.
//!
//! A [`Settlement`] carries everything the on-chain contract needs to
//! finalize a batch: the public clearing price, the encrypted per-order
//! fills, and the proof blob. The per-order amounts stay sealed — only
//! aggregate volume is revealed, and only as an estimate.

use serde::{Deserialize, Serialize};

use crate::{AbortReason, EncryptedAmount, Fp, OrderId};

/// One matched order's encrypted fill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fill {
    pub order_id: OrderId,
    /// The order's envelope homomorphically scaled to the fill fraction.
    pub envelope: EncryptedAmount,
}

/// The settlement artifact for one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    /// Uniform clearing price; public once settled.
    pub clearing_price: Fp,
    /// Encrypted fills for matched orders, in allocation order.
    /// Zero-fill orders are omitted.
    pub fills: Vec<Fill>,
    /// Opaque proof bytes from the ZK backend, bounded by
    /// [`constants::MAX_PROOF_SIZE`](crate::constants::MAX_PROOF_SIZE).
    pub proof_blob: Vec<u8>,
    /// Set when the backend proof was oversize or unavailable and a
    /// deterministic placeholder was substituted.
    pub proof_invalid: bool,
    /// Estimated matched volume (informational; not on the wire).
    pub total_matched_volume: Fp,
    /// Present iff the batch aborted instead of settling.
    pub reason: Option<AbortReason>,
    /// SHA-256 over the wire encoding, for cross-run determinism checks.
    pub digest: [u8; 32],
}

impl Settlement {
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.reason.is_some()
    }

    #[must_use]
    pub fn contains_order(&self, order_id: OrderId) -> bool {
        self.fills.iter().any(|fill| fill.order_id == order_id)
    }

    /// Number of matched orders.
    #[must_use]
    pub fn matched_count(&self) -> usize {
        self.fills.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Settlement {
        Settlement {
            clearing_price: Fp::from_units(1000),
            fills: vec![Fill {
                order_id: OrderId([1u8; 32]),
                envelope: EncryptedAmount::from_seed(1),
            }],
            proof_blob: vec![0xaa; 64],
            proof_invalid: false,
            total_matched_volume: Fp::from_units(10),
            reason: None,
            digest: [0u8; 32],
        }
    }

    #[test]
    fn aborted_iff_reason_present() {
        let mut settlement = sample();
        assert!(!settlement.is_aborted());
        settlement.reason = Some(AbortReason::NoViablePrice);
        assert!(settlement.is_aborted());
    }

    #[test]
    fn contains_order() {
        let settlement = sample();
        assert!(settlement.contains_order(OrderId([1u8; 32])));
        assert!(!settlement.contains_order(OrderId([2u8; 32])));
        assert_eq!(settlement.matched_count(), 1);
    }

    #[test]
    fn serde_roundtrip() {
        let settlement = sample();
        let json = serde_json::to_string(&settlement).unwrap();
        let back: Settlement = serde_json::from_str(&json).unwrap();
        assert_eq!(settlement, back);
    }
}

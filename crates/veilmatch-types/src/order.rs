//! Order types for the Veilmatch batch solver.
//!
//! An order reveals its limit price but keeps its amount sealed inside an
//! [`EncryptedAmount`] envelope. Orders are immutable once admitted; only
//! their `status` advances.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{EncryptedAmount, Fp, OrderId, PairId, TraderId};

/// Which side of the batch this order is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Matched,
    Cancelled,
    Expired,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Matched => write!(f, "MATCHED"),
            Self::Cancelled => write!(f, "CANCELLED"),
            Self::Expired => write!(f, "EXPIRED"),
        }
    }
}

/// An admitted order. Created by the batch state machine from an
/// [`OrderSubmission`] once the envelope has parsed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub pair_id: PairId,
    pub trader: TraderId,
    pub side: Side,
    /// Revealed limit price.
    pub public_price: Fp,
    /// Sealed amount; never decrypted by the solver.
    pub encrypted_amount: EncryptedAmount,
    pub timestamp: DateTime<Utc>,
    pub status: OrderStatus,
}

impl Order {
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == OrderStatus::Pending
    }

    /// Whether this order is price-compatible with a clearing price:
    /// buys at or above it, sells at or below it.
    #[must_use]
    pub fn crosses(&self, clearing_price: Fp) -> bool {
        match self.side {
            Side::Buy => self.public_price >= clearing_price,
            Side::Sell => self.public_price <= clearing_price,
        }
    }
}

/// A submission as received from the service layer: the envelope is still
/// raw untrusted bytes and is parsed during admission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSubmission {
    pub id: OrderId,
    pub pair_id: PairId,
    pub trader: TraderId,
    pub side: Side,
    pub public_price: Fp,
    pub encrypted_amount: Vec<u8>,
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Order {
    /// A deterministic pending order; everything derives from `seed`.
    pub fn sealed_limit(side: Side, price: Fp, seed: u64) -> Self {
        let mut id = [0u8; 32];
        id[..8].copy_from_slice(&seed.to_be_bytes());
        let mut trader = [0u8; 20];
        trader[..8].copy_from_slice(&seed.to_be_bytes());
        Self {
            id: OrderId(id),
            pair_id: PairId(1),
            trader: TraderId(trader),
            side,
            public_price: price,
            encrypted_amount: EncryptedAmount::from_seed(seed),
            timestamp: DateTime::from_timestamp(1_700_000_000 + seed as i64, 0)
                .expect("valid timestamp"),
            status: OrderStatus::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_display() {
        assert_eq!(format!("{}", Side::Buy), "BUY");
        assert_eq!(format!("{}", Side::Sell), "SELL");
    }

    #[test]
    fn status_display() {
        assert_eq!(format!("{}", OrderStatus::Pending), "PENDING");
        assert_eq!(format!("{}", OrderStatus::Expired), "EXPIRED");
    }

    #[test]
    fn crossing_semantics() {
        let buy = Order::sealed_limit(Side::Buy, Fp::from_units(1050), 1);
        assert!(buy.crosses(Fp::from_units(1050)));
        assert!(buy.crosses(Fp::from_units(1000)));
        assert!(!buy.crosses(Fp::from_units(1100)));

        let sell = Order::sealed_limit(Side::Sell, Fp::from_units(990), 2);
        assert!(sell.crosses(Fp::from_units(990)));
        assert!(sell.crosses(Fp::from_units(1000)));
        assert!(!sell.crosses(Fp::from_units(980)));
    }

    #[test]
    fn sealed_limit_is_deterministic() {
        let a = Order::sealed_limit(Side::Buy, Fp::ONE, 42);
        let b = Order::sealed_limit(Side::Buy, Fp::ONE, 42);
        assert_eq!(a.id, b.id);
        assert_eq!(a.encrypted_amount, b.encrypted_amount);
        assert_eq!(a.timestamp, b.timestamp);
    }

    #[test]
    fn order_serde_roundtrip() {
        let order = Order::sealed_limit(Side::Sell, Fp::from_units(990), 7);
        let json = serde_json::to_string(&order).unwrap();
        let back: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(order.id, back.id);
        assert_eq!(order.encrypted_amount, back.encrypted_amount);
        assert_eq!(order.public_price, back.public_price);
    }
}

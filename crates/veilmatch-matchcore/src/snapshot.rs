//! The frozen order-book view handed to the solver.
//!
//! A snapshot is built once per settlement from the batch's order set.
//! Orders whose status is not `Pending` are excluded, amounts are
//! attached from the volume estimator, and both sides are sorted into
//! the deterministic matching order. The snapshot is immutable after
//! construction and moves by value through solver and allocator.

use chrono::{DateTime, Utc};
use veilmatch_types::{Fp, Order, OrderId, Side, TraderId, constants};
use veilmatch_estimator::VolumeEstimator;

/// One order as seen by the matcher: price revealed, amount estimated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotOrder {
    pub id: OrderId,
    pub trader: TraderId,
    pub side: Side,
    pub price: Fp,
    /// The estimator's per-order volume estimate — never a decrypted value.
    pub amount: Fp,
    pub timestamp: DateTime<Utc>,
}

/// Immutable view of one batch at the moment matching begins.
#[derive(Debug, Clone)]
pub struct BookSnapshot {
    buys: Vec<SnapshotOrder>,
    sells: Vec<SnapshotOrder>,
}

impl BookSnapshot {
    /// Build a snapshot from a batch's orders, estimating each amount.
    ///
    /// If more than [`constants::MAX_ORDERS_PER_BATCH`] pending orders
    /// remain, the snapshot keeps the first `MAX_ORDERS_PER_BATCH` by
    /// timestamp (ties by id) and logs a warning. Admission should have
    /// prevented this; the truncation is a safety net.
    #[must_use]
    pub fn build(orders: &[Order], estimator: &VolumeEstimator) -> Self {
        let mut pending: Vec<&Order> = orders.iter().filter(|o| o.is_pending()).collect();

        if pending.len() > constants::MAX_ORDERS_PER_BATCH {
            tracing::warn!(
                pending = pending.len(),
                cap = constants::MAX_ORDERS_PER_BATCH,
                "snapshot truncated to capacity"
            );
            pending.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));
            pending.truncate(constants::MAX_ORDERS_PER_BATCH);
        }

        let entries = pending
            .into_iter()
            .map(|order| SnapshotOrder {
                id: order.id,
                trader: order.trader,
                side: order.side,
                price: order.public_price,
                amount: estimator.order_estimate(order),
                timestamp: order.timestamp,
            })
            .collect();

        Self::from_entries(entries)
    }

    /// Assemble a snapshot from entries whose amounts are already known.
    /// Buys sort by price descending, sells by price ascending; ties by
    /// timestamp ascending, then lexicographic id.
    #[must_use]
    pub fn from_entries(entries: Vec<SnapshotOrder>) -> Self {
        let (mut buys, mut sells): (Vec<_>, Vec<_>) =
            entries.into_iter().partition(|e| e.side == Side::Buy);

        buys.sort_by(|a, b| {
            b.price
                .cmp(&a.price)
                .then(a.timestamp.cmp(&b.timestamp))
                .then(a.id.cmp(&b.id))
        });
        sells.sort_by(|a, b| {
            a.price
                .cmp(&b.price)
                .then(a.timestamp.cmp(&b.timestamp))
                .then(a.id.cmp(&b.id))
        });

        Self { buys, sells }
    }

    /// Buy side, best (highest) price first.
    #[must_use]
    pub fn buys(&self) -> &[SnapshotOrder] {
        &self.buys
    }

    /// Sell side, best (lowest) price first.
    #[must_use]
    pub fn sells(&self) -> &[SnapshotOrder] {
        &self.sells
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buys.is_empty() && self.sells.is_empty()
    }

    #[must_use]
    pub fn order_count(&self) -> usize {
        self.buys.len() + self.sells.len()
    }

    /// Highest buy price, or `None` if no buys.
    #[must_use]
    pub fn best_bid(&self) -> Option<Fp> {
        self.buys.first().map(|o| o.price)
    }

    /// Lowest sell price, or `None` if no sells.
    #[must_use]
    pub fn best_ask(&self) -> Option<Fp> {
        self.sells.first().map(|o| o.price)
    }
}

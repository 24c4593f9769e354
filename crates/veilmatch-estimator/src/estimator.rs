//! Bucketed volume estimation over encrypted envelopes.
//!
//! The estimate for an order is derived purely from its envelope
//! fingerprint: `bucket = fingerprint mod buckets`, and bucket *i* of *n*
//! carries the representative weight `mean × 2(i+1)/(n+1)` — a linear
//! ramp whose expectation over uniformly distributed buckets is exactly
//! `mean`. Each contribution is then snapped to the rounding ladder
//! `{0, 1, 10, 100, …}` before aggregation.
//!
//! Deterministic given an ordered input sequence; callers that need
//! reproducibility must feed orders in the batch's insertion order.

use std::collections::BTreeMap;

use veilmatch_types::{Fp, Order, constants};

/// Per-price-level volume estimate for one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeEstimate {
    /// Grand total across all pending orders, saturating.
    pub total: Fp,
    /// Estimated volume per revealed price level.
    pub per_level: BTreeMap<Fp, Fp>,
}

impl VolumeEstimate {
    /// Estimated volume at one price level.
    #[must_use]
    pub fn level(&self, price: Fp) -> Fp {
        self.per_level.get(&price).copied().unwrap_or(Fp::ZERO)
    }
}

/// Deterministic volume estimator over sealed amounts.
#[derive(Debug, Clone)]
pub struct VolumeEstimator {
    buckets: u64,
    mean_amount: Fp,
}

impl VolumeEstimator {
    /// Build an estimator from configuration. A zero bucket count is
    /// replaced with the default and logged.
    #[must_use]
    pub fn new(config: &veilmatch_types::EstimatorConfig) -> Self {
        let buckets = if config.buckets == 0 {
            tracing::warn!("estimator configured with zero buckets, using default");
            constants::VOLUME_BUCKETS
        } else {
            config.buckets
        };
        Self {
            buckets,
            mean_amount: config.mean_amount,
        }
    }

    /// The privacy-preserving estimate for a single order.
    ///
    /// Invalid envelopes contribute zero; only the structural fact is
    /// logged, never the contents.
    #[must_use]
    pub fn order_estimate(&self, order: &Order) -> Fp {
        if !order.encrypted_amount.is_valid() {
            tracing::warn!(order = %order.id, "invalid envelope contributes zero volume");
            return Fp::ZERO;
        }
        let fingerprint = order.encrypted_amount.fingerprint();
        let bucket = u64::from_be_bytes(fingerprint) % self.buckets;
        round_to_ladder(self.bucket_weight(bucket))
    }

    /// Estimate aggregate volume over a sequence of orders. Orders whose
    /// status is not `Pending` contribute nothing.
    #[must_use]
    pub fn estimate(&self, orders: &[Order]) -> VolumeEstimate {
        let mut total = Fp::ZERO;
        let mut per_level: BTreeMap<Fp, Fp> = BTreeMap::new();

        for order in orders.iter().filter(|o| o.is_pending()) {
            let contribution = self.order_estimate(order);
            total = total.saturating_add(contribution);
            let level = per_level.entry(order.public_price).or_insert(Fp::ZERO);
            *level = level.saturating_add(contribution);
        }

        VolumeEstimate { total, per_level }
    }

    /// Representative weight for a bucket: `mean × 2(i+1)/(n+1)`.
    fn bucket_weight(&self, bucket: u64) -> Fp {
        let ramp = Fp::from_ratio(
            2 * (u128::from(bucket) + 1),
            u128::from(self.buckets) + 1,
        );
        self.mean_amount.saturating_mul(ramp)
    }
}

impl Default for VolumeEstimator {
    fn default() -> Self {
        Self::new(&veilmatch_types::EstimatorConfig::default())
    }
}

/// Snap a contribution to the nearest rung of `{0, 1, 10, 100, …}` (whole
/// units), ties upward.
fn round_to_ladder(value: Fp) -> Fp {
    if value.is_zero() {
        return Fp::ZERO;
    }
    let mut lower = Fp::ZERO;
    let mut upper = Fp::ONE;
    loop {
        if value <= upper {
            let to_lower = value.saturating_sub(lower);
            let to_upper = upper.saturating_sub(value);
            return if to_upper <= to_lower { upper } else { lower };
        }
        let Some(next) = upper.raw().checked_mul(10) else {
            return upper;
        };
        lower = upper;
        upper = Fp::from_raw(next);
    }
}

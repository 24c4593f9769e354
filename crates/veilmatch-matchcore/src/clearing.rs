//! Uniform clearing price computation.
//!
//! Candidate prices are the revealed limit prices of both sides. For each
//! candidate `p`, the executable volume is
//! `min(Σ buys at price ≥ p, Σ sells at price ≤ p)` over estimated
//! amounts. The solver selects the viable candidate with maximum
//! executable volume, breaking ties toward the **lower** price. When no
//! candidate is viable but both sides hold volume, it falls back to the
//! bid/ask midpoint with zero executable volume.
//!
//! Deterministic: same snapshot → same outcome.

use std::fmt;

use veilmatch_types::Fp;

use crate::BookSnapshot;

/// Why no clearing price could be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoPriceReason {
    /// The snapshot holds no orders at all.
    EmptyBook,
    /// Only one side of the book is populated.
    OneSidedBook,
    /// Every order estimated to zero volume; matching could not execute.
    ZeroVolume,
    /// No crossing exists and no midpoint could be formed.
    NoCrossingPrice,
}

impl fmt::Display for NoPriceReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyBook => write!(f, "EMPTY_BOOK"),
            Self::OneSidedBook => write!(f, "ONE_SIDED_BOOK"),
            Self::ZeroVolume => write!(f, "ZERO_VOLUME"),
            Self::NoCrossingPrice => write!(f, "NO_CROSSING_PRICE"),
        }
    }
}

/// Result of the clearing-price scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearingOutcome {
    /// The uniform clearing price, if one was produced.
    pub price: Option<Fp>,
    /// Executable volume at the clearing price (zero on midpoint fallback).
    pub executable_volume: Fp,
    /// Set when the price is the bid/ask midpoint rather than a viable
    /// candidate.
    pub midpoint_fallback: bool,
    /// Present iff `price` is `None`.
    pub reason: Option<NoPriceReason>,
}

impl ClearingOutcome {
    fn no_price(reason: NoPriceReason) -> Self {
        Self {
            price: None,
            executable_volume: Fp::ZERO,
            midpoint_fallback: false,
            reason: Some(reason),
        }
    }
}

/// Scan candidate prices and pick the volume-maximizing clearing price.
#[must_use]
pub fn compute_clearing_price(snapshot: &BookSnapshot) -> ClearingOutcome {
    if snapshot.is_empty() {
        return ClearingOutcome::no_price(NoPriceReason::EmptyBook);
    }
    if snapshot.buys().is_empty() || snapshot.sells().is_empty() {
        return ClearingOutcome::no_price(NoPriceReason::OneSidedBook);
    }

    let total_buy = side_volume(snapshot.buys().iter().map(|o| o.amount));
    let total_sell = side_volume(snapshot.sells().iter().map(|o| o.amount));
    if total_buy.is_zero() && total_sell.is_zero() {
        return ClearingOutcome::no_price(NoPriceReason::ZeroVolume);
    }

    // Candidate set: union of revealed prices, ascending, deduplicated.
    let mut candidates: Vec<Fp> = snapshot
        .buys()
        .iter()
        .chain(snapshot.sells().iter())
        .map(|o| o.price)
        .collect();
    candidates.sort_unstable();
    candidates.dedup();

    // Cumulative sell volume at price <= p, per ascending candidate.
    // Sells are sorted ascending, so a single pointer walk suffices.
    let mut cumulative_sell = Vec::with_capacity(candidates.len());
    let mut sell_idx = 0;
    let mut sell_sum = Fp::ZERO;
    for &price in &candidates {
        while sell_idx < snapshot.sells().len() && snapshot.sells()[sell_idx].price <= price {
            sell_sum = sell_sum.saturating_add(snapshot.sells()[sell_idx].amount);
            sell_idx += 1;
        }
        cumulative_sell.push(sell_sum);
    }

    // Cumulative buy volume at price >= p, per descending candidate.
    // Buys are sorted descending, so walk candidates from the top.
    let mut cumulative_buy = vec![Fp::ZERO; candidates.len()];
    let mut buy_idx = 0;
    let mut buy_sum = Fp::ZERO;
    for (slot, &price) in candidates.iter().enumerate().rev() {
        while buy_idx < snapshot.buys().len() && snapshot.buys()[buy_idx].price >= price {
            buy_sum = buy_sum.saturating_add(snapshot.buys()[buy_idx].amount);
            buy_idx += 1;
        }
        cumulative_buy[slot] = buy_sum;
    }

    // A candidate is viable iff both sides are strictly positive there.
    // Ascending scan + strict improvement keeps ties on the lower price.
    let mut best: Option<(Fp, Fp)> = None;
    for (slot, &price) in candidates.iter().enumerate() {
        if cumulative_buy[slot].is_zero() || cumulative_sell[slot].is_zero() {
            continue;
        }
        let executable = cumulative_buy[slot].min(cumulative_sell[slot]);
        if best.is_none_or(|(_, best_volume)| executable > best_volume) {
            best = Some((price, executable));
        }
    }

    if let Some((price, executable_volume)) = best {
        return ClearingOutcome {
            price: Some(price),
            executable_volume,
            midpoint_fallback: false,
            reason: None,
        };
    }

    // No viable candidate: fall back to the bid/ask midpoint.
    let (Some(best_bid), Some(best_ask)) = (snapshot.best_bid(), snapshot.best_ask()) else {
        return ClearingOutcome::no_price(NoPriceReason::NoCrossingPrice);
    };
    ClearingOutcome {
        price: Some(best_bid.midpoint(best_ask)),
        executable_volume: Fp::ZERO,
        midpoint_fallback: true,
        reason: None,
    }
}

fn side_volume(amounts: impl Iterator<Item = Fp>) -> Fp {
    amounts.fold(Fp::ZERO, Fp::saturating_add)
}

//! Pro-rata fill allocation at the clearing price.
//!
//! Every snapshot order appears in the output exactly once; unmatched
//! orders carry a zero fill. Matched orders are scaled by their side's
//! pro-rata ratio and capped at their own amount. Rounding drift between
//! the two sides is reconciled against the last matched order on the
//! larger side; if the drift cannot be absorbed, conservation is
//! violated and the batch must abort.
//!
//! Amounts here are estimator outputs — the allocator never sees
//! plaintext. The fills it produces are the scale factors later applied
//! to each order's envelope by the settlement packager.

use veilmatch_types::{Fp, OrderId, Side};

use crate::{BookSnapshot, SnapshotOrder};

/// One order's allocation: the fill is zero when unmatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillAllocation {
    pub order_id: OrderId,
    pub side: Side,
    /// Estimated amount of the order (the scaling denominator).
    pub amount: Fp,
    /// Estimated executed amount, `<= amount`.
    pub fill: Fp,
}

/// The allocator's result for one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationOutcome {
    /// Matched buys, matched sells, unmatched buys, unmatched sells —
    /// each side in snapshot order. Stable for a given snapshot and price.
    pub fills: Vec<FillAllocation>,
    /// Reconciled matched volume (equal on both sides within one unit).
    pub matched_volume: Fp,
}

/// Post-reconciliation drift that could not be absorbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConservationViolation {
    /// Residual `|Σ buy fills − Σ sell fills|`.
    pub drift: Fp,
}

/// Allocate pro-rata fills at `clearing_price`.
pub fn allocate_fills(
    snapshot: &BookSnapshot,
    clearing_price: Fp,
) -> Result<AllocationOutcome, ConservationViolation> {
    let (matched_buys, unmatched_buys): (Vec<&SnapshotOrder>, Vec<&SnapshotOrder>) = snapshot
        .buys()
        .iter()
        .partition(|o| o.price >= clearing_price);
    let (matched_sells, unmatched_sells): (Vec<&SnapshotOrder>, Vec<&SnapshotOrder>) = snapshot
        .sells()
        .iter()
        .partition(|o| o.price <= clearing_price);

    let buy_total = side_total(&matched_buys);
    let sell_total = side_total(&matched_sells);
    let executable = buy_total.min(sell_total);

    let (buy_fills, sell_fills, matched_volume) = if executable.is_zero() {
        (
            vec![Fp::ZERO; matched_buys.len()],
            vec![Fp::ZERO; matched_sells.len()],
            Fp::ZERO,
        )
    } else {
        let buy_ratio = executable.saturating_div(buy_total);
        let sell_ratio = executable.saturating_div(sell_total);

        let mut buy_fills: Vec<Fp> = matched_buys
            .iter()
            .map(|o| o.amount.saturating_mul(buy_ratio).min(o.amount))
            .collect();
        let mut sell_fills: Vec<Fp> = matched_sells
            .iter()
            .map(|o| o.amount.saturating_mul(sell_ratio).min(o.amount))
            .collect();

        reconcile(&mut buy_fills, &mut sell_fills);

        let buy_sum = fill_sum(&buy_fills);
        let sell_sum = fill_sum(&sell_fills);
        let drift = buy_sum.abs_diff(sell_sum);
        if drift > Fp::EPSILON {
            tracing::warn!(%drift, "conservation drift not absorbable");
            return Err(ConservationViolation { drift });
        }
        (buy_fills, sell_fills, buy_sum.min(sell_sum))
    };

    let mut fills =
        Vec::with_capacity(snapshot.buys().len() + snapshot.sells().len());
    fills.extend(
        matched_buys
            .into_iter()
            .zip(buy_fills)
            .map(|(order, fill)| allocation(order, fill)),
    );
    fills.extend(
        matched_sells
            .into_iter()
            .zip(sell_fills)
            .map(|(order, fill)| allocation(order, fill)),
    );
    fills.extend(unmatched_buys.into_iter().map(|o| allocation(o, Fp::ZERO)));
    fills.extend(unmatched_sells.into_iter().map(|o| allocation(o, Fp::ZERO)));

    Ok(AllocationOutcome {
        fills,
        matched_volume,
    })
}

/// Shift rounding drift onto the last matched order of the larger side.
/// Fills only shrink here, so the per-order cap is preserved.
fn reconcile(buy_fills: &mut [Fp], sell_fills: &mut [Fp]) {
    let buy_sum = fill_sum(buy_fills);
    let sell_sum = fill_sum(sell_fills);
    if buy_sum > sell_sum {
        if let Some(last) = buy_fills.last_mut() {
            *last = last.saturating_sub(buy_sum.saturating_sub(sell_sum));
        }
    } else if sell_sum > buy_sum {
        if let Some(last) = sell_fills.last_mut() {
            *last = last.saturating_sub(sell_sum.saturating_sub(buy_sum));
        }
    }
}

fn allocation(order: &SnapshotOrder, fill: Fp) -> FillAllocation {
    FillAllocation {
        order_id: order.id,
        side: order.side,
        amount: order.amount,
        fill,
    }
}

fn side_total(orders: &[&SnapshotOrder]) -> Fp {
    orders
        .iter()
        .fold(Fp::ZERO, |acc, o| acc.saturating_add(o.amount))
}

fn fill_sum(fills: &[Fp]) -> Fp {
    fills.iter().fold(Fp::ZERO, |acc, f| acc.saturating_add(*f))
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;
    use veilmatch_types::TraderId;

    use super::*;

    fn fp(units: u128) -> Fp {
        Fp::from_units(units)
    }

    fn entry(tag: u8, side: Side, price: u128, amount: Fp) -> SnapshotOrder {
        SnapshotOrder {
            id: OrderId([tag; 32]),
            trader: TraderId([tag; 20]),
            side,
            price: fp(price),
            amount,
            timestamp: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        }
    }

    fn fill_of(outcome: &AllocationOutcome, tag: u8) -> Fp {
        outcome
            .fills
            .iter()
            .find(|f| f.order_id == OrderId([tag; 32]))
            .expect("order present")
            .fill
    }

    fn conservation_drift(outcome: &AllocationOutcome) -> Fp {
        let buys = outcome
            .fills
            .iter()
            .filter(|f| f.side == Side::Buy)
            .fold(Fp::ZERO, |acc, f| acc.saturating_add(f.fill));
        let sells = outcome
            .fills
            .iter()
            .filter(|f| f.side == Side::Sell)
            .fold(Fp::ZERO, |acc, f| acc.saturating_add(f.fill));
        buys.abs_diff(sells)
    }

    fn two_sided_book() -> BookSnapshot {
        BookSnapshot::from_entries(vec![
            entry(1, Side::Buy, 1050, fp(10)),
            entry(2, Side::Buy, 1030, fp(5)),
            entry(3, Side::Buy, 1010, fp(3)),
            entry(4, Side::Sell, 990, fp(4)),
            entry(5, Side::Sell, 1000, fp(8)),
            entry(6, Side::Sell, 1020, fp(6)),
        ])
    }

    #[test]
    fn every_order_appears_exactly_once() {
        let outcome = allocate_fills(&two_sided_book(), fp(1020)).unwrap();
        assert_eq!(outcome.fills.len(), 6);
        let mut ids: Vec<OrderId> = outcome.fills.iter().map(|f| f.order_id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 6);
    }

    #[test]
    fn two_sided_cross_conserves_volume() {
        // At 1020: matched buys 15 (o1, o2), matched sells 18 (all).
        let outcome = allocate_fills(&two_sided_book(), fp(1020)).unwrap();

        assert!(fill_of(&outcome, 1) > Fp::ZERO);
        assert!(fill_of(&outcome, 2) > Fp::ZERO);
        assert_eq!(fill_of(&outcome, 3), Fp::ZERO); // 1010 < clearing
        assert!(fill_of(&outcome, 4) > Fp::ZERO);
        assert!(fill_of(&outcome, 5) > Fp::ZERO);
        assert!(fill_of(&outcome, 6) > Fp::ZERO);

        assert!(conservation_drift(&outcome) <= Fp::EPSILON);
        assert!(outcome.matched_volume <= fp(15));
        assert!(outcome.matched_volume >= fp(15).saturating_sub(Fp::from_raw(10)));
    }

    #[test]
    fn fills_never_exceed_amounts() {
        let outcome = allocate_fills(&two_sided_book(), fp(1020)).unwrap();
        for allocation in &outcome.fills {
            assert!(
                allocation.fill <= allocation.amount,
                "fill exceeds amount for {}",
                allocation.order_id
            );
        }
    }

    #[test]
    fn price_compatibility_of_matched_orders() {
        let clearing = fp(1020);
        let book = two_sided_book();
        let outcome = allocate_fills(&book, clearing).unwrap();
        for allocation in outcome.fills.iter().filter(|f| f.fill > Fp::ZERO) {
            let order_price = book
                .buys()
                .iter()
                .chain(book.sells().iter())
                .find(|o| o.id == allocation.order_id)
                .unwrap()
                .price;
            match allocation.side {
                Side::Buy => assert!(order_price >= clearing),
                Side::Sell => assert!(order_price <= clearing),
            }
        }
    }

    #[test]
    fn pro_rata_splits_oversupplied_side() {
        // Demand 10 against supply 20 at a price where both sells match:
        // each sell fills exactly half its amount.
        let snapshot = BookSnapshot::from_entries(vec![
            entry(1, Side::Buy, 1000, fp(10)),
            entry(2, Side::Sell, 990, fp(15)),
            entry(3, Side::Sell, 995, fp(5)),
        ]);
        let outcome = allocate_fills(&snapshot, fp(995)).unwrap();

        let b1 = fill_of(&outcome, 1);
        let s1 = fill_of(&outcome, 2);
        let s2 = fill_of(&outcome, 3);

        assert!(b1.abs_diff(fp(10)) <= Fp::from_raw(10));
        assert!(s1.abs_diff(Fp::from_decimal_str("7.5")) <= Fp::from_raw(10));
        assert!(s2.abs_diff(Fp::from_decimal_str("2.5")) <= Fp::from_raw(10));
        assert!(conservation_drift(&outcome) <= Fp::EPSILON);
    }

    #[test]
    fn no_crossing_price_allocates_nothing() {
        let snapshot = BookSnapshot::from_entries(vec![
            entry(1, Side::Buy, 900, fp(10)),
            entry(2, Side::Sell, 1000, fp(10)),
        ]);
        // Midpoint price: neither side is price-compatible.
        let outcome = allocate_fills(&snapshot, fp(950)).unwrap();
        assert_eq!(outcome.matched_volume, Fp::ZERO);
        assert!(outcome.fills.iter().all(|f| f.fill == Fp::ZERO));
        assert_eq!(outcome.fills.len(), 2);
    }

    #[test]
    fn rounding_drift_lands_on_last_matched_order() {
        // r_sell = 10/15 rounds down, so the sell side sums just under
        // 10 and the buy side gives back the few missing units.
        let snapshot = BookSnapshot::from_entries(vec![
            entry(1, Side::Buy, 1000, fp(10)),
            entry(2, Side::Sell, 990, fp(15)),
        ]);
        let outcome = allocate_fills(&snapshot, fp(990)).unwrap();
        assert!(conservation_drift(&outcome) <= Fp::EPSILON);
        assert!(fill_of(&outcome, 1) < fp(10));
        assert!(fill_of(&outcome, 1) > fp(9));
    }

    #[test]
    fn unabsorbable_drift_is_a_conservation_violation() {
        // The last matched buy has zero amount, so it cannot absorb the
        // sell side's rounding shortfall.
        let snapshot = BookSnapshot::from_entries(vec![
            entry(1, Side::Buy, 1010, fp(10)),
            entry(2, Side::Buy, 1000, Fp::ZERO),
            entry(3, Side::Sell, 990, fp(15)),
        ]);
        let err = allocate_fills(&snapshot, fp(990)).unwrap_err();
        assert!(err.drift > Fp::EPSILON);
    }

    #[test]
    fn output_order_is_stable() {
        let outcome_a = allocate_fills(&two_sided_book(), fp(1020)).unwrap();
        let outcome_b = allocate_fills(&two_sided_book(), fp(1020)).unwrap();
        assert_eq!(outcome_a, outcome_b);

        // Matched buys first, then matched sells, then unmatched.
        let sides: Vec<(Side, bool)> = outcome_a
            .fills
            .iter()
            .map(|f| (f.side, f.fill > Fp::ZERO))
            .collect();
        assert_eq!(sides[0], (Side::Buy, true));
        assert_eq!(sides[2], (Side::Sell, true));
        assert_eq!(sides[5], (Side::Buy, false));
    }
}

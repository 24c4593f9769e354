//! The batch state machine.
//!
//! A [`Batch`] is the sole owner of its order records; callers interact
//! through ids and receive borrowed views. Transitions:
//!
//! | From    | Event               | To       |
//! |---------|---------------------|----------|
//! | —       | `open`              | Open     |
//! | Open    | `submit` / `cancel` | Open     |
//! | Open    | `close` / deadline  | Closing  |
//! | Closing | `settle`            | Settled  |
//! | Closing | `settle` (no price) | Aborted  |
//! | Closing | `abort`             | Aborted  |
//!
//! Deadline expiry is applied lazily: every mutating entry point first
//! refreshes the phase against the injected clock. `close` is idempotent
//! while `Closing`; `settle` on a terminal batch returns the stored
//! settlement without recomputation.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use chrono::{DateTime, Utc};
use veilmatch_estimator::VolumeEstimator;
use veilmatch_matchcore::{BookSnapshot, NoPriceReason, allocate_fills, compute_clearing_price};
use veilmatch_settlement::{FillInput, ZkBackend, package, package_aborted};
use veilmatch_types::{
    AbortReason, BatchConfig, BatchId, BatchPhase, EncryptedAmount, Order, OrderId,
    OrderStatus, OrderSubmission, PairId, Result, Settlement, TraderId, VeilmatchError,
};

/// One batch and its order set.
#[derive(Debug)]
pub struct Batch {
    id: BatchId,
    pair_id: PairId,
    opened_at: DateTime<Utc>,
    deadline: DateTime<Utc>,
    /// Insertion order preserved for reproducibility.
    orders: Vec<Order>,
    /// `OrderId -> index into orders` for O(1) lookup.
    index: HashMap<OrderId, usize>,
    phase: BatchPhase,
    settlement: Option<Settlement>,
    capacity: usize,
}

impl Batch {
    /// Open a new batch. The duration is validated against the configured
    /// window and additionally clamped as a defensive backstop.
    pub(crate) fn open(
        id: BatchId,
        pair_id: PairId,
        now: DateTime<Utc>,
        duration: Duration,
        config: &BatchConfig,
    ) -> Result<Self> {
        if duration < config.min_duration || duration > config.max_duration {
            return Err(VeilmatchError::InvalidDuration {
                seconds: duration.as_secs(),
            });
        }
        let duration = duration.clamp(config.min_duration, config.max_duration);
        let deadline = now + chrono::Duration::seconds(duration.as_secs() as i64);

        tracing::info!(batch = %id, %pair_id, %deadline, "batch opened");
        Ok(Self {
            id,
            pair_id,
            opened_at: now,
            deadline,
            orders: Vec::new(),
            index: HashMap::new(),
            phase: BatchPhase::Open,
            settlement: None,
            capacity: config.max_orders,
        })
    }

    /// Apply lazy deadline expiry: an open batch past its deadline moves
    /// to `Closing` before the current operation is considered.
    fn refresh(&mut self, now: DateTime<Utc>) {
        if self.phase == BatchPhase::Open && now >= self.deadline {
            tracing::debug!(batch = %self.id, "deadline reached, closing");
            self.phase = BatchPhase::Closing;
        }
    }

    /// Admit an order. The envelope is parsed here; a submission that
    /// fails any check leaves the batch untouched.
    pub(crate) fn submit(
        &mut self,
        submission: OrderSubmission,
        now: DateTime<Utc>,
    ) -> Result<OrderId> {
        self.refresh(now);
        if self.phase != BatchPhase::Open {
            return Err(VeilmatchError::BatchClosed(self.id));
        }
        if self.index.contains_key(&submission.id) {
            return Err(VeilmatchError::DuplicateOrder(submission.id));
        }
        let envelope = EncryptedAmount::parse(&submission.encrypted_amount).ok_or(
            VeilmatchError::InvalidEnvelope {
                len: submission.encrypted_amount.len(),
            },
        )?;
        if self.orders.len() >= self.capacity {
            return Err(VeilmatchError::BatchFull {
                capacity: self.capacity,
            });
        }

        let order = Order {
            id: submission.id,
            pair_id: submission.pair_id,
            trader: submission.trader,
            side: submission.side,
            public_price: submission.public_price,
            encrypted_amount: envelope,
            timestamp: now,
            status: OrderStatus::Pending,
        };
        tracing::debug!(batch = %self.id, order = %order.id, side = %order.side, "order admitted");
        self.index.insert(order.id, self.orders.len());
        self.orders.push(order);
        Ok(submission.id)
    }

    /// Cancel a pending order. The record is retained (marked
    /// `Cancelled`) for reproducibility.
    pub(crate) fn cancel(
        &mut self,
        order_id: OrderId,
        trader: TraderId,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.refresh(now);
        if self.phase != BatchPhase::Open {
            return Err(VeilmatchError::WrongPhase {
                expected: BatchPhase::Open,
                actual: self.phase,
            });
        }
        let slot = *self
            .index
            .get(&order_id)
            .ok_or(VeilmatchError::OrderNotFound(order_id))?;
        let order = self
            .orders
            .get_mut(slot)
            .ok_or_else(|| VeilmatchError::Internal("order index out of sync".into()))?;
        if order.trader != trader {
            return Err(VeilmatchError::NotOwner(order_id));
        }
        if order.status != OrderStatus::Pending {
            return Err(VeilmatchError::OrderNotCancellable(order_id));
        }
        order.status = OrderStatus::Cancelled;
        tracing::debug!(batch = %self.id, order = %order_id, "order cancelled");
        Ok(())
    }

    /// Close the batch to further submissions. Idempotent while
    /// `Closing`; an error once terminal.
    pub(crate) fn close(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.refresh(now);
        match self.phase {
            BatchPhase::Open => {
                self.phase = BatchPhase::Closing;
                tracing::info!(batch = %self.id, orders = self.orders.len(), "batch closed");
                Ok(())
            }
            BatchPhase::Closing => Ok(()),
            BatchPhase::Settled | BatchPhase::Aborted => {
                Err(VeilmatchError::AlreadyClosed(self.id))
            }
        }
    }

    /// Run settlement: snapshot → clearing price → allocation → artifact.
    ///
    /// Retriable only while `Closing`. Terminal batches return the stored
    /// settlement without recomputation.
    pub(crate) fn settle(
        &mut self,
        estimator: &VolumeEstimator,
        zk: &dyn ZkBackend,
        now: DateTime<Utc>,
    ) -> Result<Settlement> {
        self.refresh(now);
        match self.phase {
            BatchPhase::Open => return Err(VeilmatchError::NotClosed(self.id)),
            BatchPhase::Settled | BatchPhase::Aborted => {
                return self
                    .settlement
                    .clone()
                    .ok_or_else(|| VeilmatchError::Internal("terminal batch lost settlement".into()));
            }
            BatchPhase::Closing => {}
        }

        let snapshot = BookSnapshot::build(&self.orders, estimator);
        let clearing = compute_clearing_price(&snapshot);

        let Some(price) = clearing.price else {
            let reason = match clearing.reason {
                Some(NoPriceReason::ZeroVolume) => AbortReason::ZeroVolume,
                _ => AbortReason::NoViablePrice,
            };
            return Ok(self.abort_with(reason));
        };

        let outcome = match allocate_fills(&snapshot, price) {
            Ok(outcome) => outcome,
            Err(violation) => {
                tracing::warn!(batch = %self.id, drift = %violation.drift, "allocation failed");
                return Ok(self.abort_with(AbortReason::ConservationViolated));
            }
        };

        let inputs: Vec<FillInput> = outcome
            .fills
            .iter()
            .filter_map(|allocation| {
                let order = self
                    .index
                    .get(&allocation.order_id)
                    .and_then(|&slot| self.orders.get(slot));
                match order {
                    Some(order) => Some(FillInput {
                        order_id: allocation.order_id,
                        envelope: order.encrypted_amount,
                        amount: allocation.amount,
                        fill: allocation.fill,
                    }),
                    None => {
                        tracing::warn!(order = %allocation.order_id, "allocation for unknown order dropped");
                        None
                    }
                }
            })
            .collect();

        let settlement = package(zk, price, outcome.matched_volume, &inputs);

        // Matched orders are re-marked; pending leftovers expire.
        let matched: HashSet<OrderId> = inputs
            .iter()
            .filter(|input| !input.fill.is_zero())
            .map(|input| input.order_id)
            .collect();
        for order in &mut self.orders {
            if order.status == OrderStatus::Pending {
                order.status = if matched.contains(&order.id) {
                    OrderStatus::Matched
                } else {
                    OrderStatus::Expired
                };
            }
        }

        self.phase = BatchPhase::Settled;
        self.settlement = Some(settlement.clone());
        tracing::info!(
            batch = %self.id,
            clearing_price = %price,
            matched = matched.len(),
            "batch settled"
        );
        Ok(settlement)
    }

    /// Abort a closing batch before settlement emission. Once the
    /// artifact exists the batch is committed and abort is refused.
    pub(crate) fn abort(&mut self, reason: AbortReason, now: DateTime<Utc>) -> Result<Settlement> {
        self.refresh(now);
        if self.phase != BatchPhase::Closing {
            return Err(VeilmatchError::WrongPhase {
                expected: BatchPhase::Closing,
                actual: self.phase,
            });
        }
        Ok(self.abort_with(reason))
    }

    fn abort_with(&mut self, reason: AbortReason) -> Settlement {
        let settlement = package_aborted(reason);
        self.phase = BatchPhase::Aborted;
        self.settlement = Some(settlement.clone());
        settlement
    }

    // =================================================================
    // Read-only views
    // =================================================================

    #[must_use]
    pub fn id(&self) -> BatchId {
        self.id
    }

    #[must_use]
    pub fn pair_id(&self) -> PairId {
        self.pair_id
    }

    #[must_use]
    pub fn phase(&self) -> BatchPhase {
        self.phase
    }

    #[must_use]
    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    #[must_use]
    pub fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }

    /// Orders in insertion order.
    #[must_use]
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    #[must_use]
    pub fn order(&self, order_id: OrderId) -> Option<&Order> {
        self.index.get(&order_id).and_then(|&slot| self.orders.get(slot))
    }

    #[must_use]
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// The settlement, once the batch is terminal.
    #[must_use]
    pub fn settlement(&self) -> Option<&Settlement> {
        self.settlement.as_ref()
    }
}

//! The solver API consumed by the node's service layer.
//!
//! [`SolverEngine`] owns every batch; there are no process-wide stores.
//! Push-style notification, persistence, and transport belong to the
//! service tier above.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use veilmatch_estimator::{VolumeEstimate, VolumeEstimator};
use veilmatch_settlement::ZkBackend;
use veilmatch_types::{
    AbortReason, BatchId, OrderId, OrderSubmission, PairId, Result, Settlement, SolverConfig,
    TraderId, VeilmatchError,
};

use crate::batch::Batch;
use crate::clock::Clock;

/// Owns all batch state and drives the lifecycle.
pub struct SolverEngine {
    config: SolverConfig,
    clock: Arc<dyn Clock>,
    zk: Arc<dyn ZkBackend>,
    estimator: VolumeEstimator,
    batches: BTreeMap<BatchId, Batch>,
    next_batch: BatchId,
}

impl SolverEngine {
    #[must_use]
    pub fn new(config: SolverConfig, clock: Arc<dyn Clock>, zk: Arc<dyn ZkBackend>) -> Self {
        let estimator = VolumeEstimator::new(&config.estimator);
        Self {
            config,
            clock,
            zk,
            estimator,
            batches: BTreeMap::new(),
            next_batch: BatchId(1),
        }
    }

    /// Open a new batch for `pair_id` with the given duration.
    pub fn begin_batch(&mut self, pair_id: PairId, duration_seconds: u64) -> Result<BatchId> {
        let id = self.next_batch;
        let batch = Batch::open(
            id,
            pair_id,
            self.clock.now(),
            Duration::from_secs(duration_seconds),
            &self.config.batch,
        )?;
        self.batches.insert(id, batch);
        self.next_batch = id.next();
        Ok(id)
    }

    /// Submit an order into an open batch.
    pub fn submit_order(
        &mut self,
        batch_id: BatchId,
        submission: OrderSubmission,
    ) -> Result<OrderId> {
        let now = self.clock.now();
        self.batch_mut(batch_id)?.submit(submission, now)
    }

    /// Cancel a pending order; only its creator may do so, and only
    /// while the batch is open.
    pub fn cancel_order(
        &mut self,
        batch_id: BatchId,
        order_id: OrderId,
        trader: TraderId,
    ) -> Result<()> {
        let now = self.clock.now();
        self.batch_mut(batch_id)?.cancel(order_id, trader, now)
    }

    /// Aggregate volume diagnostics over the batch's pending orders.
    pub fn estimate_volume(&self, batch_id: BatchId) -> Result<VolumeEstimate> {
        let batch = self.batch(batch_id)?;
        Ok(self.estimator.estimate(batch.orders()))
    }

    /// Close a batch to further submissions.
    pub fn close_batch(&mut self, batch_id: BatchId) -> Result<()> {
        let now = self.clock.now();
        self.batch_mut(batch_id)?.close(now)
    }

    /// Settle a closed batch. An unviable batch yields an `Aborted`
    /// settlement (reason set, fills empty), not an error.
    pub fn settle_batch(&mut self, batch_id: BatchId) -> Result<Settlement> {
        let now = self.clock.now();
        let estimator = self.estimator.clone();
        let zk = Arc::clone(&self.zk);
        self.batch_mut(batch_id)?.settle(&estimator, zk.as_ref(), now)
    }

    /// Cancel a pending settlement: aborts a closing batch before the
    /// artifact is emitted. A no-op error once settlement is committed.
    pub fn abort_batch(&mut self, batch_id: BatchId) -> Result<Settlement> {
        let now = self.clock.now();
        self.batch_mut(batch_id)?.abort(AbortReason::Cancelled, now)
    }

    /// Read-only view of a batch.
    pub fn get_batch(&self, batch_id: BatchId) -> Result<&Batch> {
        self.batch(batch_id)
    }

    fn batch(&self, batch_id: BatchId) -> Result<&Batch> {
        self.batches
            .get(&batch_id)
            .ok_or(VeilmatchError::BatchNotFound(batch_id))
    }

    fn batch_mut(&mut self, batch_id: BatchId) -> Result<&mut Batch> {
        self.batches
            .get_mut(&batch_id)
            .ok_or(VeilmatchError::BatchNotFound(batch_id))
    }
}

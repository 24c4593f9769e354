//! Error types for the Veilmatch batch solver.
//!
//! All errors use the `VM_ERR_` prefix convention for easy grepping in
//! logs. Error codes are grouped by subsystem:
//! - 1xx: Order / validation errors
//! - 2xx: Batch lifecycle errors
//! - 3xx: External collaborator errors
//! - 4xx: Wire / codec errors
//! - 9xx: General / internal errors
//!
//! Integrity conditions (conservation violated, no viable price, zero
//! volume) are **not** errors: they surface as
//! [`AbortReason`](crate::AbortReason) inside an aborted settlement.

use thiserror::Error;

use crate::{BatchId, BatchPhase, OrderId};

/// Central error enum for all Veilmatch operations.
#[derive(Debug, Error)]
pub enum VeilmatchError {
    // =================================================================
    // Order / Validation Errors (1xx)
    // =================================================================
    /// The requested order was not found in the batch.
    #[error("VM_ERR_100: Order not found: {0}")]
    OrderNotFound(OrderId),

    /// The encrypted-amount envelope failed to parse. Only the observed
    /// length is reported, never the contents.
    #[error("VM_ERR_101: Invalid envelope: {len} bytes")]
    InvalidEnvelope { len: usize },

    /// An order with this ID already exists in the batch.
    #[error("VM_ERR_102: Order already exists: {0}")]
    DuplicateOrder(OrderId),

    /// The caller is not the trader who created the order.
    #[error("VM_ERR_103: Not the owner of order {0}")]
    NotOwner(OrderId),

    /// The order is no longer pending and cannot be cancelled.
    #[error("VM_ERR_104: Order cannot be cancelled: {0}")]
    OrderNotCancellable(OrderId),

    // =================================================================
    // Batch Lifecycle Errors (2xx)
    // =================================================================
    /// No batch with this ID is known.
    #[error("VM_ERR_200: Batch not found: {0}")]
    BatchNotFound(BatchId),

    /// The batch is past its deadline or has been closed.
    #[error("VM_ERR_201: Batch closed: {0}")]
    BatchClosed(BatchId),

    /// The batch has reached its admission capacity.
    #[error("VM_ERR_202: Batch full: capacity {capacity}")]
    BatchFull { capacity: usize },

    /// The requested duration is outside the allowed window.
    #[error("VM_ERR_203: Invalid batch duration: {seconds}s")]
    InvalidDuration { seconds: u64 },

    /// An operation was attempted in the wrong batch phase.
    #[error("VM_ERR_204: Wrong batch phase: expected {expected}, got {actual}")]
    WrongPhase {
        expected: BatchPhase,
        actual: BatchPhase,
    },

    /// Settlement was requested before the batch closed.
    #[error("VM_ERR_205: Batch not closed: {0}")]
    NotClosed(BatchId),

    /// The batch has already reached a terminal phase.
    #[error("VM_ERR_206: Batch already closed: {0}")]
    AlreadyClosed(BatchId),

    // =================================================================
    // External Collaborator Errors (3xx)
    // =================================================================
    /// An external call exceeded its time budget.
    #[error("VM_ERR_300: External call timed out: {operation}")]
    ExternalTimeout { operation: String },

    /// The external collaborator is unavailable.
    #[error("VM_ERR_301: External backend unavailable: {reason}")]
    ExternalUnavailable { reason: String },

    // =================================================================
    // Wire / Codec Errors (4xx)
    // =================================================================
    /// The wire payload ended before the declared content.
    #[error("VM_ERR_400: Wire payload truncated: expected {expected} bytes, got {actual}")]
    WireTruncated { expected: usize, actual: usize },

    /// The wire payload carries bytes past the declared content.
    #[error("VM_ERR_401: Wire payload has {extra} trailing bytes")]
    WireTrailingBytes { extra: usize },

    /// The declared fill count exceeds the per-batch cap.
    #[error("VM_ERR_402: Fill count {count} exceeds cap {max}")]
    FillCountExceeded { count: usize, max: usize },

    /// The declared proof length exceeds the proof size cap.
    #[error("VM_ERR_403: Proof of {len} bytes exceeds cap {max}")]
    ProofOversized { len: usize, max: usize },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("VM_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("VM_ERR_901: Serialization error: {0}")]
    Serialization(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, VeilmatchError>;

//! # veilmatch-matchcore
//!
//! **Compute plane**: uniform-price matching over estimated volumes.
//!
//! MatchCore takes a frozen snapshot of one batch and produces the
//! clearing price and pro-rata fill allocations. It has:
//!
//! - **Zero side effects**: no state, no clocks, no envelope access —
//!   amounts arrive pre-estimated and plaintext never exists
//! - **Deterministic output**: same snapshot → same price, same fills
//! - **Total arithmetic**: every operation saturates; matching cannot
//!   panic and cannot leave a batch unsettleable

pub mod allocator;
pub mod clearing;
pub mod snapshot;

pub use allocator::{AllocationOutcome, ConservationViolation, FillAllocation, allocate_fills};
pub use clearing::{ClearingOutcome, NoPriceReason, compute_clearing_price};
pub use snapshot::{BookSnapshot, SnapshotOrder};

//! # veilmatch-engine
//!
//! **Lifecycle plane**: owns batches and drives them through
//! Open → Closing → Settled / Aborted.
//!
//! ## Architecture
//!
//! One logical task owns the [`SolverEngine`]; submissions, cancellations,
//! and settlement are processed serially, so batch transitions are
//! linearizable by construction. External effects go through two
//! capability traits — [`Clock`] for time and
//! [`ZkBackend`](veilmatch_settlement::ZkBackend) for proving — which
//! test doubles implement.
//!
//! ## Settlement flow
//!
//! ```text
//! close() → BookSnapshot::build → compute_clearing_price
//!         → allocate_fills → package → Settlement
//! ```
//!
//! The snapshot moves by value through solver and allocator; no state is
//! shared across components beyond the batch record itself.

pub mod batch;
pub mod clock;
pub mod engine;

pub use batch::Batch;
pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::SolverEngine;

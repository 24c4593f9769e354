//! # veilmatch-types
//!
//! Shared types, errors, and configuration for the **Veilmatch** batch solver.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`OrderId`], [`TraderId`], [`PairId`], [`BatchId`]
//! - **Fixed point**: [`Fp`] — 128-bit unsigned, decimal scale 10^18, total ops
//! - **Envelope**: [`EncryptedAmount`] — the 99-byte sealed-amount ciphertext
//! - **Order model**: [`Order`], [`OrderSubmission`], [`Side`], [`OrderStatus`]
//! - **Batch model**: [`BatchPhase`], [`AbortReason`]
//! - **Settlement model**: [`Settlement`], [`Fill`]
//! - **Configuration**: [`SolverConfig`], [`BatchConfig`], [`EstimatorConfig`]
//! - **Errors**: [`VeilmatchError`] with `VM_ERR_` prefix codes
//! - **Constants**: system-wide limits and defaults

pub mod batch;
pub mod config;
pub mod constants;
pub mod envelope;
pub mod error;
pub mod fixed;
pub mod ids;
pub mod order;
pub mod settlement;

// Re-export all primary types at crate root for ergonomic imports:
//   use veilmatch_types::{Order, Side, Fp, Settlement, ...};

pub use batch::*;
pub use config::*;
pub use envelope::*;
pub use error::*;
pub use fixed::*;
pub use ids::*;
pub use order::*;
pub use settlement::*;

// Constants are accessed via `veilmatch_types::constants::FOO`
// (not re-exported to avoid name collisions).

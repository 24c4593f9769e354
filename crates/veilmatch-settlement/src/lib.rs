//! # veilmatch-settlement
//!
//! **Finality plane**: assembles the on-chain settlement artifact.
//!
//! The packager receives the clearing price and fill allocations from
//! MatchCore, asks the external ZK backend to homomorphically scale each
//! matched order's envelope, attaches the settlement proof, and encodes
//! everything into the wire shape the contract consumes.
//!
//! The backend is a narrow capability trait ([`ZkBackend`]); failures
//! degrade — a zero envelope for an unscalable fill, a deterministic
//! placeholder for a missing or oversize proof — and never abort an
//! otherwise viable settlement.

pub mod packager;
pub mod wire;
pub mod zk;

pub use packager::{FillInput, package, package_aborted};
pub use wire::{WireSettlement, decode, encode};
pub use zk::{HashScalingBackend, ZkBackend};

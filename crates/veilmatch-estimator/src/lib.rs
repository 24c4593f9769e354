//! # veilmatch-estimator
//!
//! **Privacy plane**: bounded, deterministic volume estimation over
//! encrypted order amounts.
//!
//! The estimator never decrypts. Each order's envelope fingerprint is
//! mapped to a bucket whose representative weight approximates the
//! historically observed mean amount, and every contribution is rounded
//! onto a coarse ladder so that no single order leaks more than its
//! ladder rung.

pub mod estimator;

pub use estimator::{VolumeEstimate, VolumeEstimator};

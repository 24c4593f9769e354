//! System-wide constants for the Veilmatch batch solver.

/// Defensive cap on the number of orders matched per batch. Admission
/// rejects above this; the snapshot builder additionally truncates.
pub const MAX_ORDERS_PER_BATCH: usize = 1000;

/// Minimum batch duration in seconds.
pub const MIN_BATCH_DURATION_SECS: u64 = 60;

/// Maximum batch duration in seconds (one day).
pub const MAX_BATCH_DURATION_SECS: u64 = 86_400;

/// Length of a compressed curve point on the wire.
pub const POINT_LEN: usize = 33;

/// Exact length of the encrypted-amount envelope: `r || C1 || C2`.
pub const ENVELOPE_LEN: usize = 3 * POINT_LEN;

/// Maximum accepted settlement proof size in bytes.
pub const MAX_PROOF_SIZE: usize = 32 * 1024;

/// Maximum size of any single untrusted byte input.
pub const MAX_INPUT_SIZE: usize = 32 * 1024;

/// Size of the deterministic placeholder emitted for an invalid proof.
pub const PROOF_PLACEHOLDER_LEN: usize = 1024;

/// Default number of fingerprint buckets in the volume estimator.
pub const VOLUME_BUCKETS: u64 = 16;

/// Budget for any single external call (ZK backend, chain observation).
pub const EXTERNAL_CALL_TIMEOUT_SECS: u64 = 10;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "Veilmatch";

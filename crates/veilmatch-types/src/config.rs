//! Configuration for the Veilmatch solver.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Fp, constants};

/// Batch lifecycle configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Minimum accepted batch duration.
    pub min_duration: Duration,
    /// Maximum accepted batch duration.
    pub max_duration: Duration,
    /// Admission capacity per batch.
    pub max_orders: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            min_duration: Duration::from_secs(constants::MIN_BATCH_DURATION_SECS),
            max_duration: Duration::from_secs(constants::MAX_BATCH_DURATION_SECS),
            max_orders: constants::MAX_ORDERS_PER_BATCH,
        }
    }
}

/// Volume estimator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimatorConfig {
    /// Number of fingerprint buckets.
    pub buckets: u64,
    /// Historically observed mean transacted amount per order. The default
    /// encodes "about one unit of amount per order".
    pub mean_amount: Fp,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            buckets: constants::VOLUME_BUCKETS,
            mean_amount: Fp::ONE,
        }
    }
}

/// Limits applied to external collaborators (ZK backend, chain clock).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalConfig {
    /// Budget for any single external call.
    pub call_timeout: Duration,
}

impl Default for ExternalConfig {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(constants::EXTERNAL_CALL_TIMEOUT_SECS),
        }
    }
}

/// Top-level solver configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SolverConfig {
    pub batch: BatchConfig,
    pub estimator: EstimatorConfig,
    pub external: ExternalConfig,
}

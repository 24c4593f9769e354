//! Batch lifecycle types.
//!
//! Each batch moves through **Open → Closing → Settled**, or lands in
//! **Aborted** when settlement fails irrecoverably. `Settled` and
//! `Aborted` are terminal; a terminal batch is immutable.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The phases of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BatchPhase {
    /// Accepting new orders.
    Open,
    /// Deadline passed or externally closed; admissions refused.
    Closing,
    /// Settlement produced; immutable.
    Settled,
    /// Settlement failed irrecoverably; immutable.
    Aborted,
}

impl BatchPhase {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Settled | Self::Aborted)
    }
}

impl fmt::Display for BatchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "OPEN"),
            Self::Closing => write!(f, "CLOSING"),
            Self::Settled => write!(f, "SETTLED"),
            Self::Aborted => write!(f, "ABORTED"),
        }
    }
}

/// Why a batch aborted. Integrity conditions never surface as errors;
/// they land here, inside the emitted settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbortReason {
    /// No crossing price and no finite midpoint fallback.
    NoViablePrice,
    /// Every pending order estimated to zero volume.
    ZeroVolume,
    /// Pro-rata rounding could not be reconciled within one unit.
    ConservationViolated,
    /// Settlement was cancelled before the artifact was emitted.
    Cancelled,
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoViablePrice => write!(f, "NO_VIABLE_PRICE"),
            Self::ZeroVolume => write!(f, "ZERO_VOLUME"),
            Self::ConservationViolated => write!(f, "CONSERVATION_VIOLATED"),
            Self::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

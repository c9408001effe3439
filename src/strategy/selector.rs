// Strategy selector
//
// Pure function from battery percentage to send behavior. The table below is
// the protocol's one piece of business logic; recorded experiments depend on
// it, so the thresholds and the strict > boundary policy must not change.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Operating mode label carried in logs and flush reports
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// Plenty of energy: send every reading immediately, retry hard
    RealTime,
    /// Mid energy: batch a few readings, one retry
    Balanced,
    /// Low energy: batch aggressively, never retry
    Survival,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::RealTime => write!(f, "REALTIME"),
            Mode::Balanced => write!(f, "BALANCED"),
            Mode::Survival => write!(f, "SURVIVAL"),
        }
    }
}

/// Send parameters chosen for the current battery level. Evaluated fresh at
/// every decision point; has no persisted identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StrategyDecision {
    /// Flush once this many readings are buffered (>= 1)
    pub batch_threshold: u32,
    /// Mode label for observability
    pub mode: Mode,
    /// Retransmissions allowed after the initial send
    pub max_retries: u32,
}

impl StrategyDecision {
    /// Select the strategy for a battery percentage. Comparisons are strict:
    /// a battery exactly at a boundary falls into the lower tier.
    pub fn for_battery(percent: f64) -> Self {
        if percent > 70.0 {
            Self {
                batch_threshold: 1,
                mode: Mode::RealTime,
                max_retries: 3,
            }
        } else if percent > 30.0 {
            Self {
                batch_threshold: 5,
                mode: Mode::Balanced,
                max_retries: 1,
            }
        } else {
            Self {
                batch_threshold: 10,
                mode: Mode::Survival,
                max_retries: 0,
            }
        }
    }
}

//! Alert thresholds.

use serde::{Deserialize, Serialize};

/// Limits that turn a fresh observation into an alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Views on a newly seen post that count as a surge.
    pub view_surge: u64,
    /// Growth factor on the same post that counts as a spike.
    pub view_spike_multiplier: u64,
    /// Mentions in the 2-minute window that count as a surge.
    pub mention_surge: u64,
    /// Growth factor over the previous 2-minute count that counts as a surge.
    pub mention_multiplier: u64,
    /// Absolute 2-minute volume change (USD) that counts as a spike.
    pub volume_spike_usd: f64,
    /// Growth of the 10-minute mention count that counts as a search spike.
    pub search_spike: u64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            view_surge: 10_000,
            view_spike_multiplier: 5,
            mention_surge: 50,
            mention_multiplier: 2,
            volume_spike_usd: 50_000.0,
            search_spike: 100,
        }
    }
}

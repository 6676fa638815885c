//! Detector configuration

use serde::{Deserialize, Serialize};

/// Detector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Seconds between detection cycles
    pub cycle_interval_secs: u64,

    /// Seconds to wait before retrying after a failed cycle
    pub error_backoff_secs: u64,

    /// Minutes without a sample before an inactivity alert
    pub inactivity_threshold_mins: i64,

    /// Minutes of history the deviation pass evaluates
    pub deviation_window_mins: i64,

    /// Minimum samples in the window before deviation is evaluated
    pub deviation_min_samples: usize,

    /// Displacement threshold in coordinate units (0.05 is roughly 5 km)
    pub deviation_threshold: f64,

    /// Enable the synthetic demo alert generator
    pub synthetic: bool,

    /// Per-cycle probability of one synthetic alert
    pub synthetic_probability: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            cycle_interval_secs: 60,
            error_backoff_secs: 30,
            inactivity_threshold_mins: 15,
            deviation_window_mins: 60,
            deviation_min_samples: 3,
            deviation_threshold: 0.05,
            synthetic: true,
            synthetic_probability: 0.3,
        }
    }
}

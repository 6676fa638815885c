//! Anomaly Detection Engine
//!
//! Scans the location log on a fixed interval and raises alerts for
//! prolonged inactivity and route deviation, plus an optional synthetic
//! noise generator that keeps demo dashboards live.

mod config;
mod detector;
pub mod distance;
mod service;

pub use config::DetectorConfig;
pub use detector::{AnomalyDetector, SYNTHETIC_KINDS};
pub use service::DetectorService;

use thiserror::Error;

/// Detection errors
#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("storage error: {0}")]
    Storage(#[from] storage::StorageError),
    #[error("alerting error: {0}")]
    Alerting(#[from] alerting::AlertingError),
    #[error("one or more detection passes failed")]
    CycleFailed,
}

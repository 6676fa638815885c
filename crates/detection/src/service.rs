//! Detection loop harness

use crate::AnomalyDetector;
use chrono::Utc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Owns the background detection loop. One cycle at a time; the next cycle
/// starts only after the sleep following the previous one, so cycles never
/// overlap. Shutdown is observed between cycles and lets the current cycle
/// finish.
pub struct DetectorService {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl DetectorService {
    /// Spawn the detection loop.
    pub fn start(detector: AnomalyDetector) -> Self {
        let (shutdown, mut signal) = watch::channel(false);
        let handle = tokio::spawn(async move {
            info!(
                "anomaly detection engine started (cycle every {}s)",
                detector.config().cycle_interval_secs
            );
            loop {
                let delay = match detector.run_cycle(Utc::now()).await {
                    Ok(()) => {
                        info!("detection cycle completed");
                        Duration::from_secs(detector.config().cycle_interval_secs)
                    }
                    Err(e) => {
                        error!("detection cycle failed: {e}");
                        Duration::from_secs(detector.config().error_backoff_secs)
                    }
                };
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = signal.changed() => break,
                }
            }
            info!("anomaly detection engine stopped");
        });
        Self { shutdown, handle }
    }

    /// Signal shutdown and wait for the loop to exit.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.handle.await;
    }
}

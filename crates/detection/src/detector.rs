//! Detection passes

use crate::distance::{self, DistanceFn};
use crate::{DetectorConfig, DetectorError};
use alerting::{AlertKind, DedupGuard};
use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;
use storage::{NewAlert, Repository, Sample};
use tracing::{error, info, warn};

/// Kinds the synthetic generator draws from.
pub const SYNTHETIC_KINDS: &[&str] = &["suspicious_activity", "geo_fence_breach", "speed_anomaly"];

/// Scans the location log and raises alerts through the deduplication
/// guard. One instance is owned by the loop harness; the cycle body is a
/// function of (now, store) so tests inject time.
pub struct AnomalyDetector {
    repo: Repository,
    guard: DedupGuard,
    config: DetectorConfig,
    distance: DistanceFn,
}

impl AnomalyDetector {
    pub fn new(repo: Repository, config: DetectorConfig) -> Self {
        let guard = DedupGuard::new(repo.clone());
        Self {
            repo,
            guard,
            config,
            distance: distance::planar,
        }
    }

    /// Swap the deviation distance heuristic.
    pub fn with_distance_fn(mut self, distance: DistanceFn) -> Self {
        self.distance = distance;
        self
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Run one detection cycle at `now`. The passes are independent: a
    /// failure in one is logged and does not stop the others. Returns
    /// `CycleFailed` when any pass failed so the loop can back off.
    pub async fn run_cycle(&self, now: DateTime<Utc>) -> Result<(), DetectorError> {
        let mut failed = false;

        if let Err(e) = self.inactivity_pass(now).await {
            error!("inactivity pass failed: {e}");
            failed = true;
        }
        if let Err(e) = self.deviation_pass(now).await {
            error!("deviation pass failed: {e}");
            failed = true;
        }
        if self.config.synthetic {
            if let Err(e) = self.synthetic_pass().await {
                error!("synthetic pass failed: {e}");
                failed = true;
            }
        }

        if failed {
            return Err(DetectorError::CycleFailed);
        }
        Ok(())
    }

    /// Flag travelers whose most recent sample is older than the threshold.
    /// Travelers with no samples at all are not considered.
    pub async fn inactivity_pass(&self, now: DateTime<Utc>) -> Result<(), DetectorError> {
        let threshold = Duration::minutes(self.config.inactivity_threshold_mins);

        for (traveler_id, last_seen) in self.repo.latest_sample_times().await? {
            if now - last_seen <= threshold {
                continue;
            }
            if !self.guard.should_insert(&traveler_id, &AlertKind::Inactivity).await? {
                continue;
            }
            let message = format!(
                "Traveler {} inactive since {}",
                traveler_id,
                last_seen.format("%Y-%m-%d %H:%M:%S UTC")
            );
            self.repo
                .insert_alert(&NewAlert {
                    traveler_id: traveler_id.clone(),
                    kind: AlertKind::Inactivity.as_str().to_string(),
                    category: AlertKind::Inactivity.category().as_str().to_string(),
                    message,
                    latitude: None,
                    longitude: None,
                })
                .await?;
            warn!("inactivity alert for {}", traveler_id);
        }
        Ok(())
    }

    /// Flag travelers displaced more than the threshold from where their
    /// window started. Needs at least `deviation_min_samples` in the window.
    pub async fn deviation_pass(&self, now: DateTime<Utc>) -> Result<(), DetectorError> {
        let since = now - Duration::minutes(self.config.deviation_window_mins);
        let samples = self.repo.samples_since(since).await?;

        let mut tracks: HashMap<String, Vec<Sample>> = HashMap::new();
        for sample in samples {
            tracks.entry(sample.traveler_id.clone()).or_default().push(sample);
        }

        for (traveler_id, track) in tracks {
            if track.len() < self.config.deviation_min_samples {
                continue;
            }
            // track is newest first
            let current = &track[0];
            let start = &track[track.len() - 1];
            let displacement = (self.distance)(
                current.latitude,
                current.longitude,
                start.latitude,
                start.longitude,
            );
            if displacement <= self.config.deviation_threshold {
                continue;
            }
            if !self.guard.should_insert(&traveler_id, &AlertKind::Deviation).await? {
                continue;
            }
            self.repo
                .insert_alert(&NewAlert {
                    traveler_id: traveler_id.clone(),
                    kind: AlertKind::Deviation.as_str().to_string(),
                    category: AlertKind::Deviation.category().as_str().to_string(),
                    message: format!("Traveler {traveler_id} deviated from expected route"),
                    latitude: Some(current.latitude),
                    longitude: Some(current.longitude),
                })
                .await?;
            warn!(
                "deviation alert for {} ({:.4} units from window start)",
                traveler_id, displacement
            );
        }
        Ok(())
    }

    /// Demo noise: with configured probability, one alert of a random
    /// synthetic kind for a random registered traveler. Inserts without
    /// consulting the guard by contract.
    pub async fn synthetic_pass(&self) -> Result<(), DetectorError> {
        let travelers = self.repo.traveler_ids().await?;
        if travelers.is_empty() {
            return Ok(());
        }

        let pick = {
            let mut rng = rand::thread_rng();
            if rng.gen::<f64>() < self.config.synthetic_probability {
                let traveler = travelers.choose(&mut rng).cloned();
                let kind = SYNTHETIC_KINDS.choose(&mut rng).copied();
                traveler.zip(kind)
            } else {
                None
            }
        };
        let Some((traveler_id, kind)) = pick else {
            return Ok(());
        };

        let message = format!(
            "Detected {} for traveler {}",
            kind.replace('_', " "),
            traveler_id
        );
        self.repo
            .insert_alert(&NewAlert {
                traveler_id,
                kind: kind.to_string(),
                category: AlertKind::Synthetic(kind.to_string())
                    .category()
                    .as_str()
                    .to_string(),
                message,
                latitude: None,
                longitude: None,
            })
            .await?;
        info!("synthetic {} alert generated", kind);
        Ok(())
    }
}

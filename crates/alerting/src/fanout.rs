//! Panic fan-out router

use crate::{AlertKind, AlertingError};
use serde::Serialize;
use storage::{NewAlert, Repository};
use tracing::warn;

/// What a panic dispatch produced.
#[derive(Debug, Clone, Serialize)]
pub struct PanicReceipt {
    /// Id of the console-facing panic alert.
    pub alert_id: i64,
    /// Whether the traveler had a group to notify.
    pub group_notified: bool,
    /// Peer notifications written (group size minus the sender).
    pub peers_notified: usize,
}

/// Expands one panic press into the console alert, a confirmation for the
/// sender, and one copy per group peer. All rows land in one transaction and
/// none of them consult the deduplication guard: a panic is never suppressed.
pub struct PanicRouter {
    repo: Repository,
}

impl PanicRouter {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    pub async fn dispatch(
        &self,
        traveler_id: &str,
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Result<PanicReceipt, AlertingError> {
        // Unregistered senders keep their raw id as display name; the alert
        // still goes out.
        let display_name = self
            .repo
            .find_traveler(traveler_id)
            .await?
            .map(|t| t.name)
            .unwrap_or_else(|| traveler_id.to_string());

        let mut batch = vec![
            NewAlert {
                traveler_id: traveler_id.to_string(),
                kind: AlertKind::Panic.as_str().to_string(),
                category: AlertKind::Panic.category().as_str().to_string(),
                message: format!(
                    "EMERGENCY: {display_name} ({traveler_id}) pressed the panic button"
                ),
                latitude,
                longitude,
            },
            NewAlert {
                traveler_id: traveler_id.to_string(),
                kind: AlertKind::SelfConfirmation.as_str().to_string(),
                category: AlertKind::SelfConfirmation.category().as_str().to_string(),
                message: format!(
                    "Your emergency alert ({traveler_id}) has been sent to the monitoring team. Help is on the way."
                ),
                latitude,
                longitude,
            },
        ];

        let location = match (latitude, longitude) {
            (Some(lat), Some(lng)) => format!("{lat}, {lng}"),
            _ => "unknown".to_string(),
        };

        let mut peers_notified = 0;
        let mut group_notified = false;
        if let Some(membership) = self.repo.membership_of(traveler_id).await? {
            group_notified = true;
            for member in self.repo.group_members(membership.group_id).await? {
                if member.traveler_id == traveler_id {
                    continue;
                }
                batch.push(NewAlert {
                    traveler_id: member.traveler_id,
                    kind: AlertKind::PeerNotification.as_str().to_string(),
                    category: AlertKind::PeerNotification.category().as_str().to_string(),
                    message: format!(
                        "GROUP EMERGENCY: {display_name} ({traveler_id}) needs help! Location: {location}"
                    ),
                    latitude,
                    longitude,
                });
                peers_notified += 1;
            }
        }

        let ids = self.repo.insert_alerts(&batch).await?;
        warn!(
            "panic from {} fanned out to console and {} peers",
            traveler_id, peers_notified
        );

        Ok(PanicReceipt {
            alert_id: ids[0],
            group_notified,
            peers_notified,
        })
    }
}

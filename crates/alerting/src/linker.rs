//! Resolution linker

use crate::{AlertCategory, AlertingError};
use storage::Repository;
use tracing::info;

/// Resolves a console alert by id, then closes the subject-facing records of
/// the same incident: unresolved subject-category alerts at exactly the same
/// position (NULL position included) whose message names the subject.
///
/// Position + substring is the correlation key carried over from the source
/// system; there is no explicit incident id linking the rows.
pub struct ResolutionLinker {
    repo: Repository,
}

impl ResolutionLinker {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Returns false when the alert id is unknown (no-op).
    pub async fn resolve(&self, alert_id: i64) -> Result<bool, AlertingError> {
        let Some(alert) = self.repo.get_alert(alert_id).await? else {
            return Ok(false);
        };

        self.repo.resolve_alert(alert_id).await?;

        let candidates = self
            .repo
            .unresolved_at_position(
                AlertCategory::Subject.as_str(),
                alert.latitude,
                alert.longitude,
            )
            .await?;

        let mut linked = 0;
        for candidate in candidates {
            if candidate.message.contains(&alert.traveler_id) {
                self.repo.resolve_alert(candidate.id).await?;
                linked += 1;
            }
        }

        info!("resolved alert {} and {} linked alerts", alert_id, linked);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PanicRouter;
    use storage::{NewAlert, NewTraveler, Repository, CATEGORY_SUBJECT};

    async fn seed_group_panic(repo: &Repository) -> i64 {
        for (id, name) in [("T1", "Asha"), ("T2", "Ben"), ("T3", "Chen")] {
            repo.insert_traveler(&NewTraveler {
                traveler_id: id.to_string(),
                name: name.to_string(),
                email: format!("{id}@example.com"),
                phone: "555-0100".to_string(),
            })
            .await
            .unwrap();
        }
        repo.create_group("trek", "T1", "ABC123").await.unwrap();
        repo.join_group("T2", "ABC123").await.unwrap();
        repo.join_group("T3", "ABC123").await.unwrap();

        let router = PanicRouter::new(repo.clone());
        let receipt = router.dispatch("T1", Some(12.5), Some(77.5)).await.unwrap();
        receipt.alert_id
    }

    #[tokio::test]
    async fn resolving_panic_closes_linked_alerts() {
        let repo = Repository::in_memory().await.unwrap();
        let panic_id = seed_group_panic(&repo).await;

        // unrelated rows that must survive: different position, and same
        // position but naming another subject
        repo.insert_alert(&NewAlert {
            traveler_id: "T2".to_string(),
            kind: "peer_notification".to_string(),
            category: CATEGORY_SUBJECT.to_string(),
            message: "GROUP EMERGENCY: Dia (T9) needs help! Location: 12.5, 77.5".to_string(),
            latitude: Some(12.5),
            longitude: Some(77.5),
        })
        .await
        .unwrap();
        repo.insert_alert(&NewAlert {
            traveler_id: "T3".to_string(),
            kind: "peer_notification".to_string(),
            category: CATEGORY_SUBJECT.to_string(),
            message: "GROUP EMERGENCY: Asha (T1) needs help! Location: 30.0, 40.0".to_string(),
            latitude: Some(30.0),
            longitude: Some(40.0),
        })
        .await
        .unwrap();

        let linker = ResolutionLinker::new(repo.clone());
        assert!(linker.resolve(panic_id).await.unwrap());

        // panic + self-confirmation + both peer copies are closed
        assert!(repo.get_alert(panic_id).await.unwrap().unwrap().resolved);
        assert!(repo.find_unresolved("T1", "self_confirmation").await.unwrap().is_none());

        // survivors: the two unrelated rows
        let open = repo
            .unresolved_for_traveler("T2", CATEGORY_SUBJECT, 10)
            .await
            .unwrap();
        assert_eq!(open.len(), 1);
        assert!(open[0].message.contains("T9"));
        let open = repo
            .unresolved_for_traveler("T3", CATEGORY_SUBJECT, 10)
            .await
            .unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].latitude, Some(30.0));
    }

    #[tokio::test]
    async fn unknown_id_is_a_no_op() {
        let repo = Repository::in_memory().await.unwrap();
        let linker = ResolutionLinker::new(repo.clone());
        assert!(!linker.resolve(424242).await.unwrap());
    }

    #[tokio::test]
    async fn positionless_panic_links_positionless_records() {
        let repo = Repository::in_memory().await.unwrap();
        repo.create_group("pair", "T1", "DEF456").await.unwrap();
        repo.join_group("T2", "DEF456").await.unwrap();

        let router = PanicRouter::new(repo.clone());
        let receipt = router.dispatch("T1", None, None).await.unwrap();

        let linker = ResolutionLinker::new(repo.clone());
        assert!(linker.resolve(receipt.alert_id).await.unwrap());
        assert_eq!(repo.unresolved_count().await.unwrap(), 0);
    }
}

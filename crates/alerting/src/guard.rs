//! Deduplication guard

use crate::{AlertKind, AlertingError};
use storage::Repository;
use tracing::debug;

/// Policy consulted before every detector insertion: a second unresolved
/// alert of the same kind for the same traveler is suppressed. Check and
/// insert are not atomic; the detector loop is the only consumer and runs
/// one cycle at a time, while panic fan-out bypasses the guard entirely.
pub struct DedupGuard {
    repo: Repository,
}

impl DedupGuard {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// True when no unresolved alert of this kind exists for the traveler.
    pub async fn should_insert(
        &self,
        traveler_id: &str,
        kind: &AlertKind,
    ) -> Result<bool, AlertingError> {
        let existing = self.repo.find_unresolved(traveler_id, kind.as_str()).await?;
        if existing.is_some() {
            debug!("suppressed duplicate {} alert for {}", kind, traveler_id);
            return Ok(false);
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::NewAlert;

    fn inactivity_alert(traveler_id: &str) -> NewAlert {
        NewAlert {
            traveler_id: traveler_id.to_string(),
            kind: AlertKind::Inactivity.as_str().to_string(),
            category: AlertKind::Inactivity.category().as_str().to_string(),
            message: format!("Traveler {traveler_id} inactive"),
            latitude: None,
            longitude: None,
        }
    }

    #[tokio::test]
    async fn suppresses_while_unresolved() {
        let repo = Repository::in_memory().await.unwrap();
        let guard = DedupGuard::new(repo.clone());

        assert!(guard.should_insert("T1", &AlertKind::Inactivity).await.unwrap());

        let id = repo.insert_alert(&inactivity_alert("T1")).await.unwrap();
        assert!(!guard.should_insert("T1", &AlertKind::Inactivity).await.unwrap());

        // other kinds and other travelers are unaffected
        assert!(guard.should_insert("T1", &AlertKind::Deviation).await.unwrap());
        assert!(guard.should_insert("T2", &AlertKind::Inactivity).await.unwrap());

        // resolving re-arms the guard
        repo.resolve_alert(id).await.unwrap();
        assert!(guard.should_insert("T1", &AlertKind::Inactivity).await.unwrap());
    }
}

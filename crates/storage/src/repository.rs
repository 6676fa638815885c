//! Repository Implementation

use crate::records::{
    Alert, Group, GroupMember, Incident, NewAlert, NewIncident, NewTraveler, Sample, Traveler,
};
use crate::StorageError;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::{debug, info};

/// Schema bootstrap, idempotent. Timestamps are written by the repository so
/// every column carries the same encoding.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS travelers (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        traveler_id TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        phone TEXT NOT NULL,
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS location_log (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        traveler_id TEXT NOT NULL,
        latitude REAL NOT NULL,
        longitude REAL NOT NULL,
        recorded_at TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_location_traveler_time
        ON location_log (traveler_id, recorded_at)",
    "CREATE TABLE IF NOT EXISTS alerts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        traveler_id TEXT NOT NULL,
        kind TEXT NOT NULL,
        category TEXT NOT NULL,
        message TEXT NOT NULL,
        latitude REAL,
        longitude REAL,
        created_at TEXT NOT NULL,
        resolved INTEGER NOT NULL DEFAULT 0
    )",
    "CREATE INDEX IF NOT EXISTS idx_alerts_traveler_kind
        ON alerts (traveler_id, kind, resolved)",
    "CREATE TABLE IF NOT EXISTS travel_groups (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        code TEXT NOT NULL UNIQUE,
        created_by TEXT NOT NULL,
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS group_members (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        group_id INTEGER NOT NULL,
        traveler_id TEXT NOT NULL,
        joined_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS incidents (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        traveler_id TEXT NOT NULL,
        incident_type TEXT NOT NULL,
        description TEXT NOT NULL,
        case_number TEXT NOT NULL UNIQUE,
        created_at TEXT NOT NULL
    )",
];

/// Outcome of a group creation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateGroup {
    Created { code: String },
    AlreadyMember,
}

/// Outcome of a group join attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinGroup {
    Joined { group_name: String },
    AlreadyMember,
    UnknownCode,
}

/// Repository for all persisted state, cheap to clone (shares the pool).
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Open (creating if missing) the database at `database_url` and run the
    /// schema bootstrap.
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        let repo = Self { pool };
        repo.init_schema().await?;
        info!("connected to database {}", database_url);
        Ok(repo)
    }

    /// In-memory database on a single connection. Used by tests and demos.
    pub async fn in_memory() -> Result<Self, StorageError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        let repo = Self { pool };
        repo.init_schema().await?;
        Ok(repo)
    }

    async fn init_schema(&self) -> Result<(), StorageError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    // --- Traveler registry ---

    /// Register a traveler, returning the row id.
    pub async fn insert_traveler(&self, traveler: &NewTraveler) -> Result<i64, StorageError> {
        let result = sqlx::query(
            "INSERT INTO travelers (traveler_id, name, email, phone, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&traveler.traveler_id)
        .bind(&traveler.name)
        .bind(&traveler.email)
        .bind(&traveler.phone)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        debug!("registered traveler {}", traveler.traveler_id);
        Ok(result.last_insert_rowid())
    }

    pub async fn find_traveler(&self, traveler_id: &str) -> Result<Option<Traveler>, StorageError> {
        let traveler = sqlx::query_as::<_, Traveler>(
            "SELECT * FROM travelers WHERE traveler_id = ?1",
        )
        .bind(traveler_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(traveler)
    }

    pub async fn list_travelers(&self) -> Result<Vec<Traveler>, StorageError> {
        let travelers = sqlx::query_as::<_, Traveler>(
            "SELECT * FROM travelers ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(travelers)
    }

    /// All registered traveler ids.
    pub async fn traveler_ids(&self) -> Result<Vec<String>, StorageError> {
        let ids = sqlx::query_scalar::<_, String>("SELECT traveler_id FROM travelers")
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    pub async fn traveler_count(&self) -> Result<i64, StorageError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM travelers")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // --- Location log ---

    /// Append one location report.
    pub async fn insert_sample(
        &self,
        traveler_id: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<i64, StorageError> {
        let result = sqlx::query(
            "INSERT INTO location_log (traveler_id, latitude, longitude, recorded_at)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(traveler_id)
        .bind(latitude)
        .bind(longitude)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Samples for one traveler since `since`, newest first.
    pub async fn recent_samples(
        &self,
        traveler_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<Sample>, StorageError> {
        let samples = sqlx::query_as::<_, Sample>(
            "SELECT * FROM location_log
             WHERE traveler_id = ?1 AND recorded_at > ?2
             ORDER BY recorded_at DESC",
        )
        .bind(traveler_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        Ok(samples)
    }

    /// All samples since `since` across travelers, newest first per traveler.
    pub async fn samples_since(&self, since: DateTime<Utc>) -> Result<Vec<Sample>, StorageError> {
        let samples = sqlx::query_as::<_, Sample>(
            "SELECT * FROM location_log
             WHERE recorded_at > ?1
             ORDER BY traveler_id, recorded_at DESC",
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        Ok(samples)
    }

    /// Most recent sample per traveler, for travelers that have any.
    pub async fn latest_sample_times(
        &self,
    ) -> Result<Vec<(String, DateTime<Utc>)>, StorageError> {
        let rows = sqlx::query_as::<_, (String, DateTime<Utc>)>(
            "SELECT traveler_id, MAX(recorded_at) FROM location_log GROUP BY traveler_id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn latest_sample(&self, traveler_id: &str) -> Result<Option<Sample>, StorageError> {
        let sample = sqlx::query_as::<_, Sample>(
            "SELECT * FROM location_log
             WHERE traveler_id = ?1
             ORDER BY recorded_at DESC LIMIT 1",
        )
        .bind(traveler_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(sample)
    }

    pub async fn list_samples(&self, limit: i64) -> Result<Vec<Sample>, StorageError> {
        let samples = sqlx::query_as::<_, Sample>(
            "SELECT * FROM location_log ORDER BY recorded_at DESC LIMIT ?1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(samples)
    }

    pub async fn sample_count(&self) -> Result<i64, StorageError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM location_log")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // --- Alert store ---

    /// Insert one alert, returning its id.
    pub async fn insert_alert(&self, alert: &NewAlert) -> Result<i64, StorageError> {
        let result = sqlx::query(
            "INSERT INTO alerts (traveler_id, kind, category, message, latitude, longitude, created_at, resolved)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0)",
        )
        .bind(&alert.traveler_id)
        .bind(&alert.kind)
        .bind(&alert.category)
        .bind(&alert.message)
        .bind(alert.latitude)
        .bind(alert.longitude)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        debug!("inserted {} alert for {}", alert.kind, alert.traveler_id);
        Ok(result.last_insert_rowid())
    }

    /// Insert a batch of alerts in one transaction. Either all land or none.
    pub async fn insert_alerts(&self, alerts: &[NewAlert]) -> Result<Vec<i64>, StorageError> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();
        let mut ids = Vec::with_capacity(alerts.len());
        for alert in alerts {
            let result = sqlx::query(
                "INSERT INTO alerts (traveler_id, kind, category, message, latitude, longitude, created_at, resolved)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0)",
            )
            .bind(&alert.traveler_id)
            .bind(&alert.kind)
            .bind(&alert.category)
            .bind(&alert.message)
            .bind(alert.latitude)
            .bind(alert.longitude)
            .bind(now)
            .execute(&mut *tx)
            .await?;
            ids.push(result.last_insert_rowid());
        }
        tx.commit().await?;
        Ok(ids)
    }

    pub async fn get_alert(&self, id: i64) -> Result<Option<Alert>, StorageError> {
        let alert = sqlx::query_as::<_, Alert>("SELECT * FROM alerts WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(alert)
    }

    /// Unresolved alert with matching traveler and kind, if any.
    pub async fn find_unresolved(
        &self,
        traveler_id: &str,
        kind: &str,
    ) -> Result<Option<Alert>, StorageError> {
        let alert = sqlx::query_as::<_, Alert>(
            "SELECT * FROM alerts
             WHERE traveler_id = ?1 AND kind = ?2 AND resolved = 0
             LIMIT 1",
        )
        .bind(traveler_id)
        .bind(kind)
        .fetch_optional(&self.pool)
        .await?;
        Ok(alert)
    }

    /// Mark an alert resolved. Returns false when the id does not exist.
    pub async fn resolve_alert(&self, id: i64) -> Result<bool, StorageError> {
        let result = sqlx::query("UPDATE alerts SET resolved = 1 WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Unresolved alerts in a retrieval category, newest first.
    pub async fn unresolved_by_category(
        &self,
        category: &str,
        limit: i64,
    ) -> Result<Vec<Alert>, StorageError> {
        let alerts = sqlx::query_as::<_, Alert>(
            "SELECT * FROM alerts
             WHERE category = ?1 AND resolved = 0
             ORDER BY created_at DESC LIMIT ?2",
        )
        .bind(category)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(alerts)
    }

    /// Unresolved alerts addressed to one traveler in a category, newest first.
    pub async fn unresolved_for_traveler(
        &self,
        traveler_id: &str,
        category: &str,
        limit: i64,
    ) -> Result<Vec<Alert>, StorageError> {
        let alerts = sqlx::query_as::<_, Alert>(
            "SELECT * FROM alerts
             WHERE traveler_id = ?1 AND category = ?2 AND resolved = 0
             ORDER BY created_at DESC LIMIT ?3",
        )
        .bind(traveler_id)
        .bind(category)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(alerts)
    }

    /// Unresolved alerts in a category at exactly this position. `IS` keeps
    /// NULL positions comparable, so a position-less incident still links.
    pub async fn unresolved_at_position(
        &self,
        category: &str,
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Result<Vec<Alert>, StorageError> {
        let alerts = sqlx::query_as::<_, Alert>(
            "SELECT * FROM alerts
             WHERE category = ?1 AND resolved = 0
               AND latitude IS ?2 AND longitude IS ?3",
        )
        .bind(category)
        .bind(latitude)
        .bind(longitude)
        .fetch_all(&self.pool)
        .await?;
        Ok(alerts)
    }

    pub async fn unresolved_count(&self) -> Result<i64, StorageError> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM alerts WHERE resolved = 0")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Administrative bulk clear. Returns the number of deleted rows.
    pub async fn clear_alerts(&self) -> Result<u64, StorageError> {
        let result = sqlx::query("DELETE FROM alerts").execute(&self.pool).await?;
        info!("cleared {} alerts", result.rows_affected());
        Ok(result.rows_affected())
    }

    // --- Groups ---

    /// Create a group with the caller as first member. Rejected when the
    /// caller already belongs to a group.
    pub async fn create_group(
        &self,
        name: &str,
        creator_id: &str,
        code: &str,
    ) -> Result<CreateGroup, StorageError> {
        if self.membership_of(creator_id).await?.is_some() {
            return Ok(CreateGroup::AlreadyMember);
        }
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO travel_groups (name, code, created_by, created_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(name)
        .bind(code)
        .bind(creator_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        sqlx::query(
            "INSERT INTO group_members (group_id, traveler_id, joined_at) VALUES (?1, ?2, ?3)",
        )
        .bind(result.last_insert_rowid())
        .bind(creator_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        info!("traveler {} created group {}", creator_id, code);
        Ok(CreateGroup::Created {
            code: code.to_string(),
        })
    }

    /// Join a group by code. Rejected when the traveler already belongs to a
    /// group, so membership stays at most one row per traveler.
    pub async fn join_group(
        &self,
        traveler_id: &str,
        code: &str,
    ) -> Result<JoinGroup, StorageError> {
        let Some(group) = self.find_group_by_code(code).await? else {
            return Ok(JoinGroup::UnknownCode);
        };
        if self.membership_of(traveler_id).await?.is_some() {
            return Ok(JoinGroup::AlreadyMember);
        }
        sqlx::query(
            "INSERT INTO group_members (group_id, traveler_id, joined_at) VALUES (?1, ?2, ?3)",
        )
        .bind(group.id)
        .bind(traveler_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        info!("traveler {} joined group {}", traveler_id, code);
        Ok(JoinGroup::Joined {
            group_name: group.name,
        })
    }

    /// Remove the traveler's membership. Returns false when not in a group.
    pub async fn leave_group(&self, traveler_id: &str) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM group_members WHERE traveler_id = ?1")
            .bind(traveler_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn membership_of(
        &self,
        traveler_id: &str,
    ) -> Result<Option<GroupMember>, StorageError> {
        let member = sqlx::query_as::<_, GroupMember>(
            "SELECT * FROM group_members WHERE traveler_id = ?1 LIMIT 1",
        )
        .bind(traveler_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(member)
    }

    pub async fn group_members(&self, group_id: i64) -> Result<Vec<GroupMember>, StorageError> {
        let members = sqlx::query_as::<_, GroupMember>(
            "SELECT * FROM group_members WHERE group_id = ?1 ORDER BY joined_at",
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(members)
    }

    pub async fn find_group(&self, id: i64) -> Result<Option<Group>, StorageError> {
        let group = sqlx::query_as::<_, Group>("SELECT * FROM travel_groups WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(group)
    }

    pub async fn find_group_by_code(&self, code: &str) -> Result<Option<Group>, StorageError> {
        let group = sqlx::query_as::<_, Group>("SELECT * FROM travel_groups WHERE code = ?1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;
        Ok(group)
    }

    // --- Incidents ---

    pub async fn insert_incident(&self, incident: &NewIncident) -> Result<i64, StorageError> {
        let result = sqlx::query(
            "INSERT INTO incidents (traveler_id, incident_type, description, case_number, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&incident.traveler_id)
        .bind(&incident.incident_type)
        .bind(&incident.description)
        .bind(&incident.case_number)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn list_incidents(&self) -> Result<Vec<Incident>, StorageError> {
        let incidents = sqlx::query_as::<_, Incident>(
            "SELECT * FROM incidents ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(incidents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{CATEGORY_CONSOLE, CATEGORY_SUBJECT};
    use chrono::Duration;

    fn traveler(id: &str) -> NewTraveler {
        NewTraveler {
            traveler_id: id.to_string(),
            name: format!("name-{id}"),
            email: format!("{id}@example.com"),
            phone: "555-0100".to_string(),
        }
    }

    fn alert(traveler_id: &str, kind: &str, position: Option<(f64, f64)>) -> NewAlert {
        NewAlert {
            traveler_id: traveler_id.to_string(),
            kind: kind.to_string(),
            category: CATEGORY_CONSOLE.to_string(),
            message: format!("{kind} for {traveler_id}"),
            latitude: position.map(|p| p.0),
            longitude: position.map(|p| p.1),
        }
    }

    #[tokio::test]
    async fn traveler_roundtrip() {
        let repo = Repository::in_memory().await.unwrap();
        repo.insert_traveler(&traveler("AB12CD34")).await.unwrap();

        let found = repo.find_traveler("AB12CD34").await.unwrap().unwrap();
        assert_eq!(found.name, "name-AB12CD34");
        assert!(repo.find_traveler("MISSING1").await.unwrap().is_none());
        assert_eq!(repo.traveler_ids().await.unwrap(), vec!["AB12CD34"]);
    }

    #[tokio::test]
    async fn recent_samples_newest_first() {
        let repo = Repository::in_memory().await.unwrap();
        for i in 0..3 {
            repo.insert_sample("T1", 10.0 + i as f64, 20.0).await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }

        let since = Utc::now() - Duration::hours(1);
        let samples = repo.recent_samples("T1", since).await.unwrap();
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0].latitude, 12.0);
        assert_eq!(samples[2].latitude, 10.0);
    }

    #[tokio::test]
    async fn latest_sample_times_aggregates_per_traveler() {
        let repo = Repository::in_memory().await.unwrap();
        repo.insert_sample("T1", 1.0, 1.0).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        repo.insert_sample("T1", 2.0, 2.0).await.unwrap();
        repo.insert_sample("T2", 3.0, 3.0).await.unwrap();

        let mut times = repo.latest_sample_times().await.unwrap();
        times.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(times.len(), 2);
        assert_eq!(times[0].0, "T1");
        let t1_latest = repo.latest_sample("T1").await.unwrap().unwrap();
        assert_eq!(t1_latest.latitude, 2.0);
    }

    #[tokio::test]
    async fn find_unresolved_sees_only_open_alerts() {
        let repo = Repository::in_memory().await.unwrap();
        let id = repo.insert_alert(&alert("T1", "inactivity", None)).await.unwrap();

        assert!(repo.find_unresolved("T1", "inactivity").await.unwrap().is_some());
        assert!(repo.find_unresolved("T1", "deviation").await.unwrap().is_none());
        assert!(repo.find_unresolved("T2", "inactivity").await.unwrap().is_none());

        assert!(repo.resolve_alert(id).await.unwrap());
        assert!(repo.find_unresolved("T1", "inactivity").await.unwrap().is_none());
        assert!(!repo.resolve_alert(9999).await.unwrap());
    }

    #[tokio::test]
    async fn bulk_insert_is_atomic_batch() {
        let repo = Repository::in_memory().await.unwrap();
        let batch = vec![
            alert("T1", "panic", Some((1.0, 2.0))),
            alert("T2", "peer_notification", Some((1.0, 2.0))),
        ];
        let ids = repo.insert_alerts(&batch).await.unwrap();
        assert_eq!(ids.len(), 2);
        assert!(ids[1] > ids[0]);
        assert_eq!(repo.unresolved_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn position_match_treats_null_as_equal() {
        let repo = Repository::in_memory().await.unwrap();
        let mut positioned = alert("T1", "peer_notification", Some((12.5, 77.5)));
        positioned.category = CATEGORY_SUBJECT.to_string();
        let mut unpositioned = alert("T1", "self_confirmation", None);
        unpositioned.category = CATEGORY_SUBJECT.to_string();
        repo.insert_alert(&positioned).await.unwrap();
        repo.insert_alert(&unpositioned).await.unwrap();

        let at = repo
            .unresolved_at_position(CATEGORY_SUBJECT, Some(12.5), Some(77.5))
            .await
            .unwrap();
        assert_eq!(at.len(), 1);
        assert_eq!(at[0].kind, "peer_notification");

        let at_null = repo
            .unresolved_at_position(CATEGORY_SUBJECT, None, None)
            .await
            .unwrap();
        assert_eq!(at_null.len(), 1);
        assert_eq!(at_null[0].kind, "self_confirmation");
    }

    #[tokio::test]
    async fn subject_poll_filters_category_and_limits() {
        let repo = Repository::in_memory().await.unwrap();
        for i in 0..4 {
            let mut a = alert("T1", "peer_notification", None);
            a.category = CATEGORY_SUBJECT.to_string();
            a.message = format!("alert {i}");
            repo.insert_alert(&a).await.unwrap();
        }
        repo.insert_alert(&alert("T1", "panic", None)).await.unwrap();

        let alerts = repo
            .unresolved_for_traveler("T1", CATEGORY_SUBJECT, 2)
            .await
            .unwrap();
        assert_eq!(alerts.len(), 2);
        assert!(alerts.iter().all(|a| a.category == CATEGORY_SUBJECT));
    }

    #[tokio::test]
    async fn group_membership_is_single() {
        let repo = Repository::in_memory().await.unwrap();

        let created = repo.create_group("trek", "T1", "ABC123").await.unwrap();
        assert_eq!(
            created,
            CreateGroup::Created {
                code: "ABC123".to_string()
            }
        );

        // creator cannot create or join a second group
        assert_eq!(
            repo.create_group("other", "T1", "XYZ789").await.unwrap(),
            CreateGroup::AlreadyMember
        );
        assert_eq!(
            repo.join_group("T1", "ABC123").await.unwrap(),
            JoinGroup::AlreadyMember
        );

        assert_eq!(
            repo.join_group("T2", "NOPE00").await.unwrap(),
            JoinGroup::UnknownCode
        );
        assert_eq!(
            repo.join_group("T2", "ABC123").await.unwrap(),
            JoinGroup::Joined {
                group_name: "trek".to_string()
            }
        );

        let membership = repo.membership_of("T2").await.unwrap().unwrap();
        let members = repo.group_members(membership.group_id).await.unwrap();
        assert_eq!(members.len(), 2);

        assert!(repo.leave_group("T2").await.unwrap());
        assert!(!repo.leave_group("T2").await.unwrap());
        assert!(repo.membership_of("T2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn clear_alerts_empties_store() {
        let repo = Repository::in_memory().await.unwrap();
        repo.insert_alert(&alert("T1", "panic", None)).await.unwrap();
        repo.insert_alert(&alert("T2", "deviation", None)).await.unwrap();

        assert_eq!(repo.clear_alerts().await.unwrap(), 2);
        assert_eq!(repo.unresolved_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn incident_filing_roundtrip() {
        let repo = Repository::in_memory().await.unwrap();
        repo.insert_incident(&NewIncident {
            traveler_id: "T1".to_string(),
            incident_type: "theft".to_string(),
            description: "bag stolen".to_string(),
            case_number: "INC123456".to_string(),
        })
        .await
        .unwrap();

        let incidents = repo.list_incidents().await.unwrap();
        assert_eq!(incidents.len(), 1);
        assert_eq!(incidents[0].case_number, "INC123456");
    }
}

//! Persisted record types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Retrieval category for alerts surfaced on the monitoring console.
pub const CATEGORY_CONSOLE: &str = "console";

/// Retrieval category for alerts delivered back to travelers (confirmations
/// and peer notifications). Pollers filter on this column, so the two values
/// are a stable enumeration.
pub const CATEGORY_SUBJECT: &str = "subject";

/// Registered traveler
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Traveler {
    pub id: i64,
    pub traveler_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
}

/// Traveler registration input
#[derive(Debug, Clone)]
pub struct NewTraveler {
    pub traveler_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// One location report. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Sample {
    pub id: i64,
    pub traveler_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub recorded_at: DateTime<Utc>,
}

/// Alert record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Alert {
    pub id: i64,
    pub traveler_id: String,
    pub kind: String,
    pub category: String,
    pub message: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub resolved: bool,
}

/// Alert insertion input
#[derive(Debug, Clone)]
pub struct NewAlert {
    pub traveler_id: String,
    pub kind: String,
    pub category: String,
    pub message: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Peer group
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Group {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

/// Group membership row. At most one per traveler.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct GroupMember {
    pub id: i64,
    pub group_id: i64,
    pub traveler_id: String,
    pub joined_at: DateTime<Utc>,
}

/// Incident case file
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Incident {
    pub id: i64,
    pub traveler_id: String,
    pub incident_type: String,
    pub description: String,
    pub case_number: String,
    pub created_at: DateTime<Utc>,
}

/// Incident filing input
#[derive(Debug, Clone)]
pub struct NewIncident {
    pub traveler_id: String,
    pub incident_type: String,
    pub description: String,
    pub case_number: String,
}

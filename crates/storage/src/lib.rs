//! Storage Layer
//!
//! SQLite persistence for the safety-monitor pipeline: traveler registry,
//! location log, alert store, group membership, and incident case files.

mod records;
mod repository;

pub use records::{
    Alert, Group, GroupMember, Incident, NewAlert, NewIncident, NewTraveler, Sample, Traveler,
    CATEGORY_CONSOLE, CATEGORY_SUBJECT,
};
pub use repository::{CreateGroup, JoinGroup, Repository};

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("record not found")]
    NotFound,
}

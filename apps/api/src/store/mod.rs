//! Storage adapters.
//!
//! The rest of the crate only sees the traits below; `main` wires in the
//! PostgreSQL adapter and the tests wire in the in-memory one.

#[cfg(test)]
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::models::application::Application;
use crate::models::job::Job;
use crate::models::profile::{CandidateProfile, EmployerProfile};
use crate::models::user::{NewUser, Role, User};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate record: {0}")]
    Conflict(String),

    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("malformed row: {0}")]
    Corrupt(String),

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                return StoreError::Conflict(db.message().to_string());
            }
        }
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(err.to_string())
            }
            other => StoreError::Database(other),
        }
    }
}

/// User records and credential lookup.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;

    /// Looks a user up by email, optionally restricted to one role.
    async fn find_by_email(&self, email: &str, role: Option<Role>)
        -> Result<Option<User>, StoreError>;
}

/// Role-specific profiles created alongside user records.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn create_candidate(&self, profile: &CandidateProfile) -> Result<(), StoreError>;
    async fn create_employer(&self, profile: &EmployerProfile) -> Result<(), StoreError>;
    async fn list_candidates(&self) -> Result<Vec<CandidateProfile>, StoreError>;
    async fn find_candidate(&self, email: &str) -> Result<Option<CandidateProfile>, StoreError>;
    /// Overwrites the stored profile with the same `user_id`.
    async fn save_candidate(&self, profile: &CandidateProfile) -> Result<(), StoreError>;
}

#[async_trait]
pub trait JobCatalog: Send + Sync {
    async fn create_job(&self, posting: Map<String, Value>) -> Result<Job, StoreError>;
    async fn list_jobs(&self) -> Result<Vec<Job>, StoreError>;
}

/// Result of asking the backend to move an application into the archive itself.
#[derive(Debug)]
pub enum ArchiveMove {
    /// The row left the active set and landed in the archive in one atomic step.
    Moved(Application),
    /// No active row with that id.
    Missing,
    /// The backend has no atomic move; the caller must do it step by step.
    Unsupported,
}

/// Active applications plus the archive of rejected ones. The two sets are
/// disjoint; keeping them that way is the ledger's job.
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    async fn insert_active(&self, application: &Application) -> Result<(), StoreError>;

    /// Active applications in insertion order.
    async fn list_active(&self) -> Result<Vec<Application>, StoreError>;

    async fn list_active_for_candidate(
        &self,
        candidate_id: Uuid,
    ) -> Result<Vec<Application>, StoreError>;

    async fn fetch_active(&self, id: Uuid) -> Result<Option<Application>, StoreError>;

    /// Replaces the active row with the same id. Returns `false` if there is none.
    async fn update_active(&self, application: &Application) -> Result<bool, StoreError>;

    /// Returns `false` if no active row had that id.
    async fn delete_active(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Fails with `StoreError::Conflict` if the id is already archived.
    async fn insert_archived(&self, application: &Application) -> Result<(), StoreError>;

    async fn list_archived(&self) -> Result<Vec<Application>, StoreError>;

    async fn move_to_archive(&self, _id: Uuid) -> Result<ArchiveMove, StoreError> {
        Ok(ArchiveMove::Unsupported)
    }
}

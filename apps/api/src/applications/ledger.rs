use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::models::application::{Application, ApplicationStatus};
use crate::models::user::Role;
use crate::store::{ApplicationStore, ArchiveMove, IdentityStore, StoreError};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("{0}")]
    Validation(String),

    #[error("Candidate {0} does not exist")]
    CandidateNotFound(String),

    #[error("Application {0} not found")]
    ApplicationNotFound(Uuid),

    #[error(transparent)]
    Storage(#[from] StoreError),

    /// The archive copy was written but the active row could not be removed.
    /// The application is visible in both sets until `reconcile` runs.
    #[error("Application {id} was archived but is still active: {source}")]
    PartialMove { id: Uuid, source: StoreError },
}

/// Incoming application. Every field is optional on the wire so a missing one
/// is reported as a validation error rather than a body rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationSubmission {
    #[serde(alias = "candidate_email")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "job_id_from_number_or_text")]
    pub job_id: Option<i64>,
    pub cover_letter: Option<String>,
}

/// Owns the active set and the archive of rejected applications.
///
/// Invariant: after every successful operation an application id is in
/// exactly one of the two. The only way to break it is a failed delete in the
/// middle of a stepwise reject, which surfaces as `LedgerError::PartialMove`.
#[derive(Clone)]
pub struct ApplicationLedger {
    applications: Arc<dyn ApplicationStore>,
    identity: Arc<dyn IdentityStore>,
}

impl ApplicationLedger {
    pub fn new(
        applications: Arc<dyn ApplicationStore>,
        identity: Arc<dyn IdentityStore>,
    ) -> Self {
        Self {
            applications,
            identity,
        }
    }

    pub async fn submit(
        &self,
        submission: ApplicationSubmission,
    ) -> Result<Application, LedgerError> {
        let email = required_text(submission.email.as_deref(), "email")?.trim();
        let job_id = submission
            .job_id
            .filter(|id| *id > 0)
            .ok_or_else(|| LedgerError::Validation("job_id is required".to_string()))?;
        let cover_letter = required_text(submission.cover_letter.as_deref(), "cover_letter")?;

        let candidate = self
            .identity
            .find_by_email(email, Some(Role::Candidate))
            .await?
            .ok_or_else(|| LedgerError::CandidateNotFound(email.to_string()))?;

        let now = storage_now();
        let application = Application {
            id: Uuid::new_v4(),
            candidate_id: candidate.id,
            job_id,
            cover_letter: cover_letter.to_string(),
            status: ApplicationStatus::Applied,
            created_at: now,
            updated_at: now,
        };
        self.applications.insert_active(&application).await?;

        info!(
            "Application {} submitted by candidate {} for job {job_id}",
            application.id, candidate.id
        );
        Ok(application)
    }

    pub async fn list_active(&self) -> Result<Vec<Application>, LedgerError> {
        let mut applications = self.applications.list_active().await?;
        applications.retain(|a| a.status != ApplicationStatus::Rejected);
        Ok(applications)
    }

    /// Active applications of one candidate. An unknown email is an empty
    /// result, not an error.
    pub async fn list_for_candidate(&self, email: &str) -> Result<Vec<Application>, LedgerError> {
        let Some(candidate) = self
            .identity
            .find_by_email(email.trim(), Some(Role::Candidate))
            .await?
        else {
            return Ok(Vec::new());
        };
        Ok(self
            .applications
            .list_active_for_candidate(candidate.id)
            .await?)
    }

    pub async fn list_rejected(&self) -> Result<Vec<Application>, LedgerError> {
        Ok(self.applications.list_archived().await?)
    }

    pub async fn approve(&self, id: Uuid) -> Result<Application, LedgerError> {
        let mut application = self
            .applications
            .fetch_active(id)
            .await?
            .ok_or(LedgerError::ApplicationNotFound(id))?;

        application.status = ApplicationStatus::Approved;
        application.updated_at = storage_now();

        if !self.applications.update_active(&application).await? {
            // Moved to the archive between the read and the write.
            return Err(LedgerError::ApplicationNotFound(id));
        }

        info!("Application {id} approved");
        Ok(application)
    }

    /// Moves an active application into the archive with status Rejected.
    pub async fn reject(&self, id: Uuid) -> Result<Application, LedgerError> {
        match self.applications.move_to_archive(id).await? {
            ArchiveMove::Moved(application) => {
                info!("Application {id} rejected and archived");
                Ok(application)
            }
            ArchiveMove::Missing => Err(LedgerError::ApplicationNotFound(id)),
            ArchiveMove::Unsupported => self.reject_stepwise(id).await,
        }
    }

    /// Read, copy into the archive, then delete from the active set. The
    /// archive's unique id makes the copy a compare-and-swap: of two
    /// concurrent rejects only one gets past it.
    async fn reject_stepwise(&self, id: Uuid) -> Result<Application, LedgerError> {
        let active = self
            .applications
            .fetch_active(id)
            .await?
            .ok_or(LedgerError::ApplicationNotFound(id))?;

        let archived = active.into_rejected();
        match self.applications.insert_archived(&archived).await {
            Ok(()) => {}
            Err(StoreError::Conflict(reason)) => {
                warn!("Application {id} is already archived ({reason}); treating as not found");
                return Err(LedgerError::ApplicationNotFound(id));
            }
            Err(e) => return Err(e.into()),
        }

        if let Err(source) = self.applications.delete_active(id).await {
            error!("Application {id} archived but still active, reconcile required: {source}");
            return Err(LedgerError::PartialMove { id, source });
        }

        info!("Application {id} rejected and archived");
        Ok(archived)
    }

    /// Repair pass for partial moves: any archived id still present in the
    /// active set is removed from it. Returns the ids that were repaired.
    pub async fn reconcile(&self) -> Result<Vec<Uuid>, LedgerError> {
        let mut repaired = Vec::new();
        for archived in self.applications.list_archived().await? {
            if self.applications.delete_active(archived.id).await? {
                warn!("Reconciled application {}: removed stale active copy", archived.id);
                repaired.push(archived.id);
            }
        }
        info!("Reconcile pass repaired {} application(s)", repaired.len());
        Ok(repaired)
    }
}

/// Current time at the microsecond precision Postgres `TIMESTAMPTZ` keeps, so
/// what a transition returns is exactly what later reads return.
fn storage_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Form-driven clients send `"7"` as often as `7`; both name job 7.
fn job_id_from_number_or_text<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawJobId {
        Number(i64),
        Text(String),
    }

    match Option::<RawJobId>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawJobId::Number(id)) => Ok(Some(id)),
        Some(RawJobId::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(RawJobId::Text(text)) => text
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("job_id '{text}' is not an integer"))),
    }
}

fn required_text<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, LedgerError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(LedgerError::Validation(format!("{field} is required"))),
    }
}

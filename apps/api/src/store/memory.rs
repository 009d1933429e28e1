//! In-memory store for tests. Archive writes and active deletes can be made
//! to fail on demand to drive the ledger through its partial-failure paths.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::models::application::Application;
use crate::models::job::Job;
use crate::models::profile::{CandidateProfile, EmployerProfile};
use crate::models::user::{NewUser, Role, User};
use crate::store::{ApplicationStore, IdentityStore, JobCatalog, ProfileStore, StoreError};

#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<Vec<User>>,
    candidates: Mutex<Vec<CandidateProfile>>,
    employers: Mutex<Vec<EmployerProfile>>,
    jobs: Mutex<Vec<Job>>,
    active: Mutex<Vec<Application>>,
    archive: Mutex<Vec<Application>>,
    fail_archive_writes: AtomicBool,
    fail_active_deletes: AtomicBool,
}

impl MemoryStore {
    /// Registers a user directly, bypassing password hashing.
    pub fn seed_user(&self, email: &str, role: Role) -> User {
        let user = User {
            id: Uuid::new_v4(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            email: email.to_string(),
            role,
            password_hash: String::new(),
            created_at: Utc::now(),
        };
        self.users.lock().unwrap().push(user.clone());
        user
    }

    pub fn fail_archive_writes(&self, fail: bool) {
        self.fail_archive_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_active_deletes(&self, fail: bool) {
        self.fail_active_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn active_ids(&self) -> Vec<Uuid> {
        self.active.lock().unwrap().iter().map(|a| a.id).collect()
    }

    pub fn archived_ids(&self) -> Vec<Uuid> {
        self.archive.lock().unwrap().iter().map(|a| a.id).collect()
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict(format!("email {} exists", user.email)));
        }
        let created = User {
            id: Uuid::new_v4(),
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            role: user.role,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        users.push(created.clone());
        Ok(created)
    }

    async fn find_by_email(
        &self,
        email: &str,
        role: Option<Role>,
    ) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email && role.map_or(true, |r| u.role == r))
            .cloned())
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn create_candidate(&self, profile: &CandidateProfile) -> Result<(), StoreError> {
        self.candidates.lock().unwrap().push(profile.clone());
        Ok(())
    }

    async fn create_employer(&self, profile: &EmployerProfile) -> Result<(), StoreError> {
        self.employers.lock().unwrap().push(profile.clone());
        Ok(())
    }

    async fn list_candidates(&self) -> Result<Vec<CandidateProfile>, StoreError> {
        Ok(self.candidates.lock().unwrap().clone())
    }

    async fn find_candidate(&self, email: &str) -> Result<Option<CandidateProfile>, StoreError> {
        Ok(self
            .candidates
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.email == email)
            .cloned())
    }

    async fn save_candidate(&self, profile: &CandidateProfile) -> Result<(), StoreError> {
        let mut candidates = self.candidates.lock().unwrap();
        if let Some(existing) = candidates.iter_mut().find(|c| c.user_id == profile.user_id) {
            *existing = profile.clone();
        }
        Ok(())
    }
}

#[async_trait]
impl JobCatalog for MemoryStore {
    async fn create_job(&self, posting: Map<String, Value>) -> Result<Job, StoreError> {
        let mut jobs = self.jobs.lock().unwrap();
        let job = Job {
            id: jobs.len() as i64 + 1,
            created_at: Utc::now(),
            posting,
        };
        jobs.push(job.clone());
        Ok(job)
    }

    async fn list_jobs(&self) -> Result<Vec<Job>, StoreError> {
        Ok(self.jobs.lock().unwrap().clone())
    }
}

#[async_trait]
impl ApplicationStore for MemoryStore {
    async fn insert_active(&self, application: &Application) -> Result<(), StoreError> {
        let mut active = self.active.lock().unwrap();
        if active.iter().any(|a| a.id == application.id) {
            return Err(StoreError::Conflict(format!("application {}", application.id)));
        }
        active.push(application.clone());
        Ok(())
    }

    async fn list_active(&self) -> Result<Vec<Application>, StoreError> {
        Ok(self.active.lock().unwrap().clone())
    }

    async fn list_active_for_candidate(
        &self,
        candidate_id: Uuid,
    ) -> Result<Vec<Application>, StoreError> {
        Ok(self
            .active
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.candidate_id == candidate_id)
            .cloned()
            .collect())
    }

    async fn fetch_active(&self, id: Uuid) -> Result<Option<Application>, StoreError> {
        Ok(self
            .active
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    async fn update_active(&self, application: &Application) -> Result<bool, StoreError> {
        let mut active = self.active.lock().unwrap();
        match active.iter_mut().find(|a| a.id == application.id) {
            Some(existing) => {
                *existing = application.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_active(&self, id: Uuid) -> Result<bool, StoreError> {
        if self.fail_active_deletes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("active set is read-only".to_string()));
        }
        let mut active = self.active.lock().unwrap();
        let before = active.len();
        active.retain(|a| a.id != id);
        Ok(active.len() < before)
    }

    async fn insert_archived(&self, application: &Application) -> Result<(), StoreError> {
        if self.fail_archive_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("archive is read-only".to_string()));
        }
        let mut archive = self.archive.lock().unwrap();
        if archive.iter().any(|a| a.id == application.id) {
            return Err(StoreError::Conflict(format!(
                "application {} already archived",
                application.id
            )));
        }
        archive.push(application.clone());
        Ok(())
    }

    async fn list_archived(&self) -> Result<Vec<Application>, StoreError> {
        Ok(self.archive.lock().unwrap().clone())
    }
}

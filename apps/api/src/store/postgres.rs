use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::{FromRow, PgPool};
use tracing::debug;
use uuid::Uuid;

use crate::models::application::{Application, ApplicationStatus};
use crate::models::job::Job;
use crate::models::profile::{CandidateProfile, EmployerProfile};
use crate::models::user::{NewUser, Role, User};
use crate::store::{
    ApplicationStore, ArchiveMove, IdentityStore, JobCatalog, ProfileStore, StoreError,
};

const APPLICATION_COLUMNS: &str =
    "id, candidate_id, job_id, cover_letter, status, created_at, updated_at";

/// PostgreSQL-backed implementation of every store trait.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
    role: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            role: row
                .role
                .parse::<Role>()
                .map_err(|e| StoreError::Corrupt(e.to_string()))?,
            password_hash: row.password_hash,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct ApplicationRow {
    id: Uuid,
    candidate_id: Uuid,
    job_id: i64,
    cover_letter: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ApplicationRow> for Application {
    type Error = StoreError;

    fn try_from(row: ApplicationRow) -> Result<Self, Self::Error> {
        Ok(Application {
            id: row.id,
            candidate_id: row.candidate_id,
            job_id: row.job_id,
            cover_letter: row.cover_letter,
            status: row
                .status
                .parse::<ApplicationStatus>()
                .map_err(|e| StoreError::Corrupt(e.to_string()))?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct JobRow {
    id: i64,
    posting: Value,
    created_at: DateTime<Utc>,
}

impl TryFrom<JobRow> for Job {
    type Error = StoreError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        match row.posting {
            Value::Object(posting) => Ok(Job {
                id: row.id,
                created_at: row.created_at,
                posting,
            }),
            other => Err(StoreError::Corrupt(format!(
                "job {} posting is not an object: {other}",
                row.id
            ))),
        }
    }
}

#[derive(Debug, FromRow)]
struct CandidateRow {
    user_id: Uuid,
    name: String,
    email: String,
    skills: Option<String>,
    experience: Option<String>,
    education: Option<String>,
    portfolio: Option<String>,
    applied_jobs: Option<String>,
}

impl From<CandidateRow> for CandidateProfile {
    fn from(row: CandidateRow) -> Self {
        CandidateProfile {
            user_id: row.user_id,
            name: row.name,
            email: row.email,
            skills: row.skills,
            experience: row.experience,
            education: row.education,
            portfolio: row.portfolio,
            applied_jobs: row.applied_jobs,
        }
    }
}

fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, StoreError>
where
    T: TryFrom<R, Error = StoreError>,
{
    rows.into_iter().map(T::try_from).collect()
}

#[async_trait]
impl IdentityStore for PgStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let row: UserRow = sqlx::query_as(
            r#"
            INSERT INTO users (id, first_name, last_name, email, role, password_hash)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, first_name, last_name, email, role, password_hash, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(user.role.as_str())
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn find_by_email(
        &self,
        email: &str,
        role: Option<Role>,
    ) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, first_name, last_name, email, role, password_hash, created_at
            FROM users
            WHERE email = $1 AND ($2::text IS NULL OR role = $2)
            LIMIT 1
            "#,
        )
        .bind(email)
        .bind(role.map(|r| r.as_str()))
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }
}

#[async_trait]
impl ProfileStore for PgStore {
    async fn create_candidate(&self, profile: &CandidateProfile) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO candidates
                (user_id, name, email, skills, experience, education, portfolio, applied_jobs)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(profile.user_id)
        .bind(&profile.name)
        .bind(&profile.email)
        .bind(&profile.skills)
        .bind(&profile.experience)
        .bind(&profile.education)
        .bind(&profile.portfolio)
        .bind(&profile.applied_jobs)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn create_employer(&self, profile: &EmployerProfile) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO employers (user_id, company_name, industry, job_openings) VALUES ($1, $2, $3, $4)",
        )
        .bind(profile.user_id)
        .bind(&profile.company_name)
        .bind(&profile.industry)
        .bind(&profile.job_openings)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_candidates(&self) -> Result<Vec<CandidateProfile>, StoreError> {
        let rows: Vec<CandidateRow> =
            sqlx::query_as("SELECT * FROM candidates ORDER BY name ASC")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(CandidateProfile::from).collect())
    }

    async fn find_candidate(&self, email: &str) -> Result<Option<CandidateProfile>, StoreError> {
        let row: Option<CandidateRow> = sqlx::query_as("SELECT * FROM candidates WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(CandidateProfile::from))
    }

    async fn save_candidate(&self, profile: &CandidateProfile) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE candidates
            SET name = $2, email = $3, skills = $4, experience = $5,
                education = $6, portfolio = $7, applied_jobs = $8
            WHERE user_id = $1
            "#,
        )
        .bind(profile.user_id)
        .bind(&profile.name)
        .bind(&profile.email)
        .bind(&profile.skills)
        .bind(&profile.experience)
        .bind(&profile.education)
        .bind(&profile.portfolio)
        .bind(&profile.applied_jobs)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl JobCatalog for PgStore {
    async fn create_job(&self, posting: Map<String, Value>) -> Result<Job, StoreError> {
        let row: JobRow = sqlx::query_as(
            "INSERT INTO jobs (posting) VALUES ($1) RETURNING id, posting, created_at",
        )
        .bind(Value::Object(posting))
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }

    async fn list_jobs(&self) -> Result<Vec<Job>, StoreError> {
        let rows: Vec<JobRow> =
            sqlx::query_as("SELECT id, posting, created_at FROM jobs ORDER BY id ASC")
                .fetch_all(&self.pool)
                .await?;
        convert_all(rows)
    }
}

#[async_trait]
impl ApplicationStore for PgStore {
    async fn insert_active(&self, application: &Application) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO applications
                (id, candidate_id, job_id, cover_letter, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(application.id)
        .bind(application.candidate_id)
        .bind(application.job_id)
        .bind(&application.cover_letter)
        .bind(application.status.as_str())
        .bind(application.created_at)
        .bind(application.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_active(&self) -> Result<Vec<Application>, StoreError> {
        let rows: Vec<ApplicationRow> = sqlx::query_as(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications WHERE status <> 'Rejected' ORDER BY seq ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    async fn list_active_for_candidate(
        &self,
        candidate_id: Uuid,
    ) -> Result<Vec<Application>, StoreError> {
        let rows: Vec<ApplicationRow> = sqlx::query_as(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications WHERE candidate_id = $1 ORDER BY seq ASC"
        ))
        .bind(candidate_id)
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    async fn fetch_active(&self, id: Uuid) -> Result<Option<Application>, StoreError> {
        let row: Option<ApplicationRow> = sqlx::query_as(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Application::try_from).transpose()
    }

    async fn update_active(&self, application: &Application) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE applications
            SET candidate_id = $2, job_id = $3, cover_letter = $4, status = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(application.id)
        .bind(application.candidate_id)
        .bind(application.job_id)
        .bind(&application.cover_letter)
        .bind(application.status.as_str())
        .bind(application.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_active(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM applications WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_archived(&self, application: &Application) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO rejected_applications
                (id, candidate_id, job_id, cover_letter, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(application.id)
        .bind(application.candidate_id)
        .bind(application.job_id)
        .bind(&application.cover_letter)
        .bind(application.status.as_str())
        .bind(application.created_at)
        .bind(application.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_archived(&self) -> Result<Vec<Application>, StoreError> {
        let rows: Vec<ApplicationRow> = sqlx::query_as(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM rejected_applications ORDER BY seq ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    /// Delete and archive in one statement: the row lock taken by the DELETE
    /// serializes concurrent rejects, and the loser sees no row.
    async fn move_to_archive(&self, id: Uuid) -> Result<ArchiveMove, StoreError> {
        let row: Option<ApplicationRow> = sqlx::query_as(
            r#"
            WITH moved AS (
                DELETE FROM applications
                WHERE id = $1
                RETURNING id, candidate_id, job_id, cover_letter, created_at, updated_at
            )
            INSERT INTO rejected_applications
                (id, candidate_id, job_id, cover_letter, status, created_at, updated_at)
            SELECT id, candidate_id, job_id, cover_letter, 'Rejected', created_at, updated_at
            FROM moved
            RETURNING id, candidate_id, job_id, cover_letter, status, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        debug!("Atomic archive move for application {id}: found={}", row.is_some());
        match row {
            Some(row) => Ok(ArchiveMove::Moved(row.try_into()?)),
            None => Ok(ArchiveMove::Missing),
        }
    }
}

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::identity::password::{hash_password, verify_password};
use crate::models::profile::{CandidateProfile, CandidateUpdate, EmployerProfile};
use crate::models::user::{NewUser, Role};
use crate::store::{IdentityStore, ProfileStore};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateRegistration {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub skills: Option<String>,
    pub experience: Option<String>,
    pub education: Option<String>,
    pub portfolio: Option<String>,
    pub applied_jobs: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployerRegistration {
    pub company_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub industry: Option<String>,
    pub job_openings: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub role: Role,
    pub user_id: Uuid,
}

fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str, AppError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation(format!("{field} is required")))
}

/// "Ada King Lovelace" -> ("Ada", "King Lovelace").
pub fn split_name(name: &str) -> (String, String) {
    let mut words = name.split_whitespace();
    let first = words.next().unwrap_or_default().to_string();
    let rest = words.collect::<Vec<_>>().join(" ");
    (first, rest)
}

pub async fn register_candidate(
    users: &dyn IdentityStore,
    profiles: &dyn ProfileStore,
    req: CandidateRegistration,
) -> Result<CandidateProfile, AppError> {
    let email = required(&req.email, "email")?.to_string();
    let password = required(&req.password, "password")?;
    let name = req.name.as_deref().map(str::trim).unwrap_or_default().to_string();
    let (first_name, last_name) = split_name(&name);

    let user = users
        .create_user(NewUser {
            first_name,
            last_name,
            email: email.clone(),
            role: Role::Candidate,
            password_hash: hash_password(password)?,
        })
        .await?;

    let profile = CandidateProfile {
        user_id: user.id,
        name,
        email,
        skills: req.skills,
        experience: req.experience,
        education: req.education,
        portfolio: req.portfolio,
        applied_jobs: req.applied_jobs,
    };
    profiles.create_candidate(&profile).await?;

    info!("Registered candidate {} ({})", profile.email, user.id);
    Ok(profile)
}

pub async fn register_employer(
    users: &dyn IdentityStore,
    profiles: &dyn ProfileStore,
    req: EmployerRegistration,
) -> Result<EmployerProfile, AppError> {
    let company_name = required(&req.company_name, "companyName")?.to_string();
    let email = required(&req.email, "email")?.to_string();
    let password = required(&req.password, "password")?;

    let user = users
        .create_user(NewUser {
            first_name: company_name.clone(),
            last_name: String::new(),
            email,
            role: Role::Employer,
            password_hash: hash_password(password)?,
        })
        .await?;

    let profile = EmployerProfile {
        user_id: user.id,
        company_name,
        industry: req.industry,
        job_openings: req.job_openings,
    };
    profiles.create_employer(&profile).await?;

    info!("Registered employer {} ({})", profile.company_name, user.id);
    Ok(profile)
}

/// Unknown email and wrong password are indistinguishable to the caller.
pub async fn login(users: &dyn IdentityStore, req: LoginRequest) -> Result<LoginResponse, AppError> {
    let email = required(&req.email, "email")?;
    let password = required(&req.password, "password")?;

    let Some(user) = users.find_by_email(email, None).await? else {
        warn!("Login attempt for unknown email {email}");
        return Err(AppError::Unauthorized);
    };
    if !verify_password(password, &user.password_hash)? {
        warn!("Failed login for user {}", user.id);
        return Err(AppError::Unauthorized);
    }

    info!("User {} logged in as {}", user.id, user.role);
    Ok(LoginResponse {
        success: true,
        role: user.role,
        user_id: user.id,
    })
}

/// Creates the configured admin account unless that email is already taken.
pub async fn ensure_admin(
    users: &dyn IdentityStore,
    email: &str,
    password: &str,
) -> Result<(), AppError> {
    if let Some(existing) = users.find_by_email(email, None).await? {
        if existing.role != Role::Admin {
            warn!("Bootstrap admin email {email} belongs to a {} account", existing.role);
        }
        return Ok(());
    }

    let admin = users
        .create_user(NewUser {
            first_name: "Admin".to_string(),
            last_name: String::new(),
            email: email.to_string(),
            role: Role::Admin,
            password_hash: hash_password(password)?,
        })
        .await?;
    info!("Bootstrapped admin account {}", admin.id);
    Ok(())
}

pub async fn update_candidate(
    profiles: &dyn ProfileStore,
    email: &str,
    update: CandidateUpdate,
) -> Result<CandidateProfile, AppError> {
    let mut profile = profiles
        .find_candidate(email)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Candidate {email} not found")))?;
    profile.apply(update);
    profiles.save_candidate(&profile).await?;
    Ok(profile)
}

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::errors::{ApiJson, AppError};
use crate::identity::accounts::{
    self, CandidateRegistration, EmployerRegistration, LoginRequest, LoginResponse,
};
use crate::models::profile::{CandidateProfile, CandidateUpdate, EmployerProfile};
use crate::state::AppState;

#[derive(Serialize)]
pub struct RegistrationResponse<T> {
    pub message: &'static str,
    pub data: T,
}

/// POST /register/candidate
pub async fn handle_register_candidate(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CandidateRegistration>,
) -> Result<(StatusCode, Json<RegistrationResponse<CandidateProfile>>), AppError> {
    let profile =
        accounts::register_candidate(state.users.as_ref(), state.profiles.as_ref(), req).await?;
    Ok((
        StatusCode::CREATED,
        Json(RegistrationResponse {
            message: "Candidate registered successfully",
            data: profile,
        }),
    ))
}

/// POST /register/employer
pub async fn handle_register_employer(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<EmployerRegistration>,
) -> Result<(StatusCode, Json<RegistrationResponse<EmployerProfile>>), AppError> {
    let profile =
        accounts::register_employer(state.users.as_ref(), state.profiles.as_ref(), req).await?;
    Ok((
        StatusCode::CREATED,
        Json(RegistrationResponse {
            message: "Employer registered successfully",
            data: profile,
        }),
    ))
}

/// POST /api/login
pub async fn handle_login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    Ok(Json(accounts::login(state.users.as_ref(), req).await?))
}

/// GET /candidates
pub async fn handle_list_candidates(
    State(state): State<AppState>,
) -> Result<Json<Vec<CandidateProfile>>, AppError> {
    Ok(Json(state.profiles.list_candidates().await?))
}

/// GET /candidates/:email
pub async fn handle_get_candidate(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<CandidateProfile>, AppError> {
    let profile = state
        .profiles
        .find_candidate(&email)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Candidate {email} not found")))?;
    Ok(Json(profile))
}

/// PUT /candidates/:email
pub async fn handle_update_candidate(
    State(state): State<AppState>,
    Path(email): Path<String>,
    ApiJson(update): ApiJson<CandidateUpdate>,
) -> Result<Json<CandidateProfile>, AppError> {
    Ok(Json(
        accounts::update_candidate(state.profiles.as_ref(), &email, update).await?,
    ))
}

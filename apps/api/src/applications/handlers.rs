use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::applications::ledger::ApplicationSubmission;
use crate::errors::{ApiJson, AppError};
use crate::models::application::Application;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct EmailQuery {
    pub email: Option<String>,
}

#[derive(Serialize)]
pub struct TransitionResponse {
    pub message: &'static str,
    pub application: Application,
}

#[derive(Serialize)]
pub struct ReconcileResponse {
    pub repaired: Vec<Uuid>,
}

/// Path ids that are not UUIDs cannot name an application.
fn parse_application_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(format!("Application {raw} not found")))
}

/// POST /applications
pub async fn handle_submit(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ApplicationSubmission>,
) -> Result<(StatusCode, Json<Application>), AppError> {
    let application = state.ledger.submit(req).await?;
    Ok((StatusCode::CREATED, Json(application)))
}

/// GET /applications
pub async fn handle_list_active(
    State(state): State<AppState>,
) -> Result<Json<Vec<Application>>, AppError> {
    Ok(Json(state.ledger.list_active().await?))
}

/// GET /rejected_applications
pub async fn handle_list_rejected(
    State(state): State<AppState>,
) -> Result<Json<Vec<Application>>, AppError> {
    Ok(Json(state.ledger.list_rejected().await?))
}

/// GET /application?email=
pub async fn handle_list_by_email(
    State(state): State<AppState>,
    Query(params): Query<EmailQuery>,
) -> Result<Json<Vec<Application>>, AppError> {
    let applications = match params.email.as_deref().filter(|e| !e.trim().is_empty()) {
        Some(email) => state.ledger.list_for_candidate(email).await?,
        None => state.ledger.list_active().await?,
    };
    Ok(Json(applications))
}

/// POST /applications/:id/approve
pub async fn handle_approve(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TransitionResponse>, AppError> {
    let id = parse_application_id(&id)?;
    let application = state.ledger.approve(id).await?;
    Ok(Json(TransitionResponse {
        message: "Application approved",
        application,
    }))
}

/// POST /applications/:id/reject
pub async fn handle_reject(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TransitionResponse>, AppError> {
    let id = parse_application_id(&id)?;
    let application = state.ledger.reject(id).await?;
    Ok(Json(TransitionResponse {
        message: "Application rejected and moved",
        application,
    }))
}

/// POST /applications/reconcile
pub async fn handle_reconcile(
    State(state): State<AppState>,
) -> Result<Json<ReconcileResponse>, AppError> {
    let repaired = state.ledger.reconcile().await?;
    Ok(Json(ReconcileResponse { repaired }))
}

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{Map, Value};
use tracing::info;

use crate::errors::{ApiJson, AppError};
use crate::models::job::Job;
use crate::state::AppState;

/// Keys the catalog assigns itself; callers cannot set them.
const RESERVED_KEYS: [&str; 2] = ["id", "created_at"];

/// Accepts any non-empty JSON object as a posting.
pub fn validate_posting(payload: Value) -> Result<Map<String, Value>, AppError> {
    let Value::Object(mut posting) = payload else {
        return Err(AppError::Validation(
            "Job posting must be a JSON object".to_string(),
        ));
    };
    for key in RESERVED_KEYS {
        posting.remove(key);
    }
    if posting.is_empty() {
        return Err(AppError::Validation("Job posting is empty".to_string()));
    }
    Ok(posting)
}

/// GET /jobs
pub async fn handle_list_jobs(State(state): State<AppState>) -> Result<Json<Vec<Job>>, AppError> {
    Ok(Json(state.jobs.list_jobs().await?))
}

/// POST /jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<Value>,
) -> Result<(StatusCode, Json<Job>), AppError> {
    let posting = validate_posting(payload)?;
    let job = state.jobs.create_job(posting).await?;
    info!("Created job posting {}", job.id);
    Ok((StatusCode::CREATED, Json(job)))
}

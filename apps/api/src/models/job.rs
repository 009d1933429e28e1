use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A job posting. Posting fields are free-form and flattened into the JSON body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub posting: Map<String, Value>,
}

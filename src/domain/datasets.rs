use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Response DTO for an imported reference dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetResponse {
    pub id: Uuid,
    pub name: String,
    pub table_count: usize,
    pub created_at: DateTime<Utc>,
}

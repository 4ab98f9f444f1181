//! Reference dataset routes
//!
//! Import of dataset documents and download of the dataset a bid is bound to.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::Created;
use crate::app::AppState;
use crate::domain::DatasetResponse;
use crate::error::{ApiError, ApiResult};
use crate::estimation::ReferenceDataset;
use crate::routes::bids::fetch_bid;

/// Largest dataset document accepted for import
pub const MAX_DATASET_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, sqlx::FromRow)]
struct DatasetDocumentRow {
    name: String,
    document: Vec<u8>,
}

/// POST /datasets
///
/// Import a reference dataset document. The document must parse and carry
/// every table the estimator reads.
pub async fn import_dataset(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    let id = Uuid::new_v4();
    let dataset = ReferenceDataset::from_slice(id, &body)
        .map_err(|e| ApiError::bad_request(format!("Invalid dataset document: {}", e)))?;

    let missing = dataset.missing_tables();
    if !missing.is_empty() {
        return Err(ApiError::bad_request(format!(
            "Dataset is missing tables: {}",
            missing.join(", ")
        )));
    }

    let created_at: DateTime<Utc> = sqlx::query_scalar(
        r#"
        INSERT INTO estimate_datasets (id, name, document)
        VALUES ($1, $2, $3)
        RETURNING created_at
        "#,
    )
    .bind(id)
    .bind(dataset.name())
    .bind(&body[..])
    .fetch_one(&state.db)
    .await?;

    tracing::info!(
        dataset_id = %id,
        name = dataset.name(),
        tables = dataset.table_count(),
        bytes = body.len(),
        "Imported reference dataset"
    );

    let response = DatasetResponse {
        id,
        name: dataset.name().to_string(),
        table_count: dataset.table_count(),
        created_at,
    };
    state.datasets.insert(dataset);

    Ok(Created(response))
}

/// GET /bids/:bid_id/dataset
///
/// Download the dataset document the bid is priced against.
pub async fn download_bid_dataset(
    State(state): State<Arc<AppState>>,
    Path(bid_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let bid = fetch_bid(&state.db, bid_id).await?;

    let row = sqlx::query_as::<_, DatasetDocumentRow>(
        "SELECT name, document FROM estimate_datasets WHERE id = $1",
    )
    .bind(bid.dataset_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::not_found("Reference dataset not found"))?;

    let disposition = format!("attachment; filename=\"{}.json\"", sanitize_filename(&row.name));
    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        row.document,
    ))
}

/// Keep a dataset name safe to embed in a quoted header value.
fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "dataset".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("values-2020-12"), "values-2020-12");
        assert_eq!(sanitize_filename("a \"b\"\r\n"), "a__b___");
        assert_eq!(sanitize_filename(""), "dataset");
    }
}

//! Project details routes
//!
//! Details are saved on their own; the estimate is only recomputed on an
//! explicit request.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::DataResponse;
use crate::app::AppState;
use crate::domain::{parse_optional, ProjectDetails, ProjectDetailsResponse};
use crate::error::{ApiError, ApiResult};
use crate::routes::bids::fetch_bid;

#[derive(Debug, sqlx::FromRow)]
struct DetailsRow {
    bid_id: Uuid,
    square_foot: i32,
    profit_margin: String,
    workscope: Option<String>,
    construction_type: Option<String>,
    building_type: Option<String>,
    floor: Option<String>,
    storefront: Option<String>,
    ac_hvac_units: Option<String>,
    finishes: String,
    updated_at: DateTime<Utc>,
}

impl TryFrom<DetailsRow> for ProjectDetailsResponse {
    type Error = ApiError;

    fn try_from(row: DetailsRow) -> Result<Self, Self::Error> {
        let square_foot = u32::try_from(row.square_foot)
            .map_err(|_| ApiError::internal(format!("stored square_foot {} is negative", row.square_foot)))?;

        let details = ProjectDetails {
            square_foot,
            profit_margin: row.profit_margin.parse()?,
            workscope: parse_optional(row.workscope.as_deref())?,
            construction_type: parse_optional(row.construction_type.as_deref())?,
            building_type: parse_optional(row.building_type.as_deref())?,
            floor: parse_optional(row.floor.as_deref())?,
            storefront: parse_optional(row.storefront.as_deref())?,
            ac_hvac_units: parse_optional(row.ac_hvac_units.as_deref())?,
            finishes: row.finishes.parse()?,
        };

        Ok(Self {
            bid_id: row.bid_id,
            details,
            updated_at: row.updated_at,
        })
    }
}

const DETAILS_COLUMNS: &str = "bid_id, square_foot, profit_margin, workscope, construction_type, \
    building_type, floor, storefront, ac_hvac_units, finishes, updated_at";

/// Load a bid's project details, if saved.
pub(crate) async fn fetch_details(
    db: &PgPool,
    bid_id: Uuid,
) -> ApiResult<Option<ProjectDetailsResponse>> {
    sqlx::query_as::<_, DetailsRow>(&format!(
        "SELECT {DETAILS_COLUMNS} FROM project_details WHERE bid_id = $1"
    ))
    .bind(bid_id)
    .fetch_optional(db)
    .await?
    .map(ProjectDetailsResponse::try_from)
    .transpose()
}

/// GET /bids/:bid_id/details
pub async fn get_details(
    State(state): State<Arc<AppState>>,
    Path(bid_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    fetch_bid(&state.db, bid_id).await?;

    let details = fetch_details(&state.db, bid_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Bid details have not been saved"))?;

    Ok(DataResponse::new(details))
}

/// PUT /bids/:bid_id/details
pub async fn save_details(
    State(state): State<Arc<AppState>>,
    Path(bid_id): Path<Uuid>,
    Json(details): Json<ProjectDetails>,
) -> ApiResult<impl IntoResponse> {
    details.validate().map_err(ApiError::bad_request)?;
    fetch_bid(&state.db, bid_id).await?;

    let square_foot = i32::try_from(details.square_foot)
        .map_err(|_| ApiError::bad_request("square_foot is too large"))?;

    let row = sqlx::query_as::<_, DetailsRow>(&format!(
        r#"
        INSERT INTO project_details (bid_id, square_foot, profit_margin, workscope, construction_type,
                                     building_type, floor, storefront, ac_hvac_units, finishes)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        ON CONFLICT (bid_id) DO UPDATE SET
            square_foot = EXCLUDED.square_foot,
            profit_margin = EXCLUDED.profit_margin,
            workscope = EXCLUDED.workscope,
            construction_type = EXCLUDED.construction_type,
            building_type = EXCLUDED.building_type,
            floor = EXCLUDED.floor,
            storefront = EXCLUDED.storefront,
            ac_hvac_units = EXCLUDED.ac_hvac_units,
            finishes = EXCLUDED.finishes,
            updated_at = NOW()
        RETURNING {DETAILS_COLUMNS}
        "#
    ))
    .bind(bid_id)
    .bind(square_foot)
    .bind(details.profit_margin.as_str())
    .bind(details.workscope.map(|v| v.as_str()))
    .bind(details.construction_type.map(|v| v.as_str()))
    .bind(details.building_type.map(|v| v.as_str()))
    .bind(details.floor.map(|v| v.as_str()))
    .bind(details.storefront.map(|v| v.as_str()))
    .bind(details.ac_hvac_units.map(|v| v.as_str()))
    .bind(details.finishes.as_str())
    .fetch_one(&state.db)
    .await?;

    tracing::info!(
        bid_id = %bid_id,
        square_foot = details.square_foot,
        profit_margin = %details.profit_margin,
        "Saved project details"
    );

    Ok(DataResponse::new(ProjectDetailsResponse::try_from(row)?))
}

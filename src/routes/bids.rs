//! Bid routes
//!
//! Creation, retrieval, update and soft deletion of bids. A bid is bound to
//! the most recently imported reference dataset when it is created.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::{Created, DataResponse, NoContent, Paginated, PaginationParams};
use crate::app::AppState;
use crate::db::from_money;
use crate::domain::{
    parse_optional, Bid, BidCountResponse, BidListQuery, BidResponse, BidSort, BidSortKey,
    BidSummary, CreateBidRequest, PlanFlags, ProjectAttributes, SortDirection, UnknownVariant,
    UpdateBidRequest,
};
use crate::error::{ApiError, ApiResult};

/// Database row for bid
#[derive(Debug, sqlx::FromRow)]
struct BidRow {
    id: Uuid,
    name: String,
    project_type: String,
    region: Option<String>,
    business_type: Option<String>,
    plans_uploaded: String,
    combined_plan: String,
    mechanical_plan: String,
    electrical_plan: String,
    plumbing_plan: String,
    dataset_id: Uuid,
    deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BidRow> for Bid {
    type Error = UnknownVariant;

    fn try_from(row: BidRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            name: row.name,
            plans_uploaded: row.plans_uploaded.parse()?,
            attributes: ProjectAttributes {
                project_type: row.project_type.parse()?,
                region: parse_optional(row.region.as_deref())?,
                business_type: parse_optional(row.business_type.as_deref())?,
                plans: PlanFlags {
                    combined: row.combined_plan.parse()?,
                    mechanical: row.mechanical_plan.parse()?,
                    electrical: row.electrical_plan.parse()?,
                    plumbing: row.plumbing_plan.parse()?,
                },
            },
            dataset_id: row.dataset_id,
            deleted: row.deleted,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const BID_COLUMNS: &str = "id, name, project_type, region, business_type, plans_uploaded, \
    combined_plan, mechanical_plan, electrical_plan, plumbing_plan, dataset_id, deleted, \
    created_at, updated_at";

/// Load a live (not deleted) bid.
pub(crate) async fn fetch_bid(db: &PgPool, bid_id: Uuid) -> ApiResult<Bid> {
    let row = sqlx::query_as::<_, BidRow>(&format!(
        "SELECT {BID_COLUMNS} FROM bids WHERE id = $1 AND deleted = FALSE"
    ))
    .bind(bid_id)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| ApiError::not_found("Bid not found"))?;

    Ok(row.try_into()?)
}

/// Listing row: a live bid joined with its stored estimate
#[derive(Debug, sqlx::FromRow)]
struct BidSummaryRow {
    id: Uuid,
    name: String,
    project_type: String,
    total_cost: Option<Decimal>,
    created_at: DateTime<Utc>,
}

impl TryFrom<BidSummaryRow> for BidSummary {
    type Error = ApiError;

    fn try_from(row: BidSummaryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            name: row.name,
            project_type: row.project_type.parse()?,
            total_cost: row.total_cost.map(from_money).transpose()?,
            created_at: row.created_at,
        })
    }
}

/// `ORDER BY` clause for a listing. Bids without an estimate sort last by
/// cost in either direction.
fn order_clause(sort: BidSort) -> String {
    let direction = match sort.direction {
        SortDirection::Asc => "ASC",
        SortDirection::Desc => "DESC",
    };
    match sort.key {
        BidSortKey::Created => format!("b.created_at {direction}, b.id"),
        BidSortKey::Name => format!("b.name {direction}, b.created_at DESC, b.id"),
        BidSortKey::Cost => {
            format!("e.total_cost IS NULL, e.total_cost {direction}, b.created_at DESC, b.id")
        }
    }
}

fn validate_name(name: &str) -> ApiResult<()> {
    if name.trim().is_empty() {
        return Err(ApiError::bad_request("Bid name must not be empty"));
    }
    Ok(())
}

/// POST /bids
pub async fn create_bid(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateBidRequest>,
) -> ApiResult<impl IntoResponse> {
    validate_name(&req.name)?;

    let dataset_id: Uuid = sqlx::query_scalar(
        "SELECT id FROM estimate_datasets ORDER BY created_at DESC LIMIT 1",
    )
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::not_found("No reference dataset has been imported"))?;

    let attributes = req.attributes();
    let plans = attributes.plans;

    let row = sqlx::query_as::<_, BidRow>(&format!(
        r#"
        INSERT INTO bids (id, name, project_type, region, business_type, plans_uploaded,
                          combined_plan, mechanical_plan, electrical_plan, plumbing_plan, dataset_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING {BID_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(req.name.trim())
    .bind(attributes.project_type.as_str())
    .bind(attributes.region.map(|r| r.as_str()))
    .bind(attributes.business_type.map(|b| b.as_str()))
    .bind(req.plans_uploaded.as_str())
    .bind(plans.combined.as_str())
    .bind(plans.mechanical.as_str())
    .bind(plans.electrical.as_str())
    .bind(plans.plumbing.as_str())
    .bind(dataset_id)
    .fetch_one(&state.db)
    .await?;

    let bid = Bid::try_from(row)?;
    tracing::info!(
        bid_id = %bid.id,
        dataset_id = %dataset_id,
        project_type = %bid.attributes.project_type,
        plans_uploaded = %bid.plans_uploaded,
        "Created bid"
    );

    Ok(Created(BidResponse::from(bid)))
}

/// GET /bids
///
/// Live bids, a page at a time, each with its stored estimate's total.
pub async fn list_bids(
    State(state): State<Arc<AppState>>,
    Query(pagination): Query<PaginationParams>,
    Query(query): Query<BidListQuery>,
) -> ApiResult<impl IntoResponse> {
    let sort = query.sort().map_err(|e| ApiError::bad_request(e.to_string()))?;

    let total = count_live_bids(&state.db).await?;

    let rows = sqlx::query_as::<_, BidSummaryRow>(&format!(
        r#"
        SELECT b.id, b.name, b.project_type, e.total_cost, b.created_at
        FROM bids b
        LEFT JOIN project_estimates e ON e.bid_id = b.id
        WHERE b.deleted = FALSE
        ORDER BY {}
        LIMIT $1 OFFSET $2
        "#,
        order_clause(sort)
    ))
    .bind(pagination.limit())
    .bind(pagination.offset())
    .fetch_all(&state.db)
    .await?;

    let data = rows
        .into_iter()
        .map(BidSummary::try_from)
        .collect::<ApiResult<Vec<_>>>()?;

    tracing::debug!(
        page = pagination.page(),
        returned = data.len(),
        total,
        "Listed bids"
    );

    Ok(Paginated::new(data, &pagination, total))
}

/// GET /bids/count
pub async fn count_bids(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let count = count_live_bids(&state.db).await?;
    Ok(DataResponse::new(BidCountResponse { count }))
}

async fn count_live_bids(db: &PgPool) -> ApiResult<u64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bids WHERE deleted = FALSE")
        .fetch_one(db)
        .await?;
    u64::try_from(count).map_err(ApiError::internal)
}

/// GET /bids/:bid_id
pub async fn get_bid(
    State(state): State<Arc<AppState>>,
    Path(bid_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let bid = fetch_bid(&state.db, bid_id).await?;
    Ok(DataResponse::new(BidResponse::from(bid)))
}

/// PATCH /bids/:bid_id
///
/// Attribute changes do not recompute the stored estimate.
pub async fn update_bid(
    State(state): State<Arc<AppState>>,
    Path(bid_id): Path<Uuid>,
    Json(req): Json<UpdateBidRequest>,
) -> ApiResult<impl IntoResponse> {
    if let Some(name) = &req.name {
        validate_name(name)?;
    }

    let mut bid = fetch_bid(&state.db, bid_id).await?;
    bid.apply(req);
    let attributes = bid.attributes;
    let plans = attributes.plans;

    let row = sqlx::query_as::<_, BidRow>(&format!(
        r#"
        UPDATE bids
        SET name = $2, project_type = $3, region = $4, business_type = $5, plans_uploaded = $6,
            combined_plan = $7, mechanical_plan = $8, electrical_plan = $9, plumbing_plan = $10,
            updated_at = NOW()
        WHERE id = $1 AND deleted = FALSE
        RETURNING {BID_COLUMNS}
        "#
    ))
    .bind(bid_id)
    .bind(bid.name.trim())
    .bind(attributes.project_type.as_str())
    .bind(attributes.region.map(|r| r.as_str()))
    .bind(attributes.business_type.map(|b| b.as_str()))
    .bind(bid.plans_uploaded.as_str())
    .bind(plans.combined.as_str())
    .bind(plans.mechanical.as_str())
    .bind(plans.electrical.as_str())
    .bind(plans.plumbing.as_str())
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::not_found("Bid not found"))?;

    tracing::info!(bid_id = %bid_id, "Updated bid");
    state.cache.invalidate_bid(bid_id).await;

    Ok(DataResponse::new(BidResponse::from(Bid::try_from(row)?)))
}

/// DELETE /bids/:bid_id
///
/// Soft delete; the bid's records stay but it no longer resolves.
pub async fn delete_bid(
    State(state): State<Arc<AppState>>,
    Path(bid_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let result = sqlx::query(
        "UPDATE bids SET deleted = TRUE, updated_at = NOW() WHERE id = $1 AND deleted = FALSE",
    )
    .bind(bid_id)
    .execute(&state.db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Bid not found"));
    }

    tracing::info!(bid_id = %bid_id, "Deleted bid");
    state.cache.invalidate_bid(bid_id).await;

    Ok(NoContent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PlanStatus, PlansUploaded, ProjectType};

    fn row() -> BidRow {
        BidRow {
            id: Uuid::new_v4(),
            name: "Corner cafe".to_string(),
            project_type: "restaurant".to_string(),
            region: None,
            business_type: Some("gencon".to_string()),
            plans_uploaded: "will_upload".to_string(),
            combined_plan: "no".to_string(),
            mechanical_plan: "yes".to_string(),
            electrical_plan: "dont_know".to_string(),
            plumbing_plan: "no".to_string(),
            dataset_id: Uuid::new_v4(),
            deleted: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_row_conversion() {
        let bid = Bid::try_from(row()).unwrap();
        assert_eq!(bid.attributes.project_type, ProjectType::Restaurant);
        assert_eq!(bid.attributes.region, None);
        assert_eq!(bid.plans_uploaded, PlansUploaded::WillUpload);
        assert_eq!(bid.attributes.plans.plumbing, PlanStatus::No);
    }

    #[test]
    fn test_row_with_unknown_text_fails() {
        let mut bad = row();
        bad.region = Some("atlantis".to_string());
        let err = Bid::try_from(bad).unwrap_err();
        assert_eq!(err.kind, "Region");
        assert_eq!(err.value, "atlantis");
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("  ").is_err());
        assert!(validate_name("Main St").is_ok());
    }

    #[test]
    fn test_summary_row_conversion() {
        let row = BidSummaryRow {
            id: Uuid::nil(),
            name: "Corner cafe".to_string(),
            project_type: "restaurant".to_string(),
            total_cost: Some(Decimal::new(9876543, 2)),
            created_at: Utc::now(),
        };
        let summary = BidSummary::try_from(row).unwrap();
        assert_eq!(summary.project_type, ProjectType::Restaurant);
        assert_eq!(summary.total_cost, Some(98765.43));

        let unpriced = BidSummaryRow {
            id: Uuid::nil(),
            name: "Shell".to_string(),
            project_type: "retail".to_string(),
            total_cost: None,
            created_at: Utc::now(),
        };
        assert_eq!(BidSummary::try_from(unpriced).unwrap().total_cost, None);
    }

    #[test]
    fn test_order_clause() {
        assert_eq!(order_clause(BidSort::default()), "b.created_at DESC, b.id");
        assert_eq!(
            order_clause("cost asc".parse().unwrap()),
            "e.total_cost IS NULL, e.total_cost ASC, b.created_at DESC, b.id"
        );
        assert_eq!(
            order_clause("name".parse().unwrap()),
            "b.name DESC, b.created_at DESC, b.id"
        );
    }
}

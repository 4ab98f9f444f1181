//! Estimate routes
//!
//! Recompute and read back a bid's estimate. A recompute replaces the stored
//! row in one upsert; nothing is written if any lookup fails.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::DataResponse;
use crate::app::AppState;
use crate::db::{from_count, from_money, to_count, to_money};
use crate::domain::{EstimateResponse, TieredEstimateResponse};
use crate::error::{ApiError, ApiResult};
use crate::estimation::{
    calculate_estimate, tiered_view, Division, DivisionCostSet, Estimate, InspectionBreakdown,
    InspectionKind,
};
use crate::routes::bids::fetch_bid;
use crate::routes::details::fetch_details;
use crate::routes::pricing::fetch_pricing;
use crate::services::cache::keys;

#[derive(Debug, sqlx::FromRow)]
struct EstimateRow {
    bid_id: Uuid,
    division_1: Decimal,
    division_2: Decimal,
    division_3_4: Decimal,
    division_5_7: Decimal,
    division_8: Decimal,
    division_9: Decimal,
    division_10: Decimal,
    division_11_12: Decimal,
    division_13: Decimal,
    division_15: Decimal,
    division_15_1: Decimal,
    division_16: Decimal,
    profit_margin: Decimal,
    total_cost: Decimal,
    days_to_complete: i32,
    cost_per_sqft: Decimal,
    total_inspections: i32,
    rough_inspections: i32,
    final_inspections: i32,
    grease_duct_inspections: i32,
    pre_health_inspections: i32,
    final_building_inspections: i32,
    fire_dept_inspections: i32,
    final_health_inspections: i32,
    computed_at: DateTime<Utc>,
}

impl TryFrom<EstimateRow> for EstimateResponse {
    type Error = anyhow::Error;

    fn try_from(row: EstimateRow) -> Result<Self, Self::Error> {
        let divisions = DivisionCostSet {
            division_1: from_money(row.division_1)?,
            division_2: from_money(row.division_2)?,
            division_3_4: from_money(row.division_3_4)?,
            division_5_7: from_money(row.division_5_7)?,
            division_8: from_money(row.division_8)?,
            division_9: from_money(row.division_9)?,
            division_10: from_money(row.division_10)?,
            division_11_12: from_money(row.division_11_12)?,
            division_13: from_money(row.division_13)?,
            division_15: from_money(row.division_15)?,
            division_15_1: from_money(row.division_15_1)?,
            division_16: from_money(row.division_16)?,
        };
        let inspections = InspectionBreakdown {
            total_inspections: from_count(row.total_inspections)?,
            rough_inspections: from_count(row.rough_inspections)?,
            final_inspections: from_count(row.final_inspections)?,
            grease_duct_inspections: from_count(row.grease_duct_inspections)?,
            pre_health_inspections: from_count(row.pre_health_inspections)?,
            final_building_inspections: from_count(row.final_building_inspections)?,
            fire_dept_inspections: from_count(row.fire_dept_inspections)?,
            final_health_inspections: from_count(row.final_health_inspections)?,
        };

        Ok(Self {
            bid_id: row.bid_id,
            estimate: Estimate {
                divisions,
                profit_margin: from_money(row.profit_margin)?,
                total_cost: from_money(row.total_cost)?,
                days_to_complete: from_count(row.days_to_complete)?,
                inspections,
                cost_per_sqft: from_money(row.cost_per_sqft)?,
            },
            computed_at: row.computed_at,
        })
    }
}

fn inspection_column(kind: InspectionKind) -> String {
    format!("{}_inspections", kind.as_str())
}

/// Stored columns in bind order, after `bid_id`
fn estimate_columns() -> Vec<String> {
    let mut columns: Vec<String> = Division::ALL.iter().map(|d| d.as_str().to_string()).collect();
    columns.extend(
        ["profit_margin", "total_cost", "days_to_complete", "cost_per_sqft", "total_inspections"]
            .map(String::from),
    );
    columns.extend(InspectionKind::ALL.iter().map(|k| inspection_column(*k)));
    columns
}

fn upsert_sql() -> String {
    let columns = estimate_columns();
    let placeholders: Vec<String> = (2..=columns.len() + 1).map(|i| format!("${i}")).collect();
    let updates: Vec<String> = columns
        .iter()
        .map(|c| format!("{c} = EXCLUDED.{c}"))
        .collect();

    format!(
        "INSERT INTO project_estimates (bid_id, {cols}) VALUES ($1, {placeholders}) \
         ON CONFLICT (bid_id) DO UPDATE SET {updates}, computed_at = NOW() \
         RETURNING bid_id, {cols}, computed_at",
        cols = columns.join(", "),
        placeholders = placeholders.join(", "),
        updates = updates.join(", "),
    )
}

/// Load a bid's stored estimate, if computed.
pub(crate) async fn fetch_estimate(
    db: &PgPool,
    bid_id: Uuid,
) -> ApiResult<Option<EstimateResponse>> {
    let row = sqlx::query_as::<_, EstimateRow>(&format!(
        "SELECT bid_id, {}, computed_at FROM project_estimates WHERE bid_id = $1",
        estimate_columns().join(", ")
    ))
    .bind(bid_id)
    .fetch_optional(db)
    .await?;

    Ok(row.map(EstimateResponse::try_from).transpose()?)
}

async fn store_estimate(db: &PgPool, bid_id: Uuid, estimate: &Estimate) -> ApiResult<EstimateResponse> {
    let sql = upsert_sql();
    let mut query = sqlx::query_as::<_, EstimateRow>(&sql).bind(bid_id);
    for (_, cost) in estimate.divisions.iter() {
        query = query.bind(to_money(cost)?);
    }
    query = query
        .bind(to_money(estimate.profit_margin)?)
        .bind(to_money(estimate.total_cost)?)
        .bind(to_count(estimate.days_to_complete)?)
        .bind(to_money(estimate.cost_per_sqft)?)
        .bind(to_count(estimate.inspections.total_inspections)?);
    for kind in InspectionKind::ALL {
        query = query.bind(to_count(estimate.inspections.get(*kind))?);
    }

    let row = query.fetch_one(db).await?;
    Ok(EstimateResponse::try_from(row)?)
}

/// POST /bids/:bid_id/estimate
///
/// Compute the estimate from the bid, its details and its dataset, replacing
/// any stored one. Pricing tiers already generated are left untouched.
#[tracing::instrument(skip(state))]
pub async fn compute_estimate(
    State(state): State<Arc<AppState>>,
    Path(bid_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let _guard = state.bid_locks.acquire(bid_id).await;

    let bid = fetch_bid(&state.db, bid_id).await?;
    let details = fetch_details(&state.db, bid_id)
        .await?
        .ok_or_else(|| ApiError::precondition("Bid details are missing"))?
        .details;
    let dataset = state.datasets.get(&state.db, bid.dataset_id).await?;

    let estimate = calculate_estimate(&dataset, &bid.attributes, &details)?;

    let response = store_estimate(&state.db, bid_id, &estimate).await?;
    state.cache.invalidate_bid(bid_id).await;

    tracing::info!(
        bid_id = %bid_id,
        total_cost = estimate.total_cost,
        days_to_complete = estimate.days_to_complete,
        total_inspections = estimate.inspections.total_inspections,
        "Computed estimate"
    );

    Ok(DataResponse::new(response))
}

/// GET /bids/:bid_id/estimate
pub async fn get_estimate(
    State(state): State<Arc<AppState>>,
    Path(bid_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let cache_key = state.cache.bid_key(bid_id, keys::estimate).await;
    if let Some(key) = &cache_key {
        if let Some(cached) = state.cache.get::<EstimateResponse>(key).await {
            return Ok(DataResponse::new(cached));
        }
    }

    fetch_bid(&state.db, bid_id).await?;
    let estimate = fetch_estimate(&state.db, bid_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Estimate has not been computed"))?;

    if let Some(key) = &cache_key {
        state.cache.put(key, &estimate).await;
    }
    Ok(DataResponse::new(estimate))
}

/// GET /bids/:bid_id/estimate/tiered
///
/// The stored estimate as presented under the bid's selected pricing tier.
pub async fn get_tiered_estimate(
    State(state): State<Arc<AppState>>,
    Path(bid_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let cache_key = state.cache.bid_key(bid_id, keys::tiered_estimate).await;
    if let Some(key) = &cache_key {
        if let Some(cached) = state.cache.get::<TieredEstimateResponse>(key).await {
            return Ok(DataResponse::new(cached));
        }
    }

    fetch_bid(&state.db, bid_id).await?;
    let stored = fetch_estimate(&state.db, bid_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Estimate has not been computed"))?;
    let tiers = fetch_pricing(&state.db, bid_id).await?;

    let response = TieredEstimateResponse {
        bid_id,
        view: tiered_view(&stored.estimate, tiers.as_ref()),
        computed_at: stored.computed_at,
    };

    if let Some(key) = &cache_key {
        state.cache.put(key, &response).await;
    }
    Ok(DataResponse::new(response))
}

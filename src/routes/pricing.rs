//! Pricing tier routes
//!
//! Tiers are generated from the stored estimate on first request and kept
//! from then on, even if the estimate is recomputed. Only the selection
//! changes afterwards.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::DataResponse;
use crate::app::AppState;
use crate::db::{from_count, from_money, to_count, to_money};
use crate::domain::{PricingResponse, SelectPricingRequest};
use crate::error::{ApiError, ApiResult};
use crate::estimation::{PricingTierSet, TierQuote};
use crate::routes::bids::fetch_bid;
use crate::routes::estimates::fetch_estimate;
use crate::services::cache::keys;

#[derive(Debug, sqlx::FromRow)]
struct PricingRow {
    low_cost: Decimal,
    low_schedule: i32,
    high_cost: Decimal,
    high_schedule: i32,
    good_cost: Decimal,
    selected: String,
}

impl TryFrom<PricingRow> for PricingTierSet {
    type Error = ApiError;

    fn try_from(row: PricingRow) -> Result<Self, Self::Error> {
        Ok(Self {
            low: TierQuote {
                cost: from_money(row.low_cost)?,
                schedule: from_count(row.low_schedule)?,
            },
            high: TierQuote {
                cost: from_money(row.high_cost)?,
                schedule: from_count(row.high_schedule)?,
            },
            good_cost: from_money(row.good_cost)?,
            selected: row.selected.parse()?,
        })
    }
}

/// Load a bid's pricing tiers, if generated.
pub(crate) async fn fetch_pricing(db: &PgPool, bid_id: Uuid) -> ApiResult<Option<PricingTierSet>> {
    sqlx::query_as::<_, PricingRow>(
        r#"
        SELECT low_cost, low_schedule, high_cost, high_schedule, good_cost, selected
        FROM bid_pricing
        WHERE bid_id = $1
        "#,
    )
    .bind(bid_id)
    .fetch_optional(db)
    .await?
    .map(PricingTierSet::try_from)
    .transpose()
}

/// Insert tiers unless the bid already has some; concurrent first requests
/// leave exactly one row.
async fn insert_if_absent(db: &PgPool, bid_id: Uuid, tiers: &PricingTierSet) -> ApiResult<()> {
    let result = sqlx::query(
        r#"
        INSERT INTO bid_pricing (bid_id, low_cost, low_schedule, high_cost, high_schedule, good_cost, selected)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (bid_id) DO NOTHING
        "#,
    )
    .bind(bid_id)
    .bind(to_money(tiers.low.cost)?)
    .bind(to_count(tiers.low.schedule)?)
    .bind(to_money(tiers.high.cost)?)
    .bind(to_count(tiers.high.schedule)?)
    .bind(to_money(tiers.good_cost)?)
    .bind(tiers.selected.as_str())
    .execute(db)
    .await?;

    if result.rows_affected() > 0 {
        tracing::info!(
            bid_id = %bid_id,
            low_cost = tiers.low.cost,
            high_cost = tiers.high.cost,
            good_cost = tiers.good_cost,
            "Generated pricing tiers"
        );
    }
    Ok(())
}

/// GET /bids/:bid_id/pricing
///
/// Get the bid's pricing tiers, generating them from the stored estimate on
/// first use.
pub async fn get_pricing(
    State(state): State<Arc<AppState>>,
    Path(bid_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let cache_key = state.cache.bid_key(bid_id, keys::pricing).await;
    if let Some(key) = &cache_key {
        if let Some(cached) = state.cache.get::<PricingResponse>(key).await {
            return Ok(DataResponse::new(cached));
        }
    }

    fetch_bid(&state.db, bid_id).await?;
    let estimate = fetch_estimate(&state.db, bid_id)
        .await?
        .ok_or_else(|| ApiError::precondition("Estimate has not been computed"))?
        .estimate;

    let tiers = match fetch_pricing(&state.db, bid_id).await? {
        Some(tiers) => tiers,
        None => {
            let generated = PricingTierSet::generate(estimate.total_cost, estimate.days_to_complete);
            insert_if_absent(&state.db, bid_id, &generated).await?;
            fetch_pricing(&state.db, bid_id)
                .await?
                .ok_or_else(|| ApiError::internal("pricing row missing after insert"))?
        }
    };

    let medium = TierQuote {
        cost: estimate.total_cost,
        schedule: estimate.days_to_complete,
    };
    let response = PricingResponse::new(bid_id, &tiers, medium);

    if let Some(key) = &cache_key {
        state.cache.put(key, &response).await;
    }
    Ok(DataResponse::new(response))
}

/// PATCH /bids/:bid_id/pricing
///
/// Choose the tier to present. Re-selecting the current tier changes nothing.
pub async fn select_pricing(
    State(state): State<Arc<AppState>>,
    Path(bid_id): Path<Uuid>,
    Json(req): Json<SelectPricingRequest>,
) -> ApiResult<impl IntoResponse> {
    fetch_bid(&state.db, bid_id).await?;
    let estimate = fetch_estimate(&state.db, bid_id)
        .await?
        .ok_or_else(|| ApiError::precondition("Estimate has not been computed"))?
        .estimate;
    let mut tiers = fetch_pricing(&state.db, bid_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Pricing has not been generated"))?;

    let previous = tiers.selected;
    if tiers.select(req.selected) {
        sqlx::query("UPDATE bid_pricing SET selected = $2, updated_at = NOW() WHERE bid_id = $1")
            .bind(bid_id)
            .bind(tiers.selected.as_str())
            .execute(&state.db)
            .await?;

        tracing::info!(
            bid_id = %bid_id,
            from = %previous,
            to = %tiers.selected,
            "Changed pricing selection"
        );
        state.cache.invalidate_bid(bid_id).await;
    }

    let medium = TierQuote {
        cost: estimate.total_cost,
        schedule: estimate.days_to_complete,
    };
    Ok(DataResponse::new(PricingResponse::new(bid_id, &tiers, medium)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimation::PricingSelection;

    #[test]
    fn test_row_conversion() {
        let row = PricingRow {
            low_cost: Decimal::new(64602813, 2),
            low_schedule: 76,
            high_cost: Decimal::new(87174880, 2),
            high_schedule: 57,
            good_cost: Decimal::new(80169755, 2),
            selected: "high".to_string(),
        };

        let tiers = PricingTierSet::try_from(row).unwrap();
        assert_eq!(tiers.low.cost, 646028.13);
        assert_eq!(tiers.high.cost, 871748.8);
        assert_eq!(tiers.good_cost, 801697.55);
        assert_eq!(tiers.high.schedule, 57);
        assert_eq!(tiers.selected, PricingSelection::High);
    }

    #[test]
    fn test_row_with_unknown_selection_fails() {
        let row = PricingRow {
            low_cost: Decimal::ZERO,
            low_schedule: 1,
            high_cost: Decimal::ZERO,
            high_schedule: 1,
            good_cost: Decimal::ZERO,
            selected: "good".to_string(),
        };
        assert!(PricingTierSet::try_from(row).is_err());
    }
}

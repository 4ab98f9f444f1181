//! Pricing tier DTOs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::estimation::{PricingSelection, PricingTierSet, TierQuote};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoodQuote {
    pub cost: f64,
}

/// Response DTO for a bid's pricing tiers. Medium is always the stored
/// estimate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingResponse {
    pub bid_id: Uuid,
    pub low: TierQuote,
    pub medium: TierQuote,
    pub high: TierQuote,
    pub good: GoodQuote,
    pub selected: PricingSelection,
}

impl PricingResponse {
    pub fn new(bid_id: Uuid, tiers: &PricingTierSet, medium: TierQuote) -> Self {
        Self {
            bid_id,
            low: tiers.low,
            medium,
            high: tiers.high,
            good: GoodQuote {
                cost: tiers.good_cost,
            },
            selected: tiers.selected,
        }
    }
}

/// Request DTO for choosing a tier
#[derive(Debug, Clone, Deserialize)]
pub struct SelectPricingRequest {
    pub selected: PricingSelection,
}

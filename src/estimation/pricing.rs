//! Pricing tiers and division adjustment
//!
//! A tier set is derived once from an estimate's total cost and schedule
//! and then kept as-is. `adjust` re-applies the low/high bands to any
//! single figure so a view can show tier-consistent divisions.

use serde::{Deserialize, Serialize};

use super::aggregate::{round2, Estimate};
use super::divisions::DivisionCostSet;
use super::inspections::InspectionBreakdown;

text_enum! {
    /// Tier the bidder has chosen to present.
    pub enum PricingSelection {
        Unselected => "none",
        Low => "low",
        Medium => "medium",
        High => "high",
    }
}

impl Default for PricingSelection {
    fn default() -> Self {
        Self::Unselected
    }
}

/// Fraction of the total quoted as the low tier
pub fn low_multiplier(total_cost: f64) -> f64 {
    if total_cost < 1_000_000.0 {
        0.83
    } else if total_cost < 2_000_000.0 {
        0.88
    } else {
        0.94
    }
}

/// Fraction of the total quoted as the high tier
pub fn high_multiplier(total_cost: f64) -> f64 {
    if total_cost < 500_000.0 {
        1.17
    } else if total_cost < 1_000_000.0 {
        1.12
    } else {
        1.07
    }
}

const GOOD_MULTIPLIER: f64 = 1.03;
const LOW_SCHEDULE_MULTIPLIER: f64 = 1.15;
const HIGH_SCHEDULE_MULTIPLIER: f64 = 0.85;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierQuote {
    pub cost: f64,
    pub schedule: u32,
}

/// Negotiable price bands derived from one estimate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingTierSet {
    pub low: TierQuote,
    pub high: TierQuote,
    pub good_cost: f64,
    pub selected: PricingSelection,
}

impl PricingTierSet {
    pub fn generate(total_cost: f64, days_to_complete: u32) -> Self {
        let days = f64::from(days_to_complete);
        Self {
            low: TierQuote {
                cost: round2(total_cost * low_multiplier(total_cost)),
                schedule: (days * LOW_SCHEDULE_MULTIPLIER).ceil() as u32,
            },
            high: TierQuote {
                cost: round2(total_cost * high_multiplier(total_cost)),
                schedule: (days * HIGH_SCHEDULE_MULTIPLIER).ceil() as u32,
            },
            good_cost: round2(total_cost * GOOD_MULTIPLIER),
            selected: PricingSelection::Unselected,
        }
    }

    /// Record the presented tier. Returns whether the selection changed.
    pub fn select(&mut self, selection: PricingSelection) -> bool {
        if self.selected == selection {
            return false;
        }
        self.selected = selection;
        true
    }

    /// Quote for the selected tier, if it is low or high
    pub fn selected_quote(&self) -> Option<TierQuote> {
        match self.selected {
            PricingSelection::Low => Some(self.low),
            PricingSelection::High => Some(self.high),
            PricingSelection::Unselected | PricingSelection::Medium => None,
        }
    }
}

/// Scale one figure into the selected band of `total_cost`.
pub fn adjust(value: f64, total_cost: f64, selected: PricingSelection) -> f64 {
    match selected {
        PricingSelection::Low => round2(value * low_multiplier(total_cost)),
        PricingSelection::High => round2(value * high_multiplier(total_cost)),
        PricingSelection::Unselected | PricingSelection::Medium => value,
    }
}

/// Estimate figures as presented under the selected tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TieredEstimate {
    pub selected: PricingSelection,
    pub divisions: DivisionCostSet,
    pub profit_margin: f64,
    pub total_cost: f64,
    pub days_to_complete: u32,
    pub cost_per_sqft: f64,
    pub inspections: InspectionBreakdown,
}

pub fn tiered_view(estimate: &Estimate, tiers: Option<&PricingTierSet>) -> TieredEstimate {
    let selected = tiers.map(|t| t.selected).unwrap_or_default();
    let base_total = estimate.total_cost;
    let quote = tiers.and_then(|t| t.selected_quote());

    TieredEstimate {
        selected,
        divisions: estimate.divisions.map(|cost| adjust(cost, base_total, selected)),
        profit_margin: adjust(estimate.profit_margin, base_total, selected),
        total_cost: quote.map(|q| q.cost).unwrap_or(base_total),
        days_to_complete: quote.map(|q| q.schedule).unwrap_or(estimate.days_to_complete),
        cost_per_sqft: adjust(estimate.cost_per_sqft, base_total, selected),
        inspections: estimate.inspections,
    }
}

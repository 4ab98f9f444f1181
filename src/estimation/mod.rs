//! Estimation engine
//!
//! Pure, synchronous computation of division costs, schedule, inspections
//! and pricing tiers from one bid's inputs and a reference dataset. Nothing
//! here touches the database or the network.

mod aggregate;
mod brackets;
mod dataset;
mod divisions;
mod error;
mod factors;
mod inspections;
mod pricing;
mod schedule;

#[cfg(test)]
mod fixtures;

pub use aggregate::{calculate_estimate, Estimate};
pub use dataset::ReferenceDataset;
pub use divisions::{Division, DivisionCostSet};
pub use error::EstimationError;
pub use inspections::{InspectionBreakdown, InspectionKind};
pub use pricing::{tiered_view, PricingSelection, PricingTierSet, TierQuote, TieredEstimate};

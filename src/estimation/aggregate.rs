//! Estimate aggregator

use serde::{Deserialize, Serialize};

use super::dataset::ReferenceDataset;
use super::divisions::{division_costs, DivisionCostSet};
use super::inspections::{resolve_inspections, InspectionBreakdown};
use super::schedule::days_to_complete;
use super::EstimationError;
use crate::domain::{ProjectAttributes, ProjectDetails};

/// Round half up at `decimals` places.
pub fn round_half_up(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    let scaled = value * factor;
    let floor = scaled.floor();
    let rounded = if scaled - floor >= 0.5 { floor + 1.0 } else { floor };
    rounded / factor
}

pub fn round2(value: f64) -> f64 {
    round_half_up(value, 2)
}

pub fn round3(value: f64) -> f64 {
    round_half_up(value, 3)
}

/// Full cost and schedule estimate for one bid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    pub divisions: DivisionCostSet,
    pub profit_margin: f64,
    pub total_cost: f64,
    pub days_to_complete: u32,
    pub inspections: InspectionBreakdown,
    pub cost_per_sqft: f64,
}

/// Run the whole engine over one bid's inputs.
///
/// The total is built from the unrounded division sum; the divisions
/// reported alongside it are rounded to cents.
pub fn calculate_estimate(
    dataset: &ReferenceDataset,
    attributes: &ProjectAttributes,
    details: &ProjectDetails,
) -> Result<Estimate, EstimationError> {
    let divisions = division_costs(dataset, attributes, details)?;

    let sum = round3(divisions.total());
    let margin = round3(sum * details.profit_margin.fraction());
    let total_cost = round2(margin + sum);
    let cost_per_sqft = round2(total_cost / details.square_feet());

    Ok(Estimate {
        divisions: divisions.map(round2),
        profit_margin: round2(margin),
        total_cost,
        days_to_complete: days_to_complete(dataset, attributes, details)?,
        inspections: resolve_inspections(dataset, attributes)?,
        cost_per_sqft,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PlanStatus, ProfitMargin};
    use crate::estimation::dataset::TableName;
    use crate::estimation::fixtures;
    use pretty_assertions::assert_eq;

    fn is_cents(value: f64) -> bool {
        round2(value) == value
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round2(1.005), 1.0); // 1.005 is stored just below the midpoint
        assert_eq!(round2(2.345), 2.35);
        assert_eq!(round2(-2.5), -2.5);
        assert_eq!(round_half_up(-2.5, 0), -2.0);
        assert_eq!(round_half_up(2.5, 0), 3.0);
        assert_eq!(round3(12.3456), 12.346);
        assert_eq!(round2(646028.1262), 646028.13);
    }

    #[test]
    fn test_estimate_for_highrise_shell() {
        let dataset = fixtures::dataset();
        let mut details = fixtures::details(1555);
        details.profit_margin = ProfitMargin::Seven;

        let estimate = calculate_estimate(&dataset, &fixtures::attributes(), &details).unwrap();

        assert_eq!(estimate.divisions.division_2, 0.0);
        assert_eq!(estimate.days_to_complete, 82);
        assert_eq!(estimate.inspections.total_inspections, 11);
        for (division, cost) in estimate.divisions.iter() {
            assert!(is_cents(cost), "{division} = {cost}");
        }
        assert!(is_cents(estimate.total_cost));
        assert!(is_cents(estimate.cost_per_sqft));
        assert_eq!(
            estimate.cost_per_sqft,
            round2(estimate.total_cost / 1555.0)
        );
    }

    #[test]
    fn test_total_is_margin_plus_unrounded_sum() {
        let dataset = fixtures::dataset();
        let attributes = fixtures::attributes();
        let details = fixtures::details(2345);

        let raw = division_costs(&dataset, &attributes, &details).unwrap();
        let estimate = calculate_estimate(&dataset, &attributes, &details).unwrap();

        let sum = round3(raw.total());
        let margin = round3(sum * 0.03);
        assert_eq!(estimate.total_cost, round2(margin + sum));
        assert_eq!(estimate.profit_margin, round2(margin));
        assert_eq!(estimate.divisions, raw.map(round2));
    }

    #[test]
    fn test_deterministic() {
        let dataset = fixtures::dataset();
        let mut attributes = fixtures::attributes();
        attributes.plans.combined = PlanStatus::No;
        attributes.plans.plumbing = PlanStatus::DontKnow;
        let details = fixtures::details(3777);

        let first = calculate_estimate(&dataset, &attributes, &details).unwrap();
        let second = calculate_estimate(&dataset, &attributes, &details).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.total_cost.to_bits(), second.total_cost.to_bits());
    }

    #[test]
    fn test_zero_margin() {
        let dataset = fixtures::dataset();
        let mut details = fixtures::details(900);
        details.profit_margin = ProfitMargin::Zero;

        let estimate = calculate_estimate(&dataset, &fixtures::attributes(), &details).unwrap();
        assert_eq!(estimate.profit_margin, 0.0);
    }

    #[test]
    fn test_missing_table_fails_whole_estimate() {
        let dataset = fixtures::dataset_without(TableName::DivSqftPercentage);
        let result = calculate_estimate(&dataset, &fixtures::attributes(), &fixtures::details(1555));
        assert!(matches!(
            result,
            Err(EstimationError::MissingTable("Div_Sqft_Percentage"))
        ));
    }
}

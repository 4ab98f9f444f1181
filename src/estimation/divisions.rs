//! Division cost calculator
//!
//! Each of the twelve divisions starts from a bracket-accumulated baseline
//! price and is scaled by area and the shared cost factors. Results stay
//! unrounded until aggregation.

use serde::{Deserialize, Serialize};

use super::brackets::cost_bracket;
use super::dataset::{ReferenceDataset, TableName};
use super::factors::{finish_multiplier, CostFactors};
use super::EstimationError;
use crate::domain::{
    ConstructionType, FinishLevel, PlanStatus, ProjectAttributes, ProjectDetails, ProjectType,
    StorefrontStatus,
};

text_enum! {
    ordered;
    /// Construction cost categories, in reporting order.
    pub enum Division {
        Supervision => "division_1",
        Demolition => "division_2",
        Concrete => "division_3_4",
        Framing => "division_5_7",
        Openings => "division_8",
        Specialties => "division_9",
        Finishes => "division_10",
        Equipment => "division_11_12",
        FireProtection => "division_13",
        Mechanical => "division_15",
        Plumbing => "division_15_1",
        Electrical => "division_16",
    }
}

/// Flat fee added to division 8 when a new storefront is installed
const NEW_STOREFRONT_FEE: f64 = 54321.0;

/// One cost per division
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DivisionCostSet {
    pub division_1: f64,
    pub division_2: f64,
    pub division_3_4: f64,
    pub division_5_7: f64,
    pub division_8: f64,
    pub division_9: f64,
    pub division_10: f64,
    pub division_11_12: f64,
    pub division_13: f64,
    pub division_15: f64,
    pub division_15_1: f64,
    pub division_16: f64,
}

impl DivisionCostSet {
    pub fn try_from_fn<E>(
        mut f: impl FnMut(Division) -> Result<f64, E>,
    ) -> Result<Self, E> {
        let mut set = Self::default();
        for division in Division::ALL {
            *set.slot_mut(*division) = f(*division)?;
        }
        Ok(set)
    }

    pub fn get(&self, division: Division) -> f64 {
        match division {
            Division::Supervision => self.division_1,
            Division::Demolition => self.division_2,
            Division::Concrete => self.division_3_4,
            Division::Framing => self.division_5_7,
            Division::Openings => self.division_8,
            Division::Specialties => self.division_9,
            Division::Finishes => self.division_10,
            Division::Equipment => self.division_11_12,
            Division::FireProtection => self.division_13,
            Division::Mechanical => self.division_15,
            Division::Plumbing => self.division_15_1,
            Division::Electrical => self.division_16,
        }
    }

    fn slot_mut(&mut self, division: Division) -> &mut f64 {
        match division {
            Division::Supervision => &mut self.division_1,
            Division::Demolition => &mut self.division_2,
            Division::Concrete => &mut self.division_3_4,
            Division::Framing => &mut self.division_5_7,
            Division::Openings => &mut self.division_8,
            Division::Specialties => &mut self.division_9,
            Division::Finishes => &mut self.division_10,
            Division::Equipment => &mut self.division_11_12,
            Division::FireProtection => &mut self.division_13,
            Division::Mechanical => &mut self.division_15,
            Division::Plumbing => &mut self.division_15_1,
            Division::Electrical => &mut self.division_16,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Division, f64)> + '_ {
        Division::ALL.iter().map(move |d| (*d, self.get(*d)))
    }

    pub fn map(&self, mut f: impl FnMut(f64) -> f64) -> Self {
        let mut mapped = *self;
        for division in Division::ALL {
            let slot = mapped.slot_mut(*division);
            *slot = f(*slot);
        }
        mapped
    }

    /// Sum in division order.
    pub fn total(&self) -> f64 {
        self.iter().map(|(_, cost)| cost).fold(0.0, |acc, cost| acc + cost)
    }
}

/// Coerce through the shortest decimal representation and back.
fn reround(value: f64) -> f64 {
    value.to_string().parse().unwrap_or(value)
}

/// Bracket-accumulated baseline price of one division.
///
/// Replays every bracket from the bottom of the ladder up to the one the
/// square footage falls in, compounding the average of the division's area
/// growth and the bracket's sqft growth at each step.
pub fn baseline_price(
    dataset: &ReferenceDataset,
    division: Division,
    project_type: ProjectType,
    sqft: f64,
) -> Result<f64, EstimationError> {
    let bracket = cost_bracket(sqft);
    let Some(bracket_column) = bracket.column_key() else {
        return Ok(0.0);
    };
    let row = division.as_str();
    let column = project_type.as_str();

    let mut price = dataset.lookup(TableName::DivAreaPrice, row, column)?;
    let area_growth = 1.0 + dataset.lookup(TableName::DivAreaPercentage, row, column)?;
    for step in bracket.steps().iter().filter_map(|b| b.column_key()) {
        let sqft_growth = 1.0 + dataset.lookup(TableName::AreaSqftPercentage, column, step)?;
        price = reround(price * ((area_growth + sqft_growth) / 2.0));
    }

    let bracket_growth = 1.0 + dataset.lookup(TableName::DivSqftPercentage, row, bracket_column)?;
    Ok(price * bracket_growth)
}

/// Electrical multiplier for high-end finishes, stepped by area.
fn highend_electrical_step(full_area: f64) -> f64 {
    if full_area <= 1000.0 {
        1.335
    } else if full_area <= 2000.0 {
        1.4
    } else if full_area <= 3500.0 {
        1.25
    } else if full_area <= 5000.0 {
        1.1
    } else {
        0.0
    }
}

impl Division {
    /// Apply this division's formula to its baseline price.
    pub fn cost(
        self,
        base: f64,
        f: &CostFactors,
        attributes: &ProjectAttributes,
        details: &ProjectDetails,
    ) -> f64 {
        let plans = attributes.plans;
        let location = |value: f64| value * f.region * f.building * f.floor_cell;

        match self {
            Division::Supervision => {
                location(base * f.scaled_area) * (f.floor_level * 1.25) * f.plan_readiness
            }
            Division::Demolition => {
                if details.construction_type == Some(ConstructionType::NewShell) {
                    0.0
                } else {
                    location(base * f.full_area)
                }
            }
            Division::Concrete => location(base * f.full_area),
            Division::Framing => location(base * f.scaled_area),
            Division::Openings => {
                let storefront = if details.storefront == Some(StorefrontStatus::New) {
                    base * f.full_area * 0.35 + NEW_STOREFRONT_FEE
                } else {
                    base * f.full_area * 0.525
                };
                location(storefront) * f.floor_level
            }
            Division::Specialties => {
                if plans.plumbing == PlanStatus::No {
                    0.0
                } else {
                    location(base * f.full_area)
                }
            }
            Division::Finishes => {
                let finish = finish_multiplier(details.finishes, 0.715, 1.515);
                location(base * f.scaled_area * finish) * f.floor_level
            }
            Division::Equipment => location(base * f.scaled_area),
            Division::FireProtection => location(base * f.full_area) * f.floor_level,
            Division::Mechanical => {
                if plans.mechanical == PlanStatus::No {
                    return 0.0;
                }
                let finish = finish_multiplier(details.finishes, 0.95, 1.23);
                location(base * f.scaled_area * f.hvac_area * finish) * f.floor_level
            }
            Division::Plumbing => {
                if plans.plumbing == PlanStatus::No {
                    return 0.0;
                }
                let finish = finish_multiplier(details.finishes, 0.9, 1.1);
                location(base * f.scaled_area * finish) * f.floor_level
            }
            Division::Electrical => {
                if plans.electrical != PlanStatus::Yes {
                    return 0.0;
                }
                let wiring = match details.finishes {
                    FinishLevel::Basic => base * f.full_area * 0.7,
                    FinishLevel::Highend => {
                        base * f.full_area * highend_electrical_step(f.full_area)
                    }
                    FinishLevel::Medium => base * f.full_area * 0.95,
                };
                location(wiring) * f.floor_level
            }
        }
    }
}

/// Unrounded cost of every division for one bid.
pub fn division_costs(
    dataset: &ReferenceDataset,
    attributes: &ProjectAttributes,
    details: &ProjectDetails,
) -> Result<DivisionCostSet, EstimationError> {
    let factors = CostFactors::resolve(dataset, attributes, details)?;
    let sqft = details.square_feet();

    DivisionCostSet::try_from_fn(|division| {
        let base = baseline_price(dataset, division, attributes.project_type, sqft)?;
        Ok(division.cost(base, &factors, attributes, details))
    })
}

//! Schedule estimator
//!
//! Days to complete come from the schedule-bracket area value, a few
//! scope adjustments, and the calendar factor tables. The schedule reads
//! the stated floor, not the cost path's effective floor.

use super::brackets::schedule_bracket;
use super::dataset::{ReferenceDataset, TableName};
use super::EstimationError;
use crate::domain::{
    ConstructionType, FloorLevel, HvacStatus, ProjectAttributes, ProjectDetails, StorefrontStatus,
};

/// Row of `CAL_Working_Days` the schedule is quoted against. The table
/// also carries `working_days` and `off_hour_working_days` rows.
const QUOTED_CALENDAR: &str = "weekends";

/// Pick one of three step values by square footage; 0 above the range.
fn step_adjustment(sqft: f64, steps: [f64; 3]) -> f64 {
    if sqft < 1500.0 {
        steps[0]
    } else if sqft < 3500.0 {
        steps[1]
    } else if sqft <= 5000.0 {
        steps[2]
    } else {
        0.0
    }
}

pub fn structural_adjustment(sqft: f64, construction: Option<ConstructionType>) -> f64 {
    match construction {
        Some(ConstructionType::RenovationWithDemolition) => step_adjustment(sqft, [1.0, 1.75, 2.5]),
        _ => 0.0,
    }
}

pub fn storefront_adjustment(sqft: f64, storefront: Option<StorefrontStatus>) -> f64 {
    match storefront {
        Some(StorefrontStatus::New) => step_adjustment(sqft, [1.25, 1.375, 1.5]),
        _ => 0.0,
    }
}

pub fn hvac_adjustment(sqft: f64, ac_hvac_units: Option<HvacStatus>) -> f64 {
    match ac_hvac_units {
        Some(HvacStatus::New) => step_adjustment(sqft, [1.2, 1.35, 1.5]),
        _ => 0.0,
    }
}

/// Whole days to complete the project; never less than one.
pub fn days_to_complete(
    dataset: &ReferenceDataset,
    attributes: &ProjectAttributes,
    details: &ProjectDetails,
) -> Result<u32, EstimationError> {
    let sqft = details.square_feet();
    let plans = attributes.plans;

    let area = match schedule_bracket(sqft).column_key() {
        Some(column) => dataset.lookup(
            TableName::CalArea,
            attributes.project_type.as_str(),
            column,
        )?,
        None => 0.0,
    };
    let working_days = dataset.factor(TableName::CalWorkingDays, QUOTED_CALENDAR)?;
    let region = dataset.factor_or_unknown(
        TableName::CalRegion,
        attributes.region.map(|r| r.as_str()),
    )?;
    let building = dataset.factor_or_unknown(
        TableName::CalBuildingInfo,
        details.building_type.map(|b| b.as_str()),
    )?;
    let floor = dataset.factor(
        TableName::CalFloorLevel,
        details.floor.unwrap_or(FloorLevel::FirstFloor).as_str(),
    )?;
    let mechanical = dataset.factor(TableName::CalMechanicalPlan, plans.mechanical.as_str())?;
    let plumbing = dataset.factor(TableName::CalPlumbingPlan, plans.plumbing.as_str())?;
    let electrical = dataset.factor(TableName::CalElectricalPlan, plans.electrical.as_str())?;

    let raw = (area * working_days
        + structural_adjustment(sqft, details.construction_type)
        + storefront_adjustment(sqft, details.storefront)
        + hvac_adjustment(sqft, details.ac_hvac_units))
        * region
        * building
        * floor
        * mechanical
        * plumbing
        * electrical;

    Ok(raw.ceil().max(1.0) as u32)
}

//! Multiplicative factors shared by the division formulas.

use super::brackets::{area_within_limit, scaled_area};
use super::dataset::{ReferenceDataset, TableName};
use super::EstimationError;
use crate::domain::{
    BuildingType, FinishLevel, FloorLevel, HvacStatus, PlanStatus, ProjectAttributes,
    ProjectDetails,
};

/// Floor used for cost lookups. Strip centers and standalone buildings are
/// priced as ground floor whatever floor was stated.
pub fn effective_floor(building: Option<BuildingType>, floor: Option<FloorLevel>) -> FloorLevel {
    match building {
        Some(BuildingType::StripCenter) | Some(BuildingType::StandaloneBuilding) => {
            FloorLevel::FirstFloor
        }
        _ => floor.unwrap_or(FloorLevel::FirstFloor),
    }
}

/// Premium for working above ground inside malls and highrises.
pub fn floor_level_factor(building: Option<BuildingType>, floor: Option<FloorLevel>) -> f64 {
    let by_floor = |floor: FloorLevel| match floor {
        FloorLevel::FirstFloor => 1.3,
        FloorLevel::SecondFloor => 1.35,
        FloorLevel::ThirdOrHigher => 1.4,
    };
    match (building, floor) {
        (Some(BuildingType::InsideMall), Some(floor)) | (Some(BuildingType::Highrise), Some(floor)) => {
            by_floor(floor)
        }
        (Some(BuildingType::Highrise), None) => by_floor(FloorLevel::ThirdOrHigher),
        (Some(BuildingType::InsideMall), None) => by_floor(FloorLevel::FirstFloor),
        _ => 1.0,
    }
}

/// Area factor applied to mechanical costs.
pub fn hvac_area_factor(sqft: f64, ac_hvac_units: Option<HvacStatus>) -> f64 {
    match ac_hvac_units {
        Some(HvacStatus::New) if area_within_limit(sqft) < 2500.0 => 1.35,
        Some(HvacStatus::New) => 1.1,
        _ => 0.85,
    }
}

pub fn finish_multiplier(finishes: FinishLevel, basic: f64, highend: f64) -> f64 {
    match finishes {
        FinishLevel::Basic => basic,
        FinishLevel::Medium => 1.0,
        FinishLevel::Highend => highend,
    }
}

/// Combined factor for missing trade plans: 1 when the full plan set is in.
pub fn plan_readiness_factor(
    dataset: &ReferenceDataset,
    attributes: &ProjectAttributes,
) -> Result<f64, EstimationError> {
    let plans = attributes.plans;
    if plans.combined == PlanStatus::Yes {
        return Ok(1.0);
    }
    let mechanical = dataset.factor(TableName::CalMechanicalPlan, plans.mechanical.as_str())?;
    let plumbing = dataset.factor(TableName::CalPlumbingPlan, plans.plumbing.as_str())?;
    let electrical = dataset.factor(TableName::CalElectricalPlan, plans.electrical.as_str())?;
    Ok(mechanical * plumbing * electrical)
}

/// Every factor the division formulas draw on, resolved once per estimate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostFactors {
    pub full_area: f64,
    pub scaled_area: f64,
    pub region: f64,
    pub building: f64,
    pub floor_cell: f64,
    pub floor_level: f64,
    pub plan_readiness: f64,
    pub hvac_area: f64,
}

impl CostFactors {
    pub fn resolve(
        dataset: &ReferenceDataset,
        attributes: &ProjectAttributes,
        details: &ProjectDetails,
    ) -> Result<Self, EstimationError> {
        let sqft = details.square_feet();
        let region = dataset.factor_or_unknown(
            TableName::EstRegion,
            attributes.region.map(|r| r.as_str()),
        )?;
        let building = dataset.factor_or_unknown(
            TableName::EstBuildingInfo,
            details.building_type.map(|b| b.as_str()),
        )?;
        let floor = effective_floor(details.building_type, details.floor);
        let floor_cell = dataset.factor(TableName::EstFloorLevel, floor.as_str())?;

        Ok(Self {
            full_area: area_within_limit(sqft),
            scaled_area: scaled_area(sqft),
            region,
            building,
            floor_cell,
            floor_level: floor_level_factor(details.building_type, details.floor),
            plan_readiness: plan_readiness_factor(dataset, attributes)?,
            hvac_area: hvac_area_factor(sqft, details.ac_hvac_units),
        })
    }
}

//! Synthetic reference dataset for engine tests.
//!
//! Row and column order of the constant tables follows the `ALL` order of
//! the enum that keys them.

use std::collections::HashMap;

use uuid::Uuid;

use super::brackets::{CostBracket, ScheduleBracket};
use super::dataset::{ReferenceDataset, Table, TableName, UNKNOWN_ROW, VALUE_COLUMN};
use super::divisions::Division;
use crate::domain::{
    BuildingType, BusinessType, ConstructionType, FinishLevel, FloorLevel, HvacStatus, PlanFlags,
    PlanStatus, ProfitMargin, ProjectAttributes, ProjectDetails, ProjectType, Region,
    StorefrontStatus, Workscope,
};

/// Regions, then the unknown row
pub const EST_REGION: [f64; 4] = [1.1, 1.0, 1.2, 1.05];
/// Building types, then the unknown row
pub const EST_BUILDING: [f64; 5] = [1.15, 1.0, 0.95, 1.25, 1.05];
pub const EST_FLOOR: [f64; 3] = [1.0, 1.05, 1.1];

pub const CAL_REGION: [f64; 4] = [1.05, 1.0, 1.1, 1.0];
pub const CAL_BUILDING: [f64; 5] = [1.1, 1.0, 0.9, 1.2, 1.0];
pub const CAL_FLOOR: [f64; 3] = [1.0, 1.1, 1.2];

/// Indexed by plan status: dont_know, no, yes
pub const MECHANICAL_PLAN: [f64; 3] = [1.1, 1.2, 1.0];
pub const ELECTRICAL_PLAN: [f64; 3] = [1.05, 1.15, 1.0];
pub const PLUMBING_PLAN: [f64; 3] = [1.08, 1.12, 1.0];

/// Rows: working_days, weekends, off_hour_working_days
pub const WORKING_DAYS: [f64; 3] = [1.0, 1.4, 1.25];

/// Columns of the inspection breakdown with their seven row counts
pub const INSPECTIONS: [(&str, [u32; 7]); 10] = [
    ("5", [1, 1, 0, 0, 1, 1, 1]),
    ("7", [2, 1, 0, 1, 1, 1, 1]),
    ("9", [2, 2, 1, 1, 1, 1, 1]),
    ("9_M", [3, 2, 0, 1, 1, 1, 1]),
    ("9_P", [2, 3, 0, 1, 1, 1, 1]),
    ("11", [3, 3, 1, 1, 1, 1, 1]),
    ("11_ME", [4, 2, 1, 1, 1, 1, 1]),
    ("11_EP", [3, 2, 1, 2, 1, 1, 1]),
    ("13", [3, 3, 2, 2, 1, 1, 1]),
    ("15", [4, 4, 2, 2, 1, 1, 1]),
];

pub fn div_area_price(division: usize, project_type: usize) -> f64 {
    20.0 + 2.5 * division as f64 + project_type as f64
}

pub fn div_area_percentage(division: usize) -> f64 {
    0.01 * ((division % 3) + 1) as f64
}

pub fn area_sqft_percentage(project_type: usize, bracket: usize) -> f64 {
    0.015 * (bracket + 1) as f64 - 0.005 * project_type as f64
}

pub fn div_sqft_percentage(division: usize, bracket: usize) -> f64 {
    0.002 * (division + bracket) as f64
}

pub fn cal_area(project_type: usize, bracket: usize) -> f64 {
    20.0 + 10.0 * bracket as f64 + 3.0 * project_type as f64
}

fn single_column<'a>(rows: impl IntoIterator<Item = &'a str>, values: &[f64]) -> Table {
    let mut table = Table::default();
    for (row, value) in rows.into_iter().zip(values) {
        table.insert(row, VALUE_COLUMN, *value);
    }
    table
}

fn with_unknown<'a>(keys: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    keys.chain(std::iter::once(UNKNOWN_ROW)).collect()
}

pub fn tables() -> HashMap<String, Table> {
    let mut price = Table::default();
    let mut area_pct = Table::default();
    let mut div_sqft = Table::default();
    let mut area_sqft = Table::default();
    let mut cal_area_table = Table::default();

    for (d, division) in Division::ALL.iter().enumerate() {
        for (p, project_type) in ProjectType::ALL.iter().enumerate() {
            price.insert(division.as_str(), project_type.as_str(), div_area_price(d, p));
            area_pct.insert(division.as_str(), project_type.as_str(), div_area_percentage(d));
        }
        for (b, bracket) in CostBracket::LADDER.iter().enumerate() {
            if let Some(column) = bracket.column_key() {
                div_sqft.insert(division.as_str(), column, div_sqft_percentage(d, b));
            }
        }
    }
    for (p, project_type) in ProjectType::ALL.iter().enumerate() {
        for (b, bracket) in CostBracket::LADDER.iter().enumerate() {
            if let Some(column) = bracket.column_key() {
                area_sqft.insert(project_type.as_str(), column, area_sqft_percentage(p, b));
            }
        }
        let schedule = [
            ScheduleBracket::Sqft500,
            ScheduleBracket::Sqft1000,
            ScheduleBracket::Sqft2000,
            ScheduleBracket::Sqft3500,
            ScheduleBracket::Sqft5000,
        ];
        for (b, bracket) in schedule.iter().enumerate() {
            if let Some(column) = bracket.column_key() {
                cal_area_table.insert(project_type.as_str(), column, cal_area(p, b));
            }
        }
    }

    let mut inspections = Table::default();
    let rows = [
        "rough",
        "final",
        "grease_duct",
        "pre_health",
        "final_building",
        "fire_dept",
        "final_health",
    ];
    for (column, counts) in INSPECTIONS {
        for (row, count) in rows.iter().zip(counts) {
            inspections.insert(*row, column, f64::from(count));
        }
    }

    let regions = with_unknown(Region::ALL.iter().map(|r| r.as_str()));
    let buildings = with_unknown(BuildingType::ALL.iter().map(|b| b.as_str()));
    let floors: Vec<_> = FloorLevel::ALL.iter().map(|f| f.as_str()).collect();
    let plans: Vec<_> = PlanStatus::ALL.iter().map(|p| p.as_str()).collect();
    let working_days = ["working_days", "weekends", "off_hour_working_days"];

    let entries = [
        (TableName::DivAreaPrice, price),
        (TableName::DivAreaPercentage, area_pct),
        (TableName::DivSqftPercentage, div_sqft),
        (TableName::AreaSqftPercentage, area_sqft),
        (TableName::EstRegion, single_column(regions.clone(), &EST_REGION)),
        (TableName::EstBuildingInfo, single_column(buildings.clone(), &EST_BUILDING)),
        (TableName::EstFloorLevel, single_column(floors.clone(), &EST_FLOOR)),
        (TableName::CalArea, cal_area_table),
        (TableName::CalRegion, single_column(regions, &CAL_REGION)),
        (TableName::CalBuildingInfo, single_column(buildings, &CAL_BUILDING)),
        (TableName::CalFloorLevel, single_column(floors, &CAL_FLOOR)),
        (TableName::CalWorkingDays, single_column(working_days, &WORKING_DAYS)),
        (TableName::CalMechanicalPlan, single_column(plans.clone(), &MECHANICAL_PLAN)),
        (TableName::CalElectricalPlan, single_column(plans.clone(), &ELECTRICAL_PLAN)),
        (TableName::CalPlumbingPlan, single_column(plans, &PLUMBING_PLAN)),
        (TableName::InspectionBreakdown, inspections),
    ];
    entries
        .into_iter()
        .map(|(name, table)| (name.as_str().to_string(), table))
        .collect()
}

pub fn dataset() -> ReferenceDataset {
    ReferenceDataset::from_tables(Uuid::nil(), "synthetic", tables())
}

/// A dataset with one table removed
pub fn dataset_without(table: TableName) -> ReferenceDataset {
    let mut tables = tables();
    tables.remove(table.as_str());
    ReferenceDataset::from_tables(Uuid::nil(), "partial", tables)
}

/// Retail bid in northern California with every plan uploaded
pub fn attributes() -> ProjectAttributes {
    ProjectAttributes {
        project_type: ProjectType::Retail,
        region: Some(Region::NorthernCalifornia),
        business_type: Some(BusinessType::Owner),
        plans: PlanFlags {
            combined: PlanStatus::Yes,
            mechanical: PlanStatus::Yes,
            electrical: PlanStatus::Yes,
            plumbing: PlanStatus::Yes,
        },
    }
}

/// Highrise second-floor shell with a new storefront and new HVAC
pub fn details(square_foot: u32) -> ProjectDetails {
    ProjectDetails {
        square_foot,
        profit_margin: ProfitMargin::Three,
        workscope: Some(Workscope::TenantImprovement),
        construction_type: Some(ConstructionType::NewShell),
        building_type: Some(BuildingType::Highrise),
        floor: Some(FloorLevel::SecondFloor),
        storefront: Some(StorefrontStatus::New),
        ac_hvac_units: Some(HvacStatus::New),
        finishes: FinishLevel::Medium,
    }
}

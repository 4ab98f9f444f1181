//! Inspection count resolver

use serde::{Deserialize, Serialize};

use super::dataset::{ReferenceDataset, TableName};
use super::EstimationError;
use crate::domain::{PlanStatus, ProjectAttributes};

text_enum! {
    ordered;
    /// Rows of the inspection breakdown table.
    pub enum InspectionKind {
        Rough => "rough",
        Final => "final",
        GreaseDuct => "grease_duct",
        PreHealth => "pre_health",
        FinalBuilding => "final_building",
        FireDept => "fire_dept",
        FinalHealth => "final_health",
    }
}

/// Expected inspections for a bid, broken down by kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionBreakdown {
    pub total_inspections: u32,
    pub rough_inspections: u32,
    pub final_inspections: u32,
    pub grease_duct_inspections: u32,
    pub pre_health_inspections: u32,
    pub final_building_inspections: u32,
    pub fire_dept_inspections: u32,
    pub final_health_inspections: u32,
}

impl InspectionBreakdown {
    pub fn get(&self, kind: InspectionKind) -> u32 {
        match kind {
            InspectionKind::Rough => self.rough_inspections,
            InspectionKind::Final => self.final_inspections,
            InspectionKind::GreaseDuct => self.grease_duct_inspections,
            InspectionKind::PreHealth => self.pre_health_inspections,
            InspectionKind::FinalBuilding => self.final_building_inspections,
            InspectionKind::FireDept => self.fire_dept_inspections,
            InspectionKind::FinalHealth => self.final_health_inspections,
        }
    }

    fn slot_mut(&mut self, kind: InspectionKind) -> &mut u32 {
        match kind {
            InspectionKind::Rough => &mut self.rough_inspections,
            InspectionKind::Final => &mut self.final_inspections,
            InspectionKind::GreaseDuct => &mut self.grease_duct_inspections,
            InspectionKind::PreHealth => &mut self.pre_health_inspections,
            InspectionKind::FinalBuilding => &mut self.final_building_inspections,
            InspectionKind::FireDept => &mut self.fire_dept_inspections,
            InspectionKind::FinalHealth => &mut self.final_health_inspections,
        }
    }
}

/// Total inspection count implied by project type and trade plans.
pub fn total_inspections(attributes: &ProjectAttributes) -> u32 {
    let restaurant = attributes.is_restaurant();
    let plans = attributes.plans;
    let trade_deduction = if restaurant { 4 } else { 2 };

    let mut total = if restaurant { 15 } else { 11 };
    if plans.electrical != PlanStatus::Yes {
        total -= 2;
    }
    if plans.mechanical == PlanStatus::No {
        total -= trade_deduction;
    }
    if plans.plumbing == PlanStatus::No {
        total -= trade_deduction;
    }
    total
}

/// Breakdown column for a total. Restaurants with 9 or 11 inspections
/// split by which trade plan is in.
pub fn breakdown_column(attributes: &ProjectAttributes, total: u32) -> String {
    let mechanical = attributes.plans.mechanical == PlanStatus::Yes;
    let suffix = match (attributes.is_restaurant(), total) {
        (true, 9) if mechanical => "_M",
        (true, 9) => "_P",
        (true, 11) if mechanical => "_ME",
        (true, 11) => "_EP",
        _ => "",
    };
    format!("{total}{suffix}")
}

fn as_count(row: &str, column: &str, value: f64) -> Result<u32, EstimationError> {
    if value.fract() != 0.0 || !(0.0..=f64::from(u32::MAX)).contains(&value) {
        return Err(EstimationError::NotACount {
            table: TableName::InspectionBreakdown.as_str(),
            row: row.to_string(),
            column: column.to_string(),
            value,
        });
    }
    Ok(value as u32)
}

pub fn resolve_inspections(
    dataset: &ReferenceDataset,
    attributes: &ProjectAttributes,
) -> Result<InspectionBreakdown, EstimationError> {
    let total = total_inspections(attributes);
    let column = breakdown_column(attributes, total);
    if !dataset.table(TableName::InspectionBreakdown)?.has_column(&column) {
        return Err(EstimationError::MissingInspectionColumn(column));
    }

    let mut breakdown = InspectionBreakdown {
        total_inspections: total,
        ..Default::default()
    };
    for kind in InspectionKind::ALL {
        let value = dataset.lookup(TableName::InspectionBreakdown, kind.as_str(), &column)?;
        *breakdown.slot_mut(*kind) = as_count(kind.as_str(), &column, value)?;
    }
    Ok(breakdown)
}

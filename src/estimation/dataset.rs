//! Reference dataset
//!
//! A dataset is a JSON document of named tables, each a two-level map of
//! row key to column key to number:
//!
//! ```text
//! {
//!   "name": "values-2020-12",
//!   "tables": {
//!     "Div_Area_Price": { "division_1": { "retail": 9.5, "restaurant": 12.0 } },
//!     "EST_Region_Value": { "northern_california": { "value": 1.1 } }
//!   }
//! }
//! ```
//!
//! Single-column factor tables keep their number under the `value` column.
//! A dataset is parsed once and never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use super::EstimationError;

/// Column key of single-column factor tables
pub const VALUE_COLUMN: &str = "value";

/// Row key used when an optional attribute was not supplied
pub const UNKNOWN_ROW: &str = "unknown";

text_enum! {
    ordered;
    /// Tables the estimator reads.
    pub enum TableName {
        DivAreaPrice => "Div_Area_Price",
        DivAreaPercentage => "Div_Area_Percentage",
        DivSqftPercentage => "Div_Sqft_Percentage",
        AreaSqftPercentage => "Area_Sqft_Percentage",
        EstRegion => "EST_Region_Value",
        EstBuildingInfo => "EST_Building_Info_Value",
        EstFloorLevel => "EST_Floor_Level_Value",
        CalArea => "CAL_Area_Value",
        CalRegion => "CAL_Region_Value",
        CalBuildingInfo => "CAL_Building_Info_Value",
        CalFloorLevel => "CAL_Floor_Level_Value",
        CalWorkingDays => "CAL_Working_Days",
        CalMechanicalPlan => "CAL_M_Plan",
        CalElectricalPlan => "CAL_E_Plan",
        CalPlumbingPlan => "CAL_P_Plan",
        InspectionBreakdown => "Inspection_Breakdown",
    }
}

/// One named table: row key -> column key -> value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Table {
    rows: HashMap<String, HashMap<String, f64>>,
}

impl Table {
    pub fn get(&self, row: &str, column: &str) -> Option<f64> {
        self.rows.get(row)?.get(column).copied()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.rows.values().any(|row| row.contains_key(column))
    }

    #[cfg(test)]
    pub fn insert(&mut self, row: impl Into<String>, column: impl Into<String>, value: f64) {
        self.rows
            .entry(row.into())
            .or_default()
            .insert(column.into(), value);
    }
}

#[derive(Debug, Deserialize)]
struct DatasetDocument {
    #[serde(default)]
    name: Option<String>,
    tables: HashMap<String, Table>,
}

/// Immutable, id-keyed multi-table numeric source
#[derive(Debug, Clone)]
pub struct ReferenceDataset {
    id: Uuid,
    name: String,
    tables: HashMap<String, Table>,
}

impl ReferenceDataset {
    /// Parse a stored dataset document.
    pub fn from_slice(id: Uuid, bytes: &[u8]) -> Result<Self, EstimationError> {
        let document: DatasetDocument = serde_json::from_slice(bytes)?;
        let name = document.name.unwrap_or_else(|| id.to_string());
        Ok(Self::from_tables(id, name, document.tables))
    }

    pub fn from_tables(id: Uuid, name: impl Into<String>, tables: HashMap<String, Table>) -> Self {
        Self {
            id,
            name: name.into(),
            tables,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Tables the estimator reads that this dataset lacks
    pub fn missing_tables(&self) -> Vec<&'static str> {
        TableName::ALL
            .iter()
            .map(|t| t.as_str())
            .filter(|t| !self.tables.contains_key(*t))
            .collect()
    }

    pub fn table(&self, name: TableName) -> Result<&Table, EstimationError> {
        self.tables
            .get(name.as_str())
            .ok_or(EstimationError::MissingTable(name.as_str()))
    }

    /// Look up one cell. A missing cell is an error, never zero.
    pub fn lookup(&self, name: TableName, row: &str, column: &str) -> Result<f64, EstimationError> {
        self.table(name)?
            .get(row, column)
            .ok_or_else(|| EstimationError::MissingEntry {
                table: name.as_str(),
                row: row.to_string(),
                column: column.to_string(),
            })
    }

    /// Look up a single-column factor table.
    pub fn factor(&self, name: TableName, row: &str) -> Result<f64, EstimationError> {
        self.lookup(name, row, VALUE_COLUMN)
    }

    /// Look up a factor keyed by an optional attribute, falling back to the
    /// reserved unknown row.
    pub fn factor_or_unknown(
        &self,
        name: TableName,
        row: Option<&str>,
    ) -> Result<f64, EstimationError> {
        self.factor(name, row.unwrap_or(UNKNOWN_ROW))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_document() {
        let bytes = br#"{
            "name": "values-2020-12",
            "tables": {
                "EST_Region_Value": {
                    "northern_california": { "value": 1.5 },
                    "unknown": { "value": 1.0 }
                },
                "Inspection_Breakdown": {
                    "rough": { "5": 1, "9_M": 3 }
                }
            }
        }"#;

        let dataset = ReferenceDataset::from_slice(Uuid::new_v4(), bytes).unwrap();
        assert_eq!(dataset.name(), "values-2020-12");
        assert_eq!(dataset.table_count(), 2);
        assert_eq!(dataset.missing_tables().len(), TableName::ALL.len() - 2);
        assert!(!dataset.missing_tables().contains(&"Inspection_Breakdown"));
        assert_eq!(
            dataset.factor(TableName::EstRegion, "northern_california").unwrap(),
            1.5
        );
        assert_eq!(dataset.factor_or_unknown(TableName::EstRegion, None).unwrap(), 1.0);
        assert_eq!(
            dataset
                .lookup(TableName::InspectionBreakdown, "rough", "9_M")
                .unwrap(),
            3.0
        );
    }

    #[test]
    fn test_missing_lookups_are_errors() {
        let id = Uuid::new_v4();
        let dataset = ReferenceDataset::from_slice(id, br#"{"tables": {"CAL_M_Plan": {"yes": {"value": 0}}}}"#)
            .unwrap();
        assert_eq!(dataset.name(), id.to_string());

        // A stored zero is a value, not a miss
        assert_eq!(dataset.factor(TableName::CalMechanicalPlan, "yes").unwrap(), 0.0);

        assert!(matches!(
            dataset.factor(TableName::CalMechanicalPlan, "no"),
            Err(EstimationError::MissingEntry { table: "CAL_M_Plan", .. })
        ));
        assert!(matches!(
            dataset.factor(TableName::CalElectricalPlan, "no"),
            Err(EstimationError::MissingTable("CAL_E_Plan"))
        ));
    }

    #[test]
    fn test_complete_dataset_has_every_table() {
        let dataset = crate::estimation::fixtures::dataset();
        assert!(dataset.missing_tables().is_empty());
        assert_eq!(dataset.table_count(), TableName::ALL.len());
    }

    #[test]
    fn test_malformed_document() {
        let result = ReferenceDataset::from_slice(Uuid::new_v4(), b"PK\x03\x04not json");
        assert!(matches!(result, Err(EstimationError::MalformedDataset(_))));
    }
}

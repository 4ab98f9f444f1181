use thiserror::Error;

/// Failures raised while reading the reference dataset.
///
/// Every variant means the dataset is missing or malformed for the requested
/// inputs. None of them is caller-fixable.
#[derive(Debug, Error)]
pub enum EstimationError {
    #[error("reference dataset is not a valid document: {0}")]
    MalformedDataset(#[from] serde_json::Error),

    #[error("reference dataset has no table '{0}'")]
    MissingTable(&'static str),

    #[error("table '{table}' has no value at row '{row}', column '{column}'")]
    MissingEntry {
        table: &'static str,
        row: String,
        column: String,
    },

    #[error("reference dataset {0} does not exist")]
    MissingDataset(uuid::Uuid),

    #[error("inspection breakdown has no column '{0}'")]
    MissingInspectionColumn(String),

    #[error("table '{table}' holds {value} at row '{row}', column '{column}', expected a whole count")]
    NotACount {
        table: &'static str,
        row: String,
        column: String,
        value: f64,
    },
}

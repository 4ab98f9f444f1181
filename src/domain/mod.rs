//! Domain types and DTOs
//!
//! Bid attributes, project details and the request/response shapes built
//! around the estimation engine.

use thiserror::Error;

pub mod bids;
pub mod datasets;
pub mod details;
pub mod estimates;
pub mod pricing;

// Re-export commonly used types
pub use bids::*;
pub use datasets::*;
pub use details::*;
pub use estimates::*;
pub use pricing::*;

/// Parse an optional stored text column.
pub fn parse_optional<T>(value: Option<&str>) -> Result<Option<T>, UnknownVariant>
where
    T: std::str::FromStr<Err = UnknownVariant>,
{
    value.map(str::parse).transpose()
}

/// A stored or submitted text value that names no known variant.
#[derive(Debug, Clone, Error)]
#[error("unknown {kind} value '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

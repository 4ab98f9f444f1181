//! Estimate response types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::estimation::{Estimate, TieredEstimate};

/// Stored estimate for a bid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateResponse {
    pub bid_id: Uuid,
    #[serde(flatten)]
    pub estimate: Estimate,
    pub computed_at: DateTime<Utc>,
}

/// Estimate figures under the bid's selected pricing tier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TieredEstimateResponse {
    pub bid_id: Uuid,
    #[serde(flatten)]
    pub view: TieredEstimate,
    pub computed_at: DateTime<Utc>,
}

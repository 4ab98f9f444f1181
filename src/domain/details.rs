//! Project details domain types
//!
//! The building characteristics a bidder supplies once per bid. Details are
//! saved independently of the estimate; changing them does not recompute it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

text_enum! {
    pub enum Workscope {
        GroundUp => "ground_up",
        TenantImprovement => "tenant_improvement",
    }
}

text_enum! {
    pub enum ConstructionType {
        NewShell => "new_shell",
        RenovationWithDemolition => "renovation_with_demolition",
    }
}

text_enum! {
    ordered(test);
    pub enum BuildingType {
        InsideMall => "inside_mall",
        StripCenter => "strip_center",
        StandaloneBuilding => "standalone_bldg",
        Highrise => "highrise",
    }
}

text_enum! {
    ordered(test);
    pub enum FloorLevel {
        FirstFloor => "first_floor",
        SecondFloor => "second_floor",
        ThirdOrHigher => "third_or_higher",
    }
}

text_enum! {
    /// Storefront system: reuse the existing one or install a new one.
    pub enum StorefrontStatus {
        Existing => "existing",
        New => "new",
    }
}

text_enum! {
    pub enum HvacStatus {
        Existing => "existing",
        New => "new",
    }
}

text_enum! {
    pub enum FinishLevel {
        Basic => "basic",
        Medium => "medium",
        Highend => "highend",
    }
}

text_enum! {
    /// Profit margin percentage offered on top of the division costs.
    pub enum ProfitMargin {
        Zero => "0",
        Three => "3",
        Five => "5",
        Seven => "7",
        Ten => "10",
    }
}

impl ProfitMargin {
    pub fn fraction(&self) -> f64 {
        match self {
            Self::Zero => 0.0,
            Self::Three => 0.03,
            Self::Five => 0.05,
            Self::Seven => 0.07,
            Self::Ten => 0.1,
        }
    }
}

/// Project details as consumed by the estimator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDetails {
    pub square_foot: u32,
    pub profit_margin: ProfitMargin,
    #[serde(default)]
    pub workscope: Option<Workscope>,
    #[serde(default)]
    pub construction_type: Option<ConstructionType>,
    #[serde(default)]
    pub building_type: Option<BuildingType>,
    #[serde(default)]
    pub floor: Option<FloorLevel>,
    #[serde(default)]
    pub storefront: Option<StorefrontStatus>,
    #[serde(default)]
    pub ac_hvac_units: Option<HvacStatus>,
    pub finishes: FinishLevel,
}

impl ProjectDetails {
    pub fn square_feet(&self) -> f64 {
        f64::from(self.square_foot)
    }

    /// Reject details the estimator cannot divide by.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.square_foot == 0 {
            return Err("square_foot must be greater than zero");
        }
        if i32::try_from(self.square_foot).is_err() {
            return Err("square_foot is too large");
        }
        Ok(())
    }
}

/// Response DTO for project details
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectDetailsResponse {
    pub bid_id: Uuid,
    #[serde(flatten)]
    pub details: ProjectDetails,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profit_margin_keys() {
        let margin: ProfitMargin = serde_json::from_value(serde_json::json!("7")).unwrap();
        assert_eq!(margin, ProfitMargin::Seven);
        assert_eq!(margin.fraction(), 0.07);
        assert!(serde_json::from_value::<ProfitMargin>(serde_json::json!("8")).is_err());
        assert_eq!("10".parse::<ProfitMargin>().unwrap().fraction(), 0.1);
    }

    #[test]
    fn test_optional_fields_default_to_none() {
        let details: ProjectDetails = serde_json::from_value(serde_json::json!({
            "square_foot": 1744,
            "profit_margin": "0",
            "floor": "first_floor",
            "finishes": "highend"
        }))
        .unwrap();

        assert_eq!(details.building_type, None);
        assert_eq!(details.storefront, None);
        assert_eq!(details.floor, Some(FloorLevel::FirstFloor));
        assert!(details.validate().is_ok());
    }

    #[test]
    fn test_zero_square_feet_is_rejected() {
        let details = ProjectDetails {
            square_foot: 0,
            profit_margin: ProfitMargin::Zero,
            workscope: None,
            construction_type: None,
            building_type: None,
            floor: None,
            storefront: None,
            ac_hvac_units: None,
            finishes: FinishLevel::Medium,
        };
        assert!(details.validate().is_err());
    }
}

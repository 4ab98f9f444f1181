use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UnknownVariant;

text_enum! {
    ordered(test);
    /// Kind of tenant the project is built for. Selects the project-type
    /// column of every area-keyed reference table.
    pub enum ProjectType {
        Retail => "retail",
        Restaurant => "restaurant",
        OfficeSpace => "office_space",
        MedicalClinic => "medical_clinic",
        GymFitnessCenter => "gym_fitness_center",
    }
}

text_enum! {
    ordered(test);
    pub enum Region {
        NorthernCalifornia => "northern_california",
        CentralCalifornia => "central_california",
        SouthernCalifornia => "southern_california",
    }
}

text_enum! {
    pub enum BusinessType {
        Owner => "owner",
        GeneralContractor => "gencon",
        SubContractor => "subcon",
    }
}

text_enum! {
    /// Whether the bidder has plans to attach to the bid.
    pub enum PlansUploaded {
        NoUpload => "no_upload",
        WillUpload => "will_upload",
        Uploaded => "uploaded",
    }
}

text_enum! {
    ordered(test);
    /// Readiness of one trade's design plans.
    pub enum PlanStatus {
        DontKnow => "dont_know",
        No => "no",
        Yes => "yes",
    }
}

impl Default for PlanStatus {
    fn default() -> Self {
        Self::DontKnow
    }
}

/// Plan-readiness flags for the combined set and each trade
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanFlags {
    #[serde(default)]
    pub combined: PlanStatus,
    #[serde(default)]
    pub mechanical: PlanStatus,
    #[serde(default)]
    pub electrical: PlanStatus,
    #[serde(default)]
    pub plumbing: PlanStatus,
}

impl PlanFlags {
    pub const NONE_UPLOADED: PlanFlags = PlanFlags {
        combined: PlanStatus::No,
        mechanical: PlanStatus::No,
        electrical: PlanStatus::No,
        plumbing: PlanStatus::No,
    };

    /// A bid that will never upload plans has no trade plans either.
    pub fn normalized(self, plans_uploaded: PlansUploaded) -> Self {
        match plans_uploaded {
            PlansUploaded::NoUpload => Self::NONE_UPLOADED,
            _ => self,
        }
    }
}

/// Bid-level inputs to the estimator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectAttributes {
    pub project_type: ProjectType,
    pub region: Option<Region>,
    pub business_type: Option<BusinessType>,
    pub plans: PlanFlags,
}

impl ProjectAttributes {
    pub fn is_restaurant(&self) -> bool {
        self.project_type == ProjectType::Restaurant
    }
}

/// Bid entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bid {
    pub id: Uuid,
    pub name: String,
    pub plans_uploaded: PlansUploaded,
    pub attributes: ProjectAttributes,
    /// Reference dataset bound when the bid was created
    pub dataset_id: Uuid,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request DTO for creating a bid
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBidRequest {
    pub name: String,
    pub project_type: ProjectType,
    #[serde(default)]
    pub region: Option<Region>,
    #[serde(default)]
    pub business_type: Option<BusinessType>,
    pub plans_uploaded: PlansUploaded,
    #[serde(default)]
    pub plans: PlanFlags,
}

impl CreateBidRequest {
    pub fn attributes(&self) -> ProjectAttributes {
        ProjectAttributes {
            project_type: self.project_type,
            region: self.region,
            business_type: self.business_type,
            plans: self.plans.normalized(self.plans_uploaded),
        }
    }
}

/// Request DTO for updating a bid
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBidRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub project_type: Option<ProjectType>,
    #[serde(default)]
    pub region: Option<Region>,
    #[serde(default)]
    pub business_type: Option<BusinessType>,
    #[serde(default)]
    pub plans_uploaded: Option<PlansUploaded>,
    #[serde(default)]
    pub plans: Option<PlanFlags>,
}

impl Bid {
    /// Merge an update into this bid, re-applying plan normalization.
    pub fn apply(&mut self, update: UpdateBidRequest) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(project_type) = update.project_type {
            self.attributes.project_type = project_type;
        }
        if update.region.is_some() {
            self.attributes.region = update.region;
        }
        if update.business_type.is_some() {
            self.attributes.business_type = update.business_type;
        }
        if let Some(plans_uploaded) = update.plans_uploaded {
            self.plans_uploaded = plans_uploaded;
        }
        if let Some(plans) = update.plans {
            self.attributes.plans = plans;
        }
        self.attributes.plans = self.attributes.plans.normalized(self.plans_uploaded);
    }
}

/// Response DTO for bid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BidResponse {
    pub id: Uuid,
    pub name: String,
    pub project_type: ProjectType,
    pub region: Option<Region>,
    pub business_type: Option<BusinessType>,
    pub plans_uploaded: PlansUploaded,
    pub plans: PlanFlags,
    pub dataset_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Bid> for BidResponse {
    fn from(b: Bid) -> Self {
        Self {
            id: b.id,
            name: b.name,
            project_type: b.attributes.project_type,
            region: b.attributes.region,
            business_type: b.attributes.business_type,
            plans_uploaded: b.plans_uploaded,
            plans: b.attributes.plans,
            dataset_id: b.dataset_id,
            created_at: b.created_at,
            updated_at: b.updated_at,
        }
    }
}

text_enum! {
    /// Column a bid listing is ordered by.
    pub enum BidSortKey {
        Created => "created",
        Name => "name",
        Cost => "cost",
    }
}

text_enum! {
    pub enum SortDirection {
        Asc => "asc",
        Desc => "desc",
    }
}

/// Listing order, written `"<key> [asc|desc]"` in the `sort` query
/// parameter. Newest first when absent; the direction defaults to
/// descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BidSort {
    pub key: BidSortKey,
    pub direction: SortDirection,
}

impl Default for BidSort {
    fn default() -> Self {
        Self {
            key: BidSortKey::Created,
            direction: SortDirection::Desc,
        }
    }
}

impl std::str::FromStr for BidSort {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_ascii_lowercase();
        let mut parts = lowered.split_whitespace();
        let Some(key) = parts.next() else {
            return Ok(Self::default());
        };
        let sort = Self {
            key: key.parse()?,
            direction: parts.next().map(str::parse).transpose()?.unwrap_or(SortDirection::Desc),
        };
        if parts.next().is_some() {
            return Err(UnknownVariant {
                kind: "BidSort",
                value: s.to_string(),
            });
        }
        Ok(sort)
    }
}

/// Query parameters of the bid listing besides pagination
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BidListQuery {
    #[serde(default)]
    pub sort: Option<String>,
}

impl BidListQuery {
    pub fn sort(&self) -> Result<BidSort, UnknownVariant> {
        self.sort.as_deref().map(str::parse).transpose().map(Option::unwrap_or_default)
    }
}

/// One row of the bid listing, with the stored estimate's total if any
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BidSummary {
    pub id: Uuid,
    pub name: String,
    pub project_type: ProjectType,
    pub total_cost: Option<f64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BidCountResponse {
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bid() -> Bid {
        Bid {
            id: Uuid::new_v4(),
            name: "Main St retail".to_string(),
            plans_uploaded: PlansUploaded::Uploaded,
            attributes: ProjectAttributes {
                project_type: ProjectType::Retail,
                region: Some(Region::NorthernCalifornia),
                business_type: Some(BusinessType::Owner),
                plans: PlanFlags {
                    combined: PlanStatus::Yes,
                    mechanical: PlanStatus::Yes,
                    electrical: PlanStatus::Yes,
                    plumbing: PlanStatus::Yes,
                },
            },
            dataset_id: Uuid::new_v4(),
            deleted: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_no_upload_forces_plans_to_no() {
        let req: CreateBidRequest = serde_json::from_value(serde_json::json!({
            "name": "Shell",
            "project_type": "restaurant",
            "plans_uploaded": "no_upload",
            "plans": { "combined": "yes", "mechanical": "yes", "electrical": "dont_know", "plumbing": "yes" }
        }))
        .unwrap();

        assert_eq!(req.attributes().plans, PlanFlags::NONE_UPLOADED);
        assert_eq!(req.attributes().region, None);
    }

    #[test]
    fn test_update_reapplies_normalization() {
        let mut bid = sample_bid();
        bid.apply(UpdateBidRequest {
            plans_uploaded: Some(PlansUploaded::NoUpload),
            ..Default::default()
        });
        assert_eq!(bid.attributes.plans, PlanFlags::NONE_UPLOADED);

        bid.apply(UpdateBidRequest {
            plans_uploaded: Some(PlansUploaded::WillUpload),
            plans: Some(PlanFlags {
                mechanical: PlanStatus::Yes,
                ..Default::default()
            }),
            ..Default::default()
        });
        assert_eq!(bid.attributes.plans.mechanical, PlanStatus::Yes);
        assert_eq!(bid.attributes.plans.electrical, PlanStatus::DontKnow);
    }

    #[test]
    fn test_text_round_trip() {
        for project_type in ProjectType::ALL {
            assert_eq!(project_type.as_str().parse::<ProjectType>().unwrap(), *project_type);
        }
        assert!("warehouse".parse::<ProjectType>().is_err());
        assert_eq!(PlanStatus::DontKnow.to_string(), "dont_know");
    }

    #[test]
    fn test_sort_parsing() {
        assert_eq!("".parse::<BidSort>().unwrap(), BidSort::default());
        assert_eq!(
            "cost ASC".parse::<BidSort>().unwrap(),
            BidSort {
                key: BidSortKey::Cost,
                direction: SortDirection::Asc,
            }
        );
        assert_eq!(
            "name".parse::<BidSort>().unwrap(),
            BidSort {
                key: BidSortKey::Name,
                direction: SortDirection::Desc,
            }
        );
        assert!("location asc".parse::<BidSort>().is_err());
        assert!("cost sideways".parse::<BidSort>().is_err());
        assert!("cost asc extra".parse::<BidSort>().is_err());
    }

    #[test]
    fn test_list_query_sort_defaults_to_newest_first() {
        assert_eq!(BidListQuery::default().sort().unwrap(), BidSort::default());
        let query = BidListQuery {
            sort: Some("created asc".to_string()),
        };
        assert_eq!(query.sort().unwrap().direction, SortDirection::Asc);
    }
}

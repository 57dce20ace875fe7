//! Partial updates produced by edit forms and status toggles.
//!
//! `None` means "leave unchanged". The same structs are sent as the `updates`
//! object of the webhook update requests.

use serde::Serialize;

use super::{Ad, AdSet, Campaign, EntityStatus, EntityType};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CampaignPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EntityStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_budget: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lifetime_budget: Option<f64>,
}

impl CampaignPatch {
    pub fn apply_to(&self, campaign: &mut Campaign) {
        if let Some(name) = &self.name {
            campaign.name = name.clone();
        }
        if let Some(status) = self.status {
            campaign.status = status;
        }
        if let Some(budget) = self.daily_budget {
            campaign.daily_budget = Some(budget);
        }
        if let Some(budget) = self.lifetime_budget {
            campaign.lifetime_budget = Some(budget);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AdSetPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EntityStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_budget: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bid_amount: Option<f64>,
}

impl AdSetPatch {
    pub fn apply_to(&self, adset: &mut AdSet) {
        if let Some(name) = &self.name {
            adset.name = name.clone();
        }
        if let Some(status) = self.status {
            adset.status = status;
        }
        if let Some(budget) = self.daily_budget {
            adset.daily_budget = Some(budget);
        }
        if let Some(bid) = self.bid_amount {
            adset.bid_amount = Some(bid);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AdPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EntityStatus>,
}

impl AdPatch {
    pub fn apply_to(&self, ad: &mut Ad) {
        if let Some(name) = &self.name {
            ad.name = name.clone();
        }
        if let Some(status) = self.status {
            ad.status = status;
        }
    }
}

/// A patch addressed to one entity.
/// An editable field of a campaign, ad set or ad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatchField {
    Name,
    Status,
    DailyBudget,
    LifetimeBudget,
    BidAmount,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntityPatch {
    Campaign { id: String, patch: CampaignPatch },
    AdSet { id: String, patch: AdSetPatch },
    Ad { id: String, patch: AdPatch },
}

impl EntityPatch {
    pub fn status(entity: EntityType, id: impl Into<String>, status: EntityStatus) -> Self {
        let id = id.into();
        match entity {
            EntityType::Campaign => Self::Campaign {
                id,
                patch: CampaignPatch {
                    status: Some(status),
                    ..Default::default()
                },
            },
            EntityType::AdSet => Self::AdSet {
                id,
                patch: AdSetPatch {
                    status: Some(status),
                    ..Default::default()
                },
            },
            EntityType::Ad => Self::Ad {
                id,
                patch: AdPatch {
                    status: Some(status),
                    ..Default::default()
                },
            },
        }
    }

    pub fn entity_type(&self) -> EntityType {
        match self {
            Self::Campaign { .. } => EntityType::Campaign,
            Self::AdSet { .. } => EntityType::AdSet,
            Self::Ad { .. } => EntityType::Ad,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Campaign { id, .. } | Self::AdSet { id, .. } | Self::Ad { id, .. } => id,
        }
    }

    /// Fields this patch writes.
    pub fn fields(&self) -> Vec<PatchField> {
        let touched = match self {
            Self::Campaign { patch, .. } => [
                (PatchField::Name, patch.name.is_some()),
                (PatchField::Status, patch.status.is_some()),
                (PatchField::DailyBudget, patch.daily_budget.is_some()),
                (PatchField::LifetimeBudget, patch.lifetime_budget.is_some()),
                (PatchField::BidAmount, false),
            ],
            Self::AdSet { patch, .. } => [
                (PatchField::Name, patch.name.is_some()),
                (PatchField::Status, patch.status.is_some()),
                (PatchField::DailyBudget, patch.daily_budget.is_some()),
                (PatchField::LifetimeBudget, false),
                (PatchField::BidAmount, patch.bid_amount.is_some()),
            ],
            Self::Ad { patch, .. } => [
                (PatchField::Name, patch.name.is_some()),
                (PatchField::Status, patch.status.is_some()),
                (PatchField::DailyBudget, false),
                (PatchField::LifetimeBudget, false),
                (PatchField::BidAmount, false),
            ],
        };
        touched
            .into_iter()
            .filter_map(|(field, set)| set.then_some(field))
            .collect()
    }
}

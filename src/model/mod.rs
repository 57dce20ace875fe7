use serde::{Deserialize, Serialize};

pub mod connection;
pub mod filters;
pub mod patch;
pub mod recommendation;
pub mod tree;

pub use connection::{
    AccessMode, AdAccount, Business, ConnectableAssets, ConnectionPayload, InstagramAccount, Page,
};
pub use filters::{DashboardFilters, DatePreset, DateRange, FiltersPatch, Platform};
pub use patch::{AdPatch, AdSetPatch, CampaignPatch, EntityPatch, PatchField};
pub use recommendation::{
    Impact, Priority, Recommendation, RecommendationState, RecommendationType, SuggestedAction,
};
pub use tree::{build_campaign_tree, AdSetNode, CampaignNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityStatus {
    Active,
    Paused,
    Deleted,
    Archived,
}

impl EntityStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Paused => "PAUSED",
            Self::Deleted => "DELETED",
            Self::Archived => "ARCHIVED",
        }
    }

    /// ACTIVE pauses; every other status re-activates.
    pub fn toggled(self) -> Self {
        match self {
            Self::Active => Self::Paused,
            _ => Self::Active,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Paused => "Paused",
            Self::Deleted => "Deleted",
            Self::Archived => "Archived",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityType {
    Campaign,
    AdSet,
    Ad,
}

impl EntityType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Campaign => "CAMPAIGN",
            Self::AdSet => "ADSET",
            Self::Ad => "AD",
        }
    }

    /// Lowercase name used by the bulk-status endpoint.
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Campaign => "campaign",
            Self::AdSet => "adset",
            Self::Ad => "ad",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Insights {
    #[serde(default)]
    pub spend: f64,
    #[serde(default)]
    pub impressions: u64,
    #[serde(default)]
    pub clicks: u64,
    #[serde(default)]
    pub ctr: f64,
    #[serde(default)]
    pub cpc: f64,
    #[serde(default)]
    pub cpm: f64,
    #[serde(default)]
    pub reach: u64,
    #[serde(default)]
    pub frequency: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversions: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversion_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roas: Option<f64>,
    #[serde(default)]
    pub date_start: String,
    #[serde(default)]
    pub date_stop: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdSetInsights {
    #[serde(flatten)]
    pub base: Insights,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_per_result: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_rate: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdInsights {
    #[serde(flatten)]
    pub adset: AdSetInsights,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_views: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_p25_watched: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_p50_watched: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_p75_watched: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_p100_watched: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: String,
    pub name: String,
    pub status: EntityStatus,
    #[serde(default)]
    pub objective: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_budget: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifetime_budget: Option<f64>,
    #[serde(default)]
    pub created_time: String,
    #[serde(default)]
    pub updated_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insights: Option<Insights>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamedRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub key: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoLocations {
    #[serde(default)]
    pub countries: Vec<String>,
    #[serde(default)]
    pub cities: Vec<City>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Targeting {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_min: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_max: Option<u32>,
    #[serde(default)]
    pub genders: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo_locations: Option<GeoLocations>,
    #[serde(default)]
    pub interests: Vec<NamedRef>,
    #[serde(default)]
    pub behaviors: Vec<NamedRef>,
    #[serde(default)]
    pub custom_audiences: Vec<NamedRef>,
}

impl Targeting {
    /// Human-readable (label, value) pairs for the read-only targeting summary.
    pub fn summary(&self) -> Vec<(&'static str, String)> {
        let mut lines = Vec::new();
        if let (Some(min), Some(max)) = (self.age_min, self.age_max) {
            lines.push(("Age", format!("{min} - {max}")));
        }
        if !self.genders.is_empty() {
            let genders: Vec<&str> = self
                .genders
                .iter()
                .map(|gender| match gender {
                    1 => "Male",
                    2 => "Female",
                    _ => "Unknown",
                })
                .collect();
            lines.push(("Genders", genders.join(", ")));
        }
        if let Some(geo) = &self.geo_locations {
            if !geo.countries.is_empty() {
                lines.push(("Countries", geo.countries.join(", ")));
            }
            if !geo.cities.is_empty() {
                let cities: Vec<&str> = geo.cities.iter().map(|city| city.name.as_str()).collect();
                lines.push(("Cities", cities.join(", ")));
            }
        }
        for (label, refs) in [
            ("Interests", &self.interests),
            ("Behaviors", &self.behaviors),
            ("Custom audiences", &self.custom_audiences),
        ] {
            if !refs.is_empty() {
                let names: Vec<&str> = refs.iter().map(|item| item.name.as_str()).collect();
                lines.push((label, names.join(", ")));
            }
        }
        lines
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdSet {
    pub id: String,
    pub campaign_id: String,
    pub name: String,
    pub status: EntityStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_budget: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifetime_budget: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targeting: Option<Targeting>,
    #[serde(default)]
    pub optimization_goal: String,
    #[serde(default)]
    pub billing_event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bid_amount: Option<f64>,
    #[serde(default)]
    pub created_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insights: Option<AdSetInsights>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Creative {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_to_action_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ad {
    pub id: String,
    pub adset_id: String,
    pub name: String,
    pub status: EntityStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creative: Option<Creative>,
    #[serde(default)]
    pub created_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insights: Option<AdInsights>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
}

/// Shared surface of the three hierarchy levels.
pub trait Entity {
    const KIND: EntityType;

    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn status(&self) -> EntityStatus;
    fn set_status(&mut self, status: EntityStatus);
    fn base_insights(&self) -> Option<&Insights>;
}

impl Entity for Campaign {
    const KIND: EntityType = EntityType::Campaign;

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn status(&self) -> EntityStatus {
        self.status
    }

    fn set_status(&mut self, status: EntityStatus) {
        self.status = status;
    }

    fn base_insights(&self) -> Option<&Insights> {
        self.insights.as_ref()
    }
}

impl Entity for AdSet {
    const KIND: EntityType = EntityType::AdSet;

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn status(&self) -> EntityStatus {
        self.status
    }

    fn set_status(&mut self, status: EntityStatus) {
        self.status = status;
    }

    fn base_insights(&self) -> Option<&Insights> {
        self.insights.as_ref().map(|insights| &insights.base)
    }
}

impl Entity for Ad {
    const KIND: EntityType = EntityType::Ad;

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn status(&self) -> EntityStatus {
        self.status
    }

    fn set_status(&mut self, status: EntityStatus) {
        self.status = status;
    }

    fn base_insights(&self) -> Option<&Insights> {
        self.insights.as_ref().map(|insights| &insights.adset.base)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardMetrics {
    #[serde(rename = "totalSpend")]
    pub total_spend: f64,
    #[serde(rename = "totalImpressions")]
    pub total_impressions: u64,
    #[serde(rename = "totalClicks")]
    pub total_clicks: u64,
    #[serde(rename = "totalConversions")]
    pub total_conversions: u64,
    #[serde(rename = "averageCTR")]
    pub average_ctr: f64,
    #[serde(rename = "averageCPC")]
    pub average_cpc: f64,
    #[serde(rename = "averageROAS")]
    pub average_roas: f64,
    #[serde(rename = "spendChange", default)]
    pub spend_change: f64,
    #[serde(rename = "impressionsChange", default)]
    pub impressions_change: f64,
    #[serde(rename = "clicksChange", default)]
    pub clicks_change: f64,
    #[serde(rename = "conversionsChange", default)]
    pub conversions_change: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FatiguedAd {
    pub ad_id: String,
    pub ad_name: String,
    pub fatigue_score: f64,
    pub frequency: f64,
    pub performance_drop: f64,
    pub recommendation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulkStatusResult {
    #[serde(default)]
    pub updated: Vec<String>,
    #[serde(default)]
    pub failed: Vec<String>,
}

/// Every data slice at once, as returned by a full sync.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub campaigns: Vec<Campaign>,
    pub adsets: Vec<AdSet>,
    pub ads: Vec<Ad>,
    pub recommendations: Vec<Recommendation>,
    pub metrics: Option<DashboardMetrics>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ad_insights_flatten_all_levels() {
        let ad: Ad = serde_json::from_value(json!({
            "id": "ad_1",
            "adset_id": "as_1",
            "name": "Carousel",
            "status": "ACTIVE",
            "insights": {
                "spend": 12.5,
                "impressions": 1000,
                "clicks": 30,
                "ctr": 3.0,
                "roas": 2.4,
                "cost_per_result": 1.2,
                "video_p100_watched": 40
            }
        }))
        .expect("ad should deserialize");

        let insights = ad.insights.as_ref().expect("insights should be present");
        assert_eq!(insights.video_p100_watched, Some(40));
        assert_eq!(insights.adset.cost_per_result, Some(1.2));
        assert_eq!(ad.base_insights().map(|base| base.clicks), Some(30));
        assert_eq!(ad.base_insights().and_then(|base| base.roas), Some(2.4));
    }

    #[test]
    fn status_toggle_flips_active_and_reactivates_others() {
        assert_eq!(EntityStatus::Active.toggled(), EntityStatus::Paused);
        assert_eq!(EntityStatus::Paused.toggled(), EntityStatus::Active);
        assert_eq!(EntityStatus::Archived.toggled(), EntityStatus::Active);
    }

    #[test]
    fn entity_type_uses_backend_spelling() {
        let value = serde_json::to_value(EntityType::AdSet).expect("entity type serializes");
        assert_eq!(value, json!("ADSET"));
        assert_eq!(EntityType::AdSet.wire_name(), "adset");
    }

    #[test]
    fn targeting_summary_lists_only_present_fields() {
        let targeting = Targeting {
            age_min: Some(25),
            age_max: Some(44),
            genders: vec![2],
            geo_locations: Some(GeoLocations {
                countries: vec!["TR".to_string()],
                cities: vec![City {
                    key: "2347".to_string(),
                    name: "Istanbul".to_string(),
                }],
            }),
            ..Default::default()
        };

        let summary = targeting.summary();
        assert_eq!(
            summary,
            vec![
                ("Age", "25 - 44".to_string()),
                ("Genders", "Female".to_string()),
                ("Countries", "TR".to_string()),
                ("Cities", "Istanbul".to_string()),
            ]
        );
    }

    #[test]
    fn metrics_use_dashboard_field_names() {
        let metrics: DashboardMetrics = serde_json::from_value(json!({
            "totalSpend": 100.0,
            "totalImpressions": 5000,
            "totalClicks": 120,
            "totalConversions": 8,
            "averageCTR": 2.4,
            "averageCPC": 0.83,
            "averageROAS": 3.1
        }))
        .expect("metrics should deserialize");
        assert_eq!(metrics.total_clicks, 120);
        assert_eq!(metrics.average_roas, 3.1);
        assert_eq!(metrics.spend_change, 0.0);
    }
}

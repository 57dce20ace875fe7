//! Read-only views derived from the store on every frame.

use std::collections::HashMap;

use crate::model::{
    build_campaign_tree, Campaign, CampaignNode, DashboardMetrics, EntityStatus, EntityType,
    Platform, Priority, Recommendation, RecommendationState,
};

use super::Store;

/// Campaigns matching the dashboard filters, in store order.
///
/// All loaded data comes from Meta, so the Google platform matches nothing.
pub fn filtered_campaigns(store: &Store) -> Vec<&Campaign> {
    let filters = &store.filters;
    if filters.platform == Platform::Google {
        return Vec::new();
    }

    let needle = filters.search.trim().to_lowercase();
    store
        .campaigns
        .iter()
        .filter(|campaign| filters.status.contains(&campaign.status))
        .filter(|campaign| needle.is_empty() || campaign.name.to_lowercase().contains(&needle))
        .collect()
}

pub fn campaign_tree(store: &Store) -> Vec<CampaignNode> {
    build_campaign_tree(&store.campaigns, &store.adsets, &store.ads)
}

/// Local status filter of the campaigns page, applied on top of the dashboard filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CampaignStatusFilter {
    #[default]
    All,
    Active,
    Paused,
}

impl CampaignStatusFilter {
    pub const OPTIONS: [CampaignStatusFilter; 3] = [Self::All, Self::Active, Self::Paused];

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Active => "Active",
            Self::Paused => "Paused",
        }
    }

    fn matches(self, status: EntityStatus) -> bool {
        match self {
            Self::All => true,
            Self::Active => status == EntityStatus::Active,
            Self::Paused => status == EntityStatus::Paused,
        }
    }
}

pub fn filtered_tree(store: &Store, local: CampaignStatusFilter) -> Vec<CampaignNode> {
    let campaigns: Vec<Campaign> = filtered_campaigns(store)
        .into_iter()
        .filter(|campaign| local.matches(campaign.status))
        .cloned()
        .collect();
    build_campaign_tree(&campaigns, &store.adsets, &store.ads)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub all: usize,
    pub active: usize,
    pub paused: usize,
}

pub fn campaign_status_counts(store: &Store) -> StatusCounts {
    store.campaigns.iter().fold(
        StatusCounts {
            all: store.campaigns.len(),
            ..Default::default()
        },
        |mut counts, campaign| {
            match campaign.status {
                EntityStatus::Active => counts.active += 1,
                EntityStatus::Paused => counts.paused += 1,
                _ => {}
            }
            counts
        },
    )
}

/// Pending recommendations in input order.
pub fn active_recommendations(recommendations: &[Recommendation]) -> Vec<&Recommendation> {
    recommendations.iter().filter(|rec| rec.is_pending()).collect()
}

pub fn high_priority_recommendations(store: &Store) -> Vec<&Recommendation> {
    active_recommendations(&store.recommendations)
        .into_iter()
        .filter(|rec| rec.priority == Priority::High)
        .collect()
}

/// Pending recommendation count per target entity id.
pub fn recommendation_counts(store: &Store) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for rec in active_recommendations(&store.recommendations) {
        *counts.entry(rec.entity_id.clone()).or_insert(0) += 1;
    }
    counts
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecommendationView {
    All,
    #[default]
    Pending,
    Applied,
    Dismissed,
}

impl RecommendationView {
    pub const OPTIONS: [RecommendationView; 4] =
        [Self::All, Self::Pending, Self::Applied, Self::Dismissed];

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Pending => "pending",
            Self::Applied => "applied",
            Self::Dismissed => "dismissed",
        }
    }

    fn matches(self, state: RecommendationState) -> bool {
        match self {
            Self::All => true,
            Self::Pending => state == RecommendationState::Pending,
            Self::Applied => state == RecommendationState::Applied,
            Self::Dismissed => state == RecommendationState::Dismissed,
        }
    }
}

/// Recommendations in `view`, optionally narrowed to one priority.
pub fn filter_recommendations(
    recommendations: &[Recommendation],
    view: RecommendationView,
    priority: Option<Priority>,
) -> Vec<&Recommendation> {
    recommendations
        .iter()
        .filter(|rec| view.matches(rec.state))
        .filter(|rec| priority.map_or(true, |wanted| rec.priority == wanted))
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecommendationCounts {
    pub all: usize,
    pub pending: usize,
    pub applied: usize,
    pub dismissed: usize,
}

impl RecommendationCounts {
    pub fn get(&self, view: RecommendationView) -> usize {
        match view {
            RecommendationView::All => self.all,
            RecommendationView::Pending => self.pending,
            RecommendationView::Applied => self.applied,
            RecommendationView::Dismissed => self.dismissed,
        }
    }
}

pub fn recommendation_view_counts(recommendations: &[Recommendation]) -> RecommendationCounts {
    let mut counts = RecommendationCounts {
        all: recommendations.len(),
        ..Default::default()
    };
    for rec in recommendations {
        match rec.state {
            RecommendationState::Pending => counts.pending += 1,
            RecommendationState::Applied => counts.applied += 1,
            RecommendationState::Dismissed => counts.dismissed += 1,
        }
    }
    counts
}

/// Whether the entity a recommendation points at is still loaded.
pub fn target_exists(store: &Store, rec: &Recommendation) -> bool {
    let id = rec.entity_id.as_str();
    match rec.entity_type {
        EntityType::Campaign => store.campaigns.iter().any(|campaign| campaign.id == id),
        EntityType::AdSet => store.adsets.iter().any(|adset| adset.id == id),
        EntityType::Ad => store.ads.iter().any(|ad| ad.id == id),
    }
}

/// Backend metrics when present, otherwise totals aggregated from campaign insights.
pub fn dashboard_metrics(store: &Store) -> DashboardMetrics {
    if let Some(metrics) = &store.metrics {
        return metrics.clone();
    }
    aggregate_metrics(&store.campaigns)
}

pub fn aggregate_metrics(campaigns: &[Campaign]) -> DashboardMetrics {
    let mut metrics = DashboardMetrics::default();
    let mut roas_weight = 0.0;
    let mut roas_spend = 0.0;

    for insights in campaigns.iter().filter_map(|campaign| campaign.insights.as_ref()) {
        metrics.total_spend += insights.spend;
        metrics.total_impressions += insights.impressions;
        metrics.total_clicks += insights.clicks;
        metrics.total_conversions += insights.conversions.unwrap_or(0);
        if let Some(roas) = insights.roas {
            roas_weight += roas * insights.spend;
            roas_spend += insights.spend;
        }
    }

    if metrics.total_impressions > 0 {
        metrics.average_ctr = metrics.total_clicks as f64 / metrics.total_impressions as f64 * 100.0;
    }
    if metrics.total_clicks > 0 {
        metrics.average_cpc = metrics.total_spend / metrics.total_clicks as f64;
    }
    if roas_spend > 0.0 {
        metrics.average_roas = roas_weight / roas_spend;
    }
    metrics
}

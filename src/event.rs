use crate::error::ApiResult;
use crate::model::{
    Ad, AdSet, BulkStatusResult, Campaign, ConnectableAssets, DashboardMetrics, FatiguedAd,
    Recommendation, Snapshot,
};
use crate::store::{MutationTicket, RecommendationAction};

/// Results sent from background tasks to the UI thread.
#[derive(Debug, Clone)]
pub enum AppEvent {
    CampaignsLoaded(ApiResult<Vec<Campaign>>),
    AdSetsLoaded(ApiResult<Vec<AdSet>>),
    AdsLoaded(ApiResult<Vec<Ad>>),
    RecommendationsLoaded(ApiResult<Vec<Recommendation>>),
    MetricsLoaded(ApiResult<Option<DashboardMetrics>>),
    SyncFinished(ApiResult<Snapshot>),
    MutationSettled {
        ticket: MutationTicket,
        result: ApiResult<()>,
    },
    BulkStatusSettled {
        tickets: Vec<(MutationTicket, String)>,
        result: ApiResult<BulkStatusResult>,
    },
    RecommendationSettled {
        id: String,
        action: RecommendationAction,
        result: ApiResult<()>,
    },
    CreativeFatigueChecked(ApiResult<Vec<FatiguedAd>>),
    AssetsAuthorized(ConnectableAssets),
}

impl AppEvent {
    /// Short description for the diagnostics log.
    pub fn summary(&self) -> String {
        fn outcome<T>(name: &str, result: &ApiResult<T>, count: impl FnOnce(&T) -> Option<usize>) -> String {
            match result {
                Ok(value) => match count(value) {
                    Some(count) => format!("{name}: {count} loaded"),
                    None => format!("{name}: ok"),
                },
                Err(err) => format!("{name}: {}", err.user_message()),
            }
        }

        match self {
            Self::CampaignsLoaded(result) => outcome("campaigns", result, |items| Some(items.len())),
            Self::AdSetsLoaded(result) => outcome("adsets", result, |items| Some(items.len())),
            Self::AdsLoaded(result) => outcome("ads", result, |items| Some(items.len())),
            Self::RecommendationsLoaded(result) => {
                outcome("recommendations", result, |items| Some(items.len()))
            }
            Self::MetricsLoaded(result) => outcome("metrics", result, |_| None),
            Self::SyncFinished(result) => outcome("sync", result, |snapshot| Some(snapshot.campaigns.len())),
            Self::MutationSettled { result, .. } => outcome("update", result, |_| None),
            Self::BulkStatusSettled { tickets, result } => match result {
                Ok(bulk) => format!(
                    "bulk status: {} updated, {} failed of {}",
                    bulk.updated.len(),
                    bulk.failed.len(),
                    tickets.len()
                ),
                Err(err) => format!("bulk status: {}", err.user_message()),
            },
            Self::RecommendationSettled { id, action, result } => {
                outcome(&format!("{} {id}", action.as_str()), result, |_| None)
            }
            Self::CreativeFatigueChecked(result) => {
                outcome("creative fatigue", result, |items| Some(items.len()))
            }
            Self::AssetsAuthorized(assets) => format!(
                "authorized: {} pages, {} ad accounts",
                assets.pages.len(),
                assets.ad_accounts.len()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;

    #[test]
    fn summary_counts_items_or_reports_error() {
        let loaded = AppEvent::CampaignsLoaded(Ok(crate::demo::campaigns()));
        assert_eq!(loaded.summary(), "campaigns: 4 loaded");

        let failed = AppEvent::AdsLoaded(Err(ApiError::Network("offline".to_string())));
        assert_eq!(failed.summary(), "ads: offline (NETWORK_ERROR)");
    }
}

//! Data sources behind the background dispatcher.

use async_trait::async_trait;

use crate::error::ApiResult;
use crate::model::{
    Ad, AdSet, BulkStatusResult, Campaign, DashboardMetrics, DateRange, EntityPatch, EntityStatus,
    EntityType, FatiguedAd, Recommendation, Snapshot,
};

pub mod demo;
pub mod webhook;

pub use demo::DemoGateway;
pub use webhook::{Credentials, WebhookClient};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayMode {
    Live,
    Demo,
}

impl GatewayMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Live => "Live",
            Self::Demo => "Demo",
        }
    }
}

#[async_trait]
pub trait AdsGateway: Send + Sync {
    fn mode(&self) -> GatewayMode;

    async fn fetch_campaigns(&self) -> ApiResult<Vec<Campaign>>;

    async fn fetch_all_adsets(&self) -> ApiResult<Vec<AdSet>>;

    async fn fetch_all_ads(&self) -> ApiResult<Vec<Ad>>;

    async fn fetch_recommendations(&self) -> ApiResult<Vec<Recommendation>>;

    /// Account-level totals for `range`. `None` when the backend has none.
    async fn fetch_account_metrics(&self, range: &DateRange) -> ApiResult<Option<DashboardMetrics>>;

    async fn update_entity(&self, patch: &EntityPatch) -> ApiResult<()>;

    async fn apply_recommendation(&self, recommendation: &Recommendation) -> ApiResult<()>;

    async fn dismiss_recommendation(&self, id: &str) -> ApiResult<()>;

    async fn check_creative_fatigue(&self) -> ApiResult<Vec<FatiguedAd>>;

    async fn sync_all(&self) -> ApiResult<Snapshot>;

    async fn bulk_update_status(
        &self,
        entity_type: EntityType,
        ids: &[String],
        status: EntityStatus,
    ) -> ApiResult<BulkStatusResult>;
}

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use super::{AdsGateway, GatewayMode};
use crate::demo;
use crate::error::{ApiError, ApiResult};
use crate::model::{
    Ad, AdSet, BulkStatusResult, Campaign, DashboardMetrics, DateRange, Entity, EntityPatch,
    EntityStatus, EntityType, FatiguedAd, Recommendation, RecommendationState, Snapshot,
};
use crate::store::update_entity_by_id;

/// In-memory backend seeded with the demo dataset.
///
/// Every call waits `latency` first so loading states stay visible. Writes
/// land in the held snapshot, so a later sync reflects them.
pub struct DemoGateway {
    latency: Duration,
    state: Mutex<Snapshot>,
}

impl DemoGateway {
    pub fn new(latency: Duration) -> Self {
        Self::with_snapshot(latency, demo::snapshot())
    }

    pub fn with_snapshot(latency: Duration, snapshot: Snapshot) -> Self {
        Self {
            latency,
            state: Mutex::new(snapshot),
        }
    }

    async fn pause(&self, call: &str) {
        debug!(target: "adpilot::gateway", call, latency_ms = self.latency.as_millis() as u64, "demo call");
        tokio::time::sleep(self.latency).await;
    }
}

fn not_found(entity: EntityType, id: &str) -> ApiError {
    ApiError::Http {
        status: 404,
        message: format!("{} {id} not found", entity.as_str()),
    }
}

fn set_status(snapshot: &mut Snapshot, entity: EntityType, id: &str, status: EntityStatus) -> bool {
    match entity {
        EntityType::Campaign => update_entity_by_id(&mut snapshot.campaigns, id, |item| item.set_status(status)),
        EntityType::AdSet => update_entity_by_id(&mut snapshot.adsets, id, |item| item.set_status(status)),
        EntityType::Ad => update_entity_by_id(&mut snapshot.ads, id, |item| item.set_status(status)),
    }
}

/// Budget suggestions change the target; other actions only flip the recommendation.
fn apply_suggestion(snapshot: &mut Snapshot, rec: &Recommendation) {
    let Some(value) = rec.suggested_action.suggested_value.as_ref().and_then(Value::as_f64) else {
        return;
    };
    let field = rec.suggested_action.field.as_deref();
    match (rec.entity_type, field) {
        (EntityType::Campaign, Some("daily_budget")) => {
            update_entity_by_id(&mut snapshot.campaigns, &rec.entity_id, |item| item.daily_budget = Some(value));
        }
        (EntityType::Campaign, Some("lifetime_budget")) => {
            update_entity_by_id(&mut snapshot.campaigns, &rec.entity_id, |item| {
                item.lifetime_budget = Some(value)
            });
        }
        (EntityType::AdSet, Some("daily_budget")) => {
            update_entity_by_id(&mut snapshot.adsets, &rec.entity_id, |item| item.daily_budget = Some(value));
        }
        (EntityType::AdSet, Some("bid_amount")) => {
            update_entity_by_id(&mut snapshot.adsets, &rec.entity_id, |item| item.bid_amount = Some(value));
        }
        _ => {}
    }
}

fn transition(snapshot: &mut Snapshot, id: &str, next: RecommendationState) -> ApiResult<Recommendation> {
    let rec = snapshot
        .recommendations
        .iter_mut()
        .find(|rec| rec.id == id)
        .ok_or_else(|| ApiError::Http {
            status: 404,
            message: format!("Recommendation {id} not found"),
        })?;
    if !rec.is_pending() {
        return Err(ApiError::Rejected(format!("Recommendation {id} was already handled")));
    }
    rec.state = next;
    Ok(rec.clone())
}

#[async_trait]
impl AdsGateway for DemoGateway {
    fn mode(&self) -> GatewayMode {
        GatewayMode::Demo
    }

    async fn fetch_campaigns(&self) -> ApiResult<Vec<Campaign>> {
        self.pause("campaigns").await;
        Ok(self.state.lock().await.campaigns.clone())
    }

    async fn fetch_all_adsets(&self) -> ApiResult<Vec<AdSet>> {
        self.pause("adsets").await;
        Ok(self.state.lock().await.adsets.clone())
    }

    async fn fetch_all_ads(&self) -> ApiResult<Vec<Ad>> {
        self.pause("ads").await;
        Ok(self.state.lock().await.ads.clone())
    }

    async fn fetch_recommendations(&self) -> ApiResult<Vec<Recommendation>> {
        self.pause("recommendations").await;
        Ok(self.state.lock().await.recommendations.clone())
    }

    async fn fetch_account_metrics(&self, _range: &DateRange) -> ApiResult<Option<DashboardMetrics>> {
        self.pause("metrics").await;
        Ok(self.state.lock().await.metrics.clone())
    }

    async fn update_entity(&self, patch: &EntityPatch) -> ApiResult<()> {
        self.pause("update").await;
        let mut state = self.state.lock().await;
        let found = match patch {
            EntityPatch::Campaign { id, patch } => {
                update_entity_by_id(&mut state.campaigns, id, |item| patch.apply_to(item))
            }
            EntityPatch::AdSet { id, patch } => update_entity_by_id(&mut state.adsets, id, |item| patch.apply_to(item)),
            EntityPatch::Ad { id, patch } => update_entity_by_id(&mut state.ads, id, |item| patch.apply_to(item)),
        };
        if found {
            Ok(())
        } else {
            Err(not_found(patch.entity_type(), patch.id()))
        }
    }

    async fn apply_recommendation(&self, recommendation: &Recommendation) -> ApiResult<()> {
        self.pause("apply").await;
        let mut state = self.state.lock().await;
        let rec = transition(&mut state, &recommendation.id, RecommendationState::Applied)?;
        apply_suggestion(&mut state, &rec);
        Ok(())
    }

    async fn dismiss_recommendation(&self, id: &str) -> ApiResult<()> {
        self.pause("dismiss").await;
        let mut state = self.state.lock().await;
        transition(&mut state, id, RecommendationState::Dismissed).map(|_| ())
    }

    async fn check_creative_fatigue(&self) -> ApiResult<Vec<FatiguedAd>> {
        self.pause("creative-fatigue").await;
        Ok(demo::fatigued_ads(&self.state.lock().await.ads))
    }

    async fn sync_all(&self) -> ApiResult<Snapshot> {
        self.pause("sync-all").await;
        Ok(self.state.lock().await.clone())
    }

    async fn bulk_update_status(
        &self,
        entity_type: EntityType,
        ids: &[String],
        status: EntityStatus,
    ) -> ApiResult<BulkStatusResult> {
        self.pause("bulk-status").await;
        let mut state = self.state.lock().await;
        let mut result = BulkStatusResult::default();
        for id in ids {
            if set_status(&mut state, entity_type, id, status) {
                result.updated.push(id.clone());
            } else {
                result.failed.push(id.clone());
            }
        }
        Ok(result)
    }
}

//! Runs gateway calls on the tokio runtime and reports back over a channel.
//!
//! The UI thread never awaits. Each public method spawns a task and returns
//! immediately; the outcome arrives later as an [`AppEvent`] that the app
//! drains once per frame.

use std::future::Future;
use std::sync::{mpsc, Arc};
use std::time::Duration;

use tokio::runtime::{Handle, TryCurrentError};
use tracing::{debug, info};

use crate::demo;
use crate::event::AppEvent;
use crate::gateway::{AdsGateway, GatewayMode};
use crate::model::{DateRange, EntityPatch, EntityStatus, EntityType, Recommendation};
use crate::store::{MutationTicket, RecommendationAction};

const AUTHORIZE_DELAY: Duration = Duration::from_millis(1500);

#[derive(Clone)]
pub struct Backend {
    gateway: Arc<dyn AdsGateway>,
    tx: mpsc::Sender<AppEvent>,
    runtime_handle: Handle,
    authorize_delay: Duration,
}

impl Backend {
    /// Must be called from within a tokio runtime.
    pub fn new(gateway: Arc<dyn AdsGateway>, tx: mpsc::Sender<AppEvent>) -> Result<Self, TryCurrentError> {
        let runtime_handle = Handle::try_current()?;
        info!(target: "adpilot::backend", mode = gateway.mode().label(), "backend ready");
        Ok(Self {
            gateway,
            tx,
            runtime_handle,
            authorize_delay: AUTHORIZE_DELAY,
        })
    }

    pub fn with_authorize_delay(mut self, delay: Duration) -> Self {
        self.authorize_delay = delay;
        self
    }

    pub fn mode(&self) -> GatewayMode {
        self.gateway.mode()
    }

    fn spawn<F>(&self, task: &'static str, work: F)
    where
        F: Future<Output = AppEvent> + Send + 'static,
    {
        let tx = self.tx.clone();
        self.runtime_handle.spawn(async move {
            let event = work.await;
            debug!(target: "adpilot::backend", task, summary = %event.summary(), "task finished");
            let _ = tx.send(event);
        });
    }

    /// Fetches every slice concurrently. Each slice reports on its own.
    pub fn load_all(&self, range: DateRange) {
        let gateway = Arc::clone(&self.gateway);
        self.spawn("campaigns", async move { AppEvent::CampaignsLoaded(gateway.fetch_campaigns().await) });

        let gateway = Arc::clone(&self.gateway);
        self.spawn("adsets", async move { AppEvent::AdSetsLoaded(gateway.fetch_all_adsets().await) });

        let gateway = Arc::clone(&self.gateway);
        self.spawn("ads", async move { AppEvent::AdsLoaded(gateway.fetch_all_ads().await) });

        let gateway = Arc::clone(&self.gateway);
        self.spawn("recommendations", async move {
            AppEvent::RecommendationsLoaded(gateway.fetch_recommendations().await)
        });

        let gateway = Arc::clone(&self.gateway);
        self.spawn("metrics", async move {
            AppEvent::MetricsLoaded(gateway.fetch_account_metrics(&range).await)
        });
    }

    pub fn sync_all(&self) {
        let gateway = Arc::clone(&self.gateway);
        self.spawn("sync", async move { AppEvent::SyncFinished(gateway.sync_all().await) });
    }

    pub fn update_entity(&self, ticket: MutationTicket, patch: EntityPatch) {
        let gateway = Arc::clone(&self.gateway);
        self.spawn("update", async move {
            let result = gateway.update_entity(&patch).await;
            AppEvent::MutationSettled { ticket, result }
        });
    }

    pub fn bulk_update_status(
        &self,
        entity_type: EntityType,
        tickets: Vec<(MutationTicket, String)>,
        status: EntityStatus,
    ) {
        let gateway = Arc::clone(&self.gateway);
        self.spawn("bulk-status", async move {
            let ids: Vec<String> = tickets.iter().map(|(_, id)| id.clone()).collect();
            let result = gateway.bulk_update_status(entity_type, &ids, status).await;
            AppEvent::BulkStatusSettled { tickets, result }
        });
    }

    pub fn apply_recommendation(&self, recommendation: Recommendation) {
        let gateway = Arc::clone(&self.gateway);
        self.spawn("apply", async move {
            let result = gateway.apply_recommendation(&recommendation).await;
            AppEvent::RecommendationSettled {
                id: recommendation.id,
                action: RecommendationAction::Apply,
                result,
            }
        });
    }

    pub fn dismiss_recommendation(&self, id: String) {
        let gateway = Arc::clone(&self.gateway);
        self.spawn("dismiss", async move {
            let result = gateway.dismiss_recommendation(&id).await;
            AppEvent::RecommendationSettled {
                id,
                action: RecommendationAction::Dismiss,
                result,
            }
        });
    }

    pub fn check_creative_fatigue(&self) {
        let gateway = Arc::clone(&self.gateway);
        self.spawn("creative-fatigue", async move {
            AppEvent::CreativeFatigueChecked(gateway.check_creative_fatigue().await)
        });
    }

    /// Simulated OAuth round trip for the connection wizard.
    pub fn authorize(&self) {
        let delay = self.authorize_delay;
        self.spawn("authorize", async move {
            tokio::time::sleep(delay).await;
            AppEvent::AssetsAuthorized(demo::connectable_assets())
        });
    }
}

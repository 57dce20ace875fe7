use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use super::{AdsGateway, GatewayMode};
use crate::error::{ApiError, ApiResult};
use crate::model::{
    Ad, AdPatch, AdSet, AdSetPatch, BulkStatusResult, Campaign, CampaignPatch, DashboardMetrics,
    DateRange, EntityPatch, EntityStatus, EntityType, FatiguedAd, Insights, Recommendation,
    Snapshot,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: String,
    pub ad_account_id: String,
}

/// Fields for `/meta/campaign/create`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignDraft {
    pub name: String,
    pub objective: String,
    pub status: EntityStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_budget: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct SyncAllResponse {
    #[serde(default)]
    campaigns: Vec<Campaign>,
    #[serde(default)]
    adsets: Vec<AdSet>,
    #[serde(default)]
    ads: Vec<Ad>,
    #[serde(default)]
    recommendations: Vec<Recommendation>,
    #[serde(default)]
    insights: Value,
}

#[derive(Debug, Deserialize)]
struct CreativeFatigueResponse {
    #[serde(default)]
    fatigued_ads: Vec<FatiguedAd>,
}

/// Client for the workflow backend's `/meta/*` webhooks.
#[derive(Clone)]
pub struct WebhookClient {
    client: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl WebhookClient {
    pub fn new(base_url: &str, credentials: Credentials, timeout: Duration) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(4)
            .build()
            .map_err(|err| ApiError::Network(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn with_token(&self, fields: Value) -> Value {
        let mut body = match fields {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        body.insert(
            "access_token".to_string(),
            Value::String(self.credentials.access_token.clone()),
        );
        Value::Object(body)
    }

    async fn send(&self, endpoint: &str, fields: Value) -> ApiResult<reqwest::Response> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!(target: "adpilot::gateway", endpoint, "POST webhook");

        let response = self
            .client
            .post(&url)
            .json(&self.with_token(fields))
            .send()
            .await
            .map_err(|err| {
                warn!(target: "adpilot::gateway", endpoint, error = %err, "webhook request failed");
                ApiError::Network(err.to_string())
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<Value>()
            .await
            .ok()
            .and_then(|body| body.get("message").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_else(|| "Request failed".to_string());
        warn!(
            target: "adpilot::gateway",
            endpoint,
            status = status.as_u16(),
            %message,
            "webhook returned error status"
        );
        Err(ApiError::Http {
            status: status.as_u16(),
            message,
        })
    }

    async fn post<T: DeserializeOwned>(&self, endpoint: &str, fields: Value) -> ApiResult<T> {
        let response = self.send(endpoint, fields).await?;
        Ok(response.json::<T>().await?)
    }

    /// For endpoints that only acknowledge. An empty body counts as success.
    async fn post_ack(&self, endpoint: &str, fields: Value) -> ApiResult<()> {
        let response = self.send(endpoint, fields).await?;
        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(());
        }
        let body: Value = serde_json::from_slice(&bytes)
            .map_err(|err| ApiError::InvalidResponse(err.to_string()))?;
        check_ack(&body)
    }

    fn account(&self) -> Value {
        json!({ "ad_account_id": self.credentials.ad_account_id })
    }

    pub async fn fetch_campaigns(&self) -> ApiResult<Vec<Campaign>> {
        self.post("/meta/campaigns", self.account()).await
    }

    pub async fn create_campaign(&self, draft: &CampaignDraft) -> ApiResult<Campaign> {
        self.post(
            "/meta/campaign/create",
            json!({
                "ad_account_id": self.credentials.ad_account_id,
                "campaign": draft,
            }),
        )
        .await
    }

    pub async fn update_campaign(&self, id: &str, updates: &CampaignPatch) -> ApiResult<()> {
        self.post_ack(
            "/meta/campaign/update",
            json!({ "campaign_id": id, "updates": updates }),
        )
        .await
    }

    pub async fn fetch_adsets(&self, campaign_id: &str) -> ApiResult<Vec<AdSet>> {
        self.post("/meta/adsets", json!({ "campaign_id": campaign_id })).await
    }

    pub async fn fetch_all_adsets(&self) -> ApiResult<Vec<AdSet>> {
        self.post("/meta/adsets/all", self.account()).await
    }

    pub async fn update_adset(&self, id: &str, updates: &AdSetPatch) -> ApiResult<()> {
        self.post_ack("/meta/adset/update", json!({ "adset_id": id, "updates": updates }))
            .await
    }

    pub async fn fetch_ads(&self, adset_id: &str) -> ApiResult<Vec<Ad>> {
        self.post("/meta/ads", json!({ "adset_id": adset_id })).await
    }

    pub async fn fetch_all_ads(&self) -> ApiResult<Vec<Ad>> {
        self.post("/meta/ads/all", self.account()).await
    }

    pub async fn update_ad(&self, id: &str, updates: &AdPatch) -> ApiResult<()> {
        self.post_ack("/meta/ad/update", json!({ "ad_id": id, "updates": updates }))
            .await
    }

    pub async fn fetch_campaign_insights(&self, campaign_id: &str, range: &DateRange) -> ApiResult<Insights> {
        self.post(
            "/meta/insights/campaign",
            json!({
                "campaign_id": campaign_id,
                "date_start": range.start_iso(),
                "date_stop": range.end_iso(),
            }),
        )
        .await
    }

    pub async fn fetch_account_insights(&self, range: &DateRange) -> ApiResult<Value> {
        self.post(
            "/meta/insights/account",
            json!({
                "ad_account_id": self.credentials.ad_account_id,
                "date_start": range.start_iso(),
                "date_stop": range.end_iso(),
            }),
        )
        .await
    }

    pub async fn fetch_recommendations(&self) -> ApiResult<Vec<Recommendation>> {
        self.post("/meta/recommendations", self.account()).await
    }

    pub async fn apply_recommendation(&self, recommendation: &Recommendation) -> ApiResult<()> {
        self.post_ack(
            "/meta/recommendation/apply",
            json!({
                "recommendation_id": recommendation.id,
                "entity_type": recommendation.entity_type,
                "entity_id": recommendation.entity_id,
                "action": recommendation.suggested_action,
            }),
        )
        .await
    }

    pub async fn dismiss_recommendation(&self, id: &str) -> ApiResult<()> {
        self.post_ack("/meta/recommendation/dismiss", json!({ "recommendation_id": id }))
            .await
    }

    pub async fn check_creative_fatigue(&self) -> ApiResult<Vec<FatiguedAd>> {
        let response: CreativeFatigueResponse = self.post("/meta/creative-fatigue", self.account()).await?;
        Ok(response.fatigued_ads)
    }

    pub async fn sync_all(&self) -> ApiResult<Snapshot> {
        let response: SyncAllResponse = self.post("/meta/sync-all", self.account()).await?;
        Ok(Snapshot {
            campaigns: response.campaigns,
            adsets: response.adsets,
            ads: response.ads,
            recommendations: response.recommendations,
            metrics: metrics_from(response.insights),
        })
    }

    pub async fn bulk_update_status(
        &self,
        entity_type: EntityType,
        ids: &[String],
        status: EntityStatus,
    ) -> ApiResult<BulkStatusResult> {
        self.post(
            "/meta/bulk/status",
            json!({
                "entity_type": entity_type.wire_name(),
                "entity_ids": ids,
                "status": status,
            }),
        )
        .await
    }
}

fn check_ack(body: &Value) -> ApiResult<()> {
    if body.get("success").and_then(Value::as_bool) == Some(false) {
        let message = body
            .get("message")
            .or_else(|| body.pointer("/error/message"))
            .and_then(Value::as_str)
            .unwrap_or("Request rejected");
        return Err(ApiError::Rejected(message.to_string()));
    }
    Ok(())
}

/// Insights payloads vary by workflow; only the dashboard shape is used.
fn metrics_from(insights: Value) -> Option<DashboardMetrics> {
    if insights.is_null() {
        return None;
    }
    match serde_json::from_value(insights) {
        Ok(metrics) => Some(metrics),
        Err(err) => {
            debug!(target: "adpilot::gateway", error = %err, "insights are not dashboard metrics");
            None
        }
    }
}

#[async_trait]
impl AdsGateway for WebhookClient {
    fn mode(&self) -> GatewayMode {
        GatewayMode::Live
    }

    async fn fetch_campaigns(&self) -> ApiResult<Vec<Campaign>> {
        WebhookClient::fetch_campaigns(self).await
    }

    async fn fetch_all_adsets(&self) -> ApiResult<Vec<AdSet>> {
        WebhookClient::fetch_all_adsets(self).await
    }

    async fn fetch_all_ads(&self) -> ApiResult<Vec<Ad>> {
        WebhookClient::fetch_all_ads(self).await
    }

    async fn fetch_recommendations(&self) -> ApiResult<Vec<Recommendation>> {
        WebhookClient::fetch_recommendations(self).await
    }

    async fn fetch_account_metrics(&self, range: &DateRange) -> ApiResult<Option<DashboardMetrics>> {
        let insights = self.fetch_account_insights(range).await?;
        Ok(metrics_from(insights))
    }

    async fn update_entity(&self, patch: &EntityPatch) -> ApiResult<()> {
        match patch {
            EntityPatch::Campaign { id, patch } => self.update_campaign(id, patch).await,
            EntityPatch::AdSet { id, patch } => self.update_adset(id, patch).await,
            EntityPatch::Ad { id, patch } => self.update_ad(id, patch).await,
        }
    }

    async fn apply_recommendation(&self, recommendation: &Recommendation) -> ApiResult<()> {
        WebhookClient::apply_recommendation(self, recommendation).await
    }

    async fn dismiss_recommendation(&self, id: &str) -> ApiResult<()> {
        WebhookClient::dismiss_recommendation(self, id).await
    }

    async fn check_creative_fatigue(&self) -> ApiResult<Vec<FatiguedAd>> {
        WebhookClient::check_creative_fatigue(self).await
    }

    async fn sync_all(&self) -> ApiResult<Snapshot> {
        WebhookClient::sync_all(self).await
    }

    async fn bulk_update_status(
        &self,
        entity_type: EntityType,
        ids: &[String],
        status: EntityStatus,
    ) -> ApiResult<BulkStatusResult> {
        WebhookClient::bulk_update_status(self, entity_type, ids, status).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo;
    use crate::model::{DatePreset, RecommendationState};
    use chrono::NaiveDate;
    use httpmock::prelude::*;

    fn client(server: &MockServer) -> WebhookClient {
        WebhookClient::new(
            &server.base_url(),
            Credentials {
                access_token: "token-123".to_string(),
                ad_account_id: "act_42".to_string(),
            },
            Duration::from_secs(2),
        )
        .expect("client should build")
    }

    #[tokio::test]
    async fn fetch_campaigns_posts_account_and_token() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/meta/campaigns")
                    .json_body(json!({"ad_account_id": "act_42", "access_token": "token-123"}));
                then.status(200).json_body(json!([
                    {"id": "cmp_1", "name": "Summer Sale", "status": "ACTIVE", "objective": "CONVERSIONS", "daily_budget": 50.0}
                ]));
            })
            .await;

        let campaigns = client(&server)
            .fetch_campaigns()
            .await
            .expect("campaigns should load");

        mock.assert_async().await;
        assert_eq!(campaigns.len(), 1);
        assert_eq!(campaigns[0].daily_budget, Some(50.0));
        assert!(campaigns[0].insights.is_none());
    }

    #[tokio::test]
    async fn error_status_maps_to_http_code_with_body_message() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/meta/ads/all");
                then.status(403).json_body(json!({"message": "Token expired"}));
            })
            .await;

        let error = client(&server)
            .fetch_all_ads()
            .await
            .expect_err("403 should fail");

        assert_eq!(error.code(), "HTTP_403");
        assert_eq!(error.to_string(), "Token expired");
    }

    #[tokio::test]
    async fn error_status_without_message_uses_default() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/meta/recommendations");
                then.status(500).body("upstream exploded");
            })
            .await;

        let error = client(&server)
            .fetch_recommendations()
            .await
            .expect_err("500 should fail");

        assert_eq!(
            error,
            ApiError::Http {
                status: 500,
                message: "Request failed".to_string()
            }
        );
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_network_error() {
        let client = WebhookClient::new(
            "http://127.0.0.1:9",
            Credentials {
                access_token: "t".to_string(),
                ad_account_id: "a".to_string(),
            },
            Duration::from_millis(500),
        )
        .expect("client should build");

        let error = client
            .fetch_campaigns()
            .await
            .expect_err("nothing listens on the discard port");
        assert_eq!(error.code(), "NETWORK_ERROR");
    }

    #[tokio::test]
    async fn malformed_success_body_is_invalid_response() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/meta/adsets/all");
                then.status(200).json_body(json!({"unexpected": true}));
            })
            .await;

        let error = client(&server)
            .fetch_all_adsets()
            .await
            .expect_err("object is not a list");
        assert_eq!(error.code(), "INVALID_RESPONSE");
    }

    #[tokio::test]
    async fn entity_updates_send_only_changed_fields() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/meta/adset/update").json_body(json!({
                    "adset_id": "as_1",
                    "updates": {"daily_budget": 80.0},
                    "access_token": "token-123"
                }));
                then.status(200).json_body(json!({"id": "as_1"}));
            })
            .await;

        let patch = EntityPatch::AdSet {
            id: "as_1".to_string(),
            patch: AdSetPatch {
                daily_budget: Some(80.0),
                ..Default::default()
            },
        };
        client(&server)
            .update_entity(&patch)
            .await
            .expect("update should succeed");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn rejected_acknowledgement_is_an_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/meta/recommendation/dismiss");
                then.status(200)
                    .json_body(json!({"success": false, "message": "Already dismissed"}));
            })
            .await;

        let error = client(&server)
            .dismiss_recommendation("rec_1")
            .await
            .expect_err("success=false should fail");
        assert_eq!(error, ApiError::Rejected("Already dismissed".to_string()));
        assert_eq!(error.code(), "REJECTED");
    }

    #[tokio::test]
    async fn apply_sends_target_and_suggested_action() {
        let server = MockServer::start_async().await;
        let rec = demo::recommendations()
            .into_iter()
            .next()
            .expect("demo recommendations exist");
        let expected = json!({
            "recommendation_id": rec.id,
            "entity_type": "ADSET",
            "entity_id": rec.entity_id,
            "action": rec.suggested_action,
            "access_token": "token-123"
        });
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/meta/recommendation/apply")
                    .json_body(expected);
                then.status(200)
                    .json_body(json!({"success": true, "message": "Applied"}));
            })
            .await;

        client(&server)
            .apply_recommendation(&rec)
            .await
            .expect("apply should succeed");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn sync_all_builds_snapshot_and_tolerates_odd_insights() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/meta/sync-all");
                then.status(200).json_body(json!({
                    "campaigns": [{"id": "cmp_1", "name": "A", "status": "PAUSED"}],
                    "adsets": [{"id": "as_1", "campaign_id": "cmp_1", "name": "B", "status": "ACTIVE"}],
                    "ads": [],
                    "recommendations": [{
                        "id": "rec_1",
                        "recommendation_type": "BID_ADJUSTMENT",
                        "title": "Lower bid",
                        "priority": "LOW",
                        "entity_type": "ADSET",
                        "entity_id": "as_1",
                        "dismissed": true
                    }],
                    "insights": [{"spend": 10}]
                }));
            })
            .await;

        let snapshot = client(&server).sync_all().await.expect("sync should succeed");
        assert_eq!(snapshot.campaigns[0].status, EntityStatus::Paused);
        assert_eq!(snapshot.adsets.len(), 1);
        assert_eq!(snapshot.recommendations[0].state, RecommendationState::Dismissed);
        assert!(snapshot.metrics.is_none());
    }

    #[tokio::test]
    async fn account_insights_send_date_range() {
        let server = MockServer::start_async().await;
        let today = NaiveDate::from_ymd_opt(2025, 3, 15).expect("valid date");
        let range = DateRange::from_preset(DatePreset::Last7Days, today);
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/meta/insights/account").json_body(json!({
                    "ad_account_id": "act_42",
                    "date_start": "2025-03-08",
                    "date_stop": "2025-03-15",
                    "access_token": "token-123"
                }));
                then.status(200).json_body(json!({
                    "totalSpend": 10.0,
                    "totalImpressions": 100,
                    "totalClicks": 5,
                    "totalConversions": 1,
                    "averageCTR": 5.0,
                    "averageCPC": 2.0,
                    "averageROAS": 1.5,
                    "spendChange": 4.0
                }));
            })
            .await;

        let metrics = client(&server)
            .fetch_account_metrics(&range)
            .await
            .expect("insights should load")
            .expect("dashboard metrics present");
        mock.assert_async().await;
        assert_eq!(metrics.spend_change, 4.0);
        assert_eq!(metrics.total_clicks, 5);
    }

    #[tokio::test]
    async fn bulk_status_uses_lowercase_entity_type() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/meta/bulk/status").json_body(json!({
                    "entity_type": "campaign",
                    "entity_ids": ["cmp_1", "cmp_2"],
                    "status": "PAUSED",
                    "access_token": "token-123"
                }));
                then.status(200)
                    .json_body(json!({"updated": ["cmp_1"], "failed": ["cmp_2"]}));
            })
            .await;

        let result = client(&server)
            .bulk_update_status(
                EntityType::Campaign,
                &["cmp_1".to_string(), "cmp_2".to_string()],
                EntityStatus::Paused,
            )
            .await
            .expect("bulk update should return a result");
        assert_eq!(result.updated, vec!["cmp_1".to_string()]);
        assert_eq!(result.failed, vec!["cmp_2".to_string()]);
    }

    #[tokio::test]
    async fn per_parent_listing_and_creation_endpoints() {
        let server = MockServer::start_async().await;
        let adsets = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/meta/adsets")
                    .json_body(json!({"campaign_id": "cmp_1", "access_token": "token-123"}));
                then.status(200).json_body(json!([]));
            })
            .await;
        let ads = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/meta/ads")
                    .json_body(json!({"adset_id": "as_1", "access_token": "token-123"}));
                then.status(200).json_body(json!([
                    {"id": "ad_1", "adset_id": "as_1", "name": "Story", "status": "ACTIVE"}
                ]));
            })
            .await;
        let create = server
            .mock_async(|when, then| {
                when.method(POST).path("/meta/campaign/create").json_body(json!({
                    "ad_account_id": "act_42",
                    "campaign": {"name": "New", "objective": "TRAFFIC", "status": "PAUSED"},
                    "access_token": "token-123"
                }));
                then.status(200)
                    .json_body(json!({"id": "cmp_9", "name": "New", "status": "PAUSED", "objective": "TRAFFIC"}));
            })
            .await;

        let client = client(&server);
        assert!(client.fetch_adsets("cmp_1").await.expect("adsets load").is_empty());
        assert_eq!(client.fetch_ads("as_1").await.expect("ads load")[0].name, "Story");
        let created = client
            .create_campaign(&CampaignDraft {
                name: "New".to_string(),
                objective: "TRAFFIC".to_string(),
                status: EntityStatus::Paused,
                daily_budget: None,
            })
            .await
            .expect("campaign should be created");
        assert_eq!(created.id, "cmp_9");

        adsets.assert_async().await;
        ads.assert_async().await;
        create.assert_async().await;
    }

    #[tokio::test]
    async fn creative_fatigue_unwraps_list() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/meta/creative-fatigue");
                then.status(200).json_body(json!({
                    "fatigued_ads": [{
                        "ad_id": "ad_2",
                        "ad_name": "Video",
                        "fatigue_score": 81.0,
                        "frequency": 4.1,
                        "performance_drop": 35.0,
                        "recommendation": "Replace the creative"
                    }]
                }));
            })
            .await;

        let fatigued = client(&server)
            .check_creative_fatigue()
            .await
            .expect("fatigue check should succeed");
        assert_eq!(fatigued[0].ad_id, "ad_2");
    }

    #[tokio::test]
    async fn campaign_insights_default_missing_fields() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/meta/insights/campaign");
                then.status(200).json_body(json!({"spend": 12.5, "clicks": 3}));
            })
            .await;

        let range = DateRange::from_preset(
            DatePreset::Today,
            NaiveDate::from_ymd_opt(2025, 3, 15).expect("valid date"),
        );
        let insights = client(&server)
            .fetch_campaign_insights("cmp_1", &range)
            .await
            .expect("insights should load");
        assert_eq!(insights.clicks, 3);
        assert_eq!(insights.roas, None);
    }

    #[test]
    fn ack_without_success_flag_is_accepted() {
        assert!(check_ack(&json!({"id": "cmp_1"})).is_ok());
        assert_eq!(
            check_ack(&json!({"success": false, "error": {"message": "nope"}})),
            Err(ApiError::Rejected("nope".to_string()))
        );
    }
}

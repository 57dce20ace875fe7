//! Fixed in-memory dataset used when no webhook backend is configured.

use serde_json::json;

use crate::model::{
    Ad, AdAccount, AdInsights, AdSet, AdSetInsights, Business, Campaign, City, ConnectableAssets,
    Creative, DashboardMetrics, EntityStatus, EntityType, FatiguedAd, GeoLocations, Impact,
    Insights, InstagramAccount, NamedRef, Page, Priority, Recommendation, RecommendationState,
    RecommendationType, Snapshot, SuggestedAction, Targeting,
};

const CREATED: &str = "2025-05-02T09:00:00+0000";
const UPDATED: &str = "2025-06-10T14:30:00+0000";

pub fn snapshot() -> Snapshot {
    Snapshot {
        campaigns: campaigns(),
        adsets: adsets(),
        ads: ads(),
        recommendations: recommendations(),
        metrics: Some(metrics()),
    }
}

fn insights(
    spend: f64,
    impressions: u64,
    clicks: u64,
    reach: u64,
    conversions: Option<u64>,
    roas: Option<f64>,
) -> Insights {
    let ctr = if impressions > 0 {
        clicks as f64 / impressions as f64 * 100.0
    } else {
        0.0
    };
    Insights {
        spend,
        impressions,
        clicks,
        ctr,
        cpc: if clicks > 0 { spend / clicks as f64 } else { 0.0 },
        cpm: if impressions > 0 {
            spend / impressions as f64 * 1000.0
        } else {
            0.0
        },
        reach,
        frequency: if reach > 0 {
            impressions as f64 / reach as f64
        } else {
            0.0
        },
        conversions,
        conversion_value: roas.map(|roas| roas * spend),
        roas,
        date_start: "2025-06-03".to_string(),
        date_stop: "2025-06-10".to_string(),
    }
}

fn campaign(
    id: &str,
    name: &str,
    status: EntityStatus,
    objective: &str,
    daily_budget: Option<f64>,
    lifetime_budget: Option<f64>,
    insights: Insights,
) -> Campaign {
    Campaign {
        id: id.to_string(),
        name: name.to_string(),
        status,
        objective: objective.to_string(),
        daily_budget,
        lifetime_budget,
        created_time: CREATED.to_string(),
        updated_time: UPDATED.to_string(),
        insights: Some(insights),
    }
}

pub fn campaigns() -> Vec<Campaign> {
    vec![
        campaign(
            "cmp_001",
            "Summer Sale 2025",
            EntityStatus::Active,
            "CONVERSIONS",
            Some(150.0),
            None,
            insights(3245.80, 185_420, 4821, 98_450, Some(312), Some(4.49)),
        ),
        campaign(
            "cmp_002",
            "Brand Awareness Q3",
            EntityStatus::Active,
            "BRAND_AWARENESS",
            Some(80.0),
            None,
            insights(1120.40, 412_300, 2210, 265_000, None, None),
        ),
        campaign(
            "cmp_003",
            "Lead Gen Webinar",
            EntityStatus::Paused,
            "LEAD_GENERATION",
            Some(60.0),
            None,
            insights(640.15, 38_900, 1032, 21_400, Some(54), Some(1.8)),
        ),
        campaign(
            "cmp_004",
            "App Install Push",
            EntityStatus::Active,
            "APP_INSTALLS",
            None,
            Some(5000.0),
            insights(2180.00, 156_000, 3900, 87_300, Some(410), Some(1.2)),
        ),
    ]
}

fn adset(
    id: &str,
    campaign_id: &str,
    name: &str,
    status: EntityStatus,
    daily_budget: Option<f64>,
    targeting: Targeting,
    base: Insights,
) -> AdSet {
    let cost_per_result = base.conversions.filter(|n| *n > 0).map(|n| base.spend / n as f64);
    AdSet {
        id: id.to_string(),
        campaign_id: campaign_id.to_string(),
        name: name.to_string(),
        status,
        daily_budget,
        lifetime_budget: None,
        targeting: Some(targeting),
        optimization_goal: "OFFSITE_CONVERSIONS".to_string(),
        billing_event: "IMPRESSIONS".to_string(),
        bid_amount: None,
        created_time: CREATED.to_string(),
        insights: Some(AdSetInsights {
            result_rate: base.conversions.map(|n| n as f64 / base.clicks.max(1) as f64 * 100.0),
            base,
            cost_per_result,
        }),
    }
}

fn named(id: &str, name: &str) -> NamedRef {
    NamedRef {
        id: id.to_string(),
        name: name.to_string(),
    }
}

fn targeting(age_min: u32, age_max: u32, countries: &[&str], interests: &[(&str, &str)]) -> Targeting {
    Targeting {
        age_min: Some(age_min),
        age_max: Some(age_max),
        genders: vec![1, 2],
        geo_locations: Some(GeoLocations {
            countries: countries.iter().map(|country| country.to_string()).collect(),
            cities: Vec::new(),
        }),
        interests: interests.iter().map(|(id, name)| named(id, name)).collect(),
        ..Default::default()
    }
}

pub fn adsets() -> Vec<AdSet> {
    let mut retargeting = targeting(25, 54, &["TR"], &[]);
    retargeting.custom_audiences = vec![named("ca_01", "Website visitors 30d")];
    if let Some(geo) = retargeting.geo_locations.as_mut() {
        geo.cities = vec![City {
            key: "2347".to_string(),
            name: "Istanbul".to_string(),
        }];
    }

    let mut lookalike = adset(
        "as_002",
        "cmp_001",
        "Lookalike 1%",
        EntityStatus::Active,
        Some(90.0),
        targeting(18, 44, &["TR", "DE"], &[("6003", "Online shopping")]),
        insights(1985.30, 121_000, 2870, 64_200, Some(181), Some(3.9)),
    );
    lookalike.bid_amount = Some(1.25);

    vec![
        adset(
            "as_001",
            "cmp_001",
            "Retargeting",
            EntityStatus::Active,
            Some(60.0),
            retargeting,
            insights(1260.50, 64_420, 1951, 34_250, Some(131), Some(5.3)),
        ),
        lookalike,
        adset(
            "as_003",
            "cmp_002",
            "Broad 18-65",
            EntityStatus::Active,
            Some(80.0),
            targeting(18, 65, &["TR"], &[]),
            insights(1120.40, 412_300, 2210, 265_000, None, None),
        ),
        adset(
            "as_004",
            "cmp_003",
            "Marketing Managers",
            EntityStatus::Paused,
            Some(60.0),
            targeting(28, 55, &["TR", "NL"], &[("6011", "Digital marketing"), ("6012", "B2B")]),
            insights(640.15, 38_900, 1032, 21_400, Some(54), Some(1.8)),
        ),
        adset(
            "as_005",
            "cmp_004",
            "Android Users TR",
            EntityStatus::Active,
            None,
            targeting(18, 34, &["TR"], &[("6020", "Mobile games")]),
            insights(2180.00, 156_000, 3900, 87_300, Some(410), Some(1.2)),
        ),
    ]
}

#[allow(clippy::too_many_arguments)]
fn ad(
    id: &str,
    adset_id: &str,
    name: &str,
    status: EntityStatus,
    title: &str,
    body: &str,
    base: Insights,
    video: bool,
) -> Ad {
    let video_views = video.then(|| base.impressions / 3);
    Ad {
        id: id.to_string(),
        adset_id: adset_id.to_string(),
        name: name.to_string(),
        status,
        creative: Some(Creative {
            id: format!("cr_{id}"),
            name: format!("{name} creative"),
            title: Some(title.to_string()),
            body: Some(body.to_string()),
            call_to_action_type: Some("SHOP_NOW".to_string()),
            link_url: Some("https://example.com/summer".to_string()),
            ..Default::default()
        }),
        created_time: CREATED.to_string(),
        insights: Some(AdInsights {
            adset: AdSetInsights {
                base,
                cost_per_result: None,
                result_rate: None,
            },
            video_views,
            video_p25_watched: video_views.map(|views| views * 7 / 10),
            video_p50_watched: video_views.map(|views| views / 2),
            video_p75_watched: video_views.map(|views| views * 3 / 10),
            video_p100_watched: video_views.map(|views| views / 5),
        }),
        preview_url: None,
    }
}

pub fn ads() -> Vec<Ad> {
    vec![
        ad(
            "ad_001",
            "as_001",
            "Carousel - Best Sellers",
            EntityStatus::Active,
            "Still thinking about it?",
            "Your favourites are back in stock with free shipping.",
            insights(720.10, 35_100, 1180, 19_800, Some(82), Some(5.9)),
            false,
        ),
        ad(
            "ad_002",
            "as_001",
            "Video - Summer Vibes",
            EntityStatus::Active,
            "Summer starts here",
            "Up to 40% off the whole summer collection.",
            insights(540.40, 29_320, 771, 14_450, Some(49), Some(4.5)),
            true,
        ),
        ad(
            "ad_003",
            "as_002",
            "Single Image - 20% Off",
            EntityStatus::Active,
            "20% off your first order",
            "New here? Take 20% off with code HELLO20.",
            insights(1985.30, 121_000, 2870, 64_200, Some(181), Some(3.9)),
            false,
        ),
        ad(
            "ad_004",
            "as_003",
            "Brand Story Video",
            EntityStatus::Active,
            "Made in Istanbul",
            "Meet the people behind every stitch.",
            insights(1120.40, 412_300, 2210, 265_000, None, None),
            true,
        ),
        ad(
            "ad_005",
            "as_004",
            "Webinar Invite",
            EntityStatus::Paused,
            "Free webinar: scaling paid social",
            "Save your seat for Thursday's live session.",
            insights(640.15, 38_900, 1032, 21_400, Some(54), Some(1.8)),
            false,
        ),
        ad(
            "ad_006",
            "as_005",
            "Playable Demo",
            EntityStatus::Active,
            "Try it before you install",
            "Play the first level right in your feed.",
            insights(2180.00, 156_000, 3900, 87_300, Some(410), Some(1.2)),
            true,
        ),
    ]
}

#[allow(clippy::too_many_arguments)]
fn recommendation(
    id: &str,
    kind: RecommendationType,
    priority: Priority,
    entity: (EntityType, &str, &str),
    title: &str,
    description: &str,
    impact: (&str, f64, f64),
    action: SuggestedAction,
) -> Recommendation {
    let (metric, current_value, projected_value) = impact;
    let (entity_type, entity_id, entity_name) = entity;
    Recommendation {
        id: id.to_string(),
        recommendation_type: kind,
        title: title.to_string(),
        description: description.to_string(),
        impact: Some(Impact {
            metric: metric.to_string(),
            current_value,
            projected_value,
            change_percentage: (projected_value - current_value) / current_value * 100.0,
        }),
        priority,
        entity_type,
        entity_id: entity_id.to_string(),
        entity_name: entity_name.to_string(),
        suggested_action: action,
        state: RecommendationState::Pending,
        created_time: "2025-06-10T08:00:00+0000".to_string(),
        expires_at: Some("2025-06-17T08:00:00+0000".to_string()),
    }
}

pub fn recommendations() -> Vec<Recommendation> {
    vec![
        recommendation(
            "rec_001",
            RecommendationType::BudgetIncrease,
            Priority::High,
            (EntityType::AdSet, "as_001", "Retargeting"),
            "Scale the retargeting ad set",
            "ROAS has stayed above 5x for 7 days while the budget is capped early each day.",
            ("Conversions", 100.0, 130.0),
            SuggestedAction {
                action_type: "UPDATE_BUDGET".to_string(),
                field: Some("daily_budget".to_string()),
                current_value: Some(json!(60.0)),
                suggested_value: Some(json!(80.0)),
                details: None,
            },
        ),
        recommendation(
            "rec_002",
            RecommendationType::CreativeFatigue,
            Priority::Medium,
            (EntityType::Ad, "ad_002", "Video - Summer Vibes"),
            "Refresh the summer video",
            "Frequency passed 4 and CTR dropped 35% compared to the first week.",
            ("CTR", 1.2, 2.1),
            SuggestedAction {
                action_type: "REPLACE_CREATIVE".to_string(),
                details: Some(json!({"reason": "frequency", "frequency": 4.2})),
                ..Default::default()
            },
        ),
        recommendation(
            "rec_003",
            RecommendationType::BudgetDecrease,
            Priority::Medium,
            (EntityType::Campaign, "cmp_004", "App Install Push"),
            "Trim spend on app installs",
            "Cost per install rose 40% this week while ROAS fell to 1.2x.",
            ("ROAS", 1.2, 1.6),
            SuggestedAction {
                action_type: "UPDATE_BUDGET".to_string(),
                field: Some("lifetime_budget".to_string()),
                current_value: Some(json!(5000.0)),
                suggested_value: Some(json!(3500.0)),
                details: None,
            },
        ),
        recommendation(
            "rec_004",
            RecommendationType::AudienceExpansion,
            Priority::Low,
            (EntityType::AdSet, "as_002", "Lookalike 1%"),
            "Widen the lookalike audience",
            "The 1% audience is close to saturation. A 3% lookalike keeps cost per result stable.",
            ("Reach", 45_000.0, 72_000.0),
            SuggestedAction {
                action_type: "EXPAND_AUDIENCE".to_string(),
                field: Some("lookalike_ratio".to_string()),
                current_value: Some(json!(0.01)),
                suggested_value: Some(json!(0.03)),
                details: None,
            },
        ),
        recommendation(
            "rec_005",
            RecommendationType::TargetingOptimization,
            Priority::Low,
            (EntityType::Campaign, "cmp_002", "Brand Awareness Q3"),
            "Focus on engaged video viewers",
            "Viewers aged 25-34 complete the brand video twice as often as other groups.",
            ("Video Completion Rate", 22.5, 28.0),
            SuggestedAction {
                action_type: "UPDATE_TARGETING".to_string(),
                field: Some("age_range".to_string()),
                current_value: Some(json!("18-65")),
                suggested_value: Some(json!("25-34")),
                details: None,
            },
        ),
    ]
}

pub fn metrics() -> DashboardMetrics {
    DashboardMetrics {
        total_spend: 7186.35,
        total_impressions: 792_620,
        total_clicks: 11_963,
        total_conversions: 776,
        average_ctr: 1.51,
        average_cpc: 0.60,
        average_roas: 3.12,
        spend_change: 12.5,
        impressions_change: 8.3,
        clicks_change: -2.1,
        conversions_change: 15.7,
    }
}

pub fn connectable_assets() -> ConnectableAssets {
    let page = |id: &str, name: &str| Page {
        id: id.to_string(),
        name: name.to_string(),
    };
    let business = |id: &str, name: &str| Business {
        id: id.to_string(),
        name: name.to_string(),
    };
    let instagram = |id: &str, username: &str| InstagramAccount {
        id: id.to_string(),
        username: username.to_string(),
    };
    let account = |id: &str, name: &str, account_id: &str| AdAccount {
        id: id.to_string(),
        name: name.to_string(),
        account_id: account_id.to_string(),
    };

    ConnectableAssets {
        pages: vec![
            page("page_1", "YO Digital Marketing"),
            page("page_2", "E-Commerce Store"),
            page("page_3", "Local Business"),
        ],
        businesses: vec![
            business("biz_1", "YO Digital Business"),
            business("biz_2", "Partner Business"),
        ],
        instagram_accounts: vec![
            instagram("ig_1", "@yodigital"),
            instagram("ig_2", "@ecommerce_store"),
        ],
        ad_accounts: vec![
            account("acc_1", "YO Digital Ads", "act_123456789"),
            account("acc_2", "E-Commerce Ads", "act_987654321"),
        ],
    }
}

/// Ads whose frequency suggests the audience has seen the creative too often.
pub fn fatigued_ads(ads: &[Ad]) -> Vec<FatiguedAd> {
    ads.iter()
        .filter_map(|ad| {
            let base = &ad.insights.as_ref()?.adset.base;
            if base.frequency < 2.0 {
                return None;
            }
            let fatigue_score = (base.frequency * 20.0).min(100.0);
            Some(FatiguedAd {
                ad_id: ad.id.clone(),
                ad_name: ad.name.clone(),
                fatigue_score,
                frequency: base.frequency,
                performance_drop: ((base.frequency - 1.0) * 12.0).min(60.0),
                recommendation: if fatigue_score >= 60.0 {
                    "Replace the creative with a new variation".to_string()
                } else {
                    "Rotate in a fresh headline or thumbnail".to_string()
                },
            })
        })
        .collect()
}

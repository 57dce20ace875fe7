use std::collections::HashMap;

use super::{Ad, AdSet, Campaign};

#[derive(Debug, Clone, PartialEq)]
pub struct AdSetNode {
    pub adset: AdSet,
    pub ads: Vec<Ad>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CampaignNode {
    pub campaign: Campaign,
    pub adsets: Vec<AdSetNode>,
}

/// Joins the flat lists into the campaign → ad set → ad hierarchy.
///
/// Input order is preserved at every level. Children whose parent id is not
/// present are dropped.
pub fn build_campaign_tree(campaigns: &[Campaign], adsets: &[AdSet], ads: &[Ad]) -> Vec<CampaignNode> {
    let mut ads_by_adset: HashMap<&str, Vec<Ad>> = HashMap::new();
    for ad in ads {
        ads_by_adset
            .entry(ad.adset_id.as_str())
            .or_default()
            .push(ad.clone());
    }

    let mut adsets_by_campaign: HashMap<&str, Vec<AdSetNode>> = HashMap::new();
    for adset in adsets {
        let ads = ads_by_adset.remove(adset.id.as_str()).unwrap_or_default();
        adsets_by_campaign
            .entry(adset.campaign_id.as_str())
            .or_default()
            .push(AdSetNode {
                adset: adset.clone(),
                ads,
            });
    }

    campaigns
        .iter()
        .map(|campaign| CampaignNode {
            campaign: campaign.clone(),
            adsets: adsets_by_campaign
                .remove(campaign.id.as_str())
                .unwrap_or_default(),
        })
        .collect()
}

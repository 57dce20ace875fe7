use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessMode {
    #[default]
    All,
    Selected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Business {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstagramAccount {
    pub id: String,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdAccount {
    pub id: String,
    pub name: String,
    pub account_id: String,
}

/// Assets the user may grant access to, available after authorisation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectableAssets {
    pub pages: Vec<Page>,
    pub businesses: Vec<Business>,
    pub instagram_accounts: Vec<InstagramAccount>,
    pub ad_accounts: Vec<AdAccount>,
}

/// Result of the connection wizard. Selected id lists are empty when the mode is `All`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionPayload {
    pub pages_access_mode: AccessMode,
    pub selected_page_ids: Vec<String>,
    pub business_access_mode: AccessMode,
    pub selected_business_ids: Vec<String>,
    pub instagram_access_mode: AccessMode,
    pub selected_instagram_ids: Vec<String>,
    pub selected_ad_account_id: String,
}

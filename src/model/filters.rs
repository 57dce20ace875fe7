use chrono::{Datelike, Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use super::EntityStatus;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    All,
    Meta,
    Google,
}

impl Platform {
    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Meta => "Meta",
            Self::Google => "Google",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatePreset {
    #[serde(rename = "today")]
    Today,
    #[serde(rename = "yesterday")]
    Yesterday,
    #[serde(rename = "last7days")]
    Last7Days,
    #[serde(rename = "last30days")]
    Last30Days,
    #[serde(rename = "thisMonth")]
    ThisMonth,
    #[serde(rename = "lastMonth")]
    LastMonth,
    #[serde(rename = "custom")]
    Custom,
}

impl DatePreset {
    /// Presets offered by the header picker, in display order.
    pub const PICKABLE: [DatePreset; 6] = [
        Self::Today,
        Self::Yesterday,
        Self::Last7Days,
        Self::Last30Days,
        Self::ThisMonth,
        Self::LastMonth,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Today => "Today",
            Self::Yesterday => "Yesterday",
            Self::Last7Days => "Last 7 days",
            Self::Last30Days => "Last 30 days",
            Self::ThisMonth => "This month",
            Self::LastMonth => "Last month",
            Self::Custom => "Custom",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<DatePreset>,
}

impl DateRange {
    /// Resolves a named preset relative to `today`. `Custom` falls back to the last 7 days.
    pub fn from_preset(preset: DatePreset, today: NaiveDate) -> Self {
        let (start, end) = match preset {
            DatePreset::Today => (today, today),
            DatePreset::Yesterday => {
                let yesterday = today - Duration::days(1);
                (yesterday, yesterday)
            }
            DatePreset::Last30Days => (today - Duration::days(30), today),
            DatePreset::ThisMonth => (first_of_month(today), today),
            DatePreset::LastMonth => {
                let end = first_of_month(today) - Duration::days(1);
                (first_of_month(end), end)
            }
            DatePreset::Last7Days | DatePreset::Custom => (today - Duration::days(7), today),
        };
        Self {
            start,
            end,
            preset: Some(preset),
        }
    }

    pub fn start_iso(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    pub fn end_iso(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardFilters {
    pub platform: Platform,
    pub date_range: DateRange,
    pub status: Vec<EntityStatus>,
    pub search: String,
}

impl DashboardFilters {
    pub fn for_today(today: NaiveDate) -> Self {
        Self {
            platform: Platform::All,
            date_range: DateRange::from_preset(DatePreset::Last7Days, today),
            status: vec![EntityStatus::Active, EntityStatus::Paused],
            search: String::new(),
        }
    }

    /// Shallow merge: only fields present in the patch are replaced.
    pub fn merge(&mut self, patch: FiltersPatch) {
        if let Some(platform) = patch.platform {
            self.platform = platform;
        }
        if let Some(date_range) = patch.date_range {
            self.date_range = date_range;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(search) = patch.search {
            self.search = search;
        }
    }
}

impl Default for DashboardFilters {
    fn default() -> Self {
        Self::for_today(Local::now().date_naive())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FiltersPatch {
    pub platform: Option<Platform>,
    pub date_range: Option<DateRange>,
    pub status: Option<Vec<EntityStatus>>,
    pub search: Option<String>,
}

impl FiltersPatch {
    pub fn search(search: impl Into<String>) -> Self {
        Self {
            search: Some(search.into()),
            ..Default::default()
        }
    }

    pub fn platform(platform: Platform) -> Self {
        Self {
            platform: Some(platform),
            ..Default::default()
        }
    }

    pub fn date_range(date_range: DateRange) -> Self {
        Self {
            date_range: Some(date_range),
            ..Default::default()
        }
    }

    pub fn status(status: Vec<EntityStatus>) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }
}

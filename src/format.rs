//! Display formatting shared by every page.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

use crate::model::RecommendationType;

/// US dollars with two decimals and thousands separators, e.g. `$1,234.50`.
pub fn format_currency(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}${}.{cents}", group_thousands(whole))
}

/// Compact counts: `2.3M`, `1.5K`, otherwise the plain grouped value.
pub fn format_number(num: f64) -> String {
    if num >= 1_000_000.0 {
        return format!("{:.1}M", num / 1_000_000.0);
    }
    if num >= 1_000.0 {
        return format!("{:.1}K", num / 1_000.0);
    }

    let fixed = format!("{:.3}", num.abs());
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    let (whole, fraction) = match trimmed.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (trimmed, None),
    };
    let sign = if num < 0.0 && trimmed != "0" { "-" } else { "" };
    match fraction {
        Some(fraction) => format!("{sign}{}.{fraction}", group_thousands(whole)),
        None => format!("{sign}{}", group_thousands(whole)),
    }
}

pub fn format_count(num: u64) -> String {
    format_number(num as f64)
}

pub fn format_percentage(value: f64, decimals: usize) -> String {
    format!("{value:.decimals$}%")
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStyle {
    Short,
    Long,
    Relative,
}

/// Accepts RFC 3339, the platform's `+0000` offset form, or a bare date.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::<FixedOffset>::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Formats a backend timestamp. Unparsable input is returned unchanged.
pub fn format_date(raw: &str, style: DateStyle, now: DateTime<Utc>) -> String {
    let Some(date) = parse_timestamp(raw) else {
        return raw.to_string();
    };

    match style {
        DateStyle::Short => date.format("%-d %b %Y").to_string(),
        DateStyle::Long => date.format("%-d %B %Y, %H:%M").to_string(),
        DateStyle::Relative => {
            let elapsed = now.signed_duration_since(date);
            let days = elapsed.num_days();
            let hours = elapsed.num_hours();
            let minutes = elapsed.num_minutes();
            if days > 7 {
                date.format("%-d %b").to_string()
            } else if days > 0 {
                plural(days, "day")
            } else if hours > 0 {
                plural(hours, "hour")
            } else if minutes > 0 {
                plural(minutes, "minute")
            } else {
                "Just now".to_string()
            }
        }
    }
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{count} {unit}s ago")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    Flat,
}

impl Trend {
    pub fn arrow(self) -> &'static str {
        match self {
            Self::Up => "↑",
            Self::Down => "↓",
            Self::Flat => "→",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChangeIndicator {
    pub text: String,
    pub trend: Trend,
}

pub fn change_indicator(change: f64) -> ChangeIndicator {
    if change > 0.0 {
        ChangeIndicator {
            text: format!("+{change:.1}%"),
            trend: Trend::Up,
        }
    } else if change < 0.0 {
        ChangeIndicator {
            text: format!("{change:.1}%"),
            trend: Trend::Down,
        }
    } else {
        ChangeIndicator {
            text: "0%".to_string(),
            trend: Trend::Flat,
        }
    }
}

pub fn objective_label(objective: &str) -> &str {
    match objective {
        "CONVERSIONS" => "Conversions",
        "BRAND_AWARENESS" => "Brand Awareness",
        "REACH" => "Reach",
        "TRAFFIC" => "Traffic",
        "ENGAGEMENT" => "Engagement",
        "APP_INSTALLS" => "App Installs",
        "VIDEO_VIEWS" => "Video Views",
        "LEAD_GENERATION" => "Lead Generation",
        "MESSAGES" => "Messages",
        "CATALOG_SALES" => "Catalog Sales",
        "STORE_VISITS" => "Store Visits",
        other => other,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeInfo {
    pub icon: &'static str,
    pub label: &'static str,
}

pub fn recommendation_type_info(kind: RecommendationType) -> TypeInfo {
    let (icon, label) = match kind {
        RecommendationType::CreativeFatigue => ("🎨", "Creative Fatigue"),
        RecommendationType::BudgetIncrease => ("📈", "Budget Increase"),
        RecommendationType::BudgetDecrease => ("📉", "Budget Decrease"),
        RecommendationType::AudienceExpansion => ("👥", "Audience Expansion"),
        RecommendationType::BidAdjustment => ("💰", "Bid Adjustment"),
        RecommendationType::TargetingOptimization => ("🎯", "Targeting"),
        RecommendationType::CreativeUpdate => ("💡", "CREATIVE_UPDATE"),
        RecommendationType::ScheduleOptimization => ("💡", "SCHEDULE_OPTIMIZATION"),
        RecommendationType::PlacementOptimization => ("💡", "PLACEMENT_OPTIMIZATION"),
        RecommendationType::Unknown => ("💡", "Recommendation"),
    };
    TypeInfo { icon, label }
}

/// Optional money value, `-` when absent or zero.
pub fn budget_or_dash(budget: Option<f64>) -> String {
    match budget {
        Some(value) if value > 0.0 => format_currency(value),
        _ => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn currency_groups_thousands_with_two_decimals() {
        assert_eq!(format_currency(1234.5), "$1,234.50");
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(1_000_000.0), "$1,000,000.00");
        assert_eq!(format_currency(-42.129), "-$42.13");
        assert_eq!(format_currency(999.999), "$1,000.00");
    }

    #[test]
    fn numbers_compact_above_a_thousand() {
        assert_eq!(format_number(1500.0), "1.5K");
        assert_eq!(format_number(2_300_000.0), "2.3M");
        assert_eq!(format_number(500.0), "500");
        assert_eq!(format_number(999.5), "999.5");
        assert_eq!(format_number(1000.0), "1.0K");
        assert_eq!(format_count(45_200), "45.2K");
    }

    #[test]
    fn percentage_respects_decimals() {
        assert_eq!(format_percentage(3.14159, 2), "3.14%");
        assert_eq!(format_percentage(12.0, 0), "12%");
    }

    #[test]
    fn change_indicator_reports_direction() {
        assert_eq!(change_indicator(12.34).text, "+12.3%");
        assert_eq!(change_indicator(12.34).trend, Trend::Up);
        assert_eq!(change_indicator(-5.0).text, "-5.0%");
        assert_eq!(change_indicator(-5.0).trend, Trend::Down);
        assert_eq!(change_indicator(0.0).text, "0%");
        assert_eq!(change_indicator(0.0).trend.arrow(), "→");
    }

    #[test]
    fn timestamps_in_platform_offset_form_parse() {
        let parsed = parse_timestamp("2025-01-10T09:30:00+0000").expect("offset form parses");
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 1, 10, 9, 30, 0).unwrap());
        assert!(parse_timestamp("2025-01-10").is_some());
        assert!(parse_timestamp("yesterday-ish").is_none());
    }

    #[test]
    fn dates_format_by_style() {
        let now = Utc.with_ymd_and_hms(2025, 3, 15, 12, 0, 0).unwrap();
        let raw = "2025-03-15T09:05:00Z";
        assert_eq!(format_date(raw, DateStyle::Short, now), "15 Mar 2025");
        assert_eq!(format_date(raw, DateStyle::Long, now), "15 March 2025, 09:05");
        assert_eq!(format_date(raw, DateStyle::Relative, now), "2 hours ago");
        assert_eq!(format_date("2025-03-15T11:59:30Z", DateStyle::Relative, now), "Just now");
        assert_eq!(format_date("2025-03-14T11:00:00Z", DateStyle::Relative, now), "1 day ago");
        assert_eq!(format_date("2025-02-01T00:00:00Z", DateStyle::Relative, now), "1 Feb");
        assert_eq!(format_date("not a date", DateStyle::Short, now), "not a date");
    }

    #[test]
    fn labels_fall_back_to_raw_values() {
        assert_eq!(objective_label("LEAD_GENERATION"), "Lead Generation");
        assert_eq!(objective_label("OUTCOME_SALES"), "OUTCOME_SALES");
        let info = recommendation_type_info(RecommendationType::BudgetIncrease);
        assert_eq!((info.icon, info.label), ("📈", "Budget Increase"));
        assert_eq!(recommendation_type_info(RecommendationType::Unknown).icon, "💡");
    }

    #[test]
    fn missing_or_zero_budget_is_a_dash() {
        assert_eq!(budget_or_dash(None), "-");
        assert_eq!(budget_or_dash(Some(0.0)), "-");
        assert_eq!(budget_or_dash(Some(50.0)), "$50.00");
    }
}

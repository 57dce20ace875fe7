use eframe::egui::{self, RichText};

use crate::format::{change_indicator, format_count, format_currency, format_percentage, ChangeIndicator};
use crate::model::DashboardMetrics;
use crate::theme::Theme;

#[derive(Debug, Clone, PartialEq)]
pub struct MetricCard {
    pub title: &'static str,
    pub value: String,
    pub change: f64,
}

impl MetricCard {
    pub fn indicator(&self) -> ChangeIndicator {
        change_indicator(self.change)
    }
}

pub fn metric_cards(metrics: &DashboardMetrics) -> Vec<MetricCard> {
    vec![
        MetricCard {
            title: "Total Spend",
            value: format_currency(metrics.total_spend),
            change: metrics.spend_change,
        },
        MetricCard {
            title: "Impressions",
            value: format_count(metrics.total_impressions),
            change: metrics.impressions_change,
        },
        MetricCard {
            title: "Clicks",
            value: format_count(metrics.total_clicks),
            change: metrics.clicks_change,
        },
        MetricCard {
            title: "Conversions",
            value: format_count(metrics.total_conversions),
            change: metrics.conversions_change,
        },
    ]
}

pub fn secondary_metrics(metrics: &DashboardMetrics) -> Vec<(&'static str, String)> {
    vec![
        ("Avg. CTR", format_percentage(metrics.average_ctr, 2)),
        ("Avg. CPC", format_currency(metrics.average_cpc)),
        ("Avg. ROAS", format!("{:.2}x", metrics.average_roas)),
    ]
}

pub fn show(ui: &mut egui::Ui, theme: &Theme, metrics: &DashboardMetrics, loading: bool) {
    let cards = metric_cards(metrics);
    ui.columns(cards.len(), |columns| {
        for (column, card) in columns.iter_mut().zip(&cards) {
            theme.card_frame().show(column, |ui| {
                ui.set_width(ui.available_width());
                ui.label(RichText::new(card.title).small().color(theme.text_muted));
                if loading {
                    ui.spinner();
                } else {
                    ui.label(RichText::new(&card.value).heading().strong());
                    let indicator = card.indicator();
                    ui.label(
                        RichText::new(format!("{} {}", indicator.trend.arrow(), indicator.text))
                            .small()
                            .color(theme.trend_color(card.change)),
                    );
                }
            });
        }
    });

    ui.horizontal(|ui| {
        for (label, value) in secondary_metrics(metrics) {
            ui.label(RichText::new(label).color(theme.text_muted));
            ui.strong(value);
            ui.add_space(theme.spacing_16);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::Trend;

    #[test]
    fn cards_format_values_and_trends() {
        let metrics = DashboardMetrics {
            total_spend: 1234.5,
            total_impressions: 2_300_000,
            total_clicks: 1500,
            total_conversions: 42,
            spend_change: 12.0,
            clicks_change: -3.5,
            ..Default::default()
        };

        let cards = metric_cards(&metrics);
        assert_eq!(cards[0].value, "$1,234.50");
        assert_eq!(cards[1].value, "2.3M");
        assert_eq!(cards[2].value, "1.5K");
        assert_eq!(cards[3].value, "42");
        assert_eq!(cards[0].indicator().trend, Trend::Up);
        assert_eq!(cards[2].indicator().trend, Trend::Down);
        assert_eq!(cards[3].indicator().trend, Trend::Flat);
    }

    #[test]
    fn secondary_metrics_use_units() {
        let metrics = DashboardMetrics {
            average_ctr: 2.346,
            average_cpc: 0.8,
            average_roas: 3.1,
            ..Default::default()
        };
        assert_eq!(
            secondary_metrics(&metrics),
            vec![
                ("Avg. CTR", "2.35%".to_string()),
                ("Avg. CPC", "$0.80".to_string()),
                ("Avg. ROAS", "3.10x".to_string()),
            ]
        );
    }
}

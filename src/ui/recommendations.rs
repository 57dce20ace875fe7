use eframe::egui::{self, RichText, ScrollArea};
use serde_json::Value;

use crate::format::{
    format_currency, format_date, format_number, format_percentage, recommendation_type_info, DateStyle,
};
use crate::model::{FatiguedAd, Impact, Priority, Recommendation, RecommendationState};
use crate::store::selectors::{
    active_recommendations, filter_recommendations, recommendation_view_counts, RecommendationView,
};
use crate::theme::Theme;
use crate::ui::event::UiAction;

const COMPACT_LIMIT: usize = 3;

pub fn impact_text(impact: &Impact) -> String {
    let sign = if impact.change_percentage >= 0.0 { "+" } else { "" };
    format!("{sign}{:.0}% {}", impact.change_percentage, impact.metric)
}

/// Projected values are shown in the unit their metric uses.
pub fn format_impact_value(metric: &str, value: f64) -> String {
    match metric {
        "Conversions" | "Reach" => format_number(value),
        "CTR" | "Video Completion Rate" => format_percentage(value, 2),
        _ => format!("{value:.2}"),
    }
}

pub fn format_action_value(field: Option<&str>, value: &Value) -> String {
    match (field, value.as_f64()) {
        (Some("daily_budget" | "lifetime_budget"), Some(amount)) => format_currency(amount),
        (_, Some(number)) => format_number(number),
        _ => match value {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        },
    }
}

/// First few pending items plus the total pending count.
pub fn compact_items(recommendations: &[Recommendation]) -> (Vec<&Recommendation>, usize) {
    let active = active_recommendations(recommendations);
    let total = active.len();
    (active.into_iter().take(COMPACT_LIMIT).collect(), total)
}

pub fn empty_view_text(view: RecommendationView) -> String {
    format!("No {} recommendations", view.label())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemControls {
    pub spinner: bool,
    pub apply_enabled: bool,
    pub dismiss_enabled: bool,
    pub stale: bool,
}

/// A request in flight locks both buttons. A missing target only blocks Apply.
pub fn item_controls(busy: bool, target_exists: bool) -> ItemControls {
    ItemControls {
        spinner: busy,
        apply_enabled: !busy && target_exists,
        dismiss_enabled: !busy,
        stale: !target_exists,
    }
}

pub struct ItemContext<'a> {
    pub busy: &'a dyn Fn(&str) -> bool,
    pub target_exists: &'a dyn Fn(&Recommendation) -> bool,
}

/// Pending recommendations only. `compact` shows the dashboard summary card.
pub fn show_panel(
    ui: &mut egui::Ui,
    theme: &Theme,
    recommendations: &[Recommendation],
    compact: bool,
    context: &ItemContext<'_>,
) -> Vec<UiAction> {
    let mut actions = Vec::new();
    let (items, total) = if compact {
        compact_items(recommendations)
    } else {
        let active = active_recommendations(recommendations);
        let total = active.len();
        (active, total)
    };

    ui.horizontal(|ui| {
        ui.heading("AI Recommendations");
        if total > 0 {
            ui.label(theme.chip(&format!("{total} new"), theme.accent_primary));
        }
    });

    if items.is_empty() {
        show_empty(ui, theme);
        return actions;
    }

    for rec in items {
        show_item(ui, theme, rec, compact, context, &mut actions);
    }

    if compact && total > 0 && ui.link("View all").clicked() {
        actions.push(UiAction::ViewAllRecommendations);
    }
    actions
}

fn show_empty(ui: &mut egui::Ui, theme: &Theme) {
    theme.card_frame().show(ui, |ui| {
        ui.vertical_centered(|ui| {
            ui.label(RichText::new("✅").size(28.0));
            ui.strong("All caught up!");
            ui.label(RichText::new("No pending recommendations right now.").color(theme.text_muted));
        });
    });
}

fn show_item(
    ui: &mut egui::Ui,
    theme: &Theme,
    rec: &Recommendation,
    compact: bool,
    context: &ItemContext<'_>,
    actions: &mut Vec<UiAction>,
) {
    let accent = theme.priority_color(rec.priority);
    let controls = item_controls((context.busy)(&rec.id), (context.target_exists)(rec));
    let type_info = recommendation_type_info(rec.recommendation_type);

    theme.accent_card_frame(accent).show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.horizontal(|ui| {
            ui.label(RichText::new(Theme::priority_icon(rec.priority)).color(accent));
            ui.strong(&rec.title);
            ui.label(theme.chip(rec.priority.as_str(), accent));
        });

        if !compact {
            ui.label(
                RichText::new(format!("{} {}", type_info.icon, type_info.label))
                    .small()
                    .color(theme.text_muted),
            );
            if !rec.description.is_empty() {
                ui.label(&rec.description);
            }
        }

        if let Some(impact) = &rec.impact {
            ui.horizontal(|ui| {
                ui.label(RichText::new(impact_text(impact)).color(theme.success).strong());
                if !compact {
                    ui.label(
                        RichText::new(format!(
                            "{} → {}",
                            format_impact_value(&impact.metric, impact.current_value),
                            format_impact_value(&impact.metric, impact.projected_value)
                        ))
                        .color(theme.text_muted),
                    );
                }
            });
        }

        if !compact {
            let action = &rec.suggested_action;
            if let (Some(current), Some(suggested)) = (&action.current_value, &action.suggested_value) {
                let field = action.field.as_deref();
                ui.label(format!(
                    "{}: {} → {}",
                    field.unwrap_or("value"),
                    format_action_value(field, current),
                    format_action_value(field, suggested)
                ));
            }
            ui.label(
                RichText::new(format!("{} · {}", rec.entity_type.as_str(), rec.entity_name))
                    .small()
                    .color(theme.text_muted),
            );
        }

        if controls.stale {
            ui.label(RichText::new("Target no longer exists").small().color(theme.warning));
        }

        ui.horizontal(|ui| {
            if controls.spinner {
                ui.spinner();
            }
            if ui
                .add_enabled(controls.apply_enabled, egui::Button::new("Apply"))
                .clicked()
            {
                actions.push(UiAction::ApplyRecommendation(rec.id.clone()));
            }
            if ui
                .add_enabled(controls.dismiss_enabled, egui::Button::new("Dismiss"))
                .clicked()
            {
                actions.push(UiAction::DismissRecommendation(rec.id.clone()));
            }
        });
    });
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum FatigueCheck {
    #[default]
    NotChecked,
    Checking,
    Done(Vec<FatiguedAd>),
    Failed(String),
}

/// Full recommendations page: view tabs, priority filter and fatigue check.
#[derive(Debug, Clone, Default)]
pub struct RecommendationsPage {
    pub view: RecommendationView,
    pub priority: Option<Priority>,
}

impl RecommendationsPage {
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        theme: &Theme,
        recommendations: &[Recommendation],
        fatigue: &FatigueCheck,
        context: &ItemContext<'_>,
    ) -> Vec<UiAction> {
        let mut actions = Vec::new();
        let counts = recommendation_view_counts(recommendations);

        ui.horizontal(|ui| {
            for view in RecommendationView::OPTIONS {
                let label = format!("{} ({})", view.label(), counts.get(view));
                ui.selectable_value(&mut self.view, view, label);
            }
            ui.separator();
            egui::ComboBox::from_id_salt("recommendation_priority")
                .selected_text(self.priority.map_or("All priorities", Priority::as_str))
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut self.priority, None, "All priorities");
                    for priority in [Priority::High, Priority::Medium, Priority::Low] {
                        ui.selectable_value(&mut self.priority, Some(priority), priority.as_str());
                    }
                });
        });
        ui.separator();

        ScrollArea::vertical()
            .id_salt("recommendations_page")
            .max_height((ui.available_height() - 160.0).max(200.0))
            .show(ui, |ui| {
                if self.view == RecommendationView::Pending {
                    let pending: Vec<Recommendation> =
                        filter_recommendations(recommendations, RecommendationView::Pending, self.priority)
                            .into_iter()
                            .cloned()
                            .collect();
                    actions.extend(show_panel(ui, theme, &pending, false, context));
                } else {
                    let items = filter_recommendations(recommendations, self.view, self.priority);
                    actions.extend(self.show_list(ui, theme, &items, context));
                }
            });

        ui.separator();
        actions.extend(show_fatigue(ui, theme, fatigue));
        actions
    }

    fn show_list(
        &self,
        ui: &mut egui::Ui,
        theme: &Theme,
        items: &[&Recommendation],
        context: &ItemContext<'_>,
    ) -> Vec<UiAction> {
        let mut actions = Vec::new();
        if items.is_empty() {
            ui.label(RichText::new(empty_view_text(self.view)).color(theme.text_muted));
            return actions;
        }

        let now = chrono::Utc::now();
        for rec in items {
            if rec.is_pending() {
                show_item(ui, theme, rec, false, context, &mut actions);
                continue;
            }
            theme.card_frame().show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.horizontal(|ui| {
                    ui.strong(&rec.title);
                    let (label, color) = match rec.state {
                        RecommendationState::Applied => ("Applied", theme.success),
                        RecommendationState::Dismissed => ("Dismissed", theme.text_muted),
                        RecommendationState::Pending => ("Pending", theme.accent_primary),
                    };
                    ui.label(theme.chip(label, color));
                });
                ui.label(
                    RichText::new(format!(
                        "{} · {} · {}",
                        rec.entity_type.as_str(),
                        rec.entity_name,
                        format_date(&rec.created_time, DateStyle::Relative, now)
                    ))
                    .small()
                    .color(theme.text_muted),
                );
            });
        }
        actions
    }
}

fn show_fatigue(ui: &mut egui::Ui, theme: &Theme, fatigue: &FatigueCheck) -> Vec<UiAction> {
    let mut actions = Vec::new();
    ui.horizontal(|ui| {
        ui.strong("Creative fatigue");
        let checking = matches!(fatigue, FatigueCheck::Checking);
        if ui
            .add_enabled(!checking, egui::Button::new("Check creative fatigue"))
            .clicked()
        {
            actions.push(UiAction::CheckCreativeFatigue);
        }
        if checking {
            ui.spinner();
        }
    });

    match fatigue {
        FatigueCheck::NotChecked | FatigueCheck::Checking => {}
        FatigueCheck::Failed(message) => {
            ui.label(RichText::new(message).color(theme.danger));
        }
        FatigueCheck::Done(ads) if ads.is_empty() => {
            ui.label(RichText::new("No fatigued creatives found.").color(theme.text_muted));
        }
        FatigueCheck::Done(ads) => {
            egui::Grid::new("fatigued_ads").striped(true).num_columns(4).show(ui, |ui| {
                for header in ["Ad", "Score", "Frequency", "Suggestion"] {
                    ui.label(RichText::new(header).small().color(theme.text_muted));
                }
                ui.end_row();
                for ad in ads {
                    ui.label(&ad.ad_name);
                    ui.label(format!("{:.0}", ad.fatigue_score));
                    ui.label(format!("{:.1}", ad.frequency));
                    ui.label(&ad.recommendation);
                    ui.end_row();
                }
            });
        }
    }
    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo;
    use serde_json::json;

    #[test]
    fn impact_text_rounds_change() {
        let impact = Impact {
            metric: "Conversions".to_string(),
            current_value: 100.0,
            projected_value: 130.0,
            change_percentage: 30.0,
        };
        assert_eq!(impact_text(&impact), "+30% Conversions");

        let drop = Impact {
            change_percentage: -12.4,
            metric: "CPC".to_string(),
            ..impact
        };
        assert_eq!(impact_text(&drop), "-12% CPC");
    }

    #[test]
    fn retargeting_recommendation_renders_impact() {
        let rec = demo::recommendations()
            .into_iter()
            .find(|rec| rec.entity_name == "Retargeting")
            .expect("retargeting recommendation exists");
        assert_eq!(rec.priority, Priority::High);
        let impact = rec.impact.as_ref().expect("impact present");
        assert_eq!(impact_text(impact), "+30% Conversions");
    }

    #[test]
    fn impact_values_follow_metric_units() {
        assert_eq!(format_impact_value("Conversions", 1500.0), "1.5K");
        assert_eq!(format_impact_value("CTR", 1.2), "1.20%");
        assert_eq!(format_impact_value("Video Completion Rate", 35.0), "35.00%");
        assert_eq!(format_impact_value("ROAS", 2.456), "2.46");
    }

    #[test]
    fn budget_actions_show_currency() {
        assert_eq!(format_action_value(Some("daily_budget"), &json!(80)), "$80.00");
        assert_eq!(format_action_value(Some("bid_amount"), &json!(1.25)), "1.25");
        assert_eq!(format_action_value(None, &json!("broad")), "broad");
    }

    #[test]
    fn compact_mode_takes_first_three_pending() {
        let mut recs = demo::recommendations();
        recs[1].state = RecommendationState::Dismissed;

        let (items, total) = compact_items(&recs);
        assert_eq!(total, 4);
        let ids: Vec<&str> = items.iter().map(|rec| rec.id.as_str()).collect();
        assert_eq!(ids, vec!["rec_001", "rec_003", "rec_004"]);
    }

    #[test]
    fn compact_mode_is_empty_when_nothing_pending() {
        let mut recs = demo::recommendations();
        for rec in &mut recs {
            rec.state = RecommendationState::Applied;
        }
        let (items, total) = compact_items(&recs);
        assert!(items.is_empty());
        assert_eq!(total, 0);
    }

    #[test]
    fn controls_lock_while_busy_and_block_apply_on_stale_target() {
        assert_eq!(
            item_controls(false, true),
            ItemControls {
                spinner: false,
                apply_enabled: true,
                dismiss_enabled: true,
                stale: false
            }
        );
        let busy = item_controls(true, true);
        assert!(busy.spinner && !busy.apply_enabled && !busy.dismiss_enabled);
        let stale = item_controls(false, false);
        assert!(stale.stale && !stale.apply_enabled && stale.dismiss_enabled);
    }

    #[test]
    fn empty_view_names_the_view() {
        assert_eq!(empty_view_text(RecommendationView::Applied), "No applied recommendations");
    }
}

//! Expandable campaign → ad set → ad table.
//!
//! [`visible_rows`] decides what is on screen from the expansion sets; [`show`]
//! only draws those rows and reports clicks as [`UiAction`]s.

use std::collections::{HashMap, HashSet};

use eframe::egui::{self, RichText};

use crate::format::{budget_or_dash, format_currency, format_number, format_percentage, objective_label};
use crate::model::{CampaignNode, Entity, EntityStatus, EntityType, Insights};
use crate::theme::Theme;
use crate::ui::event::{RowMenuItem, UiAction};

const INDENT: f32 = 18.0;

#[derive(Debug, Clone, PartialEq)]
pub struct TreeRow<'a> {
    pub depth: usize,
    pub entity_type: EntityType,
    pub id: &'a str,
    pub name: &'a str,
    pub objective: Option<&'a str>,
    pub status: EntityStatus,
    pub daily_budget: Option<f64>,
    pub insights: Option<&'a Insights>,
    pub expandable: bool,
    pub expanded: bool,
    pub badge: usize,
}

impl<'a> TreeRow<'a> {
    fn new<E: Entity>(entity: &'a E, depth: usize, counts: &HashMap<String, usize>) -> Self {
        Self {
            depth,
            entity_type: E::KIND,
            id: entity.id(),
            name: entity.name(),
            objective: None,
            status: entity.status(),
            daily_budget: None,
            insights: entity.base_insights(),
            expandable: false,
            expanded: false,
            badge: counts.get(entity.id()).copied().unwrap_or(0),
        }
    }
}

/// Flattens the tree in input order. Children of a collapsed node are skipped
/// but their own expansion state is left alone.
pub fn visible_rows<'a>(
    tree: &'a [CampaignNode],
    expanded_campaigns: &HashSet<String>,
    expanded_adsets: &HashSet<String>,
    counts: &HashMap<String, usize>,
) -> Vec<TreeRow<'a>> {
    let mut rows = Vec::new();
    for node in tree {
        let campaign = &node.campaign;
        let expanded = expanded_campaigns.contains(&campaign.id);
        rows.push(TreeRow {
            objective: Some(objective_label(&campaign.objective)),
            daily_budget: campaign.daily_budget,
            expandable: !node.adsets.is_empty(),
            expanded,
            ..TreeRow::new(campaign, 0, counts)
        });
        if !expanded {
            continue;
        }

        for adset_node in &node.adsets {
            let adset = &adset_node.adset;
            let expanded = expanded_adsets.contains(&adset.id);
            rows.push(TreeRow {
                daily_budget: adset.daily_budget,
                expandable: !adset_node.ads.is_empty(),
                expanded,
                ..TreeRow::new(adset, 1, counts)
            });
            if !expanded {
                continue;
            }
            rows.extend(adset_node.ads.iter().map(|ad| TreeRow::new(ad, 2, counts)));
        }
    }
    rows
}

/// Formatted metric columns for one row. Missing values render as `-`.
#[derive(Debug, Clone, PartialEq)]
pub struct RowCells {
    pub budget: String,
    pub spend: String,
    pub impressions: String,
    pub clicks: String,
    pub ctr: String,
    pub roas: String,
    pub roas_value: Option<f64>,
}

pub fn row_cells(row: &TreeRow<'_>) -> RowCells {
    let dash = || "-".to_string();
    let budget = match row.entity_type {
        EntityType::Ad => dash(),
        _ => budget_or_dash(row.daily_budget),
    };
    match row.insights {
        Some(insights) => {
            let roas_value = insights.roas;
            RowCells {
                budget,
                spend: format_currency(insights.spend),
                impressions: format_number(insights.impressions as f64),
                clicks: format_number(insights.clicks as f64),
                ctr: format_percentage(insights.ctr, 2),
                roas: roas_value.map(|roas| format!("{roas:.2}x")).unwrap_or_else(dash),
                roas_value,
            }
        }
        None => RowCells {
            budget,
            spend: dash(),
            impressions: dash(),
            clicks: dash(),
            ctr: dash(),
            roas: dash(),
            roas_value: None,
        },
    }
}

/// Pending-recommendation count per entity id, shown as a badge.
pub fn badge_text(count: usize) -> Option<String> {
    (count > 0).then(|| format!("🤖 {count}"))
}

/// Campaign and ad set currently open in the editor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection<'a> {
    pub campaign: Option<&'a str>,
    pub adset: Option<&'a str>,
}

impl Selection<'_> {
    pub fn contains(&self, row: &TreeRow<'_>) -> bool {
        match row.entity_type {
            EntityType::Campaign => self.campaign == Some(row.id),
            EntityType::AdSet => self.adset == Some(row.id),
            EntityType::Ad => false,
        }
    }
}

pub fn show(
    ui: &mut egui::Ui,
    theme: &Theme,
    rows: &[TreeRow<'_>],
    selection: &Selection<'_>,
    busy: &dyn Fn(&str) -> bool,
) -> Vec<UiAction> {
    let mut actions = Vec::new();

    egui::Grid::new("campaign_tree")
        .num_columns(9)
        .striped(true)
        .spacing([14.0, 6.0])
        .show(ui, |ui| {
            for header in ["Name", "Status", "Budget", "Spend", "Impr.", "Clicks", "CTR", "ROAS", ""] {
                ui.label(RichText::new(header).small().color(theme.text_muted));
            }
            ui.end_row();

            for row in rows {
                show_row(ui, theme, row, selection.contains(row), busy(row.id), &mut actions);
                ui.end_row();
            }
        });

    actions
}

fn show_row(
    ui: &mut egui::Ui,
    theme: &Theme,
    row: &TreeRow<'_>,
    selected: bool,
    busy: bool,
    actions: &mut Vec<UiAction>,
) {
    let id = row.id.to_string();
    let cells = row_cells(row);

    ui.horizontal(|ui| {
        ui.add_space(row.depth as f32 * INDENT);
        if row.expandable {
            let arrow = if row.expanded { "▼" } else { "▶" };
            if ui.small_button(arrow).clicked() {
                actions.push(UiAction::ToggleExpand {
                    entity_type: row.entity_type,
                    id: id.clone(),
                });
            }
        } else {
            ui.add_space(INDENT);
        }
        let name = if selected {
            RichText::new(row.name).strong().color(theme.accent_primary)
        } else {
            RichText::new(row.name)
        };
        if ui.link(name).on_hover_text("Edit").clicked() {
            actions.push(UiAction::Edit {
                entity_type: row.entity_type,
                id: id.clone(),
            });
        }
        if let Some(objective) = row.objective {
            ui.label(RichText::new(objective).small().color(theme.text_muted));
        }
        if let Some(badge) = badge_text(row.badge) {
            ui.label(theme.chip(&badge, theme.accent_primary))
                .on_hover_text("Pending recommendations");
        }
    });

    if busy {
        ui.spinner();
    } else {
        let chip = theme.chip(row.status.label(), theme.status_color(row.status));
        let toggle = ui
            .add(egui::Button::new(chip).frame(false))
            .on_hover_text(format!("Set {}", row.status.toggled().label()));
        if toggle.clicked() {
            actions.push(UiAction::ToggleStatus {
                entity_type: row.entity_type,
                id: id.clone(),
                status: row.status,
            });
        }
    }

    ui.label(cells.budget);
    ui.label(cells.spend);
    ui.label(cells.impressions);
    ui.label(cells.clicks);
    ui.label(cells.ctr);
    match cells.roas_value {
        Some(roas) => ui.label(RichText::new(cells.roas).color(theme.roas_color(roas))),
        None => ui.label(cells.roas),
    };

    ui.menu_button("⋯", |ui| {
        for item in RowMenuItem::ALL {
            if ui.button(item.label()).clicked() {
                actions.push(UiAction::RowMenu {
                    entity_type: row.entity_type,
                    id: id.clone(),
                    item,
                });
                ui.close_menu();
            }
        }
    });
}

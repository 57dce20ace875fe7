//! Edit dialogs for the three entity levels.

use chrono::Utc;
use eframe::egui::{self, RichText};

use crate::format::{format_count, format_currency, format_date, format_percentage, objective_label, DateStyle};
use crate::model::{
    Ad, AdPatch, AdSet, AdSetPatch, Campaign, CampaignPatch, EntityPatch, EntityStatus, EntityType,
};
use crate::store::MutationTicket;
use crate::theme::Theme;

#[derive(Debug, Clone, PartialEq)]
pub enum EditTarget {
    Campaign(Campaign),
    AdSet(AdSet),
    Ad(Ad),
}

impl EditTarget {
    fn entity_type(&self) -> EntityType {
        match self {
            Self::Campaign(_) => EntityType::Campaign,
            Self::AdSet(_) => EntityType::AdSet,
            Self::Ad(_) => EntityType::Ad,
        }
    }

    fn id(&self) -> &str {
        match self {
            Self::Campaign(campaign) => &campaign.id,
            Self::AdSet(adset) => &adset.id,
            Self::Ad(ad) => &ad.id,
        }
    }
}

/// Editable copy of the entity's fields. Numbers stay text until save.
#[derive(Debug, Clone, PartialEq)]
pub struct EditDraft {
    pub name: String,
    pub status: EntityStatus,
    pub daily_budget: String,
    pub bid_amount: String,
}

fn number_text(value: Option<f64>) -> String {
    value.map(|value| value.to_string()).unwrap_or_default()
}

/// Empty input leaves the field alone.
fn parse_amount(raw: &str, label: &str) -> Result<Option<f64>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .map(Some)
        .ok_or_else(|| format!("{label} must be a number"))
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModalOutcome {
    Open,
    Save(EntityPatch),
    Cancel,
}

#[derive(Debug, Clone)]
pub struct EditModal {
    target: EditTarget,
    pub draft: EditDraft,
    saving: Option<MutationTicket>,
    error: Option<String>,
}

impl EditModal {
    pub fn open(target: EditTarget) -> Self {
        let draft = match &target {
            EditTarget::Campaign(campaign) => EditDraft {
                name: campaign.name.clone(),
                status: campaign.status,
                daily_budget: number_text(campaign.daily_budget),
                bid_amount: String::new(),
            },
            EditTarget::AdSet(adset) => EditDraft {
                name: adset.name.clone(),
                status: adset.status,
                daily_budget: number_text(adset.daily_budget),
                bid_amount: number_text(adset.bid_amount),
            },
            EditTarget::Ad(ad) => EditDraft {
                name: ad.name.clone(),
                status: ad.status,
                daily_budget: String::new(),
                bid_amount: String::new(),
            },
        };
        Self {
            target,
            draft,
            saving: None,
            error: None,
        }
    }

    pub fn entity_type(&self) -> EntityType {
        self.target.entity_type()
    }

    pub fn entity_id(&self) -> &str {
        self.target.id()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_saving(&self) -> bool {
        self.saving.is_some()
    }

    pub fn ticket(&self) -> Option<MutationTicket> {
        self.saving
    }

    /// Patch with the editable fields of the draft, or the message to show inline.
    pub fn build_patch(&self) -> Result<EntityPatch, String> {
        let name = Some(self.draft.name.trim().to_string()).filter(|name| !name.is_empty());
        let status = Some(self.draft.status);
        let id = self.target.id().to_string();

        Ok(match &self.target {
            EditTarget::Campaign(_) => EntityPatch::Campaign {
                id,
                patch: CampaignPatch {
                    name,
                    status,
                    daily_budget: parse_amount(&self.draft.daily_budget, "Daily budget")?,
                    lifetime_budget: None,
                },
            },
            EditTarget::AdSet(_) => EntityPatch::AdSet {
                id,
                patch: AdSetPatch {
                    name,
                    status,
                    daily_budget: parse_amount(&self.draft.daily_budget, "Daily budget")?,
                    bid_amount: parse_amount(&self.draft.bid_amount, "Bid amount")?,
                },
            },
            EditTarget::Ad(_) => EntityPatch::Ad {
                id,
                patch: AdPatch { name, status },
            },
        })
    }

    pub fn mark_saving(&mut self, ticket: MutationTicket) {
        self.saving = Some(ticket);
        self.error = None;
    }

    /// Back to editing with `message` shown under the form.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.saving = None;
        self.error = Some(message.into());
    }

    pub fn show(&mut self, ctx: &egui::Context, theme: &Theme) -> ModalOutcome {
        let mut outcome = ModalOutcome::Open;
        let title = match self.target.entity_type() {
            EntityType::Campaign => "Edit campaign",
            EntityType::AdSet => "Edit ad set",
            EntityType::Ad => "Edit ad",
        };

        egui::Window::new(title)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.add_enabled_ui(!self.is_saving(), |ui| self.show_form(ui));
                ui.separator();
                self.show_details(ui, theme);

                if let Some(error) = &self.error {
                    ui.label(RichText::new(error).color(theme.danger));
                }

                ui.separator();
                ui.horizontal(|ui| {
                    let saving = self.is_saving();
                    if ui.add_enabled(!saving, egui::Button::new("Cancel")).clicked() {
                        outcome = ModalOutcome::Cancel;
                    }
                    let save_label = if saving { "Saving..." } else { "Save" };
                    if ui.add_enabled(!saving, egui::Button::new(save_label)).clicked() {
                        match self.build_patch() {
                            Ok(patch) => outcome = ModalOutcome::Save(patch),
                            Err(message) => self.error = Some(message),
                        }
                    }
                    if saving {
                        ui.spinner();
                    }
                });
            });

        outcome
    }

    fn show_form(&mut self, ui: &mut egui::Ui) {
        let entity_type = self.target.entity_type();
        egui::Grid::new("edit_form").num_columns(2).spacing([12.0, 8.0]).show(ui, |ui| {
            ui.label("Name");
            ui.text_edit_singleline(&mut self.draft.name);
            ui.end_row();

            if entity_type != EntityType::Ad {
                ui.label("Daily budget");
                ui.add(egui::TextEdit::singleline(&mut self.draft.daily_budget).hint_text("0.00"));
                ui.end_row();
            }

            if entity_type == EntityType::AdSet {
                ui.label("Bid amount");
                ui.add(egui::TextEdit::singleline(&mut self.draft.bid_amount).hint_text("0.00"));
                ui.end_row();
            }

            ui.label("Status");
            ui.horizontal(|ui| {
                ui.selectable_value(&mut self.draft.status, EntityStatus::Active, "Active");
                ui.selectable_value(&mut self.draft.status, EntityStatus::Paused, "Paused");
            });
            ui.end_row();
        });
    }

    fn show_details(&self, ui: &mut egui::Ui, theme: &Theme) {
        let lines = detail_lines(&self.target);
        if lines.is_empty() {
            return;
        }
        egui::Grid::new("edit_details").num_columns(2).show(ui, |ui| {
            for (label, value) in lines {
                ui.label(RichText::new(label).color(theme.text_muted));
                ui.label(value);
                ui.end_row();
            }
        });
    }
}

/// Read-only facts shown under the form.
pub fn detail_lines(target: &EditTarget) -> Vec<(&'static str, String)> {
    match target {
        EditTarget::Campaign(campaign) => {
            let mut lines = vec![
                ("Objective", objective_label(&campaign.objective).to_string()),
                ("Created", format_date(&campaign.created_time, DateStyle::Short, Utc::now())),
            ];
            if let Some(insights) = &campaign.insights {
                if let Some(roas) = insights.roas {
                    lines.push(("ROAS", format!("{roas:.2}x")));
                }
                if let Some(conversions) = insights.conversions {
                    lines.push(("Conversions", format_count(conversions)));
                }
                lines.push(("Spend", format_currency(insights.spend)));
            }
            lines
        }
        EditTarget::AdSet(adset) => adset
            .targeting
            .as_ref()
            .map(|targeting| targeting.summary())
            .unwrap_or_default(),
        EditTarget::Ad(ad) => {
            let mut lines = Vec::new();
            if let Some(creative) = &ad.creative {
                if let Some(title) = &creative.title {
                    lines.push(("Title", title.clone()));
                }
                if let Some(body) = &creative.body {
                    lines.push(("Body", body.clone()));
                }
                if let Some(cta) = &creative.call_to_action_type {
                    lines.push(("Call to action", cta.replace('_', " ")));
                }
            }
            if let Some(insights) = &ad.insights {
                let base = &insights.adset.base;
                lines.push(("Spend", format_currency(base.spend)));
                lines.push(("Impressions", format_count(base.impressions)));
                lines.push(("Clicks", format_count(base.clicks)));
                lines.push(("CTR", format_percentage(base.ctr, 2)));
            }
            lines
        }
    }
}

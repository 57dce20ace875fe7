use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Duration;

use chrono::Local;
use eframe::egui::{self, RichText, ScrollArea};
use tracing::{debug, info};

use crate::backend::Backend;
use crate::error::ApiResult;
use crate::event::AppEvent;
use crate::model::{
    BulkStatusResult, ConnectionPayload, DatePreset, DateRange, EntityPatch, EntityStatus, EntityType,
    FiltersPatch, Platform,
};
use crate::store::selectors::{
    campaign_status_counts, dashboard_metrics, filtered_tree, high_priority_recommendations,
    recommendation_counts, target_exists, CampaignStatusFilter,
};
use crate::store::{Action, ActionKind, FetchStatus, MutationTicket, RecommendationAction, Slice, Store};
use crate::theme::Theme;
use crate::ui::event::UiAction;
use crate::ui::modals::{EditModal, EditTarget, ModalOutcome};
use crate::ui::recommendations::{self, FatigueCheck, ItemContext, RecommendationsPage};
use crate::ui::wizard::{self, ConnectionWizard, WizardOutcome};
use crate::ui::{metrics, tree};

const REPAINT_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Dashboard,
    Campaigns,
    Recommendations,
    Integrations,
}

impl Page {
    pub const ALL: [Page; 4] = [Self::Dashboard, Self::Campaigns, Self::Recommendations, Self::Integrations];

    pub fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Campaigns => "Campaigns",
            Self::Recommendations => "Recommendations",
            Self::Integrations => "Integrations",
        }
    }
}

/// Per-ticket outcome of a bulk status call. Ids the backend lists as failed
/// roll back; a failed call rolls back everything.
pub fn bulk_outcomes(
    tickets: &[(MutationTicket, String)],
    result: &ApiResult<BulkStatusResult>,
) -> Vec<(MutationTicket, Result<(), String>)> {
    tickets
        .iter()
        .map(|(ticket, id)| {
            let outcome = match result {
                Ok(bulk) if bulk.failed.contains(id) => Err(format!("Failed to update {id}")),
                Ok(_) => Ok(()),
                Err(err) => Err(err.user_message()),
            };
            (*ticket, outcome)
        })
        .collect()
}

pub struct AdpilotApp {
    rx: Receiver<AppEvent>,
    backend: Backend,
    store: Store,
    theme: Theme,
    visuals_applied: bool,
    page: Page,
    search_input: String,
    campaign_filter: CampaignStatusFilter,
    recommendations_page: RecommendationsPage,
    fatigue: FatigueCheck,
    edit_modal: Option<EditModal>,
    wizard: Option<ConnectionWizard>,
    connection: Option<ConnectionPayload>,
    diagnostics_log: Vec<String>,
}

impl AdpilotApp {
    pub fn new(rx: Receiver<AppEvent>, backend: Backend, warnings: Vec<String>) -> Self {
        let mut app = Self {
            rx,
            backend,
            store: Store::default(),
            theme: Theme::default(),
            visuals_applied: false,
            page: Page::Dashboard,
            search_input: String::new(),
            campaign_filter: CampaignStatusFilter::default(),
            recommendations_page: RecommendationsPage::default(),
            fatigue: FatigueCheck::default(),
            edit_modal: None,
            wizard: None,
            connection: None,
            diagnostics_log: Vec::new(),
        };

        for warning in warnings {
            app.log_diagnostic(format!("config warning: {warning}"));
        }
        app.log_diagnostic(format!("gateway mode: {}", app.backend.mode().label()));
        app.reload();
        app
    }

    fn timestamp() -> String {
        Local::now().format("%H:%M:%S").to_string()
    }

    fn log_diagnostic(&mut self, message: impl Into<String>) {
        self.diagnostics_log
            .push(format!("[{}] {}", Self::timestamp(), message.into()));
    }

    fn reload(&mut self) {
        for slice in Slice::ALL {
            self.store.dispatch(Action::SliceLoading(slice));
        }
        self.backend.load_all(self.store.filters().date_range.clone());
    }

    fn start_sync(&mut self) {
        if self.store.is_syncing() {
            return;
        }
        self.store.dispatch(Action::SyncStarted);
        self.backend.sync_all();
    }

    fn needs_repaint(&self) -> bool {
        self.store.is_loading()
            || self.store.is_syncing()
            || self.store.has_in_flight()
            || matches!(self.fatigue, FatigueCheck::Checking)
            || self.wizard.as_ref().is_some_and(ConnectionWizard::is_authorizing)
    }

    fn drain_events(&mut self) {
        loop {
            match self.rx.try_recv() {
                Ok(event) => self.apply_event(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.log_diagnostic("event channel disconnected");
                    break;
                }
            }
        }
    }

    fn slice_result<T>(&mut self, slice: Slice, result: ApiResult<T>, set: impl FnOnce(T) -> Action) {
        match result {
            Ok(value) => self.store.dispatch(set(value)),
            Err(err) => self
                .store
                .dispatch(Action::SliceFailed(slice, err.user_message())),
        }
    }

    fn apply_event(&mut self, event: AppEvent) {
        self.log_diagnostic(event.summary());
        match event {
            AppEvent::CampaignsLoaded(result) => self.slice_result(Slice::Campaigns, result, Action::SetCampaigns),
            AppEvent::AdSetsLoaded(result) => self.slice_result(Slice::AdSets, result, Action::SetAdSets),
            AppEvent::AdsLoaded(result) => self.slice_result(Slice::Ads, result, Action::SetAds),
            AppEvent::RecommendationsLoaded(result) => {
                self.slice_result(Slice::Recommendations, result, Action::SetRecommendations)
            }
            AppEvent::MetricsLoaded(result) => self.slice_result(Slice::Metrics, result, Action::SetMetrics),
            AppEvent::SyncFinished(Ok(snapshot)) => self.store.dispatch(Action::SyncSucceeded(snapshot)),
            AppEvent::SyncFinished(Err(err)) => self.store.dispatch(Action::SyncFailed(err.user_message())),
            AppEvent::MutationSettled { ticket, result } => {
                let outcome = result.map_err(|err| err.user_message());
                self.store.dispatch(Action::SettleMutation {
                    ticket,
                    outcome: outcome.clone(),
                });
                if self.edit_modal.as_ref().and_then(EditModal::ticket) == Some(ticket) {
                    match outcome {
                        Ok(()) => self.close_editor(),
                        Err(message) => {
                            if let Some(modal) = self.edit_modal.as_mut() {
                                modal.fail(message);
                            }
                        }
                    }
                }
            }
            AppEvent::BulkStatusSettled { tickets, result } => {
                for (ticket, outcome) in bulk_outcomes(&tickets, &result) {
                    self.store.dispatch(Action::SettleMutation { ticket, outcome });
                }
            }
            AppEvent::RecommendationSettled { id, action, result } => {
                self.store.dispatch(Action::SettleRecommendation {
                    id,
                    action,
                    outcome: result.map_err(|err| err.user_message()),
                });
            }
            AppEvent::CreativeFatigueChecked(result) => {
                self.fatigue = match result {
                    Ok(ads) => FatigueCheck::Done(ads),
                    Err(err) => FatigueCheck::Failed(err.user_message()),
                };
            }
            AppEvent::AssetsAuthorized(assets) => {
                if let Some(wizard) = self.wizard.as_mut() {
                    wizard.authorized(assets);
                }
            }
        }
    }

    fn handle_action(&mut self, action: UiAction) {
        debug!(target: "adpilot::ui", action = %action.to_log_line(), "ui action");
        self.log_diagnostic(action.to_log_line());
        match action {
            UiAction::ToggleExpand { entity_type, id } => match entity_type {
                EntityType::Campaign => self.store.dispatch(Action::ToggleCampaignExpand(id)),
                EntityType::AdSet => self.store.dispatch(Action::ToggleAdSetExpand(id)),
                EntityType::Ad => {}
            },
            UiAction::ToggleStatus {
                entity_type,
                id,
                status,
            } => {
                let patch = EntityPatch::status(entity_type, id, status.toggled());
                match self.store.begin_mutation(patch.clone(), ActionKind::StatusToggle) {
                    Some(ticket) => self.backend.update_entity(ticket, patch),
                    None => self.log_diagnostic(format!("status change for {} ignored", patch.id())),
                }
            }
            UiAction::Edit { entity_type, id } => self.open_editor(entity_type, &id),
            UiAction::RowMenu { .. } => {}
            UiAction::ApplyRecommendation(id) => {
                let Some(rec) = self.store.recommendations().iter().find(|rec| rec.id == id).cloned() else {
                    return;
                };
                if self.store.begin_recommendation(&id, RecommendationAction::Apply) {
                    self.backend.apply_recommendation(rec);
                }
            }
            UiAction::DismissRecommendation(id) => {
                if self.store.begin_recommendation(&id, RecommendationAction::Dismiss) {
                    self.backend.dismiss_recommendation(id);
                }
            }
            UiAction::ViewAllRecommendations => self.page = Page::Recommendations,
            UiAction::CheckCreativeFatigue => {
                self.fatigue = FatigueCheck::Checking;
                self.backend.check_creative_fatigue();
            }
        }
    }

    fn open_editor(&mut self, entity_type: EntityType, id: &str) {
        let target = match entity_type {
            EntityType::Campaign => {
                self.store.dispatch(Action::SelectCampaign(Some(id.to_string())));
                self.store
                    .campaigns()
                    .iter()
                    .find(|campaign| campaign.id == id)
                    .cloned()
                    .map(EditTarget::Campaign)
            }
            EntityType::AdSet => {
                self.store.dispatch(Action::SelectAdSet(Some(id.to_string())));
                self.store
                    .adsets()
                    .iter()
                    .find(|adset| adset.id == id)
                    .cloned()
                    .map(EditTarget::AdSet)
            }
            EntityType::Ad => self.store.ads().iter().find(|ad| ad.id == id).cloned().map(EditTarget::Ad),
        };
        self.edit_modal = target.map(EditModal::open);
    }

    fn save_edit(&mut self, patch: EntityPatch) {
        let Some(modal) = self.edit_modal.as_mut() else {
            return;
        };
        match self.store.begin_mutation(patch.clone(), ActionKind::Edit) {
            Some(ticket) => {
                modal.mark_saving(ticket);
                self.backend.update_entity(ticket, patch);
            }
            None => modal.fail("This item is already being saved or no longer exists"),
        }
    }

    fn close_editor(&mut self) {
        self.edit_modal = None;
        self.store.dispatch(Action::SelectCampaign(None));
        self.store.dispatch(Action::SelectAdSet(None));
    }

    /// Sets every visible campaign not already in `status` to `status`.
    fn bulk_set_status(&mut self, status: EntityStatus) {
        let ids: Vec<String> = filtered_tree(&self.store, self.campaign_filter)
            .into_iter()
            .filter(|node| node.campaign.status != status)
            .map(|node| node.campaign.id)
            .collect();

        let tickets: Vec<(MutationTicket, String)> = ids
            .into_iter()
            .filter_map(|id| {
                let patch = EntityPatch::status(EntityType::Campaign, id.clone(), status);
                self.store
                    .begin_mutation(patch, ActionKind::StatusToggle)
                    .map(|ticket| (ticket, id))
            })
            .collect();

        if tickets.is_empty() {
            return;
        }
        info!(target: "adpilot::ui", count = tickets.len(), status = status.as_str(), "bulk status change");
        self.backend.bulk_update_status(EntityType::Campaign, tickets, status);
    }

    fn set_date_preset(&mut self, preset: DatePreset) {
        let range = DateRange::from_preset(preset, Local::now().date_naive());
        self.store.dispatch(Action::SetFilters(FiltersPatch::date_range(range)));
        self.reload();
    }

    fn render_top_bar(&mut self, ctx: &egui::Context) {
        let mut preset_choice = None;
        let mut platform_choice = None;
        let mut sync_now = false;
        let mut search_changed = false;

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.strong("AdPilot");
                ui.separator();

                search_changed = ui
                    .add(
                        egui::TextEdit::singleline(&mut self.search_input)
                            .hint_text("Search campaigns...")
                            .desired_width(220.0),
                    )
                    .changed();

                let current = self.store.filters().date_range.preset;
                egui::ComboBox::from_id_salt("date_preset")
                    .selected_text(current.map_or("Custom", DatePreset::label))
                    .show_ui(ui, |ui| {
                        for preset in DatePreset::PICKABLE {
                            if ui.selectable_label(current == Some(preset), preset.label()).clicked() {
                                preset_choice = Some(preset);
                            }
                        }
                    });

                ui.separator();
                let platform = self.store.filters().platform;
                for option in [Platform::All, Platform::Meta] {
                    if ui.selectable_label(platform == option, option.label()).clicked() {
                        platform_choice = Some(option);
                    }
                }
                ui.add_enabled(false, egui::Button::new(Platform::Google.label()));
                ui.label(self.theme.chip("SOON", self.theme.text_muted));

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let syncing = self.store.is_syncing();
                    let label = if syncing { "Syncing..." } else { "Sync" };
                    sync_now = ui.add_enabled(!syncing, egui::Button::new(label)).clicked();
                    if syncing {
                        ui.spinner();
                    }
                    ui.label(self.theme.chip(self.backend.mode().label(), self.theme.accent_primary));
                });
            });
        });

        if search_changed {
            self.store
                .dispatch(Action::SetFilters(FiltersPatch::search(self.search_input.clone())));
        }
        if let Some(preset) = preset_choice {
            self.set_date_preset(preset);
        }
        if let Some(platform) = platform_choice {
            self.store.dispatch(Action::SetFilters(FiltersPatch::platform(platform)));
        }
        if sync_now {
            self.start_sync();
        }
    }

    fn render_left_panel(&mut self, ctx: &egui::Context) {
        let pending = crate::store::selectors::active_recommendations(self.store.recommendations()).len();
        egui::SidePanel::left("navigation")
            .resizable(false)
            .exact_width(190.0)
            .show(ctx, |ui| {
                ui.add_space(self.theme.spacing_8);
                for page in Page::ALL {
                    let label = match page {
                        Page::Recommendations if pending > 0 => format!("{} ({pending})", page.label()),
                        _ => page.label().to_string(),
                    };
                    ui.selectable_value(&mut self.page, page, label);
                }
            });
    }

    fn render_error_banner(&mut self, ui: &mut egui::Ui) {
        let Some(error) = self.store.error().map(str::to_string) else {
            return;
        };
        let mut dismiss = false;
        self.theme.banner_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.label(RichText::new(&error).color(self.theme.text_primary));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    dismiss = ui.small_button("Dismiss").clicked();
                });
            });
        });
        if dismiss {
            self.store.dispatch(Action::DismissError);
        }
    }

    /// Loading spinners and failure notices for the given slices. Returns true
    /// when the user asked to retry.
    fn render_slice_status(&self, ui: &mut egui::Ui, slices: &[Slice]) -> bool {
        let mut retry = false;
        for slice in slices {
            match self.store.fetch_status(*slice) {
                FetchStatus::Loading => {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label(RichText::new(format!("Loading {}...", slice.as_str())).color(self.theme.text_muted));
                    });
                }
                FetchStatus::Failed(message) => {
                    ui.horizontal(|ui| {
                        ui.label(
                            RichText::new(format!("Couldn't load {}: {message}", slice.as_str()))
                                .color(self.theme.danger),
                        );
                        retry |= ui.small_button("Retry").clicked();
                    });
                }
                FetchStatus::Idle | FetchStatus::Loaded => {}
            }
        }
        retry
    }

    fn render_tree(&self, ui: &mut egui::Ui, local: CampaignStatusFilter) -> Vec<UiAction> {
        let nodes = filtered_tree(&self.store, local);
        let counts = recommendation_counts(&self.store);
        let rows = tree::visible_rows(
            &nodes,
            self.store.expanded_campaigns(),
            self.store.expanded_adsets(),
            &counts,
        );
        if rows.is_empty() {
            ui.label(RichText::new("No campaigns match the current filters.").color(self.theme.text_muted));
            return Vec::new();
        }
        let selection = tree::Selection {
            campaign: self.store.selected_campaign(),
            adset: self.store.selected_adset(),
        };
        let busy = |id: &str| self.store.is_in_flight(id, ActionKind::StatusToggle);
        tree::show(ui, &self.theme, &rows, &selection, &busy)
    }

    fn render_dashboard(&self, ui: &mut egui::Ui) -> Vec<UiAction> {
        let mut actions = Vec::new();
        let high = high_priority_recommendations(&self.store).len();
        let pending = crate::store::selectors::active_recommendations(self.store.recommendations()).len();
        if pending > 0 {
            ui.horizontal(|ui| {
                ui.label(
                    RichText::new(format!("🤖 {pending} AI recommendations available"))
                        .color(self.theme.accent_primary)
                        .strong(),
                );
                if high > 0 {
                    ui.label(self.theme.chip(&format!("{high} high priority"), self.theme.danger));
                }
                if ui.link("Review").clicked() {
                    actions.push(UiAction::ViewAllRecommendations);
                }
            });
        }

        let metrics_loading = self.store.fetch_status(Slice::Metrics).is_loading()
            && self.store.fetch_status(Slice::Campaigns).is_loading();
        metrics::show(ui, &self.theme, &dashboard_metrics(&self.store), metrics_loading);
        ui.add_space(self.theme.spacing_12);

        ui.columns(2, |columns| {
            columns[0].heading("Campaigns");
            ScrollArea::both()
                .id_salt("dashboard_tree")
                .max_height(420.0)
                .show(&mut columns[0], |ui| {
                    actions.extend(self.render_tree(ui, CampaignStatusFilter::All));
                });

            let store = &self.store;
            let busy = |id: &str| {
                store.is_in_flight(id, ActionKind::Apply) || store.is_in_flight(id, ActionKind::Dismiss)
            };
            let exists = |rec: &crate::model::Recommendation| target_exists(store, rec);
            let context = ItemContext {
                busy: &busy,
                target_exists: &exists,
            };
            actions.extend(recommendations::show_panel(
                &mut columns[1],
                &self.theme,
                store.recommendations(),
                true,
                &context,
            ));
        });

        actions
    }

    fn render_campaigns(&mut self, ui: &mut egui::Ui) -> Vec<UiAction> {
        let counts = campaign_status_counts(&self.store);
        let mut bulk = None;
        ui.horizontal(|ui| {
            ui.heading("Campaigns");
            ui.separator();
            for filter in CampaignStatusFilter::OPTIONS {
                let count = match filter {
                    CampaignStatusFilter::All => counts.all,
                    CampaignStatusFilter::Active => counts.active,
                    CampaignStatusFilter::Paused => counts.paused,
                };
                ui.selectable_value(&mut self.campaign_filter, filter, format!("{} ({count})", filter.label()));
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Activate visible").clicked() {
                    bulk = Some(EntityStatus::Active);
                }
                if ui.button("Pause visible").clicked() {
                    bulk = Some(EntityStatus::Paused);
                }
            });
        });
        if let Some(status) = bulk {
            self.bulk_set_status(status);
        }

        let mut actions = Vec::new();
        ScrollArea::both().id_salt("campaigns_tree").show(ui, |ui| {
            actions = self.render_tree(ui, self.campaign_filter);
        });
        actions
    }

    fn render_recommendations(&mut self, ui: &mut egui::Ui) -> Vec<UiAction> {
        ui.heading("Recommendations");
        let store = &self.store;
        let busy = |id: &str| store.is_in_flight(id, ActionKind::Apply) || store.is_in_flight(id, ActionKind::Dismiss);
        let exists = |rec: &crate::model::Recommendation| target_exists(store, rec);
        let context = ItemContext {
            busy: &busy,
            target_exists: &exists,
        };
        self.recommendations_page
            .show(ui, &self.theme, store.recommendations(), &self.fatigue, &context)
    }

    fn render_center_panel(&mut self, ctx: &egui::Context) {
        let mut actions = Vec::new();
        let mut retry = false;
        let mut open_wizard = false;

        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_error_banner(ui);
            let slices: &[Slice] = match self.page {
                Page::Dashboard => &Slice::ALL,
                Page::Campaigns => &[Slice::Campaigns, Slice::AdSets, Slice::Ads],
                Page::Recommendations => &[Slice::Recommendations],
                Page::Integrations => &[],
            };
            retry = self.render_slice_status(ui, slices);

            match self.page {
                Page::Dashboard => actions = self.render_dashboard(ui),
                Page::Campaigns => actions = self.render_campaigns(ui),
                Page::Recommendations => actions = self.render_recommendations(ui),
                Page::Integrations => {
                    open_wizard = wizard::show_integrations(ui, &self.theme, &mut self.connection);
                }
            }

            ui.separator();
            egui::CollapsingHeader::new("Diagnostics")
                .default_open(false)
                .show(ui, |ui| {
                    ScrollArea::vertical()
                        .id_salt("diagnostics_log")
                        .max_height(120.0)
                        .stick_to_bottom(true)
                        .show(ui, |ui| {
                            for entry in &self.diagnostics_log {
                                ui.label(RichText::new(entry).monospace().small());
                            }
                        });
                });
        });

        for action in actions {
            self.handle_action(action);
        }
        if retry {
            self.reload();
        }
        if open_wizard {
            self.wizard = Some(ConnectionWizard::new());
        }
    }

    fn render_modals(&mut self, ctx: &egui::Context) {
        if let Some(modal) = self.edit_modal.as_mut() {
            match modal.show(ctx, &self.theme) {
                ModalOutcome::Open => {}
                ModalOutcome::Cancel => self.close_editor(),
                ModalOutcome::Save(patch) => self.save_edit(patch),
            }
        }

        if let Some(wizard) = self.wizard.as_mut() {
            match wizard.show(ctx, &self.theme) {
                WizardOutcome::Open => {}
                WizardOutcome::Authorize => self.backend.authorize(),
                WizardOutcome::Close => self.wizard = None,
                WizardOutcome::Complete(payload) => {
                    info!(target: "adpilot::ui", ad_account = %payload.selected_ad_account_id, "meta connection saved");
                    self.log_diagnostic(format!("connected ad account {}", payload.selected_ad_account_id));
                    self.connection = Some(payload);
                    self.wizard = None;
                }
            }
        }
    }
}

impl eframe::App for AdpilotApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.visuals_applied {
            self.theme.apply_visuals(ctx);
            self.visuals_applied = true;
        }

        self.drain_events();
        self.render_top_bar(ctx);
        self.render_left_panel(ctx);
        self.render_center_panel(ctx);
        self.render_modals(ctx);

        if self.needs_repaint() {
            ctx.request_repaint_after(REPAINT_INTERVAL);
        }
    }
}

//! Four-step Meta connection wizard and the integration summary it feeds.

use eframe::egui::{self, RichText};

use crate::model::{AccessMode, ConnectableAssets, ConnectionPayload};
use crate::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WizardStep {
    Connect,
    Permissions,
    AdAccount,
    Review,
}

impl WizardStep {
    pub const ALL: [WizardStep; 4] = [Self::Connect, Self::Permissions, Self::AdAccount, Self::Review];

    pub fn number(self) -> usize {
        match self {
            Self::Connect => 1,
            Self::Permissions => 2,
            Self::AdAccount => 3,
            Self::Review => 4,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Connect => "Connect",
            Self::Permissions => "Permissions",
            Self::AdAccount => "Ad account",
            Self::Review => "Review",
        }
    }

    fn next(self) -> Self {
        match self {
            Self::Connect => Self::Permissions,
            Self::Permissions => Self::AdAccount,
            Self::AdAccount | Self::Review => Self::Review,
        }
    }

    fn previous(self) -> Self {
        match self {
            Self::Connect | Self::Permissions => Self::Connect,
            Self::AdAccount => Self::Permissions,
            Self::Review => Self::AdAccount,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Pages,
    Businesses,
    Instagram,
}

impl AssetKind {
    pub const ALL: [AssetKind; 3] = [Self::Pages, Self::Businesses, Self::Instagram];

    pub fn label(self) -> &'static str {
        match self {
            Self::Pages => "Facebook pages",
            Self::Businesses => "Businesses",
            Self::Instagram => "Instagram accounts",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetSelection {
    pub mode: AccessMode,
    pub selected: Vec<String>,
}

impl AssetSelection {
    fn toggle(&mut self, id: &str) {
        match self.selected.iter().position(|selected| selected == id) {
            Some(index) => {
                self.selected.remove(index);
            }
            None => self.selected.push(id.to_string()),
        }
    }

    fn is_selected(&self, id: &str) -> bool {
        self.selected.iter().any(|selected| selected == id)
    }

    /// Ids to send; an `All` grant carries none.
    fn payload_ids(&self) -> Vec<String> {
        match self.mode {
            AccessMode::All => Vec::new(),
            AccessMode::Selected => self.selected.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WizardOutcome {
    Open,
    Authorize,
    Complete(ConnectionPayload),
    Close,
}

#[derive(Debug, Clone)]
pub struct ConnectionWizard {
    step: WizardStep,
    authorizing: bool,
    assets: ConnectableAssets,
    pages: AssetSelection,
    businesses: AssetSelection,
    instagram: AssetSelection,
    ad_account: Option<String>,
}

impl Default for ConnectionWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionWizard {
    pub fn new() -> Self {
        Self {
            step: WizardStep::Connect,
            authorizing: false,
            assets: ConnectableAssets::default(),
            pages: AssetSelection::default(),
            businesses: AssetSelection::default(),
            instagram: AssetSelection::default(),
            ad_account: None,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn is_authorizing(&self) -> bool {
        self.authorizing
    }

    /// Returns true when the caller should start the OAuth round trip.
    pub fn start_authorize(&mut self) -> bool {
        if self.step != WizardStep::Connect || self.authorizing {
            return false;
        }
        self.authorizing = true;
        true
    }

    /// Stores the granted assets and moves to permissions. Ignored unless an
    /// authorisation started by this wizard is pending.
    pub fn authorized(&mut self, assets: ConnectableAssets) {
        if !self.authorizing {
            return;
        }
        self.authorizing = false;
        self.assets = assets;
        self.step = WizardStep::Permissions;
    }

    pub fn can_go_next(&self) -> bool {
        match self.step {
            _ if self.authorizing => false,
            WizardStep::AdAccount => self.ad_account.is_some(),
            WizardStep::Review => false,
            WizardStep::Connect | WizardStep::Permissions => true,
        }
    }

    pub fn next(&mut self) {
        if self.can_go_next() {
            self.step = self.step.next();
        }
    }

    pub fn back(&mut self) {
        if !self.authorizing {
            self.step = self.step.previous();
        }
    }

    pub fn selection(&self, kind: AssetKind) -> &AssetSelection {
        match kind {
            AssetKind::Pages => &self.pages,
            AssetKind::Businesses => &self.businesses,
            AssetKind::Instagram => &self.instagram,
        }
    }

    fn selection_mut(&mut self, kind: AssetKind) -> &mut AssetSelection {
        match kind {
            AssetKind::Pages => &mut self.pages,
            AssetKind::Businesses => &mut self.businesses,
            AssetKind::Instagram => &mut self.instagram,
        }
    }

    pub fn set_mode(&mut self, kind: AssetKind, mode: AccessMode) {
        self.selection_mut(kind).mode = mode;
    }

    pub fn toggle_asset(&mut self, kind: AssetKind, id: &str) {
        self.selection_mut(kind).toggle(id);
    }

    pub fn select_ad_account(&mut self, id: &str) {
        self.ad_account = Some(id.to_string());
    }

    /// The finished payload. Only available on the review step.
    pub fn complete(&self) -> Option<ConnectionPayload> {
        if self.step != WizardStep::Review {
            return None;
        }
        Some(ConnectionPayload {
            pages_access_mode: self.pages.mode,
            selected_page_ids: self.pages.payload_ids(),
            business_access_mode: self.businesses.mode,
            selected_business_ids: self.businesses.payload_ids(),
            instagram_access_mode: self.instagram.mode,
            selected_instagram_ids: self.instagram.payload_ids(),
            selected_ad_account_id: self.ad_account.clone()?,
        })
    }

    fn assets_of(&self, kind: AssetKind) -> Vec<(String, String)> {
        match kind {
            AssetKind::Pages => self.assets.pages.iter().map(|page| (page.id.clone(), page.name.clone())).collect(),
            AssetKind::Businesses => self
                .assets
                .businesses
                .iter()
                .map(|business| (business.id.clone(), business.name.clone()))
                .collect(),
            AssetKind::Instagram => self
                .assets
                .instagram_accounts
                .iter()
                .map(|account| (account.id.clone(), account.username.clone()))
                .collect(),
        }
    }

    pub fn show(&mut self, ctx: &egui::Context, theme: &Theme) -> WizardOutcome {
        let mut outcome = WizardOutcome::Open;

        egui::Window::new("Connect Meta account")
            .collapsible(false)
            .resizable(false)
            .default_width(520.0)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    for step in WizardStep::ALL {
                        let color = if step == self.step {
                            theme.accent_primary
                        } else if step < self.step {
                            theme.success
                        } else {
                            theme.text_muted
                        };
                        ui.label(RichText::new(format!("{} {}", step.number(), step.title())).color(color));
                    }
                });
                ui.label(
                    RichText::new(format!("Step {} of 4", self.step.number()))
                        .small()
                        .color(theme.text_muted),
                );
                ui.separator();

                match self.step {
                    WizardStep::Connect => {
                        if self.show_connect(ui, theme) {
                            outcome = WizardOutcome::Authorize;
                        }
                    }
                    WizardStep::Permissions => self.show_permissions(ui, theme),
                    WizardStep::AdAccount => self.show_ad_accounts(ui),
                    WizardStep::Review => self.show_review(ui, theme),
                }

                ui.separator();
                ui.horizontal(|ui| {
                    let back_label = if self.step == WizardStep::Connect { "Cancel" } else { "Back" };
                    if ui
                        .add_enabled(!self.authorizing, egui::Button::new(back_label))
                        .clicked()
                    {
                        if self.step == WizardStep::Connect {
                            outcome = WizardOutcome::Close;
                        } else {
                            self.back();
                        }
                    }

                    if self.step == WizardStep::Review {
                        if ui.button("Complete").clicked() {
                            if let Some(payload) = self.complete() {
                                outcome = WizardOutcome::Complete(payload);
                            }
                        }
                    } else if ui
                        .add_enabled(self.can_go_next(), egui::Button::new("Next"))
                        .clicked()
                    {
                        self.next();
                    }
                });
            });

        outcome
    }

    fn show_connect(&mut self, ui: &mut egui::Ui, theme: &Theme) -> bool {
        ui.label("Sign in with Facebook to let AdPilot read and manage your ad accounts.");
        let mut requested = false;
        ui.horizontal(|ui| {
            if ui
                .add_enabled(!self.authorizing, egui::Button::new("Continue with Facebook"))
                .clicked()
            {
                requested = self.start_authorize();
            }
            if self.authorizing {
                ui.spinner();
                ui.label(RichText::new("Waiting for authorisation...").color(theme.text_muted));
            }
        });
        requested
    }

    fn show_permissions(&mut self, ui: &mut egui::Ui, theme: &Theme) {
        for kind in AssetKind::ALL {
            ui.strong(kind.label());
            let mut mode = self.selection(kind).mode;
            ui.horizontal(|ui| {
                ui.radio_value(&mut mode, AccessMode::All, "All");
                ui.radio_value(&mut mode, AccessMode::Selected, "Only selected");
            });
            self.set_mode(kind, mode);

            if mode == AccessMode::Selected {
                let assets = self.assets_of(kind);
                if assets.is_empty() {
                    ui.label(RichText::new("Nothing available").color(theme.text_muted));
                }
                for (id, name) in assets {
                    let mut checked = self.selection(kind).is_selected(&id);
                    if ui.checkbox(&mut checked, name).changed() {
                        self.toggle_asset(kind, &id);
                    }
                }
            }
            ui.add_space(theme.spacing_8);
        }
    }

    fn show_ad_accounts(&mut self, ui: &mut egui::Ui) {
        ui.label("Choose the ad account to manage.");
        let accounts = self.assets.ad_accounts.clone();
        for account in accounts {
            let selected = self.ad_account.as_deref() == Some(account.id.as_str());
            let label = format!("{} ({})", account.name, account.account_id);
            if ui.radio(selected, label).clicked() {
                self.select_ad_account(&account.id);
            }
        }
    }

    fn show_review(&self, ui: &mut egui::Ui, theme: &Theme) {
        egui::Grid::new("wizard_review").num_columns(2).show(ui, |ui| {
            for kind in AssetKind::ALL {
                let selection = self.selection(kind);
                ui.label(RichText::new(kind.label()).color(theme.text_muted));
                ui.label(access_summary(selection.mode, selection.selected.len()));
                ui.end_row();
            }
            let account = self
                .ad_account
                .as_deref()
                .and_then(|id| self.assets.ad_accounts.iter().find(|account| account.id == id))
                .map(|account| format!("{} ({})", account.name, account.account_id))
                .unwrap_or_else(|| "-".to_string());
            ui.label(RichText::new("Ad account").color(theme.text_muted));
            ui.label(account);
            ui.end_row();
        });
    }
}

pub fn access_summary(mode: AccessMode, selected: usize) -> String {
    match mode {
        AccessMode::All => "All".to_string(),
        AccessMode::Selected => format!("{selected} selected"),
    }
}

/// Integrations page body. Returns true when the wizard should open.
pub fn show_integrations(
    ui: &mut egui::Ui,
    theme: &Theme,
    connection: &mut Option<ConnectionPayload>,
) -> bool {
    let mut open_wizard = false;
    ui.heading("Integrations");
    theme.card_frame().show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.horizontal(|ui| {
            ui.strong("Meta Ads");
            match connection {
                Some(_) => ui.label(theme.chip("Connected", theme.success)),
                None => ui.label(theme.chip("Not connected", theme.text_muted)),
            };
        });

        let mut disconnect = false;
        match connection.as_ref() {
            Some(payload) => {
                ui.label(format!(
                    "Facebook pages: {}",
                    access_summary(payload.pages_access_mode, payload.selected_page_ids.len())
                ));
                ui.label(format!(
                    "Businesses: {}",
                    access_summary(payload.business_access_mode, payload.selected_business_ids.len())
                ));
                ui.label(format!(
                    "Instagram: {}",
                    access_summary(payload.instagram_access_mode, payload.selected_instagram_ids.len())
                ));
                ui.label(format!("Ad account: {}", payload.selected_ad_account_id));
                ui.horizontal(|ui| {
                    open_wizard |= ui.button("Edit").clicked();
                    disconnect = ui.button("Disconnect").clicked();
                });
            }
            None => {
                open_wizard = ui.button("Connect").clicked();
            }
        }
        if disconnect {
            *connection = None;
        }
        ui.add_space(theme.spacing_4);
        ui.horizontal(|ui| {
            ui.label("Google Ads");
            ui.label(theme.chip("SOON", theme.text_muted));
        });
    });
    open_wizard
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo;

    fn authorized_wizard() -> ConnectionWizard {
        let mut wizard = ConnectionWizard::new();
        assert!(wizard.start_authorize());
        wizard.authorized(demo::connectable_assets());
        wizard
    }

    #[test]
    fn authorisation_moves_to_permissions() {
        let mut wizard = ConnectionWizard::new();
        assert!(wizard.start_authorize());
        assert!(!wizard.start_authorize());
        assert!(!wizard.can_go_next());

        wizard.back();
        assert_eq!(wizard.step(), WizardStep::Connect);

        wizard.authorized(demo::connectable_assets());
        assert_eq!(wizard.step(), WizardStep::Permissions);
        assert!(!wizard.is_authorizing());
    }

    #[test]
    fn stray_authorisation_is_ignored() {
        let mut wizard = ConnectionWizard::new();
        wizard.authorized(demo::connectable_assets());
        assert_eq!(wizard.step(), WizardStep::Connect);
    }

    #[test]
    fn ad_account_gates_step_three() {
        let mut wizard = authorized_wizard();
        wizard.next();
        assert_eq!(wizard.step(), WizardStep::AdAccount);
        assert!(!wizard.can_go_next());
        wizard.next();
        assert_eq!(wizard.step(), WizardStep::AdAccount);

        wizard.select_ad_account("acc_2");
        wizard.next();
        assert_eq!(wizard.step(), WizardStep::Review);
        assert!(!wizard.can_go_next());
    }

    #[test]
    fn complete_only_on_review_and_drops_ids_for_all() {
        let mut wizard = authorized_wizard();
        wizard.set_mode(AssetKind::Pages, AccessMode::Selected);
        wizard.toggle_asset(AssetKind::Pages, "page_1");
        wizard.toggle_asset(AssetKind::Pages, "page_3");
        wizard.toggle_asset(AssetKind::Businesses, "biz_1");
        assert!(wizard.complete().is_none());

        wizard.next();
        wizard.select_ad_account("acc_1");
        wizard.next();

        let payload = wizard.complete().expect("review step completes");
        assert_eq!(payload.pages_access_mode, AccessMode::Selected);
        assert_eq!(payload.selected_page_ids, vec!["page_1".to_string(), "page_3".to_string()]);
        assert_eq!(payload.business_access_mode, AccessMode::All);
        assert!(payload.selected_business_ids.is_empty());
        assert_eq!(payload.selected_ad_account_id, "acc_1");
    }

    #[test]
    fn toggling_twice_deselects() {
        let mut wizard = authorized_wizard();
        wizard.toggle_asset(AssetKind::Instagram, "ig_1");
        wizard.toggle_asset(AssetKind::Instagram, "ig_1");
        assert!(wizard.selection(AssetKind::Instagram).selected.is_empty());
    }

    #[test]
    fn back_walks_one_step() {
        let mut wizard = authorized_wizard();
        wizard.next();
        wizard.back();
        assert_eq!(wizard.step(), WizardStep::Permissions);
        wizard.back();
        assert_eq!(wizard.step(), WizardStep::Connect);
    }

    #[test]
    fn summary_reads_all_or_count() {
        assert_eq!(access_summary(AccessMode::All, 3), "All");
        assert_eq!(access_summary(AccessMode::Selected, 2), "2 selected");
    }
}

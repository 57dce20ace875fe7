//! Client-side state. Every change goes through [`Store::dispatch`]; derived
//! views live in [`selectors`].

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::model::{
    Ad, AdSet, Campaign, DashboardFilters, DashboardMetrics, Entity, EntityPatch, EntityStatus,
    EntityType, FiltersPatch, PatchField, Recommendation, RecommendationState, Snapshot,
};

pub mod selectors;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slice {
    Campaigns,
    AdSets,
    Ads,
    Recommendations,
    Metrics,
}

impl Slice {
    pub const ALL: [Slice; 5] = [
        Self::Campaigns,
        Self::AdSets,
        Self::Ads,
        Self::Recommendations,
        Self::Metrics,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Campaigns => "campaigns",
            Self::AdSets => "adsets",
            Self::Ads => "ads",
            Self::Recommendations => "recommendations",
            Self::Metrics => "metrics",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

impl FetchStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

/// What a request in flight is doing to an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    StatusToggle,
    Edit,
    Apply,
    Dismiss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecommendationAction {
    Apply,
    Dismiss,
}

impl RecommendationAction {
    pub fn kind(self) -> ActionKind {
        match self {
            Self::Apply => ActionKind::Apply,
            Self::Dismiss => ActionKind::Dismiss,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Apply => "apply",
            Self::Dismiss => "dismiss",
        }
    }
}

/// Handle for an optimistic change awaiting backend confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MutationTicket(u64);

type FieldKey = (EntityType, String, PatchField);

#[derive(Debug, Clone)]
enum EntitySnapshot {
    Campaign(Campaign),
    AdSet(AdSet),
    Ad(Ad),
}

#[derive(Debug, Clone)]
struct PendingMutation {
    patch: EntityPatch,
    kind: ActionKind,
    before: EntitySnapshot,
}

#[derive(Debug, Clone)]
pub enum Action {
    SetCampaigns(Vec<Campaign>),
    SetAdSets(Vec<AdSet>),
    SetAds(Vec<Ad>),
    SetRecommendations(Vec<Recommendation>),
    SetMetrics(Option<DashboardMetrics>),
    SliceLoading(Slice),
    SliceFailed(Slice, String),
    ToggleCampaignExpand(String),
    ToggleAdSetExpand(String),
    SelectCampaign(Option<String>),
    SelectAdSet(Option<String>),
    UpdateCampaignStatus { id: String, status: EntityStatus },
    UpdateCampaignBudget { id: String, daily_budget: f64 },
    UpdateAdSetStatus { id: String, status: EntityStatus },
    UpdateAdSetBudget { id: String, daily_budget: f64 },
    UpdateAdStatus { id: String, status: EntityStatus },
    PatchEntity(EntityPatch),
    ApplyRecommendation(String),
    DismissRecommendation(String),
    SetFilters(FiltersPatch),
    SyncStarted,
    SyncSucceeded(Snapshot),
    SyncFailed(String),
    SetError(Option<String>),
    DismissError,
    SettleMutation {
        ticket: MutationTicket,
        outcome: Result<(), String>,
    },
    SettleRecommendation {
        id: String,
        action: RecommendationAction,
        outcome: Result<(), String>,
    },
}

#[derive(Debug, Default)]
pub struct Store {
    campaigns: Vec<Campaign>,
    adsets: Vec<AdSet>,
    ads: Vec<Ad>,
    recommendations: Vec<Recommendation>,
    metrics: Option<DashboardMetrics>,
    fetch: HashMap<Slice, FetchStatus>,
    filters: DashboardFilters,
    expanded_campaigns: HashSet<String>,
    expanded_adsets: HashSet<String>,
    selected_campaign: Option<String>,
    selected_adset: Option<String>,
    is_syncing: bool,
    error: Option<String>,
    in_flight: HashSet<(String, ActionKind)>,
    pending: HashMap<MutationTicket, PendingMutation>,
    /// Tickets that wrote each field, oldest first. Settled tickets are kept
    /// only while an older writer of the same field is still pending.
    writers: HashMap<FieldKey, Vec<MutationTicket>>,
    next_ticket: u64,
}

/// Runs `change` on the entity with `id`. Returns false when no entity matches.
pub fn update_entity_by_id<T: Entity>(items: &mut [T], id: &str, change: impl FnOnce(&mut T)) -> bool {
    match items.iter_mut().find(|item| item.id() == id) {
        Some(item) => {
            change(item);
            true
        }
        None => false,
    }
}

impl Store {
    pub fn new(filters: DashboardFilters) -> Self {
        Self {
            filters,
            ..Default::default()
        }
    }

    pub fn campaigns(&self) -> &[Campaign] {
        &self.campaigns
    }

    pub fn adsets(&self) -> &[AdSet] {
        &self.adsets
    }

    pub fn ads(&self) -> &[Ad] {
        &self.ads
    }

    pub fn recommendations(&self) -> &[Recommendation] {
        &self.recommendations
    }

    pub fn metrics(&self) -> Option<&DashboardMetrics> {
        self.metrics.as_ref()
    }

    pub fn filters(&self) -> &DashboardFilters {
        &self.filters
    }

    pub fn expanded_campaigns(&self) -> &HashSet<String> {
        &self.expanded_campaigns
    }

    pub fn expanded_adsets(&self) -> &HashSet<String> {
        &self.expanded_adsets
    }

    pub fn selected_campaign(&self) -> Option<&str> {
        self.selected_campaign.as_deref()
    }

    pub fn selected_adset(&self) -> Option<&str> {
        self.selected_adset.as_deref()
    }

    pub fn is_syncing(&self) -> bool {
        self.is_syncing
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn fetch_status(&self, slice: Slice) -> &FetchStatus {
        static IDLE: FetchStatus = FetchStatus::Idle;
        self.fetch.get(&slice).unwrap_or(&IDLE)
    }

    pub fn is_loading(&self) -> bool {
        self.fetch.values().any(FetchStatus::is_loading)
    }

    pub fn is_in_flight(&self, id: &str, kind: ActionKind) -> bool {
        self.in_flight.contains(&(id.to_string(), kind))
    }

    pub fn has_in_flight(&self) -> bool {
        !self.in_flight.is_empty()
    }

    pub fn dispatch(&mut self, action: Action) {
        match action {
            Action::SetCampaigns(campaigns) => {
                self.campaigns = campaigns;
                self.mark_loaded(Slice::Campaigns);
            }
            Action::SetAdSets(adsets) => {
                self.adsets = adsets;
                self.mark_loaded(Slice::AdSets);
            }
            Action::SetAds(ads) => {
                self.ads = ads;
                self.mark_loaded(Slice::Ads);
            }
            Action::SetRecommendations(recommendations) => {
                self.recommendations = recommendations;
                self.mark_loaded(Slice::Recommendations);
            }
            Action::SetMetrics(metrics) => {
                self.metrics = metrics;
                self.mark_loaded(Slice::Metrics);
            }
            Action::SliceLoading(slice) => {
                self.fetch.insert(slice, FetchStatus::Loading);
            }
            Action::SliceFailed(slice, message) => {
                warn!(target: "adpilot::store", slice = slice.as_str(), %message, "slice load failed");
                self.fetch.insert(slice, FetchStatus::Failed(message));
            }
            Action::ToggleCampaignExpand(id) => toggle_membership(&mut self.expanded_campaigns, id),
            Action::ToggleAdSetExpand(id) => toggle_membership(&mut self.expanded_adsets, id),
            Action::SelectCampaign(id) => self.selected_campaign = id,
            Action::SelectAdSet(id) => self.selected_adset = id,
            Action::UpdateCampaignStatus { id, status } => {
                log_missing("campaign", &id, update_entity_by_id(&mut self.campaigns, &id, |campaign| {
                    campaign.status = status;
                }));
            }
            Action::UpdateCampaignBudget { id, daily_budget } => {
                log_missing("campaign", &id, update_entity_by_id(&mut self.campaigns, &id, |campaign| {
                    campaign.daily_budget = Some(daily_budget);
                }));
            }
            Action::UpdateAdSetStatus { id, status } => {
                log_missing("adset", &id, update_entity_by_id(&mut self.adsets, &id, |adset| {
                    adset.status = status;
                }));
            }
            Action::UpdateAdSetBudget { id, daily_budget } => {
                log_missing("adset", &id, update_entity_by_id(&mut self.adsets, &id, |adset| {
                    adset.daily_budget = Some(daily_budget);
                }));
            }
            Action::UpdateAdStatus { id, status } => {
                log_missing("ad", &id, update_entity_by_id(&mut self.ads, &id, |ad| {
                    ad.status = status;
                }));
            }
            Action::PatchEntity(patch) => {
                self.apply_patch(&patch);
            }
            Action::ApplyRecommendation(id) => {
                self.settle_recommendation_state(&id, RecommendationState::Applied);
            }
            Action::DismissRecommendation(id) => {
                self.settle_recommendation_state(&id, RecommendationState::Dismissed);
            }
            Action::SetFilters(patch) => self.filters.merge(patch),
            Action::SyncStarted => {
                self.is_syncing = true;
                self.error = None;
            }
            Action::SyncSucceeded(snapshot) => {
                self.campaigns = snapshot.campaigns;
                self.adsets = snapshot.adsets;
                self.ads = snapshot.ads;
                self.recommendations = snapshot.recommendations;
                self.metrics = snapshot.metrics;
                for slice in Slice::ALL {
                    self.mark_loaded(slice);
                }
                self.is_syncing = false;
            }
            Action::SyncFailed(message) => {
                warn!(target: "adpilot::store", %message, "sync failed, keeping loaded data");
                self.is_syncing = false;
                self.error = Some(message);
            }
            Action::SetError(error) => self.error = error,
            Action::DismissError => self.error = None,
            Action::SettleMutation { ticket, outcome } => self.settle_mutation(ticket, outcome),
            Action::SettleRecommendation { id, action, outcome } => {
                self.in_flight.remove(&(id.clone(), action.kind()));
                match outcome {
                    Ok(()) => match action {
                        RecommendationAction::Apply => {
                            self.settle_recommendation_state(&id, RecommendationState::Applied)
                        }
                        RecommendationAction::Dismiss => {
                            self.settle_recommendation_state(&id, RecommendationState::Dismissed)
                        }
                    },
                    Err(message) => {
                        warn!(target: "adpilot::store", recommendation = %id, action = action.as_str(), %message, "recommendation action failed");
                        self.error = Some(message);
                    }
                }
            }
        }
    }

    /// Applies `patch` locally and remembers the previous values so a failed
    /// request can put them back. Returns `None` when the entity is unknown or
    /// the same kind of request is already running for it.
    pub fn begin_mutation(&mut self, patch: EntityPatch, kind: ActionKind) -> Option<MutationTicket> {
        let key = (patch.id().to_string(), kind);
        if self.in_flight.contains(&key) {
            debug!(target: "adpilot::store", id = patch.id(), ?kind, "mutation already in flight");
            return None;
        }

        let before = self.snapshot_of(&patch)?;
        self.apply_patch(&patch);
        self.in_flight.insert(key);

        let ticket = MutationTicket(self.next_ticket);
        self.next_ticket += 1;
        for field in patch.fields() {
            self.writers
                .entry(field_key(&patch, field))
                .or_default()
                .push(ticket);
        }
        self.pending.insert(ticket, PendingMutation { patch, kind, before });
        Some(ticket)
    }

    /// Marks an apply or dismiss request as running. Returns false for unknown
    /// or already settled recommendations, and while another request for the
    /// same recommendation is still pending.
    pub fn begin_recommendation(&mut self, id: &str, action: RecommendationAction) -> bool {
        let pending = self
            .recommendations
            .iter()
            .any(|rec| rec.id == id && rec.is_pending());
        let busy = self.is_in_flight(id, ActionKind::Apply) || self.is_in_flight(id, ActionKind::Dismiss);
        if !pending || busy {
            return false;
        }
        self.in_flight.insert((id.to_string(), action.kind()));
        true
    }

    fn mark_loaded(&mut self, slice: Slice) {
        self.fetch.insert(slice, FetchStatus::Loaded);
    }

    fn apply_patch(&mut self, patch: &EntityPatch) -> bool {
        let found = match patch {
            EntityPatch::Campaign { id, patch } => {
                update_entity_by_id(&mut self.campaigns, id, |campaign| patch.apply_to(campaign))
            }
            EntityPatch::AdSet { id, patch } => {
                update_entity_by_id(&mut self.adsets, id, |adset| patch.apply_to(adset))
            }
            EntityPatch::Ad { id, patch } => update_entity_by_id(&mut self.ads, id, |ad| patch.apply_to(ad)),
        };
        log_missing(patch.entity_type().as_str(), patch.id(), found);
        found
    }

    fn snapshot_of(&self, patch: &EntityPatch) -> Option<EntitySnapshot> {
        match patch {
            EntityPatch::Campaign { id, .. } => self
                .campaigns
                .iter()
                .find(|campaign| &campaign.id == id)
                .cloned()
                .map(EntitySnapshot::Campaign),
            EntityPatch::AdSet { id, .. } => self
                .adsets
                .iter()
                .find(|adset| &adset.id == id)
                .cloned()
                .map(EntitySnapshot::AdSet),
            EntityPatch::Ad { id, .. } => self
                .ads
                .iter()
                .find(|ad| &ad.id == id)
                .cloned()
                .map(EntitySnapshot::Ad),
        }
    }

    fn settle_mutation(&mut self, ticket: MutationTicket, outcome: Result<(), String>) {
        let Some(pending) = self.pending.remove(&ticket) else {
            debug!(target: "adpilot::store", ?ticket, "settle for unknown ticket");
            return;
        };
        self.in_flight
            .remove(&(pending.patch.id().to_string(), pending.kind));

        if let Err(message) = outcome {
            warn!(target: "adpilot::store", id = pending.patch.id(), %message, "mutation failed, rolling back");
            self.roll_back(ticket, &pending);
            self.error = Some(message);
        }
        self.prune_writers(&pending.patch);
    }

    /// Undoes a failed patch field by field. A field a later mutation already
    /// wrote is left alone; if that later mutation is still pending it inherits
    /// this patch's previous value, so its own rollback lands on the right one.
    fn roll_back(&mut self, ticket: MutationTicket, failed: &PendingMutation) {
        for field in failed.patch.fields() {
            let key = field_key(&failed.patch, field);
            let next = self.writers.get_mut(&key).and_then(|tickets| {
                let position = tickets.iter().position(|writer| *writer == ticket)?;
                tickets.remove(position);
                tickets.get(position).copied()
            });

            match next {
                Some(later) => match self.pending.get_mut(&later) {
                    Some(successor) => copy_field(field, &failed.before, &mut successor.before),
                    None => {
                        debug!(target: "adpilot::store", id = failed.patch.id(), ?field, "field rewritten since, keeping it");
                    }
                },
                None => self.restore_field(field, &failed.before),
            }
        }
    }

    fn restore_field(&mut self, field: PatchField, before: &EntitySnapshot) {
        match before {
            EntitySnapshot::Campaign(before) => {
                update_entity_by_id(&mut self.campaigns, &before.id, |campaign| {
                    copy_campaign_field(field, before, campaign)
                });
            }
            EntitySnapshot::AdSet(before) => {
                update_entity_by_id(&mut self.adsets, &before.id, |adset| copy_adset_field(field, before, adset));
            }
            EntitySnapshot::Ad(before) => {
                update_entity_by_id(&mut self.ads, &before.id, |ad| copy_ad_field(field, before, ad));
            }
        }
    }

    /// Drops settled writers that no pending mutation can still depend on.
    fn prune_writers(&mut self, patch: &EntityPatch) {
        for field in patch.fields() {
            let key = field_key(patch, field);
            let Some(tickets) = self.writers.get_mut(&key) else {
                continue;
            };
            let settled = tickets
                .iter()
                .take_while(|ticket| !self.pending.contains_key(*ticket))
                .count();
            tickets.drain(..settled);
            if tickets.is_empty() {
                self.writers.remove(&key);
            }
        }
    }

    fn settle_recommendation_state(&mut self, id: &str, state: RecommendationState) {
        match self.recommendations.iter_mut().find(|rec| rec.id == id) {
            Some(rec) if rec.is_pending() => rec.state = state,
            Some(rec) => {
                debug!(target: "adpilot::store", id, current = ?rec.state, "recommendation already settled");
            }
            None => debug!(target: "adpilot::store", id, "unknown recommendation"),
        }
    }
}

fn field_key(patch: &EntityPatch, field: PatchField) -> FieldKey {
    (patch.entity_type(), patch.id().to_string(), field)
}

fn copy_field(field: PatchField, from: &EntitySnapshot, to: &mut EntitySnapshot) {
    match (from, to) {
        (EntitySnapshot::Campaign(from), EntitySnapshot::Campaign(to)) => copy_campaign_field(field, from, to),
        (EntitySnapshot::AdSet(from), EntitySnapshot::AdSet(to)) => copy_adset_field(field, from, to),
        (EntitySnapshot::Ad(from), EntitySnapshot::Ad(to)) => copy_ad_field(field, from, to),
        _ => {}
    }
}

fn copy_campaign_field(field: PatchField, from: &Campaign, to: &mut Campaign) {
    match field {
        PatchField::Name => to.name = from.name.clone(),
        PatchField::Status => to.status = from.status,
        PatchField::DailyBudget => to.daily_budget = from.daily_budget,
        PatchField::LifetimeBudget => to.lifetime_budget = from.lifetime_budget,
        PatchField::BidAmount => {}
    }
}

fn copy_adset_field(field: PatchField, from: &AdSet, to: &mut AdSet) {
    match field {
        PatchField::Name => to.name = from.name.clone(),
        PatchField::Status => to.status = from.status,
        PatchField::DailyBudget => to.daily_budget = from.daily_budget,
        PatchField::BidAmount => to.bid_amount = from.bid_amount,
        PatchField::LifetimeBudget => {}
    }
}

fn copy_ad_field(field: PatchField, from: &Ad, to: &mut Ad) {
    match field {
        PatchField::Name => to.name = from.name.clone(),
        PatchField::Status => to.status = from.status,
        PatchField::DailyBudget | PatchField::LifetimeBudget | PatchField::BidAmount => {}
    }
}

fn log_missing(entity: &str, id: &str, found: bool) {
    if !found {
        debug!(target: "adpilot::store", entity, id, "update ignored, unknown id");
    }
}

fn toggle_membership(set: &mut HashSet<String>, id: String) {
    if !set.remove(&id) {
        set.insert(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo;
    use crate::model::{CampaignPatch, EntityType, Platform};

    fn loaded_store() -> Store {
        let mut store = Store::default();
        store.dispatch(Action::SyncSucceeded(demo::snapshot()));
        store
    }

    fn first_campaign(store: &Store) -> Campaign {
        store.campaigns()[0].clone()
    }

    #[test]
    fn toggling_expansion_twice_restores_membership() {
        let mut store = Store::default();
        store.dispatch(Action::ToggleCampaignExpand("c1".to_string()));
        assert!(store.expanded_campaigns().contains("c1"));
        store.dispatch(Action::ToggleCampaignExpand("c1".to_string()));
        assert!(!store.expanded_campaigns().contains("c1"));

        store.dispatch(Action::ToggleAdSetExpand("s1".to_string()));
        store.dispatch(Action::ToggleAdSetExpand("s1".to_string()));
        assert!(store.expanded_adsets().is_empty());
    }

    #[test]
    fn set_actions_replace_lists_and_mark_loaded() {
        let mut store = loaded_store();
        assert_eq!(store.fetch_status(Slice::Ads), &FetchStatus::Loaded);

        store.dispatch(Action::SliceLoading(Slice::Campaigns));
        assert!(store.is_loading());
        store.dispatch(Action::SetCampaigns(Vec::new()));
        assert!(store.campaigns().is_empty());
        assert!(!store.is_loading());
        assert!(!store.adsets().is_empty());
    }

    #[test]
    fn slice_failure_keeps_previous_data() {
        let mut store = loaded_store();
        let before = store.campaigns().len();
        store.dispatch(Action::SliceFailed(Slice::Campaigns, "boom".to_string()));
        assert_eq!(store.campaigns().len(), before);
        assert_eq!(
            store.fetch_status(Slice::Campaigns),
            &FetchStatus::Failed("boom".to_string())
        );
    }

    #[test]
    fn entity_updates_replace_matching_entry_only() {
        let mut store = loaded_store();
        let target = first_campaign(&store);
        let others: Vec<Campaign> = store.campaigns()[1..].to_vec();

        store.dispatch(Action::UpdateCampaignStatus {
            id: target.id.clone(),
            status: EntityStatus::Paused,
        });
        store.dispatch(Action::UpdateCampaignBudget {
            id: target.id.clone(),
            daily_budget: 321.0,
        });

        let updated = &store.campaigns()[0];
        assert_eq!(updated.status, EntityStatus::Paused);
        assert_eq!(updated.daily_budget, Some(321.0));
        assert_eq!(&store.campaigns()[1..], others.as_slice());
    }

    #[test]
    fn updates_for_unknown_ids_change_nothing() {
        let mut store = loaded_store();
        let campaigns = store.campaigns().to_vec();
        let ads = store.ads().to_vec();

        store.dispatch(Action::UpdateCampaignStatus {
            id: "missing".to_string(),
            status: EntityStatus::Paused,
        });
        store.dispatch(Action::UpdateAdStatus {
            id: "missing".to_string(),
            status: EntityStatus::Paused,
        });
        store.dispatch(Action::PatchEntity(EntityPatch::status(
            EntityType::AdSet,
            "missing",
            EntityStatus::Paused,
        )));

        assert_eq!(store.campaigns(), campaigns.as_slice());
        assert_eq!(store.ads(), ads.as_slice());
    }

    #[test]
    fn recommendations_transition_once() {
        let mut store = loaded_store();
        let id = store.recommendations()[0].id.clone();

        store.dispatch(Action::ApplyRecommendation(id.clone()));
        assert!(store.recommendations()[0].is_applied());

        store.dispatch(Action::DismissRecommendation(id.clone()));
        assert!(store.recommendations()[0].is_applied());

        let before = store.recommendations().to_vec();
        store.dispatch(Action::ApplyRecommendation("rec_missing".to_string()));
        assert_eq!(store.recommendations(), before.as_slice());
    }

    #[test]
    fn set_filters_is_a_shallow_merge() {
        let mut store = Store::default();
        store.dispatch(Action::SetFilters(FiltersPatch::platform(Platform::Meta)));
        let before = store.filters().clone();

        store.dispatch(Action::SetFilters(FiltersPatch::search("x")));

        assert_eq!(store.filters().search, "x");
        assert_eq!(store.filters().platform, before.platform);
        assert_eq!(store.filters().date_range, before.date_range);
        assert_eq!(store.filters().status, before.status);
    }

    #[test]
    fn sync_lifecycle_clears_and_sets_error() {
        let mut store = loaded_store();
        store.dispatch(Action::SetError(Some("old".to_string())));

        store.dispatch(Action::SyncStarted);
        assert!(store.is_syncing());
        assert_eq!(store.error(), None);

        let campaigns = store.campaigns().len();
        store.dispatch(Action::SyncFailed("Request failed (HTTP_500)".to_string()));
        assert!(!store.is_syncing());
        assert_eq!(store.error(), Some("Request failed (HTTP_500)"));
        assert_eq!(store.campaigns().len(), campaigns);

        store.dispatch(Action::DismissError);
        assert_eq!(store.error(), None);
    }

    #[test]
    fn failed_mutation_rolls_back_touched_fields() {
        let mut store = loaded_store();
        let campaign = first_campaign(&store);

        let ticket = store
            .begin_mutation(
                EntityPatch::Campaign {
                    id: campaign.id.clone(),
                    patch: CampaignPatch {
                        daily_budget: Some(999.0),
                        ..Default::default()
                    },
                },
                ActionKind::Edit,
            )
            .expect("campaign should exist");
        assert_eq!(store.campaigns()[0].daily_budget, Some(999.0));
        assert!(store.is_in_flight(&campaign.id, ActionKind::Edit));

        store.dispatch(Action::UpdateCampaignStatus {
            id: campaign.id.clone(),
            status: campaign.status.toggled(),
        });
        store.dispatch(Action::SettleMutation {
            ticket,
            outcome: Err("Request failed (HTTP_500)".to_string()),
        });

        let after = &store.campaigns()[0];
        assert_eq!(after.daily_budget, campaign.daily_budget);
        assert_eq!(after.status, campaign.status.toggled());
        assert!(!store.is_in_flight(&campaign.id, ActionKind::Edit));
        assert_eq!(store.error(), Some("Request failed (HTTP_500)"));
    }

    #[test]
    fn successful_mutation_keeps_the_change() {
        let mut store = loaded_store();
        let campaign = first_campaign(&store);
        let patch = EntityPatch::status(EntityType::Campaign, &campaign.id, campaign.status.toggled());

        let ticket = store
            .begin_mutation(patch.clone(), ActionKind::StatusToggle)
            .expect("campaign should exist");
        assert!(store
            .begin_mutation(patch, ActionKind::StatusToggle)
            .is_none());

        store.dispatch(Action::SettleMutation {
            ticket,
            outcome: Ok(()),
        });
        assert_eq!(store.campaigns()[0].status, campaign.status.toggled());
        assert!(!store.has_in_flight());
        assert_eq!(store.error(), None);
    }

    fn campaign_patch(id: &str, patch: CampaignPatch) -> EntityPatch {
        EntityPatch::Campaign {
            id: id.to_string(),
            patch,
        }
    }

    fn settle(store: &mut Store, ticket: MutationTicket, outcome: Result<(), &str>) {
        store.dispatch(Action::SettleMutation {
            ticket,
            outcome: outcome.map_err(str::to_string),
        });
    }

    #[test]
    fn failed_toggle_keeps_status_written_by_later_committed_edit() {
        let mut store = loaded_store();
        let campaign = first_campaign(&store);
        assert_eq!(campaign.status, EntityStatus::Active);

        let toggle = store
            .begin_mutation(
                EntityPatch::status(EntityType::Campaign, &campaign.id, EntityStatus::Paused),
                ActionKind::StatusToggle,
            )
            .expect("toggle should start");
        let edit = store
            .begin_mutation(
                campaign_patch(
                    &campaign.id,
                    CampaignPatch {
                        name: Some("Renamed".to_string()),
                        status: Some(EntityStatus::Paused),
                        ..Default::default()
                    },
                ),
                ActionKind::Edit,
            )
            .expect("edit should start alongside the toggle");

        settle(&mut store, edit, Ok(()));
        settle(&mut store, toggle, Err("Request failed (HTTP_500)"));

        let after = &store.campaigns()[0];
        assert_eq!(after.status, EntityStatus::Paused);
        assert_eq!(after.name, "Renamed");
        assert_eq!(store.error(), Some("Request failed (HTTP_500)"));
        assert!(!store.has_in_flight());
        assert!(store.writers.is_empty());
    }

    #[test]
    fn overlapping_failures_restore_the_original_value_in_any_order() {
        for toggle_fails_first in [true, false] {
            let mut store = loaded_store();
            let campaign = first_campaign(&store);

            let toggle = store
                .begin_mutation(
                    EntityPatch::status(EntityType::Campaign, &campaign.id, campaign.status.toggled()),
                    ActionKind::StatusToggle,
                )
                .expect("toggle should start");
            let edit = store
                .begin_mutation(
                    campaign_patch(
                        &campaign.id,
                        CampaignPatch {
                            status: Some(campaign.status.toggled()),
                            daily_budget: Some(500.0),
                            ..Default::default()
                        },
                    ),
                    ActionKind::Edit,
                )
                .expect("edit should start");

            let order = if toggle_fails_first { [toggle, edit] } else { [edit, toggle] };
            for ticket in order {
                settle(&mut store, ticket, Err("Request failed (HTTP_503)"));
            }

            let after = &store.campaigns()[0];
            assert_eq!(after.status, campaign.status, "toggle failed first: {toggle_fails_first}");
            assert_eq!(after.daily_budget, campaign.daily_budget);
            assert!(store.writers.is_empty());
        }
    }

    #[test]
    fn failed_bulk_status_overlapping_an_edit() {
        let mut store = loaded_store();
        let campaign = first_campaign(&store);
        let bulk_patch = EntityPatch::status(EntityType::Campaign, &campaign.id, EntityStatus::Paused);

        // Edit first, bulk pause second: the bulk failure only undoes the status.
        let edit = store
            .begin_mutation(
                campaign_patch(
                    &campaign.id,
                    CampaignPatch {
                        name: Some("Spring Sale".to_string()),
                        daily_budget: Some(250.0),
                        ..Default::default()
                    },
                ),
                ActionKind::Edit,
            )
            .expect("edit should start");
        let bulk = store
            .begin_mutation(bulk_patch.clone(), ActionKind::StatusToggle)
            .expect("bulk status should start");
        settle(&mut store, edit, Ok(()));
        settle(&mut store, bulk, Err("Failed to update cmp_001"));

        let after = store.campaigns()[0].clone();
        assert_eq!(after.status, EntityStatus::Active);
        assert_eq!(after.name, "Spring Sale");
        assert_eq!(after.daily_budget, Some(250.0));

        // Bulk pause first, edit re-activating second: the edit's status stands.
        let bulk = store
            .begin_mutation(bulk_patch, ActionKind::StatusToggle)
            .expect("bulk status should start");
        let edit = store
            .begin_mutation(
                campaign_patch(
                    &campaign.id,
                    CampaignPatch {
                        status: Some(EntityStatus::Active),
                        ..Default::default()
                    },
                ),
                ActionKind::Edit,
            )
            .expect("edit should start");
        settle(&mut store, edit, Ok(()));
        settle(&mut store, bulk, Err("Failed to update cmp_001"));

        assert_eq!(store.campaigns()[0].status, EntityStatus::Active);
        assert!(!store.has_in_flight());
        assert!(store.writers.is_empty());
    }

    #[test]
    fn mutation_for_unknown_entity_is_refused() {
        let mut store = loaded_store();
        let patch = EntityPatch::status(EntityType::Ad, "missing", EntityStatus::Paused);
        assert!(store.begin_mutation(patch, ActionKind::StatusToggle).is_none());
        assert!(!store.has_in_flight());
    }

    #[test]
    fn recommendation_state_changes_only_after_successful_settle() {
        let mut store = loaded_store();
        let first = store.recommendations()[0].id.clone();
        let second = store.recommendations()[1].id.clone();

        assert!(store.begin_recommendation(&first, RecommendationAction::Apply));
        assert!(store.begin_recommendation(&second, RecommendationAction::Dismiss));
        assert!(!store.begin_recommendation(&first, RecommendationAction::Dismiss));
        assert!(store.is_in_flight(&first, ActionKind::Apply));
        assert!(store.is_in_flight(&second, ActionKind::Dismiss));
        assert!(store.recommendations()[0].is_pending());

        store.dispatch(Action::SettleRecommendation {
            id: first.clone(),
            action: RecommendationAction::Apply,
            outcome: Ok(()),
        });
        store.dispatch(Action::SettleRecommendation {
            id: second.clone(),
            action: RecommendationAction::Dismiss,
            outcome: Err("Request failed (HTTP_502)".to_string()),
        });

        assert!(store.recommendations()[0].is_applied());
        assert!(store.recommendations()[1].is_pending());
        assert!(!store.has_in_flight());
        assert_eq!(store.error(), Some("Request failed (HTTP_502)"));
        assert!(!store.begin_recommendation(&first, RecommendationAction::Dismiss));
    }
}

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::EntityType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecommendationType {
    BudgetIncrease,
    BudgetDecrease,
    CreativeFatigue,
    AudienceExpansion,
    BidAdjustment,
    CreativeUpdate,
    TargetingOptimization,
    ScheduleOptimization,
    PlacementOptimization,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }
}

/// Lifecycle of a recommendation. Only `Pending` can transition, and only once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RecommendationState {
    #[default]
    Pending,
    Applied,
    Dismissed,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Impact {
    pub metric: String,
    pub current_value: f64,
    pub projected_value: f64,
    pub change_percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuggestedAction {
    #[serde(default)]
    pub action_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RecommendationWire", into = "RecommendationWire")]
pub struct Recommendation {
    pub id: String,
    pub recommendation_type: RecommendationType,
    pub title: String,
    pub description: String,
    pub impact: Option<Impact>,
    pub priority: Priority,
    pub entity_type: EntityType,
    pub entity_id: String,
    pub entity_name: String,
    pub suggested_action: SuggestedAction,
    pub state: RecommendationState,
    pub created_time: String,
    pub expires_at: Option<String>,
}

impl Recommendation {
    pub fn is_pending(&self) -> bool {
        self.state == RecommendationState::Pending
    }

    pub fn is_applied(&self) -> bool {
        self.state == RecommendationState::Applied
    }

    pub fn is_dismissed(&self) -> bool {
        self.state == RecommendationState::Dismissed
    }
}

/// Backend shape: two booleans instead of a state tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RecommendationWire {
    id: String,
    recommendation_type: RecommendationType,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    impact: Option<Impact>,
    priority: Priority,
    entity_type: EntityType,
    entity_id: String,
    #[serde(default)]
    entity_name: String,
    #[serde(default)]
    suggested_action: SuggestedAction,
    #[serde(default)]
    applied: bool,
    #[serde(default)]
    dismissed: bool,
    #[serde(default)]
    created_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<String>,
}

impl From<RecommendationWire> for Recommendation {
    fn from(wire: RecommendationWire) -> Self {
        let state = if wire.applied {
            RecommendationState::Applied
        } else if wire.dismissed {
            RecommendationState::Dismissed
        } else {
            RecommendationState::Pending
        };

        Self {
            id: wire.id,
            recommendation_type: wire.recommendation_type,
            title: wire.title,
            description: wire.description,
            impact: wire.impact,
            priority: wire.priority,
            entity_type: wire.entity_type,
            entity_id: wire.entity_id,
            entity_name: wire.entity_name,
            suggested_action: wire.suggested_action,
            state,
            created_time: wire.created_time,
            expires_at: wire.expires_at,
        }
    }
}

impl From<Recommendation> for RecommendationWire {
    fn from(rec: Recommendation) -> Self {
        Self {
            applied: rec.state == RecommendationState::Applied,
            dismissed: rec.state == RecommendationState::Dismissed,
            id: rec.id,
            recommendation_type: rec.recommendation_type,
            title: rec.title,
            description: rec.description,
            impact: rec.impact,
            priority: rec.priority,
            entity_type: rec.entity_type,
            entity_id: rec.entity_id,
            entity_name: rec.entity_name,
            suggested_action: rec.suggested_action,
            created_time: rec.created_time,
            expires_at: rec.expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn wire(applied: bool, dismissed: bool) -> Value {
        json!({
            "id": "rec_1",
            "recommendation_type": "BUDGET_INCREASE",
            "title": "Increase budget",
            "description": "Strong ROAS",
            "priority": "HIGH",
            "entity_type": "CAMPAIGN",
            "entity_id": "cmp_1",
            "entity_name": "Summer Sale",
            "suggested_action": {
                "action_type": "UPDATE_BUDGET",
                "field": "daily_budget",
                "current_value": 100,
                "suggested_value": 150
            },
            "applied": applied,
            "dismissed": dismissed,
            "created_time": "2025-01-10T09:00:00Z"
        })
    }

    #[test]
    fn boolean_flags_map_onto_a_single_state() {
        let pending: Recommendation =
            serde_json::from_value(wire(false, false)).expect("pending should parse");
        let applied: Recommendation =
            serde_json::from_value(wire(true, false)).expect("applied should parse");
        let dismissed: Recommendation =
            serde_json::from_value(wire(false, true)).expect("dismissed should parse");
        let both: Recommendation =
            serde_json::from_value(wire(true, true)).expect("conflicting flags should parse");

        assert_eq!(pending.state, RecommendationState::Pending);
        assert_eq!(applied.state, RecommendationState::Applied);
        assert_eq!(dismissed.state, RecommendationState::Dismissed);
        assert_eq!(both.state, RecommendationState::Applied);
    }

    #[test]
    fn serializes_back_to_boolean_flags() {
        let mut rec: Recommendation =
            serde_json::from_value(wire(false, false)).expect("pending should parse");
        rec.state = RecommendationState::Dismissed;

        let value = serde_json::to_value(&rec).expect("recommendation should serialize");
        assert_eq!(value["applied"], json!(false));
        assert_eq!(value["dismissed"], json!(true));
        assert_eq!(value["entity_type"], json!("CAMPAIGN"));
    }

    #[test]
    fn unknown_recommendation_types_are_tolerated() {
        let mut raw = wire(false, false);
        raw["recommendation_type"] = json!("SOMETHING_NEW");
        let rec: Recommendation = serde_json::from_value(raw).expect("unknown type should parse");
        assert_eq!(rec.recommendation_type, RecommendationType::Unknown);
    }
}

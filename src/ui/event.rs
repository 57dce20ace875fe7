use crate::model::{EntityStatus, EntityType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowMenuItem {
    Duplicate,
    ViewInPlatform,
    Delete,
}

impl RowMenuItem {
    pub const ALL: [RowMenuItem; 3] = [Self::Duplicate, Self::ViewInPlatform, Self::Delete];

    pub fn label(self) -> &'static str {
        match self {
            Self::Duplicate => "Duplicate",
            Self::ViewInPlatform => "View in platform",
            Self::Delete => "Delete",
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Duplicate => "duplicate",
            Self::ViewInPlatform => "view_in_platform",
            Self::Delete => "delete",
        }
    }
}

/// Something the user did inside a component. Components return these and
/// the app decides what they mean.
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    ToggleExpand {
        entity_type: EntityType,
        id: String,
    },
    ToggleStatus {
        entity_type: EntityType,
        id: String,
        status: EntityStatus,
    },
    Edit {
        entity_type: EntityType,
        id: String,
    },
    RowMenu {
        entity_type: EntityType,
        id: String,
        item: RowMenuItem,
    },
    ApplyRecommendation(String),
    DismissRecommendation(String),
    ViewAllRecommendations,
    CheckCreativeFatigue,
}

impl UiAction {
    pub fn to_log_line(&self) -> String {
        match self {
            Self::ToggleExpand { entity_type, id } => {
                format!("toggle_expand entity={} id={id}", entity_type.as_str())
            }
            Self::ToggleStatus {
                entity_type,
                id,
                status,
            } => format!(
                "toggle_status entity={} id={id} from={}",
                entity_type.as_str(),
                status.as_str()
            ),
            Self::Edit { entity_type, id } => format!("edit entity={} id={id}", entity_type.as_str()),
            Self::RowMenu {
                entity_type,
                id,
                item,
            } => format!(
                "row_menu entity={} id={id} item={}",
                entity_type.as_str(),
                item.as_str()
            ),
            Self::ApplyRecommendation(id) => format!("apply_recommendation id={id}"),
            Self::DismissRecommendation(id) => format!("dismiss_recommendation id={id}"),
            Self::ViewAllRecommendations => "view_all_recommendations".to_string(),
            Self::CheckCreativeFatigue => "check_creative_fatigue".to_string(),
        }
    }
}

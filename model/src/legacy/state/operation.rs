use crate::legacy::action::ActionDefinition;
use crate::legacy::timeout::TimeoutsDefinition;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use swdsl_base::EquatableList;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ActionMode {
    #[default]
    Sequential,
    Parallel,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct OperationStateDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_mode: Option<ActionMode>,
    #[serde(default, skip_serializing_if = "EquatableList::is_empty")]
    pub actions: EquatableList<ActionDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeouts: Option<TimeoutsDefinition>,
}

impl OperationStateDefinition {
    pub fn action_mode(&self) -> ActionMode {
        self.action_mode.unwrap_or_default()
    }
}

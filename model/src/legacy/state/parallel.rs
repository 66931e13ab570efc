use crate::legacy::action::ActionDefinition;
use crate::legacy::timeout::TimeoutsDefinition;
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use swdsl_base::{EquatableList, OneOf};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Display)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum CompletionType {
    #[default]
    AllOf,
    AtLeast,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct BranchDefinition {
    pub name: String,
    pub actions: EquatableList<ActionDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeouts: Option<TimeoutsDefinition>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ParallelStateDefinition {
    pub branches: EquatableList<BranchDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_type: Option<CompletionType>,
    /// Branches that must complete when `completionType` is `atLeast`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_completed: Option<OneOf<u32, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeouts: Option<TimeoutsDefinition>,
}

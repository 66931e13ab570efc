use serde::{Deserialize, Serialize};
use swdsl_base::OneOf;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowExecTimeoutDefinition {
    pub duration: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub interrupt: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_before: Option<String>,
}

/// ISO 8601 durations bounding the workflow, its states and actions.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TimeoutsDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_exec_timeout: Option<OneOf<WorkflowExecTimeoutDefinition, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_exec_timeout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_exec_timeout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_exec_timeout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_timeout: Option<String>,
}

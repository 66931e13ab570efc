use serde::{Deserialize, Serialize};

/// Filters applied to the state data on entry (`input`) and exit (`output`).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct StateDataFilterDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

fn default_true() -> bool {
    true
}

fn is_true(value: &bool) -> bool {
    *value
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EventDataFilterDefinition {
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub use_data: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_state_data: Option<String>,
}

impl Default for EventDataFilterDefinition {
    fn default() -> Self {
        Self {
            use_data: true,
            data: None,
            to_state_data: None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActionDataFilterDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_state_data: Option<String>,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub use_results: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_state_data: Option<String>,
}

impl Default for ActionDataFilterDefinition {
    fn default() -> Self {
        Self {
            from_state_data: None,
            use_results: true,
            results: None,
            to_state_data: None,
        }
    }
}

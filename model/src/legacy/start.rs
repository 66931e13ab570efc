use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use swdsl_base::OneOf;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CronDefinition {
    pub expression: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct ScheduleDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cron: Option<OneOf<CronDefinition, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StartDefinition {
    pub state_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<OneOf<ScheduleDefinition, String>>,
}

/// `start: "StateName"` or `start: { stateName, schedule }`.
pub type Start = OneOf<StartDefinition, String>;

pub fn start_state(start: &Start) -> &str {
    match start {
        OneOf::First(s) => &s.state_name,
        OneOf::Second(name) => name,
    }
}

fn default_true() -> bool {
    true
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DataInputSchemaDefinition {
    /// Inline JSON schema or the URI of one.
    pub schema: OneOf<Map<String, Value>, String>,
    #[serde(default = "default_true")]
    pub fail_on_validation_errors: bool,
}

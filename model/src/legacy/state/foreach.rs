use crate::legacy::action::ActionDefinition;
use crate::legacy::timeout::TimeoutsDefinition;
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use swdsl_base::{EquatableList, OneOf};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ForEachMode {
    #[default]
    Parallel,
    Sequential,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ForEachStateDefinition {
    pub input_collection: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_collection: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iteration_param: Option<String>,
    /// Maximum parallel iterations, as a number or a numeric string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<OneOf<u32, String>>,
    #[serde(default, skip_serializing_if = "EquatableList::is_empty")]
    pub actions: EquatableList<ActionDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<ForEachMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeouts: Option<TimeoutsDefinition>,
}

use crate::legacy::action::ActionDefinition;
use crate::legacy::filter::EventDataFilterDefinition;
use crate::legacy::timeout::TimeoutsDefinition;
use serde::{Deserialize, Serialize};

/// Performs an action, then waits for the event that reports its result.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CallbackStateDefinition {
    pub action: ActionDefinition,
    pub event_ref: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeouts: Option<TimeoutsDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_data_filter: Option<EventDataFilterDefinition>,
}

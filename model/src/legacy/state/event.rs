use super::operation::ActionMode;
use crate::legacy::action::ActionDefinition;
use crate::legacy::filter::EventDataFilterDefinition;
use crate::legacy::timeout::TimeoutsDefinition;
use serde::{Deserialize, Serialize};
use swdsl_base::EquatableList;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct OnEventsDefinition {
    pub event_refs: EquatableList<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_mode: Option<ActionMode>,
    #[serde(default, skip_serializing_if = "EquatableList::is_empty")]
    pub actions: EquatableList<ActionDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_data_filter: Option<EventDataFilterDefinition>,
}

fn default_true() -> bool {
    true
}

fn is_true(value: &bool) -> bool {
    *value
}

/// Waits for events and runs the actions of the matching `onEvents` entry.
/// With `exclusive: false` every listed event must arrive.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventStateDefinition {
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub exclusive: bool,
    pub on_events: EquatableList<OnEventsDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeouts: Option<TimeoutsDefinition>,
}

impl EventStateDefinition {
    /// Every event name referenced by the state's `onEvents`.
    pub fn event_refs(&self) -> impl Iterator<Item = &String> {
        self.on_events.iter().flat_map(|e| e.event_refs.iter())
    }
}

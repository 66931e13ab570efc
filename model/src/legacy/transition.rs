use serde::{Deserialize, Serialize};
use serde_json::Value;
use swdsl_base::{EquatableList, EquatableMap, OneOf};

fn is_false(value: &bool) -> bool {
    !value
}

/// Event produced when a state transitions or the workflow ends.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProduceEventDefinition {
    pub event_ref: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "EquatableMap::is_empty")]
    pub context_attributes: EquatableMap<String, String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransitionDefinition {
    pub next_state: String,
    #[serde(default, skip_serializing_if = "EquatableList::is_empty")]
    pub produce_events: EquatableList<ProduceEventDefinition>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub compensate: bool,
}

impl TransitionDefinition {
    pub fn to(next_state: impl Into<String>) -> Self {
        Self {
            next_state: next_state.into(),
            produce_events: EquatableList::new(),
            compensate: false,
        }
    }
}

/// `transition: "next"` or `transition: { nextState: "next", ... }`.
pub type Transition = OneOf<TransitionDefinition, String>;

/// Target state of a transition, whichever shape it was written in.
pub fn next_state(transition: &Transition) -> &str {
    match transition {
        OneOf::First(t) => &t.next_state,
        OneOf::Second(name) => name,
    }
}

/// Starts a new execution of the same (or another) workflow on completion.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContinueAsDefinition {
    pub workflow_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_exec_timeout: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct EndDefinition {
    #[serde(default, skip_serializing_if = "is_false")]
    pub terminate: bool,
    #[serde(default, skip_serializing_if = "EquatableList::is_empty")]
    pub produce_events: EquatableList<ProduceEventDefinition>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub compensate: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continue_as: Option<OneOf<ContinueAsDefinition, String>>,
}

/// `end: true` or `end: { terminate: true, ... }`.
pub type End = OneOf<EndDefinition, bool>;

pub fn is_end(end: Option<&End>) -> bool {
    match end {
        None => false,
        Some(OneOf::First(_)) => true,
        Some(OneOf::Second(flag)) => *flag,
    }
}

/// Entry of a state's `onErrors`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ErrorHandlerDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_ref: Option<String>,
    #[serde(default, skip_serializing_if = "EquatableList::is_empty")]
    pub error_refs: EquatableList<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<Transition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<End>,
}

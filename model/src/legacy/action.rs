use super::filter::ActionDataFilterDefinition;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::{Display, EnumString};
use swdsl_base::{EquatableList, EquatableMap, OneOf};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum InvocationMode {
    #[default]
    Sync,
    Async,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FunctionReferenceDefinition {
    pub ref_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection_set: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoke: Option<InvocationMode>,
}

impl FunctionReferenceDefinition {
    pub fn new(ref_name: impl Into<String>) -> Self {
        Self {
            ref_name: ref_name.into(),
            arguments: None,
            selection_set: None,
            invoke: None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventReferenceDefinition {
    pub produce_event_ref: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consume_event_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consume_event_timeout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "EquatableMap::is_empty")]
    pub context_attributes: EquatableMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoke: Option<InvocationMode>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ParentCompletionBehavior {
    #[default]
    Terminate,
    Continue,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubflowReferenceDefinition {
    pub workflow_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoke: Option<InvocationMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_parent_complete: Option<ParentCompletionBehavior>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct SleepDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ActionType {
    Function,
    Trigger,
    Subflow,
}

/// One unit of work performed by a state.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ActionDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_ref: Option<OneOf<FunctionReferenceDefinition, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_ref: Option<EventReferenceDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_flow_ref: Option<OneOf<SubflowReferenceDefinition, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep: Option<SleepDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_ref: Option<String>,
    #[serde(default, skip_serializing_if = "EquatableList::is_empty")]
    pub retryable_errors: EquatableList<String>,
    #[serde(default, skip_serializing_if = "EquatableList::is_empty")]
    pub non_retryable_errors: EquatableList<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_data_filter: Option<ActionDataFilterDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

impl ActionDefinition {
    pub fn call(function: impl Into<String>) -> Self {
        Self {
            function_ref: Some(OneOf::from_second(function.into())),
            ..Default::default()
        }
    }

    /// `None` when the action references nothing to perform.
    pub fn action_type(&self) -> Option<ActionType> {
        if self.function_ref.is_some() {
            Some(ActionType::Function)
        } else if self.event_ref.is_some() {
            Some(ActionType::Trigger)
        } else if self.sub_flow_ref.is_some() {
            Some(ActionType::Subflow)
        } else {
            None
        }
    }

    pub fn function_name(&self) -> Option<&str> {
        self.function_ref.as_ref().map(|f| match f {
            OneOf::First(reference) => reference.ref_name.as_str(),
            OneOf::Second(name) => name.as_str(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_action_type() {
        let short: ActionDefinition =
            serde_json::from_value(json!({"functionRef": "sendEmail"})).unwrap();
        assert_eq!(short.action_type(), Some(ActionType::Function));
        assert_eq!(short.function_name(), Some("sendEmail"));

        let full: ActionDefinition = serde_json::from_value(json!({
            "name": "charge",
            "functionRef": {"refName": "chargeCard", "arguments": {"amount": "${ .total }"}, "invoke": "async"},
            "actionDataFilter": {"results": "${ .receipt }"}
        }))
        .unwrap();
        let reference = full.function_ref.as_ref().and_then(|f| f.first()).unwrap();
        assert_eq!(reference.invoke, Some(InvocationMode::Async));
        assert!(full.action_data_filter.as_ref().unwrap().use_results);

        let subflow: ActionDefinition =
            serde_json::from_value(json!({"subFlowRef": {"workflowId": "child", "version": "1.0"}}))
                .unwrap();
        assert_eq!(subflow.action_type(), Some(ActionType::Subflow));

        let trigger: ActionDefinition =
            serde_json::from_value(json!({"eventRef": {"produceEventRef": "OrderPlaced"}})).unwrap();
        assert_eq!(trigger.action_type(), Some(ActionType::Trigger));
        assert_eq!(ActionDefinition::default().action_type(), None);
    }
}

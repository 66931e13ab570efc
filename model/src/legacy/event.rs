use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use swdsl_base::{EquatableList, EquatableMap};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EventKind {
    #[default]
    Consumed,
    Produced,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationDefinition {
    pub context_attribute_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_attribute_value: Option<String>,
}

fn default_true() -> bool {
    true
}

fn is_true(value: &bool) -> bool {
    *value
}

/// Cloud event declared in the workflow's `events` collection.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    #[serde(default)]
    pub kind: EventKind,
    #[serde(default, skip_serializing_if = "EquatableList::is_empty")]
    pub correlation: EquatableList<CorrelationDefinition>,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub data_only: bool,
    #[serde(default, skip_serializing_if = "EquatableMap::is_empty")]
    pub metadata: EquatableMap<String, String>,
}

impl EventDefinition {
    pub fn new(name: impl Into<String>, kind: EventKind) -> Self {
        Self {
            name: name.into(),
            source: None,
            type_: None,
            kind,
            correlation: EquatableList::new(),
            data_only: true,
            metadata: EquatableMap::new(),
        }
    }
}

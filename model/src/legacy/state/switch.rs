use crate::legacy::filter::EventDataFilterDefinition;
use crate::legacy::timeout::TimeoutsDefinition;
use crate::legacy::transition::{End, Transition};
use serde::de::Error as _;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use strum_macros::Display;
use swdsl_base::error::{DefinitionError, Result};
use swdsl_base::object::{from_object, into_object, single_kind};
use swdsl_base::{EquatableList, EquatableMap};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DataCaseDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub condition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<Transition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<End>,
    #[serde(default, skip_serializing_if = "EquatableMap::is_empty")]
    pub metadata: EquatableMap<String, String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventCaseDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub event_ref: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<Transition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<End>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_data_filter: Option<EventDataFilterDefinition>,
    #[serde(default, skip_serializing_if = "EquatableMap::is_empty")]
    pub metadata: EquatableMap<String, String>,
}

/// Case of a switch state, told apart by shape: data cases carry
/// `condition`, event cases carry `eventRef`.
#[derive(Clone, Debug, PartialEq)]
pub enum SwitchCaseDefinition {
    Data(DataCaseDefinition),
    Event(EventCaseDefinition),
}

impl SwitchCaseDefinition {
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Data(c) => c.name.as_deref(),
            Self::Event(c) => c.name.as_deref(),
        }
    }

    pub fn transition(&self) -> Option<&Transition> {
        match self {
            Self::Data(c) => c.transition.as_ref(),
            Self::Event(c) => c.transition.as_ref(),
        }
    }

    pub fn end(&self) -> Option<&End> {
        match self {
            Self::Data(c) => c.end.as_ref(),
            Self::Event(c) => c.end.as_ref(),
        }
    }

    pub fn from_value(node: Value) -> Result<Self> {
        let object = into_object(node, "SwitchCaseDefinition")?;
        match single_kind(&object, "switch case", &["condition", "eventRef"])? {
            "condition" => Ok(Self::Data(from_object(object)?)),
            _ => Ok(Self::Event(from_object(object)?)),
        }
    }
}

impl Serialize for SwitchCaseDefinition {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Data(c) => c.serialize(serializer),
            Self::Event(c) => c.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for SwitchCaseDefinition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let node = Value::deserialize(deserializer)?;
        Self::from_value(node).map_err(D::Error::custom)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct DefaultConditionDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<Transition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<End>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum SwitchType {
    Data,
    Event,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SwitchStateDefinition {
    #[serde(default, skip_serializing_if = "EquatableList::is_empty")]
    pub data_conditions: EquatableList<DataCaseDefinition>,
    #[serde(default, skip_serializing_if = "EquatableList::is_empty")]
    pub event_conditions: EquatableList<EventCaseDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_condition: Option<DefaultConditionDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeouts: Option<TimeoutsDefinition>,
}

impl SwitchStateDefinition {
    /// `Event` as soon as any event condition is present.
    pub fn switch_type(&self) -> SwitchType {
        if self.event_conditions.is_empty() {
            SwitchType::Data
        } else {
            SwitchType::Event
        }
    }

    /// All cases in declaration order of their list, data cases first.
    pub fn cases(&self) -> Vec<SwitchCaseDefinition> {
        self.data_conditions
            .iter()
            .cloned()
            .map(SwitchCaseDefinition::Data)
            .chain(
                self.event_conditions
                    .iter()
                    .cloned()
                    .map(SwitchCaseDefinition::Event),
            )
            .collect()
    }

    pub fn from_cases(cases: impl IntoIterator<Item = SwitchCaseDefinition>) -> Self {
        let mut switch = Self::default();
        for case in cases {
            match case {
                SwitchCaseDefinition::Data(c) => switch.data_conditions.push(c),
                SwitchCaseDefinition::Event(c) => switch.event_conditions.push(c),
            }
        }
        switch
    }

    /// A switch holds cases of exactly one kind.
    pub fn validate(&self, field: &str) -> Result<()> {
        match (self.data_conditions.is_empty(), self.event_conditions.is_empty()) {
            (true, true) => Err(DefinitionError::cardinality(
                format!("{field}.dataConditions"),
                1,
                0,
            )),
            (false, false) => Err(DefinitionError::mutually_exclusive(
                field,
                &["dataConditions", "eventConditions"],
            )),
            _ => Ok(()),
        }
    }
}

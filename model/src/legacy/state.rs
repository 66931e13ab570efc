// Legacy states. Unlike tasks, the variant is tagged explicitly by the
// `type` key; types this model does not know are kept as extensions.

pub mod callback;
pub mod event;
pub mod foreach;
pub mod inject;
pub mod operation;
pub mod parallel;
pub mod sleep;
pub mod switch;

use super::transition::{End, ErrorHandlerDefinition, Transition, is_end, next_state};
use super::filter::StateDataFilterDefinition;
use serde::de::{DeserializeOwned, Error as _};
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use strum_macros::{Display, EnumString};
use swdsl_base::error::{DefinitionError, Result};
use swdsl_base::object::{Object, from_object, into_object, merge, take_keys, to_object};
use swdsl_base::{EquatableList, EquatableMap};

pub use callback::CallbackStateDefinition;
pub use event::{EventStateDefinition, OnEventsDefinition};
pub use foreach::{ForEachMode, ForEachStateDefinition};
pub use inject::InjectStateDefinition;
pub use operation::{ActionMode, OperationStateDefinition};
pub use parallel::{BranchDefinition, CompletionType, ParallelStateDefinition};
pub use sleep::SleepStateDefinition;
pub use switch::{
    DataCaseDefinition, DefaultConditionDefinition, EventCaseDefinition, SwitchCaseDefinition,
    SwitchStateDefinition, SwitchType,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum StateType {
    Callback,
    Sleep,
    Event,
    #[strum(to_string = "foreach", serialize = "forEach")]
    ForEach,
    Inject,
    Operation,
    Parallel,
    Switch,
}

impl StateType {
    fn parse(self, object: Object) -> Result<(StateKind, Object)> {
        match self {
            StateType::Callback => parse_state::<CallbackStateDefinition>(object),
            StateType::Sleep => parse_state::<SleepStateDefinition>(object),
            StateType::Event => parse_state::<EventStateDefinition>(object),
            StateType::ForEach => parse_state::<ForEachStateDefinition>(object),
            StateType::Inject => parse_state::<InjectStateDefinition>(object),
            StateType::Operation => parse_state::<OperationStateDefinition>(object),
            StateType::Parallel => parse_state::<ParallelStateDefinition>(object),
            StateType::Switch => parse_state::<SwitchStateDefinition>(object),
        }
    }
}

/// Payload of one state type together with the wire keys it owns.
pub trait StateVariant: Serialize + DeserializeOwned + Into<StateKind> {
    const TYPE: StateType;
    const KEYS: &'static [&'static str];
}

fn parse_state<T: StateVariant>(object: Object) -> Result<(StateKind, Object)> {
    let (owned, rest) = take_keys(object, T::KEYS);
    let variant: T = from_object(owned).map_err(|e| match e {
        DefinitionError::Serialization(detail) => {
            DefinitionError::Serialization(format!("{} state: {detail}", T::TYPE))
        }
        other => other,
    })?;
    Ok((variant.into(), rest))
}

/// State whose `type` is not one of [`StateType`], kept verbatim.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtensionStateDefinition {
    pub type_: String,
    pub properties: EquatableMap<String, Value>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum StateKind {
    Callback(CallbackStateDefinition),
    Sleep(SleepStateDefinition),
    Event(EventStateDefinition),
    ForEach(ForEachStateDefinition),
    Inject(InjectStateDefinition),
    Operation(OperationStateDefinition),
    Parallel(ParallelStateDefinition),
    Switch(SwitchStateDefinition),
    Extension(ExtensionStateDefinition),
}

macro_rules! state_variant {
    ($payload:ty, $variant:ident, [$($key:literal),+]) => {
        impl StateVariant for $payload {
            const TYPE: StateType = StateType::$variant;
            const KEYS: &'static [&'static str] = &[$($key),+];
        }

        impl From<$payload> for StateKind {
            fn from(value: $payload) -> Self {
                StateKind::$variant(value)
            }
        }
    };
}

state_variant!(
    CallbackStateDefinition,
    Callback,
    ["action", "eventRef", "timeouts", "eventDataFilter"]
);
state_variant!(SleepStateDefinition, Sleep, ["duration", "timeouts"]);
state_variant!(EventStateDefinition, Event, ["exclusive", "onEvents", "timeouts"]);
state_variant!(
    ForEachStateDefinition,
    ForEach,
    [
        "inputCollection",
        "outputCollection",
        "iterationParam",
        "batchSize",
        "actions",
        "mode",
        "timeouts"
    ]
);
state_variant!(InjectStateDefinition, Inject, ["data", "timeouts"]);
state_variant!(OperationStateDefinition, Operation, ["actionMode", "actions", "timeouts"]);
state_variant!(
    ParallelStateDefinition,
    Parallel,
    ["branches", "completionType", "numCompleted", "timeouts"]
);
state_variant!(
    SwitchStateDefinition,
    Switch,
    ["dataConditions", "eventConditions", "defaultCondition", "timeouts"]
);

impl StateKind {
    pub fn state_type(&self) -> Option<StateType> {
        match self {
            StateKind::Callback(_) => Some(StateType::Callback),
            StateKind::Sleep(_) => Some(StateType::Sleep),
            StateKind::Event(_) => Some(StateType::Event),
            StateKind::ForEach(_) => Some(StateType::ForEach),
            StateKind::Inject(_) => Some(StateType::Inject),
            StateKind::Operation(_) => Some(StateType::Operation),
            StateKind::Parallel(_) => Some(StateType::Parallel),
            StateKind::Switch(_) => Some(StateType::Switch),
            StateKind::Extension(_) => None,
        }
    }

    fn to_object(&self) -> Result<Object> {
        match self {
            StateKind::Callback(s) => to_object(s, "CallbackStateDefinition"),
            StateKind::Sleep(s) => to_object(s, "SleepStateDefinition"),
            StateKind::Event(s) => to_object(s, "EventStateDefinition"),
            StateKind::ForEach(s) => to_object(s, "ForEachStateDefinition"),
            StateKind::Inject(s) => to_object(s, "InjectStateDefinition"),
            StateKind::Operation(s) => to_object(s, "OperationStateDefinition"),
            StateKind::Parallel(s) => to_object(s, "ParallelStateDefinition"),
            StateKind::Switch(s) => to_object(s, "SwitchStateDefinition"),
            StateKind::Extension(ext) => Ok(ext
                .properties
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()),
        }
    }
}

fn is_false(value: &bool) -> bool {
    !value
}

/// Fields every state carries regardless of its type.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct StateDefinitionFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_data_filter: Option<StateDataFilterDefinition>,
    #[serde(default, skip_serializing_if = "EquatableList::is_empty")]
    pub on_errors: EquatableList<ErrorHandlerDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<Transition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<End>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compensated_by: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub used_for_compensation: bool,
    #[serde(default, skip_serializing_if = "EquatableMap::is_empty")]
    pub metadata: EquatableMap<String, String>,
}

impl StateDefinitionFields {
    pub const KEYS: [&'static str; 9] = [
        "id",
        "name",
        "stateDataFilter",
        "onErrors",
        "transition",
        "end",
        "compensatedBy",
        "usedForCompensation",
        "metadata",
    ];
}

#[derive(Clone, Debug, PartialEq)]
pub struct StateDefinition {
    pub fields: StateDefinitionFields,
    pub kind: StateKind,
    /// Keys that belong neither to the common fields nor to the state type.
    pub extension_data: EquatableMap<String, Value>,
}

impl StateDefinition {
    pub fn new(name: impl Into<String>, kind: impl Into<StateKind>) -> Self {
        Self {
            fields: StateDefinitionFields {
                name: name.into(),
                ..Default::default()
            },
            kind: kind.into(),
            extension_data: EquatableMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.fields.name
    }

    pub fn state_type(&self) -> Option<StateType> {
        self.kind.state_type()
    }

    /// Value of the `type` key, including the type of an extension state.
    pub fn type_name(&self) -> String {
        match &self.kind {
            StateKind::Extension(ext) => ext.type_.clone(),
            other => other
                .state_type()
                .map(|t| t.to_string())
                .unwrap_or_default(),
        }
    }

    pub fn next_state(&self) -> Option<&str> {
        self.fields.transition.as_ref().map(next_state)
    }

    pub fn is_end(&self) -> bool {
        is_end(self.fields.end.as_ref())
    }

    pub fn from_value(node: Value) -> Result<Self> {
        let mut object = into_object(node, "StateDefinition")?;
        let type_name = match object.remove("type") {
            Some(Value::String(type_name)) => type_name,
            Some(other) => {
                return Err(DefinitionError::invalid_format(
                    "type",
                    other.to_string(),
                    "must be a string",
                ));
            }
            None => return Err(DefinitionError::missing("StateDefinition", "type")),
        };
        if !object.contains_key("name") {
            return Err(DefinitionError::missing("StateDefinition", "name"));
        }
        let (common, rest) = take_keys(object, &StateDefinitionFields::KEYS);
        let fields: StateDefinitionFields = from_object(common)?;
        let (kind, extra) = match type_name.parse::<StateType>() {
            Ok(state_type) => state_type.parse(rest)?,
            Err(_) => {
                tracing::warn!(
                    "state '{}' has unknown type '{}', keeping it as extension",
                    fields.name,
                    type_name
                );
                let ext = ExtensionStateDefinition {
                    type_: type_name,
                    properties: rest.into_iter().collect(),
                };
                (StateKind::Extension(ext), Object::new())
            }
        };
        Ok(Self {
            fields,
            kind,
            extension_data: extra.into_iter().collect(),
        })
    }

    /// `type` first, then the common fields, the type payload and preserved
    /// extension keys.
    pub fn to_object(&self) -> Result<Object> {
        let mut object = Object::new();
        object.insert("type".to_string(), Value::String(self.type_name()));
        merge(&mut object, to_object(&self.fields, "StateDefinitionFields")?);
        merge(&mut object, self.kind.to_object()?);
        for (key, value) in self.extension_data.iter() {
            object.insert(key.clone(), value.clone());
        }
        Ok(object)
    }
}

impl Serialize for StateDefinition {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_object()
            .map_err(S::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for StateDefinition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let node = Value::deserialize(deserializer)?;
        Self::from_value(node).map_err(D::Error::custom)
    }
}

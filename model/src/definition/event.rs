use super::data::{ExportDefinition, OutputDataModelDefinition};
use super::task::TaskDefinition;
use serde::de::Error as _;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use swdsl_base::error::{DefinitionError, Result};
use swdsl_base::object::{Object, into_object, single_kind, take_keys};
use swdsl_base::{EquatableList, EquatableMap, NamedMap, OneOf};

/// CloudEvent attributes (`type`, `source`, `data`, extensions...).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct EventDefinition {
    #[serde(default)]
    pub with: EquatableMap<String, Value>,
}

impl EventDefinition {
    pub fn type_(&self) -> Option<&str> {
        self.with.get("type").and_then(Value::as_str)
    }

    pub fn source(&self) -> Option<&str> {
        self.with.get("source").and_then(Value::as_str)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CorrelationKeyDefinition {
    pub from: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expect: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct EventFilterDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub with: Option<EquatableMap<String, Value>>,
    #[serde(default, skip_serializing_if = "EquatableMap::is_empty")]
    pub correlate: EquatableMap<String, CorrelationKeyDefinition>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum EventConsumptionKind {
    All(EquatableList<EventFilterDefinition>),
    Any(EquatableList<EventFilterDefinition>),
    One(EventFilterDefinition),
}

/// `{ all: [...] }`, `{ any: [...], until: ... }` or `{ one: {...} }`.
#[derive(Clone, Debug, PartialEq)]
pub struct EventConsumptionStrategyDefinition {
    pub kind: EventConsumptionKind,
    pub until: Option<OneOf<Box<EventConsumptionStrategyDefinition>, String>>,
}

impl EventConsumptionStrategyDefinition {
    const KEYS: [&'static str; 3] = ["all", "any", "one"];

    pub fn all(filters: impl IntoIterator<Item = EventFilterDefinition>) -> Self {
        Self::from(EventConsumptionKind::All(filters.into_iter().collect()))
    }

    pub fn any(filters: impl IntoIterator<Item = EventFilterDefinition>) -> Self {
        Self::from(EventConsumptionKind::Any(filters.into_iter().collect()))
    }

    pub fn one(filter: EventFilterDefinition) -> Self {
        Self::from(EventConsumptionKind::One(filter))
    }

    pub fn from_value(node: Value) -> Result<Self> {
        let object = into_object(node, "EventConsumptionStrategyDefinition")?;
        let key = single_kind(&object, "event consumption strategy", &Self::KEYS)?;
        let (mut owned, rest) = take_keys(object, &[key]);
        let (until, _) = take_keys(rest, &["until"]);
        let body = owned.remove(key).unwrap_or(Value::Null);
        let kind = match key {
            "all" => EventConsumptionKind::All(serde_json::from_value(body)?),
            "any" => EventConsumptionKind::Any(serde_json::from_value(body)?),
            _ => EventConsumptionKind::One(serde_json::from_value(body)?),
        };
        let until = match until.into_iter().next() {
            Some((_, node)) => Some(OneOf::from_value(node)?),
            None => None,
        };
        Ok(Self { kind, until })
    }

    pub fn to_object(&self) -> Result<Object> {
        let (key, body) = match &self.kind {
            EventConsumptionKind::All(filters) => ("all", serde_json::to_value(filters)?),
            EventConsumptionKind::Any(filters) => ("any", serde_json::to_value(filters)?),
            EventConsumptionKind::One(filter) => ("one", serde_json::to_value(filter)?),
        };
        let mut object = Object::new();
        object.insert(key.to_string(), body);
        if let Some(until) = &self.until {
            object.insert("until".to_string(), serde_json::to_value(until)?);
        }
        Ok(object)
    }

    pub fn validate(&self, field: &str) -> Result<()> {
        match &self.kind {
            EventConsumptionKind::All(filters) | EventConsumptionKind::Any(filters)
                if filters.is_empty() =>
            {
                let key = if matches!(self.kind, EventConsumptionKind::All(_)) {
                    "all"
                } else {
                    "any"
                };
                Err(DefinitionError::cardinality(format!("{field}.{key}"), 1, 0))
            }
            EventConsumptionKind::All(_) | EventConsumptionKind::One(_) if self.until.is_some() => {
                Err(DefinitionError::mutually_exclusive(field, &["until", "all", "one"]))
            }
            _ => Ok(()),
        }
    }
}

impl From<EventConsumptionKind> for EventConsumptionStrategyDefinition {
    fn from(kind: EventConsumptionKind) -> Self {
        Self { kind, until: None }
    }
}

impl Serialize for EventConsumptionStrategyDefinition {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_object()
            .map_err(S::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for EventConsumptionStrategyDefinition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let node = Value::deserialize(deserializer)?;
        Self::from_value(node).map_err(D::Error::custom)
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum EventReadMode {
    #[default]
    Data,
    Envelope,
    Raw,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ListenerDefinition {
    pub to: EventConsumptionStrategyDefinition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read: Option<EventReadMode>,
}

/// Per-event processing of a `listen` task (`foreach`).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct SubscriptionIteratorDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at: Option<String>,
    #[serde(rename = "do", default, skip_serializing_if = "NamedMap::is_empty")]
    pub do_: NamedMap<TaskDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputDataModelDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export: Option<ExportDefinition>,
}

/// Body of an `emit` task.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct EventEmissionDefinition {
    pub event: EventDefinition,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strategy_shapes() {
        let all = EventConsumptionStrategyDefinition::from_value(json!({
            "all": [
                {"with": {"type": "com.example.order.placed"}},
                {"with": {"type": "com.example.order.paid"}, "correlate": {"orderId": {"from": ".data.id"}}}
            ]
        }))
        .unwrap();
        assert!(matches!(&all.kind, EventConsumptionKind::All(f) if f.len() == 2));
        assert!(all.validate("listen.to").is_ok());

        let any: EventConsumptionStrategyDefinition = serde_json::from_value(json!({
            "any": [{"with": {"type": "tick"}}],
            "until": "${ .count > 3 }"
        }))
        .unwrap();
        assert_eq!(any.until.as_ref().and_then(|u| u.second()).map(String::as_str), Some("${ .count > 3 }"));
        assert_eq!(
            serde_json::to_value(&any).unwrap(),
            json!({"any": [{"with": {"type": "tick"}}], "until": "${ .count > 3 }"})
        );

        let nested: EventConsumptionStrategyDefinition = serde_json::from_value(json!({
            "any": [],
            "until": {"one": {"with": {"type": "stop"}}}
        }))
        .unwrap();
        assert!(nested.until.as_ref().is_some_and(|u| u.is_first()));
        assert!(matches!(
            nested.validate("listen.to"),
            Err(DefinitionError::Cardinality { .. })
        ));
    }

    #[test]
    fn test_strategy_requires_one_key() {
        let err = EventConsumptionStrategyDefinition::from_value(json!({
            "all": [], "one": {}
        }))
        .unwrap_err();
        assert!(matches!(err, DefinitionError::AmbiguousKind { .. }));
    }
}

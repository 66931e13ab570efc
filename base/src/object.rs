// Support for the hand-written converters.
//
// JSON and YAML input is first buffered into a `serde_json::Value` so one
// converter per union family serves both formats. Discrimination branches on
// the node kind and on which keys are present, never on content heuristics.

use crate::error::{DefinitionError, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use strum_macros::Display;

pub type Object = serde_json::Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum NodeKind {
    Null,
    Scalar,
    Mapping,
    Sequence,
}

pub fn node_kind(value: &Value) -> NodeKind {
    match value {
        Value::Null => NodeKind::Null,
        Value::Bool(_) | Value::Number(_) | Value::String(_) => NodeKind::Scalar,
        Value::Array(_) => NodeKind::Sequence,
        Value::Object(_) => NodeKind::Mapping,
    }
}

pub fn into_object(value: Value, definition: &str) -> Result<Object> {
    match value {
        Value::Object(object) => Ok(object),
        other => Err(DefinitionError::ShapeMismatch {
            definition: definition.to_string(),
            expected: NodeKind::Mapping.to_string(),
            found: node_kind(&other).to_string(),
        }),
    }
}

/// Splits `object` into the entries whose key is listed in `keys` and the
/// remaining entries. Both halves keep the original key order.
pub fn take_keys(object: Object, keys: &[&str]) -> (Object, Object) {
    let mut taken = Object::new();
    let mut rest = Object::new();
    for (key, value) in object {
        if keys.contains(&key.as_str()) {
            taken.insert(key, value);
        } else {
            rest.insert(key, value);
        }
    }
    (taken, rest)
}

/// Keys of `object` that appear in `candidates`, in `candidates` order.
pub fn present_keys<'a>(object: &Object, candidates: &[&'a str]) -> Vec<&'a str> {
    candidates
        .iter()
        .copied()
        .filter(|key| object.contains_key(*key))
        .collect()
}

/// The single key of `object` that names the variant of a one-key union
/// such as `{ basic: {...} }`. Zero or several candidates is an error.
pub fn single_kind<'a>(object: &Object, family: &str, candidates: &[&'a str]) -> Result<&'a str> {
    match present_keys(object, candidates).as_slice() {
        [one] => Ok(*one),
        [] => Err(DefinitionError::ambiguous_kind(
            family,
            object.keys().cloned().collect(),
        )),
        many => Err(DefinitionError::ambiguous_kind(
            family,
            many.iter().map(|k| k.to_string()).collect(),
        )),
    }
}

pub fn from_object<T: DeserializeOwned>(object: Object) -> Result<T> {
    Ok(serde_json::from_value(Value::Object(object))?)
}

pub fn to_object<T: Serialize>(value: &T, definition: &str) -> Result<Object> {
    into_object(serde_json::to_value(value)?, definition)
}

/// Appends every entry of `source` to `target`; existing keys are overwritten.
pub fn merge(target: &mut Object, source: Object) {
    for (key, value) in source {
        target.insert(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_kind() {
        assert_eq!(node_kind(&json!(null)), NodeKind::Null);
        assert_eq!(node_kind(&json!("x")), NodeKind::Scalar);
        assert_eq!(node_kind(&json!(true)), NodeKind::Scalar);
        assert_eq!(node_kind(&json!([1])), NodeKind::Sequence);
        assert_eq!(node_kind(&json!({"a": 1})), NodeKind::Mapping);
    }

    #[test]
    fn test_take_keys_keeps_order() {
        let object = into_object(json!({"call": "greet", "if": "${ .x }", "with": {}}), "task")
            .expect("object");
        let (taken, rest) = take_keys(object, &["with", "call"]);
        assert_eq!(taken.keys().collect::<Vec<_>>(), vec!["call", "with"]);
        assert_eq!(rest.keys().collect::<Vec<_>>(), vec!["if"]);
    }

    #[test]
    fn test_single_kind() {
        let object = into_object(json!({"basic": {}, "use": "x"}), "auth").expect("object");
        assert_eq!(single_kind(&object, "auth", &["basic", "bearer"]).ok(), Some("basic"));
        let object = into_object(json!({"basic": {}, "bearer": {}}), "auth").expect("object");
        assert!(matches!(
            single_kind(&object, "auth", &["basic", "bearer"]),
            Err(DefinitionError::AmbiguousKind { keys, .. }) if keys == vec!["basic", "bearer"]
        ));
        let object = into_object(json!({"unknown": {}}), "auth").expect("object");
        assert!(single_kind(&object, "auth", &["basic", "bearer"]).is_err());
    }

    #[test]
    fn test_into_object_rejects_scalar() {
        let err = into_object(json!("plain"), "EndpointDefinition").unwrap_err();
        assert_eq!(
            err,
            DefinitionError::ShapeMismatch {
                definition: "EndpointDefinition".to_string(),
                expected: "mapping".to_string(),
                found: "scalar".to_string(),
            }
        );
    }
}

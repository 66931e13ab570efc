use crate::error::{DefinitionError, Result};
use crate::object::node_kind;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// A field that may hold either of two wire shapes, e.g. an inline
/// definition or the name of a reusable one.
///
/// Absence is expressed as `Option<OneOf<..>>`, so a value never carries
/// both alternatives. Deserialization tries `T1` first and falls back to
/// `T2`; serialization writes the active alternative as-is.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum OneOf<T1, T2> {
    First(T1),
    Second(T2),
}

/// Borrowed view of the active alternative of a [`OneOf`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OneOfRef<'a, T1, T2> {
    First(&'a T1),
    Second(&'a T2),
}

impl<T1, T2> OneOf<T1, T2> {
    pub fn from_first(value: T1) -> Self {
        Self::First(value)
    }

    pub fn from_second(value: T2) -> Self {
        Self::Second(value)
    }

    pub fn value(&self) -> OneOfRef<'_, T1, T2> {
        match self {
            Self::First(v) => OneOfRef::First(v),
            Self::Second(v) => OneOfRef::Second(v),
        }
    }

    pub fn first(&self) -> Option<&T1> {
        match self {
            Self::First(v) => Some(v),
            Self::Second(_) => None,
        }
    }

    pub fn second(&self) -> Option<&T2> {
        match self {
            Self::First(_) => None,
            Self::Second(v) => Some(v),
        }
    }

    pub fn is_first(&self) -> bool {
        matches!(self, Self::First(_))
    }

    pub fn is_second(&self) -> bool {
        matches!(self, Self::Second(_))
    }

    pub fn first_mut(&mut self) -> Option<&mut T1> {
        match self {
            Self::First(v) => Some(v),
            Self::Second(_) => None,
        }
    }

    pub fn into_first(self) -> Option<T1> {
        match self {
            Self::First(v) => Some(v),
            Self::Second(_) => None,
        }
    }

    pub fn into_second(self) -> Option<T2> {
        match self {
            Self::First(_) => None,
            Self::Second(v) => Some(v),
        }
    }

    pub fn map_first<U>(self, f: impl FnOnce(T1) -> U) -> OneOf<U, T2> {
        match self {
            Self::First(v) => OneOf::First(f(v)),
            Self::Second(v) => OneOf::Second(v),
        }
    }

    pub fn map_second<U>(self, f: impl FnOnce(T2) -> U) -> OneOf<T1, U> {
        match self {
            Self::First(v) => OneOf::First(v),
            Self::Second(v) => OneOf::Second(f(v)),
        }
    }

    /// Collapses both alternatives into a single result.
    pub fn either<R>(&self, first: impl FnOnce(&T1) -> R, second: impl FnOnce(&T2) -> R) -> R {
        match self {
            Self::First(v) => first(v),
            Self::Second(v) => second(v),
        }
    }
}

impl<T1, T2> OneOf<T1, T2>
where
    T1: DeserializeOwned,
    T2: DeserializeOwned,
{
    /// Routes an already buffered wire node into one of the alternatives.
    pub fn from_value(node: Value) -> Result<Self> {
        let first_err = match T1::deserialize(&node) {
            Ok(v) => return Ok(Self::First(v)),
            Err(e) => e,
        };
        match T2::deserialize(&node) {
            Ok(v) => Ok(Self::Second(v)),
            Err(second_err) => Err(DefinitionError::AmbiguousUnion {
                expected: format!("{} | {}", short_type_name::<T1>(), short_type_name::<T2>()),
                found: node_kind(&node).to_string(),
                detail: format!("{first_err}; {second_err}"),
            }),
        }
    }
}

impl<T1: Serialize, T2: Serialize> Serialize for OneOf<T1, T2> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::First(v) => v.serialize(serializer),
            Self::Second(v) => v.serialize(serializer),
        }
    }
}

impl<'de, T1, T2> Deserialize<'de> for OneOf<T1, T2>
where
    T1: DeserializeOwned,
    T2: DeserializeOwned,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let node = Value::deserialize(deserializer)?;
        Self::from_value(node).map_err(serde::de::Error::custom)
    }
}

/// `type_name` without module paths: `OneOf<EndpointDefinition, String>`.
fn short_type_name<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    let mut out = String::with_capacity(full.len());
    let mut segment = String::new();
    let flush = |segment: &mut String, out: &mut String| {
        if let Some(last) = segment.rsplit("::").next() {
            out.push_str(last);
        }
        segment.clear();
    };
    for c in full.chars() {
        if c.is_alphanumeric() || c == '_' || c == ':' {
            segment.push(c);
        } else {
            flush(&mut segment, &mut out);
            out.push(c);
        }
    }
    flush(&mut segment, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Endpoint {
        uri: String,
    }

    type EndpointOrUri = OneOf<Endpoint, String>;

    #[test]
    fn test_value_returns_active_slot() {
        let first = EndpointOrUri::from_first(Endpoint {
            uri: "https://example.com".to_string(),
        });
        assert!(first.is_first());
        assert_eq!(first.second(), None);
        assert!(matches!(first.value(), OneOfRef::First(e) if e.uri == "https://example.com"));

        let second = EndpointOrUri::from_second("https://example.com".to_string());
        assert!(second.is_second());
        assert_eq!(second.first(), None);
        assert_eq!(second.value(), OneOfRef::Second(&"https://example.com".to_string()));
    }

    #[test]
    fn test_deserialize_by_node_kind() {
        let from_object: EndpointOrUri =
            serde_json::from_value(json!({"uri": "https://example.com"})).unwrap();
        assert!(from_object.is_first());
        let from_scalar: EndpointOrUri = serde_json::from_value(json!("https://example.com")).unwrap();
        assert!(from_scalar.is_second());

        let yaml: EndpointOrUri = serde_yaml::from_str("uri: https://example.com\n").unwrap();
        assert_eq!(yaml, from_object);
    }

    #[test]
    fn test_neither_alternative_matches() {
        let err = EndpointOrUri::from_value(json!([1, 2])).unwrap_err();
        match err {
            DefinitionError::AmbiguousUnion {
                expected, found, ..
            } => {
                assert_eq!(expected, "Endpoint | String");
                assert_eq!(found, "sequence");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_serialize_writes_active_value_only() {
        let v = EndpointOrUri::from_second("urn:x".to_string());
        assert_eq!(serde_json::to_value(&v).unwrap(), json!("urn:x"));
        let v = EndpointOrUri::from_first(Endpoint {
            uri: "urn:x".to_string(),
        });
        assert_eq!(serde_json::to_value(&v).unwrap(), json!({"uri": "urn:x"}));
    }

    #[test]
    fn test_equality_requires_same_slot() {
        let a: OneOf<String, String> = OneOf::from_first("x".to_string());
        let b: OneOf<String, String> = OneOf::from_second("x".to_string());
        assert_ne!(a, b);
        assert_eq!(a, OneOf::from_first("x".to_string()));
    }
}

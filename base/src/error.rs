use strum_macros::{Display, EnumString};
use thiserror::Error;

/// Stable classification of [`DefinitionError`] for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum ErrorKind {
    MissingField,
    InvalidFormat,
    Cardinality,
    MutuallyExclusive,
    AmbiguousUnion,
    AmbiguousKind,
    ShapeMismatch,
    Serialization,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("MissingField: '{field}' is required by {definition}")]
    MissingField { definition: String, field: String },
    #[error("InvalidFormat: {field}='{value}' ({reason})")]
    InvalidFormat {
        field: String,
        value: String,
        reason: String,
    },
    #[error("Cardinality: '{field}' requires at least {min} entries, found {actual}")]
    Cardinality {
        field: String,
        min: usize,
        actual: usize,
    },
    #[error("MutuallyExclusive: {definition} accepts only one of [{}]", .fields.join(", "))]
    MutuallyExclusive {
        definition: String,
        fields: Vec<String>,
    },
    #[error("AmbiguousUnion: {found} value matches none of {expected}: {detail}")]
    AmbiguousUnion {
        expected: String,
        found: String,
        detail: String,
    },
    #[error("AmbiguousKind: {family} must declare exactly one of its kind keys, found [{}]", .keys.join(", "))]
    AmbiguousKind { family: String, keys: Vec<String> },
    #[error("ShapeMismatch: {definition} expects {expected}, found {found}")]
    ShapeMismatch {
        definition: String,
        expected: String,
        found: String,
    },
    #[error("Serialization({0})")]
    Serialization(String),
}

impl DefinitionError {
    pub fn missing(definition: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingField {
            definition: definition.into(),
            field: field.into(),
        }
    }

    pub fn invalid_format(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidFormat {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn cardinality(field: impl Into<String>, min: usize, actual: usize) -> Self {
        Self::Cardinality {
            field: field.into(),
            min,
            actual,
        }
    }

    pub fn mutually_exclusive(definition: impl Into<String>, fields: &[&str]) -> Self {
        Self::MutuallyExclusive {
            definition: definition.into(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }

    pub fn ambiguous_kind(family: impl Into<String>, keys: Vec<String>) -> Self {
        Self::AmbiguousKind {
            family: family.into(),
            keys,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingField { .. } => ErrorKind::MissingField,
            Self::InvalidFormat { .. } => ErrorKind::InvalidFormat,
            Self::Cardinality { .. } => ErrorKind::Cardinality,
            Self::MutuallyExclusive { .. } => ErrorKind::MutuallyExclusive,
            Self::AmbiguousUnion { .. } => ErrorKind::AmbiguousUnion,
            Self::AmbiguousKind { .. } => ErrorKind::AmbiguousKind,
            Self::ShapeMismatch { .. } => ErrorKind::ShapeMismatch,
            Self::Serialization(_) => ErrorKind::Serialization,
        }
    }

    /// Prefixes the field path with `parent`, used when a nested definition
    /// fails validation so the message points at the full location.
    pub fn within(self, parent: &str) -> Self {
        let nest = |field: String| format!("{parent}.{field}");
        match self {
            Self::MissingField { definition, field } => Self::MissingField {
                definition,
                field: nest(field),
            },
            Self::InvalidFormat {
                field,
                value,
                reason,
            } => Self::InvalidFormat {
                field: nest(field),
                value,
                reason,
            },
            Self::Cardinality { field, min, actual } => Self::Cardinality {
                field: nest(field),
                min,
                actual,
            },
            other => other,
        }
    }
}

impl From<serde_json::Error> for DefinitionError {
    fn from(e: serde_json::Error) -> Self {
        DefinitionError::Serialization(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DefinitionError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_message_names_field() {
        let err = DefinitionError::missing("EndpointDefinition", "uri");
        assert_eq!(err.kind(), ErrorKind::MissingField);
        assert!(err.to_string().contains("'uri'"));
        assert!(err.to_string().contains("EndpointDefinition"));
    }

    #[test]
    fn test_within_prefixes_path() {
        let err = DefinitionError::cardinality("fork.branches", 2, 1).within("do.parallel");
        assert_eq!(
            err,
            DefinitionError::Cardinality {
                field: "do.parallel.fork.branches".to_string(),
                min: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_error_kind_strings() {
        assert_eq!(ErrorKind::MissingField.to_string(), "missing-field");
        assert_eq!(
            ErrorKind::from_str("ambiguous-union").ok(),
            Some(ErrorKind::AmbiguousUnion)
        );
        let err = DefinitionError::ambiguous_kind("task", vec!["call".into(), "set".into()]);
        assert_eq!(err.kind(), ErrorKind::AmbiguousKind);
        assert!(err.to_string().contains("[call, set]"));
    }
}

use super::retry::RetryPolicyDefinition;
use super::task::TaskDefinition;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::{Display, EnumString};
use swdsl_base::error::{DefinitionError, Result};
use swdsl_base::validation::validate_uri_reference;
use swdsl_base::{NamedMap, OneOf};

/// Error categories defined by the DSL, identified by their type URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ErrorType {
    Configuration,
    Validation,
    Expression,
    Authentication,
    Authorization,
    Timeout,
    Communication,
    Runtime,
}

impl ErrorType {
    pub const BASE_URI: &'static str = "https://serverlessworkflow.io/spec/1.0.0/errors/";

    pub fn uri(&self) -> String {
        format!("{}{}", Self::BASE_URI, self)
    }

    pub fn default_status(&self) -> u16 {
        match self {
            ErrorType::Configuration | ErrorType::Validation | ErrorType::Expression => 400,
            ErrorType::Authentication => 401,
            ErrorType::Authorization => 403,
            ErrorType::Timeout => 408,
            ErrorType::Communication | ErrorType::Runtime => 500,
        }
    }

    pub fn from_uri(uri: &str) -> Option<Self> {
        uri.strip_prefix(Self::BASE_URI)
            .and_then(|name| name.parse().ok())
    }
}

/// Problem-details style error raised by a workflow.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ErrorDefinition {
    #[serde(rename = "type")]
    pub type_: String,
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
}

impl ErrorDefinition {
    pub fn new(type_: impl Into<String>, status: u16) -> Self {
        Self {
            type_: type_.into(),
            status,
            title: None,
            detail: None,
            instance: None,
        }
    }

    pub fn of(error_type: ErrorType) -> Self {
        Self::new(error_type.uri(), error_type.default_status())
    }

    pub fn error_type(&self) -> Option<ErrorType> {
        ErrorType::from_uri(&self.type_)
    }

    pub fn validate(&self, field: &str) -> Result<()> {
        validate_uri_reference(&format!("{field}.type"), &self.type_)?;
        if !(100..=599).contains(&self.status) {
            return Err(DefinitionError::invalid_format(
                format!("{field}.status"),
                self.status.to_string(),
                "must be a HTTP status code",
            ));
        }
        Ok(())
    }
}

impl fmt::Display for ErrorDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}): {}",
            self.type_,
            self.status,
            self.title.as_deref().unwrap_or("Unknown error")
        )
    }
}

/// Properties an error must match to be caught. String properties are URI
/// templates, so `{code}` segments match anything.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct ErrorFilterProperties {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct ErrorFilterDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub with: Option<ErrorFilterProperties>,
}

impl ErrorFilterDefinition {
    pub fn matches(&self, error: &ErrorDefinition) -> bool {
        let Some(with) = &self.with else {
            return true;
        };
        let text = |filter: &Option<String>, actual: Option<&str>| match filter {
            None => true,
            Some(template) => actual.is_some_and(|actual| uri_template_matches(template, actual)),
        };
        with.status.is_none_or(|status| status == error.status)
            && text(&with.type_, Some(&error.type_))
            && text(&with.instance, error.instance.as_deref())
            && text(&with.title, error.title.as_deref())
            && text(&with.detail, error.detail.as_deref())
    }
}

fn uri_template_matches(template: &str, value: &str) -> bool {
    let mut parts = template.split('{');
    let mut pattern = regex::escape(parts.next().unwrap_or_default());
    for part in parts {
        match part.find('}') {
            Some(idx) => {
                pattern.push_str("(.*)");
                pattern.push_str(&regex::escape(&part[idx + 1..]));
            }
            None => pattern.push_str(&regex::escape(&format!("{{{part}"))),
        }
    }
    regex::Regex::new(&format!("^{pattern}$"))
        .map(|re| re.is_match(value))
        .unwrap_or(false)
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ErrorCatcherDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<ErrorFilterDefinition>,
    /// Variable the caught error is stored in, `error` when unset.
    #[serde(rename = "as", default, skip_serializing_if = "Option::is_none")]
    pub as_: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub except_when: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry: Option<OneOf<RetryPolicyDefinition, String>>,
    #[serde(rename = "do", default, skip_serializing_if = "NamedMap::is_empty")]
    pub do_: NamedMap<TaskDefinition>,
}

impl ErrorCatcherDefinition {
    pub fn catches(&self, error: &ErrorDefinition) -> bool {
        self.errors.as_ref().is_none_or(|filter| filter.matches(error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_standard_error_types() {
        let timeout = ErrorDefinition::of(ErrorType::Timeout);
        assert_eq!(timeout.type_, "https://serverlessworkflow.io/spec/1.0.0/errors/timeout");
        assert_eq!(timeout.status, 408);
        assert_eq!(timeout.error_type(), Some(ErrorType::Timeout));
        assert_eq!(ErrorDefinition::new("urn:custom", 500).error_type(), None);
    }

    #[test]
    fn test_filter_matches_templates() {
        let filter: ErrorFilterDefinition = serde_json::from_value(json!({
            "with": {
                "type": "https://serverlessworkflow.io/spec/1.0.0/errors/{kind}",
                "status": 503
            }
        }))
        .unwrap();
        let mut error = ErrorDefinition::new(ErrorType::Communication.uri(), 503);
        assert!(filter.matches(&error));
        error.status = 500;
        assert!(!filter.matches(&error));
        assert!(ErrorFilterDefinition::default().matches(&error));
    }

    #[test]
    fn test_validate_status_range() {
        let mut error = ErrorDefinition::of(ErrorType::Validation);
        assert!(error.validate("raise.error").is_ok());
        error.status = 42;
        assert!(matches!(
            error.validate("raise.error"),
            Err(DefinitionError::InvalidFormat { field, .. }) if field == "raise.error.status"
        ));
    }

    #[test]
    fn test_catcher_wire_shape() {
        let catcher: ErrorCatcherDefinition = serde_json::from_value(json!({
            "errors": {"with": {"status": 503}},
            "as": "failure",
            "retry": "default",
            "do": [{"notify": {"set": {"failed": true}}}]
        }))
        .unwrap();
        assert_eq!(catcher.as_.as_deref(), Some("failure"));
        assert_eq!(catcher.retry.as_ref().and_then(|r| r.second()).map(String::as_str), Some("default"));
        assert_eq!(catcher.do_.len(), 1);
        assert!(catcher.catches(&ErrorDefinition::new("urn:x", 503)));
    }
}

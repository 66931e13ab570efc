use super::authentication::ReferenceableAuthenticationPolicy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use swdsl_base::error::{DefinitionError, Result};
use swdsl_base::validation::validate_uri_reference;
use swdsl_base::{EquatableMap, OneOf};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EndpointDefinition {
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication: Option<ReferenceableAuthenticationPolicy>,
}

impl EndpointDefinition {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            authentication: None,
        }
    }
}

/// Either a full endpoint definition or a bare URI (template).
pub type Endpoint = OneOf<EndpointDefinition, String>;

/// Uniform access to the two endpoint shapes.
pub trait EndpointExt {
    fn uri(&self) -> &str;
    fn authentication(&self) -> Option<&ReferenceableAuthenticationPolicy>;
    fn validate(&self, field: &str) -> Result<()> {
        validate_uri_reference(&format!("{field}.uri"), self.uri())
    }
}

impl EndpointExt for Endpoint {
    fn uri(&self) -> &str {
        match self {
            OneOf::First(endpoint) => &endpoint.uri,
            OneOf::Second(uri) => uri,
        }
    }

    fn authentication(&self) -> Option<&ReferenceableAuthenticationPolicy> {
        self.first().and_then(|e| e.authentication.as_ref())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ExternalResourceDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub endpoint: Endpoint,
}

impl ExternalResourceDefinition {
    pub fn from_uri(uri: impl Into<String>) -> Self {
        Self {
            name: None,
            endpoint: OneOf::from_second(uri.into()),
        }
    }

    pub fn uri(&self) -> &str {
        self.endpoint.uri()
    }
}

fn default_schema_format() -> String {
    "json".to_string()
}

fn is_default_schema_format(format: &str) -> bool {
    format == "json"
}

/// Schema given inline (`document`) or by reference (`resource`).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SchemaDefinition {
    #[serde(
        default = "default_schema_format",
        skip_serializing_if = "is_default_schema_format"
    )]
    pub format: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<ExternalResourceDefinition>,
}

impl SchemaDefinition {
    pub fn inline(document: Value) -> Self {
        Self {
            format: default_schema_format(),
            document: Some(document),
            resource: None,
        }
    }

    pub fn external(resource: ExternalResourceDefinition) -> Self {
        Self {
            format: default_schema_format(),
            document: None,
            resource: Some(resource),
        }
    }

    pub fn validate(&self, field: &str) -> Result<()> {
        match (&self.document, &self.resource) {
            (Some(_), Some(_)) => Err(DefinitionError::mutually_exclusive(
                field,
                &["document", "resource"],
            )),
            (None, None) => Err(DefinitionError::missing(field, "document")),
            (None, Some(resource)) => resource.endpoint.validate(&format!("{field}.resource.endpoint")),
            (Some(_), None) => Ok(()),
        }
    }
}

/// Key/value pairs that do not follow any schema, e.g. call arguments.
pub type Properties = EquatableMap<String, Value>;

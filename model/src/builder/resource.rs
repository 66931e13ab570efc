use super::authentication::AuthenticationPolicyDefinitionBuilder;
use crate::definition::resource::Endpoint;
use crate::definition::{
    EndpointDefinition, EndpointExt, ExternalResourceDefinition, SchemaDefinition,
};
use serde_json::Value;
use swdsl_base::OneOf;
use swdsl_base::error::{DefinitionError, Result};
use swdsl_base::validation::validate_uri_reference;

#[derive(Debug, Clone, Default)]
pub struct EndpointDefinitionBuilder {
    uri: Option<String>,
    authentication: Option<OneOf<AuthenticationPolicyDefinitionBuilder, String>>,
}

impl EndpointDefinitionBuilder {
    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    pub fn with_authentication(
        mut self,
        configure: impl FnOnce(AuthenticationPolicyDefinitionBuilder) -> AuthenticationPolicyDefinitionBuilder,
    ) -> Self {
        self.authentication = Some(OneOf::from_first(configure(Default::default())));
        self
    }

    /// Uses a policy declared under `use.authentications`.
    pub fn use_authentication(mut self, name: impl Into<String>) -> Self {
        self.authentication = Some(OneOf::from_second(name.into()));
        self
    }

    pub fn build(self) -> Result<EndpointDefinition> {
        let Some(uri) = self.uri.filter(|u| !u.trim().is_empty()) else {
            return Err(DefinitionError::missing("EndpointDefinition", "uri"));
        };
        let authentication = match self.authentication {
            None => None,
            Some(OneOf::First(policy)) => Some(OneOf::from_first(
                policy.build().map_err(|e| e.within("authentication"))?,
            )),
            Some(OneOf::Second(name)) => Some(OneOf::from_second(name)),
        };
        validate_uri_reference("uri", &uri)?;
        Ok(EndpointDefinition {
            uri,
            authentication,
        })
    }
}

/// A named resource behind an endpoint, given either as a bare URI or as a
/// full endpoint definition.
#[derive(Debug, Clone, Default)]
pub struct ExternalResourceDefinitionBuilder {
    name: Option<String>,
    endpoint: Option<OneOf<EndpointDefinitionBuilder, String>>,
}

impl ExternalResourceDefinitionBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.endpoint = Some(OneOf::from_second(uri.into()));
        self
    }

    pub fn endpoint(
        mut self,
        configure: impl FnOnce(EndpointDefinitionBuilder) -> EndpointDefinitionBuilder,
    ) -> Self {
        self.endpoint = Some(OneOf::from_first(configure(Default::default())));
        self
    }

    pub fn build(self) -> Result<ExternalResourceDefinition> {
        let endpoint: Endpoint = match self.endpoint {
            None => {
                return Err(DefinitionError::missing(
                    "ExternalResourceDefinition",
                    "endpoint",
                ));
            }
            Some(OneOf::First(builder)) => {
                OneOf::from_first(builder.build().map_err(|e| e.within("endpoint"))?)
            }
            Some(OneOf::Second(uri)) => {
                let endpoint: Endpoint = OneOf::from_second(uri);
                endpoint.validate("endpoint")?;
                endpoint
            }
        };
        Ok(ExternalResourceDefinition {
            name: self.name,
            endpoint,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct SchemaDefinitionBuilder {
    format: Option<String>,
    document: Option<Value>,
    resource: Option<ExternalResourceDefinitionBuilder>,
}

impl SchemaDefinitionBuilder {
    /// Defaults to `json`.
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn document(mut self, document: Value) -> Self {
        self.document = Some(document);
        self
    }

    pub fn resource(
        mut self,
        configure: impl FnOnce(ExternalResourceDefinitionBuilder) -> ExternalResourceDefinitionBuilder,
    ) -> Self {
        self.resource = Some(configure(Default::default()));
        self
    }

    pub fn build(self) -> Result<SchemaDefinition> {
        let resource = self
            .resource
            .map(|r| r.build().map_err(|e| e.within("schema.resource")))
            .transpose()?;
        let schema = SchemaDefinition {
            format: self.format.unwrap_or_else(|| "json".to_string()),
            document: self.document,
            resource,
        };
        schema.validate("schema")?;
        Ok(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::AuthenticationPolicyDefinition;
    use serde_json::json;

    #[test]
    fn test_endpoint_requires_uri() {
        assert!(matches!(
            EndpointDefinitionBuilder::default().use_authentication("petStore").build(),
            Err(DefinitionError::MissingField { field, .. }) if field == "uri"
        ));
        let endpoint = EndpointDefinitionBuilder::default()
            .uri("https://petstore.swagger.io/v2/pet/{petId}")
            .use_authentication("petStore")
            .build()
            .unwrap();
        assert_eq!(
            endpoint.authentication.as_ref().and_then(|a| a.second()).map(String::as_str),
            Some("petStore")
        );
    }

    #[test]
    fn test_endpoint_inline_authentication() {
        let endpoint = EndpointDefinitionBuilder::default()
            .uri("https://example.com/api")
            .with_authentication(|a| a.bearer(|b| b.token("${ .token }")))
            .build()
            .unwrap();
        assert!(matches!(
            endpoint.authentication.as_ref().and_then(|a| a.first()),
            Some(AuthenticationPolicyDefinition::Bearer(_))
        ));
        let err = EndpointDefinitionBuilder::default()
            .uri("https://example.com/api")
            .with_authentication(|a| a.basic(|b| b.username("admin")))
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            DefinitionError::MissingField { field, .. } if field == "authentication.basic.password"
        ));
    }

    #[test]
    fn test_external_resource_builder() {
        assert!(matches!(
            ExternalResourceDefinitionBuilder::default().name("spec").build(),
            Err(DefinitionError::MissingField { field, .. }) if field == "endpoint"
        ));
        let resource = ExternalResourceDefinitionBuilder::default()
            .name("petstore")
            .uri("https://petstore.swagger.io/v2/swagger.json")
            .build()
            .unwrap();
        assert_eq!(resource.uri(), "https://petstore.swagger.io/v2/swagger.json");
        assert!(resource.endpoint.is_second());
    }

    #[test]
    fn test_schema_document_or_resource() {
        assert!(matches!(
            SchemaDefinitionBuilder::default().build(),
            Err(DefinitionError::MissingField { field, .. }) if field == "document"
        ));
        let both = SchemaDefinitionBuilder::default()
            .document(json!({"type": "object"}))
            .resource(|r| r.uri("https://example.com/schema.json"))
            .build()
            .unwrap_err();
        assert!(matches!(both, DefinitionError::MutuallyExclusive { .. }));
        let schema = SchemaDefinitionBuilder::default()
            .format("avro")
            .resource(|r| r.uri("https://example.com/schema.avsc"))
            .build()
            .unwrap();
        assert_eq!(schema.format, "avro");
        assert!(schema.document.is_none());
    }
}

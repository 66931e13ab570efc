use crate::definition::authentication::ReferenceableAuthenticationPolicy;
use crate::definition::resource::{Endpoint, ExternalResourceDefinition};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::{Display, EnumString};
use swdsl_base::EquatableMap;
use swdsl_base::error::Result;
use swdsl_base::object::{from_object, to_object};

/// Invokes a function: one of the built-in protocols below or a function
/// declared under `use.functions`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CallTaskDefinition {
    pub call: String,
    #[serde(default, skip_serializing_if = "EquatableMap::is_empty")]
    pub with: EquatableMap<String, Value>,
    #[serde(rename = "await", default, skip_serializing_if = "Option::is_none")]
    pub await_: Option<bool>,
}

impl CallTaskDefinition {
    pub const HTTP: &'static str = "http";
    pub const GRPC: &'static str = "grpc";
    pub const OPENAPI: &'static str = "openapi";
    pub const ASYNCAPI: &'static str = "asyncapi";

    pub fn new(function: impl Into<String>) -> Self {
        Self {
            call: function.into(),
            with: EquatableMap::new(),
            await_: None,
        }
    }

    pub fn with_argument(mut self, name: impl Into<String>, value: Value) -> Self {
        self.with.insert(name.into(), value);
        self
    }

    pub fn is_builtin(&self) -> bool {
        [Self::HTTP, Self::GRPC, Self::OPENAPI, Self::ASYNCAPI].contains(&self.call.as_str())
    }

    pub fn http(args: &HttpCallDefinition) -> Result<Self> {
        Self::typed(Self::HTTP, args)
    }

    pub fn grpc(args: &GrpcCallDefinition) -> Result<Self> {
        Self::typed(Self::GRPC, args)
    }

    pub fn openapi(args: &OpenApiCallDefinition) -> Result<Self> {
        Self::typed(Self::OPENAPI, args)
    }

    pub fn asyncapi(args: &AsyncApiCallDefinition) -> Result<Self> {
        Self::typed(Self::ASYNCAPI, args)
    }

    /// `Ok(None)` unless the task calls `http`.
    pub fn as_http(&self) -> Result<Option<HttpCallDefinition>> {
        self.view(Self::HTTP)
    }

    pub fn as_grpc(&self) -> Result<Option<GrpcCallDefinition>> {
        self.view(Self::GRPC)
    }

    pub fn as_openapi(&self) -> Result<Option<OpenApiCallDefinition>> {
        self.view(Self::OPENAPI)
    }

    pub fn as_asyncapi(&self) -> Result<Option<AsyncApiCallDefinition>> {
        self.view(Self::ASYNCAPI)
    }

    fn typed<T: Serialize>(function: &str, args: &T) -> Result<Self> {
        Ok(Self {
            call: function.to_string(),
            with: to_object(args, function)?.into_iter().collect(),
            await_: None,
        })
    }

    fn view<T: DeserializeOwned>(&self, function: &str) -> Result<Option<T>> {
        if self.call != function {
            return Ok(None);
        }
        let args = self
            .with
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        from_object(args).map(Some)
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum HttpOutputFormat {
    Raw,
    #[default]
    Content,
    Response,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HttpCallDefinition {
    pub method: String,
    pub endpoint: Endpoint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<HttpOutputFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<bool>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct GrpcServiceDefinition {
    pub name: String,
    pub host: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication: Option<ReferenceableAuthenticationPolicy>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct GrpcCallDefinition {
    pub proto: ExternalResourceDefinition,
    pub service: GrpcServiceDefinition,
    pub method: String,
    #[serde(default, skip_serializing_if = "EquatableMap::is_empty")]
    pub arguments: EquatableMap<String, Value>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OpenApiCallDefinition {
    pub document: ExternalResourceDefinition,
    pub operation_id: String,
    #[serde(default, skip_serializing_if = "EquatableMap::is_empty")]
    pub parameters: EquatableMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication: Option<ReferenceableAuthenticationPolicy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<HttpOutputFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<bool>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AsyncApiCallDefinition {
    pub document: ExternalResourceDefinition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication: Option<ReferenceableAuthenticationPolicy>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::resource::EndpointExt;
    use serde_json::json;

    #[test]
    fn test_typed_http_view() {
        let call: CallTaskDefinition = serde_json::from_value(json!({
            "call": "http",
            "with": {
                "method": "get",
                "endpoint": {"uri": "https://petstore.swagger.io/v2/pet/{petId}"},
                "output": "response"
            }
        }))
        .unwrap();
        let http = call.as_http().unwrap().expect("http view");
        assert_eq!(http.method, "get");
        assert_eq!(http.endpoint.uri(), "https://petstore.swagger.io/v2/pet/{petId}");
        assert_eq!(http.output, Some(HttpOutputFormat::Response));
        assert!(call.as_grpc().unwrap().is_none());
        assert!(call.is_builtin());
    }

    #[test]
    fn test_typed_view_reports_bad_shape() {
        let call = CallTaskDefinition::new("http").with_argument("method", json!("get"));
        assert!(call.as_http().is_err());
    }

    #[test]
    fn test_openapi_from_typed() {
        let args = OpenApiCallDefinition {
            document: ExternalResourceDefinition::from_uri("https://petstore.swagger.io/v2/swagger.json"),
            operation_id: "findPetsByStatus".to_string(),
            parameters: [("status".to_string(), json!("available"))].into_iter().collect(),
            authentication: None,
            output: None,
            redirect: None,
        };
        let call = CallTaskDefinition::openapi(&args).unwrap();
        assert_eq!(call.call, "openapi");
        assert_eq!(call.with.get("operationId"), Some(&json!("findPetsByStatus")));
        assert_eq!(call.as_openapi().unwrap(), Some(args));
    }

    #[test]
    fn test_custom_function_call() {
        let call = CallTaskDefinition::new("greet").with_argument("name", json!("world"));
        assert!(!call.is_builtin());
        assert_eq!(
            serde_json::to_value(&call).unwrap(),
            json!({"call": "greet", "with": {"name": "world"}})
        );
    }
}

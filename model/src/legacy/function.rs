use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use swdsl_base::EquatableMap;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FunctionType {
    #[default]
    Rest,
    Asyncapi,
    Rpc,
    Graphql,
    Odata,
    Expression,
    Custom,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDefinition {
    pub name: String,
    pub operation: String,
    #[serde(rename = "type", default)]
    pub type_: FunctionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_ref: Option<String>,
    #[serde(default, skip_serializing_if = "EquatableMap::is_empty")]
    pub metadata: EquatableMap<String, String>,
}

impl FunctionDefinition {
    pub fn new(name: impl Into<String>, operation: impl Into<String>, type_: FunctionType) -> Self {
        Self {
            name: name.into(),
            operation: operation.into(),
            type_,
            auth_ref: None,
            metadata: EquatableMap::new(),
        }
    }
}

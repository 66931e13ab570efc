use super::resource::SchemaDefinition;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Input filtering; `from` is a runtime expression or an object template.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct InputDataModelDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Value>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct OutputDataModelDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaDefinition>,
    #[serde(rename = "as", default, skip_serializing_if = "Option::is_none")]
    pub as_: Option<Value>,
}

/// Context export after a task completes.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct ExportDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaDefinition>,
    #[serde(rename = "as", default, skip_serializing_if = "Option::is_none")]
    pub as_: Option<Value>,
}

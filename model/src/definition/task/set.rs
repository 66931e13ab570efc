use serde::{Deserialize, Serialize};
use serde_json::Value;
use swdsl_base::EquatableMap;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct SetTaskDefinition {
    pub set: EquatableMap<String, Value>,
}

use crate::definition::task::TaskDefinition;
use serde::{Deserialize, Serialize};
use swdsl_base::NamedMap;

fn default_each() -> String {
    "item".to_string()
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ForLoopDefinition {
    /// Variable holding the current item.
    #[serde(default = "default_each")]
    pub each: String,
    /// Runtime expression yielding the collection.
    #[serde(rename = "in")]
    pub in_: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at: Option<String>,
}

impl ForLoopDefinition {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            each: default_each(),
            in_: collection.into(),
            at: None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ForTaskDefinition {
    #[serde(rename = "for")]
    pub for_: ForLoopDefinition,
    #[serde(rename = "while", default, skip_serializing_if = "Option::is_none")]
    pub while_: Option<String>,
    #[serde(rename = "do")]
    pub do_: NamedMap<TaskDefinition>,
}

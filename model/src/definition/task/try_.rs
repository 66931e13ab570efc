use crate::definition::errors::ErrorCatcherDefinition;
use crate::definition::task::TaskDefinition;
use serde::{Deserialize, Serialize};
use swdsl_base::NamedMap;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TryTaskDefinition {
    #[serde(rename = "try")]
    pub try_: NamedMap<TaskDefinition>,
    pub catch: ErrorCatcherDefinition,
}

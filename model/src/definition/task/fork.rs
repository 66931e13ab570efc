use crate::definition::task::TaskDefinition;
use serde::{Deserialize, Serialize};
use swdsl_base::NamedMap;

fn is_false(value: &bool) -> bool {
    !value
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct BranchingDefinition {
    pub branches: NamedMap<TaskDefinition>,
    /// First branch to complete wins and cancels the others.
    #[serde(default, skip_serializing_if = "is_false")]
    pub compete: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct ForkTaskDefinition {
    pub fork: BranchingDefinition,
}

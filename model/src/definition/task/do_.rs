use crate::definition::task::TaskDefinition;
use serde::{Deserialize, Serialize};
use swdsl_base::NamedMap;

/// Runs its sub-tasks one after another.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct DoTaskDefinition {
    #[serde(rename = "do")]
    pub do_: NamedMap<TaskDefinition>,
}

impl DoTaskDefinition {
    pub fn new(tasks: NamedMap<TaskDefinition>) -> Self {
        Self { do_: tasks }
    }
}

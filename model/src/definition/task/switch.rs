use crate::definition::flow::FlowDirective;
use serde::{Deserialize, Serialize};
use swdsl_base::NamedMap;

/// A case without `when` is the default case.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SwitchCaseDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<String>,
    pub then: FlowDirective,
}

impl SwitchCaseDefinition {
    pub fn is_default(&self) -> bool {
        self.when.is_none()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct SwitchTaskDefinition {
    pub switch: NamedMap<SwitchCaseDefinition>,
}

impl SwitchTaskDefinition {
    pub fn default_case(&self) -> Option<(&String, &SwitchCaseDefinition)> {
        self.switch.iter().find(|(_, case)| case.is_default())
    }
}

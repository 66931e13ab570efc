use crate::definition::errors::ErrorDefinition;
use serde::{Deserialize, Serialize};
use swdsl_base::OneOf;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RaiseErrorDefinition {
    /// Inline error or the name of one declared under `use.errors`.
    pub error: OneOf<ErrorDefinition, String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RaiseTaskDefinition {
    pub raise: RaiseErrorDefinition,
}

impl RaiseTaskDefinition {
    pub fn error(error: ErrorDefinition) -> Self {
        Self {
            raise: RaiseErrorDefinition {
                error: OneOf::from_first(error),
            },
        }
    }

    pub fn reference(name: impl Into<String>) -> Self {
        Self {
            raise: RaiseErrorDefinition {
                error: OneOf::from_second(name.into()),
            },
        }
    }
}

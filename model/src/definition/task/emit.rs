use crate::definition::event::EventEmissionDefinition;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct EmitTaskDefinition {
    pub emit: EventEmissionDefinition,
}

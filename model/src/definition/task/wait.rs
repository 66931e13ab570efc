use crate::definition::duration::Duration;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct WaitTaskDefinition {
    pub wait: Duration,
}

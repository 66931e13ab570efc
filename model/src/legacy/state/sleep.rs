use crate::legacy::timeout::TimeoutsDefinition;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SleepStateDefinition {
    /// ISO 8601 duration.
    pub duration: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeouts: Option<TimeoutsDefinition>,
}

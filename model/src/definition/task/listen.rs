use crate::definition::event::{ListenerDefinition, SubscriptionIteratorDefinition};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ListenTaskDefinition {
    pub listen: ListenerDefinition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreach: Option<SubscriptionIteratorDefinition>,
}

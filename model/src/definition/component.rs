use super::authentication::AuthenticationPolicyDefinition;
use super::errors::ErrorDefinition;
use super::resource::Endpoint;
use super::retry::{RetryPolicyDefinition, TimeoutDefinition};
use super::task::TaskDefinition;
use serde::{Deserialize, Serialize};
use swdsl_base::{EquatableList, EquatableMap, NamedMap};

/// Reusable components declared under `use` and referenced by name.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct ComponentDefinitionCollection {
    #[serde(default, skip_serializing_if = "EquatableMap::is_empty")]
    pub authentications: EquatableMap<String, AuthenticationPolicyDefinition>,
    #[serde(default, skip_serializing_if = "EquatableMap::is_empty")]
    pub catalogs: EquatableMap<String, CatalogDefinition>,
    #[serde(default, skip_serializing_if = "EquatableMap::is_empty")]
    pub errors: EquatableMap<String, ErrorDefinition>,
    #[serde(default, skip_serializing_if = "NamedMap::is_empty")]
    pub extensions: NamedMap<ExtensionDefinition>,
    #[serde(default, skip_serializing_if = "EquatableMap::is_empty")]
    pub functions: EquatableMap<String, TaskDefinition>,
    #[serde(default, skip_serializing_if = "EquatableMap::is_empty")]
    pub retries: EquatableMap<String, RetryPolicyDefinition>,
    #[serde(default, skip_serializing_if = "EquatableList::is_empty")]
    pub secrets: EquatableList<String>,
    #[serde(default, skip_serializing_if = "EquatableMap::is_empty")]
    pub timeouts: EquatableMap<String, TimeoutDefinition>,
}

impl ComponentDefinitionCollection {
    pub fn is_empty(&self) -> bool {
        self.authentications.is_empty()
            && self.catalogs.is_empty()
            && self.errors.is_empty()
            && self.extensions.is_empty()
            && self.functions.is_empty()
            && self.retries.is_empty()
            && self.secrets.is_empty()
            && self.timeouts.is_empty()
    }
}

/// Remote collection of reusable functions.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CatalogDefinition {
    pub endpoint: Endpoint,
}

/// Tasks run before and/or after every task matching `extend`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ExtensionDefinition {
    /// Task type to extend, or `all`.
    pub extend: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<String>,
    #[serde(default, skip_serializing_if = "NamedMap::is_empty")]
    pub before: NamedMap<TaskDefinition>,
    #[serde(default, skip_serializing_if = "NamedMap::is_empty")]
    pub after: NamedMap<TaskDefinition>,
}

impl ExtensionDefinition {
    pub const EXTEND_ALL: &'static str = "all";

    pub fn applies_to(&self, task: &TaskDefinition) -> bool {
        self.extend == Self::EXTEND_ALL || self.extend == task.kind_name()
    }
}

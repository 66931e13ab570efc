use super::component::ComponentDefinitionCollection;
use super::data::{InputDataModelDefinition, OutputDataModelDefinition};
use super::duration::Duration;
use super::event::EventConsumptionStrategyDefinition;
use super::retry::TimeoutDefinition;
use super::task::TaskDefinition;
use super::validation::DefinitionValidator;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use swdsl_base::error::Result;
use swdsl_base::{DEFAULT_DSL_VERSION, DEFAULT_NAMESPACE, EquatableMap, NamedMap, OneOf};

fn default_dsl() -> String {
    DEFAULT_DSL_VERSION.to_string()
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

/// The `document` section.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct WorkflowDefinitionMetadata {
    #[serde(default = "default_dsl")]
    pub dsl: String,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "EquatableMap::is_empty")]
    pub tags: EquatableMap<String, String>,
    #[serde(default, skip_serializing_if = "EquatableMap::is_empty")]
    pub metadata: EquatableMap<String, Value>,
}

impl WorkflowDefinitionMetadata {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            dsl: default_dsl(),
            namespace: default_namespace(),
            name: name.into(),
            version: version.into(),
            title: None,
            summary: None,
            tags: EquatableMap::new(),
            metadata: EquatableMap::new(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct WorkflowScheduleDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub every: Option<Duration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cron: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<Duration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on: Option<EventConsumptionStrategyDefinition>,
}

/// Root of a workflow document.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct WorkflowDefinition {
    pub document: WorkflowDefinitionMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<InputDataModelDefinition>,
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub use_: Option<ComponentDefinitionCollection>,
    #[serde(rename = "do")]
    pub do_: NamedMap<TaskDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<OneOf<TimeoutDefinition, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputDataModelDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<WorkflowScheduleDefinition>,
    #[serde(flatten)]
    pub extension_data: EquatableMap<String, Value>,
}

impl WorkflowDefinition {
    pub fn new(document: WorkflowDefinitionMetadata, tasks: NamedMap<TaskDefinition>) -> Self {
        Self {
            document,
            input: None,
            use_: None,
            do_: tasks,
            timeout: None,
            output: None,
            schedule: None,
            extension_data: EquatableMap::new(),
        }
    }

    /// Top level task by name.
    pub fn task(&self, name: &str) -> Option<&TaskDefinition> {
        self.do_.get(name)
    }

    pub fn tasks(&self) -> &NamedMap<TaskDefinition> {
        &self.do_
    }

    /// Every task of the document, depth first, with its dotted path
    /// (`do.processOrder.try.charge`).
    pub fn walk(&self) -> Vec<(String, &TaskDefinition)> {
        let mut out = Vec::new();
        collect_tasks("do", &self.do_, &mut out);
        out
    }

    /// Checks the document; the first violation is returned.
    pub fn validate(&self) -> Result<()> {
        DefinitionValidator::new(self.use_.as_ref()).validate_workflow(self)
    }
}

fn collect_tasks<'a>(
    path: &str,
    tasks: &'a NamedMap<TaskDefinition>,
    out: &mut Vec<(String, &'a TaskDefinition)>,
) {
    for (name, task) in tasks.iter() {
        let task_path = format!("{path}.{name}");
        out.push((task_path.clone(), task));
        if let Some((key, children)) = task.nested() {
            collect_tasks(&format!("{task_path}.{key}"), children, out);
        }
    }
}

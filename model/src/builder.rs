// Fluent builders. Setters only record draft state; every check runs in
// `build()` and reports the first violation. The workflow level name, version
// and namespace setters are the exception: they reject bad formats at once.

/// Setters for the fields shared by every task kind. Expects a `fields:
/// TaskDefinitionFields` member on the builder.
macro_rules! task_definition_fields {
    () => {
        pub fn if_(mut self, condition: impl Into<String>) -> Self {
            self.fields.if_ = Some(condition.into());
            self
        }

        pub fn with_input(mut self, input: $crate::definition::InputDataModelDefinition) -> Self {
            self.fields.input = Some(input);
            self
        }

        pub fn with_output(
            mut self,
            output: $crate::definition::OutputDataModelDefinition,
        ) -> Self {
            self.fields.output = Some(output);
            self
        }

        pub fn with_export(mut self, export: $crate::definition::ExportDefinition) -> Self {
            self.fields.export = Some(export);
            self
        }

        pub fn with_timeout(mut self, timeout: $crate::definition::TimeoutDefinition) -> Self {
            self.fields.timeout = Some(swdsl_base::OneOf::from_first(timeout));
            self
        }

        /// Uses a timeout declared under `use.timeouts`.
        pub fn with_timeout_reference(mut self, name: impl Into<String>) -> Self {
            self.fields.timeout = Some(swdsl_base::OneOf::from_second(name.into()));
            self
        }

        pub fn then(mut self, directive: impl Into<$crate::definition::FlowDirective>) -> Self {
            self.fields.then = Some(directive.into());
            self
        }

        pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
            self.fields.metadata.insert(key.into(), value);
            self
        }
    };
}

/// Lets a kind builder be stored in a task list and built later.
macro_rules! impl_task_build {
    ($($builder:ty),+ $(,)?) => {
        $(
            impl $crate::builder::TaskDefinitionBuild for $builder {
                fn build_task(
                    self: Box<Self>,
                ) -> swdsl_base::error::Result<$crate::definition::TaskDefinition> {
                    (*self).build()
                }
            }
        )+
    };
}

pub mod authentication;
pub mod error;
pub mod event;
pub mod flow;
pub mod resource;
pub mod run;
pub mod task;
pub mod workflow;

pub use authentication::{
    AuthenticationPolicyDefinitionBuilder, BasicAuthenticationSchemeDefinitionBuilder,
    BearerAuthenticationSchemeDefinitionBuilder, OAuth2AuthenticationSchemeDefinitionBuilder,
};
pub use error::{
    ErrorCatcherDefinitionBuilder, ErrorDefinitionBuilder, RaiseTaskDefinitionBuilder,
    RetryPolicyDefinitionBuilder, TimeoutDefinitionBuilder,
};
pub use event::{
    EmitTaskDefinitionBuilder, EventDefinitionBuilder, EventFilterDefinitionBuilder,
    ListenTaskDefinitionBuilder, ListenerDefinitionBuilder,
};
pub use flow::{
    CompositeTaskDefinitionBuilder, DoTaskDefinitionBuilder, ForTaskDefinitionBuilder,
    ForkTaskDefinitionBuilder, SwitchCaseDefinitionBuilder, SwitchTaskDefinitionBuilder,
    TryTaskDefinitionBuilder,
};
pub use resource::{
    EndpointDefinitionBuilder, ExternalResourceDefinitionBuilder, SchemaDefinitionBuilder,
};
pub use run::{
    ContainerProcessDefinitionBuilder, RunTaskDefinitionBuilder, ScriptProcessDefinitionBuilder,
    ShellProcessDefinitionBuilder, WorkflowProcessDefinitionBuilder,
};
pub use task::{
    CallTaskDefinitionBuilder, SetTaskDefinitionBuilder, TaskDefinitionBuilder,
    TaskDefinitionMapBuilder, WaitTaskDefinitionBuilder,
};
pub use workflow::{ComponentDefinitionCollectionBuilder, WorkflowDefinitionBuilder};

use crate::definition::{TaskDefinition, WorkflowDefinition};
use swdsl_base::error::Result;

/// A pending task: a kind builder, or an already built definition.
pub trait TaskDefinitionBuild {
    fn build_task(self: Box<Self>) -> Result<TaskDefinition>;
}

impl TaskDefinitionBuild for TaskDefinition {
    fn build_task(self: Box<Self>) -> Result<TaskDefinition> {
        Ok(*self)
    }
}

impl WorkflowDefinition {
    pub fn builder() -> WorkflowDefinitionBuilder {
        WorkflowDefinitionBuilder::new()
    }
}

impl TaskDefinition {
    pub fn builder() -> TaskDefinitionBuilder {
        TaskDefinitionBuilder
    }
}

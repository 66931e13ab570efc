// Object model of the current (task based) DSL.

pub mod authentication;
pub mod component;
pub mod data;
pub mod duration;
pub mod errors;
pub mod event;
pub mod flow;
pub mod resource;
pub mod retry;
pub mod task;
pub mod validation;
pub mod workflow;

pub use authentication::{
    AuthenticationPolicyDefinition, AuthenticationScheme, ReferenceableAuthenticationPolicy,
};
pub use component::{CatalogDefinition, ComponentDefinitionCollection, ExtensionDefinition};
pub use data::{ExportDefinition, InputDataModelDefinition, OutputDataModelDefinition};
pub use duration::Duration;
pub use errors::{ErrorCatcherDefinition, ErrorDefinition, ErrorFilterDefinition, ErrorType};
pub use event::{
    EventConsumptionStrategyDefinition, EventDefinition, EventFilterDefinition, ListenerDefinition,
};
pub use flow::FlowDirective;
pub use resource::{EndpointDefinition, EndpointExt, ExternalResourceDefinition, SchemaDefinition};
pub use retry::{RetryPolicyDefinition, TimeoutDefinition};
pub use task::{ExecutionMode, TaskDefinition, TaskDefinitionFields, TaskKind, TaskType};
pub use workflow::{WorkflowDefinition, WorkflowDefinitionMetadata, WorkflowScheduleDefinition};

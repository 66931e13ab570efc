pub mod builder;
pub mod definition;
pub mod legacy;

pub use definition::{
    TaskDefinition, TaskKind, TaskType, WorkflowDefinition, WorkflowDefinitionMetadata,
};
pub use swdsl_base::{DefinitionError, EquatableList, EquatableMap, NamedMap, OneOf};

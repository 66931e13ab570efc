// State-based workflow model of the earlier DSL generation. Kept for
// reading and writing existing documents; it shares the base collections
// and error type with the task model.

pub mod action;
pub mod auth;
pub mod builder;
pub mod event;
pub mod filter;
pub mod function;
pub mod retry;
pub mod start;
pub mod state;
pub mod timeout;
pub mod transition;
pub mod workflow;

pub use action::{ActionDefinition, ActionType};
pub use auth::{AuthenticationDefinition, AuthenticationScheme};
pub use builder::{LegacyWorkflowDefinitionBuilder, StateDefinitionBuilder};
pub use event::{EventDefinition, EventKind};
pub use function::{FunctionDefinition, FunctionType};
pub use retry::{ErrorDefinition, RetryDefinition};
pub use state::{
    ExtensionStateDefinition, StateDefinition, StateDefinitionFields, StateKind, StateType,
    SwitchCaseDefinition, SwitchStateDefinition, SwitchType,
};
pub use workflow::LegacyWorkflowDefinition;

use super::event::EventDefinition;
use super::function::FunctionDefinition;
use super::retry::RetryDefinition;
use super::state::{StateDefinition, StateKind};
use super::transition::{EndDefinition, ErrorHandlerDefinition};
use super::workflow::LegacyWorkflowDefinition;
use serde_json::Value;
use swdsl_base::error::{DefinitionError, Result};
use swdsl_base::{EquatableList, OneOf};

#[derive(Debug, Clone)]
pub struct StateDefinitionBuilder {
    state: StateDefinition,
}

impl StateDefinitionBuilder {
    pub fn new(name: impl Into<String>, kind: impl Into<StateKind>) -> Self {
        Self {
            state: StateDefinition::new(name, kind),
        }
    }

    pub fn transition(mut self, next_state: impl Into<String>) -> Self {
        self.state.fields.transition = Some(OneOf::from_second(next_state.into()));
        self
    }

    pub fn end(mut self) -> Self {
        self.state.fields.end = Some(OneOf::from_second(true));
        self
    }

    pub fn terminate(mut self) -> Self {
        self.state.fields.end = Some(OneOf::from_first(EndDefinition {
            terminate: true,
            ..Default::default()
        }));
        self
    }

    pub fn on_error(mut self, error_ref: impl Into<String>, next_state: impl Into<String>) -> Self {
        self.state.fields.on_errors.push(ErrorHandlerDefinition {
            error_ref: Some(error_ref.into()),
            transition: Some(OneOf::from_second(next_state.into())),
            ..Default::default()
        });
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.state.fields.metadata.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> Result<StateDefinition> {
        if self.state.name().trim().is_empty() {
            return Err(DefinitionError::missing("StateDefinition", "name"));
        }
        if self.state.fields.transition.is_some() && self.state.fields.end.is_some() {
            return Err(DefinitionError::mutually_exclusive(
                "StateDefinition",
                &["transition", "end"],
            ));
        }
        Ok(self.state)
    }
}

/// Assembles a legacy workflow from already built parts and checks the
/// state graph on `build`.
#[derive(Debug, Clone)]
pub struct LegacyWorkflowDefinitionBuilder {
    workflow: LegacyWorkflowDefinition,
    states: Vec<StateDefinitionBuilder>,
}

impl LegacyWorkflowDefinitionBuilder {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let mut workflow = LegacyWorkflowDefinition::new(name);
        workflow.id = Some(id.into());
        Self {
            workflow,
            states: Vec::new(),
        }
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.workflow.version = Some(version.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.workflow.description = Some(description.into());
        self
    }

    pub fn start(mut self, state_name: impl Into<String>) -> Self {
        self.workflow.start = Some(OneOf::from_second(state_name.into()));
        self
    }

    pub fn keep_active(mut self, keep_active: bool) -> Self {
        self.workflow.keep_active = keep_active;
        self
    }

    pub fn constant(mut self, name: impl Into<String>, value: Value) -> Self {
        let constants = self
            .workflow
            .constants
            .get_or_insert_with(|| OneOf::from_first(Default::default()));
        if let Some(map) = constants.first_mut() {
            map.insert(name.into(), value);
        }
        self
    }

    pub fn function(mut self, function: FunctionDefinition) -> Self {
        push_inline(&mut self.workflow.functions, function);
        self
    }

    pub fn event(mut self, event: EventDefinition) -> Self {
        push_inline(&mut self.workflow.events, event);
        self
    }

    pub fn retry(mut self, retry: RetryDefinition) -> Self {
        push_inline(&mut self.workflow.retries, retry);
        self
    }

    pub fn state(
        mut self,
        name: impl Into<String>,
        kind: impl Into<StateKind>,
        configure: impl FnOnce(StateDefinitionBuilder) -> StateDefinitionBuilder,
    ) -> Self {
        self.states
            .push(configure(StateDefinitionBuilder::new(name, kind)));
        self
    }

    pub fn build(self) -> Result<LegacyWorkflowDefinition> {
        let mut workflow = self.workflow;
        for (index, state) in self.states.into_iter().enumerate() {
            workflow
                .states
                .push(state.build().map_err(|e| e.within(&format!("states[{index}]")))?);
        }
        workflow.validate()?;
        Ok(workflow)
    }
}

/// Appends to an inline collection, replacing a URI reference if one was set.
fn push_inline<T>(collection: &mut Option<OneOf<EquatableList<T>, String>>, item: T) {
    if !collection.as_ref().is_some_and(OneOf::is_first) {
        *collection = Some(OneOf::from_first(EquatableList::new()));
    }
    if let Some(items) = collection.as_mut().and_then(OneOf::first_mut) {
        items.push(item);
    }
}

use super::action::ActionDefinition;
use super::auth::AuthenticationDefinition;
use super::event::EventDefinition;
use super::function::FunctionDefinition;
use super::retry::{ConstantsDefinition, ErrorDefinition, RetryDefinition};
use super::start::{DataInputSchemaDefinition, Start, start_state};
use super::state::{StateDefinition, StateKind};
use super::timeout::TimeoutsDefinition;
use super::transition::{Transition, next_state};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use swdsl_base::error::{DefinitionError, Result};
use swdsl_base::{EquatableList, EquatableMap, OneOf};

pub static DEFAULT_SPEC_VERSION: &str = "0.8";
pub static DEFAULT_EXPRESSION_LANG: &str = "jq";

fn default_spec_version() -> String {
    DEFAULT_SPEC_VERSION.to_string()
}

fn default_expression_lang() -> String {
    DEFAULT_EXPRESSION_LANG.to_string()
}

fn is_false(value: &bool) -> bool {
    !value
}

/// A collection given inline or as the URI of a document holding it.
pub type Referenceable<T> = OneOf<T, String>;

/// State-machine workflow document with an explicit `type` on every state.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LegacyWorkflowDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default = "default_spec_version")]
    pub spec_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<Start>,
    #[serde(default = "default_expression_lang")]
    pub expression_lang: String,
    #[serde(default, skip_serializing_if = "EquatableList::is_empty")]
    pub annotations: EquatableList<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_input_schema: Option<Referenceable<DataInputSchemaDefinition>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secrets: Option<Referenceable<EquatableList<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constants: Option<Referenceable<ConstantsDefinition>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeouts: Option<Referenceable<TimeoutsDefinition>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Referenceable<EquatableList<ErrorDefinition>>>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub keep_active: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub auto_retries: bool,
    #[serde(default, skip_serializing_if = "EquatableMap::is_empty")]
    pub metadata: EquatableMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<Referenceable<EquatableList<EventDefinition>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub functions: Option<Referenceable<EquatableList<FunctionDefinition>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retries: Option<Referenceable<EquatableList<RetryDefinition>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<Referenceable<EquatableList<AuthenticationDefinition>>>,
    #[serde(default)]
    pub states: EquatableList<StateDefinition>,
    #[serde(flatten)]
    pub extension_data: EquatableMap<String, Value>,
}

impl LegacyWorkflowDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            key: None,
            name: name.into(),
            description: None,
            version: None,
            spec_version: default_spec_version(),
            start: None,
            expression_lang: default_expression_lang(),
            annotations: EquatableList::new(),
            data_input_schema: None,
            secrets: None,
            constants: None,
            timeouts: None,
            errors: None,
            keep_active: false,
            auto_retries: false,
            metadata: EquatableMap::new(),
            events: None,
            functions: None,
            retries: None,
            auth: None,
            states: EquatableList::new(),
            extension_data: EquatableMap::new(),
        }
    }

    pub fn state(&self, name: &str) -> Option<&StateDefinition> {
        self.states.iter().find(|s| s.name() == name)
    }

    /// The declared start state, or the first state when `start` is omitted.
    pub fn start_state_name(&self) -> Option<&str> {
        match &self.start {
            Some(start) => Some(start_state(start)),
            None => self.states.first().map(StateDefinition::name),
        }
    }

    /// Inline function declarations; `None` while they are only referenced
    /// by URI.
    pub fn inline_functions(&self) -> Option<&EquatableList<FunctionDefinition>> {
        self.functions.as_ref().and_then(OneOf::first)
    }

    pub fn inline_events(&self) -> Option<&EquatableList<EventDefinition>> {
        self.events.as_ref().and_then(OneOf::first)
    }

    /// Checks the state graph: names are unique, `start` and every
    /// transition target exist, no state both transitions and ends, and
    /// actions call declared functions when those are inline.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(DefinitionError::missing("LegacyWorkflowDefinition", "name"));
        }
        if self.states.is_empty() {
            return Err(DefinitionError::cardinality("states", 1, 0));
        }
        if let Some(name) = self.states.iter().map(StateDefinition::name).duplicates().next() {
            return Err(DefinitionError::invalid_format(
                format!("states.{name}"),
                name,
                "duplicate state name",
            ));
        }
        if let Some(start) = self.start.as_ref().map(start_state) {
            if self.state(start).is_none() {
                return Err(DefinitionError::invalid_format("start", start, "unknown state"));
            }
        }
        for state in self.states.iter() {
            let path = format!("states.{}", state.name());
            self.validate_state(state).map_err(|e| e.within(&path))?;
        }
        Ok(())
    }

    fn validate_state(&self, state: &StateDefinition) -> Result<()> {
        if state.fields.transition.is_some() && state.fields.end.is_some() {
            return Err(DefinitionError::mutually_exclusive(
                state.name(),
                &["transition", "end"],
            ));
        }
        self.check_target("transition", state.fields.transition.as_ref())?;
        for handler in state.fields.on_errors.iter() {
            self.check_target("onErrors.transition", handler.transition.as_ref())?;
        }
        if let Some(compensation) = &state.fields.compensated_by {
            if self.state(compensation).is_none() {
                return Err(DefinitionError::invalid_format(
                    "compensatedBy",
                    compensation.as_str(),
                    "unknown state",
                ));
            }
        }
        if let StateKind::Switch(switch) = &state.kind {
            switch.validate("switch").map_err(|e| match e {
                DefinitionError::MutuallyExclusive { fields, .. } => {
                    DefinitionError::MutuallyExclusive {
                        definition: state.name().to_string(),
                        fields,
                    }
                }
                DefinitionError::Cardinality { min, actual, .. } => {
                    DefinitionError::cardinality("dataConditions", min, actual)
                }
                other => other,
            })?;
            for case in switch.cases() {
                self.check_target("conditions.transition", case.transition())?;
            }
            if let Some(default) = &switch.default_condition {
                self.check_target("defaultCondition.transition", default.transition.as_ref())?;
            }
        }
        if let Some(functions) = self.inline_functions() {
            for action in state_actions(&state.kind) {
                let Some(function) = action.function_name() else {
                    continue;
                };
                if !functions.iter().any(|f| f.name == function) {
                    return Err(DefinitionError::invalid_format(
                        "actions.functionRef",
                        function,
                        "unknown function",
                    ));
                }
            }
        }
        Ok(())
    }

    fn check_target(&self, field: &str, transition: Option<&Transition>) -> Result<()> {
        match transition.map(next_state) {
            Some(target) if self.state(target).is_none() => Err(
                DefinitionError::invalid_format(field, target, "unknown state"),
            ),
            _ => Ok(()),
        }
    }
}

/// Every action a state performs, in declaration order.
pub fn state_actions(kind: &StateKind) -> Vec<&ActionDefinition> {
    match kind {
        StateKind::Callback(s) => vec![&s.action],
        StateKind::Event(s) => s.on_events.iter().flat_map(|e| e.actions.iter()).collect(),
        StateKind::ForEach(s) => s.actions.iter().collect(),
        StateKind::Operation(s) => s.actions.iter().collect(),
        StateKind::Parallel(s) => s.branches.iter().flat_map(|b| b.actions.iter()).collect(),
        StateKind::Sleep(_) | StateKind::Inject(_) | StateKind::Switch(_) => Vec::new(),
        StateKind::Extension(_) => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::legacy::state::StateType;
    use serde_json::json;

    fn greeting() -> LegacyWorkflowDefinition {
        serde_json::from_value(json!({
            "id": "greeting",
            "name": "Greeting Workflow",
            "version": "1.0",
            "specVersion": "0.8",
            "start": "Greet",
            "functions": [
                {"name": "greetingFunction", "operation": "file://myapis/greetingapis.json#greeting"}
            ],
            "states": [{
                "name": "Greet",
                "type": "operation",
                "actions": [{
                    "functionRef": {"refName": "greetingFunction", "arguments": {"name": "${ .person.name }"}},
                    "actionDataFilter": {"results": "${ {greeting: .greeting} }"}
                }],
                "end": true
            }]
        }))
        .unwrap()
    }

    #[test]
    fn test_greeting_reads_and_validates() {
        let workflow = greeting();
        assert_eq!(workflow.expression_lang, "jq");
        assert_eq!(workflow.start_state_name(), Some("Greet"));
        assert_eq!(
            workflow.state("Greet").and_then(StateDefinition::state_type),
            Some(StateType::Operation)
        );
        assert!(workflow.validate().is_ok());
    }

    #[test]
    fn test_uri_collections_and_extension_keys() {
        let workflow: LegacyWorkflowDefinition = serde_json::from_value(json!({
            "id": "remote",
            "name": "Remote",
            "functions": "file://functions.json",
            "events": "https://example.com/events.yaml",
            "x-team": "payments",
            "states": [{"name": "Only", "type": "inject", "data": {}, "end": true}]
        }))
        .unwrap();
        assert_eq!(
            workflow.functions.as_ref().and_then(|f| f.second()).map(String::as_str),
            Some("file://functions.json")
        );
        assert!(workflow.inline_functions().is_none());
        assert_eq!(workflow.extension_data.get("x-team"), Some(&json!("payments")));
        assert_eq!(workflow.start_state_name(), Some("Only"));
        assert!(workflow.validate().is_ok());
    }

    #[test]
    fn test_validate_graph() {
        let mut workflow = greeting();
        workflow.start = Some(OneOf::from_second("Missing".to_string()));
        assert!(matches!(
            workflow.validate(),
            Err(DefinitionError::InvalidFormat { field, .. }) if field == "start"
        ));

        let mut workflow = greeting();
        workflow.states[0].fields.transition = Some(OneOf::from_second("Nowhere".to_string()));
        assert!(matches!(
            workflow.validate(),
            Err(DefinitionError::MutuallyExclusive { .. })
        ));
        workflow.states[0].fields.end = None;
        assert!(matches!(
            workflow.validate(),
            Err(DefinitionError::InvalidFormat { field, value, .. })
                if field == "states.Greet.transition" && value == "Nowhere"
        ));

        let mut workflow = greeting();
        let copy = workflow.states[0].clone();
        workflow.states.push(copy);
        assert!(matches!(
            workflow.validate(),
            Err(DefinitionError::InvalidFormat { reason, .. }) if reason == "duplicate state name"
        ));

        let empty = LegacyWorkflowDefinition::new("empty");
        assert_eq!(empty.validate(), Err(DefinitionError::cardinality("states", 1, 0)));
    }

    #[test]
    fn test_unknown_function_reference() {
        let mut workflow = greeting();
        if let StateKind::Operation(op) = &mut workflow.states[0].kind {
            op.actions.push(ActionDefinition::call("missingFunction"));
        }
        assert!(matches!(
            workflow.validate(),
            Err(DefinitionError::InvalidFormat { field, value, .. })
                if field == "states.Greet.actions.functionRef" && value == "missingFunction"
        ));
    }
}

// Task definitions. The variant of a task is not tagged on the wire: it is
// selected by which kind key (`call`, `do`, `for`, ...) the object carries.

pub mod call;
pub mod do_;
pub mod emit;
pub mod for_;
pub mod fork;
pub mod listen;
pub mod raise;
pub mod run;
pub mod set;
pub mod switch;
pub mod try_;
pub mod wait;

use super::data::{ExportDefinition, InputDataModelDefinition, OutputDataModelDefinition};
use super::flow::FlowDirective;
use super::retry::TimeoutDefinition;
use serde::de::{DeserializeOwned, Error as _};
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use strum_macros::{Display, EnumString};
use swdsl_base::error::{DefinitionError, Result};
use swdsl_base::object::{Object, from_object, into_object, merge, take_keys, to_object};
use swdsl_base::{EquatableMap, NamedMap, OneOf};

pub use call::CallTaskDefinition;
pub use do_::DoTaskDefinition;
pub use emit::EmitTaskDefinition;
pub use for_::{ForLoopDefinition, ForTaskDefinition};
pub use fork::{BranchingDefinition, ForkTaskDefinition};
pub use listen::ListenTaskDefinition;
pub use raise::{RaiseErrorDefinition, RaiseTaskDefinition};
pub use run::{ProcessDefinition, ProcessTypeDefinition, RunTaskDefinition};
pub use set::SetTaskDefinition;
pub use switch::{SwitchCaseDefinition, SwitchTaskDefinition};
pub use try_::TryTaskDefinition;
pub use wait::WaitTaskDefinition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum TaskType {
    Call,
    Do,
    Emit,
    For,
    Fork,
    Listen,
    Raise,
    Run,
    Set,
    Switch,
    Try,
    Wait,
}

impl TaskType {
    pub const ALL: [TaskType; 12] = [
        TaskType::Call,
        TaskType::Do,
        TaskType::Emit,
        TaskType::For,
        TaskType::Fork,
        TaskType::Listen,
        TaskType::Raise,
        TaskType::Run,
        TaskType::Set,
        TaskType::Switch,
        TaskType::Try,
        TaskType::Wait,
    ];

    /// Wire key that selects this kind.
    pub fn key(self) -> &'static str {
        match self {
            TaskType::Call => "call",
            TaskType::Do => "do",
            TaskType::Emit => "emit",
            TaskType::For => "for",
            TaskType::Fork => "fork",
            TaskType::Listen => "listen",
            TaskType::Raise => "raise",
            TaskType::Run => "run",
            TaskType::Set => "set",
            TaskType::Switch => "switch",
            TaskType::Try => "try",
            TaskType::Wait => "wait",
        }
    }

    /// Every wire key owned by the kind payload, kind key first.
    pub fn owned_keys(self) -> &'static [&'static str] {
        match self {
            TaskType::Call => CallTaskDefinition::KEYS,
            TaskType::Do => DoTaskDefinition::KEYS,
            TaskType::Emit => EmitTaskDefinition::KEYS,
            TaskType::For => ForTaskDefinition::KEYS,
            TaskType::Fork => ForkTaskDefinition::KEYS,
            TaskType::Listen => ListenTaskDefinition::KEYS,
            TaskType::Raise => RaiseTaskDefinition::KEYS,
            TaskType::Run => RunTaskDefinition::KEYS,
            TaskType::Set => SetTaskDefinition::KEYS,
            TaskType::Switch => SwitchTaskDefinition::KEYS,
            TaskType::Try => TryTaskDefinition::KEYS,
            TaskType::Wait => WaitTaskDefinition::KEYS,
        }
    }

    fn parse(self, object: Object) -> Result<(TaskKind, Object)> {
        match self {
            TaskType::Call => parse_kind::<CallTaskDefinition>(object),
            TaskType::Do => parse_kind::<DoTaskDefinition>(object),
            TaskType::Emit => parse_kind::<EmitTaskDefinition>(object),
            TaskType::For => parse_kind::<ForTaskDefinition>(object),
            TaskType::Fork => parse_kind::<ForkTaskDefinition>(object),
            TaskType::Listen => parse_kind::<ListenTaskDefinition>(object),
            TaskType::Raise => parse_kind::<RaiseTaskDefinition>(object),
            TaskType::Run => parse_kind::<RunTaskDefinition>(object),
            TaskType::Set => parse_kind::<SetTaskDefinition>(object),
            TaskType::Switch => parse_kind::<SwitchTaskDefinition>(object),
            TaskType::Try => parse_kind::<TryTaskDefinition>(object),
            TaskType::Wait => parse_kind::<WaitTaskDefinition>(object),
        }
    }
}

/// Payload of one task kind together with the wire keys it owns.
pub trait TaskVariant: Serialize + DeserializeOwned + Into<TaskKind> {
    const TYPE: TaskType;
    const KEYS: &'static [&'static str];
}

fn parse_kind<T: TaskVariant>(object: Object) -> Result<(TaskKind, Object)> {
    let (owned, rest) = take_keys(object, T::KEYS);
    let variant: T = from_object(owned)?;
    Ok((variant.into(), rest))
}

/// Task of a kind this model does not know, kept verbatim.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtensionTaskDefinition {
    pub kind: String,
    pub definition: Value,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TaskKind {
    Call(CallTaskDefinition),
    Do(DoTaskDefinition),
    Emit(EmitTaskDefinition),
    For(ForTaskDefinition),
    Fork(ForkTaskDefinition),
    Listen(ListenTaskDefinition),
    Raise(RaiseTaskDefinition),
    Run(RunTaskDefinition),
    Set(SetTaskDefinition),
    Switch(SwitchTaskDefinition),
    Try(TryTaskDefinition),
    Wait(WaitTaskDefinition),
    Extension(ExtensionTaskDefinition),
}

macro_rules! task_variant {
    ($payload:ty, $variant:ident, [$($key:literal),+]) => {
        impl TaskVariant for $payload {
            const TYPE: TaskType = TaskType::$variant;
            const KEYS: &'static [&'static str] = &[$($key),+];
        }

        impl From<$payload> for TaskKind {
            fn from(value: $payload) -> Self {
                TaskKind::$variant(value)
            }
        }
    };
}

task_variant!(CallTaskDefinition, Call, ["call", "with", "await"]);
task_variant!(DoTaskDefinition, Do, ["do"]);
task_variant!(EmitTaskDefinition, Emit, ["emit"]);
task_variant!(ForTaskDefinition, For, ["for", "while", "do"]);
task_variant!(ForkTaskDefinition, Fork, ["fork"]);
task_variant!(ListenTaskDefinition, Listen, ["listen", "foreach"]);
task_variant!(RaiseTaskDefinition, Raise, ["raise"]);
task_variant!(RunTaskDefinition, Run, ["run"]);
task_variant!(SetTaskDefinition, Set, ["set"]);
task_variant!(SwitchTaskDefinition, Switch, ["switch"]);
task_variant!(TryTaskDefinition, Try, ["try", "catch"]);
task_variant!(WaitTaskDefinition, Wait, ["wait"]);

impl TaskKind {
    pub fn task_type(&self) -> Option<TaskType> {
        match self {
            TaskKind::Call(_) => Some(TaskType::Call),
            TaskKind::Do(_) => Some(TaskType::Do),
            TaskKind::Emit(_) => Some(TaskType::Emit),
            TaskKind::For(_) => Some(TaskType::For),
            TaskKind::Fork(_) => Some(TaskType::Fork),
            TaskKind::Listen(_) => Some(TaskType::Listen),
            TaskKind::Raise(_) => Some(TaskType::Raise),
            TaskKind::Run(_) => Some(TaskType::Run),
            TaskKind::Set(_) => Some(TaskType::Set),
            TaskKind::Switch(_) => Some(TaskType::Switch),
            TaskKind::Try(_) => Some(TaskType::Try),
            TaskKind::Wait(_) => Some(TaskType::Wait),
            TaskKind::Extension(_) => None,
        }
    }

    fn to_object(&self) -> Result<Object> {
        match self {
            TaskKind::Call(t) => to_object(t, "CallTaskDefinition"),
            TaskKind::Do(t) => to_object(t, "DoTaskDefinition"),
            TaskKind::Emit(t) => to_object(t, "EmitTaskDefinition"),
            TaskKind::For(t) => to_object(t, "ForTaskDefinition"),
            TaskKind::Fork(t) => to_object(t, "ForkTaskDefinition"),
            TaskKind::Listen(t) => to_object(t, "ListenTaskDefinition"),
            TaskKind::Raise(t) => to_object(t, "RaiseTaskDefinition"),
            TaskKind::Run(t) => to_object(t, "RunTaskDefinition"),
            TaskKind::Set(t) => to_object(t, "SetTaskDefinition"),
            TaskKind::Switch(t) => to_object(t, "SwitchTaskDefinition"),
            TaskKind::Try(t) => to_object(t, "TryTaskDefinition"),
            TaskKind::Wait(t) => to_object(t, "WaitTaskDefinition"),
            TaskKind::Extension(ext) => {
                let mut object = Object::new();
                object.insert(ext.kind.clone(), ext.definition.clone());
                Ok(object)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ExecutionMode {
    Sequential,
    Concurrent,
}

/// Fields every task may carry regardless of its kind.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct TaskDefinitionFields {
    #[serde(rename = "if", default, skip_serializing_if = "Option::is_none")]
    pub if_: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<InputDataModelDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputDataModelDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export: Option<ExportDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<OneOf<TimeoutDefinition, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub then: Option<FlowDirective>,
    #[serde(default, skip_serializing_if = "EquatableMap::is_empty")]
    pub metadata: EquatableMap<String, Value>,
}

impl TaskDefinitionFields {
    pub const KEYS: [&'static str; 7] = [
        "if", "input", "output", "export", "timeout", "then", "metadata",
    ];
}

#[derive(Clone, Debug, PartialEq)]
pub struct TaskDefinition {
    pub fields: TaskDefinitionFields,
    pub kind: TaskKind,
    /// Keys that belong neither to the common fields nor to the kind.
    pub extension_data: EquatableMap<String, Value>,
}

impl TaskDefinition {
    pub fn new(kind: impl Into<TaskKind>) -> Self {
        Self {
            fields: TaskDefinitionFields::default(),
            kind: kind.into(),
            extension_data: EquatableMap::new(),
        }
    }

    pub fn with_fields(mut self, fields: TaskDefinitionFields) -> Self {
        self.fields = fields;
        self
    }

    /// `call`, `do`, ... or the key of an extension task.
    pub fn kind_name(&self) -> &str {
        match &self.kind {
            TaskKind::Extension(ext) => ext.kind.as_str(),
            other => other.task_type().map(TaskType::key).unwrap_or_default(),
        }
    }

    pub fn task_type(&self) -> Option<TaskType> {
        self.kind.task_type()
    }

    pub fn execution_mode(&self) -> Option<ExecutionMode> {
        match self.kind {
            TaskKind::Do(_) => Some(ExecutionMode::Sequential),
            TaskKind::Fork(_) => Some(ExecutionMode::Concurrent),
            _ => None,
        }
    }

    pub fn is_composite(&self) -> bool {
        self.subtasks().is_some()
    }

    /// Directly nested tasks: `do`, `for.do`, `fork.branches` or `try`.
    pub fn subtasks(&self) -> Option<&NamedMap<TaskDefinition>> {
        self.nested().map(|(_, tasks)| tasks)
    }

    /// Nested tasks together with the wire path they live under.
    pub fn nested(&self) -> Option<(&'static str, &NamedMap<TaskDefinition>)> {
        match &self.kind {
            TaskKind::Do(t) => Some(("do", &t.do_)),
            TaskKind::For(t) => Some(("do", &t.do_)),
            TaskKind::Fork(t) => Some(("fork.branches", &t.fork.branches)),
            TaskKind::Try(t) => Some(("try", &t.try_)),
            _ => None,
        }
    }

    /// Converts a buffered wire node into a task.
    ///
    /// Exactly one kind key selects the variant (`do` only counts when `for`
    /// is absent, since it is part of the `for` shape). Without any kind key a
    /// single remaining non-common key is read as an extension task.
    pub fn from_value(node: Value) -> Result<Self> {
        let object = into_object(node, "TaskDefinition")?;
        let task_type = discriminate(&object)?;
        let (common, rest) = take_keys(object, &TaskDefinitionFields::KEYS);
        let fields: TaskDefinitionFields = from_object(common)?;
        let (kind, extra) = match task_type {
            Some(task_type) => task_type.parse(rest)?,
            None => (extension_kind(rest)?, Object::new()),
        };
        Ok(Self {
            fields,
            kind,
            extension_data: extra.into_iter().collect(),
        })
    }

    /// Kind keys first, then common fields, then preserved extension keys.
    pub fn to_object(&self) -> Result<Object> {
        let mut object = self.kind.to_object()?;
        merge(&mut object, to_object(&self.fields, "TaskDefinitionFields")?);
        for (key, value) in self.extension_data.iter() {
            object.insert(key.clone(), value.clone());
        }
        Ok(object)
    }
}

/// Picks the task kind from the kind keys present in `object`.
pub fn discriminate(object: &Object) -> Result<Option<TaskType>> {
    let mut present: Vec<TaskType> = TaskType::ALL
        .into_iter()
        .filter(|t| object.contains_key(t.key()))
        .collect();
    if present.contains(&TaskType::For) {
        present.retain(|t| *t != TaskType::Do);
    }
    match present.as_slice() {
        [] => Ok(None),
        [one] => Ok(Some(*one)),
        many => Err(DefinitionError::ambiguous_kind(
            "task",
            many.iter().map(|t| t.key().to_string()).collect(),
        )),
    }
}

fn extension_kind(rest: Object) -> Result<TaskKind> {
    if rest.len() != 1 {
        return Err(DefinitionError::ambiguous_kind(
            "task",
            rest.keys().cloned().collect(),
        ));
    }
    match rest.into_iter().next() {
        Some((kind, definition)) => {
            tracing::debug!("reading unknown task kind '{}' as extension", kind);
            Ok(TaskKind::Extension(ExtensionTaskDefinition { kind, definition }))
        }
        None => Err(DefinitionError::ambiguous_kind("task", Vec::new())),
    }
}

impl Serialize for TaskDefinition {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_object()
            .map_err(S::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TaskDefinition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let node = Value::deserialize(deserializer)?;
        Self::from_value(node).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_discriminate_by_key() {
        let task = TaskDefinition::from_value(json!({
            "call": "http",
            "with": {"method": "get", "endpoint": "https://example.com"},
            "if": "${ .enabled }",
            "then": "end"
        }))
        .unwrap();
        assert_eq!(task.task_type(), Some(TaskType::Call));
        assert_eq!(task.kind_name(), "call");
        assert_eq!(task.fields.if_.as_deref(), Some("${ .enabled }"));
        assert_eq!(task.fields.then, Some(FlowDirective::End));
        assert!(task.extension_data.is_empty());
    }

    #[test]
    fn test_for_owns_do_key() {
        let task = TaskDefinition::from_value(json!({
            "for": {"each": "pet", "in": ".pets"},
            "do": [{"feed": {"set": {"fed": true}}}]
        }))
        .unwrap();
        assert_eq!(task.task_type(), Some(TaskType::For));
        assert!(task.is_composite());
        assert_eq!(task.subtasks().map(NamedMap::len), Some(1));
    }

    #[test]
    fn test_two_kind_keys_are_ambiguous() {
        let err = TaskDefinition::from_value(json!({
            "call": "greet",
            "set": {"a": 1}
        }))
        .unwrap_err();
        assert_eq!(
            err,
            DefinitionError::AmbiguousKind {
                family: "task".to_string(),
                keys: vec!["call".to_string(), "set".to_string()],
            }
        );
    }

    #[test]
    fn test_unknown_kind_becomes_extension() {
        let task = TaskDefinition::from_value(json!({
            "sendMail": {"to": "ops@example.com"},
            "then": "exit"
        }))
        .unwrap();
        assert_eq!(task.kind_name(), "sendMail");
        assert_eq!(task.task_type(), None);
        assert_eq!(
            serde_json::to_value(&task).unwrap(),
            json!({"sendMail": {"to": "ops@example.com"}, "then": "exit"})
        );

        let err = TaskDefinition::from_value(json!({"a": 1, "b": 2})).unwrap_err();
        assert!(matches!(err, DefinitionError::AmbiguousKind { .. }));
    }

    #[test]
    fn test_unknown_sibling_keys_round_trip() {
        let node = json!({
            "wait": "PT1S",
            "x-owner": "team-a",
            "timeout": "shortTimeout"
        });
        let task = TaskDefinition::from_value(node.clone()).unwrap();
        assert_eq!(task.extension_data.get("x-owner"), Some(&json!("team-a")));
        assert_eq!(
            task.fields.timeout.as_ref().and_then(|t| t.second()).map(String::as_str),
            Some("shortTimeout")
        );
        let written = serde_json::to_value(&task).unwrap();
        assert_eq!(written, node);
        let keys: Vec<&String> = written.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["wait", "timeout", "x-owner"]);
    }

    #[test]
    fn test_execution_mode() {
        let fork = TaskDefinition::from_value(json!({
            "fork": {"branches": [
                {"a": {"wait": "PT1S"}},
                {"b": {"wait": "PT2S"}}
            ]}
        }))
        .unwrap();
        assert_eq!(fork.execution_mode(), Some(ExecutionMode::Concurrent));
        let seq = TaskDefinition::from_value(json!({"do": [{"a": {"wait": "PT1S"}}]})).unwrap();
        assert_eq!(seq.execution_mode(), Some(ExecutionMode::Sequential));
        let wait = TaskDefinition::from_value(json!({"wait": "PT1S"})).unwrap();
        assert_eq!(wait.execution_mode(), None);
        assert!(!wait.is_composite());
    }

    #[test]
    fn test_scalar_task_is_shape_mismatch() {
        let err = TaskDefinition::from_value(json!("call")).unwrap_err();
        assert!(matches!(err, DefinitionError::ShapeMismatch { .. }));
    }
}

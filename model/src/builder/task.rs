use super::TaskDefinitionBuild;
use super::error::RaiseTaskDefinitionBuilder;
use super::event::{EmitTaskDefinitionBuilder, ListenTaskDefinitionBuilder};
use super::flow::{
    CompositeTaskDefinitionBuilder, DoTaskDefinitionBuilder, ForTaskDefinitionBuilder,
    ForkTaskDefinitionBuilder, SwitchTaskDefinitionBuilder, TryTaskDefinitionBuilder,
};
use super::run::RunTaskDefinitionBuilder;
use crate::definition::task::{
    CallTaskDefinition, SetTaskDefinition, TaskDefinitionFields, WaitTaskDefinition,
};
use crate::definition::{Duration, TaskDefinition};
use serde_json::Value;
use swdsl_base::error::{DefinitionError, Result};
use swdsl_base::{EquatableMap, NamedMap};

/// Entry point choosing the kind of task to build.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskDefinitionBuilder;

impl TaskDefinitionBuilder {
    pub fn call(self, function: impl Into<String>) -> CallTaskDefinitionBuilder {
        CallTaskDefinitionBuilder::new(function)
    }

    pub fn do_(self) -> DoTaskDefinitionBuilder {
        DoTaskDefinitionBuilder::default()
    }

    /// Sequential or concurrent group of at least two tasks.
    pub fn composite(self) -> CompositeTaskDefinitionBuilder {
        CompositeTaskDefinitionBuilder::default()
    }

    pub fn emit(self) -> EmitTaskDefinitionBuilder {
        EmitTaskDefinitionBuilder::default()
    }

    pub fn for_(self) -> ForTaskDefinitionBuilder {
        ForTaskDefinitionBuilder::default()
    }

    pub fn fork(self) -> ForkTaskDefinitionBuilder {
        ForkTaskDefinitionBuilder::default()
    }

    pub fn listen(self) -> ListenTaskDefinitionBuilder {
        ListenTaskDefinitionBuilder::default()
    }

    pub fn raise(self) -> RaiseTaskDefinitionBuilder {
        RaiseTaskDefinitionBuilder::default()
    }

    pub fn run(self) -> RunTaskDefinitionBuilder {
        RunTaskDefinitionBuilder::default()
    }

    pub fn set(self) -> SetTaskDefinitionBuilder {
        SetTaskDefinitionBuilder::default()
    }

    pub fn switch(self) -> SwitchTaskDefinitionBuilder {
        SwitchTaskDefinitionBuilder::default()
    }

    pub fn try_(self) -> TryTaskDefinitionBuilder {
        TryTaskDefinitionBuilder::default()
    }

    pub fn wait(self) -> WaitTaskDefinitionBuilder {
        WaitTaskDefinitionBuilder::default()
    }
}

/// Ordered, named list of pending tasks. A name added twice keeps its first
/// position and the last definition.
#[derive(Default)]
pub struct TaskDefinitionMapBuilder {
    tasks: Vec<(String, Box<dyn TaskDefinitionBuild>)>,
}

impl TaskDefinitionMapBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a task configured from a fresh [`TaskDefinitionBuilder`].
    pub fn do_<B, F>(mut self, name: impl Into<String>, configure: F) -> Self
    where
        B: TaskDefinitionBuild + 'static,
        F: FnOnce(TaskDefinitionBuilder) -> B,
    {
        self.tasks
            .push((name.into(), Box::new(configure(TaskDefinitionBuilder))));
        self
    }

    pub fn task(mut self, name: impl Into<String>, task: TaskDefinition) -> Self {
        self.tasks.push((name.into(), Box::new(task)));
        self
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Builds every pending task; errors are reported under `path.<name>`.
    pub fn build(self, path: &str) -> Result<NamedMap<TaskDefinition>> {
        let mut map = NamedMap::new();
        for (name, pending) in self.tasks {
            let task = pending
                .build_task()
                .map_err(|e| e.within(&format!("{path}.{name}")))?;
            map.insert(name, task);
        }
        Ok(map)
    }
}

pub struct CallTaskDefinitionBuilder {
    fields: TaskDefinitionFields,
    function: String,
    arguments: EquatableMap<String, Value>,
    await_: Option<bool>,
}

impl CallTaskDefinitionBuilder {
    pub fn new(function: impl Into<String>) -> Self {
        Self {
            fields: TaskDefinitionFields::default(),
            function: function.into(),
            arguments: EquatableMap::new(),
            await_: None,
        }
    }

    task_definition_fields!();

    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.arguments.insert(name.into(), value);
        self
    }

    pub fn with_arguments(mut self, arguments: impl IntoIterator<Item = (String, Value)>) -> Self {
        self.arguments.extend(arguments);
        self
    }

    pub fn await_(mut self, await_: bool) -> Self {
        self.await_ = Some(await_);
        self
    }

    pub fn build(self) -> Result<TaskDefinition> {
        if self.function.trim().is_empty() {
            return Err(DefinitionError::missing("CallTaskDefinition", "call"));
        }
        let call = CallTaskDefinition {
            call: self.function,
            with: self.arguments,
            await_: self.await_,
        };
        // typed views double as shape checks for the built-in protocols
        call.as_http()?;
        call.as_grpc()?;
        call.as_openapi()?;
        call.as_asyncapi()?;
        Ok(TaskDefinition::new(call).with_fields(self.fields))
    }
}

#[derive(Default)]
pub struct SetTaskDefinitionBuilder {
    fields: TaskDefinitionFields,
    values: EquatableMap<String, Value>,
}

impl SetTaskDefinitionBuilder {
    task_definition_fields!();

    pub fn set(mut self, name: impl Into<String>, value: Value) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    pub fn build(self) -> Result<TaskDefinition> {
        if self.values.is_empty() {
            return Err(DefinitionError::cardinality("set", 1, 0));
        }
        Ok(TaskDefinition::new(SetTaskDefinition { set: self.values }).with_fields(self.fields))
    }
}

#[derive(Default)]
pub struct WaitTaskDefinitionBuilder {
    fields: TaskDefinitionFields,
    duration: Option<Duration>,
}

impl WaitTaskDefinitionBuilder {
    task_definition_fields!();

    pub fn duration(mut self, duration: impl Into<Duration>) -> Self {
        self.duration = Some(duration.into());
        self
    }

    pub fn build(self) -> Result<TaskDefinition> {
        let Some(wait) = self.duration else {
            return Err(DefinitionError::missing("WaitTaskDefinition", "wait"));
        };
        wait.validate("wait")?;
        Ok(TaskDefinition::new(WaitTaskDefinition { wait }).with_fields(self.fields))
    }
}

impl_task_build!(
    CallTaskDefinitionBuilder,
    SetTaskDefinitionBuilder,
    WaitTaskDefinitionBuilder
);

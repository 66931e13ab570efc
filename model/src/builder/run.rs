use super::resource::ExternalResourceDefinitionBuilder;
use crate::definition::task::run::{
    ContainerCleanupPolicy, ContainerLifetimeDefinition, ContainerProcessDefinition,
    ProcessReturnType, ScriptProcessDefinition, ShellProcessDefinition,
    WorkflowProcessDefinition,
};
use crate::definition::task::{
    ProcessDefinition, ProcessTypeDefinition, RunTaskDefinition, TaskDefinitionFields,
};
use crate::definition::{Duration, TaskDefinition};
use serde_json::Value;
use swdsl_base::error::{DefinitionError, Result};
use swdsl_base::validation::{validate_name, validate_semver};
use swdsl_base::{DEFAULT_NAMESPACE, EquatableMap};

#[derive(Debug, Clone, Default)]
pub struct ContainerProcessDefinitionBuilder {
    process: ContainerProcessDefinition,
}

impl ContainerProcessDefinitionBuilder {
    pub fn image(mut self, image: impl Into<String>) -> Self {
        self.process.image = image.into();
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.process.name = Some(name.into());
        self
    }

    pub fn command(mut self, command: impl Into<String>) -> Self {
        self.process.command = Some(command.into());
        self
    }

    pub fn port(mut self, host: impl Into<String>, container: Value) -> Self {
        self.process.ports.insert(host.into(), container);
        self
    }

    pub fn volume(mut self, host: impl Into<String>, container: Value) -> Self {
        self.process.volumes.insert(host.into(), container);
        self
    }

    pub fn env(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.process.environment.insert(name.into(), value.into());
        self
    }

    pub fn cleanup(mut self, cleanup: ContainerCleanupPolicy, after: Option<Duration>) -> Self {
        self.process.lifetime = Some(ContainerLifetimeDefinition { cleanup, after });
        self
    }

    pub fn build(self) -> Result<ContainerProcessDefinition> {
        if self.process.image.trim().is_empty() {
            return Err(DefinitionError::missing("ContainerProcessDefinition", "image"));
        }
        if let Some(lifetime) = &self.process.lifetime {
            match (&lifetime.cleanup, &lifetime.after) {
                (ContainerCleanupPolicy::Eventually, None) => {
                    return Err(DefinitionError::missing(
                        "ContainerLifetimeDefinition",
                        "lifetime.after",
                    ));
                }
                (_, Some(after)) => after.validate("lifetime.after")?,
                _ => {}
            }
        }
        Ok(self.process)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScriptProcessDefinitionBuilder {
    language: Option<String>,
    code: Option<String>,
    source: Option<ExternalResourceDefinitionBuilder>,
    arguments: EquatableMap<String, Value>,
    environment: EquatableMap<String, String>,
}

impl ScriptProcessDefinitionBuilder {
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn source(
        mut self,
        configure: impl FnOnce(ExternalResourceDefinitionBuilder) -> ExternalResourceDefinitionBuilder,
    ) -> Self {
        self.source = Some(configure(ExternalResourceDefinitionBuilder::default()));
        self
    }

    pub fn argument(mut self, name: impl Into<String>, value: Value) -> Self {
        self.arguments.insert(name.into(), value);
        self
    }

    pub fn env(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.insert(name.into(), value.into());
        self
    }

    pub fn build(self) -> Result<ScriptProcessDefinition> {
        let Some(language) = self.language.filter(|l| !l.trim().is_empty()) else {
            return Err(DefinitionError::missing("ScriptProcessDefinition", "language"));
        };
        let source = match (self.code.is_some(), self.source) {
            (true, Some(_)) => {
                return Err(DefinitionError::mutually_exclusive(
                    "ScriptProcessDefinition",
                    &["code", "source"],
                ));
            }
            (false, None) => {
                return Err(DefinitionError::missing("ScriptProcessDefinition", "code"));
            }
            (_, source) => source
                .map(|s| s.build().map_err(|e| e.within("source")))
                .transpose()?,
        };
        Ok(ScriptProcessDefinition {
            language,
            code: self.code,
            source,
            arguments: self.arguments,
            environment: self.environment,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct ShellProcessDefinitionBuilder {
    process: ShellProcessDefinition,
}

impl ShellProcessDefinitionBuilder {
    pub fn command(mut self, command: impl Into<String>) -> Self {
        self.process.command = command.into();
        self
    }

    pub fn argument(mut self, name: impl Into<String>, value: Value) -> Self {
        self.process.arguments.insert(name.into(), value);
        self
    }

    pub fn env(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.process.environment.insert(name.into(), value.into());
        self
    }

    pub fn build(self) -> Result<ShellProcessDefinition> {
        if self.process.command.trim().is_empty() {
            return Err(DefinitionError::missing("ShellProcessDefinition", "command"));
        }
        Ok(self.process)
    }
}

#[derive(Debug, Clone)]
pub struct WorkflowProcessDefinitionBuilder {
    process: WorkflowProcessDefinition,
}

impl Default for WorkflowProcessDefinitionBuilder {
    fn default() -> Self {
        Self {
            process: WorkflowProcessDefinition {
                namespace: DEFAULT_NAMESPACE.to_string(),
                ..Default::default()
            },
        }
    }
}

impl WorkflowProcessDefinitionBuilder {
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.process.namespace = namespace.into();
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.process.name = name.into();
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.process.version = version.into();
        self
    }

    pub fn input(mut self, input: Value) -> Self {
        self.process.input = Some(input);
        self
    }

    pub fn build(self) -> Result<WorkflowProcessDefinition> {
        if self.process.name.is_empty() {
            return Err(DefinitionError::missing("WorkflowProcessDefinition", "name"));
        }
        if self.process.version.is_empty() {
            return Err(DefinitionError::missing("WorkflowProcessDefinition", "version"));
        }
        validate_name("namespace", &self.process.namespace)?;
        validate_name("name", &self.process.name)?;
        validate_semver("version", &self.process.version)?;
        Ok(self.process)
    }
}

#[derive(Debug, Clone)]
enum ProcessBuilder {
    Container(ContainerProcessDefinitionBuilder),
    Script(ScriptProcessDefinitionBuilder),
    Shell(ShellProcessDefinitionBuilder),
    Workflow(WorkflowProcessDefinitionBuilder),
}

impl ProcessBuilder {
    fn build(self) -> Result<ProcessDefinition> {
        let (key, process) = match self {
            Self::Container(b) => ("container", b.build().map(ProcessDefinition::Container)),
            Self::Script(b) => ("script", b.build().map(ProcessDefinition::Script)),
            Self::Shell(b) => ("shell", b.build().map(ProcessDefinition::Shell)),
            Self::Workflow(b) => ("workflow", b.build().map(ProcessDefinition::Workflow)),
        };
        process.map_err(|e| e.within(&format!("run.{key}")))
    }
}

/// Selecting a second process kind replaces the first.
#[derive(Default)]
pub struct RunTaskDefinitionBuilder {
    fields: TaskDefinitionFields,
    process: Option<ProcessBuilder>,
    await_: Option<bool>,
    return_: Option<ProcessReturnType>,
}

impl RunTaskDefinitionBuilder {
    task_definition_fields!();

    pub fn container(
        mut self,
        configure: impl FnOnce(ContainerProcessDefinitionBuilder) -> ContainerProcessDefinitionBuilder,
    ) -> Self {
        self.process = Some(ProcessBuilder::Container(configure(Default::default())));
        self
    }

    pub fn script(
        mut self,
        configure: impl FnOnce(ScriptProcessDefinitionBuilder) -> ScriptProcessDefinitionBuilder,
    ) -> Self {
        self.process = Some(ProcessBuilder::Script(configure(Default::default())));
        self
    }

    pub fn shell(
        mut self,
        configure: impl FnOnce(ShellProcessDefinitionBuilder) -> ShellProcessDefinitionBuilder,
    ) -> Self {
        self.process = Some(ProcessBuilder::Shell(configure(Default::default())));
        self
    }

    pub fn workflow(
        mut self,
        configure: impl FnOnce(WorkflowProcessDefinitionBuilder) -> WorkflowProcessDefinitionBuilder,
    ) -> Self {
        self.process = Some(ProcessBuilder::Workflow(configure(Default::default())));
        self
    }

    pub fn await_(mut self, await_: bool) -> Self {
        self.await_ = Some(await_);
        self
    }

    pub fn return_(mut self, return_: ProcessReturnType) -> Self {
        self.return_ = Some(return_);
        self
    }

    pub fn build(self) -> Result<TaskDefinition> {
        let Some(process) = self.process else {
            return Err(DefinitionError::missing("RunTaskDefinition", "run"));
        };
        let run = ProcessTypeDefinition {
            process: process.build()?,
            await_: self.await_,
            return_: self.return_,
        };
        Ok(TaskDefinition::new(RunTaskDefinition { run }).with_fields(self.fields))
    }
}

impl_task_build!(RunTaskDefinitionBuilder);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::TaskDefinitionBuilder;
    use crate::definition::TaskKind;
    use serde_json::json;

    fn process(task: &TaskDefinition) -> &ProcessTypeDefinition {
        match &task.kind {
            TaskKind::Run(run) => &run.run,
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn test_run_requires_process() {
        assert!(matches!(
            TaskDefinitionBuilder.run().build(),
            Err(DefinitionError::MissingField { field, .. }) if field == "run"
        ));
    }

    #[test]
    fn test_container_builder() {
        let err = TaskDefinitionBuilder
            .run()
            .container(|c| c.command("echo hi"))
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            DefinitionError::MissingField { field, .. } if field == "run.container.image"
        ));
        let task = TaskDefinitionBuilder
            .run()
            .container(|c| {
                c.image("alpine:3")
                    .port("8080", json!(80))
                    .env("MODE", "test")
                    .cleanup(ContainerCleanupPolicy::Eventually, Some("PT10M".into()))
            })
            .return_(ProcessReturnType::Stdout)
            .build()
            .unwrap();
        let run = process(&task);
        assert_eq!(run.return_, Some(ProcessReturnType::Stdout));
        assert!(matches!(&run.process, ProcessDefinition::Container(c) if c.image == "alpine:3"));
    }

    #[test]
    fn test_script_code_or_source() {
        let missing = TaskDefinitionBuilder
            .run()
            .script(|s| s.language("js"))
            .build()
            .unwrap_err();
        assert!(matches!(
            missing,
            DefinitionError::MissingField { field, .. } if field == "run.script.code"
        ));
        let both = TaskDefinitionBuilder
            .run()
            .script(|s| {
                s.language("js")
                    .code("log(1)")
                    .source(|r| r.uri("https://example.com/script.js"))
            })
            .build()
            .unwrap_err();
        assert!(matches!(both, DefinitionError::MutuallyExclusive { .. }));
        let external = TaskDefinitionBuilder
            .run()
            .script(|s| s.language("python").source(|r| r.uri("file:///scripts/job.py")))
            .build()
            .unwrap();
        assert!(matches!(
            &process(&external).process,
            ProcessDefinition::Script(s) if s.source.is_some() && s.code.is_none()
        ));
    }

    #[test]
    fn test_shell_and_workflow_builders() {
        assert!(
            TaskDefinitionBuilder
                .run()
                .shell(|s| s.command("ls").argument("-la", json!(true)))
                .build()
                .is_ok()
        );
        let err = TaskDefinitionBuilder
            .run()
            .workflow(|w| w.name("child").version("one"))
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            DefinitionError::InvalidFormat { field, .. } if field == "run.workflow.version"
        ));
        let task = TaskDefinitionBuilder
            .run()
            .workflow(|w| w.name("child").version("1.0.0").input(json!({"a": 1})))
            .await_(false)
            .build()
            .unwrap();
        let ProcessDefinition::Workflow(workflow) = &process(&task).process else {
            panic!("expected workflow");
        };
        assert_eq!(workflow.namespace, DEFAULT_NAMESPACE);
    }
}

// Document level checks. Wire parsing stays lenient; everything a builder
// would reject is reported here instead, first violation first.

use super::authentication::ReferenceableAuthenticationPolicy;
use super::component::ComponentDefinitionCollection;
use super::data::{ExportDefinition, InputDataModelDefinition, OutputDataModelDefinition};
use super::flow::FlowDirective;
use super::resource::{Endpoint, EndpointExt, SchemaDefinition};
use super::retry::TimeoutDefinition;
use super::task::run::ProcessDefinition;
use super::task::{CallTaskDefinition, TaskDefinition, TaskKind};
use super::workflow::WorkflowDefinition;
use swdsl_base::error::{DefinitionError, Result};
use swdsl_base::validation::{validate_name, validate_semver};
use swdsl_base::{NamedMap, OneOf};

pub struct DefinitionValidator<'a> {
    components: Option<&'a ComponentDefinitionCollection>,
}

impl<'a> DefinitionValidator<'a> {
    pub fn new(components: Option<&'a ComponentDefinitionCollection>) -> Self {
        Self { components }
    }

    pub fn validate_workflow(&self, workflow: &WorkflowDefinition) -> Result<()> {
        let document = &workflow.document;
        validate_name("document.name", &document.name)?;
        validate_name("document.namespace", &document.namespace)?;
        validate_semver("document.version", &document.version)?;
        validate_semver("document.dsl", &document.dsl)?;
        self.validate_input("input", workflow.input.as_ref())?;
        self.validate_output("output", workflow.output.as_ref())?;
        if let Some(timeout) = &workflow.timeout {
            self.validate_timeout("timeout", timeout)?;
        }
        if let Some(schedule) = &workflow.schedule {
            if let Some(every) = &schedule.every {
                every.validate("schedule.every")?;
            }
            if let Some(after) = &schedule.after {
                after.validate("schedule.after")?;
            }
            if let Some(on) = &schedule.on {
                on.validate("schedule.on")?;
            }
        }
        if let Some(components) = self.components {
            self.validate_components(components)?;
        }
        self.validate_tasks("do", &workflow.do_)
    }

    fn validate_components(&self, components: &ComponentDefinitionCollection) -> Result<()> {
        for (name, policy) in components.authentications.iter() {
            policy.validate(&format!("use.authentications.{name}"))?;
        }
        for (name, catalog) in components.catalogs.iter() {
            self.validate_endpoint(&format!("use.catalogs.{name}.endpoint"), &catalog.endpoint)?;
        }
        for (name, error) in components.errors.iter() {
            error.validate(&format!("use.errors.{name}"))?;
        }
        for (name, extension) in components.extensions.iter() {
            let path = format!("use.extensions.{name}");
            if extension.before.is_empty() && extension.after.is_empty() {
                return Err(DefinitionError::missing(path, "before"));
            }
            if !extension.before.is_empty() {
                self.validate_tasks(&format!("{path}.before"), &extension.before)?;
            }
            if !extension.after.is_empty() {
                self.validate_tasks(&format!("{path}.after"), &extension.after)?;
            }
        }
        for (name, function) in components.functions.iter() {
            self.validate_task(&format!("use.functions.{name}"), function, &NamedMap::new())?;
        }
        for (name, retry) in components.retries.iter() {
            retry.validate(&format!("use.retries.{name}"))?;
        }
        for (name, timeout) in components.timeouts.iter() {
            timeout.after.validate(&format!("use.timeouts.{name}.after"))?;
        }
        Ok(())
    }

    /// A task list needs at least one entry.
    pub fn validate_tasks(&self, path: &str, tasks: &NamedMap<TaskDefinition>) -> Result<()> {
        if tasks.is_empty() {
            return Err(DefinitionError::cardinality(path, 1, 0));
        }
        for (name, task) in tasks.iter() {
            self.validate_task(&format!("{path}.{name}"), task, tasks)?;
        }
        Ok(())
    }

    /// `siblings` is the list the task belongs to; `goto` directives must
    /// name one of its entries.
    pub fn validate_task(
        &self,
        path: &str,
        task: &TaskDefinition,
        siblings: &NamedMap<TaskDefinition>,
    ) -> Result<()> {
        let fields = &task.fields;
        if let Some(then) = &fields.then {
            validate_directive(&format!("{path}.then"), then, siblings)?;
        }
        if let Some(timeout) = &fields.timeout {
            self.validate_timeout(&format!("{path}.timeout"), timeout)?;
        }
        self.validate_input(&format!("{path}.input"), fields.input.as_ref())?;
        self.validate_output(&format!("{path}.output"), fields.output.as_ref())?;
        self.validate_export(&format!("{path}.export"), fields.export.as_ref())?;

        match &task.kind {
            TaskKind::Call(call) => self.validate_call(&format!("{path}.call"), call),
            TaskKind::Do(t) => self.validate_tasks(&format!("{path}.do"), &t.do_),
            TaskKind::Emit(t) => {
                if t.emit.event.with.is_empty() {
                    return Err(DefinitionError::cardinality(
                        format!("{path}.emit.event.with"),
                        1,
                        0,
                    ));
                }
                Ok(())
            }
            TaskKind::For(t) => {
                if t.for_.in_.trim().is_empty() {
                    return Err(DefinitionError::missing(format!("{path}.for"), "in"));
                }
                self.validate_tasks(&format!("{path}.do"), &t.do_)
            }
            TaskKind::Fork(t) => {
                let branches = &t.fork.branches;
                if branches.len() < 2 {
                    return Err(DefinitionError::cardinality(
                        format!("{path}.fork.branches"),
                        2,
                        branches.len(),
                    ));
                }
                self.validate_tasks(&format!("{path}.fork.branches"), branches)
            }
            TaskKind::Listen(t) => {
                t.listen.to.validate(&format!("{path}.listen.to"))?;
                match &t.foreach {
                    Some(foreach) if !foreach.do_.is_empty() => {
                        self.validate_tasks(&format!("{path}.foreach.do"), &foreach.do_)
                    }
                    _ => Ok(()),
                }
            }
            TaskKind::Raise(t) => match &t.raise.error {
                OneOf::First(error) => error.validate(&format!("{path}.raise.error")),
                OneOf::Second(name) => {
                    self.require_component("errors", name, &format!("{path}.raise.error"))
                }
            },
            TaskKind::Run(t) => validate_process(&format!("{path}.run"), &t.run.process),
            TaskKind::Set(t) => {
                if t.set.is_empty() {
                    return Err(DefinitionError::cardinality(format!("{path}.set"), 1, 0));
                }
                Ok(())
            }
            TaskKind::Switch(t) => {
                let switch_path = format!("{path}.switch");
                if t.switch.is_empty() {
                    return Err(DefinitionError::cardinality(switch_path, 1, 0));
                }
                let mut defaults = t.switch.iter().filter(|(_, case)| case.is_default());
                if let (Some(_), Some((second, _))) = (defaults.next(), defaults.next()) {
                    return Err(DefinitionError::invalid_format(
                        switch_path,
                        second.as_str(),
                        "only one case may omit 'when'",
                    ));
                }
                for (name, case) in t.switch.iter() {
                    validate_directive(&format!("{switch_path}.{name}.then"), &case.then, siblings)?;
                }
                Ok(())
            }
            TaskKind::Try(t) => {
                self.validate_tasks(&format!("{path}.try"), &t.try_)?;
                let catch_path = format!("{path}.catch");
                match &t.catch.retry {
                    Some(OneOf::First(retry)) => retry.validate(&format!("{catch_path}.retry"))?,
                    Some(OneOf::Second(name)) => {
                        self.require_component("retries", name, &format!("{catch_path}.retry"))?
                    }
                    None => {}
                }
                if t.catch.do_.is_empty() {
                    Ok(())
                } else {
                    self.validate_tasks(&format!("{catch_path}.do"), &t.catch.do_)
                }
            }
            TaskKind::Wait(t) => t.wait.validate(&format!("{path}.wait")),
            TaskKind::Extension(_) => Ok(()),
        }
    }

    fn validate_call(&self, path: &str, call: &CallTaskDefinition) -> Result<()> {
        if call.call.trim().is_empty() {
            return Err(DefinitionError::missing(path, "call"));
        }
        if let Some(http) = call.as_http()? {
            self.validate_endpoint(&format!("{path}.with.endpoint"), &http.endpoint)?;
        }
        if let Some(grpc) = call.as_grpc()? {
            self.validate_endpoint(&format!("{path}.with.proto.endpoint"), &grpc.proto.endpoint)?;
            if let Some(auth) = &grpc.service.authentication {
                self.validate_authentication(&format!("{path}.with.service.authentication"), auth)?;
            }
        }
        if let Some(openapi) = call.as_openapi()? {
            self.validate_endpoint(
                &format!("{path}.with.document.endpoint"),
                &openapi.document.endpoint,
            )?;
            if let Some(auth) = &openapi.authentication {
                self.validate_authentication(&format!("{path}.with.authentication"), auth)?;
            }
        }
        if let Some(asyncapi) = call.as_asyncapi()? {
            self.validate_endpoint(
                &format!("{path}.with.document.endpoint"),
                &asyncapi.document.endpoint,
            )?;
        }
        Ok(())
    }

    fn validate_endpoint(&self, path: &str, endpoint: &Endpoint) -> Result<()> {
        endpoint.validate(path)?;
        match endpoint.authentication() {
            Some(auth) => self.validate_authentication(&format!("{path}.authentication"), auth),
            None => Ok(()),
        }
    }

    fn validate_authentication(
        &self,
        path: &str,
        auth: &ReferenceableAuthenticationPolicy,
    ) -> Result<()> {
        match auth {
            OneOf::First(policy) => policy.validate(path),
            OneOf::Second(name) => self.require_component("authentications", name, path),
        }
    }

    fn validate_timeout(&self, path: &str, timeout: &OneOf<TimeoutDefinition, String>) -> Result<()> {
        match timeout {
            OneOf::First(timeout) => timeout.after.validate(&format!("{path}.after")),
            OneOf::Second(name) => self.require_component("timeouts", name, path),
        }
    }

    fn validate_input(&self, path: &str, input: Option<&InputDataModelDefinition>) -> Result<()> {
        validate_schema(path, input.and_then(|i| i.schema.as_ref()))
    }

    fn validate_output(&self, path: &str, output: Option<&OutputDataModelDefinition>) -> Result<()> {
        validate_schema(path, output.and_then(|o| o.schema.as_ref()))
    }

    fn validate_export(&self, path: &str, export: Option<&ExportDefinition>) -> Result<()> {
        validate_schema(path, export.and_then(|e| e.schema.as_ref()))
    }

    fn require_component(&self, collection: &str, name: &str, path: &str) -> Result<()> {
        let known = self.components.is_some_and(|c| match collection {
            "authentications" => c.authentications.contains_key(name),
            "errors" => c.errors.contains_key(name),
            "retries" => c.retries.contains_key(name),
            "timeouts" => c.timeouts.contains_key(name),
            _ => false,
        });
        if known {
            Ok(())
        } else {
            Err(DefinitionError::invalid_format(
                path,
                name,
                format!("must reference an entry of use.{collection}"),
            ))
        }
    }
}

fn validate_schema(path: &str, schema: Option<&SchemaDefinition>) -> Result<()> {
    match schema {
        Some(schema) => schema.validate(&format!("{path}.schema")),
        None => Ok(()),
    }
}

fn validate_directive(
    path: &str,
    directive: &FlowDirective,
    siblings: &NamedMap<TaskDefinition>,
) -> Result<()> {
    match directive.target() {
        Some(target) if !siblings.contains(target) => Err(DefinitionError::invalid_format(
            path,
            target,
            "must name a task of the same list",
        )),
        _ => Ok(()),
    }
}

fn validate_process(path: &str, process: &ProcessDefinition) -> Result<()> {
    match process {
        ProcessDefinition::Container(container) => {
            if container.image.trim().is_empty() {
                return Err(DefinitionError::missing(format!("{path}.container"), "image"));
            }
            Ok(())
        }
        ProcessDefinition::Script(script) => {
            let script_path = format!("{path}.script");
            if script.language.trim().is_empty() {
                return Err(DefinitionError::missing(script_path, "language"));
            }
            match (&script.code, &script.source) {
                (Some(_), Some(_)) => Err(DefinitionError::mutually_exclusive(
                    script_path,
                    &["code", "source"],
                )),
                (None, None) => Err(DefinitionError::missing(script_path, "code")),
                (None, Some(source)) => source.endpoint.validate(&format!("{script_path}.source.endpoint")),
                (Some(_), None) => Ok(()),
            }
        }
        ProcessDefinition::Shell(shell) => {
            if shell.command.trim().is_empty() {
                return Err(DefinitionError::missing(format!("{path}.shell"), "command"));
            }
            Ok(())
        }
        ProcessDefinition::Workflow(workflow) => {
            let workflow_path = format!("{path}.workflow");
            validate_name(&format!("{workflow_path}.namespace"), &workflow.namespace)?;
            validate_name(&format!("{workflow_path}.name"), &workflow.name)?;
            validate_semver(&format!("{workflow_path}.version"), &workflow.version)
        }
    }
}

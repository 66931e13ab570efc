use super::TaskDefinitionBuild;
use super::authentication::AuthenticationPolicyDefinitionBuilder;
use super::error::{ErrorDefinitionBuilder, RetryPolicyDefinitionBuilder, TimeoutDefinitionBuilder};
use super::task::{TaskDefinitionBuilder, TaskDefinitionMapBuilder};
use crate::definition::{
    CatalogDefinition, ComponentDefinitionCollection, ExtensionDefinition,
    InputDataModelDefinition, OutputDataModelDefinition, TaskDefinition, TimeoutDefinition,
    WorkflowDefinition, WorkflowDefinitionMetadata, WorkflowScheduleDefinition,
};
use serde_json::Value;
use swdsl_base::error::{DefinitionError, Result};
use swdsl_base::validation::{validate_name, validate_semver};
use swdsl_base::{DEFAULT_DSL_VERSION, DEFAULT_NAMESPACE, EquatableMap, OneOf};

/// Reusable components (`use`). Entries are built, and their names checked,
/// when the collection is built.
#[derive(Default)]
pub struct ComponentDefinitionCollectionBuilder {
    authentications: Vec<(String, AuthenticationPolicyDefinitionBuilder)>,
    catalogs: Vec<(String, CatalogDefinition)>,
    errors: Vec<(String, ErrorDefinitionBuilder)>,
    extensions: Vec<(String, ExtensionDefinition)>,
    functions: TaskDefinitionMapBuilder,
    retries: Vec<(String, RetryPolicyDefinitionBuilder)>,
    secrets: Vec<String>,
    timeouts: Vec<(String, TimeoutDefinitionBuilder)>,
}

impl ComponentDefinitionCollectionBuilder {
    pub fn authentication(
        mut self,
        name: impl Into<String>,
        configure: impl FnOnce(AuthenticationPolicyDefinitionBuilder) -> AuthenticationPolicyDefinitionBuilder,
    ) -> Self {
        self.authentications
            .push((name.into(), configure(Default::default())));
        self
    }

    pub fn catalog(mut self, name: impl Into<String>, uri: impl Into<String>) -> Self {
        self.catalogs.push((
            name.into(),
            CatalogDefinition {
                endpoint: OneOf::from_second(uri.into()),
            },
        ));
        self
    }

    pub fn error(
        mut self,
        name: impl Into<String>,
        configure: impl FnOnce(ErrorDefinitionBuilder) -> ErrorDefinitionBuilder,
    ) -> Self {
        self.errors.push((name.into(), configure(Default::default())));
        self
    }

    pub fn extension(mut self, name: impl Into<String>, extension: ExtensionDefinition) -> Self {
        self.extensions.push((name.into(), extension));
        self
    }

    /// Declares a callable function, itself a task definition.
    pub fn function<B, F>(mut self, name: impl Into<String>, configure: F) -> Self
    where
        B: TaskDefinitionBuild + 'static,
        F: FnOnce(TaskDefinitionBuilder) -> B,
    {
        self.functions = self.functions.do_(name, configure);
        self
    }

    pub fn retry(
        mut self,
        name: impl Into<String>,
        configure: impl FnOnce(RetryPolicyDefinitionBuilder) -> RetryPolicyDefinitionBuilder,
    ) -> Self {
        self.retries.push((name.into(), configure(Default::default())));
        self
    }

    pub fn secret(mut self, name: impl Into<String>) -> Self {
        self.secrets.push(name.into());
        self
    }

    pub fn timeout(
        mut self,
        name: impl Into<String>,
        configure: impl FnOnce(TimeoutDefinitionBuilder) -> TimeoutDefinitionBuilder,
    ) -> Self {
        self.timeouts.push((name.into(), configure(Default::default())));
        self
    }

    pub fn build(self) -> Result<ComponentDefinitionCollection> {
        let mut components = ComponentDefinitionCollection::default();
        for (name, builder) in self.authentications {
            let policy = builder
                .build()
                .map_err(|e| e.within(&format!("use.authentications.{name}")))?;
            components.authentications.insert(name, policy);
        }
        for (name, catalog) in self.catalogs {
            components.catalogs.insert(name, catalog);
        }
        for (name, builder) in self.errors {
            let error = builder
                .build()
                .map_err(|e| e.within(&format!("use.errors.{name}")))?;
            components.errors.insert(name, error);
        }
        for (name, extension) in self.extensions {
            components.extensions.insert(name, extension);
        }
        for (name, function) in self.functions.build("use.functions")? {
            components.functions.insert(name, function);
        }
        for (name, builder) in self.retries {
            let retry = builder
                .build()
                .map_err(|e| e.within(&format!("use.retries.{name}")))?;
            components.retries.insert(name, retry);
        }
        components.secrets.extend(self.secrets);
        for (name, builder) in self.timeouts {
            let timeout = builder
                .build()
                .map_err(|e| e.within(&format!("use.timeouts.{name}")))?;
            components.timeouts.insert(name, timeout);
        }
        Ok(components)
    }
}

pub struct WorkflowDefinitionBuilder {
    dsl: String,
    namespace: String,
    name: Option<String>,
    version: Option<String>,
    title: Option<String>,
    summary: Option<String>,
    tags: EquatableMap<String, String>,
    metadata: EquatableMap<String, Value>,
    input: Option<InputDataModelDefinition>,
    output: Option<OutputDataModelDefinition>,
    timeout: Option<OneOf<TimeoutDefinition, String>>,
    schedule: Option<WorkflowScheduleDefinition>,
    components: Option<ComponentDefinitionCollectionBuilder>,
    tasks: TaskDefinitionMapBuilder,
}

impl Default for WorkflowDefinitionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowDefinitionBuilder {
    pub fn new() -> Self {
        Self {
            dsl: DEFAULT_DSL_VERSION.to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            name: None,
            version: None,
            title: None,
            summary: None,
            tags: EquatableMap::new(),
            metadata: EquatableMap::new(),
            input: None,
            output: None,
            timeout: None,
            schedule: None,
            components: None,
            tasks: TaskDefinitionMapBuilder::new(),
        }
    }

    pub fn with_dsl(mut self, dsl: impl Into<String>) -> Result<Self> {
        let dsl = dsl.into();
        validate_semver("document.dsl", &dsl)?;
        self.dsl = dsl;
        Ok(self)
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Result<Self> {
        let namespace = namespace.into();
        validate_name("document.namespace", &namespace)?;
        self.namespace = namespace;
        Ok(self)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_name("document.name", &name)?;
        self.name = Some(name);
        Ok(self)
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Result<Self> {
        let version = version.into();
        validate_semver("document.version", &version)?;
        self.version = Some(version);
        Ok(self)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn with_input(mut self, input: InputDataModelDefinition) -> Self {
        self.input = Some(input);
        self
    }

    pub fn with_output(mut self, output: OutputDataModelDefinition) -> Self {
        self.output = Some(output);
        self
    }

    pub fn with_timeout(mut self, timeout: TimeoutDefinition) -> Self {
        self.timeout = Some(OneOf::from_first(timeout));
        self
    }

    pub fn with_timeout_reference(mut self, name: impl Into<String>) -> Self {
        self.timeout = Some(OneOf::from_second(name.into()));
        self
    }

    pub fn with_schedule(mut self, schedule: WorkflowScheduleDefinition) -> Self {
        self.schedule = Some(schedule);
        self
    }

    pub fn use_(
        mut self,
        configure: impl FnOnce(ComponentDefinitionCollectionBuilder) -> ComponentDefinitionCollectionBuilder,
    ) -> Self {
        self.components = Some(configure(self.components.take().unwrap_or_default()));
        self
    }

    pub fn do_<B, F>(mut self, name: impl Into<String>, configure: F) -> Self
    where
        B: TaskDefinitionBuild + 'static,
        F: FnOnce(TaskDefinitionBuilder) -> B,
    {
        self.tasks = self.tasks.do_(name, configure);
        self
    }

    pub fn task(mut self, name: impl Into<String>, task: TaskDefinition) -> Self {
        self.tasks = self.tasks.task(name, task);
        self
    }

    /// Builds the document and runs the same checks as
    /// [`WorkflowDefinition::validate`].
    pub fn build(self) -> Result<WorkflowDefinition> {
        let Some(name) = self.name else {
            return Err(DefinitionError::missing("WorkflowDefinition", "document.name"));
        };
        let Some(version) = self.version else {
            return Err(DefinitionError::missing("WorkflowDefinition", "document.version"));
        };
        if self.tasks.is_empty() {
            return Err(DefinitionError::cardinality("do", 1, 0));
        }
        let use_ = self
            .components
            .map(ComponentDefinitionCollectionBuilder::build)
            .transpose()?
            .filter(|components| !components.is_empty());
        let document = WorkflowDefinitionMetadata {
            dsl: self.dsl,
            namespace: self.namespace,
            name,
            version,
            title: self.title,
            summary: self.summary,
            tags: self.tags,
            metadata: self.metadata,
        };
        let mut workflow = WorkflowDefinition::new(document, self.tasks.build("do")?);
        workflow.input = self.input;
        workflow.output = self.output;
        workflow.timeout = self.timeout;
        workflow.schedule = self.schedule;
        workflow.use_ = use_;
        workflow.validate()?;
        Ok(workflow)
    }
}

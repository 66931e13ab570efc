use super::TaskDefinitionBuild;
use super::error::ErrorCatcherDefinitionBuilder;
use super::task::{TaskDefinitionBuilder, TaskDefinitionMapBuilder};
use crate::definition::task::{
    BranchingDefinition, DoTaskDefinition, ForLoopDefinition, ForTaskDefinition,
    ForkTaskDefinition, SwitchCaseDefinition, SwitchTaskDefinition, TaskDefinitionFields,
    TryTaskDefinition,
};
use crate::definition::{ExecutionMode, FlowDirective, TaskDefinition};
use swdsl_base::NamedMap;
use swdsl_base::error::{DefinitionError, Result};

#[derive(Default)]
pub struct DoTaskDefinitionBuilder {
    fields: TaskDefinitionFields,
    tasks: TaskDefinitionMapBuilder,
}

impl DoTaskDefinitionBuilder {
    task_definition_fields!();

    pub fn do_<B, F>(mut self, name: impl Into<String>, configure: F) -> Self
    where
        B: TaskDefinitionBuild + 'static,
        F: FnOnce(TaskDefinitionBuilder) -> B,
    {
        self.tasks = self.tasks.do_(name, configure);
        self
    }

    pub fn build(self) -> Result<TaskDefinition> {
        if self.tasks.is_empty() {
            return Err(DefinitionError::cardinality("do", 1, 0));
        }
        let tasks = self.tasks.build("do")?;
        Ok(TaskDefinition::new(DoTaskDefinition::new(tasks)).with_fields(self.fields))
    }
}

/// Group of tasks run one after another (`do`) or side by side (`fork`).
#[derive(Default)]
pub struct CompositeTaskDefinitionBuilder {
    fields: TaskDefinitionFields,
    mode: Option<ExecutionMode>,
    tasks: TaskDefinitionMapBuilder,
    compete: bool,
}

impl CompositeTaskDefinitionBuilder {
    task_definition_fields!();

    pub fn sequentially(
        mut self,
        configure: impl FnOnce(TaskDefinitionMapBuilder) -> TaskDefinitionMapBuilder,
    ) -> Self {
        self.mode = Some(ExecutionMode::Sequential);
        self.tasks = configure(self.tasks);
        self
    }

    pub fn concurrently(
        mut self,
        configure: impl FnOnce(TaskDefinitionMapBuilder) -> TaskDefinitionMapBuilder,
    ) -> Self {
        self.mode = Some(ExecutionMode::Concurrent);
        self.tasks = configure(self.tasks);
        self
    }

    /// Only meaningful for concurrent execution.
    pub fn compete(mut self, compete: bool) -> Self {
        self.compete = compete;
        self
    }

    pub fn build(self) -> Result<TaskDefinition> {
        let Some(mode) = self.mode else {
            return Err(DefinitionError::missing("CompositeTaskDefinition", "execute"));
        };
        let key = match mode {
            ExecutionMode::Sequential => "do",
            ExecutionMode::Concurrent => "fork.branches",
        };
        let tasks = self.tasks.build(key)?;
        if tasks.len() < 2 {
            return Err(DefinitionError::cardinality(key, 2, tasks.len()));
        }
        let task = match mode {
            ExecutionMode::Sequential => TaskDefinition::new(DoTaskDefinition::new(tasks)),
            ExecutionMode::Concurrent => TaskDefinition::new(ForkTaskDefinition {
                fork: BranchingDefinition {
                    branches: tasks,
                    compete: self.compete,
                },
            }),
        };
        Ok(task.with_fields(self.fields))
    }
}

#[derive(Default)]
pub struct ForTaskDefinitionBuilder {
    fields: TaskDefinitionFields,
    each: Option<String>,
    in_: Option<String>,
    at: Option<String>,
    while_: Option<String>,
    tasks: TaskDefinitionMapBuilder,
}

impl ForTaskDefinitionBuilder {
    task_definition_fields!();

    pub fn each(mut self, variable: impl Into<String>) -> Self {
        self.each = Some(variable.into());
        self
    }

    pub fn in_(mut self, collection: impl Into<String>) -> Self {
        self.in_ = Some(collection.into());
        self
    }

    pub fn at(mut self, index: impl Into<String>) -> Self {
        self.at = Some(index.into());
        self
    }

    pub fn while_(mut self, condition: impl Into<String>) -> Self {
        self.while_ = Some(condition.into());
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

    pub fn build(self) -> Result<TaskDefinition> {
        let Some(in_) = self.in_ else {
            return Err(DefinitionError::missing("ForTaskDefinition", "for.in"));
        };
        if self.tasks.is_empty() {
            return Err(DefinitionError::cardinality("do", 1, 0));
        }
        let mut for_ = ForLoopDefinition::new(in_);
        if let Some(each) = self.each {
            for_.each = each;
        }
        for_.at = self.at;
        let task = ForTaskDefinition {
            for_,
            while_: self.while_,
            do_: self.tasks.build("do")?,
        };
        Ok(TaskDefinition::new(task).with_fields(self.fields))
    }
}

#[derive(Default)]
pub struct ForkTaskDefinitionBuilder {
    fields: TaskDefinitionFields,
    branches: TaskDefinitionMapBuilder,
    compete: bool,
}

impl ForkTaskDefinitionBuilder {
    task_definition_fields!();

    pub fn branch<B, F>(mut self, name: impl Into<String>, configure: F) -> Self
    where
        B: TaskDefinitionBuild + 'static,
        F: FnOnce(TaskDefinitionBuilder) -> B,
    {
        self.branches = self.branches.do_(name, configure);
        self
    }

    pub fn compete(mut self, compete: bool) -> Self {
        self.compete = compete;
        self
    }

    pub fn build(self) -> Result<TaskDefinition> {
        let branches = self.branches.build("fork.branches")?;
        if branches.len() < 2 {
            return Err(DefinitionError::cardinality(
                "fork.branches",
                2,
                branches.len(),
            ));
        }
        let task = ForkTaskDefinition {
            fork: BranchingDefinition {
                branches,
                compete: self.compete,
            },
        };
        Ok(TaskDefinition::new(task).with_fields(self.fields))
    }
}

#[derive(Debug, Clone, Default)]
pub struct SwitchCaseDefinitionBuilder {
    when: Option<String>,
    then: Option<FlowDirective>,
}

impl SwitchCaseDefinitionBuilder {
    pub fn when(mut self, condition: impl Into<String>) -> Self {
        self.when = Some(condition.into());
        self
    }

    pub fn then(mut self, directive: impl Into<FlowDirective>) -> Self {
        self.then = Some(directive.into());
        self
    }

    pub fn build(self) -> Result<SwitchCaseDefinition> {
        let Some(then) = self.then else {
            return Err(DefinitionError::missing("SwitchCaseDefinition", "then"));
        };
        Ok(SwitchCaseDefinition {
            when: self.when,
            then,
        })
    }
}

#[derive(Default)]
pub struct SwitchTaskDefinitionBuilder {
    fields: TaskDefinitionFields,
    cases: Vec<(String, SwitchCaseDefinitionBuilder)>,
}

impl SwitchTaskDefinitionBuilder {
    task_definition_fields!();

    pub fn case(
        mut self,
        name: impl Into<String>,
        configure: impl FnOnce(SwitchCaseDefinitionBuilder) -> SwitchCaseDefinitionBuilder,
    ) -> Self {
        self.cases
            .push((name.into(), configure(SwitchCaseDefinitionBuilder::default())));
        self
    }

    pub fn build(self) -> Result<TaskDefinition> {
        if self.cases.is_empty() {
            return Err(DefinitionError::cardinality("switch", 1, 0));
        }
        let mut cases = NamedMap::new();
        for (name, case) in self.cases {
            let case = case.build().map_err(|e| e.within(&format!("switch.{name}")))?;
            cases.insert(name, case);
        }
        let defaults: Vec<&String> = cases
            .iter()
            .filter(|(_, case)| case.is_default())
            .map(|(name, _)| name)
            .collect();
        if let [_, second, ..] = defaults.as_slice() {
            return Err(DefinitionError::invalid_format(
                "switch",
                second.as_str(),
                "only one case may omit 'when'",
            ));
        }
        Ok(TaskDefinition::new(SwitchTaskDefinition { switch: cases }).with_fields(self.fields))
    }
}

#[derive(Default)]
pub struct TryTaskDefinitionBuilder {
    fields: TaskDefinitionFields,
    tasks: TaskDefinitionMapBuilder,
    catch: Option<ErrorCatcherDefinitionBuilder>,
}

impl TryTaskDefinitionBuilder {
    task_definition_fields!();

    pub fn do_<B, F>(mut self, name: impl Into<String>, configure: F) -> Self
    where
        B: TaskDefinitionBuild + 'static,
        F: FnOnce(TaskDefinitionBuilder) -> B,
    {
        self.tasks = self.tasks.do_(name, configure);
        self
    }

    pub fn catch(
        mut self,
        configure: impl FnOnce(ErrorCatcherDefinitionBuilder) -> ErrorCatcherDefinitionBuilder,
    ) -> Self {
        self.catch = Some(configure(self.catch.take().unwrap_or_default()));
        self
    }

    pub fn build(self) -> Result<TaskDefinition> {
        if self.tasks.is_empty() {
            return Err(DefinitionError::cardinality("try", 1, 0));
        }
        let Some(catch) = self.catch else {
            return Err(DefinitionError::missing("TryTaskDefinition", "catch"));
        };
        let task = TryTaskDefinition {
            try_: self.tasks.build("try")?,
            catch: catch.build().map_err(|e| e.within("catch"))?,
        };
        Ok(TaskDefinition::new(task).with_fields(self.fields))
    }
}

impl_task_build!(
    DoTaskDefinitionBuilder,
    CompositeTaskDefinitionBuilder,
    ForTaskDefinitionBuilder,
    ForkTaskDefinitionBuilder,
    SwitchTaskDefinitionBuilder,
    TryTaskDefinitionBuilder,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::TaskKind;
    use serde_json::json;

    #[test]
    fn test_do_requires_one_task() {
        assert_eq!(
            TaskDefinitionBuilder.do_().build().unwrap_err(),
            DefinitionError::cardinality("do", 1, 0)
        );
        let task = TaskDefinitionBuilder
            .do_()
            .do_("only", |t| t.wait().duration("PT1S"))
            .build()
            .unwrap();
        assert_eq!(task.subtasks().map(NamedMap::len), Some(1));
    }

    #[test]
    fn test_composite_cardinality() {
        let none = TaskDefinitionBuilder
            .composite()
            .sequentially(|tasks| tasks)
            .build()
            .unwrap_err();
        assert_eq!(none, DefinitionError::cardinality("do", 2, 0));

        let one = TaskDefinitionBuilder
            .composite()
            .sequentially(|tasks| tasks.do_("a", |t| t.wait().duration("PT1S")))
            .build()
            .unwrap_err();
        assert_eq!(one, DefinitionError::cardinality("do", 2, 1));

        let two = TaskDefinitionBuilder
            .composite()
            .sequentially(|tasks| {
                tasks
                    .do_("a", |t| t.wait().duration("PT1S"))
                    .do_("b", |t| t.wait().duration("PT2S"))
            })
            .build()
            .unwrap();
        assert_eq!(two.execution_mode(), Some(ExecutionMode::Sequential));
        assert_eq!(two.subtasks().map(NamedMap::len), Some(2));
    }

    #[test]
    fn test_composite_concurrently_builds_fork() {
        let task = TaskDefinitionBuilder
            .composite()
            .concurrently(|tasks| {
                tasks
                    .do_("left", |t| t.set().set("side", json!("left")))
                    .do_("right", |t| t.set().set("side", json!("right")))
            })
            .compete(true)
            .build()
            .unwrap();
        let TaskKind::Fork(fork) = &task.kind else {
            panic!("expected fork, got {task:?}");
        };
        assert!(fork.fork.compete);
        assert_eq!(task.execution_mode(), Some(ExecutionMode::Concurrent));
        assert!(matches!(
            TaskDefinitionBuilder.composite().build(),
            Err(DefinitionError::MissingField { field, .. }) if field == "execute"
        ));
    }

    #[test]
    fn test_fork_needs_two_branches() {
        let err = TaskDefinitionBuilder
            .fork()
            .branch("only", |t| t.wait().duration("PT1S"))
            .build()
            .unwrap_err();
        assert_eq!(err, DefinitionError::cardinality("fork.branches", 2, 1));
    }

    #[test]
    fn test_reused_names_count_once() {
        let fork = TaskDefinitionBuilder
            .fork()
            .branch("a", |t| t.wait().duration("PT1S"))
            .branch("a", |t| t.wait().duration("PT2S"))
            .build()
            .unwrap_err();
        assert_eq!(fork, DefinitionError::cardinality("fork.branches", 2, 1));

        let sequential = TaskDefinitionBuilder
            .composite()
            .sequentially(|tasks| {
                tasks
                    .do_("a", |t| t.wait().duration("PT1S"))
                    .do_("a", |t| t.wait().duration("PT2S"))
            })
            .build()
            .unwrap_err();
        assert_eq!(sequential, DefinitionError::cardinality("do", 2, 1));

        let concurrent = TaskDefinitionBuilder
            .composite()
            .concurrently(|tasks| {
                tasks
                    .do_("a", |t| t.wait().duration("PT1S"))
                    .do_("a", |t| t.wait().duration("PT2S"))
            })
            .build()
            .unwrap_err();
        assert_eq!(concurrent, DefinitionError::cardinality("fork.branches", 2, 1));
    }

    #[test]
    fn test_for_builder() {
        let task = TaskDefinitionBuilder
            .for_()
            .each("pet")
            .in_("${ .pets }")
            .do_("feed", |t| t.call("feedPet").with("pet", json!("${ $pet }")))
            .build()
            .unwrap();
        let TaskKind::For(for_) = &task.kind else {
            panic!("expected for");
        };
        assert_eq!(for_.for_.each, "pet");
        assert!(matches!(
            TaskDefinitionBuilder.for_().do_("x", |t| t.wait().duration("PT1S")).build(),
            Err(DefinitionError::MissingField { field, .. }) if field == "for.in"
        ));
    }

    #[test]
    fn test_switch_case_then_required() {
        let err = TaskDefinitionBuilder
            .switch()
            .case("high", |c| c.when("${ .score > 90 }"))
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            DefinitionError::MissingField { field, .. } if field == "switch.high.then"
        ));
        let ok = TaskDefinitionBuilder
            .switch()
            .case("high", |c| c.when("${ .score > 90 }").then("reward"))
            .case("default", |c| c.then(FlowDirective::End))
            .build()
            .unwrap();
        let TaskKind::Switch(switch) = &ok.kind else {
            panic!("expected switch");
        };
        assert_eq!(switch.default_case().map(|(n, _)| n.as_str()), Some("default"));
    }

    #[test]
    fn test_try_requires_catch() {
        let err = TaskDefinitionBuilder
            .try_()
            .do_("call", |t| t.call("flaky"))
            .build()
            .unwrap_err();
        assert!(matches!(err, DefinitionError::MissingField { field, .. } if field == "catch"));

        let task = TaskDefinitionBuilder
            .try_()
            .do_("call", |t| t.call("flaky"))
            .catch(|c| c.as_("failure").retry_reference("default"))
            .build()
            .unwrap();
        let TaskKind::Try(try_) = &task.kind else {
            panic!("expected try");
        };
        assert_eq!(try_.catch.as_.as_deref(), Some("failure"));
    }

    #[test]
    fn test_nested_errors_carry_path() {
        let err = TaskDefinitionBuilder
            .do_()
            .do_("outer", |t| t.do_().do_("inner", |t| t.fork()))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            DefinitionError::cardinality("do.outer.do.inner.fork.branches", 2, 0)
        );
    }
}

use super::TaskDefinitionBuild;
use super::task::{TaskDefinitionBuilder, TaskDefinitionMapBuilder};
use crate::definition::errors::{ErrorFilterDefinition, ErrorFilterProperties};
use crate::definition::retry::{
    ConstantBackoffDefinition, ExponentialBackoffDefinition, JitterDefinition,
    LinearBackoffDefinition, RetryAttemptLimitDefinition, RetryBackoffDefinition,
    RetryPolicyLimitDefinition,
};
use crate::definition::task::{RaiseTaskDefinition, TaskDefinitionFields};
use crate::definition::{
    Duration, ErrorCatcherDefinition, ErrorDefinition, ErrorType, RetryPolicyDefinition,
    TaskDefinition, TimeoutDefinition,
};
use swdsl_base::OneOf;
use swdsl_base::error::{DefinitionError, Result};

#[derive(Debug, Clone, Default)]
pub struct ErrorDefinitionBuilder {
    type_: Option<String>,
    status: Option<u16>,
    title: Option<String>,
    detail: Option<String>,
    instance: Option<String>,
}

impl ErrorDefinitionBuilder {
    pub fn with_type(mut self, type_: impl Into<String>) -> Self {
        self.type_ = Some(type_.into());
        self
    }

    /// Sets the type URI of a standard error and, unless already set, its
    /// usual status.
    pub fn of(mut self, error_type: ErrorType) -> Self {
        self.type_ = Some(error_type.uri());
        self.status.get_or_insert(error_type.default_status());
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    pub fn build(self) -> Result<ErrorDefinition> {
        let error = self.into_definition()?;
        error.validate("error")?;
        Ok(error)
    }

    fn into_definition(self) -> Result<ErrorDefinition> {
        let Some(type_) = self.type_ else {
            return Err(DefinitionError::missing("ErrorDefinition", "type"));
        };
        let Some(status) = self.status else {
            return Err(DefinitionError::missing("ErrorDefinition", "status"));
        };
        Ok(ErrorDefinition {
            type_,
            status,
            title: self.title,
            detail: self.detail,
            instance: self.instance,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct TimeoutDefinitionBuilder {
    after: Option<Duration>,
}

impl TimeoutDefinitionBuilder {
    pub fn after(mut self, duration: impl Into<Duration>) -> Self {
        self.after = Some(duration.into());
        self
    }

    pub fn build(self) -> Result<TimeoutDefinition> {
        let Some(after) = self.after else {
            return Err(DefinitionError::missing("TimeoutDefinition", "after"));
        };
        after.validate("after")?;
        Ok(TimeoutDefinition { after })
    }
}

#[derive(Debug, Clone, Default)]
pub struct RetryPolicyDefinitionBuilder {
    policy: RetryPolicyDefinition,
}

impl RetryPolicyDefinitionBuilder {
    pub fn when(mut self, condition: impl Into<String>) -> Self {
        self.policy.when = Some(condition.into());
        self
    }

    pub fn except_when(mut self, condition: impl Into<String>) -> Self {
        self.policy.except_when = Some(condition.into());
        self
    }

    pub fn delay(mut self, delay: impl Into<Duration>) -> Self {
        self.policy.delay = Some(delay.into());
        self
    }

    pub fn constant_backoff(mut self) -> Self {
        self.policy.backoff = Some(RetryBackoffDefinition::Constant(
            ConstantBackoffDefinition {},
        ));
        self
    }

    pub fn exponential_backoff(mut self, factor: Option<f64>) -> Self {
        self.policy.backoff = Some(RetryBackoffDefinition::Exponential(
            ExponentialBackoffDefinition { factor },
        ));
        self
    }

    pub fn linear_backoff(mut self, increment: Option<Duration>) -> Self {
        self.policy.backoff = Some(RetryBackoffDefinition::Linear(LinearBackoffDefinition {
            increment,
        }));
        self
    }

    pub fn max_attempts(mut self, count: u32) -> Self {
        self.limit().attempt.get_or_insert_with(Default::default).count = Some(count);
        self
    }

    /// Upper bound for a single attempt.
    pub fn attempt_duration(mut self, duration: impl Into<Duration>) -> Self {
        self.limit().attempt.get_or_insert_with(Default::default).duration =
            Some(duration.into());
        self
    }

    /// Upper bound for all attempts together.
    pub fn max_duration(mut self, duration: impl Into<Duration>) -> Self {
        self.limit().duration = Some(duration.into());
        self
    }

    pub fn jitter(mut self, from: impl Into<Duration>, to: impl Into<Duration>) -> Self {
        self.policy.jitter = Some(JitterDefinition {
            from: from.into(),
            to: to.into(),
        });
        self
    }

    fn limit(&mut self) -> &mut RetryPolicyLimitDefinition {
        self.policy
            .limit
            .get_or_insert_with(RetryPolicyLimitDefinition::default)
    }

    pub fn build(self) -> Result<RetryPolicyDefinition> {
        if let Some(RetryPolicyLimitDefinition {
            attempt: Some(RetryAttemptLimitDefinition { count: Some(0), .. }),
            ..
        }) = &self.policy.limit
        {
            return Err(DefinitionError::invalid_format(
                "retry.limit.attempt.count",
                "0",
                "at least one attempt is required",
            ));
        }
        self.policy.validate("retry")?;
        Ok(self.policy)
    }
}

#[derive(Default)]
pub struct ErrorCatcherDefinitionBuilder {
    filter: Option<ErrorFilterProperties>,
    as_: Option<String>,
    when: Option<String>,
    except_when: Option<String>,
    retry: Option<OneOf<RetryPolicyDefinitionBuilder, String>>,
    tasks: TaskDefinitionMapBuilder,
}

impl ErrorCatcherDefinitionBuilder {
    fn filter(&mut self) -> &mut ErrorFilterProperties {
        self.filter.get_or_insert_with(ErrorFilterProperties::default)
    }

    /// Catches errors whose type matches the given URI template.
    pub fn errors_of_type(mut self, type_: impl Into<String>) -> Self {
        self.filter().type_ = Some(type_.into());
        self
    }

    pub fn errors_with_status(mut self, status: u16) -> Self {
        self.filter().status = Some(status);
        self
    }

    pub fn as_(mut self, variable: impl Into<String>) -> Self {
        self.as_ = Some(variable.into());
        self
    }

    pub fn when(mut self, condition: impl Into<String>) -> Self {
        self.when = Some(condition.into());
        self
    }

    pub fn except_when(mut self, condition: impl Into<String>) -> Self {
        self.except_when = Some(condition.into());
        self
    }

    pub fn retry(
        mut self,
        configure: impl FnOnce(RetryPolicyDefinitionBuilder) -> RetryPolicyDefinitionBuilder,
    ) -> Self {
        self.retry = Some(OneOf::from_first(configure(
            RetryPolicyDefinitionBuilder::default(),
        )));
        self
    }

    /// Uses a policy declared under `use.retries`.
    pub fn retry_reference(mut self, name: impl Into<String>) -> Self {
        self.retry = Some(OneOf::from_second(name.into()));
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

    pub fn build(self) -> Result<ErrorCatcherDefinition> {
        let retry = match self.retry {
            None => None,
            Some(OneOf::First(policy)) => Some(OneOf::from_first(policy.build()?)),
            Some(OneOf::Second(name)) => Some(OneOf::from_second(name)),
        };
        Ok(ErrorCatcherDefinition {
            errors: self.filter.map(|with| ErrorFilterDefinition { with: Some(with) }),
            as_: self.as_,
            when: self.when,
            except_when: self.except_when,
            retry,
            do_: self.tasks.build("do")?,
        })
    }
}

#[derive(Default)]
pub struct RaiseTaskDefinitionBuilder {
    fields: TaskDefinitionFields,
    error: Option<OneOf<ErrorDefinitionBuilder, String>>,
}

impl RaiseTaskDefinitionBuilder {
    task_definition_fields!();

    pub fn error(
        mut self,
        configure: impl FnOnce(ErrorDefinitionBuilder) -> ErrorDefinitionBuilder,
    ) -> Self {
        self.error = Some(OneOf::from_first(configure(ErrorDefinitionBuilder::default())));
        self
    }

    /// Raises an error declared under `use.errors`.
    pub fn error_reference(mut self, name: impl Into<String>) -> Self {
        self.error = Some(OneOf::from_second(name.into()));
        self
    }

    pub fn build(self) -> Result<TaskDefinition> {
        let raise = match self.error {
            None => return Err(DefinitionError::missing("RaiseTaskDefinition", "raise.error")),
            Some(OneOf::First(error)) => {
                let error = error
                    .into_definition()
                    .map_err(|e| e.within("raise.error"))?;
                error.validate("raise.error")?;
                RaiseTaskDefinition::error(error)
            }
            Some(OneOf::Second(name)) if name.trim().is_empty() => {
                return Err(DefinitionError::missing("RaiseTaskDefinition", "raise.error"));
            }
            Some(OneOf::Second(name)) => RaiseTaskDefinition::reference(name),
        };
        Ok(TaskDefinition::new(raise).with_fields(self.fields))
    }
}

impl_task_build!(RaiseTaskDefinitionBuilder);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::TaskKind;

    #[test]
    fn test_error_requires_type_and_status() {
        assert!(matches!(
            ErrorDefinitionBuilder::default().with_status(400).build(),
            Err(DefinitionError::MissingField { field, .. }) if field == "type"
        ));
        assert!(matches!(
            ErrorDefinitionBuilder::default().with_type("urn:oops").build(),
            Err(DefinitionError::MissingField { field, .. }) if field == "status"
        ));
        let error = ErrorDefinitionBuilder::default()
            .of(ErrorType::Timeout)
            .with_title("Took too long")
            .build()
            .unwrap();
        assert_eq!(error.status, 408);
        assert_eq!(error.error_type(), Some(ErrorType::Timeout));
    }

    #[test]
    fn test_error_status_range() {
        let err = ErrorDefinitionBuilder::default()
            .with_type("urn:oops")
            .with_status(42)
            .build()
            .unwrap_err();
        assert!(matches!(err, DefinitionError::InvalidFormat { field, .. } if field == "error.status"));
    }

    #[test]
    fn test_retry_policy_builder() {
        let policy = RetryPolicyDefinitionBuilder::default()
            .delay("PT1S")
            .exponential_backoff(Some(2.0))
            .max_attempts(5)
            .jitter("PT1S", "PT3S")
            .build()
            .unwrap();
        assert_eq!(policy.max_attempts(), Some(5));

        let bad = RetryPolicyDefinitionBuilder::default()
            .jitter("PT5S", "PT1S")
            .build()
            .unwrap_err();
        assert!(matches!(bad, DefinitionError::InvalidFormat { field, .. } if field == "retry.jitter"));
        assert!(RetryPolicyDefinitionBuilder::default().max_attempts(0).build().is_err());
    }

    #[test]
    fn test_timeout_builder() {
        assert!(matches!(
            TimeoutDefinitionBuilder::default().build(),
            Err(DefinitionError::MissingField { field, .. }) if field == "after"
        ));
        let timeout = TimeoutDefinitionBuilder::default().after("PT30S").build().unwrap();
        assert_eq!(timeout.after.to_millis(), Some(30_000));
    }

    #[test]
    fn test_catcher_builder() {
        let catcher = ErrorCatcherDefinitionBuilder::default()
            .errors_of_type("https://serverlessworkflow.io/spec/1.0.0/errors/communication")
            .errors_with_status(503)
            .retry(|r| r.delay("PT2S").max_attempts(3))
            .do_("notify", |t| t.call("notifyOps"))
            .build()
            .unwrap();
        let mut unavailable = ErrorDefinition::of(ErrorType::Communication);
        unavailable.status = 503;
        assert!(catcher.catches(&unavailable));
        assert!(!catcher.catches(&ErrorDefinition::of(ErrorType::Timeout)));
        assert_eq!(catcher.do_.len(), 1);
    }

    #[test]
    fn test_raise_builder() {
        assert!(matches!(
            TaskDefinitionBuilder.raise().build(),
            Err(DefinitionError::MissingField { field, .. }) if field == "raise.error"
        ));
        let task = TaskDefinitionBuilder
            .raise()
            .error(|e| e.of(ErrorType::Validation).with_detail("bad input"))
            .build()
            .unwrap();
        let TaskKind::Raise(raise) = &task.kind else {
            panic!("expected raise");
        };
        assert_eq!(raise.raise.error.first().map(|e| e.status), Some(400));

        let nested = TaskDefinitionBuilder
            .raise()
            .error(|e| e.with_type("urn:oops"))
            .build()
            .unwrap_err();
        assert!(matches!(
            nested,
            DefinitionError::MissingField { field, .. } if field == "raise.error.status"
        ));
    }
}

use super::duration::Duration;
use serde::{Deserialize, Serialize};
use swdsl_base::error::{DefinitionError, Result};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TimeoutDefinition {
    pub after: Duration,
}

impl TimeoutDefinition {
    pub fn after(duration: impl Into<Duration>) -> Self {
        Self {
            after: duration.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct ConstantBackoffDefinition {}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct ExponentialBackoffDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factor: Option<f64>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct LinearBackoffDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub increment: Option<Duration>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum RetryBackoffDefinition {
    Constant(ConstantBackoffDefinition),
    Exponential(ExponentialBackoffDefinition),
    Linear(LinearBackoffDefinition),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct RetryAttemptLimitDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<Duration>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct RetryPolicyLimitDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempt: Option<RetryAttemptLimitDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<Duration>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct JitterDefinition {
    pub from: Duration,
    pub to: Duration,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RetryPolicyDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub except_when: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<Duration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backoff: Option<RetryBackoffDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<RetryPolicyLimitDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jitter: Option<JitterDefinition>,
}

impl RetryPolicyDefinition {
    pub fn max_attempts(&self) -> Option<u32> {
        self.limit
            .as_ref()
            .and_then(|l| l.attempt.as_ref())
            .and_then(|a| a.count)
    }

    pub fn validate(&self, field: &str) -> Result<()> {
        if let Some(delay) = &self.delay {
            delay.validate(&format!("{field}.delay"))?;
        }
        if let Some(jitter) = &self.jitter {
            jitter.from.validate(&format!("{field}.jitter.from"))?;
            jitter.to.validate(&format!("{field}.jitter.to"))?;
            if let (Some(from), Some(to)) = (jitter.from.to_millis(), jitter.to.to_millis()) {
                if from > to {
                    return Err(DefinitionError::invalid_format(
                        format!("{field}.jitter"),
                        format!("{from}ms..{to}ms"),
                        "'from' must not exceed 'to'",
                    ));
                }
            }
        }
        Ok(())
    }
}

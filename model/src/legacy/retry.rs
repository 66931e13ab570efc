use serde::{Deserialize, Serialize};
use serde_json::Value;
use swdsl_base::OneOf;

/// Named retry strategy referenced by actions through `retryRef`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RetryDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_delay: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub increment: Option<String>,
    /// Number or numeric string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiplier: Option<OneOf<f64, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<OneOf<u32, String>>,
    /// Fraction of the delay (`0.1`) or an ISO 8601 duration (`PT0.1S`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jitter: Option<OneOf<f64, String>>,
}

impl RetryDefinition {
    pub fn max_attempts(&self) -> Option<u32> {
        match self.max_attempts.as_ref()? {
            OneOf::First(count) => Some(*count),
            OneOf::Second(text) => text.trim().parse().ok(),
        }
    }
}

/// Known error a workflow may handle in `onErrors`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ErrorDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Value of a `constants` collection.
pub type ConstantsDefinition = serde_json::Map<String, Value>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_max_attempts_as_number_or_string() {
        let numeric: RetryDefinition =
            serde_json::from_value(json!({"name": "r", "maxAttempts": 3, "multiplier": 1.5}))
                .unwrap();
        assert_eq!(numeric.max_attempts(), Some(3));
        let text: RetryDefinition =
            serde_json::from_value(json!({"name": "r", "maxAttempts": "5", "jitter": "PT0.1S"}))
                .unwrap();
        assert_eq!(text.max_attempts(), Some(5));
        assert!(text.jitter.as_ref().is_some_and(OneOf::is_second));
    }
}

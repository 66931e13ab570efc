use serde::{Deserialize, Serialize};
use std::fmt;

/// What happens after a task completes: `continue`, `exit`, `end`, or the
/// name of a sibling task to jump to.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[serde(from = "String", into = "String")]
pub enum FlowDirective {
    #[default]
    Continue,
    Exit,
    End,
    Goto(String),
}

impl FlowDirective {
    pub const CONTINUE: &'static str = "continue";
    pub const EXIT: &'static str = "exit";
    pub const END: &'static str = "end";

    pub fn goto(task: impl Into<String>) -> Self {
        FlowDirective::Goto(task.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            FlowDirective::Continue => Self::CONTINUE,
            FlowDirective::Exit => Self::EXIT,
            FlowDirective::End => Self::END,
            FlowDirective::Goto(task) => task,
        }
    }

    pub fn target(&self) -> Option<&str> {
        match self {
            FlowDirective::Goto(task) => Some(task),
            _ => None,
        }
    }
}

impl From<String> for FlowDirective {
    fn from(value: String) -> Self {
        match value.as_str() {
            Self::CONTINUE => FlowDirective::Continue,
            Self::EXIT => FlowDirective::Exit,
            Self::END => FlowDirective::End,
            _ => FlowDirective::Goto(value),
        }
    }
}

impl From<&str> for FlowDirective {
    fn from(value: &str) -> Self {
        value.to_string().into()
    }
}

impl From<FlowDirective> for String {
    fn from(value: FlowDirective) -> Self {
        match value {
            FlowDirective::Goto(task) => task,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for FlowDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_directive_strings() {
        let end: FlowDirective = serde_json::from_value(json!("end")).unwrap();
        assert_eq!(end, FlowDirective::End);
        let goto: FlowDirective = serde_json::from_value(json!("notifyUser")).unwrap();
        assert_eq!(goto.target(), Some("notifyUser"));
        assert_eq!(serde_json::to_value(&goto).unwrap(), json!("notifyUser"));
        assert_eq!(FlowDirective::Exit.to_string(), "exit");
    }
}

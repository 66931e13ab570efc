use crate::definition::duration::Duration;
use crate::definition::resource::ExternalResourceDefinition;
use serde::de::Error as _;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use strum_macros::{Display, EnumString};
use swdsl_base::EquatableMap;
use swdsl_base::error::{DefinitionError, Result};
use swdsl_base::object::{Object, from_object, into_object, single_kind, take_keys, to_object};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RunTaskDefinition {
    pub run: ProcessTypeDefinition,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProcessReturnType {
    Stdout,
    Stderr,
    Code,
    All,
    None,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContainerCleanupPolicy {
    #[default]
    Always,
    Never,
    Eventually,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ContainerLifetimeDefinition {
    pub cleanup: ContainerCleanupPolicy,
    /// Only meaningful with `eventually`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<Duration>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct ContainerProcessDefinition {
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "EquatableMap::is_empty")]
    pub ports: EquatableMap<String, Value>,
    #[serde(default, skip_serializing_if = "EquatableMap::is_empty")]
    pub volumes: EquatableMap<String, Value>,
    #[serde(default, skip_serializing_if = "EquatableMap::is_empty")]
    pub environment: EquatableMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifetime: Option<ContainerLifetimeDefinition>,
}

/// Script given inline (`code`) or loaded from `source`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct ScriptProcessDefinition {
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ExternalResourceDefinition>,
    #[serde(default, skip_serializing_if = "EquatableMap::is_empty")]
    pub arguments: EquatableMap<String, Value>,
    #[serde(default, skip_serializing_if = "EquatableMap::is_empty")]
    pub environment: EquatableMap<String, String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct ShellProcessDefinition {
    pub command: String,
    #[serde(default, skip_serializing_if = "EquatableMap::is_empty")]
    pub arguments: EquatableMap<String, Value>,
    #[serde(default, skip_serializing_if = "EquatableMap::is_empty")]
    pub environment: EquatableMap<String, String>,
}

/// Runs another workflow as a sub-process.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct WorkflowProcessDefinition {
    pub namespace: String,
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ProcessDefinition {
    Container(ContainerProcessDefinition),
    Script(ScriptProcessDefinition),
    Shell(ShellProcessDefinition),
    Workflow(WorkflowProcessDefinition),
}

impl ProcessDefinition {
    pub const KEYS: [&'static str; 4] = ["container", "script", "shell", "workflow"];

    pub fn key(&self) -> &'static str {
        match self {
            ProcessDefinition::Container(_) => "container",
            ProcessDefinition::Script(_) => "script",
            ProcessDefinition::Shell(_) => "shell",
            ProcessDefinition::Workflow(_) => "workflow",
        }
    }
}

/// `{ container | script | shell | workflow: {...}, await?, return? }`
#[derive(Clone, Debug, PartialEq)]
pub struct ProcessTypeDefinition {
    pub process: ProcessDefinition,
    pub await_: Option<bool>,
    pub return_: Option<ProcessReturnType>,
}

#[derive(Serialize, Deserialize, Default)]
struct ProcessOptions {
    #[serde(rename = "await", default, skip_serializing_if = "Option::is_none")]
    await_: Option<bool>,
    #[serde(rename = "return", default, skip_serializing_if = "Option::is_none")]
    return_: Option<ProcessReturnType>,
}

impl ProcessTypeDefinition {
    pub fn new(process: ProcessDefinition) -> Self {
        Self {
            process,
            await_: None,
            return_: None,
        }
    }

    pub fn from_value(node: Value) -> Result<Self> {
        let object = into_object(node, "ProcessTypeDefinition")?;
        let key = single_kind(&object, "process", &ProcessDefinition::KEYS)?;
        let (owned, rest) = take_keys(object, &[key]);
        let body = match owned.into_iter().next() {
            Some((_, body)) => into_object(body, key)?,
            None => return Err(DefinitionError::missing("ProcessTypeDefinition", key)),
        };
        let process = match key {
            "container" => ProcessDefinition::Container(from_object(body)?),
            "script" => ProcessDefinition::Script(from_object(body)?),
            "shell" => ProcessDefinition::Shell(from_object(body)?),
            _ => ProcessDefinition::Workflow(from_object(body)?),
        };
        let options: ProcessOptions = from_object(rest)?;
        Ok(Self {
            process,
            await_: options.await_,
            return_: options.return_,
        })
    }

    pub fn to_object(&self) -> Result<Object> {
        let body = match &self.process {
            ProcessDefinition::Container(p) => to_object(p, "ContainerProcessDefinition")?,
            ProcessDefinition::Script(p) => to_object(p, "ScriptProcessDefinition")?,
            ProcessDefinition::Shell(p) => to_object(p, "ShellProcessDefinition")?,
            ProcessDefinition::Workflow(p) => to_object(p, "WorkflowProcessDefinition")?,
        };
        let mut object = Object::new();
        object.insert(self.process.key().to_string(), Value::Object(body));
        let options = ProcessOptions {
            await_: self.await_,
            return_: self.return_,
        };
        for (key, value) in to_object(&options, "ProcessTypeDefinition")? {
            object.insert(key, value);
        }
        Ok(object)
    }
}

impl Serialize for ProcessTypeDefinition {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_object()
            .map_err(S::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ProcessTypeDefinition {
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
    fn test_process_shapes() {
        let run: RunTaskDefinition = serde_json::from_value(json!({
            "run": {
                "shell": {"command": "echo", "arguments": {"text": "hello"}},
                "await": false,
                "return": "stdout"
            }
        }))
        .unwrap();
        assert!(matches!(&run.run.process, ProcessDefinition::Shell(s) if s.command == "echo"));
        assert_eq!(run.run.await_, Some(false));
        assert_eq!(run.run.return_, Some(ProcessReturnType::Stdout));
        assert_eq!(
            serde_json::to_value(&run).unwrap(),
            json!({"run": {
                "shell": {"command": "echo", "arguments": {"text": "hello"}},
                "await": false,
                "return": "stdout"
            }})
        );
    }

    #[test]
    fn test_container_process() {
        let process = ProcessTypeDefinition::from_value(json!({
            "container": {
                "image": "alpine:latest",
                "environment": {"MODE": "batch"},
                "lifetime": {"cleanup": "eventually", "after": {"minutes": 5}}
            }
        }))
        .unwrap();
        let ProcessDefinition::Container(container) = &process.process else {
            panic!("expected container, got {process:?}");
        };
        assert_eq!(container.image, "alpine:latest");
        assert_eq!(
            container.lifetime.as_ref().map(|l| l.cleanup),
            Some(ContainerCleanupPolicy::Eventually)
        );
    }

    #[test]
    fn test_process_requires_one_kind() {
        let err = ProcessTypeDefinition::from_value(json!({
            "shell": {"command": "ls"},
            "script": {"language": "js", "code": "1"}
        }))
        .unwrap_err();
        assert!(matches!(err, DefinitionError::AmbiguousKind { .. }));
        let err = ProcessTypeDefinition::from_value(json!({"await": true})).unwrap_err();
        assert!(matches!(err, DefinitionError::AmbiguousKind { .. }));
    }
}

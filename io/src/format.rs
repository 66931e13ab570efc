use crate::error::Result;
use serde_json::Value;
use std::path::Path;
use strum_macros::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum WorkflowFormat {
    Json,
    #[default]
    Yaml,
}

impl WorkflowFormat {
    /// JSON when the first non-blank character opens an object or array,
    /// YAML otherwise.
    pub fn detect(text: &str) -> Self {
        match text.trim_start().chars().next() {
            Some('{') | Some('[') => WorkflowFormat::Json,
            _ => WorkflowFormat::Yaml,
        }
    }

    /// From the file extension; `None` for anything but json, yaml and yml.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "json" => Some(WorkflowFormat::Json),
            "yaml" | "yml" => Some(WorkflowFormat::Yaml),
            _ => None,
        }
    }

    /// Parses text into a document node.
    pub fn parse(self, text: &str) -> Result<Value> {
        Ok(match self {
            WorkflowFormat::Json => serde_json::from_str(text)?,
            WorkflowFormat::Yaml => serde_yaml::from_str(text)?,
        })
    }

    /// Parses text in whichever format it looks like.
    pub fn parse_detected(text: &str) -> Result<Value> {
        Self::detect(text).parse(text)
    }

    pub fn extension(self) -> &'static str {
        match self {
            WorkflowFormat::Json => "json",
            WorkflowFormat::Yaml => "yaml",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_detect() {
        assert_eq!(WorkflowFormat::detect("  {\"document\": {}}"), WorkflowFormat::Json);
        assert_eq!(WorkflowFormat::detect("\n[1, 2]"), WorkflowFormat::Json);
        assert_eq!(WorkflowFormat::detect("document:\n  name: a"), WorkflowFormat::Yaml);
        assert_eq!(WorkflowFormat::detect(""), WorkflowFormat::Yaml);
    }

    #[test]
    fn test_from_path_and_name() {
        assert_eq!(
            WorkflowFormat::from_path(Path::new("flows/order.YML")),
            Some(WorkflowFormat::Yaml)
        );
        assert_eq!(
            WorkflowFormat::from_path(Path::new("order.json")),
            Some(WorkflowFormat::Json)
        );
        assert_eq!(WorkflowFormat::from_path(Path::new("order.txt")), None);
        assert_eq!(WorkflowFormat::from_str("json").ok(), Some(WorkflowFormat::Json));
        assert_eq!(WorkflowFormat::Yaml.to_string(), "yaml");
    }
}

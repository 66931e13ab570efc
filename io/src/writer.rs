use crate::error::Result;
use crate::format::WorkflowFormat;
use serde::Serialize;
use swdsl_model::WorkflowDefinition;
use swdsl_model::legacy::LegacyWorkflowDefinition;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Writes workflow documents as pretty JSON or YAML.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkflowWriter;

impl WorkflowWriter {
    fn to_text<T: Serialize>(value: &T, format: WorkflowFormat) -> Result<String> {
        Ok(match format {
            WorkflowFormat::Json => serde_json::to_string_pretty(value)?,
            WorkflowFormat::Yaml => serde_yaml::to_string(value)?,
        })
    }

    pub fn write(&self, workflow: &WorkflowDefinition, format: WorkflowFormat) -> Result<String> {
        Self::to_text(workflow, format)
    }

    pub async fn write_to<W: AsyncWrite + Unpin>(
        &self,
        writer: &mut W,
        workflow: &WorkflowDefinition,
        format: WorkflowFormat,
    ) -> Result<()> {
        let text = self.write(workflow, format)?;
        writer.write_all(text.as_bytes()).await?;
        writer.flush().await?;
        Ok(())
    }

    pub fn write_legacy(
        &self,
        workflow: &LegacyWorkflowDefinition,
        format: WorkflowFormat,
    ) -> Result<String> {
        Self::to_text(workflow, format)
    }

    pub async fn write_legacy_to<W: AsyncWrite + Unpin>(
        &self,
        writer: &mut W,
        workflow: &LegacyWorkflowDefinition,
        format: WorkflowFormat,
    ) -> Result<()> {
        let text = self.write_legacy(workflow, format)?;
        writer.write_all(text.as_bytes()).await?;
        writer.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_formats() {
        let workflow = WorkflowDefinition::builder()
            .with_name("greet")
            .and_then(|b| b.with_version("0.1.0"))
            .unwrap()
            .do_("sayHello", |t| t.set().set("greeting", serde_json::json!("hi")))
            .build()
            .unwrap();
        let writer = WorkflowWriter;
        let yaml = writer.write(&workflow, WorkflowFormat::Yaml).unwrap();
        assert!(yaml.contains("name: greet"));
        assert!(yaml.contains("sayHello:"));
        let json = writer.write(&workflow, WorkflowFormat::Json).unwrap();
        assert!(json.trim_start().starts_with('{'));

        let mut out: Vec<u8> = Vec::new();
        writer
            .write_to(&mut out, &workflow, WorkflowFormat::Json)
            .await
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), json);
    }
}

use crate::error::{ReaderError, Result};
use crate::format::WorkflowFormat;
use async_trait::async_trait;
use serde_json::Value;

/// Checks a raw document node before it is converted into the model.
#[async_trait]
pub trait SchemaValidator: std::fmt::Debug + Send + Sync {
    async fn validate(&self, document: &Value) -> Result<()>;
}

/// Validates against a JSON Schema (draft detected from `$schema`).
pub struct JsonSchemaValidator {
    validator: jsonschema::Validator,
}

impl std::fmt::Debug for JsonSchemaValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonSchemaValidator").finish_non_exhaustive()
    }
}

impl JsonSchemaValidator {
    pub fn new(schema: &Value) -> Result<Self> {
        let validator = jsonschema::validator_for(schema)
            .map_err(|e| ReaderError::SchemaValidation(vec![format!("invalid schema: {}", e)]))?;
        Ok(Self { validator })
    }

    /// Schema given as JSON or YAML text.
    pub fn from_text(schema: &str) -> Result<Self> {
        Self::new(&WorkflowFormat::parse_detected(schema)?)
    }

    pub fn errors(&self, document: &Value) -> Vec<String> {
        self.validator
            .iter_errors(document)
            .map(|error| format!("Path: {}, Message: {}", error.instance_path, error))
            .collect()
    }
}

#[async_trait]
impl SchemaValidator for JsonSchemaValidator {
    async fn validate(&self, document: &Value) -> Result<()> {
        let errors = self.errors(document);
        if errors.is_empty() {
            return Ok(());
        }
        tracing::error!("workflow schema validation failed: {}", errors.join("; "));
        Err(ReaderError::SchemaValidation(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document_schema() -> Value {
        json!({
            "type": "object",
            "required": ["document", "do"],
            "properties": {
                "document": {
                    "type": "object",
                    "required": ["dsl", "namespace", "name", "version"]
                },
                "do": {"type": "array", "minItems": 1}
            }
        })
    }

    #[tokio::test]
    async fn test_validate_document() {
        let validator = JsonSchemaValidator::new(&document_schema()).unwrap();
        let valid = json!({
            "document": {"dsl": "1.0.0", "namespace": "default", "name": "greet", "version": "0.1.0"},
            "do": [{"hello": {"set": {"greeting": "hi"}}}]
        });
        assert!(validator.validate(&valid).await.is_ok());

        let invalid = json!({"document": {"dsl": "1.0.0"}, "do": []});
        let Err(ReaderError::SchemaValidation(errors)) = validator.validate(&invalid).await else {
            panic!("expected schema errors");
        };
        assert!(errors.len() >= 2);
        assert!(errors.iter().any(|e| e.contains("/document")));
    }

    #[test]
    fn test_from_yaml_text() {
        let validator =
            JsonSchemaValidator::from_text("type: object\nrequired: [document]\n").unwrap();
        assert_eq!(validator.errors(&json!({})).len(), 1);
        assert!(validator.errors(&json!({"document": {}})).is_empty());
    }
}

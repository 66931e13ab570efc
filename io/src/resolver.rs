use crate::error::{ReaderError, Result};
use crate::fetch::{ResourceFetcher, resolve_uri};
use crate::format::WorkflowFormat;
use crate::visit;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::sync::Arc;
use swdsl_base::OneOf;
use swdsl_model::WorkflowDefinition;
use swdsl_model::legacy::LegacyWorkflowDefinition;
use swdsl_model::legacy::start::DataInputSchemaDefinition;
use swdsl_model::legacy::workflow::Referenceable;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Replaces URI-valued parts of a workflow with the documents they point to.
///
/// Fields are fetched one at a time and written back by field, so the result
/// does not depend on fetch timing. Resolution runs on a copy: the caller gets
/// either the fully resolved workflow or an error, never a partial one.
pub struct ExternalReferenceResolver<F: ResourceFetcher + ?Sized> {
    fetcher: Arc<F>,
    base: Option<Url>,
}

impl<F: ResourceFetcher + ?Sized> Clone for ExternalReferenceResolver<F> {
    fn clone(&self) -> Self {
        Self {
            fetcher: self.fetcher.clone(),
            base: self.base.clone(),
        }
    }
}

impl<F: ResourceFetcher + ?Sized> ExternalReferenceResolver<F> {
    pub fn new(fetcher: Arc<F>, base: Option<Url>) -> Self {
        Self { fetcher, base }
    }

    pub fn base(&self) -> Option<&Url> {
        self.base.as_ref()
    }

    async fn fetch(&self, reference: &str, token: &CancellationToken) -> Result<Value> {
        if token.is_cancelled() {
            tracing::info!("reference resolution was cancelled before fetching {}", reference);
            return Err(ReaderError::Cancelled);
        }
        let uri = resolve_uri(reference, self.base.as_ref())?;
        tracing::debug!("resolving external reference: {}", uri);
        let text = tokio::select! {
            biased;
            _ = token.cancelled() => {
                tracing::info!("reference resolution was cancelled while fetching {}", uri);
                return Err(ReaderError::Cancelled);
            }
            text = self.fetcher.fetch(&uri) => text?,
        };
        WorkflowFormat::parse_detected(&text).inspect_err(|e| {
            tracing::error!("failed to parse external document {}: {:?}", uri, e)
        })
    }

    /// Inline value of a fetched collection: documents may hold it directly or
    /// nested under the field name.
    async fn fetch_field<T: DeserializeOwned>(
        &self,
        field: &str,
        reference: &str,
        token: &CancellationToken,
    ) -> Result<T> {
        let value = match self.fetch(reference, token).await? {
            Value::Object(mut obj) if obj.contains_key(field) => {
                obj.remove(field).unwrap_or(Value::Null)
            }
            other => other,
        };
        serde_json::from_value(value).map_err(|e| {
            tracing::error!("external {} at {} is malformed: {}", field, reference, e);
            ReaderError::fetch(reference, format!("{field}: {e}"))
        })
    }

    async fn resolve_field<T: DeserializeOwned>(
        &self,
        field: &str,
        slot: &mut Option<Referenceable<T>>,
        token: &CancellationToken,
    ) -> Result<()> {
        let Some(OneOf::Second(reference)) = slot.as_ref() else {
            return Ok(());
        };
        let resolved = self.fetch_field(field, reference, token).await?;
        *slot = Some(OneOf::First(resolved));
        Ok(())
    }

    async fn resolve_data_input_schema(
        &self,
        slot: &mut Option<Referenceable<DataInputSchemaDefinition>>,
        token: &CancellationToken,
    ) -> Result<()> {
        let resolved = match slot.as_ref() {
            None => return Ok(()),
            Some(OneOf::Second(reference)) => DataInputSchemaDefinition {
                schema: OneOf::First(self.fetch_field::<Map<String, Value>>("schema", reference, token).await?),
                fail_on_validation_errors: true,
            },
            Some(OneOf::First(definition)) => match &definition.schema {
                OneOf::First(_) => return Ok(()),
                OneOf::Second(reference) => DataInputSchemaDefinition {
                    schema: OneOf::First(self.fetch_field("schema", reference, token).await?),
                    fail_on_validation_errors: definition.fail_on_validation_errors,
                },
            },
        };
        *slot = Some(OneOf::First(resolved));
        Ok(())
    }

    /// Resolves the URI-valued collections of a legacy workflow.
    pub async fn resolve_legacy(
        &self,
        workflow: &LegacyWorkflowDefinition,
        token: &CancellationToken,
    ) -> Result<LegacyWorkflowDefinition> {
        let mut resolved = workflow.clone();
        self.resolve_data_input_schema(&mut resolved.data_input_schema, token)
            .await?;
        self.resolve_field("secrets", &mut resolved.secrets, token).await?;
        self.resolve_field("constants", &mut resolved.constants, token).await?;
        self.resolve_field("timeouts", &mut resolved.timeouts, token).await?;
        self.resolve_field("errors", &mut resolved.errors, token).await?;
        self.resolve_field("events", &mut resolved.events, token).await?;
        self.resolve_field("functions", &mut resolved.functions, token).await?;
        self.resolve_field("retries", &mut resolved.retries, token).await?;
        self.resolve_field("auth", &mut resolved.auth, token).await?;
        Ok(resolved)
    }

    /// Loads every external schema resource of a workflow inline, dropping
    /// its `resource`.
    pub async fn resolve_workflow(
        &self,
        workflow: &WorkflowDefinition,
        token: &CancellationToken,
    ) -> Result<WorkflowDefinition> {
        let mut node = serde_json::to_value(workflow)?;
        let schemas = visit::resource_positions(&node)
            .into_iter()
            .filter(|position| position.schema);
        for position in schemas {
            let Some(reference) = node
                .pointer(&position.pointer)
                .and_then(visit::resource_uri)
                .map(str::to_string)
            else {
                continue;
            };
            let document = self.fetch(&reference, token).await?;
            let schema_pointer = position
                .pointer
                .strip_suffix("/resource")
                .unwrap_or(&position.pointer);
            if let Some(Value::Object(schema)) = node.pointer_mut(schema_pointer) {
                schema.remove("resource");
                schema.insert("document".to_string(), document);
            }
        }
        Ok(serde_json::from_value(node)?)
    }
}

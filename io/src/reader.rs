use crate::config::{ReaderOptions, RelativeUriResolution};
use crate::error::{ReaderError, Result};
use crate::fetch::{HttpResourceFetcher, ResourceFetcher, directory_url};
use crate::format::WorkflowFormat;
use crate::resolver::ExternalReferenceResolver;
use crate::validator::SchemaValidator;
use crate::visit;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use swdsl_model::WorkflowDefinition;
use swdsl_model::legacy::LegacyWorkflowDefinition;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::sync::CancellationToken;
use url::Url;

type UriRewriter = Box<dyn FnMut(&str) -> Option<String> + Send>;

/// Reads workflow documents from text, streams or files.
///
/// After parsing, the raw node goes through the optional schema validator,
/// relative external resource URIs are rewritten per
/// [`ReaderOptions::relative_uri_resolution`], and with
/// `load_external_definitions` the external references are resolved.
pub struct WorkflowReader<F: ResourceFetcher + ?Sized = HttpResourceFetcher> {
    options: ReaderOptions,
    fetcher: Arc<F>,
    validator: Option<Arc<dyn SchemaValidator>>,
}

impl WorkflowReader<HttpResourceFetcher> {
    /// Reader with the default fetcher; only local files are fetched.
    pub fn local(options: ReaderOptions) -> Self {
        Self::new(options, Arc::new(HttpResourceFetcher::new_local_only()))
    }
}

impl<F: ResourceFetcher + ?Sized> WorkflowReader<F> {
    pub fn new(options: ReaderOptions, fetcher: Arc<F>) -> Self {
        Self {
            options,
            fetcher,
            validator: None,
        }
    }

    pub fn with_validator(mut self, validator: Arc<dyn SchemaValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    /// Base every relative reference is resolved against: `base_uri` first,
    /// then `base_directory`.
    pub fn base_url(&self) -> Result<Option<Url>> {
        if let Some(base_uri) = self.options.base_uri.as_deref() {
            return Url::parse(base_uri)
                .map(Some)
                .map_err(|e| ReaderError::InvalidUri {
                    uri: base_uri.to_string(),
                    reason: e.to_string(),
                });
        }
        self.options
            .base_directory
            .as_deref()
            .map(directory_url)
            .transpose()
    }

    pub fn resolver(&self) -> Result<ExternalReferenceResolver<F>> {
        Ok(ExternalReferenceResolver::new(
            self.fetcher.clone(),
            self.base_url()?,
        ))
    }

    fn relative_uri_rewriter(&self) -> Result<Option<UriRewriter>> {
        let rewriter: UriRewriter = match self.options.relative_uri_resolution {
            RelativeUriResolution::None => return Ok(None),
            RelativeUriResolution::ConvertToAbsolute => {
                let Some(base) = self.base_url()? else {
                    return Ok(None);
                };
                Box::new(move |uri: &str| base.join(uri).ok().map(|u| u.to_string()))
            }
            RelativeUriResolution::ConvertToRelativeFilePath => {
                let Some(dir) = self.options.base_directory.clone() else {
                    return Ok(None);
                };
                Box::new(move |uri: &str| Some(dir.join(uri).to_string_lossy().into_owned()))
            }
        };
        Ok(Some(rewriter))
    }

    async fn load_node(&self, text: &str, format: WorkflowFormat) -> Result<Value> {
        let node = format.parse(text)?;
        if let Some(validator) = &self.validator {
            validator.validate(&node).await?;
        }
        Ok(node)
    }

    pub async fn read_str(&self, text: &str, format: WorkflowFormat) -> Result<WorkflowDefinition> {
        self.read_str_with(text, format, &CancellationToken::new())
            .await
    }

    /// As [`read_str`](Self::read_str); `token` aborts external reference
    /// resolution.
    pub async fn read_str_with(
        &self,
        text: &str,
        format: WorkflowFormat,
        token: &CancellationToken,
    ) -> Result<WorkflowDefinition> {
        let mut node = self.load_node(text, format).await?;
        if let Some(mut rewrite) = self.relative_uri_rewriter()? {
            visit::rewrite_resource_uris(&mut node, &mut *rewrite);
        }
        let workflow: WorkflowDefinition = serde_json::from_value(node)?;
        tracing::debug!(
            "read workflow {}.{}:{}",
            workflow.document.namespace,
            workflow.document.name,
            workflow.document.version
        );
        if self.options.load_external_definitions {
            return self.resolver()?.resolve_workflow(&workflow, token).await;
        }
        Ok(workflow)
    }

    /// Reads a whole stream; the format is detected from its content.
    pub async fn read<R: AsyncRead + Unpin>(&self, reader: &mut R) -> Result<WorkflowDefinition> {
        let mut text = String::new();
        reader.read_to_string(&mut text).await?;
        self.read_str(&text, WorkflowFormat::detect(&text)).await
    }

    /// Reads a file, picking the format from its extension (content otherwise).
    pub async fn read_file(&self, path: impl AsRef<Path>) -> Result<WorkflowDefinition> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path).await?;
        let format = WorkflowFormat::from_path(path).unwrap_or_else(|| WorkflowFormat::detect(&text));
        self.read_str(&text, format).await
    }

    pub async fn read_legacy_str(
        &self,
        text: &str,
        format: WorkflowFormat,
    ) -> Result<LegacyWorkflowDefinition> {
        self.read_legacy_str_with(text, format, &CancellationToken::new())
            .await
    }

    pub async fn read_legacy_str_with(
        &self,
        text: &str,
        format: WorkflowFormat,
        token: &CancellationToken,
    ) -> Result<LegacyWorkflowDefinition> {
        let mut node = self.load_node(text, format).await?;
        if let Some(mut rewrite) = self.relative_uri_rewriter()? {
            visit::rewrite_legacy_uris(&mut node, &mut *rewrite);
        }
        let workflow: LegacyWorkflowDefinition = serde_json::from_value(node)?;
        tracing::debug!("read legacy workflow {} ({} states)", workflow.name, workflow.states.len());
        if self.options.load_external_definitions {
            return self.resolver()?.resolve_legacy(&workflow, token).await;
        }
        Ok(workflow)
    }

    pub async fn read_legacy<R: AsyncRead + Unpin>(
        &self,
        reader: &mut R,
    ) -> Result<LegacyWorkflowDefinition> {
        let mut text = String::new();
        reader.read_to_string(&mut text).await?;
        self.read_legacy_str(&text, WorkflowFormat::detect(&text)).await
    }
}

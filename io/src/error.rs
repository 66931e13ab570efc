use swdsl_base::DefinitionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReaderError {
    #[error("Definition({0})")]
    Definition(#[from] DefinitionError),
    #[error("Json({0})")]
    Json(#[from] serde_json::Error),
    #[error("Yaml({0})")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Io({0})")]
    Io(#[from] std::io::Error),
    #[error("InvalidUri: '{uri}' ({reason})")]
    InvalidUri { uri: String, reason: String },
    #[error("UnsupportedScheme: '{scheme}' in {uri}, supported schemes: file, http, https")]
    UnsupportedScheme { scheme: String, uri: String },
    #[error("RestrictedAddress: {0} points to localhost, a private address or a metadata service")]
    RestrictedAddress(String),
    #[error("TooLarge: {uri} exceeds {max} bytes")]
    TooLarge { uri: String, max: usize },
    #[error("Fetch: {uri} ({reason})")]
    Fetch { uri: String, reason: String },
    #[error("SchemaValidation: {}", .0.join("; "))]
    SchemaValidation(Vec<String>),
    #[error("Cancelled: reference resolution was cancelled")]
    Cancelled,
}

impl ReaderError {
    pub fn fetch(uri: impl ToString, reason: impl ToString) -> Self {
        Self::Fetch {
            uri: uri.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

pub type Result<T> = std::result::Result<T, ReaderError>;

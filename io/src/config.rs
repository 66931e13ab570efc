use anyhow::{Result, anyhow};
use serde::Deserialize;
use std::path::PathBuf;

/// How relative external resource URIs are rewritten after reading.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RelativeUriResolution {
    /// Resolved against `base_uri`, else against `base_directory`.
    #[default]
    ConvertToAbsolute,
    /// Joined onto `base_directory` as a plain file path.
    ConvertToRelativeFilePath,
    None,
}

/// Reader settings, read from `WORKFLOW_READER_*` variables.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ReaderOptions {
    #[serde(default)]
    pub base_uri: Option<String>,
    #[serde(default)]
    pub base_directory: Option<PathBuf>,
    #[serde(default)]
    pub relative_uri_resolution: RelativeUriResolution,
    #[serde(default)]
    pub load_external_definitions: bool,
}

impl ReaderOptions {
    pub fn from_env() -> Result<Self> {
        envy::prefixed("WORKFLOW_READER_")
            .from_env::<ReaderOptions>()
            .map_err(|e| anyhow!("failed to load reader options from env: {}", e))
    }

    pub fn with_base_uri(mut self, base_uri: impl Into<String>) -> Self {
        self.base_uri = Some(base_uri.into());
        self
    }

    pub fn with_base_directory(mut self, base_directory: impl Into<PathBuf>) -> Self {
        self.base_directory = Some(base_directory.into());
        self
    }

    pub fn with_relative_uri_resolution(mut self, resolution: RelativeUriResolution) -> Self {
        self.relative_uri_resolution = resolution;
        self
    }

    pub fn load_external_definitions(mut self, load: bool) -> Self {
        self.load_external_definitions = load;
        self
    }
}

fn default_max_size() -> usize {
    10 * 1024 * 1024
}

fn default_timeout_sec() -> u64 {
    30
}

/// Settings of the default fetcher, read from `WORKFLOW_FETCH_*`.
#[derive(Deserialize, Debug, Clone)]
pub struct FetchConfig {
    #[serde(default = "default_max_size")]
    pub max_size: usize,
    #[serde(default = "default_timeout_sec")]
    pub timeout_sec: u64,
    /// Lifts the guard against localhost, private and metadata addresses.
    #[serde(default)]
    pub allow_private_addresses: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_size: default_max_size(),
            timeout_sec: default_timeout_sec(),
            allow_private_addresses: false,
        }
    }
}

impl FetchConfig {
    pub fn from_env() -> Result<Self> {
        envy::prefixed("WORKFLOW_FETCH_")
            .from_env::<FetchConfig>()
            .map_err(|e| anyhow!("failed to load fetch config from env: {}", e))
    }
}

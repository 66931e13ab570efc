use anyhow::{Result, anyhow};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
}

/// Logging settings, read from `LOG_LEVEL` / `LOG_FORMAT` / `LOG_ANSI`.
#[derive(Deserialize, Debug, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
    #[serde(default)]
    pub ansi: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
            ansi: false,
        }
    }
}

pub fn load_tracing_config_from_env() -> Result<LoggingConfig> {
    envy::prefixed("LOG_")
        .from_env::<LoggingConfig>()
        .map_err(|e| anyhow!("failed to load logging config from env: {}", e))
}

/// Installs the global subscriber. `RUST_LOG` overrides `conf.level`.
pub fn tracing_init(conf: LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&conf.level))
        .map_err(|e| anyhow!("invalid log level '{}': {}", conf.level, e))?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(conf.ansi)
        .with_target(true);
    match conf.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Plain => builder.try_init(),
    }
    .map_err(|e| anyhow!("failed to initialize tracing subscriber: {}", e))
}

/// Subscriber for tests; repeated calls are ignored.
pub fn tracing_init_test(level: tracing::Level) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let conf = LoggingConfig::default();
        assert_eq!(conf.level, "info");
        assert_eq!(conf.format, LogFormat::Plain);
        assert!(!conf.ansi);
    }

    #[test]
    fn test_init_test_is_idempotent() {
        tracing_init_test(tracing::Level::DEBUG);
        tracing_init_test(tracing::Level::DEBUG);
        tracing::debug!("logging initialized twice");
    }
}

#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::core::{ConfigProvider, SourceSpec};
use crate::utils::error::{MeshError, Result};
use crate::utils::validation::{validate_path, validate_positive_number, validate_url, Validate};
use std::collections::BTreeMap;
use toml_config::TomlConfig;

/// 合併 TOML 檔與命令列參數後的最終設定
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub source: Option<SourceSpec>,
    pub timeout_seconds: u64,
    pub retry_attempts: u32,
    pub retry_delay_seconds: u64,
    pub headers: BTreeMap<String, String>,
    pub sort_by_hops: bool,
    pub compact: bool,
    pub utc: bool,
    pub highlight: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source: None,
            timeout_seconds: 10,
            retry_attempts: 0,
            retry_delay_seconds: 1,
            headers: BTreeMap::new(),
            sort_by_hops: false,
            compact: true,
            utc: false,
            highlight: true,
        }
    }
}

impl AppConfig {
    pub fn from_toml(toml: &TomlConfig) -> Result<Self> {
        toml.validate()?;
        let mut config = Self::default();

        if let Some(source) = &toml.source {
            config.source = match source.r#type.as_str() {
                "file" => source.path.clone().map(|path| SourceSpec::File { path }),
                "http" => source
                    .endpoint
                    .clone()
                    .map(|endpoint| SourceSpec::Http { endpoint }),
                other => {
                    return Err(MeshError::ConfigError {
                        message: format!("unknown source type '{}'", other),
                    })
                }
            };
            config.timeout_seconds = source.timeout_seconds.unwrap_or(config.timeout_seconds);
            config.retry_attempts = source.retry_attempts.unwrap_or(config.retry_attempts);
            config.retry_delay_seconds = source
                .retry_delay_seconds
                .unwrap_or(config.retry_delay_seconds);
            config.headers = source.headers.clone().unwrap_or_default();
        }

        if let Some(display) = &toml.display {
            config.compact = display.compact.unwrap_or(config.compact);
            config.utc = display.utc.unwrap_or(config.utc);
            config.highlight = display.highlight.unwrap_or(config.highlight);
        }
        config.sort_by_hops = toml.sort_by_hops().unwrap_or(config.sort_by_hops);

        Ok(config)
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        match &self.source {
            Some(SourceSpec::File { path }) => validate_path("source.path", path)?,
            Some(SourceSpec::Http { endpoint }) => validate_url("source.endpoint", endpoint)?,
            None => {
                return Err(MeshError::MissingConfigError {
                    field: "source (use --file, --url or --config)".to_string(),
                })
            }
        }
        validate_positive_number("timeout_seconds", self.timeout_seconds, 1)
    }
}

impl ConfigProvider for AppConfig {
    fn sort_by_hops(&self) -> bool {
        self.sort_by_hops
    }

    fn compact(&self) -> bool {
        self.compact
    }

    fn use_utc(&self) -> bool {
        self.utc
    }

    fn highlight(&self) -> bool {
        self.highlight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_compact_recency_view() {
        let config = AppConfig::default();
        assert!(config.compact());
        assert!(!config.sort_by_hops());
        assert!(config.highlight());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_toml() {
        let toml = TomlConfig::from_toml_str(
            r#"
[source]
type = "file"
path = "nodes.json"

[display]
sort_by = "hops"
compact = false
"#,
        )
        .unwrap();

        let config = AppConfig::from_toml(&toml).unwrap();
        assert_eq!(
            config.source,
            Some(SourceSpec::File {
                path: "nodes.json".to_string()
            })
        );
        assert!(config.sort_by_hops);
        assert!(!config.compact);
        assert!(config.validate().is_ok());
    }
}

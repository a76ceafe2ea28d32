use crate::utils::error::{MeshError, Result};
use crate::utils::validation::{
    validate_one_of, validate_path, validate_positive_number, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const SOURCE_TYPES: [&str; 2] = ["file", "http"];
pub const SORT_KEYS: [&str; 2] = ["recency", "hops"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub source: Option<SourceConfig>,
    pub display: Option<DisplayConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub r#type: String,
    pub path: Option<String>,
    pub endpoint: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub retry_attempts: Option<u32>,
    pub retry_delay_seconds: Option<u64>,
    pub headers: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub compact: Option<bool>,
    pub sort_by: Option<String>,
    pub utc: Option<bool>,
    pub highlight: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| MeshError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${MESH_TOKEN})；未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| MeshError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn sort_by_hops(&self) -> Option<bool> {
        self.display
            .as_ref()
            .and_then(|d| d.sort_by.as_deref())
            .map(|key| key == "hops")
    }

    pub fn validate_config(&self) -> Result<()> {
        if let Some(source) = &self.source {
            validate_one_of("source.type", &source.r#type, &SOURCE_TYPES)?;
            match source.r#type.as_str() {
                "file" => {
                    let path = source.path.as_deref().ok_or_else(|| {
                        MeshError::MissingConfigError {
                            field: "source.path".to_string(),
                        }
                    })?;
                    validate_path("source.path", path)?;
                }
                _ => {
                    let endpoint = source.endpoint.as_deref().ok_or_else(|| {
                        MeshError::MissingConfigError {
                            field: "source.endpoint".to_string(),
                        }
                    })?;
                    validate_url("source.endpoint", endpoint)?;
                }
            }
            if let Some(timeout) = source.timeout_seconds {
                validate_positive_number("source.timeout_seconds", timeout, 1)?;
            }
        }

        if let Some(sort_by) = self.display.as_ref().and_then(|d| d.sort_by.as_deref()) {
            validate_one_of("display.sort_by", sort_by, &SORT_KEYS)?;
        }

        Ok(())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

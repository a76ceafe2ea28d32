use crate::config::toml_config::TomlConfig;
use crate::config::AppConfig;
use crate::core::SourceSpec;
use crate::utils::error::Result;
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "mesh-nodes")]
#[command(about = "Query a Meshtastic node inventory and print it as a table")]
pub struct CliConfig {
    /// JSON snapshot of the node list on disk
    #[arg(long, conflicts_with = "url")]
    pub file: Option<String>,

    /// HTTP endpoint returning the node list as JSON
    #[arg(long)]
    pub url: Option<String>,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(long, help = "Sort rows by hopsAway instead of last heard time")]
    pub sort_hop: bool,

    #[arg(long, help = "Show every observed field instead of the compact column set")]
    pub no_compact: bool,

    #[arg(long, help = "Render timestamps in UTC instead of local time")]
    pub utc: bool,

    #[arg(long, help = "Disable row highlighting")]
    pub no_color: bool,

    #[arg(long, help = "HTTP timeout in seconds")]
    pub timeout: Option<u64>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON on stderr")]
    pub log_json: bool,
}

impl CliConfig {
    /// 載入 TOML（若有），再以命令列參數覆蓋
    pub fn resolve(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path);
                AppConfig::from_toml(&TomlConfig::from_file(path)?)?
            }
            None => AppConfig::default(),
        };

        if let Some(path) = &self.file {
            config.source = Some(SourceSpec::File { path: path.clone() });
        } else if let Some(endpoint) = &self.url {
            config.source = Some(SourceSpec::Http {
                endpoint: endpoint.clone(),
            });
        }

        if self.sort_hop {
            config.sort_by_hops = true;
        }
        if self.no_compact {
            config.compact = false;
        }
        if self.utc {
            config.utc = true;
        }
        if self.no_color {
            config.highlight = false;
        }
        if let Some(timeout) = self.timeout {
            config.timeout_seconds = timeout;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_flags_map_to_config() {
        let cli = CliConfig::parse_from([
            "mesh-nodes",
            "--url",
            "http://10.0.0.5/json/nodes",
            "--sort-hop",
            "--no-compact",
        ]);
        let config = cli.resolve().unwrap();

        assert_eq!(
            config.source,
            Some(SourceSpec::Http {
                endpoint: "http://10.0.0.5/json/nodes".to_string()
            })
        );
        assert!(config.sort_by_hops);
        assert!(!config.compact);
        assert!(config.highlight);
    }

    #[test]
    fn test_file_and_url_conflict() {
        let result = CliConfig::try_parse_from([
            "mesh-nodes",
            "--file",
            "nodes.json",
            "--url",
            "http://10.0.0.5/json/nodes",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_overrides_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[source]\ntype = \"file\"\npath = \"from-toml.json\"\n\n[display]\nhighlight = true\nsort_by = \"recency\""
        )
        .unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let cli = CliConfig::parse_from([
            "mesh-nodes",
            "--config",
            path.as_str(),
            "--file",
            "from-cli.json",
            "--no-color",
            "--timeout",
            "3",
        ]);
        let config = cli.resolve().unwrap();

        assert_eq!(
            config.source,
            Some(SourceSpec::File {
                path: "from-cli.json".to_string()
            })
        );
        assert!(!config.highlight);
        assert!(!config.sort_by_hops);
        assert_eq!(config.timeout_seconds, 3);
    }
}

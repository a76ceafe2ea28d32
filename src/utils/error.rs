use thiserror::Error;

#[derive(Error, Debug)]
pub enum MeshError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}': {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Node source error: {message}")]
    SourceError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// CLI 結束時使用的退出碼
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl MeshError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            MeshError::ConfigError { .. }
            | MeshError::InvalidConfigValueError { .. }
            | MeshError::MissingConfigError { .. } => ErrorCategory::Configuration,
            MeshError::ApiError(_) => ErrorCategory::Network,
            MeshError::SerializationError(_) | MeshError::SourceError { .. } => ErrorCategory::Data,
            MeshError::IoError(_) => ErrorCategory::System,
        }
    }

    /// 決定 CLI 的退出碼
    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration | ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            MeshError::ApiError(e) if e.is_timeout() => {
                "The node did not answer in time; raise --timeout or check the link"
            }
            MeshError::ApiError(_) => "Check that the node is reachable and the URL is correct",
            MeshError::IoError(_) => "Check the file path and permissions",
            MeshError::SerializationError(_) => "Make sure the snapshot is valid JSON",
            MeshError::ConfigError { .. }
            | MeshError::InvalidConfigValueError { .. }
            | MeshError::MissingConfigError { .. } => {
                "Review the command line flags or the TOML configuration file"
            }
            MeshError::SourceError { .. } => {
                "Expected a JSON object keyed by node id, or an array of node records"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            MeshError::ApiError(e) => match e.url() {
                Some(url) => format!("Could not fetch the node list from {}", url),
                None => "Could not fetch the node list".to_string(),
            },
            MeshError::IoError(e) => format!("File access failed: {}", e),
            MeshError::SerializationError(e) => {
                format!("The node snapshot is not valid JSON: {}", e)
            }
            MeshError::MissingConfigError { field } => {
                format!("Missing setting '{}'", field)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MeshError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_are_high_severity() {
        let err = MeshError::InvalidConfigValueError {
            field: "display.sort_by".to_string(),
            value: "name".to_string(),
            reason: "unknown sort key".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert_eq!(err.severity().exit_code(), 1);
        assert!(err.to_string().contains("display.sort_by"));
    }

    #[test]
    fn test_io_errors_are_critical() {
        let err = MeshError::from(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "closed",
        ));
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert_eq!(err.severity().exit_code(), 3);
        assert!(err.user_friendly_message().contains("closed"));
    }

    #[test]
    fn test_every_severity_exits_non_zero() {
        for severity in [
            ErrorSeverity::Medium,
            ErrorSeverity::High,
            ErrorSeverity::Critical,
        ] {
            assert_ne!(severity.exit_code(), 0, "{:?}", severity);
        }
        assert_eq!(ErrorSeverity::Medium.exit_code(), 2);
    }
}

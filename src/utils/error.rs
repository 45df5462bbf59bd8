use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolverError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Backend error: {message}")]
    BackendError { message: String },

    #[error("Walk simulation error: {message}")]
    WalkError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Data,
    Input,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ResolverError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ResolverError::ApiError(_) | ResolverError::BackendError { .. } => {
                ErrorCategory::Network
            }
            ResolverError::ConfigError { .. }
            | ResolverError::ConfigValidationError { .. }
            | ResolverError::InvalidConfigValueError { .. }
            | ResolverError::MissingConfigError { .. } => ErrorCategory::Configuration,
            ResolverError::CsvError(_)
            | ResolverError::SerializationError(_)
            | ResolverError::WalkError { .. } => ErrorCategory::Data,
            ResolverError::ValidationError { .. } => ErrorCategory::Input,
            ResolverError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 網路錯誤通常重試即可
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Input | ErrorCategory::Data => {
                ErrorSeverity::High
            }
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ResolverError::ApiError(e) if e.is_timeout() => {
                "Increase api.timeout_seconds or check the ledger service latency"
            }
            ResolverError::ApiError(_) | ResolverError::BackendError { .. } => {
                "Check network connectivity and that api.base_url points at a running ledger"
            }
            ResolverError::ConfigError { .. }
            | ResolverError::ConfigValidationError { .. }
            | ResolverError::InvalidConfigValueError { .. }
            | ResolverError::MissingConfigError { .. } => {
                "Review the configuration file and command line flags"
            }
            ResolverError::WalkError { .. } => {
                "The backend must return a flow-rules path; try another start coordinate"
            }
            ResolverError::ValidationError { .. } => "Check the coordinate and hop count",
            ResolverError::CsvError(_) | ResolverError::SerializationError(_) => {
                "The backend response could not be processed; rerun with --verbose"
            }
            ResolverError::IoError(_) => "Check file permissions and available disk space",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ResolverError::ApiError(e) if e.is_connect() => {
                "Could not connect to the ledger API".to_string()
            }
            ResolverError::ApiError(e) if e.is_timeout() => {
                "The ledger API did not answer in time".to_string()
            }
            ResolverError::ValidationError { message }
            | ResolverError::WalkError { message }
            | ResolverError::BackendError { message } => message.clone(),
            other => other.to_string(),
        }
    }

    /// 對應 CLI 的結束碼；Low 視為成功
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl From<toml::de::Error> for ResolverError {
    fn from(e: toml::de::Error) -> Self {
        ResolverError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        }
    }
}

pub type Result<T> = std::result::Result<T, ResolverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_maps_to_exit_code() {
        let walk = ResolverError::WalkError {
            message: "no path".to_string(),
        };
        assert_eq!(walk.category(), ErrorCategory::Data);
        assert_eq!(walk.exit_code(), 1);

        let backend = ResolverError::BackendError {
            message: "503".to_string(),
        };
        assert_eq!(backend.severity(), ErrorSeverity::Medium);
        assert_eq!(backend.exit_code(), 2);

        let io = ResolverError::IoError(std::io::Error::other("disk"));
        assert_eq!(io.exit_code(), 3);
    }

    #[test]
    fn test_user_friendly_message_passes_through_validation_text() {
        let e = ResolverError::ValidationError {
            message: "Please enter a coordinate.".to_string(),
        };
        assert_eq!(e.user_friendly_message(), "Please enter a coordinate.");
    }
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifierError {
    #[error("HTTP request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {status} from {url}")]
    HttpStatusError { url: String, status: u16 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Summary generation failed: {message}")]
    SummaryError { message: String },

    #[error("Notification delivery failed: {message}")]
    DeliveryError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl NotifierError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            NotifierError::SummaryError { .. } => ErrorSeverity::Low,
            NotifierError::ApiError(_)
            | NotifierError::HttpStatusError { .. }
            | NotifierError::DeliveryError { .. } => ErrorSeverity::High,
            NotifierError::ConfigError { .. }
            | NotifierError::MissingConfigError { .. }
            | NotifierError::InvalidConfigValueError { .. }
            | NotifierError::TomlError(_) => ErrorSeverity::Critical,
            NotifierError::IoError(_) | NotifierError::SerializationError(_) => {
                ErrorSeverity::Medium
            }
        }
    }

    /// Process exit code for a run that ended with this error.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium | ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 2,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            NotifierError::ApiError(_) | NotifierError::HttpStatusError { .. } => {
                "Check network access and that GITHUB_TOKEN is valid if the API is rate limiting"
            }
            NotifierError::DeliveryError { .. } => {
                "Verify SLACK_WEBHOOK_URL points to an active incoming webhook"
            }
            NotifierError::MissingConfigError { .. } => {
                "Set the variable in the environment or in the .env file"
            }
            NotifierError::ConfigError { .. }
            | NotifierError::InvalidConfigValueError { .. }
            | NotifierError::TomlError(_) => "Fix the configuration value and run again",
            NotifierError::IoError(_) => "Check that the state directory is writable",
            NotifierError::SerializationError(_) => {
                "Delete the state file to start from an empty state"
            }
            NotifierError::SummaryError { .. } => "Check the AI provider key and model name",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            NotifierError::MissingConfigError { field } => {
                format!("{} is required", field)
            }
            NotifierError::DeliveryError { .. } => {
                "Could not post the release notification".to_string()
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, NotifierError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_webhook_exits_with_config_code() {
        let err = NotifierError::MissingConfigError {
            field: "SLACK_WEBHOOK_URL".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.user_friendly_message(), "SLACK_WEBHOOK_URL is required");
    }

    #[test]
    fn test_delivery_failure_exits_with_one() {
        let err = NotifierError::DeliveryError {
            message: "status 500".to_string(),
        };
        assert_eq!(err.exit_code(), 1);
    }
}

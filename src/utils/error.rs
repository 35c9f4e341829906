use thiserror::Error;

#[derive(Error, Debug)]
pub enum PortfolioError {
    #[error("Repository listing unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Repository listing rate limited (retry after: {retry_after_seconds:?}s)")]
    RateLimited { retry_after_seconds: Option<u64> },

    #[error("Repository source error: {message}")]
    SourceError { message: String },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("A submission is already in progress for this form")]
    SubmissionInFlight,

    #[error("Mail transport error: {message}")]
    MailError { message: String },
}

/// 錯誤分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Configuration,
    Transport,
    Policy,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

pub const UNAUTHORIZED_MESSAGE: &str =
    "GitHub rejected the access token. Please check the configured token.";
pub const RATE_LIMITED_MESSAGE: &str =
    "GitHub API rate limit exceeded. Please try again later or configure an access token.";
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch repositories";

impl PortfolioError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ValidationError { .. } | Self::SubmissionInFlight => ErrorCategory::Validation,
            Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::ConfigValidationError { .. } => ErrorCategory::Configuration,
            Self::Unauthorized { .. } | Self::RateLimited { .. } => ErrorCategory::Policy,
            Self::SourceError { .. } | Self::ApiError(_) | Self::MailError { .. } => {
                ErrorCategory::Transport
            }
            Self::IoError(_) | Self::SerializationError(_) => ErrorCategory::Internal,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Validation => ErrorSeverity::Low,
            ErrorCategory::Policy | ErrorCategory::Transport => {
                if matches!(self, Self::Unauthorized { .. }) {
                    ErrorSeverity::High
                } else {
                    ErrorSeverity::Medium
                }
            }
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Internal => ErrorSeverity::Critical,
        }
    }

    /// 給終端使用者看的固定訊息，不包含外部服務的原始內容
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::Unauthorized { .. } => UNAUTHORIZED_MESSAGE.to_string(),
            Self::RateLimited { .. } => RATE_LIMITED_MESSAGE.to_string(),
            Self::SourceError { .. } | Self::ApiError(_) => FETCH_FAILED_MESSAGE.to_string(),
            Self::ValidationError { message } => message.clone(),
            Self::SubmissionInFlight => "Your message is already being sent.".to_string(),
            Self::MailError { .. } => "Failed to send email. Please try again later.".to_string(),
            Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::ConfigValidationError { .. } => {
                "The service is not configured correctly.".to_string()
            }
            Self::IoError(_) | Self::SerializationError(_) => {
                "An unexpected error occurred".to_string()
            }
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::Unauthorized { .. } => {
                "Generate a new token or unset GITHUB_TOKEN to use unauthenticated access"
                    .to_string()
            }
            Self::RateLimited {
                retry_after_seconds: Some(secs),
            } => format!("Retry in {} seconds or configure GITHUB_TOKEN", secs),
            Self::RateLimited { .. } => "Retry later or configure GITHUB_TOKEN".to_string(),
            Self::SourceError { .. } | Self::ApiError(_) => {
                "Check network connectivity and the API base URL".to_string()
            }
            Self::MissingConfigError { field } => format!("Provide a value for '{}'", field),
            Self::InvalidConfigValueError { field, .. }
            | Self::ConfigValidationError { field, .. } => {
                format!("Fix the '{}' setting in the configuration", field)
            }
            Self::ValidationError { .. } => "Correct the input and submit again".to_string(),
            Self::SubmissionInFlight => "Wait for the current submission to finish".to_string(),
            Self::MailError { .. } => "Resubmit the form in a moment".to_string(),
            Self::IoError(_) | Self::SerializationError(_) => {
                "Run again with --verbose and inspect the logs".to_string()
            }
        }
    }

    /// 速率限制與寄信失敗可以稍後重試，其餘錯誤重試也不會改變結果
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::MailError { .. })
    }
}

pub type Result<T> = std::result::Result<T, PortfolioError>;

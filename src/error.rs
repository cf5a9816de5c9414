//! Error types and handling for the wingcast service

use thiserror::Error;

/// Main error type for the wingcast service
#[derive(Error, Debug)]
pub enum WingcastError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Both primary providers are unusable, even after fallback substitution
    #[error("Service unavailable: {message}")]
    ServiceUnavailable { message: String, fallback: bool },

    /// Request outside what the service can answer
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Explicitly named configuration file cannot be read
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl WingcastError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a service-unavailable error flagged as running on fallback data
    pub fn unavailable<S: Into<String>>(message: S) -> Self {
        Self::ServiceUnavailable {
            message: message.into(),
            fallback: true,
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// HTTP status code the front door should answer with
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            WingcastError::ServiceUnavailable { .. } => 503,
            WingcastError::Validation { .. } => 400,
            WingcastError::Config { .. } | WingcastError::Io { .. } => 500,
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            WingcastError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            WingcastError::ServiceUnavailable { .. } => "Weather service unavailable".to_string(),
            WingcastError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            WingcastError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

/// Failure of a single provider fetch attempt
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("HTTP error status {status}")]
    Status { status: u16 },

    #[error("credential rejected (HTTP 401)")]
    Unauthorized,

    #[error("malformed payload: {reason}")]
    Malformed { reason: String },
}

impl ProviderError {
    pub fn malformed<S: Into<String>>(reason: S) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }

    /// Transient failures are worth another attempt; HTTP error statuses are not.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProviderError::Timeout | ProviderError::Connection(_) | ProviderError::Malformed { .. }
        )
    }

    /// Short failure class used in attempt logs
    #[must_use]
    pub fn class(&self) -> &'static str {
        match self {
            ProviderError::Timeout => "timeout",
            ProviderError::Connection(_) => "connection",
            ProviderError::Status { .. } => "http_status",
            ProviderError::Unauthorized => "unauthorized",
            ProviderError::Malformed { .. } => "malformed",
        }
    }
}

/// The request URL is stripped; it may carry an API key.
impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        let err = err.without_url();
        if err.is_timeout() {
            ProviderError::Timeout
        } else if err.is_decode() || err.is_body() {
            ProviderError::malformed(err.to_string())
        } else if let Some(status) = err.status() {
            if status.as_u16() == 401 {
                ProviderError::Unauthorized
            } else {
                ProviderError::Status {
                    status: status.as_u16(),
                }
            }
        } else {
            ProviderError::Connection(err.to_string())
        }
    }
}

//! Error types for provider clients.

use thiserror::Error;
use toolchat_core::CoreError;

/// Result type for provider operations.
pub type Result<T> = std::result::Result<T, LlmError>;

/// Errors that can occur when talking to a provider.
#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// API authentication failed.
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    /// API key not found.
    #[error("API key not found: {0}")]
    ApiKeyNotFound(String),

    /// Provider service unavailable (5xx).
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Invalid response from provider.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Request timeout.
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// General provider error.
    #[error("Provider error: {0}")]
    ProviderError(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl LlmError {
    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LlmError::HttpError(_)
                | LlmError::ServiceUnavailable(_)
                | LlmError::Timeout(_)
                | LlmError::RateLimitExceeded(_)
        )
    }

    /// Check if this error is due to authentication.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            LlmError::AuthenticationError(_) | LlmError::ApiKeyNotFound(_)
        )
    }

    /// Map a non-success HTTP status to an error.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => LlmError::AuthenticationError(body),
            408 => LlmError::Timeout(body),
            429 => LlmError::RateLimitExceeded(body),
            500..=599 => LlmError::ServiceUnavailable(format!("{}: {}", status, body)),
            _ => LlmError::ProviderError(format!("API error {}: {}", status, body)),
        }
    }
}

/// Convert LlmError to CoreError for trait implementations.
impl From<LlmError> for CoreError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Timeout(msg) => CoreError::Timeout(msg),
            LlmError::HttpError(e) if e.is_timeout() => CoreError::Timeout(e.to_string()),
            LlmError::ConfigError(msg) | LlmError::ApiKeyNotFound(msg) => {
                CoreError::Configuration(msg)
            }
            other => CoreError::Model(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            LlmError::from_status(401, "bad key".into()),
            LlmError::AuthenticationError(_)
        ));
        assert!(LlmError::from_status(429, "slow down".into()).is_retryable());
        assert!(LlmError::from_status(503, "down".into()).is_retryable());
        assert!(!LlmError::from_status(400, "bad".into()).is_retryable());
    }

    #[test]
    fn test_core_conversion() {
        let core: CoreError = LlmError::Timeout("60s".into()).into();
        assert!(matches!(core, CoreError::Timeout(_)));

        let core: CoreError = LlmError::RateLimitExceeded("x".into()).into();
        assert!(matches!(core, CoreError::Model(_)));

        let core: CoreError = LlmError::ApiKeyNotFound("TOOLCHAT_API_KEY".into()).into();
        assert!(matches!(core, CoreError::Configuration(_)));
    }

    #[test]
    fn test_unusable_body_is_not_retried() {
        let err = LlmError::InvalidResponse("response has no choices".into());
        assert!(!err.is_retryable());
        let core: CoreError = err.into();
        assert!(matches!(core, CoreError::Model(_)));
    }
}

//! Connection settings for OpenAI-compatible providers.

use crate::error::{LlmError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// DashScope's OpenAI-compatible endpoint.
pub const DEFAULT_BASE_URL: &str = "https://dashscope.aliyuncs.com/compatible-mode/v1";

/// Chat model used when none is configured.
pub const DEFAULT_CHAT_MODEL: &str = "qwen-coder-plus";

/// Embedding model used when none is configured.
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-v3";

/// Configuration for a remote OpenAI-compatible API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteLlmConfig {
    /// API key sent as a bearer token.
    pub api_key: String,

    /// Base URL, without the trailing endpoint path.
    ///
    /// Examples:
    /// - DashScope: "https://dashscope.aliyuncs.com/compatible-mode/v1"
    /// - OpenAI: "https://api.openai.com/v1"
    pub base_url: String,

    /// Model name/identifier.
    pub model: String,

    /// Request timeout duration.
    #[serde(default = "default_timeout")]
    pub timeout: Duration,

    /// Maximum retries for transient failures.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl RemoteLlmConfig {
    /// Create a new remote configuration.
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            model: model.into(),
            timeout: default_timeout(),
            max_retries: default_max_retries(),
        }
    }

    /// Create configuration reading the key from an environment variable.
    pub fn from_env(
        env_var: &str,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self> {
        let api_key = std::env::var(env_var)
            .map_err(|_| LlmError::ApiKeyNotFound(format!("Environment variable: {}", env_var)))?;

        Ok(Self::new(api_key, base_url, model))
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the maximum number of retries.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Same endpoint and key, different model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Join the base URL with an endpoint path.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Reject settings that can never produce a successful call.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(LlmError::ApiKeyNotFound("api_key is empty".to_string()));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(LlmError::ConfigError(format!(
                "base_url must be an http(s) URL: {}",
                self.base_url
            )));
        }
        if self.model.trim().is_empty() {
            return Err(LlmError::ConfigError("model is empty".to_string()));
        }
        Ok(())
    }
}

fn default_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_max_retries() -> u32 {
    3
}

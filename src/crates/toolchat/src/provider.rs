//! Model providers built from configuration
//!
//! Bridges `[llm]` and `[embeddings]` to the OpenAI-compatible clients in the
//! `llm` crate, handed out as trait objects.

use crate::config::ToolchatConfig;
use crate::error::{Result, ToolchatError};
use llm::{OpenAiClient, OpenAiEmbeddings, RemoteLlmConfig};
use std::sync::Arc;
use toolchat_core::llm::{ChatModel, EmbeddingModel};
use tracing::debug;

/// The models a session talks to
#[derive(Clone)]
pub struct Providers {
    /// Chat completions, with tool calling
    pub chat: Arc<dyn ChatModel>,
    /// Embeddings for document retrieval
    pub embeddings: Arc<dyn EmbeddingModel>,
}

impl std::fmt::Debug for Providers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Providers")
            .field("chat", &self.chat.model_name())
            .finish_non_exhaustive()
    }
}

/// Remote settings shared by chat and embeddings
pub fn remote_config(config: &ToolchatConfig) -> Result<RemoteLlmConfig> {
    let api_key = config
        .llm
        .api_key
        .clone()
        .ok_or_else(|| {
            ToolchatError::Config(format!(
                "No API key configured: set [llm].api_key or export {}",
                crate::config::schema::LLM_API_KEY_ENV
            ))
        })?;

    let remote = RemoteLlmConfig::new(api_key, config.llm.base_url.clone(), config.llm.model.clone())
        .with_timeout(config.llm.timeout())
        .with_max_retries(config.llm.max_retries);
    remote.validate()?;
    Ok(remote)
}

impl Providers {
    /// Build both clients from configuration
    pub fn from_config(config: &ToolchatConfig) -> Result<Self> {
        let remote = remote_config(config)?;
        debug!(base_url = %remote.base_url, model = %remote.model, "Building model clients");

        let chat = OpenAiClient::new(remote.clone())?;
        let embeddings = OpenAiEmbeddings::new(remote.with_model(config.embeddings.model.clone()))?
            .with_batch_size(config.embeddings.batch_size);

        Ok(Self {
            chat: Arc::new(chat),
            embeddings: Arc::new(embeddings),
        })
    }

    /// Use prepared models, e.g. scripted ones in tests
    pub fn new(chat: Arc<dyn ChatModel>, embeddings: Arc<dyn EmbeddingModel>) -> Self {
        Self { chat, embeddings }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key_is_config_error() {
        let config = ToolchatConfig::default();
        let err = remote_config(&config).unwrap_err();
        assert!(matches!(err, ToolchatError::Config(_)));
        assert!(err.to_string().contains("TOOLCHAT_API_KEY"));
    }

    #[test]
    fn test_remote_config_carries_llm_section() {
        let mut config = ToolchatConfig::default();
        config.llm.api_key = Some("sk-test".to_string());
        config.llm.timeout_secs = 15;
        config.llm.max_retries = 1;

        let remote = remote_config(&config).unwrap();
        assert_eq!(remote.model, "qwen-coder-plus");
        assert_eq!(remote.timeout, std::time::Duration::from_secs(15));
        assert_eq!(remote.max_retries, 1);
    }

    #[test]
    fn test_providers_from_config() {
        let mut config = ToolchatConfig::default();
        config.llm.api_key = Some("sk-test".to_string());

        let providers = Providers::from_config(&config).unwrap();
        assert_eq!(providers.chat.model_name(), "qwen-coder-plus");
    }
}

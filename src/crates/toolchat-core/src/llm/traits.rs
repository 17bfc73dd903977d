//! Traits implemented by model providers
//!
//! Implementations must be `Send + Sync`; callers share them as
//! `Arc<dyn ChatModel>` / `Arc<dyn EmbeddingModel>` across executors.

use crate::error::Result;
use crate::llm::config::ChatRequest;
use crate::llm::response::ChatResponse;
use async_trait::async_trait;

/// A chat-completion model.
///
/// # Errors
///
/// Implementations map transport and provider failures to
/// [`CoreError::Model`](crate::CoreError::Model) or
/// [`CoreError::Timeout`](crate::CoreError::Timeout). They do not parse tool
/// arguments; raw strings are passed through in
/// [`ToolCall::arguments`](crate::llm::ToolCall::arguments).
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Generate one response for the request
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse>;

    /// Check that the provider is reachable.
    ///
    /// Defaults to `Ok(true)`.
    async fn is_available(&self) -> Result<bool> {
        Ok(true)
    }

    /// Model identifier used in logs
    fn model_name(&self) -> &str;
}

/// A text embedding model
#[async_trait]
pub trait EmbeddingModel: Send + Sync {
    /// Embed each input; the output has one vector per input, in order
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single query
    async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed(&[query.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| crate::CoreError::Model("embedding service returned no vector".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ChatResponse;
    use crate::Turn;
    use std::sync::Arc;

    struct EchoModel;

    #[async_trait]
    impl ChatModel for EchoModel {
        async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
            let last = request
                .turns
                .last()
                .and_then(|t| t.text())
                .unwrap_or_default()
                .to_string();
            Ok(ChatResponse::text(last))
        }

        fn model_name(&self) -> &str {
            "echo"
        }
    }

    struct EmptyEmbedder;

    #[async_trait]
    impl EmbeddingModel for EmptyEmbedder {
        async fn embed(&self, _inputs: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn test_trait_object() {
        let model: Arc<dyn ChatModel> = Arc::new(EchoModel);
        let response = model
            .chat(ChatRequest::new(vec![Turn::user("Hi")]))
            .await
            .unwrap();
        assert_eq!(response.content.as_deref(), Some("Hi"));
        assert!(model.is_available().await.unwrap());
        assert_eq!(model.model_name(), "echo");
    }

    #[tokio::test]
    async fn test_embed_query_without_vector_is_error() {
        let err = EmptyEmbedder.embed_query("q").await.unwrap_err();
        assert!(err.to_string().contains("no vector"));
    }
}

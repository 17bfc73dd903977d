//! Provider clients for toolchat.
//!
//! This crate implements the `ChatModel` and `EmbeddingModel` traits from
//! `toolchat-core` against OpenAI-compatible HTTP APIs. The default
//! endpoint is DashScope's compatible mode; any provider speaking the same
//! wire format (OpenAI, a local vLLM, etc.) works by changing `base_url`.
//!
//! Transient failures (transport errors, timeouts, 429, 5xx) are retried
//! with exponential backoff; see [`retry`].
//!
//! # Example
//!
//! ```rust,ignore
//! use llm::remote::OpenAiClient;
//! use llm::config::{RemoteLlmConfig, DEFAULT_BASE_URL, DEFAULT_CHAT_MODEL};
//! use toolchat_core::llm::{ChatModel, ChatRequest};
//! use toolchat_core::Turn;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RemoteLlmConfig::from_env("TOOLCHAT_API_KEY", DEFAULT_BASE_URL, DEFAULT_CHAT_MODEL)?;
//!     let client = OpenAiClient::new(config)?;
//!
//!     let response = client
//!         .chat(ChatRequest::new(vec![Turn::user("What is Rust?")]).with_temperature(0.7))
//!         .await?;
//!     println!("{}", response.content.unwrap_or_default());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod remote;
pub mod retry;

// Re-export commonly used types
pub use config::RemoteLlmConfig;
pub use error::{LlmError, Result};
pub use remote::{OpenAiClient, OpenAiEmbeddings};
pub use retry::RetryPolicy;

// Re-export core types for convenience
pub use toolchat_core::llm::{
    ChatConfig, ChatModel, ChatRequest, ChatResponse, EmbeddingModel, ToolCall, ToolDefinition,
    UsageMetadata,
};

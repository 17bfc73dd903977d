//! Clients for remote OpenAI-compatible APIs.
//!
//! - [`OpenAiClient`] - `/chat/completions` with tool calling
//! - [`OpenAiEmbeddings`] - `/embeddings`

pub mod embeddings;
pub mod openai;

pub use embeddings::OpenAiEmbeddings;
pub use openai::OpenAiClient;

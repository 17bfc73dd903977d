//! Model traits and the types exchanged with them
//!
//! The core crate only defines the seams. Concrete clients for
//! OpenAI-compatible endpoints live in the `llm` crate; deterministic
//! stand-ins live in [`crate::testing`].
//!
//! # Request Flow
//!
//! 1. The resolver windows the [`ConversationLog`](crate::ConversationLog)
//!    and builds a [`ChatRequest`] with the registry's [`ToolDefinition`]s
//! 2. A [`ChatModel`] turns it into a [`ChatResponse`]
//! 3. Raw [`ToolCall`]s in the response are parsed into
//!    [`CapabilityCall`](crate::CapabilityCall)s by the resolver
//!
//! ```rust,ignore
//! let request = ChatRequest::new(log.window(40))
//!     .with_tools(registry.definitions())
//!     .with_temperature(0.7);
//!
//! let response = model.chat(request).await?;
//! if response.has_tool_calls() {
//!     // execute and loop
//! }
//! ```

pub mod config;
pub mod response;
pub mod tools;
pub mod traits;

pub use config::{ChatConfig, ChatRequest};
pub use response::{ChatResponse, UsageMetadata};
pub use tools::{ToolCall, ToolDefinition};
pub use traits::{ChatModel, EmbeddingModel};

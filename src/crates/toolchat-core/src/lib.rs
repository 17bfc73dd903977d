//! Core types for toolchat
//!
//! This crate holds what every other crate in the workspace agrees on:
//!
//! - [`Turn`] and the append-only [`ConversationLog`] with its
//!   request/result pairing invariant
//! - the [`ChatModel`](llm::ChatModel) and [`EmbeddingModel`](llm::EmbeddingModel)
//!   seams and the request/response types that cross them
//! - [`CoreError`]
//! - deterministic test models in [`testing`]
//!
//! Network clients, capabilities and the tool-call loop are built on top of
//! it in the `llm`, `toolchat-prebuilt` and `toolchat` crates.

pub mod error;
pub mod llm;
pub mod messages;
pub mod testing;

pub use error::{CoreError, Result};
pub use messages::{CapabilityCall, ConversationLog, Role, Turn};

//! # toolchat-prebuilt - capabilities, the tool-call loop and the pipeline
//!
//! Building blocks between the model seam in `toolchat-core` and the
//! application:
//!
//! - **[Capabilities](tools)** - the [`Capability`] trait and the
//!   [`CapabilityRegistry`] with validated names and schemas
//! - **[`ToolNode`]** - runs invocation requests in order, turning every
//!   failure into tool-result text
//! - **[`TurnResolver`]** - asks the model for the next action and parses
//!   its requests
//! - **[`ToolLoop`]** - the resolve/execute controller with hop limit and
//!   resolver retries
//! - **[`Pipeline`]** - researcher loop with an optional [`Translator`]
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use toolchat_prebuilt::{CapabilityRegistry, ToolLoop, ToolNode, TurnResolver};
//! use toolchat_core::{ConversationLog, Turn};
//!
//! let mut registry = CapabilityRegistry::new();
//! registry.register(Arc::new(WeatherCapability::default()))?;
//!
//! let tool_loop = ToolLoop::new(
//!     TurnResolver::new(model.clone(), registry.definitions()),
//!     ToolNode::new(registry),
//! )
//! .with_max_hops(6);
//!
//! let mut log = ConversationLog::with_system("You are a helpful assistant.");
//! log.push(Turn::user("深圳今天天气咋样？"))?;
//! let outcome = tool_loop.run(&mut log).await?;
//! println!("{}", outcome.answer);
//! ```

pub mod agents;
pub mod error;
pub mod events;
pub mod resolver;
pub mod tool_node;
pub mod tools;

pub use agents::{
    LoopOutcome, Pipeline, PipelineNode, PipelineOutput, PipelineState, ToolLoop, Translator,
};
pub use error::{PrebuiltError, Result};
pub use events::{EventHandler, LoopEvent};
pub use resolver::{Resolution, TurnResolver};
pub use tool_node::ToolNode;
pub use tools::{Capability, CapabilityRegistry, InputSchema, ParamSpec, ParamType};

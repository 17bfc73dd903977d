//! Agent patterns built on the resolver and tool node
//!
//! - [`ToolLoop`] - resolver → executor → resolver until a final answer
//! - [`Translator`] - one persona-prompted rewrite, no tools
//! - [`Pipeline`] - researcher loop, then translator when the route flag is set

pub mod pipeline;
pub mod tool_loop;
pub mod translator;

pub use pipeline::{Pipeline, PipelineNode, PipelineOutput, PipelineState};
pub use tool_loop::{LoopOutcome, ToolLoop, DEFAULT_MAX_HOPS, DEFAULT_RESOLVER_RETRIES};
pub use translator::{Translator, DEFAULT_TRANSLATOR_PROMPT};

//! # toolchat - a tool-augmented chat assistant
//!
//! A conversational assistant that calls capabilities (weather, web search,
//! retrieval over uploaded documents, whole-document analysis) when the
//! model asks for them, and can route research answers through a
//! translator.
//!
//! ## Modules
//!
//! - [`config`] - layered TOML configuration
//! - [`provider`] - model clients built from configuration
//! - [`capabilities`] - the executors offered to the model
//! - [`knowledge`] - ingestion and the shared vector index
//! - [`session`] - [`ChatSession`], one user's conversation
//! - [`logging`] - tracing subscriber setup
//!
//! ## Example
//!
//! ```rust,ignore
//! use toolchat::{ChatSession, ConfigLoader, Providers};
//!
//! let config = ConfigLoader::new().load().await?;
//! let providers = Providers::from_config(&config)?;
//! let mut session = ChatSession::builder(config, providers).build()?;
//!
//! let reply = session.submit("我是新老板李四，深圳今天天气咋样？").await?;
//! println!("{}", reply.answer);
//! ```

pub mod capabilities;
pub mod config;
pub mod error;
pub mod knowledge;
pub mod logging;
pub mod provider;
pub mod session;

pub use capabilities::{CapabilityKind, SearchClient, SearchHit};
pub use config::{ConfigLoader, SessionMode, ToolchatConfig};
pub use error::{Result, ToolchatError};
pub use knowledge::{Document, DocumentFormat, IngestOutcome, KnowledgeBase};
pub use provider::Providers;
pub use session::{ChatSession, Reply, SessionBuilder};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

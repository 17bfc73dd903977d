//! Error Types - Prebuilt Component Errors
//!
//! # Error Categories
//!
//! - **Registration** - a capability could not be added to a registry
//! - **Capability** - lookup, argument validation or execution failed; the
//!   tool node turns these into tool-result text, they never end a run
//! - **Loop** - the hop limit was hit; fatal to the interaction
//! - **Core** - model and conversation-log errors from `toolchat-core`
//!
//! # Example
//!
//! ```rust,ignore
//! use toolchat_prebuilt::{PrebuiltError, Result};
//!
//! match tool_loop.run(&mut log).await {
//!     Ok(outcome) => println!("{}", outcome.answer),
//!     Err(PrebuiltError::HopLimitExceeded { max_hops }) => {
//!         eprintln!("gave up after {} hops", max_hops)
//!     }
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! ```

use thiserror::Error;
use toolchat_core::CoreError;

/// Result type for prebuilt operations
pub type Result<T> = std::result::Result<T, PrebuiltError>;

/// Errors that can occur in prebuilt components
#[derive(Error, Debug)]
pub enum PrebuiltError {
    /// A capability was rejected at registration
    #[error("Capability registration failed: {0}")]
    Registration(String),

    /// The model asked for a capability that is not registered
    #[error("Unknown capability: {0}")]
    UnknownCapability(String),

    /// Arguments do not satisfy the capability's input schema
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Capability execution error
    #[error("Capability execution failed: {0}")]
    CapabilityExecution(String),

    /// The resolver kept requesting capabilities past the hop limit
    #[error("Tool-call loop exceeded {max_hops} hops without a final answer")]
    HopLimitExceeded {
        /// Configured limit
        max_hops: usize,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Model or conversation error
    #[error(transparent)]
    Core(#[from] CoreError),
}

//! Error types for conversation bookkeeping and model interaction
//!
//! All errors implement `std::error::Error` via the `thiserror` crate.
//!
//! # Error Hierarchy
//!
//! ```text
//! CoreError
//! ├── Integrity           - A turn would break request/result pairing
//! ├── MalformedArguments  - The model produced unusable structured output
//! ├── Model               - The completion service failed
//! ├── EmptyResponse       - The completion service returned nothing usable
//! ├── Timeout             - A model or collaborator call took too long
//! ├── Serialization       - JSON errors
//! └── Configuration       - Invalid setup detected before a call is made
//! ```
//!
//! Capability failures are deliberately absent: executors turn them into text
//! that flows back to the model as an ordinary tool-result turn.

use thiserror::Error;

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised by the conversation log and the model traits
#[derive(Error, Debug)]
pub enum CoreError {
    /// Appending a turn would violate the request/result pairing invariant
    #[error("Conversation integrity violated: {0}")]
    Integrity(String),

    /// Capability arguments could not be interpreted
    #[error("Malformed arguments for call '{call_id}': {reason}")]
    MalformedArguments {
        /// Id of the offending invocation request
        call_id: String,
        /// What was wrong with the arguments
        reason: String,
    },

    /// The language-model completion service failed
    #[error("Model error: {0}")]
    Model(String),

    /// The completion service answered with neither text nor invocation requests
    #[error("Model returned an empty response")]
    EmptyResponse,

    /// An operation exceeded its time budget
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CoreError {
    /// Whether a fresh resolver call may produce a usable response.
    pub fn is_resolver_recoverable(&self) -> bool {
        matches!(
            self,
            CoreError::MalformedArguments { .. } | CoreError::EmptyResponse
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_arguments_display() {
        let err = CoreError::MalformedArguments {
            call_id: "call_1".to_string(),
            reason: "expected a JSON object".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Malformed arguments for call 'call_1': expected a JSON object"
        );
    }

    #[test]
    fn test_recoverable_classification() {
        assert!(CoreError::EmptyResponse.is_resolver_recoverable());
        assert!(CoreError::MalformedArguments {
            call_id: "x".into(),
            reason: "y".into()
        }
        .is_resolver_recoverable());
        assert!(!CoreError::Model("boom".into()).is_resolver_recoverable());
        assert!(!CoreError::Integrity("bad".into()).is_resolver_recoverable());
    }
}

//! Error types for the toolchat application

use std::fmt;

/// Result type alias for toolchat operations
pub type Result<T> = std::result::Result<T, ToolchatError>;

/// Main error type for the application layer
#[derive(Debug)]
pub enum ToolchatError {
    /// Configuration error
    Config(String),

    /// Model client could not be built or failed outside the tool loop
    Llm(String),

    /// Capability registry or tool-loop failure
    Capability(String),

    /// A document could not be ingested
    Ingestion(String),

    /// Search collaborator failure
    Search(String),

    /// I/O error
    Io(std::io::Error),

    /// Serialization error
    Serialization(serde_json::Error),

    /// TOML parse error
    Toml(toml::de::Error),

    /// Generic error
    Other(String),
}

impl fmt::Display for ToolchatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolchatError::Config(msg) => write!(f, "Configuration error: {}", msg),
            ToolchatError::Llm(msg) => write!(f, "Model error: {}", msg),
            ToolchatError::Capability(msg) => write!(f, "Capability error: {}", msg),
            ToolchatError::Ingestion(msg) => write!(f, "Ingestion failed: {}", msg),
            ToolchatError::Search(msg) => write!(f, "Search failed: {}", msg),
            ToolchatError::Io(err) => write!(f, "I/O error: {}", err),
            ToolchatError::Serialization(err) => write!(f, "Serialization error: {}", err),
            ToolchatError::Toml(err) => write!(f, "TOML error: {}", err),
            ToolchatError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ToolchatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ToolchatError::Io(err) => Some(err),
            ToolchatError::Serialization(err) => Some(err),
            ToolchatError::Toml(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ToolchatError {
    fn from(err: std::io::Error) -> Self {
        ToolchatError::Io(err)
    }
}

impl From<serde_json::Error> for ToolchatError {
    fn from(err: serde_json::Error) -> Self {
        ToolchatError::Serialization(err)
    }
}

impl From<toml::de::Error> for ToolchatError {
    fn from(err: toml::de::Error) -> Self {
        ToolchatError::Toml(err)
    }
}

impl From<llm::LlmError> for ToolchatError {
    fn from(err: llm::LlmError) -> Self {
        ToolchatError::Llm(err.to_string())
    }
}

impl From<toolchat_core::CoreError> for ToolchatError {
    fn from(err: toolchat_core::CoreError) -> Self {
        ToolchatError::Llm(err.to_string())
    }
}

impl From<toolchat_prebuilt::PrebuiltError> for ToolchatError {
    fn from(err: toolchat_prebuilt::PrebuiltError) -> Self {
        match err {
            toolchat_prebuilt::PrebuiltError::Core(core) => core.into(),
            other => ToolchatError::Capability(other.to_string()),
        }
    }
}

impl From<anyhow::Error> for ToolchatError {
    fn from(err: anyhow::Error) -> Self {
        ToolchatError::Other(err.to_string())
    }
}

impl From<String> for ToolchatError {
    fn from(msg: String) -> Self {
        ToolchatError::Other(msg)
    }
}

impl From<&str> for ToolchatError {
    fn from(msg: &str) -> Self {
        ToolchatError::Other(msg.to_string())
    }
}

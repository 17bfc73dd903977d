//! Request types for chat models

use crate::llm::tools::ToolDefinition;
use crate::messages::Turn;

/// A request to a chat model: turns plus generation settings.
///
/// # Example
///
/// ```rust
/// use toolchat_core::llm::ChatRequest;
/// use toolchat_core::Turn;
///
/// let request = ChatRequest::new(vec![
///     Turn::system("You are a helpful assistant"),
///     Turn::user("深圳今天天气咋样？"),
/// ])
/// .with_temperature(0.7)
/// .with_max_tokens(1024);
///
/// assert_eq!(request.turns.len(), 2);
/// assert!(request.config.tools.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// Turns sent to the model, in order
    pub turns: Vec<Turn>,

    /// Generation settings
    pub config: ChatConfig,
}

impl ChatRequest {
    /// Create a request with default settings
    pub fn new(turns: Vec<Turn>) -> Self {
        Self {
            turns,
            config: ChatConfig::default(),
        }
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = Some(temperature);
        self
    }

    /// Cap the number of generated tokens
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.config.max_tokens = Some(max_tokens);
        self
    }

    /// Offer capabilities the model may request.
    ///
    /// An empty list means the model must answer in text.
    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.config.tools = tools;
        self
    }

    /// Whether any capabilities are offered
    pub fn has_tools(&self) -> bool {
        !self.config.tools.is_empty()
    }
}

/// Generation settings; providers ignore what they do not support
#[derive(Debug, Clone, Default)]
pub struct ChatConfig {
    /// Sampling temperature
    pub temperature: Option<f32>,

    /// Maximum tokens to generate
    pub max_tokens: Option<usize>,

    /// Capabilities offered to the model
    pub tools: Vec<ToolDefinition>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let request = ChatRequest::new(vec![Turn::user("hi")])
            .with_temperature(0.2)
            .with_max_tokens(64)
            .with_tools(vec![ToolDefinition::new("get_weather", "Weather lookup")]);

        assert_eq!(request.config.temperature, Some(0.2));
        assert_eq!(request.config.max_tokens, Some(64));
        assert!(request.has_tools());
    }

    #[test]
    fn test_defaults() {
        let request = ChatRequest::new(vec![]);
        assert!(request.config.temperature.is_none());
        assert!(request.config.max_tokens.is_none());
        assert!(!request.has_tools());
    }
}

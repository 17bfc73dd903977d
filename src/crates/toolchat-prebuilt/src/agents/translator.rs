//! Translator stage: one persona-prompted model call, no tools

use std::sync::Arc;
use toolchat_core::llm::{ChatModel, ChatRequest};
use toolchat_core::{CoreError, Result, Turn};
use tracing::debug;

/// Default persona instruction
pub const DEFAULT_TRANSLATOR_PROMPT: &str = "You are a professional translator. \
Translate the text you are given into fluent, natural Chinese if it is in another language, \
or into English if it is already Chinese. Keep facts, numbers and formatting intact and \
reply with the translation only.";

/// Rewrites a working result with a fixed persona
#[derive(Clone)]
pub struct Translator {
    model: Arc<dyn ChatModel>,
    system_prompt: String,
    temperature: Option<f32>,
}

impl Translator {
    /// Translator with the default persona
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self {
            model,
            system_prompt: DEFAULT_TRANSLATOR_PROMPT.to_string(),
            temperature: None,
        }
    }

    /// Replace the persona instruction
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Translate `text`
    pub async fn translate(&self, text: &str) -> Result<String> {
        let mut request = ChatRequest::new(vec![
            Turn::system(self.system_prompt.clone()),
            Turn::user(text),
        ]);
        if let Some(t) = self.temperature {
            request = request.with_temperature(t);
        }

        debug!(model = %self.model.model_name(), chars = text.chars().count(), "Translating");
        let response = self.model.chat(request).await?;
        match response.content {
            Some(content) if !content.trim().is_empty() => Ok(content),
            _ => Err(CoreError::EmptyResponse),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toolchat_core::testing::ScriptedModel;

    #[tokio::test]
    async fn test_translate_sends_persona_and_no_tools() {
        let model = Arc::new(ScriptedModel::new().then_text("你好"));
        let translator = Translator::new(model.clone()).with_system_prompt("persona");

        assert_eq!(translator.translate("hello").await.unwrap(), "你好");

        let request = &model.requests()[0];
        assert_eq!(request.turns[0].text(), Some("persona"));
        assert_eq!(request.turns[1].text(), Some("hello"));
        assert!(!request.has_tools());
    }

    #[tokio::test]
    async fn test_empty_translation_is_error() {
        let model = Arc::new(ScriptedModel::new().then_text(""));
        let err = Translator::new(model).translate("hello").await.unwrap_err();
        assert!(matches!(err, CoreError::EmptyResponse));
    }
}

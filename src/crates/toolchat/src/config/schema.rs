//! Configuration schema for toolchat
//!
//! Every section carries `#[serde(default)]`, so a config file only needs the
//! keys it wants to change.

use crate::capabilities::CapabilityKind;
use crate::error::{Result, ToolchatError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Environment variable consulted when `[llm].api_key` is unset
pub const LLM_API_KEY_ENV: &str = "TOOLCHAT_API_KEY";

/// Environment variable consulted when `[search].api_key` is unset
pub const SEARCH_API_KEY_ENV: &str = "TAVILY_API_KEY";

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchatConfig {
    /// Chat completion service
    pub llm: LlmConfig,

    /// Embedding service used for document retrieval
    pub embeddings: EmbeddingsConfig,

    /// Web search collaborator
    pub search: SearchConfig,

    /// Document ingestion and retrieval
    pub knowledge: KnowledgeConfig,

    /// Tool loop and session behaviour
    pub agent: AgentConfig,

    /// System prompts
    pub prompts: PromptsConfig,

    /// Weather lookup fixtures
    pub weather: WeatherConfig,

    /// Logging
    pub logging: LoggingConfig,
}

/// `[llm]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// OpenAI-compatible base URL
    pub base_url: String,

    /// Chat model
    pub model: String,

    /// API key; supports `${VAR}`, falls back to `TOOLCHAT_API_KEY`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Sampling temperature
    pub temperature: f32,

    /// Completion token cap
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<usize>,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Retries for transient failures
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: llm::config::DEFAULT_BASE_URL.to_string(),
            model: llm::config::DEFAULT_CHAT_MODEL.to_string(),
            api_key: None,
            temperature: 0.7,
            max_tokens: None,
            timeout_secs: 60,
            max_retries: 3,
        }
    }
}

impl LlmConfig {
    /// Request timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// `[embeddings]` section; endpoint and key are shared with `[llm]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingsConfig {
    /// Embedding model
    pub model: String,

    /// Inputs per request
    pub batch_size: usize,
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            model: llm::config::DEFAULT_EMBEDDING_MODEL.to_string(),
            batch_size: 10,
        }
    }
}

/// `[search]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Search provider; only `tavily` is supported
    pub provider: String,

    /// API key; supports `${VAR}`, falls back to `TAVILY_API_KEY`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Results formatted into the tool result
    pub max_results: usize,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            provider: "tavily".to_string(),
            api_key: None,
            max_results: 3,
            timeout_secs: 30,
        }
    }
}

/// `[knowledge]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeConfig {
    /// Characters per chunk
    pub chunk_size: usize,

    /// Characters shared by neighbouring chunks
    pub chunk_overlap: usize,

    /// Chunks returned by a retrieval
    pub top_k: usize,

    /// Characters of raw text handed to whole-document analysis
    pub analysis_char_budget: usize,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
            top_k: 3,
            analysis_char_budget: 30_000,
        }
    }
}

/// How a session answers a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    /// One tool loop over every enabled capability
    #[default]
    Assistant,
    /// Researcher loop, then the translator when requested
    Pipeline,
}

impl SessionMode {
    /// Name used in config files and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionMode::Assistant => "assistant",
            SessionMode::Pipeline => "pipeline",
        }
    }
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionMode {
    type Err = ToolchatError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "assistant" => Ok(SessionMode::Assistant),
            "pipeline" => Ok(SessionMode::Pipeline),
            other => Err(ToolchatError::Config(format!(
                "unknown session mode '{}' (expected assistant or pipeline)",
                other
            ))),
        }
    }
}

/// `[agent]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Session mode
    pub mode: SessionMode,

    /// Execute cycles allowed per interaction
    pub max_hops: usize,

    /// Extra resolver attempts after unusable output
    pub resolver_retries: usize,

    /// Per-capability time budget in seconds
    pub tool_timeout_secs: u64,

    /// Non-system turns sent to the model
    pub history_window: usize,

    /// Capabilities enabled in assistant mode
    pub capabilities: Vec<String>,

    /// Initial translate toggle in pipeline mode
    pub translate_by_default: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            mode: SessionMode::Assistant,
            max_hops: toolchat_prebuilt::agents::DEFAULT_MAX_HOPS,
            resolver_retries: toolchat_prebuilt::agents::DEFAULT_RESOLVER_RETRIES,
            tool_timeout_secs: 60,
            history_window: toolchat_prebuilt::resolver::DEFAULT_HISTORY_WINDOW,
            capabilities: CapabilityKind::ALL
                .iter()
                .map(|kind| kind.name().to_string())
                .collect(),
            translate_by_default: false,
        }
    }
}

impl AgentConfig {
    /// Parse the configured capability names
    pub fn capability_kinds(&self) -> Result<Vec<CapabilityKind>> {
        self.capabilities.iter().map(|name| name.parse()).collect()
    }

    /// Capability time budget as a duration
    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_secs)
    }
}

/// Default persona of the all-round assistant
pub const DEFAULT_SYSTEM_PROMPT: &str = "你是一个幽默、全能的资深AI助理老王。你有完美的记忆力，\
必须严格根据我们之前的聊天记录回答问题。绝对不能说'每次对话都是独立的'这种废话！\
需要查天气、搜网页或查阅用户上传的文档时，调用对应的工具。";

/// Default instruction for the research stage
pub const DEFAULT_RESEARCHER_PROMPT: &str = "You are a meticulous research assistant. \
Use web_search for current events, internal_doc_search for specific facts in the uploaded \
documents and whole_document_analysis for summaries of the whole document. \
Answer from the tool results and say so when they do not contain the answer.";

/// Default instruction for the whole-document analyst call
pub const DEFAULT_ANALYST_PROMPT: &str = "You are a careful analyst. Answer the question using \
only the document below. If the document does not contain the answer, say so.";

/// `[prompts]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    /// Assistant-mode system prompt
    pub system: String,

    /// Pipeline researcher system prompt
    pub researcher: String,

    /// Translator persona
    pub translator: String,

    /// Whole-document analysis instruction
    pub analyst: String,
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            system: DEFAULT_SYSTEM_PROMPT.to_string(),
            researcher: DEFAULT_RESEARCHER_PROMPT.to_string(),
            translator: toolchat_prebuilt::agents::DEFAULT_TRANSLATOR_PROMPT.to_string(),
            analyst: DEFAULT_ANALYST_PROMPT.to_string(),
        }
    }
}

/// One keyword → report rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherFixture {
    /// Substring looked for in the requested location
    pub keyword: String,
    /// Report returned on a match
    pub report: String,
}

impl WeatherFixture {
    /// Build a fixture
    pub fn new(keyword: impl Into<String>, report: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            report: report.into(),
        }
    }
}

/// `[weather]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Returned when no fixture matches
    pub unknown: String,

    /// Checked in order; first match wins
    pub fixtures: Vec<WeatherFixture>,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            unknown: "未知天气".to_string(),
            fixtures: vec![
                WeatherFixture::new("北京", "狂风暴雨，气温 10 度"),
                WeatherFixture::new("深圳", "阳光明媚，气温 28 度"),
            ],
        }
    }
}

/// `[logging]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` overrides it
    pub level: String,

    /// `compact`, `pretty` or `json`
    pub format: String,

    /// ANSI colours on stderr
    pub colored: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "compact".to_string(),
            colored: true,
        }
    }
}

impl ToolchatConfig {
    /// Resolve environment variables in configuration values
    ///
    /// `${VAR}` values are expanded; unset keys fall back to
    /// `TOOLCHAT_API_KEY` and `TAVILY_API_KEY`.
    pub fn resolve_env_vars(&mut self) {
        self.llm.base_url = expand_env_var(&self.llm.base_url);
        self.llm.api_key = resolve_key(self.llm.api_key.take(), LLM_API_KEY_ENV);
        self.search.api_key = resolve_key(self.search.api_key.take(), SEARCH_API_KEY_ENV);
    }

    /// Reject values that can never work
    pub fn validate(&self) -> Result<()> {
        self.agent.capability_kinds()?;

        if self.agent.max_hops == 0 {
            return Err(ToolchatError::Config("agent.max_hops must be at least 1".to_string()));
        }
        if self.knowledge.chunk_size == 0 {
            return Err(ToolchatError::Config("knowledge.chunk_size must be at least 1".to_string()));
        }
        if self.knowledge.chunk_overlap >= self.knowledge.chunk_size {
            return Err(ToolchatError::Config(format!(
                "knowledge.chunk_overlap ({}) must be smaller than knowledge.chunk_size ({})",
                self.knowledge.chunk_overlap, self.knowledge.chunk_size
            )));
        }
        if self.knowledge.top_k == 0 {
            return Err(ToolchatError::Config("knowledge.top_k must be at least 1".to_string()));
        }
        if self.search.provider.to_lowercase() != "tavily" {
            return Err(ToolchatError::Config(format!(
                "unsupported search provider '{}'",
                self.search.provider
            )));
        }
        if !matches!(self.logging.format.as_str(), "compact" | "pretty" | "json") {
            return Err(ToolchatError::Config(format!(
                "logging.format must be compact, pretty or json, got '{}'",
                self.logging.format
            )));
        }
        Ok(())
    }

    /// Render as TOML, used by `toolchat init`
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| ToolchatError::Config(format!("Failed to render config: {}", e)))
    }
}

/// Expand a `${VAR_NAME}` value; anything else is returned as is
pub(crate) fn expand_env_var(value: &str) -> String {
    match value.strip_prefix("${").and_then(|rest| rest.strip_suffix('}')) {
        Some(var_name) => std::env::var(var_name).unwrap_or_else(|_| value.to_string()),
        None => value.to_string(),
    }
}

fn resolve_key(configured: Option<String>, fallback_env: &str) -> Option<String> {
    configured
        .map(|key| expand_env_var(&key))
        .filter(|key| !key.trim().is_empty() && !key.starts_with("${"))
        .or_else(|| std::env::var(fallback_env).ok())
        .filter(|key| !key.trim().is_empty())
}

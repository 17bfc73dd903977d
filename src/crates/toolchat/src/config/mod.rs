//! Configuration for toolchat
//!
//! `[llm]`, `[embeddings]`, `[search]`, `[knowledge]`, `[agent]`, `[prompts]`,
//! `[weather]` and `[logging]` sections, layered from defaults, the user file
//! and the project file.

pub mod loader;
pub mod schema;

pub use loader::{merge_tables, write_default_config, ConfigLoader, CONFIG_DIR, CONFIG_FILE};
pub use schema::{
    AgentConfig, EmbeddingsConfig, KnowledgeConfig, LlmConfig, LoggingConfig, PromptsConfig,
    SearchConfig, SessionMode, ToolchatConfig, WeatherConfig, WeatherFixture,
};

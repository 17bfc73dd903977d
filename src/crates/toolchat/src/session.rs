//! Chat session: the per-user context object
//!
//! A [`ChatSession`] owns the conversation log, the translate toggle and the
//! loops that answer submissions. It is created when a chat starts and
//! dropped when it ends; nothing here is global.
//!
//! ```text
//! submit(text)
//!   ├─ push user turn
//!   ├─ read translate toggle once (route flag)
//!   ├─ assistant mode: ToolLoop over the enabled capabilities
//!   └─ pipeline mode:  Researcher ToolLoop → [Translator] → Done
//! ```
//!
//! An interaction that fails (hop limit, model outage) still ends with an
//! assistant turn telling the user it could not complete.

use crate::capabilities::{build_registry, CapabilityContext, CapabilityKind, SearchClient, TavilyClient};
use crate::config::{SessionMode, ToolchatConfig};
use crate::error::{Result, ToolchatError};
use crate::knowledge::{Document, IngestOutcome, KnowledgeBase};
use crate::provider::Providers;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use toolchat_core::{ConversationLog, Turn};
use toolchat_prebuilt::{
    CapabilityRegistry, EventHandler, Pipeline, PipelineState, PrebuiltError, ToolLoop, ToolNode,
    Translator, TurnResolver,
};
use tracing::{info, warn};

/// Prefix of the assistant turn appended when an interaction fails
pub const INCOMPLETE_ANSWER: &str = "Sorry, I could not complete that request";

/// Outcome of one submission
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    /// Text appended as the final assistant turn
    pub answer: String,
    /// False when the interaction failed and `answer` explains why
    pub completed: bool,
    /// Whether the translator rewrote the answer
    pub translated: bool,
    /// Execute cycles used
    pub hops: usize,
    /// Whether the answer is the resolver fallback
    pub fallback: bool,
}

/// Builds a [`ChatSession`]
pub struct SessionBuilder {
    config: ToolchatConfig,
    providers: Providers,
    search: Option<Arc<dyn SearchClient>>,
    knowledge: Option<Arc<KnowledgeBase>>,
    events: Option<EventHandler>,
    mode: Option<SessionMode>,
}

impl SessionBuilder {
    /// Use this search client instead of one built from `[search]`
    pub fn with_search_client(mut self, client: Arc<dyn SearchClient>) -> Self {
        self.search = Some(client);
        self
    }

    /// Share an existing knowledge base
    pub fn with_knowledge(mut self, knowledge: Arc<KnowledgeBase>) -> Self {
        self.knowledge = Some(knowledge);
        self
    }

    /// Receive loop progress, e.g. to announce capability calls
    pub fn with_events(mut self, events: EventHandler) -> Self {
        self.events = Some(events);
        self
    }

    /// Override `[agent].mode`
    pub fn with_mode(mut self, mode: SessionMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn build(self) -> Result<ChatSession> {
        let SessionBuilder {
            config,
            providers,
            search,
            knowledge,
            events,
            mode,
        } = self;
        config.validate()?;

        let search = match search {
            Some(client) => Some(client),
            None => TavilyClient::from_config(&config.search)?
                .map(|client| Arc::new(client) as Arc<dyn SearchClient>),
        };
        if search.is_none() {
            warn!("No search API key configured; web_search will report itself unavailable");
        }

        let knowledge = knowledge.unwrap_or_else(|| {
            Arc::new(KnowledgeBase::new(
                providers.embeddings.clone(),
                config.knowledge.clone(),
            ))
        });

        let context = CapabilityContext {
            weather: config.weather.clone(),
            search,
            search_results: config.search.max_results,
            knowledge: knowledge.clone(),
            analyst: providers.chat.clone(),
            analyst_prompt: config.prompts.analyst.clone(),
        };

        let assistant_registry = build_registry(&config.agent.capability_kinds()?, &context)?;
        let research_registry = build_registry(&CapabilityKind::RESEARCH, &context)?;

        let assistant = tool_loop(&config, &providers, assistant_registry, events.clone());
        let researcher = tool_loop(&config, &providers, research_registry, events);
        let translator = Translator::new(providers.chat.clone())
            .with_system_prompt(config.prompts.translator.clone());

        let mode = mode.unwrap_or(config.agent.mode);
        let system_prompt = match mode {
            SessionMode::Assistant => config.prompts.system.clone(),
            SessionMode::Pipeline => config.prompts.researcher.clone(),
        };
        info!(%mode, model = %providers.chat.model_name(), "Chat session started");

        Ok(ChatSession {
            mode,
            log: ConversationLog::with_system(system_prompt.clone()),
            system_prompt,
            translate: config.agent.translate_by_default,
            knowledge,
            assistant,
            pipeline: Pipeline::new(researcher, translator),
        })
    }
}

fn tool_loop(
    config: &ToolchatConfig,
    providers: &Providers,
    registry: CapabilityRegistry,
    events: Option<EventHandler>,
) -> ToolLoop {
    let model_budget = config.llm.timeout() * (config.llm.max_retries + 1) + Duration::from_secs(5);
    let mut resolver = TurnResolver::new(providers.chat.clone(), registry.definitions())
        .with_history_window(config.agent.history_window)
        .with_temperature(config.llm.temperature)
        .with_timeout(model_budget);
    if let Some(max_tokens) = config.llm.max_tokens {
        resolver = resolver.with_max_tokens(max_tokens);
    }

    let node = ToolNode::new(registry).with_timeout(config.agent.tool_timeout());
    let tool_loop = ToolLoop::new(resolver, node)
        .with_max_hops(config.agent.max_hops)
        .with_resolver_retries(config.agent.resolver_retries);
    match events {
        Some(handler) => tool_loop.with_events(handler),
        None => tool_loop,
    }
}

/// One user's conversation with the assistant
pub struct ChatSession {
    mode: SessionMode,
    log: ConversationLog,
    system_prompt: String,
    translate: bool,
    knowledge: Arc<KnowledgeBase>,
    assistant: ToolLoop,
    pipeline: Pipeline,
}

impl ChatSession {
    /// Start building a session
    pub fn builder(config: ToolchatConfig, providers: Providers) -> SessionBuilder {
        SessionBuilder {
            config,
            providers,
            search: None,
            knowledge: None,
            events: None,
            mode: None,
        }
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    /// Whether pipeline answers go through the translator
    pub fn translate(&self) -> bool {
        self.translate
    }

    /// Takes effect from the next submission
    pub fn set_translate(&mut self, enabled: bool) {
        if enabled && self.mode == SessionMode::Assistant {
            warn!("Translation only applies in pipeline mode");
        }
        self.translate = enabled;
    }

    /// The full log, tool plumbing included
    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    /// User and assistant turns with text, in order
    pub fn history(&self) -> Vec<&Turn> {
        self.log.visible_turns().collect()
    }

    pub fn knowledge(&self) -> &Arc<KnowledgeBase> {
        &self.knowledge
    }

    /// Forget the conversation; uploaded documents stay
    pub fn reset(&mut self) {
        self.log = ConversationLog::with_system(self.system_prompt.clone());
        info!("Conversation reset");
    }

    /// Ingest a file from disk
    pub async fn upload(&self, path: &Path) -> Result<IngestOutcome> {
        let document = Document::from_path(path).await?;
        self.upload_document(document).await
    }

    /// Ingest an in-memory document
    pub async fn upload_document(&self, document: Document) -> Result<IngestOutcome> {
        let outcome = self.knowledge.ingest(document).await?;
        info!(%outcome, "Upload processed");
        Ok(outcome)
    }

    /// Answer one user message
    ///
    /// Errors are returned only for input that never reached the loop; a
    /// failed interaction yields a `Reply` with `completed == false`.
    pub async fn submit(&mut self, input: &str) -> Result<Reply> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ToolchatError::Other("message is empty".to_string()));
        }
        self.log.push(Turn::user(input))?;

        let route_flag = self.translate;
        let result = match self.mode {
            SessionMode::Assistant => self.assistant.run(&mut self.log).await.map(|outcome| Reply {
                answer: outcome.answer,
                completed: true,
                translated: false,
                hops: outcome.hops,
                fallback: outcome.fallback,
            }),
            SessionMode::Pipeline => self
                .pipeline
                .invoke(PipelineState::new(&mut self.log, route_flag))
                .await
                .map(|output| Reply {
                    answer: output.answer,
                    completed: true,
                    translated: output.translated,
                    hops: output.hops,
                    fallback: output.fallback,
                }),
        };

        match result {
            Ok(reply) => Ok(reply),
            Err(e) => self.abandon(e),
        }
    }

    /// Close a failed interaction with a user-visible assistant turn
    fn abandon(&mut self, error: PrebuiltError) -> Result<Reply> {
        warn!(error = %error, "Interaction could not complete");

        let pending: Vec<String> = self.log.pending_calls().iter().map(|c| c.id.clone()).collect();
        for id in pending {
            self.log.push(Turn::tool_result(id, "Error: interaction aborted"))?;
        }

        let answer = format!("{}: {}", INCOMPLETE_ANSWER, error);
        self.log.push(Turn::assistant(answer.clone()))?;
        Ok(Reply {
            answer,
            completed: false,
            translated: false,
            hops: 0,
            fallback: false,
        })
    }
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("mode", &self.mode)
            .field("turns", &self.log.len())
            .field("translate", &self.translate)
            .finish_non_exhaustive()
    }
}

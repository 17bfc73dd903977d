//! Shared fixtures for prebuilt integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use toolchat_core::ConversationLog;
use toolchat_core::Turn;
use toolchat_prebuilt::{
    Capability, CapabilityRegistry, InputSchema, ParamType, PrebuiltError, Result,
};

/// Looks up a fixed answer per city and counts invocations
#[derive(Default)]
pub struct CountingWeather {
    pub calls: AtomicUsize,
}

#[async_trait]
impl Capability for CountingWeather {
    fn name(&self) -> &str {
        "get_weather"
    }

    fn description(&self) -> &str {
        "Get today's weather for a city"
    }

    fn input_schema(&self) -> InputSchema {
        InputSchema::new().required("location", ParamType::String, "City name")
    }

    async fn execute(&self, arguments: &Map<String, Value>) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let location = arguments["location"].as_str().unwrap_or_default();
        Ok(if location.contains("深圳") {
            "阳光明媚，气温 28 度".to_string()
        } else {
            "未知天气".to_string()
        })
    }
}

/// Always fails
pub struct FailingSearch;

#[async_trait]
impl Capability for FailingSearch {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web"
    }

    fn input_schema(&self) -> InputSchema {
        InputSchema::new().required("query", ParamType::String, "Query")
    }

    async fn execute(&self, _arguments: &Map<String, Value>) -> Result<String> {
        Err(PrebuiltError::CapabilityExecution(
            "search provider returned 500".to_string(),
        ))
    }
}

pub fn registry(weather: Arc<CountingWeather>) -> CapabilityRegistry {
    CapabilityRegistry::from_capabilities(vec![weather, Arc::new(FailingSearch)]).unwrap()
}

pub fn log_with_question(question: &str) -> ConversationLog {
    let mut log = ConversationLog::with_system("You are a helpful assistant.");
    log.push(Turn::user(question)).unwrap();
    log
}

mod common;

use common::{offline_config, session, CannedSearch};
use std::sync::Arc;
use toolchat::session::INCOMPLETE_ANSWER;
use toolchat::{Document, DocumentFormat, SessionMode};
use toolchat_core::testing::ScriptedModel;
use toolchat_core::{ConversationLog, Role};

fn tool_results(session: &toolchat::ChatSession) -> Vec<String> {
    session
        .log()
        .iter()
        .filter(|t| t.is_tool_result())
        .filter_map(|t| t.text().map(str::to_string))
        .collect()
}

#[tokio::test]
async fn test_weather_round_trip_in_assistant_mode() {
    let model = Arc::new(
        ScriptedModel::new()
            .then_call("call_1", "get_weather", r#"{"location": "深圳"}"#)
            .then_text("李四老板，深圳今天阳光明媚，28 度。"),
    );
    let mut chat = session(
        offline_config(),
        SessionMode::Assistant,
        model.clone(),
        Arc::new(CannedSearch::default()),
    );

    let reply = chat.submit("我是新老板李四，深圳今天天气咋样？").await.unwrap();

    assert!(reply.completed);
    assert_eq!(reply.hops, 1);
    assert_eq!(model.call_count(), 2);
    assert_eq!(tool_results(&chat), vec!["阳光明媚，气温 28 度"]);
    assert!(ConversationLog::validate(chat.log().turns()).is_ok());
    assert!(chat.log().is_terminal());

    let second_request = &model.requests()[1];
    assert!(second_request
        .turns
        .iter()
        .any(|t| t.capability_call_id.as_deref() == Some("call_1")));
}

#[tokio::test]
async fn test_history_hides_tool_plumbing() {
    let model = Arc::new(
        ScriptedModel::new()
            .then_call("call_1", "get_weather", r#"{"location": "火星"}"#)
            .then_text("火星的天气我也不知道。"),
    );
    let mut chat = session(
        offline_config(),
        SessionMode::Assistant,
        model,
        Arc::new(CannedSearch::default()),
    );

    chat.submit("火星天气？").await.unwrap();

    assert_eq!(tool_results(&chat), vec!["未知天气"]);
    let roles: Vec<Role> = chat.history().iter().map(|t| t.role).collect();
    assert_eq!(roles, vec![Role::User, Role::Assistant]);
}

#[tokio::test]
async fn test_memory_carries_across_submissions() {
    let model = Arc::new(
        ScriptedModel::new()
            .then_text("你好，李四老板！")
            .then_text("您是李四。"),
    );
    let mut chat = session(
        offline_config(),
        SessionMode::Assistant,
        model.clone(),
        Arc::new(CannedSearch::default()),
    );

    chat.submit("我是新老板李四").await.unwrap();
    chat.submit("我是谁？").await.unwrap();

    let second = &model.requests()[1];
    assert!(second
        .turns
        .iter()
        .any(|t| t.text() == Some("我是新老板李四")));
    assert_eq!(second.turns[0].role, Role::System);
}

#[tokio::test]
async fn test_pipeline_without_translation() {
    let model = Arc::new(ScriptedModel::new().then_text("Rust 1.0 shipped in 2015."));
    let mut chat = session(
        offline_config(),
        SessionMode::Pipeline,
        model.clone(),
        Arc::new(CannedSearch::default()),
    );

    let reply = chat.submit("When did Rust 1.0 ship?").await.unwrap();

    assert_eq!(reply.answer, "Rust 1.0 shipped in 2015.");
    assert!(!reply.translated);
    assert_eq!(model.call_count(), 1);
}

#[tokio::test]
async fn test_pipeline_with_translation() {
    let model = Arc::new(
        ScriptedModel::new()
            .then_call("s1", "web_search", r#"{"query": "rust 1.0 release"}"#)
            .then_text("Rust 1.0 shipped in May 2015.")
            .then_text("Rust 1.0 于 2015 年 5 月发布。"),
    );
    let search = Arc::new(CannedSearch::with_hits(&["Rust blog", "Wikipedia", "HN", "Reddit"]));
    let mut chat = session(offline_config(), SessionMode::Pipeline, model.clone(), search.clone());
    chat.set_translate(true);

    let reply = chat.submit("When did Rust 1.0 ship?").await.unwrap();

    assert!(reply.translated);
    assert_eq!(reply.answer, "Rust 1.0 于 2015 年 5 月发布。");
    assert_eq!(*search.queries.lock(), vec!["rust 1.0 release"]);

    let results = tool_results(&chat);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].matches("Title: ").count(), 3);

    let requests = model.requests();
    assert_eq!(requests.len(), 3);
    let translator_request = &requests[2];
    assert!(!translator_request.has_tools());
    assert!(translator_request
        .turns
        .iter()
        .any(|t| t.text() == Some("Rust 1.0 shipped in May 2015.")));

    let finals: Vec<_> = chat.log().iter().filter(|t| t.is_final_answer()).collect();
    assert_eq!(finals.len(), 1);
    assert_eq!(finals[0].text(), Some("Rust 1.0 于 2015 年 5 月发布。"));
}

#[tokio::test]
async fn test_researcher_is_not_offered_weather() {
    let model = Arc::new(ScriptedModel::new().then_text("ok"));
    let mut chat = session(
        offline_config(),
        SessionMode::Pipeline,
        model.clone(),
        Arc::new(CannedSearch::default()),
    );

    chat.submit("hello").await.unwrap();

    let offered: Vec<String> = model.requests()[0]
        .config
        .tools
        .iter()
        .map(|t| t.name.clone())
        .collect();
    assert_eq!(
        offered,
        vec!["web_search", "internal_doc_search", "whole_document_analysis"]
    );
}

#[tokio::test]
async fn test_hop_limit_appends_incomplete_answer() {
    let mut config = offline_config();
    config.agent.max_hops = 1;
    let model = Arc::new(
        ScriptedModel::new()
            .then_call("c1", "get_weather", r#"{"location": "北京"}"#)
            .then_call("c2", "get_weather", r#"{"location": "北京"}"#),
    );
    let mut chat = session(
        config,
        SessionMode::Assistant,
        model,
        Arc::new(CannedSearch::default()),
    );

    let reply = chat.submit("北京天气？").await.unwrap();

    assert!(!reply.completed);
    assert!(reply.answer.starts_with(INCOMPLETE_ANSWER));
    assert!(chat.log().is_terminal());
    assert!(chat.log().pending_calls().is_empty());
    assert!(ConversationLog::validate(chat.log().turns()).is_ok());
}

#[tokio::test]
async fn test_model_outage_is_reported_in_conversation() {
    let model = Arc::new(ScriptedModel::new().then_error("503 upstream"));
    let mut chat = session(
        offline_config(),
        SessionMode::Assistant,
        model,
        Arc::new(CannedSearch::default()),
    );

    let reply = chat.submit("hi").await.unwrap();

    assert!(!reply.completed);
    assert!(reply.answer.contains("503 upstream"));
    assert_eq!(chat.history().len(), 2);
}

#[tokio::test]
async fn test_doc_search_after_upload() {
    let model = Arc::new(
        ScriptedModel::new()
            .then_call("d1", "internal_doc_search", r#"{"query": "refund policy"}"#)
            .then_text("Refunds are accepted within 30 days."),
    );
    let mut chat = session(
        offline_config(),
        SessionMode::Assistant,
        model,
        Arc::new(CannedSearch::default()),
    );
    chat.upload_document(Document::new(
        "policy.md",
        DocumentFormat::Md,
        "# Policy\n\nRefund policy: refunds are accepted within 30 days of purchase.",
    ))
    .await
    .unwrap();

    let reply = chat.submit("What is the refund policy?").await.unwrap();

    assert!(reply.completed);
    let results = tool_results(&chat);
    assert!(results[0].contains("30 days"));
    assert!(results[0].contains("policy.md"));
}

#[tokio::test]
async fn test_reset_keeps_documents() {
    let model = Arc::new(ScriptedModel::new().then_text("hi"));
    let mut chat = session(
        offline_config(),
        SessionMode::Assistant,
        model,
        Arc::new(CannedSearch::default()),
    );
    chat.upload_document(Document::new("a.txt", DocumentFormat::Txt, "some notes"))
        .await
        .unwrap();
    chat.submit("hello").await.unwrap();

    chat.reset();

    assert_eq!(chat.log().len(), 1);
    assert_eq!(chat.log().turns()[0].role, Role::System);
    assert!(!chat.knowledge().is_empty());
}

#[tokio::test]
async fn test_empty_message_rejected_without_model_call() {
    let model = Arc::new(ScriptedModel::new());
    let mut chat = session(
        offline_config(),
        SessionMode::Assistant,
        model.clone(),
        Arc::new(CannedSearch::default()),
    );

    assert!(chat.submit("   ").await.is_err());
    assert_eq!(model.call_count(), 0);
    assert_eq!(chat.log().len(), 1);
}

#[tokio::test]
async fn test_unknown_capability_in_config_fails_build() {
    let mut config = offline_config();
    config.agent.capabilities = vec!["get_weather".to_string(), "launch_rocket".to_string()];
    let model = Arc::new(ScriptedModel::new());

    let result = toolchat::ChatSession::builder(config, common::providers(model)).build();

    assert!(matches!(result, Err(toolchat::ToolchatError::Config(_))));
}

mod common;

use common::{offline_config, providers, session, CannedSearch};
use std::sync::Arc;
use tempfile::TempDir;
use toolchat::config::KnowledgeConfig;
use toolchat::{ChatSession, Document, DocumentFormat, IngestOutcome, KnowledgeBase, SessionMode};
use toolchat_core::testing::{HashEmbedder, ScriptedModel};

fn chat() -> ChatSession {
    session(
        offline_config(),
        SessionMode::Pipeline,
        Arc::new(ScriptedModel::new()),
        Arc::new(CannedSearch::default()),
    )
}

#[tokio::test]
async fn test_same_file_twice_merges_once() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("handbook.txt");
    std::fs::write(&path, "Office hours are 9 to 6. Lunch is at noon.").unwrap();
    let chat = chat();

    let first = chat.upload(&path).await.unwrap();
    let second = chat.upload(&path).await.unwrap();

    assert!(matches!(first, IngestOutcome::Ingested { chunks: 1, .. }));
    assert_eq!(
        second,
        IngestOutcome::AlreadyKnown {
            document: "handbook.txt".to_string()
        }
    );
    assert!(second.to_string().contains("already known"));
    assert_eq!(chat.knowledge().merge_count(), 1);
}

#[tokio::test]
async fn test_identity_is_content_not_name() {
    let temp = TempDir::new().unwrap();
    let a = temp.path().join("a.md");
    let b = temp.path().join("copy-of-a.md");
    std::fs::write(&a, "# Same\n\nidentical bytes").unwrap();
    std::fs::write(&b, "# Same\n\nidentical bytes").unwrap();
    let chat = chat();

    chat.upload(&a).await.unwrap();
    let outcome = chat.upload(&b).await.unwrap();

    assert!(matches!(outcome, IngestOutcome::AlreadyKnown { .. }));
    assert_eq!(chat.knowledge().documents(), vec!["a.md"]);
}

#[tokio::test]
async fn test_concurrent_duplicate_uploads_merge_once() {
    let knowledge = Arc::new(KnowledgeBase::new(
        Arc::new(HashEmbedder::default()),
        KnowledgeConfig::default(),
    ));
    let doc = Document::new("race.txt", DocumentFormat::Txt, "the same content twice");

    let (left, right) = tokio::join!(knowledge.ingest(doc.clone()), knowledge.ingest(doc));

    let outcomes = [left.unwrap(), right.unwrap()];
    let ingested = outcomes
        .iter()
        .filter(|o| matches!(o, IngestOutcome::Ingested { .. }))
        .count();
    assert_eq!(ingested, 1);
    assert_eq!(knowledge.merge_count(), 1);
    assert_eq!(knowledge.snapshot().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unsupported_extension_is_user_visible_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("deck.pptx");
    std::fs::write(&path, b"PK\x03\x04").unwrap();
    let chat = chat();

    let err = chat.upload(&path).await.unwrap_err();

    assert!(err.to_string().contains("unsupported document format"));
    assert!(chat.knowledge().is_empty());
}

#[tokio::test]
async fn test_broken_pdf_leaves_knowledge_untouched() {
    let temp = TempDir::new().unwrap();
    let good = temp.path().join("notes.txt");
    let bad = temp.path().join("scan.pdf");
    std::fs::write(&good, "quarterly numbers look fine").unwrap();
    std::fs::write(&bad, b"%PDF-1.4 truncated garbage").unwrap();
    let chat = chat();
    chat.upload(&good).await.unwrap();
    let raw_before = chat.knowledge().raw_text();

    let err = chat.upload(&bad).await.unwrap_err();

    assert!(matches!(err, toolchat::ToolchatError::Ingestion(_)));
    assert_eq!(chat.knowledge().merge_count(), 1);
    assert_eq!(chat.knowledge().raw_text(), raw_before);
    assert_eq!(chat.knowledge().snapshot().unwrap().len(), 1);
}

#[tokio::test]
async fn test_missing_file_is_error() {
    let chat = chat();
    let err = chat
        .upload(std::path::Path::new("/definitely/not/here.txt"))
        .await
        .unwrap_err();
    assert!(matches!(err, toolchat::ToolchatError::Ingestion(_)));
}

#[tokio::test]
async fn test_sessions_can_share_a_knowledge_base() {
    let knowledge = Arc::new(KnowledgeBase::new(
        Arc::new(HashEmbedder::default()),
        KnowledgeConfig::default(),
    ));
    let first = ChatSession::builder(offline_config(), providers(Arc::new(ScriptedModel::new())))
        .with_knowledge(knowledge.clone())
        .build()
        .unwrap();
    let second = ChatSession::builder(offline_config(), providers(Arc::new(ScriptedModel::new())))
        .with_knowledge(knowledge.clone())
        .build()
        .unwrap();

    first
        .upload_document(Document::new("shared.txt", DocumentFormat::Txt, "shared facts"))
        .await
        .unwrap();

    assert!(!second.knowledge().is_empty());
    let again = second
        .upload_document(Document::new("shared.txt", DocumentFormat::Txt, "shared facts"))
        .await
        .unwrap();
    assert!(matches!(again, IngestOutcome::AlreadyKnown { .. }));
}

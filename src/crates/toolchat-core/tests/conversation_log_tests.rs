//! Conversation log integrity tests
//!
//! Whatever sequence of appends is attempted, the log that survives must
//! pair every tool result with exactly one earlier, previously unanswered
//! request.

use proptest::prelude::*;
use serde_json::Map;
use std::collections::HashMap;
use toolchat_core::{CapabilityCall, ConversationLog, Role, Turn};

#[derive(Debug, Clone)]
enum Op {
    User,
    Request(Vec<u8>),
    Result(u8),
    Answer,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::User),
        prop::collection::vec(0u8..12, 1..4).prop_map(Op::Request),
        (0u8..12).prop_map(Op::Result),
        Just(Op::Answer),
    ]
}

fn to_turn(op: &Op) -> Turn {
    match op {
        Op::User => Turn::user("question"),
        Op::Request(ids) => Turn::assistant_with_calls(
            None,
            ids.iter()
                .map(|i| CapabilityCall::new(format!("call_{}", i), "get_weather", Map::new()))
                .collect(),
        ),
        Op::Result(i) => Turn::tool_result(format!("call_{}", i), "result"),
        Op::Answer => Turn::assistant("answer"),
    }
}

fn assert_pairing(log: &ConversationLog) {
    // Count, per id, how many requests were issued before each result.
    let mut open: HashMap<String, usize> = HashMap::new();
    for turn in log.turns() {
        match turn.role {
            Role::Assistant => {
                for call in &turn.capability_calls {
                    *open.entry(call.id.clone()).or_default() += 1;
                }
            }
            Role::Tool => {
                let id = turn.capability_call_id.clone().unwrap();
                let count = open.get_mut(&id).expect("result without request");
                assert_eq!(*count, 1, "result must match exactly one open request");
                *count -= 1;
            }
            _ => {}
        }
    }
}

proptest! {
    #[test]
    fn prop_log_keeps_referential_integrity(ops in prop::collection::vec(op(), 0..40)) {
        let mut log = ConversationLog::with_system("sys");
        for op in &ops {
            let before = log.len();
            if log.push(to_turn(op)).is_err() {
                prop_assert_eq!(log.len(), before);
            }
        }
        prop_assert!(ConversationLog::validate(log.turns()).is_ok());
        assert_pairing(&log);
    }

    #[test]
    fn prop_push_agrees_with_validate(ops in prop::collection::vec(op(), 0..40)) {
        let mut log = ConversationLog::with_system("sys");
        for op in &ops {
            let turn = to_turn(op);
            let mut candidate = log.turns().to_vec();
            candidate.push(turn.clone());
            let expected = ConversationLog::validate(&candidate).is_ok();
            prop_assert_eq!(log.push(turn).is_ok(), expected);
        }
    }

    #[test]
    fn prop_answered_ids_can_be_requested_again(ids in prop::collection::vec(0u8..3, 1..20)) {
        let mut log = ConversationLog::with_system("sys");
        log.push(Turn::user("question")).unwrap();
        for i in &ids {
            let id = format!("call_{}", i);
            let request = Turn::assistant_with_calls(
                None,
                vec![CapabilityCall::new(id.clone(), "get_weather", Map::new())],
            );
            prop_assert!(log.push(request).is_ok());
            prop_assert_eq!(log.pending_calls().len(), 1);
            prop_assert!(log.push(Turn::tool_result(id, "result")).is_ok());
            prop_assert!(log.pending_calls().is_empty());
        }
        prop_assert!(ConversationLog::validate(log.turns()).is_ok());
    }

    #[test]
    fn prop_window_is_a_valid_suffix(ops in prop::collection::vec(op(), 0..40), max in 0usize..12) {
        let mut log = ConversationLog::with_system("sys");
        for op in &ops {
            let _ = log.push(to_turn(op));
        }
        let window = log.window(max);
        let conversational: Vec<&Turn> = window.iter().filter(|t| t.role != Role::System).collect();

        // Windows start at a user turn unless nothing was cut.
        if window.len() < log.len() {
            if let Some(first) = conversational.first() {
                prop_assert_eq!(first.role, Role::User);
            }
        }
        // The window is a suffix of the log, ignoring system turns.
        let tail: Vec<&Turn> = log.turns().iter().filter(|t| t.role != Role::System).collect();
        prop_assert!(tail.ends_with(&conversational));
    }
}

#[test]
fn test_rebuild_from_serialized_turns() {
    let mut log = ConversationLog::with_system("sys");
    log.push(Turn::user("深圳今天天气咋样？")).unwrap();
    log.push(Turn::assistant_with_calls(
        Some(String::new()),
        vec![CapabilityCall::parse("call_1", "get_weather", r#"{"location":"深圳"}"#).unwrap()],
    ))
    .unwrap();
    log.push(Turn::tool_result("call_1", "阳光明媚，气温 28 度")).unwrap();
    log.push(Turn::assistant("深圳阳光明媚，28 度")).unwrap();

    let json = serde_json::to_string(log.turns()).unwrap();
    let turns: Vec<Turn> = serde_json::from_str(&json).unwrap();
    let rebuilt = ConversationLog::from_turns(turns).unwrap();
    assert_eq!(rebuilt.turns(), log.turns());
}

#[test]
fn test_pending_calls_are_ordered() {
    let mut log = ConversationLog::new();
    log.push(Turn::user("q")).unwrap();
    log.push(Turn::assistant_with_calls(
        None,
        vec![
            CapabilityCall::new("a", "web_search", Map::new()),
            CapabilityCall::new("b", "internal_doc_search", Map::new()),
        ],
    ))
    .unwrap();
    let ids: Vec<&str> = log.pending_calls().iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
}

#[test]
fn test_reused_id_is_pending_again_until_answered() {
    let mut log = ConversationLog::with_system("sys");
    log.push(Turn::user("q")).unwrap();
    for round in 0..2 {
        log.push(Turn::assistant_with_calls(
            None,
            vec![CapabilityCall::new("call_0", "get_weather", Map::new())],
        ))
        .unwrap();
        let ids: Vec<&str> = log.pending_calls().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["call_0"], "round {}", round);

        log.push(Turn::tool_result("call_0", "result")).unwrap();
        assert!(log.pending_calls().is_empty());
    }

    // A second result for the same request is still rejected.
    assert!(log.push(Turn::tool_result("call_0", "again")).is_err());
    assert!(ConversationLog::validate(log.turns()).is_ok());
}

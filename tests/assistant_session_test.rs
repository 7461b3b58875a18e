// ABOUTME: Tests for session checkpointing through the NutritionAssistant facade
// ABOUTME: Covers multi-turn history, atomic turns, session isolation and context files
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::io::Write;
use std::sync::Arc;

use common::{text, tool_call, Scripted, ScriptedProvider};
use pierre_nutrition_assistant::agent::{
    read_context_file, ConversationState, InMemoryCheckpointer, NutritionAgent,
    NutritionAssistant, SessionCheckpointer,
};
use pierre_nutrition_assistant::config::AgentConfig;
use pierre_nutrition_assistant::errors::ErrorCode;
use pierre_nutrition_assistant::llm::{ChatMessage, LlmProvider};
use serde_json::json;

fn assistant_over(provider: &Arc<ScriptedProvider>) -> NutritionAssistant {
    let provider: Arc<dyn LlmProvider> = provider.clone();
    let agent = NutritionAgent::with_nutrition_tools(provider, AgentConfig::default(), None);
    NutritionAssistant::new(agent, Arc::new(InMemoryCheckpointer::new()))
}

#[tokio::test]
async fn test_history_accumulates_across_turns() {
    let provider = ScriptedProvider::new(vec![text("Hi there!"), text("Oats are great.")]);
    let assistant = assistant_over(&provider);
    assistant
        .start_session("s1", "Oats for breakfast", "No nuts")
        .await
        .unwrap();

    assistant.send("s1", "hello").await.unwrap();
    let outcome = assistant.send("s1", "are oats good?").await.unwrap();
    assert_eq!(outcome.reply, "Oats are great.");

    let history = assistant.history("s1").await.unwrap();
    let contents: Vec<&str> = history.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(
        contents,
        ["hello", "Hi there!", "are oats good?", "Oats are great."]
    );

    // Second turn replays the first turn and keeps the session context
    let calls = provider.calls();
    let second = &calls[1].request.messages;
    assert!(second[0].content.contains("Oats for breakfast"));
    assert_eq!(second.len(), 2 + 3);
}

#[tokio::test]
async fn test_failed_turn_leaves_checkpoint_untouched() {
    let provider = ScriptedProvider::new(vec![
        text("Hello!"),
        Scripted::ToolCalls(vec![tool_call(
            "call_1",
            "get_food_stats",
            json!({"query": "banana"}),
        )]),
        text("{\"food_name\": \"banana\"}"),
    ]);
    let assistant = assistant_over(&provider);
    assistant.start_session("s1", "", "").await.unwrap();
    assistant.send("s1", "hi").await.unwrap();

    let err = assistant.send("s1", "banana calories?").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::SchemaValidation);

    let history = assistant.history("s1").await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1], ChatMessage::assistant("Hello!"));
}

#[tokio::test]
async fn test_sessions_are_isolated() {
    let provider = ScriptedProvider::new(vec![text("reply a"), text("reply b")]);
    let assistant = assistant_over(&provider);
    assistant.start_session("a", "plan a", "").await.unwrap();
    assistant.start_session("b", "plan b", "").await.unwrap();

    assistant.send("a", "for a").await.unwrap();
    assistant.send("b", "for b").await.unwrap();

    let history_b = assistant.history("b").await.unwrap();
    assert_eq!(history_b.len(), 2);
    assert_eq!(history_b[0].content, "for b");
    assert!(provider.calls()[1].request.messages[0]
        .content
        .contains("plan b"));
}

#[tokio::test]
async fn test_unknown_session_starts_empty() {
    let provider = ScriptedProvider::new(vec![text("Hello stranger")]);
    let assistant = assistant_over(&provider);

    assert!(assistant.history("nobody").await.unwrap().is_empty());
    let outcome = assistant.send("nobody", "hi").await.unwrap();
    assert_eq!(outcome.reply, "Hello stranger");
    assert_eq!(assistant.history("nobody").await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_restart_and_end_session() {
    let provider = ScriptedProvider::new(vec![text("first")]);
    let assistant = assistant_over(&provider);

    let id = assistant.start_new_session("plan", "prefs").await.unwrap();
    assert!(!id.is_empty());
    assistant.send(&id, "hi").await.unwrap();

    assistant.start_session(&id, "new plan", "").await.unwrap();
    assert!(assistant.history(&id).await.unwrap().is_empty());

    assert!(assistant.end_session(&id).await.unwrap());
    assert!(!assistant.end_session(&id).await.unwrap());
}

#[test]
fn test_assistant_exposes_agent_setup() {
    let provider = ScriptedProvider::new(vec![]);
    let assistant = assistant_over(&provider);

    let agent = assistant.agent();
    assert_eq!(
        agent.tools().tool_names(),
        ["get_food_stats", "get_recipe", "get_shopping_list"]
    );
    assert_eq!(agent.config(), &AgentConfig::default());
}

#[tokio::test]
async fn test_in_memory_checkpointer_round_trip() {
    let store = InMemoryCheckpointer::new();
    assert!(store.load("x").await.unwrap().is_none());

    let mut state = ConversationState::new("plan", "prefs");
    state.push(ChatMessage::user("hello"));
    store.save("x", state.clone()).await.unwrap();
    store.save("a", ConversationState::default()).await.unwrap();

    assert_eq!(store.load("x").await.unwrap(), Some(state));
    assert_eq!(store.session_ids().await.unwrap(), ["a", "x"]);
    assert!(store.delete("a").await.unwrap());
    assert_eq!(store.session_ids().await.unwrap(), ["x"]);
}

#[tokio::test]
async fn test_read_context_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "  Monday: lentil soup\nTuesday: tofu stir fry  ").unwrap();

    let contents = read_context_file(file.path()).await.unwrap();
    assert_eq!(contents, "Monday: lentil soup\nTuesday: tofu stir fry");

    let missing = file.path().with_extension("missing");
    let err = read_context_file(&missing).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

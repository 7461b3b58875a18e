// ABOUTME: HTTP-level tests for the OpenAI-compatible provider against a mock server
// ABOUTME: Validates request bodies, tool-call decoding, structured output and error mapping
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use pierre_nutrition_assistant::errors::ErrorCode;
use pierre_nutrition_assistant::llm::{
    ChatMessage, ChatRequest, FunctionCall, FunctionDeclaration, LlmProvider,
    OpenAiCompatibleConfig, OpenAiCompatibleProvider, ResponseFormat,
};
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider_for(server: &MockServer) -> OpenAiCompatibleProvider {
    let config = OpenAiCompatibleConfig::openai("test-key", "gpt-4o").with_base_url(server.uri());
    OpenAiCompatibleProvider::new(config).unwrap()
}

fn completion(message: &Value) -> Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "model": "gpt-4o-2024-08-06",
        "choices": [{"index": 0, "message": message, "finish_reason": "stop"}],
        "usage": {"prompt_tokens": 12, "completion_tokens": 7, "total_tokens": 19}
    })
}

async fn last_body(server: &MockServer) -> Value {
    let requests = server.received_requests().await.unwrap();
    serde_json::from_slice(&requests.last().unwrap().body).unwrap()
}

fn food_stats_declaration() -> FunctionDeclaration {
    FunctionDeclaration {
        name: "get_food_stats".to_owned(),
        description: "Nutrition facts".to_owned(),
        parameters: Some(json!({
            "type": "object",
            "properties": {"query": {"type": "string"}},
            "required": ["query"]
        })),
    }
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_openai_config_defaults() {
    let config = OpenAiCompatibleConfig::openai("sk-test", "gpt-4o");

    assert_eq!(config.base_url, "https://api.openai.com/v1");
    assert_eq!(config.api_key.as_deref(), Some("sk-test"));
    assert_eq!(config.provider_name, "openai");
    assert!(config.capabilities.supports_function_calling());
    assert!(config.capabilities.supports_structured_output());
}

#[test]
fn test_ollama_config_has_no_key() {
    let config = OpenAiCompatibleConfig::ollama("qwen2.5:7b");

    assert_eq!(config.base_url, "http://localhost:11434/v1");
    assert!(config.api_key.is_none());
    assert_eq!(config.default_model, "qwen2.5:7b");
    assert!(!config.capabilities.supports_structured_output());
    assert!(config.capabilities.supports_json_mode());
}

// =============================================================================
// Requests
// =============================================================================

#[tokio::test]
async fn test_complete_sends_auth_and_returns_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion(&json!({"role": "assistant", "content": "Hi!"}))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let request = ChatRequest::new(vec![ChatMessage::user("hello")]);
    let response = provider.complete(&request).await.unwrap();

    assert_eq!(response.content, "Hi!");
    assert_eq!(response.usage.unwrap().total_tokens, 19);

    let body = last_body(&server).await;
    assert_eq!(body["model"], "gpt-4o");
    assert_eq!(body["stream"], false);
    assert!(body.get("tools").is_none());
    assert_eq!(body["messages"][0], json!({"role": "user", "content": "hello"}));
}

#[tokio::test]
async fn test_complete_with_tools_decodes_tool_calls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(&json!({
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": "call_abc",
                "type": "function",
                "function": {"name": "get_food_stats", "arguments": "{\"query\":\"banana\"}"}
            }]
        }))))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let request = ChatRequest::new(vec![ChatMessage::user("banana calories?")])
        .with_temperature(0.1);
    let response = provider
        .complete_with_tools(&request, &[food_stats_declaration()])
        .await
        .unwrap();

    assert!(response.has_function_calls());
    assert!(response.content.is_none());
    assert_eq!(
        response.function_calls[0],
        FunctionCall {
            id: "call_abc".to_owned(),
            name: "get_food_stats".to_owned(),
            args: json!({"query": "banana"}),
        }
    );

    let body = last_body(&server).await;
    assert_eq!(body["tool_choice"], "auto");
    assert_eq!(body["tools"][0]["type"], "function");
    assert_eq!(body["tools"][0]["function"]["name"], "get_food_stats");
    assert!((body["temperature"].as_f64().unwrap() - 0.1).abs() < 1e-6);
}

#[tokio::test]
async fn test_tool_round_trip_messages_on_the_wire() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion(&json!({"role": "assistant", "content": "105 kcal"}))),
        )
        .mount(&server)
        .await;

    let call = FunctionCall {
        id: "call_abc".to_owned(),
        name: "get_food_stats".to_owned(),
        args: json!({"query": "banana"}),
    };
    let request = ChatRequest::new(vec![
        ChatMessage::system("You are a nutritionist."),
        ChatMessage::user("banana calories?"),
        ChatMessage::assistant_tool_calls(None, vec![call.clone()]),
        ChatMessage::tool_result(&call, r#"{"food_name":"Banana"}"#),
    ]);

    let provider = provider_for(&server);
    provider
        .complete_with_tools(&request, &[food_stats_declaration()])
        .await
        .unwrap();

    let body = last_body(&server).await;
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages[2]["role"], "assistant");
    assert!(messages[2]["content"].is_null());
    assert_eq!(messages[2]["tool_calls"][0]["id"], "call_abc");
    assert_eq!(
        messages[2]["tool_calls"][0]["function"]["arguments"],
        "{\"query\":\"banana\"}"
    );
    assert_eq!(messages[3]["role"], "tool");
    assert_eq!(messages[3]["tool_call_id"], "call_abc");
    assert_eq!(messages[3]["content"], "{\"food_name\":\"Banana\"}");
}

#[tokio::test]
async fn test_response_format_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(&json!({
            "role": "assistant",
            "content": "{\"title\":\"t\",\"items\":[]}"
        }))))
        .mount(&server)
        .await;

    let request = ChatRequest::new(vec![ChatMessage::user("list")]).with_response_format(
        ResponseFormat::JsonSchema {
            name: "ShoppingList".to_owned(),
            schema: json!({"type": "object"}),
            strict: false,
        },
    );
    provider_for(&server).complete(&request).await.unwrap();

    let body = last_body(&server).await;
    assert_eq!(body["response_format"]["type"], "json_schema");
    assert_eq!(body["response_format"]["json_schema"]["name"], "ShoppingList");
    assert_eq!(
        body["response_format"]["json_schema"]["schema"],
        json!({"type": "object"})
    );
}

// =============================================================================
// Error mapping
// =============================================================================

async fn error_for(status: u16, body: Value) -> ErrorCode {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(&server)
        .await;

    let request = ChatRequest::new(vec![ChatMessage::user("hi")]);
    provider_for(&server)
        .complete(&request)
        .await
        .unwrap_err()
        .code
}

#[tokio::test]
async fn test_http_errors_map_to_error_codes() {
    let detail = |message: &str| json!({"error": {"message": message, "type": "test_error"}});

    assert_eq!(
        error_for(401, detail("Incorrect API key")).await,
        ErrorCode::ExternalAuthFailed
    );
    assert_eq!(
        error_for(400, detail("Invalid schema")).await,
        ErrorCode::InvalidInput
    );
    assert_eq!(
        error_for(404, detail("model not found")).await,
        ErrorCode::ResourceNotFound
    );
    assert_eq!(
        error_for(500, detail("server error")).await,
        ErrorCode::ExternalServiceError
    );
    assert_eq!(
        error_for(503, detail("overloaded")).await,
        ErrorCode::ExternalServiceUnavailable
    );
}

#[tokio::test]
async fn test_rate_limit_message_includes_retry_hint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {
                "message": "Rate limit reached for gpt-4o. Please try again in 20s.",
                "type": "requests"
            }
        })))
        .mount(&server)
        .await;

    let request = ChatRequest::new(vec![ChatMessage::user("hi")]);
    let err = provider_for(&server).complete(&request).await.unwrap_err();

    assert_eq!(err.code, ErrorCode::ExternalRateLimited);
    assert!(err.message.contains("try again in 20 seconds"));
}

#[tokio::test]
async fn test_empty_choices_is_external_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"model": "gpt-4o", "choices": []})),
        )
        .mount(&server)
        .await;

    let request = ChatRequest::new(vec![ChatMessage::user("hi")]);
    let err = provider_for(&server).complete(&request).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ExternalServiceError);
}

#[tokio::test]
async fn test_unreachable_server_is_unavailable() {
    let config =
        OpenAiCompatibleConfig::openai("test-key", "gpt-4o").with_base_url("http://127.0.0.1:9");
    let provider = OpenAiCompatibleProvider::new(config).unwrap();

    let request = ChatRequest::new(vec![ChatMessage::user("hi")]);
    let err = provider.complete(&request).await.unwrap_err();
    assert!(err.code.is_transport());
}

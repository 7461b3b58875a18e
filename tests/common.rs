// ABOUTME: Shared test utilities for integration tests
// ABOUTME: Provides a scripted LLM provider that records requests, plus canned model outputs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `pierre_nutrition_assistant`
//!
//! The [`ScriptedProvider`] replays a fixed sequence of model responses. The
//! agent and the chains share one provider, so a script lists every model
//! call of a turn in the order the loop makes them.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use pierre_nutrition_assistant::errors::{AppError, AppResult};
use pierre_nutrition_assistant::llm::{
    ChatRequest, ChatResponse, ChatResponseWithTools, FunctionCall, FunctionDeclaration,
    LlmCapabilities, LlmProvider, TokenUsage,
};
use serde_json::{json, Value};

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// One scripted model response
#[derive(Debug)]
pub enum Scripted {
    /// Plain text reply
    Text(String),
    /// Tool-call request, optionally with text
    ToolCalls(Vec<FunctionCall>),
    /// Provider failure
    Fail(AppError),
}

/// Everything the provider was asked, in order
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub request: ChatRequest,
    /// `None` for `complete`, bound tool names for `complete_with_tools`
    pub tools: Option<Vec<String>>,
}

/// LLM provider that replays a script and records every request
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<RecordedCall>>,
    capabilities: LlmCapabilities,
}

impl ScriptedProvider {
    pub fn new(script: Vec<Scripted>) -> Arc<Self> {
        Self::with_capabilities(script, LlmCapabilities::openai())
    }

    pub fn with_capabilities(script: Vec<Scripted>, capabilities: LlmCapabilities) -> Arc<Self> {
        init_test_logging();
        Arc::new(Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
            capabilities,
        })
    }

    /// Recorded calls so far
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Scripted responses not yet consumed
    pub fn remaining(&self) -> usize {
        self.script.lock().unwrap().len()
    }

    fn next(&self, request: &ChatRequest, tools: Option<Vec<String>>) -> AppResult<Scripted> {
        self.calls.lock().unwrap().push(RecordedCall {
            request: request.clone(),
            tools,
        });
        match self.script.lock().unwrap().pop_front() {
            Some(Scripted::Fail(error)) => Err(error),
            Some(step) => Ok(step),
            None => Err(AppError::internal("script exhausted")),
        }
    }
}

const fn usage() -> TokenUsage {
    TokenUsage {
        prompt_tokens: 10,
        completion_tokens: 5,
        total_tokens: 15,
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn display_name(&self) -> &str {
        "Scripted Test Provider"
    }

    fn capabilities(&self) -> LlmCapabilities {
        self.capabilities
    }

    fn default_model(&self) -> &str {
        "scripted-model"
    }

    async fn complete(&self, request: &ChatRequest) -> AppResult<ChatResponse> {
        match self.next(request, None)? {
            Scripted::Text(content) => Ok(ChatResponse {
                content,
                model: "scripted-model".to_owned(),
                usage: Some(usage()),
                finish_reason: Some("stop".to_owned()),
            }),
            other => Err(AppError::internal(format!(
                "complete() got a non-text script step: {other:?}"
            ))),
        }
    }

    async fn complete_with_tools(
        &self,
        request: &ChatRequest,
        tools: &[FunctionDeclaration],
    ) -> AppResult<ChatResponseWithTools> {
        let names = tools.iter().map(|tool| tool.name.clone()).collect();
        let (content, function_calls, finish_reason) = match self.next(request, Some(names))? {
            Scripted::Text(text) => (Some(text), Vec::new(), "stop"),
            Scripted::ToolCalls(calls) => (None, calls, "tool_calls"),
            Scripted::Fail(_) => unreachable!("failures are returned by next()"),
        };
        Ok(ChatResponseWithTools {
            content,
            function_calls,
            model: "scripted-model".to_owned(),
            usage: Some(usage()),
            finish_reason: Some(finish_reason.to_owned()),
        })
    }
}

/// Build a tool call
pub fn tool_call(id: &str, name: &str, args: Value) -> FunctionCall {
    FunctionCall {
        id: id.to_owned(),
        name: name.to_owned(),
        args,
    }
}

pub fn text(reply: &str) -> Scripted {
    Scripted::Text(reply.to_owned())
}

pub fn banana_json() -> Value {
    json!({
        "food_name": "Banana",
        "nutrients": {
            "Calories": 105.0,
            "Protein": 1.3,
            "Carbohydrates": 27.0,
            "Total Fat": 0.4,
            "Fiber": 3.1,
            "Potassium (mg)": 422.0
        },
        "portion": {"description": "1 medium banana", "quantity": 118.0, "unit": "grams"},
        "ingredients": ["banana"],
        "recipe": "Peel and eat raw."
    })
}

pub fn pancake_recipe_json() -> Value {
    json!({
        "recipe_name": "Oat Pancakes",
        "ingredients": [
            {"name": "rolled oats", "quantity": 100.0, "unit": "gram"},
            {"name": "milk", "quantity": 1.0, "unit": "cup"},
            {"name": "egg", "quantity": 2.0, "unit": "piece"}
        ],
        "steps": ["Blend everything.", "Rest 5 minutes.", "Cook on a hot pan."],
        "serving_size": 4,
        "nutrients": {"Calories": 180.0, "Protein": 8.0}
    })
}

pub fn shopping_list_json() -> Value {
    json!({
        "title": "Weekly groceries",
        "items": [
            {"name": "Greek yogurt", "amount": "1 kg"},
            {"name": "Red lentils", "amount": "500 g"}
        ]
    })
}

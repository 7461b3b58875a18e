// ABOUTME: OpenAI-compatible chat completions client used for every model call
// ABOUTME: Handles tool binding, tool-call round trips, structured output and error mapping
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # `OpenAI`-Compatible Provider
//!
//! Implementation of [`LlmProvider`] for any endpoint that speaks the `OpenAI`
//! chat completions protocol: the hosted `OpenAI` API, Ollama, vLLM or
//! `LocalAI`.
//!
//! ## Example
//!
//! ```rust,no_run
//! use pierre_nutrition_assistant::config::LlmConfig;
//! use pierre_nutrition_assistant::errors::AppError;
//! use pierre_nutrition_assistant::llm::{
//!     ChatMessage, ChatRequest, LlmProvider, OpenAiCompatibleConfig, OpenAiCompatibleProvider,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), AppError> {
//!     let config = LlmConfig::from_env()?;
//!     let provider = OpenAiCompatibleProvider::new(OpenAiCompatibleConfig::from(&config))?;
//!     let request = ChatRequest::new(vec![ChatMessage::user("How much protein is in tofu?")]);
//!     let response = provider.complete(&request).await?;
//!     println!("{}", response.content);
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, error, info, instrument};

use super::{
    ChatMessage, ChatRequest, ChatResponse, ChatResponseWithTools, FunctionCall,
    FunctionDeclaration, LlmCapabilities, LlmProvider, MessageRole, ResponseFormat, TokenUsage,
};
use crate::config::{LlmConfig, LlmProviderType};
use crate::constants::llm_defaults;
use crate::errors::{AppError, AppResult};

/// Service label used in error messages
const SERVICE: &str = "LLM";

// ============================================================================
// API Request/Response Types (OpenAI-compatible format)
// ============================================================================

/// OpenAI-compatible API request structure
#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<OpenAiTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<OpenAiResponseFormat>,
}

/// Tool definition for OpenAI-compatible API
#[derive(Debug, Clone, Serialize)]
struct OpenAiTool {
    #[serde(rename = "type")]
    tool_type: String,
    function: OpenAiFunction,
}

/// Function definition within a tool
#[derive(Debug, Clone, Serialize)]
struct OpenAiFunction {
    name: String,
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameters: Option<Value>,
}

/// `response_format` request field
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum OpenAiResponseFormat {
    JsonObject,
    JsonSchema { json_schema: OpenAiJsonSchema },
}

#[derive(Debug, Serialize)]
struct OpenAiJsonSchema {
    name: String,
    schema: Value,
    strict: bool,
}

impl From<&ResponseFormat> for OpenAiResponseFormat {
    fn from(format: &ResponseFormat) -> Self {
        match format {
            ResponseFormat::JsonObject => Self::JsonObject,
            ResponseFormat::JsonSchema {
                name,
                schema,
                strict,
            } => Self::JsonSchema {
                json_schema: OpenAiJsonSchema {
                    name: name.clone(),
                    schema: schema.clone(),
                    strict: *strict,
                },
            },
        }
    }
}

/// Message structure for OpenAI-compatible API
#[derive(Debug, Clone, Serialize)]
struct OpenAiMessage {
    role: String,
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<OpenAiToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl From<&ChatMessage> for OpenAiMessage {
    fn from(msg: &ChatMessage) -> Self {
        let tool_calls = msg.has_tool_calls().then(|| {
            msg.tool_calls
                .iter()
                .map(OpenAiToolCall::from)
                .collect::<Vec<_>>()
        });
        // Assistant tool-call messages carry null content when there is no text
        let content = if tool_calls.is_some() && msg.content.is_empty() {
            None
        } else {
            Some(msg.content.clone())
        };

        Self {
            role: msg.role.as_str().to_owned(),
            content,
            tool_calls,
            tool_call_id: match msg.role {
                MessageRole::Tool => msg.tool_call_id.clone(),
                _ => None,
            },
        }
    }
}

/// OpenAI-compatible API response structure
#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    #[serde(default)]
    usage: Option<OpenAiUsage>,
    model: String,
}

/// Choice in response
#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
    finish_reason: Option<String>,
}

/// Message in response
#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<OpenAiToolCall>>,
}

/// Tool call, both as returned by the model and as replayed in history
#[derive(Debug, Clone, Serialize, Deserialize)]
struct OpenAiToolCall {
    id: String,
    #[serde(rename = "type")]
    call_type: String,
    function: OpenAiFunctionCall,
}

impl From<&FunctionCall> for OpenAiToolCall {
    fn from(call: &FunctionCall) -> Self {
        Self {
            id: call.id.clone(),
            call_type: "function".to_owned(),
            function: OpenAiFunctionCall {
                name: call.name.clone(),
                arguments: call.args.to_string(),
            },
        }
    }
}

/// Function call details; `arguments` is a JSON-encoded string on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
struct OpenAiFunctionCall {
    name: String,
    arguments: String,
}

/// Usage statistics in response
#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    #[serde(rename = "prompt_tokens")]
    prompt: u32,
    #[serde(rename = "completion_tokens")]
    completion: u32,
    #[serde(rename = "total_tokens")]
    total: u32,
}

impl From<OpenAiUsage> for TokenUsage {
    fn from(usage: OpenAiUsage) -> Self {
        Self {
            prompt_tokens: usage.prompt,
            completion_tokens: usage.completion,
            total_tokens: usage.total,
        }
    }
}

/// Error response structure
#[derive(Debug, Deserialize)]
struct OpenAiErrorResponse {
    error: OpenAiErrorDetail,
}

/// Error detail structure
#[derive(Debug, Deserialize)]
struct OpenAiErrorDetail {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
}

// ============================================================================
// Provider Configuration
// ============================================================================

/// Configuration for the `OpenAI`-compatible provider
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleConfig {
    /// Base URL for the API (e.g., <https://api.openai.com/v1>)
    pub base_url: String,
    /// API key (optional for local servers)
    pub api_key: Option<String>,
    /// Default model to use
    pub default_model: String,
    /// Provider name for logging
    pub provider_name: String,
    /// Provider display name
    pub display_name: String,
    /// Capabilities of this provider
    pub capabilities: LlmCapabilities,
    /// TCP connect timeout
    pub connect_timeout: Duration,
    /// Whole-request timeout
    pub request_timeout: Duration,
}

impl OpenAiCompatibleConfig {
    /// Configuration for the hosted `OpenAI` API
    #[must_use]
    pub fn openai(api_key: impl Into<String>, model: &str) -> Self {
        Self {
            base_url: llm_defaults::OPENAI_BASE_URL.to_owned(),
            api_key: Some(api_key.into()),
            default_model: model.to_owned(),
            provider_name: "openai".to_owned(),
            display_name: "OpenAI".to_owned(),
            capabilities: LlmCapabilities::openai(),
            ..Self::default()
        }
    }

    /// Configuration for a local Ollama instance
    #[must_use]
    pub fn ollama(model: &str) -> Self {
        Self {
            default_model: model.to_owned(),
            provider_name: "ollama".to_owned(),
            display_name: "Ollama (Local)".to_owned(),
            ..Self::default()
        }
    }

    /// Point the client at a different base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl Default for OpenAiCompatibleConfig {
    fn default() -> Self {
        Self {
            base_url: llm_defaults::LOCAL_BASE_URL.to_owned(),
            api_key: None,
            default_model: llm_defaults::LOCAL_MODEL.to_owned(),
            provider_name: "local".to_owned(),
            display_name: "Local LLM".to_owned(),
            capabilities: LlmCapabilities::FUNCTION_CALLING | LlmCapabilities::JSON_MODE,
            connect_timeout: Duration::from_secs(llm_defaults::CONNECT_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(llm_defaults::REQUEST_TIMEOUT_SECS),
        }
    }
}

impl From<&LlmConfig> for OpenAiCompatibleConfig {
    fn from(config: &LlmConfig) -> Self {
        let (provider_name, display_name, capabilities) = match config.provider {
            LlmProviderType::OpenAi => ("openai", "OpenAI", LlmCapabilities::openai()),
            LlmProviderType::Local => (
                "local",
                "Local LLM",
                LlmCapabilities::FUNCTION_CALLING | LlmCapabilities::JSON_MODE,
            ),
        };

        Self {
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            default_model: config.model.clone(),
            provider_name: provider_name.to_owned(),
            display_name: display_name.to_owned(),
            capabilities,
            connect_timeout: config.connect_timeout,
            request_timeout: config.request_timeout,
        }
    }
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// `OpenAI`-compatible LLM provider
pub struct OpenAiCompatibleProvider {
    client: Client,
    config: OpenAiCompatibleConfig,
}

impl OpenAiCompatibleProvider {
    /// Create a new provider with the given configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: OpenAiCompatibleConfig) -> AppResult<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;

        info!(
            "Initializing {} provider: base_url={}, model={}",
            config.display_name, config.base_url, config.default_model
        );

        Ok(Self { client, config })
    }

    /// Build the API URL for a given endpoint
    fn api_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint
        )
    }

    fn build_request(
        &self,
        request: &ChatRequest,
        tools: Option<Vec<OpenAiTool>>,
    ) -> OpenAiRequest {
        let messages: Vec<OpenAiMessage> =
            request.messages.iter().map(OpenAiMessage::from).collect();
        Self::log_messages_debug(&messages, &self.config.provider_name, tools.is_some());

        OpenAiRequest {
            model: request
                .model
                .clone()
                .unwrap_or_else(|| self.config.default_model.clone()),
            messages,
            temperature: request.temperature,
            stream: false,
            tool_choice: tools.as_ref().map(|_| "auto".to_owned()),
            tools,
            response_format: request.response_format.as_ref().map(Into::into),
        }
    }

    /// Log message details for debugging LLM interactions
    fn log_messages_debug(messages: &[OpenAiMessage], provider_name: &str, has_tools: bool) {
        for (i, msg) in messages.iter().enumerate() {
            debug!(
                "Message[{i}] role={}, content_len={}, tool_calls={}",
                msg.role,
                msg.content.as_ref().map_or(0, String::len),
                msg.tool_calls.as_ref().map_or(0, Vec::len)
            );
        }
        debug!(
            "Sending chat completion request to {provider_name} with {} messages and tools={has_tools}",
            messages.len()
        );
    }

    /// POST the request and decode the first choice
    async fn send(&self, body: &OpenAiRequest) -> AppResult<(OpenAiChoice, String, Option<TokenUsage>)> {
        let mut http_request = self
            .client
            .post(self.api_url("chat/completions"))
            .header("Content-Type", "application/json")
            .json(body);
        if let Some(ref api_key) = self.config.api_key {
            http_request = http_request.header("Authorization", format!("Bearer {api_key}"));
        }

        let response = http_request.send().await.map_err(|e| {
            error!(
                "Failed to send request to {}: {}",
                self.config.provider_name, e
            );
            if e.is_connect() || e.is_timeout() {
                AppError::external_unavailable(
                    SERVICE,
                    format!(
                        "Cannot reach {} at {}",
                        self.config.display_name, self.config.base_url
                    ),
                )
                .with_source(e)
            } else {
                AppError::external_service(SERVICE, format!("Failed to send request: {e}"))
            }
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            error!("Failed to read API response: {}", e);
            AppError::external_service(SERVICE, format!("Failed to read response: {e}"))
        })?;

        if !status.is_success() {
            return Err(Self::parse_error_response(status, &text));
        }

        let openai_response: OpenAiResponse = serde_json::from_str(&text).map_err(|e| {
            error!(
                "Failed to parse API response: {} - body: {}",
                e,
                text.chars().take(500).collect::<String>()
            );
            AppError::external_service(SERVICE, format!("Failed to parse response: {e}"))
        })?;

        let choice = openai_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::external_service(SERVICE, "API returned no choices"))?;

        Ok((
            choice,
            openai_response.model,
            openai_response.usage.map(Into::into),
        ))
    }

    /// Parse error response from API
    fn parse_error_response(status: StatusCode, body: &str) -> AppError {
        if let Ok(error_response) = serde_json::from_str::<OpenAiErrorResponse>(body) {
            let detail = error_response.error;
            match status.as_u16() {
                401 | 403 => {
                    AppError::auth_invalid(format!("API authentication failed: {}", detail.message))
                }
                429 => AppError::rate_limited(Self::extract_rate_limit_message(&detail.message)),
                400 => AppError::invalid_input(format!("API validation error: {}", detail.message)),
                404 => AppError::not_found(format!("Model or endpoint ({})", detail.message)),
                502..=504 => AppError::external_unavailable(SERVICE, detail.message),
                _ => AppError::external_service(
                    SERVICE,
                    format!(
                        "{} - {}",
                        detail.error_type.as_deref().unwrap_or("unknown"),
                        detail.message
                    ),
                ),
            }
        } else {
            match status.as_u16() {
                502..=504 => AppError::external_unavailable(
                    SERVICE,
                    format!("Server is not responding ({status})"),
                ),
                _ => AppError::external_service(
                    SERVICE,
                    format!(
                        "API error ({}): {}",
                        status,
                        body.chars().take(200).collect::<String>()
                    ),
                ),
            }
        }
    }

    /// Extract a user-friendly rate limit message
    fn extract_rate_limit_message(message: &str) -> String {
        const MARKER: &str = "try again in ";
        let lower = message.to_lowercase();
        if let Some(retry_pos) = lower.find(MARKER) {
            let after_prefix = &lower[retry_pos + MARKER.len()..];
            let end_pos = after_prefix
                .find(|c: char| !c.is_ascii_digit() && c != '.')
                .unwrap_or(after_prefix.len());
            if let Ok(amount) = after_prefix[..end_pos].parse::<f64>() {
                // Providers report "20ms", "1.5s" or "2m"; sub-second waits round up to 1
                let unit = &after_prefix[end_pos..];
                let seconds = if unit.starts_with("ms") {
                    (amount / 1000.0).max(1.0)
                } else if unit.starts_with('m') {
                    amount * 60.0
                } else {
                    amount
                };
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let seconds_int = seconds.ceil() as u64;
                return format!("LLM rate limit reached. Please try again in {seconds_int} seconds.");
            }
        }
        "LLM rate limit reached. Please wait a moment and try again.".to_owned()
    }

    fn convert_tools(tools: &[FunctionDeclaration]) -> Vec<OpenAiTool> {
        tools
            .iter()
            .map(|func| OpenAiTool {
                tool_type: "function".to_owned(),
                function: OpenAiFunction {
                    name: func.name.clone(),
                    description: func.description.clone(),
                    parameters: func.parameters.clone(),
                },
            })
            .collect()
    }

    /// Convert tool calls to internal `FunctionCall` format
    ///
    /// Arguments that are not valid JSON are kept as a raw string so the tool
    /// registry can reject them with a descriptive error.
    fn convert_tool_calls(tool_calls: Vec<OpenAiToolCall>) -> Vec<FunctionCall> {
        tool_calls
            .into_iter()
            .map(|call| {
                debug!(
                    tool_call_id = %call.id,
                    tool_call_type = %call.call_type,
                    function_name = %call.function.name,
                    "Converting tool call to FunctionCall"
                );
                let args = if call.function.arguments.trim().is_empty() {
                    Value::Object(Map::new())
                } else {
                    serde_json::from_str(&call.function.arguments)
                        .unwrap_or(Value::String(call.function.arguments))
                };
                FunctionCall {
                    id: call.id,
                    name: call.function.name,
                    args,
                }
            })
            .collect()
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.config.provider_name
    }

    fn display_name(&self) -> &str {
        &self.config.display_name
    }

    fn capabilities(&self) -> LlmCapabilities {
        self.config.capabilities
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }

    #[instrument(skip(self, request), fields(model = %request.model.as_deref().unwrap_or(&self.config.default_model)))]
    async fn complete(&self, request: &ChatRequest) -> AppResult<ChatResponse> {
        let body = self.build_request(request, None);
        let (choice, model, usage) = self.send(&body).await?;
        let content = choice.message.content.unwrap_or_default();

        debug!(
            "Received response from {}: {} chars, finish_reason: {:?}",
            self.config.provider_name,
            content.len(),
            choice.finish_reason
        );

        Ok(ChatResponse {
            content,
            model,
            usage,
            finish_reason: choice.finish_reason,
        })
    }

    #[instrument(skip(self, request, tools), fields(model = %request.model.as_deref().unwrap_or(&self.config.default_model), tools = tools.len()))]
    async fn complete_with_tools(
        &self,
        request: &ChatRequest,
        tools: &[FunctionDeclaration],
    ) -> AppResult<ChatResponseWithTools> {
        let openai_tools = (!tools.is_empty()).then(|| Self::convert_tools(tools));
        let body = self.build_request(request, openai_tools);
        let (choice, model, usage) = self.send(&body).await?;

        let function_calls = choice
            .message
            .tool_calls
            .map(|calls| {
                info!(
                    "{} returned {} tool calls",
                    self.config.provider_name,
                    calls.len()
                );
                Self::convert_tool_calls(calls)
            })
            .unwrap_or_default();

        debug!(
            "Received response from {}: content={:?}, tool_calls={}, finish_reason: {:?}",
            self.config.provider_name,
            choice.message.content.as_ref().map(String::len),
            function_calls.len(),
            choice.finish_reason
        );

        Ok(ChatResponseWithTools {
            content: choice.message.content,
            function_calls,
            model,
            usage,
            finish_reason: choice.finish_reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::errors::ErrorCode;

    #[test]
    fn test_rate_limit_message_extracts_seconds() {
        let msg = OpenAiCompatibleProvider::extract_rate_limit_message(
            "Rate limit reached for gpt-4o. Please try again in 1.5s.",
        );
        assert_eq!(msg, "LLM rate limit reached. Please try again in 2 seconds.");
    }

    #[test]
    fn test_rate_limit_message_converts_units() {
        let retry = |hint: &str| {
            OpenAiCompatibleProvider::extract_rate_limit_message(&format!(
                "Rate limit reached. Please try again in {hint}. Visit the docs."
            ))
        };
        assert!(retry("20ms").contains("try again in 1 seconds"));
        assert!(retry("1200ms").contains("try again in 2 seconds"));
        assert!(retry("2m").contains("try again in 120 seconds"));
        assert!(retry("7s").contains("try again in 7 seconds"));
    }

    #[test]
    fn test_rate_limit_message_fallback() {
        let msg = OpenAiCompatibleProvider::extract_rate_limit_message("slow down");
        assert!(msg.contains("wait a moment"));
    }

    #[test]
    fn test_assistant_tool_call_message_serializes_null_content() {
        let call = FunctionCall {
            id: "call_1".to_owned(),
            name: "get_food_stats".to_owned(),
            args: json!({"query": "banana"}),
        };
        let message = ChatMessage::assistant_tool_calls(None, vec![call.clone()]);
        let wire = serde_json::to_value(OpenAiMessage::from(&message)).unwrap();

        assert_eq!(wire["role"], "assistant");
        assert!(wire["content"].is_null());
        assert_eq!(wire["tool_calls"][0]["id"], "call_1");
        assert_eq!(wire["tool_calls"][0]["type"], "function");
        assert_eq!(
            wire["tool_calls"][0]["function"]["arguments"],
            r#"{"query":"banana"}"#
        );

        let result = ChatMessage::tool_result(&call, "{}");
        let wire = serde_json::to_value(OpenAiMessage::from(&result)).unwrap();
        assert_eq!(wire["role"], "tool");
        assert_eq!(wire["tool_call_id"], "call_1");
    }

    #[test]
    fn test_unparseable_arguments_kept_as_string() {
        let calls = OpenAiCompatibleProvider::convert_tool_calls(vec![OpenAiToolCall {
            id: "c".to_owned(),
            call_type: "function".to_owned(),
            function: OpenAiFunctionCall {
                name: "get_recipe".to_owned(),
                arguments: "{not json".to_owned(),
            },
        }]);
        assert_eq!(calls[0].args, Value::String("{not json".to_owned()));
    }

    #[test]
    fn test_response_format_wire_shape() {
        let format = ResponseFormat::JsonSchema {
            name: "ShoppingList".to_owned(),
            schema: json!({"type": "object"}),
            strict: false,
        };
        let wire = serde_json::to_value(OpenAiResponseFormat::from(&format)).unwrap();
        assert_eq!(wire["type"], "json_schema");
        assert_eq!(wire["json_schema"]["name"], "ShoppingList");
        assert_eq!(wire["json_schema"]["strict"], false);
    }

    #[test]
    fn test_error_status_mapping() {
        let body = r#"{"error": {"message": "bad key", "type": "invalid_request_error"}}"#;
        let err = OpenAiCompatibleProvider::parse_error_response(StatusCode::UNAUTHORIZED, body);
        assert_eq!(err.code, ErrorCode::ExternalAuthFailed);

        let err =
            OpenAiCompatibleProvider::parse_error_response(StatusCode::BAD_GATEWAY, "<html>");
        assert_eq!(err.code, ErrorCode::ExternalServiceUnavailable);
    }
}

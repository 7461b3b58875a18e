// ABOUTME: Two-node tool-dispatch loop that runs one conversational turn
// ABOUTME: Alternates model and tool nodes until the model replies without requesting a tool
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use super::state::ConversationState;
use crate::config::AgentConfig;
use crate::errors::{AppError, AppResult};
use crate::llm::{ChatMessage, ChatRequest, FunctionDeclaration, LlmProvider, TokenUsage};
use crate::tools::ToolRegistry;

/// Node of the dispatch loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentNode {
    /// Ask the model for a reply or tool calls
    Model,
    /// Execute the tool calls of the latest model message
    Tools,
    /// Turn finished
    End,
}

impl AgentNode {
    /// Node following the model node for the given state
    #[must_use]
    pub fn after_model(state: &ConversationState) -> Self {
        if state.pending_tool_calls().is_empty() {
            Self::End
        } else {
            Self::Tools
        }
    }
}

/// Result of one completed turn
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnOutcome {
    /// Final assistant reply
    pub reply: String,
    /// Number of tool calls executed during the turn
    pub tool_calls: usize,
    /// Node executions performed
    pub steps: usize,
    /// Token usage summed over every model call of the turn
    pub usage: TokenUsage,
}

/// The nutritionist agent
pub struct NutritionAgent {
    provider: Arc<dyn LlmProvider>,
    tools: ToolRegistry,
    config: AgentConfig,
    model: Option<String>,
}

impl NutritionAgent {
    /// Create an agent over an explicit tool registry
    #[must_use]
    pub const fn new(
        provider: Arc<dyn LlmProvider>,
        tools: ToolRegistry,
        config: AgentConfig,
    ) -> Self {
        Self {
            provider,
            tools,
            config,
            model: None,
        }
    }

    /// Agent with the food stats, recipe and shopping list tools
    ///
    /// The same provider and model serve the agent and its chains.
    #[must_use]
    pub fn with_nutrition_tools(
        provider: Arc<dyn LlmProvider>,
        config: AgentConfig,
        model: Option<String>,
    ) -> Self {
        let tools = ToolRegistry::with_nutrition_tools(&provider, model.as_deref());
        Self {
            provider,
            tools,
            config,
            model,
        }
    }

    /// Use a specific model for the model node
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Registered tools
    #[must_use]
    pub const fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Loop settings
    #[must_use]
    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Run one turn for `user_text`
    ///
    /// The user message and every model and tool message produced are
    /// appended to `state`. On error `state` holds whatever was appended
    /// before the failure; callers that need atomic turns should run on a
    /// copy.
    ///
    /// # Errors
    ///
    /// Propagates provider and tool errors unchanged and returns
    /// `ToolLoopExceeded` when the turn needs more than the configured
    /// number of node executions.
    #[instrument(skip(self, state, user_text), fields(history = state.messages.len()))]
    pub async fn run_turn(
        &self,
        state: &mut ConversationState,
        user_text: &str,
    ) -> AppResult<TurnOutcome> {
        state.push(ChatMessage::user(user_text));
        let declarations = self.tools.declarations()?;

        let mut outcome = TurnOutcome::default();
        let mut node = AgentNode::Model;

        while node != AgentNode::End {
            if outcome.steps >= self.config.max_steps {
                warn!(
                    steps = outcome.steps,
                    "Turn exceeded the step limit while the model kept requesting tools"
                );
                return Err(AppError::tool_loop_exceeded(self.config.max_steps));
            }
            outcome.steps += 1;

            node = match node {
                AgentNode::Model => {
                    if let Some(usage) = self.model_node(state, &declarations).await? {
                        outcome.usage += usage;
                    }
                    AgentNode::after_model(state)
                }
                AgentNode::Tools => {
                    outcome.tool_calls += self.tool_node(state).await?;
                    AgentNode::Model
                }
                AgentNode::End => AgentNode::End,
            };
        }

        outcome.reply = state.last_reply().unwrap_or_default().to_owned();
        info!(
            steps = outcome.steps,
            tool_calls = outcome.tool_calls,
            total_tokens = outcome.usage.total_tokens,
            "Turn complete"
        );
        Ok(outcome)
    }

    /// Invoke the model with the tools bound and append its message
    async fn model_node(
        &self,
        state: &mut ConversationState,
        declarations: &[FunctionDeclaration],
    ) -> AppResult<Option<TokenUsage>> {
        let mut request =
            ChatRequest::new(state.model_messages()).with_temperature(self.config.temperature);
        if let Some(ref model) = self.model {
            request = request.with_model(model.as_str());
        }

        let response = self
            .provider
            .complete_with_tools(&request, declarations)
            .await?;
        let usage = response.usage;
        debug!(
            provider = %self.provider.display_name(),
            model = %self.model.as_deref().unwrap_or_else(|| self.provider.default_model()),
            tool_calls = response.function_calls.len(),
            finish_reason = ?response.finish_reason,
            "Model node responded"
        );

        state.push(response.into_message());
        Ok(usage)
    }

    /// Execute pending tool calls in emitted order, one result message each
    async fn tool_node(&self, state: &mut ConversationState) -> AppResult<usize> {
        let calls = state.pending_tool_calls().to_vec();

        for call in &calls {
            info!(tool = %call.name, call_id = %call.id, "Executing tool call");
            let result = self.tools.execute(call).await?;
            state.push(ChatMessage::tool_result(call, serde_json::to_string(&result)?));
        }
        Ok(calls.len())
    }
}

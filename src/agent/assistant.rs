// ABOUTME: NutritionAssistant facade binding the agent to session checkpoints
// ABOUTME: Starts sessions, runs turns atomically per session and exposes history
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use super::checkpoint::{InMemoryCheckpointer, SessionCheckpointer};
use super::dispatch::{NutritionAgent, TurnOutcome};
use super::state::ConversationState;
use crate::config::AssistantConfig;
use crate::errors::AppResult;
use crate::llm::{ChatMessage, LlmProvider, OpenAiCompatibleConfig, OpenAiCompatibleProvider};

/// Multi-session nutrition assistant
///
/// # Example
///
/// ```rust,no_run
/// use pierre_nutrition_assistant::agent::NutritionAssistant;
/// use pierre_nutrition_assistant::config::AssistantConfig;
/// use pierre_nutrition_assistant::errors::AppError;
///
/// #[tokio::main]
/// async fn main() -> Result<(), AppError> {
///     let assistant = NutritionAssistant::from_config(&AssistantConfig::from_env()?)?;
///     assistant
///         .start_session("alice", "Oatmeal breakfasts, salad lunches", "Vegetarian")
///         .await?;
///     let outcome = assistant.send("alice", "How many calories in a banana?").await?;
///     println!("{}", outcome.reply);
///     Ok(())
/// }
/// ```
pub struct NutritionAssistant {
    agent: NutritionAgent,
    checkpointer: Arc<dyn SessionCheckpointer>,
}

impl NutritionAssistant {
    /// Combine an agent with a checkpoint store
    #[must_use]
    pub fn new(agent: NutritionAgent, checkpointer: Arc<dyn SessionCheckpointer>) -> Self {
        Self {
            agent,
            checkpointer,
        }
    }

    /// Build the assistant from resolved configuration
    ///
    /// Creates the single `OpenAI`-compatible provider shared by the agent and
    /// all chains, and an in-memory checkpoint store.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn from_config(config: &AssistantConfig) -> AppResult<Self> {
        let provider: Arc<dyn LlmProvider> = Arc::new(OpenAiCompatibleProvider::new(
            OpenAiCompatibleConfig::from(&config.llm),
        )?);
        let agent = NutritionAgent::with_nutrition_tools(
            provider,
            config.agent,
            Some(config.llm.model.clone()),
        );
        Ok(Self::new(agent, Arc::new(InMemoryCheckpointer::new())))
    }

    /// The underlying agent
    #[must_use]
    pub const fn agent(&self) -> &NutritionAgent {
        &self.agent
    }

    /// Start (or restart) `session_id` with an empty history
    ///
    /// # Errors
    ///
    /// Returns an error if the checkpoint store fails.
    #[instrument(skip(self, meal_plan, food_preferences))]
    pub async fn start_session(
        &self,
        session_id: &str,
        meal_plan: &str,
        food_preferences: &str,
    ) -> AppResult<()> {
        info!("Starting session");
        self.checkpointer
            .save(session_id, ConversationState::new(meal_plan, food_preferences))
            .await
    }

    /// Start a session under a freshly generated id
    ///
    /// # Errors
    ///
    /// Returns an error if the checkpoint store fails.
    pub async fn start_new_session(
        &self,
        meal_plan: &str,
        food_preferences: &str,
    ) -> AppResult<String> {
        let session_id = Uuid::new_v4().to_string();
        self.start_session(&session_id, meal_plan, food_preferences)
            .await?;
        Ok(session_id)
    }

    /// Run one turn in `session_id`
    ///
    /// An unknown session starts from an empty state with empty context. The
    /// checkpoint is only replaced when the turn succeeds.
    ///
    /// # Errors
    ///
    /// Propagates any error from the turn or the checkpoint store.
    #[instrument(skip(self, user_text))]
    pub async fn send(&self, session_id: &str, user_text: &str) -> AppResult<TurnOutcome> {
        let mut state = self
            .checkpointer
            .load(session_id)
            .await?
            .unwrap_or_default();

        let outcome = self.agent.run_turn(&mut state, user_text).await?;
        self.checkpointer.save(session_id, state).await?;
        Ok(outcome)
    }

    /// Conversation history of `session_id` (empty when unknown)
    ///
    /// # Errors
    ///
    /// Returns an error if the checkpoint store fails.
    pub async fn history(&self, session_id: &str) -> AppResult<Vec<ChatMessage>> {
        Ok(self
            .checkpointer
            .load(session_id)
            .await?
            .map(|state| state.messages)
            .unwrap_or_default())
    }

    /// Drop `session_id`, returning whether it existed
    ///
    /// # Errors
    ///
    /// Returns an error if the checkpoint store fails.
    pub async fn end_session(&self, session_id: &str) -> AppResult<bool> {
        self.checkpointer.delete(session_id).await
    }
}

// ABOUTME: Shopping list chain producing a ShoppingList from meal plan, preferences and duration
// ABOUTME: Requests schema-bound output from the model and validates the returned record
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use super::prompt_request;
use crate::errors::AppResult;
use crate::llm::prompts::{render, SHOPPING_LIST_TEMPLATE};
use crate::llm::{ChatRequest, LlmProvider, ResponseFormat};
use crate::models::ShoppingList;
use crate::schema::{format_instructions, json_schema, parse_structured, StructuredOutput};

/// Shopping list generator
#[derive(Clone)]
pub struct ShoppingListChain {
    provider: Arc<dyn LlmProvider>,
    model: Option<String>,
}

impl ShoppingListChain {
    /// Create a chain that uses the provider's default model
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            provider,
            model: None,
        }
    }

    /// Use a specific model instead of the provider default
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Render the prompt for the given session context
    #[must_use]
    pub fn build_prompt(meal_plan: &str, food_preferences: &str, duration: &str) -> String {
        render(
            SHOPPING_LIST_TEMPLATE,
            &[
                ("meal_plan", meal_plan),
                ("food_preferences", food_preferences),
                ("duration", duration),
            ],
        )
    }

    /// Build the schema-bound request
    ///
    /// Providers without native structured output get the schema as prompt
    /// instructions plus JSON mode instead.
    fn build_request(
        &self,
        meal_plan: &str,
        food_preferences: &str,
        duration: &str,
    ) -> AppResult<ChatRequest> {
        let prompt = Self::build_prompt(meal_plan, food_preferences, duration);
        let capabilities = self.provider.capabilities();

        if capabilities.supports_structured_output() {
            let format = ResponseFormat::JsonSchema {
                name: ShoppingList::RECORD_NAME.to_owned(),
                schema: json_schema::<ShoppingList>()?,
                strict: false,
            };
            return Ok(prompt_request(prompt, self.model.as_deref()).with_response_format(format));
        }

        warn!(
            provider = %self.provider.name(),
            "Provider lacks structured output, falling back to prompt instructions"
        );
        let prompt = format!("{prompt}\n\n{}", format_instructions::<ShoppingList>()?);
        let request = prompt_request(prompt, self.model.as_deref());
        Ok(if capabilities.supports_json_mode() {
            request.with_response_format(ResponseFormat::JsonObject)
        } else {
            request
        })
    }

    /// Generate a shopping list
    ///
    /// # Errors
    ///
    /// Propagates transport errors from the provider and returns
    /// `SchemaValidation` if the reply is not a valid [`ShoppingList`].
    #[instrument(skip(self, meal_plan, food_preferences), fields(provider = %self.provider.name()))]
    pub async fn invoke(
        &self,
        meal_plan: &str,
        food_preferences: &str,
        duration: &str,
    ) -> AppResult<ShoppingList> {
        let request = self.build_request(meal_plan, food_preferences, duration)?;
        let response = self.provider.complete(&request).await?;
        let list: ShoppingList = parse_structured(&response.content)?;

        debug!(title = %list.title, items = list.items.len(), "Shopping list parsed");
        Ok(list)
    }
}

// ABOUTME: Food stats chain producing FoodDetails for a free-text food name
// ABOUTME: Embeds JSON Schema format instructions in the prompt and parses the raw reply
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use tracing::{debug, instrument};

use super::prompt_request;
use crate::errors::AppResult;
use crate::llm::prompts::{render, FOOD_STATS_TEMPLATE};
use crate::llm::LlmProvider;
use crate::models::FoodDetails;
use crate::schema::{format_instructions, parse_structured};

/// Nutrition facts lookup for any food
#[derive(Clone)]
pub struct FoodStatsChain {
    provider: Arc<dyn LlmProvider>,
    model: Option<String>,
}

impl FoodStatsChain {
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

    /// Render the prompt sent for `food_name`
    ///
    /// # Errors
    ///
    /// Returns an error if the record schema cannot be rendered.
    pub fn build_prompt(food_name: &str) -> AppResult<String> {
        let instructions = format_instructions::<FoodDetails>()?;
        Ok(render(
            FOOD_STATS_TEMPLATE,
            &[
                ("food_name", food_name),
                ("format_instructions", &instructions),
            ],
        ))
    }

    /// Look up nutrition facts for `food_name`
    ///
    /// # Errors
    ///
    /// Propagates transport errors from the provider and returns
    /// `SchemaValidation` if the reply is not a valid [`FoodDetails`].
    #[instrument(skip(self), fields(provider = %self.provider.name()))]
    pub async fn invoke(&self, food_name: &str) -> AppResult<FoodDetails> {
        let request = prompt_request(Self::build_prompt(food_name)?, self.model.as_deref());
        let response = self.provider.complete(&request).await?;
        let details: FoodDetails = parse_structured(&response.content)?;

        debug!(
            food = %details.food_name,
            nutrients = details.nutrients.len(),
            "Food stats parsed"
        );
        Ok(details)
    }
}

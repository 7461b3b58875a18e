// ABOUTME: Recipe chain producing RecipeDetails for a dish and an optional requested yield
// ABOUTME: Same render, complete and parse pattern as the food stats chain
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use tracing::{debug, instrument};

use super::prompt_request;
use crate::errors::AppResult;
use crate::llm::prompts::{render, RECIPE_TEMPLATE};
use crate::llm::LlmProvider;
use crate::models::RecipeDetails;
use crate::schema::{format_instructions, parse_structured};

/// Recipe generator
#[derive(Clone)]
pub struct RecipeChain {
    provider: Arc<dyn LlmProvider>,
    model: Option<String>,
}

impl RecipeChain {
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

    /// Render the prompt for `recipe_name`, optionally scaled to `amount`
    ///
    /// # Errors
    ///
    /// Returns an error if the record schema cannot be rendered.
    pub fn build_prompt(recipe_name: &str, amount: Option<&str>) -> AppResult<String> {
        let instructions = format_instructions::<RecipeDetails>()?;
        let yield_clause = amount
            .map(str::trim)
            .filter(|amount| !amount.is_empty())
            .map(|amount| format!(" that yields {amount}"))
            .unwrap_or_default();

        Ok(render(
            RECIPE_TEMPLATE,
            &[
                ("recipe_name", recipe_name),
                ("yield_clause", &yield_clause),
                ("format_instructions", &instructions),
            ],
        ))
    }

    /// Generate a recipe for `recipe_name`
    ///
    /// # Errors
    ///
    /// Propagates transport errors from the provider and returns
    /// `SchemaValidation` if the reply is not a valid [`RecipeDetails`].
    #[instrument(skip(self), fields(provider = %self.provider.name()))]
    pub async fn invoke(&self, recipe_name: &str, amount: Option<&str>) -> AppResult<RecipeDetails> {
        let request = prompt_request(
            Self::build_prompt(recipe_name, amount)?,
            self.model.as_deref(),
        );
        let response = self.provider.complete(&request).await?;
        let recipe: RecipeDetails = parse_structured(&response.content)?;

        debug!(
            recipe = %recipe.recipe_name,
            ingredients = recipe.ingredients.len(),
            steps = recipe.steps.len(),
            servings = recipe.serving_size,
            "Recipe parsed"
        );
        Ok(recipe)
    }
}

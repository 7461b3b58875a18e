// ABOUTME: get_recipe tool wrapping the recipe chain
// ABOUTME: Takes a dish name and an optional requested yield, returns RecipeDetails as JSON
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

use super::{decode_args, parameters_schema, AssistantTool};
use crate::chains::RecipeChain;
use crate::constants::tool_names;
use crate::errors::AppResult;

/// Arguments of `get_recipe`
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RecipeArgs {
    /// Name of the dish
    pub query: String,
    /// Requested yield, e.g. "4 servings" or "1 kg"
    #[serde(default)]
    pub amount: Option<String>,
}

/// Recipe builder tool
pub struct GetRecipeTool {
    chain: RecipeChain,
}

impl GetRecipeTool {
    /// Wrap a recipe chain
    #[must_use]
    pub const fn new(chain: RecipeChain) -> Self {
        Self { chain }
    }
}

#[async_trait]
impl AssistantTool for GetRecipeTool {
    fn name(&self) -> &'static str {
        tool_names::GET_RECIPE
    }

    fn description(&self) -> &'static str {
        "This function will take the name of a dish and, optionally, the requested amount (servings or total weight) and come up with a practical recipe"
    }

    fn parameters(&self) -> AppResult<Value> {
        parameters_schema::<RecipeArgs>()
    }

    async fn execute(&self, args: Value) -> AppResult<Value> {
        let args: RecipeArgs = decode_args(self.name(), args)?;
        let recipe = self
            .chain
            .invoke(&args.query, args.amount.as_deref())
            .await?;
        Ok(serde_json::to_value(recipe)?)
    }
}

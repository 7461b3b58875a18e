// ABOUTME: get_shopping_list tool wrapping the shopping list chain
// ABOUTME: Passes the meal plan, preferences and duration chosen by the model to the chain
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{decode_args, parameters_schema, AssistantTool};
use crate::chains::ShoppingListChain;
use crate::constants::tool_names;
use crate::errors::AppResult;

/// Arguments of `get_shopping_list`
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ShoppingListArgs {
    /// The user's request in their own words
    pub query: String,
    /// The user's meal plan
    pub meal_plan: String,
    /// The user's food preferences
    pub food_preferences: String,
    /// How long the groceries should last, e.g. "1 week"
    pub duration: String,
}

/// Shopping list tool
pub struct GetShoppingListTool {
    chain: ShoppingListChain,
}

impl GetShoppingListTool {
    /// Wrap a shopping list chain
    #[must_use]
    pub const fn new(chain: ShoppingListChain) -> Self {
        Self { chain }
    }
}

#[async_trait]
impl AssistantTool for GetShoppingListTool {
    fn name(&self) -> &'static str {
        tool_names::GET_SHOPPING_LIST
    }

    fn description(&self) -> &'static str {
        "This function has access to the user's meal plan and also to their food preferences. It will generate the shopping list for the requested duration"
    }

    fn parameters(&self) -> AppResult<Value> {
        parameters_schema::<ShoppingListArgs>()
    }

    async fn execute(&self, args: Value) -> AppResult<Value> {
        let args: ShoppingListArgs = decode_args(self.name(), args)?;
        debug!(query = %args.query, duration = %args.duration, "Building shopping list");
        let list = self
            .chain
            .invoke(&args.meal_plan, &args.food_preferences, &args.duration)
            .await?;
        Ok(serde_json::to_value(list)?)
    }
}

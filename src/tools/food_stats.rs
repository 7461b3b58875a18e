// ABOUTME: get_food_stats tool wrapping the food stats chain
// ABOUTME: Decodes the query argument and returns FoodDetails as JSON
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

use super::{decode_args, parameters_schema, AssistantTool};
use crate::chains::FoodStatsChain;
use crate::constants::tool_names;
use crate::errors::AppResult;

/// Arguments of `get_food_stats`
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct FoodStatsArgs {
    /// Name of the food, e.g. "banana" or "tuna sandwich"
    pub query: String,
}

/// Nutrition facts tool
pub struct GetFoodStatsTool {
    chain: FoodStatsChain,
}

impl GetFoodStatsTool {
    /// Wrap a food stats chain
    #[must_use]
    pub const fn new(chain: FoodStatsChain) -> Self {
        Self { chain }
    }
}

#[async_trait]
impl AssistantTool for GetFoodStatsTool {
    fn name(&self) -> &'static str {
        tool_names::GET_FOOD_STATS
    }

    fn description(&self) -> &'static str {
        "This function can retrieve detailed and accurate nutrition and portion information about any food"
    }

    fn parameters(&self) -> AppResult<Value> {
        parameters_schema::<FoodStatsArgs>()
    }

    async fn execute(&self, args: Value) -> AppResult<Value> {
        let args: FoodStatsArgs = decode_args(self.name(), args)?;
        let details = self.chain.invoke(&args.query).await?;
        Ok(serde_json::to_value(details)?)
    }
}

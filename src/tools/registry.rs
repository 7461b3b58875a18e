// ABOUTME: Registry of assistant tools keyed by name, in registration order
// ABOUTME: Produces the function declarations bound to the model and dispatches tool calls
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Tool Registry

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::{AssistantTool, GetFoodStatsTool, GetRecipeTool, GetShoppingListTool};
use crate::chains::{FoodStatsChain, RecipeChain, ShoppingListChain};
use crate::errors::{AppError, AppResult};
use crate::llm::{FunctionCall, FunctionDeclaration, LlmProvider};

/// Registry of tools available to the agent
///
/// Built once when the agent is constructed and then used immutably.
/// Declarations are produced in registration order so the request bound to
/// the model is stable across turns.
///
/// # Example
///
/// ```
/// use pierre_nutrition_assistant::tools::ToolRegistry;
///
/// let registry = ToolRegistry::new();
/// assert!(registry.is_empty());
/// ```
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn AssistantTool>>,
    order: Vec<String>,
}

impl ToolRegistry {
    /// Create a new empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Registry holding the food stats, recipe and shopping list tools
    ///
    /// All three chains share `provider`; `model` overrides the provider's
    /// default model when set.
    #[must_use]
    pub fn with_nutrition_tools(provider: &Arc<dyn LlmProvider>, model: Option<&str>) -> Self {
        let mut food_stats = FoodStatsChain::new(Arc::clone(provider));
        let mut recipe = RecipeChain::new(Arc::clone(provider));
        let mut shopping_list = ShoppingListChain::new(Arc::clone(provider));
        if let Some(model) = model {
            food_stats = food_stats.with_model(model);
            recipe = recipe.with_model(model);
            shopping_list = shopping_list.with_model(model);
        }

        let mut registry = Self::new();
        registry.register(Arc::new(GetFoodStatsTool::new(food_stats)));
        registry.register(Arc::new(GetRecipeTool::new(recipe)));
        registry.register(Arc::new(GetShoppingListTool::new(shopping_list)));
        info!("Registered {} nutrition tools", registry.len());
        registry
    }

    /// Register a tool
    ///
    /// # Returns
    ///
    /// `true` if the tool was registered, `false` if a tool with the same name exists
    pub fn register(&mut self, tool: Arc<dyn AssistantTool>) -> bool {
        let name = tool.name().to_owned();

        if self.tools.contains_key(&name) {
            warn!("Tool '{}' is already registered, skipping", name);
            return false;
        }

        debug!("Registering tool '{}'", name);
        self.order.push(name.clone());
        self.tools.insert(name, tool);
        true
    }

    /// Get a tool by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<dyn AssistantTool>> {
        self.tools.get(name)
    }

    /// Number of registered tools
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether no tool is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Tool names in registration order
    #[must_use]
    pub fn tool_names(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    /// Declarations for every tool, in registration order
    ///
    /// # Errors
    ///
    /// Returns an error if a tool's parameter schema cannot be generated.
    pub fn declarations(&self) -> AppResult<Vec<FunctionDeclaration>> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| tool.declaration())
            .collect()
    }

    /// Execute a model-requested call
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for an unknown tool name and propagates any
    /// error from the tool itself.
    #[instrument(skip(self, call), fields(tool = %call.name, call_id = %call.id))]
    pub async fn execute(&self, call: &FunctionCall) -> AppResult<Value> {
        let tool = self.get(&call.name).ok_or_else(|| {
            warn!(available = ?self.order, "Model requested an unknown tool");
            AppError::not_found(format!("Tool '{}'", call.name))
        })?;

        debug!(args = %call.args, "Executing tool");
        tool.execute(call.args.clone()).await
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.order)
            .finish()
    }
}

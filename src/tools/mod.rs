// ABOUTME: Tools the nutritionist agent can call, backed by the three chains
// ABOUTME: Defines the AssistantTool trait and shared argument decoding helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Assistant Tools
//!
//! Each tool exposes a name, a description and a JSON Schema for its
//! arguments (generated with `schemars` from a typed struct), and executes by
//! decoding the model's arguments and invoking its chain. Tools are collected
//! in a [`ToolRegistry`] which produces the declarations bound to the model and
//! dispatches calls by name.

mod food_stats;
mod recipes;
pub mod registry;
mod shopping_list;

pub use food_stats::{FoodStatsArgs, GetFoodStatsTool};
pub use recipes::{GetRecipeTool, RecipeArgs};
pub use registry::ToolRegistry;
pub use shopping_list::{GetShoppingListTool, ShoppingListArgs};

use async_trait::async_trait;
use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::{AppError, AppResult};
use crate::llm::FunctionDeclaration;

/// A callable tool bound to the agent's model
///
/// # Example
///
/// ```rust,no_run
/// use async_trait::async_trait;
/// use pierre_nutrition_assistant::errors::AppResult;
/// use pierre_nutrition_assistant::tools::AssistantTool;
/// use serde_json::{json, Value};
///
/// struct EchoTool;
///
/// #[async_trait]
/// impl AssistantTool for EchoTool {
///     fn name(&self) -> &'static str {
///         "echo"
///     }
///
///     fn description(&self) -> &'static str {
///         "Returns its arguments"
///     }
///
///     fn parameters(&self) -> AppResult<Value> {
///         Ok(json!({"type": "object", "properties": {}}))
///     }
///
///     async fn execute(&self, args: Value) -> AppResult<Value> {
///         Ok(args)
///     }
/// }
/// ```
#[async_trait]
pub trait AssistantTool: Send + Sync {
    /// Name the model uses to call this tool
    fn name(&self) -> &'static str;

    /// Description shown to the model
    fn description(&self) -> &'static str;

    /// JSON Schema of the argument object
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be generated.
    fn parameters(&self) -> AppResult<Value>;

    /// Execute the tool with the model-supplied arguments
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for malformed arguments and propagates chain
    /// errors (transport or schema validation) unchanged.
    async fn execute(&self, args: Value) -> AppResult<Value>;

    /// Declaration bound to the model
    ///
    /// # Errors
    ///
    /// Returns an error if the parameter schema cannot be generated.
    fn declaration(&self) -> AppResult<FunctionDeclaration> {
        Ok(FunctionDeclaration {
            name: self.name().to_owned(),
            description: self.description().to_owned(),
            parameters: Some(self.parameters()?),
        })
    }
}

/// Parameter schema for `T` without the document-level keys function
/// declarations do not take
///
/// # Errors
///
/// Returns a serialization error if the schema cannot be converted to JSON.
pub fn parameters_schema<T: JsonSchema>() -> AppResult<Value> {
    let mut schema = serde_json::to_value(schema_for!(T))?;
    if let Some(object) = schema.as_object_mut() {
        object.remove("$schema");
        object.remove("title");
    }
    Ok(schema)
}

/// Decode model-supplied arguments for `tool`
///
/// # Errors
///
/// Returns `InvalidInput` if `args` is not an object or does not match `T`.
pub fn decode_args<T: DeserializeOwned>(tool: &str, args: Value) -> AppResult<T> {
    if !args.is_object() {
        return Err(AppError::invalid_input(format!(
            "Arguments for '{tool}' must be a JSON object, got: {args}"
        )));
    }
    serde_json::from_value(args).map_err(|e| {
        AppError::invalid_input(format!("Invalid arguments for '{tool}': {e}")).with_source(e)
    })
}

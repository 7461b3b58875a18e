// ABOUTME: Main library entry point for the Pierre nutrition assistant
// ABOUTME: Conversational food stats, recipes and shopping lists backed by a hosted LLM
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Pierre Nutrition Assistant
//!
//! A chat agent acting as a nutritionist. On demand it looks up nutrition
//! facts, generates recipes and builds shopping lists by delegating to a
//! hosted language model through fixed prompt templates and schema-validated
//! outputs.
//!
//! ## Architecture
//!
//! - **Models**: `FoodDetails`, `RecipeDetails` and `ShoppingList` records
//! - **Chains**: one prompt, one model call and one validated parse per record
//! - **Tools**: the chains exposed to the model as callable functions
//! - **Agent**: the model/tool dispatch loop and per-session checkpoints
//! - **LLM**: the `OpenAI`-compatible provider shared by everything above
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use pierre_nutrition_assistant::agent::NutritionAssistant;
//! use pierre_nutrition_assistant::config::AssistantConfig;
//! use pierre_nutrition_assistant::errors::AppResult;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = AssistantConfig::from_env()?;
//!     let assistant = NutritionAssistant::from_config(&config)?;
//!
//!     let session = assistant
//!         .start_new_session("Greek yogurt breakfasts, lentil soup dinners", "No pork")
//!         .await?;
//!     let outcome = assistant.send(&session, "Give me a shopping list").await?;
//!     println!("{}", outcome.reply);
//!     Ok(())
//! }
//! ```

/// Agent loop, conversation state and session checkpoints
pub mod agent;

/// Food stats, recipe and shopping list chains
pub mod chains;

/// Environment-driven configuration
pub mod config;

/// Environment variable names and defaults
pub mod constants;

/// Unified error handling
pub mod errors;

/// LLM provider abstraction and prompts
pub mod llm;

/// Structured logging setup
pub mod logging;

/// Structured records produced by the chains
pub mod models;

/// Structured-output parsing and validation
pub mod schema;

/// Tools exposed to the agent's model
pub mod tools;

// ABOUTME: Prompt-to-record chains that back the assistant's tools
// ABOUTME: Each chain renders a fixed template, calls the model once and returns a validated record
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Chains
//!
//! A chain is one prompt, one model call and one parse. There is no retry or
//! repair: a response that does not satisfy the record schema is returned as
//! a `SchemaValidation` error.

mod food_stats;
mod recipe;
mod shopping_list;

pub use food_stats::FoodStatsChain;
pub use recipe::RecipeChain;
pub use shopping_list::ShoppingListChain;

use crate::llm::{ChatMessage, ChatRequest};

/// Single-user-message request for a rendered prompt
fn prompt_request(prompt: String, model: Option<&str>) -> ChatRequest {
    let request = ChatRequest::new(vec![ChatMessage::user(prompt)]);
    match model {
        Some(model) => request.with_model(model),
        None => request,
    }
}

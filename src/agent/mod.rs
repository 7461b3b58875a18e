// ABOUTME: Nutritionist agent: tool-dispatch loop, conversation state and session checkpoints
// ABOUTME: Exposes NutritionAssistant as the embedding facade for multi-turn sessions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Agent
//!
//! A turn alternates between two nodes until the model answers without
//! requesting a tool:
//!
//! ```text
//! start -> model --(tool calls)--> tools -> model --(no tool calls)--> end
//! ```
//!
//! [`NutritionAgent`] runs one turn over a [`ConversationState`].
//! [`NutritionAssistant`] loads that state from a [`SessionCheckpointer`],
//! runs the turn and saves the result, so callers only deal in session ids.

mod assistant;
mod checkpoint;
mod dispatch;
mod state;

pub use assistant::NutritionAssistant;
pub use checkpoint::{InMemoryCheckpointer, SessionCheckpointer};
pub use dispatch::{AgentNode, NutritionAgent, TurnOutcome};
pub use state::{read_context_file, ConversationState};

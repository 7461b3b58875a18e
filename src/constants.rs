// ABOUTME: System-wide constants for the nutrition assistant
// ABOUTME: Environment variable names, model defaults, and tool names shared across modules
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Constants Module
//!
//! Hardcoded defaults and the names of every environment variable the
//! assistant reads. Values that vary per deployment are resolved in
//! [`crate::config`].

/// Service identity used in structured logs
pub mod service_names {
    /// Service name for structured logging
    pub const NUTRITION_ASSISTANT: &str = "pierre-nutrition-assistant";
}

/// Environment variable names
pub mod env_vars {
    /// Which LLM backend to talk to (`openai` or `local`)
    pub const LLM_PROVIDER: &str = "NUTRITION_LLM_PROVIDER";
    /// Base URL of the `OpenAI`-compatible endpoint
    pub const LLM_BASE_URL: &str = "NUTRITION_LLM_BASE_URL";
    /// Model identifier used by chains and the agent
    pub const LLM_MODEL: &str = "NUTRITION_LLM_MODEL";
    /// API key for the hosted model
    pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
    /// Optional API key for local servers
    pub const LOCAL_LLM_API_KEY: &str = "LOCAL_LLM_API_KEY";
    /// Sampling temperature for the agent's model node
    pub const AGENT_TEMPERATURE: &str = "NUTRITION_AGENT_TEMPERATURE";
    /// Maximum node executions in a single agent turn
    pub const MAX_AGENT_STEPS: &str = "NUTRITION_MAX_AGENT_STEPS";
    /// HTTP connect timeout in seconds
    pub const CONNECT_TIMEOUT_SECS: &str = "NUTRITION_LLM_CONNECT_TIMEOUT_SECS";
    /// HTTP request timeout in seconds
    pub const REQUEST_TIMEOUT_SECS: &str = "NUTRITION_LLM_REQUEST_TIMEOUT_SECS";
    /// Deployment environment
    pub const ENVIRONMENT: &str = "ENVIRONMENT";
}

/// Model and client defaults
pub mod llm_defaults {
    /// Hosted `OpenAI` endpoint
    pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
    /// Local Ollama endpoint
    pub const LOCAL_BASE_URL: &str = "http://localhost:11434/v1";
    /// Default hosted model
    pub const OPENAI_MODEL: &str = "gpt-4o";
    /// Default local model
    pub const LOCAL_MODEL: &str = "qwen2.5:14b-instruct";
    /// Agent model temperature; chains keep the provider default
    pub const AGENT_TEMPERATURE: f32 = 0.1;
    /// Node executions allowed per agent turn
    pub const MAX_AGENT_STEPS: usize = 25;
    /// Connection timeout for the hosted model
    pub const CONNECT_TIMEOUT_SECS: u64 = 30;
    /// Request timeout (generation of a full recipe can be slow)
    pub const REQUEST_TIMEOUT_SECS: u64 = 300;
}

/// Tool names exposed to the model
pub mod tool_names {
    /// Nutrition facts lookup
    pub const GET_FOOD_STATS: &str = "get_food_stats";
    /// Recipe generation
    pub const GET_RECIPE: &str = "get_recipe";
    /// Shopping list generation
    pub const GET_SHOPPING_LIST: &str = "get_shopping_list";
}

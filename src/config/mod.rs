// ABOUTME: Configuration management for the nutrition assistant
// ABOUTME: Resolves LLM endpoint, model, timeouts and agent limits from environment variables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration module
//!
//! All settings come from environment variables and are resolved once at
//! startup into an [`AssistantConfig`]. The resulting value is passed
//! explicitly to whatever needs it; nothing reads the environment lazily.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `NUTRITION_LLM_PROVIDER` | `openai` |
//! | `NUTRITION_LLM_BASE_URL` | provider specific |
//! | `NUTRITION_LLM_MODEL` | `gpt-4o` (`openai`) |
//! | `OPENAI_API_KEY` | required for `openai` |
//! | `NUTRITION_AGENT_TEMPERATURE` | `0.1` |
//! | `NUTRITION_MAX_AGENT_STEPS` | `25` |
//! | `NUTRITION_LLM_CONNECT_TIMEOUT_SECS` | `30` |
//! | `NUTRITION_LLM_REQUEST_TIMEOUT_SECS` | `300` |

/// Core configuration type definitions
pub mod types;

use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::{debug, warn};

pub use types::{Environment, LlmProviderType, LogLevel};

use crate::constants::{env_vars, llm_defaults};
use crate::errors::{AppError, AppResult};

/// Settings for the hosted model client
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Which backend flavour is configured
    pub provider: LlmProviderType,
    /// Base URL of the chat completions API (without `/chat/completions`)
    pub base_url: String,
    /// Bearer token, if the backend needs one
    pub api_key: Option<String>,
    /// Model identifier
    pub model: String,
    /// TCP connect timeout
    pub connect_timeout: Duration,
    /// Whole-request timeout
    pub request_timeout: Duration,
}

impl LlmConfig {
    /// Resolve the client settings from the environment
    ///
    /// # Errors
    ///
    /// Returns `ConfigMissing` when the hosted `OpenAI` backend is selected and
    /// `OPENAI_API_KEY` is unset, or `ConfigError` when a numeric variable
    /// cannot be parsed.
    pub fn from_env() -> AppResult<Self> {
        let provider = LlmProviderType::from_env();

        let base_url = non_empty_var(env_vars::LLM_BASE_URL)
            .unwrap_or_else(|| provider.default_base_url().to_owned());
        let model = non_empty_var(env_vars::LLM_MODEL)
            .unwrap_or_else(|| provider.default_model().to_owned());
        let api_key = non_empty_var(provider.api_key_env_var());

        if api_key.is_none() && provider.requires_api_key() {
            return Err(AppError::config_missing(provider.api_key_env_var()));
        }

        let connect_timeout = Duration::from_secs(parse_var(
            env_vars::CONNECT_TIMEOUT_SECS,
            llm_defaults::CONNECT_TIMEOUT_SECS,
        )?);
        let request_timeout = Duration::from_secs(parse_var(
            env_vars::REQUEST_TIMEOUT_SECS,
            llm_defaults::REQUEST_TIMEOUT_SECS,
        )?);

        debug!(%provider, %base_url, %model, "Resolved LLM configuration");

        Ok(Self {
            provider,
            base_url,
            api_key,
            model,
            connect_timeout,
            request_timeout,
        })
    }
}

/// Settings for the tool-dispatch loop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentConfig {
    /// Sampling temperature for the model node
    pub temperature: f32,
    /// Node executions allowed in a single turn
    pub max_steps: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            temperature: llm_defaults::AGENT_TEMPERATURE,
            max_steps: llm_defaults::MAX_AGENT_STEPS,
        }
    }
}

impl AgentConfig {
    /// Resolve agent settings from the environment
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but not a valid number, if the
    /// temperature is not finite, or if the step limit is zero.
    pub fn from_env() -> AppResult<Self> {
        let temperature = parse_var(env_vars::AGENT_TEMPERATURE, llm_defaults::AGENT_TEMPERATURE)?;
        let max_steps = parse_var(env_vars::MAX_AGENT_STEPS, llm_defaults::MAX_AGENT_STEPS)?;

        if max_steps == 0 {
            return Err(AppError::config(format!(
                "{} must be at least 1",
                env_vars::MAX_AGENT_STEPS
            )));
        }
        if !temperature.is_finite() {
            return Err(AppError::config(format!(
                "{} must be a finite number",
                env_vars::AGENT_TEMPERATURE
            )));
        }
        if !(0.0..=2.0).contains(&temperature) {
            warn!(
                temperature,
                "Agent temperature outside the usual 0.0-2.0 range; the provider may reject it"
            );
        }

        Ok(Self {
            temperature,
            max_steps,
        })
    }
}

/// Complete assistant configuration
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    /// Deployment environment
    pub environment: Environment,
    /// Hosted model client settings
    pub llm: LlmConfig,
    /// Agent loop settings
    pub agent: AgentConfig,
}

impl AssistantConfig {
    /// Load the full configuration from environment variables
    ///
    /// # Errors
    ///
    /// Propagates any error from [`LlmConfig::from_env`] or
    /// [`AgentConfig::from_env`].
    pub fn from_env() -> AppResult<Self> {
        Ok(Self {
            environment: Environment::from_env(),
            llm: LlmConfig::from_env()?,
            agent: AgentConfig::from_env()?,
        })
    }

    /// Replace the configured model (used by the CLI `--model` flag)
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.llm.model = model.into();
        self
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_var<T: FromStr>(key: &str, default: T) -> AppResult<T> {
    match non_empty_var(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::config(format!("{key} has invalid value '{raw}'"))),
    }
}

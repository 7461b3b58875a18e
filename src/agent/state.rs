// ABOUTME: Conversation state carried across turns of one session
// ABOUTME: Message history plus the meal plan and food preferences supplied at session start
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};
use crate::llm::prompts::{get_nutritionist_system_prompt, session_context};
use crate::llm::{ChatMessage, FunctionCall, MessageRole};

/// State of one conversation
///
/// `messages` holds only user, assistant and tool messages. The session
/// context and the nutritionist prompt are injected per model call and are
/// never stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    /// Conversation history in order
    pub messages: Vec<ChatMessage>,
    /// The user's meal plan
    pub meal_plan: String,
    /// The user's food preferences
    pub food_preferences: String,
}

impl ConversationState {
    /// Fresh state for a new session
    #[must_use]
    pub fn new(meal_plan: impl Into<String>, food_preferences: impl Into<String>) -> Self {
        Self {
            messages: Vec::new(),
            meal_plan: meal_plan.into(),
            food_preferences: food_preferences.into(),
        }
    }

    /// Append a message
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Tool calls requested by the latest message
    ///
    /// Empty unless the latest message is an assistant message with calls.
    #[must_use]
    pub fn pending_tool_calls(&self) -> &[FunctionCall] {
        match self.messages.last() {
            Some(message) if message.has_tool_calls() => message.tool_calls.as_slice(),
            _ => &[],
        }
    }

    /// Text of the latest assistant message
    #[must_use]
    pub fn last_reply(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|message| message.role == MessageRole::Assistant)
            .map(|message| message.content.as_str())
    }

    /// Messages sent to the model: context, system prompt, then history
    #[must_use]
    pub fn model_messages(&self) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(self.messages.len() + 2);
        messages.push(ChatMessage::system(session_context(
            &self.meal_plan,
            &self.food_preferences,
        )));
        messages.push(ChatMessage::system(get_nutritionist_system_prompt()));
        messages.extend(self.messages.iter().cloned());
        messages
    }
}

/// Read a meal plan or preferences file supplied at session start
///
/// # Errors
///
/// Returns `ResourceNotFound` if the file does not exist and `InvalidInput`
/// if it cannot be read as UTF-8 text.
pub async fn read_context_file(path: &Path) -> AppResult<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => Ok(text.trim().to_owned()),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            Err(AppError::not_found(format!("File {}", path.display())))
        }
        Err(e) => Err(AppError::invalid_input(format!(
            "Cannot read {}: {e}",
            path.display()
        ))
        .with_source(e)),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_model_messages_inject_context_first() {
        let mut state = ConversationState::new("oats for breakfast", "no dairy");
        state.push(ChatMessage::user("hi"));

        let messages = state.model_messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(
            messages[0].content,
            "Meal plan:\noats for breakfast\nFood preferences:\nno dairy"
        );
        assert_eq!(messages[1].role, MessageRole::System);
        assert_eq!(messages[2].content, "hi");
        assert_eq!(state.messages.len(), 1);
    }

    #[test]
    fn test_pending_tool_calls_only_from_latest_message() {
        let call = FunctionCall {
            id: "call_1".to_owned(),
            name: "get_food_stats".to_owned(),
            args: json!({"query": "kiwi"}),
        };
        let mut state = ConversationState::default();
        state.push(ChatMessage::assistant_tool_calls(None, vec![call.clone()]));
        assert_eq!(state.pending_tool_calls().len(), 1);

        state.push(ChatMessage::tool_result(&call, "{}"));
        assert!(state.pending_tool_calls().is_empty());
    }
}

// ABOUTME: Per-session conversation checkpoints
// ABOUTME: SessionCheckpointer trait with a process-memory implementation guarded by an async lock
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::state::ConversationState;
use crate::errors::AppResult;

/// Storage for conversation state keyed by session id
#[async_trait]
pub trait SessionCheckpointer: Send + Sync {
    /// Load the latest state saved for `session_id`
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store fails.
    async fn load(&self, session_id: &str) -> AppResult<Option<ConversationState>>;

    /// Replace the state saved for `session_id`
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store fails.
    async fn save(&self, session_id: &str, state: ConversationState) -> AppResult<()>;

    /// Forget `session_id`, returning whether it existed
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store fails.
    async fn delete(&self, session_id: &str) -> AppResult<bool>;

    /// Ids of all saved sessions
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store fails.
    async fn session_ids(&self) -> AppResult<Vec<String>>;
}

/// Checkpoints held in process memory
///
/// Nothing is evicted and nothing survives a restart.
#[derive(Debug, Default)]
pub struct InMemoryCheckpointer {
    states: RwLock<HashMap<String, ConversationState>>,
}

impl InMemoryCheckpointer {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionCheckpointer for InMemoryCheckpointer {
    async fn load(&self, session_id: &str) -> AppResult<Option<ConversationState>> {
        Ok(self.states.read().await.get(session_id).cloned())
    }

    async fn save(&self, session_id: &str, state: ConversationState) -> AppResult<()> {
        debug!(
            session_id,
            messages = state.messages.len(),
            "Saving conversation checkpoint"
        );
        self.states
            .write()
            .await
            .insert(session_id.to_owned(), state);
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> AppResult<bool> {
        Ok(self.states.write().await.remove(session_id).is_some())
    }

    async fn session_ids(&self) -> AppResult<Vec<String>> {
        let mut ids: Vec<String> = self.states.read().await.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

//! In-memory per-user conversation state.

use std::collections::HashMap;

use tokio::sync::Mutex;

use super::state::{ConversationState, Mode};
use crate::config::UserId;

/// Conversation state for every user seen since startup.
///
/// Lost on restart. Callers take a snapshot, work on it without holding the
/// lock, then write the new mode back.
#[derive(Debug, Default)]
pub struct SessionStore {
    states: Mutex<HashMap<UserId, ConversationState>>,
}

impl SessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of `user`'s state, creating a fresh one on first use.
    pub async fn snapshot(&self, user: UserId) -> ConversationState {
        self.states
            .lock()
            .await
            .entry(user)
            .or_default()
            .clone()
    }

    /// Replaces `user`'s mode.
    pub async fn set_mode(&self, user: UserId, mode: Mode) {
        self.states.lock().await.entry(user).or_default().mode = mode;
    }
}

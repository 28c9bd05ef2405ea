use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::models::{HistoryMessage, Role};
use uuid::Uuid;

/// One message in the conversation. The sequence of turns is the whole conversation state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn to_history(&self) -> HistoryMessage {
        HistoryMessage {
            role: self.role,
            content: self.content.clone(),
        }
    }
}

pub fn history_of(turns: &[Turn]) -> Vec<HistoryMessage> {
    turns.iter().map(Turn::to_history).collect()
}

/// Index of the most recent user turn, scanning backward.
pub fn last_user_turn_index(turns: &[Turn]) -> Option<usize> {
    turns.iter().rposition(|turn| turn.role == Role::User)
}

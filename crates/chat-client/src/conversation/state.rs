use serde::{Deserialize, Serialize};

use crate::errors::ErrorInfo;
use crate::turn::Turn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SendPhase {
    #[default]
    Idle,
    Sending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    #[default]
    Checking,
    Connected,
    Disconnected,
}

impl ConnectionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Checking => "Connecting...",
            Self::Connected => "Connected",
            Self::Disconnected => "Disconnected",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatState {
    pub turns: Vec<Turn>,
    pub phase: SendPhase,
    pub error: Option<ErrorInfo>,
    pub retry_count: u32,
    pub connection: ConnectionStatus,
    pub session_id: Option<String>,
    pub storage_available: bool,
}

impl Default for ChatState {
    fn default() -> Self {
        Self {
            turns: Vec::new(),
            phase: SendPhase::Idle,
            error: None,
            retry_count: 0,
            connection: ConnectionStatus::Checking,
            session_id: None,
            storage_available: true,
        }
    }
}

#[derive(Debug, Clone)]
pub enum ChatAction {
    Loaded {
        turns: Vec<Turn>,
        session_id: String,
        storage_available: bool,
    },
    /// `user_turn` is `Some` for a fresh send and `None` for a retry.
    SendStarted { user_turn: Option<Turn> },
    SendSucceeded { reply: Turn },
    /// `rollback_turn_id` names the optimistic user turn to drop, if any.
    SendFailed {
        error: ErrorInfo,
        rollback_turn_id: Option<String>,
    },
    RetryRequested,
    Cleared { session_id: String },
    ClearFailed { error: ErrorInfo },
    ErrorDismissed,
    ConnectionChanged(ConnectionStatus),
}

pub fn reduce(mut state: ChatState, action: ChatAction) -> ChatState {
    match action {
        ChatAction::Loaded {
            turns,
            session_id,
            storage_available,
        } => {
            state.turns = turns;
            state.session_id = Some(session_id);
            state.storage_available = storage_available;
        }
        ChatAction::SendStarted { user_turn } => {
            state.error = None;
            state.phase = SendPhase::Sending;
            if let Some(turn) = user_turn {
                state.retry_count = 0;
                state.turns.push(turn);
            }
        }
        ChatAction::SendSucceeded { reply } => {
            state.turns.push(reply);
            state.retry_count = 0;
            state.phase = SendPhase::Idle;
        }
        ChatAction::SendFailed {
            error,
            rollback_turn_id,
        } => {
            if let Some(turn_id) = rollback_turn_id {
                state.turns.retain(|turn| turn.id != turn_id);
            }
            state.error = Some(error);
            state.phase = SendPhase::Idle;
        }
        ChatAction::RetryRequested => {
            state.retry_count = state.retry_count.saturating_add(1);
        }
        ChatAction::Cleared { session_id } => {
            state.turns.clear();
            state.session_id = Some(session_id);
            state.error = None;
            state.retry_count = 0;
        }
        ChatAction::ClearFailed { error } => {
            state.error = Some(error);
        }
        ChatAction::ErrorDismissed => {
            state.error = None;
        }
        ChatAction::ConnectionChanged(status) => {
            state.connection = status;
        }
    }

    state
}

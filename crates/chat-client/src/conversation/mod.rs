mod state;


use std::time::Duration;

use tracing::{info, warn};

use crate::api::RelayApi;
use crate::errors::{ApiError, ErrorInfo};
use crate::retry::{RetryPolicy, retry_with_backoff};
use crate::storage::{ConversationStorage, KeyValueStore, StorageInfo};
use crate::turn::{Turn, history_of, last_user_turn_index};

pub use state::{ChatAction, ChatState, ConnectionStatus, SendPhase, reduce};

pub const DEFAULT_PROBE_RETRIES: u32 = 2;
pub const DEFAULT_PROBE_STEP: Duration = Duration::from_millis(2000);

/// Health probe schedule: one initial call plus `retries` more, waiting `step * n` before the
/// n-th retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionProbePolicy {
    pub retries: u32,
    pub step: Duration,
}

impl Default for ConnectionProbePolicy {
    fn default() -> Self {
        Self {
            retries: DEFAULT_PROBE_RETRIES,
            step: DEFAULT_PROBE_STEP,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SendMode {
    Fresh,
    Retry,
}

/// Owns the visible conversation and keeps it in step with the relay and local storage.
///
/// Every mutation goes through [`reduce`], and the turn list is persisted after each one.
/// Methods take `&mut self`, so at most one send can be in flight per controller.
pub struct ConversationController<R, S> {
    relay: R,
    storage: ConversationStorage<S>,
    state: ChatState,
    retry_policy: RetryPolicy,
    probe_policy: ConnectionProbePolicy,
}

impl<R: RelayApi, S: KeyValueStore> ConversationController<R, S> {
    pub fn new(relay: R, store: S) -> Self {
        Self {
            relay,
            storage: ConversationStorage::new(store),
            state: ChatState::default(),
            retry_policy: RetryPolicy::default(),
            probe_policy: ConnectionProbePolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    pub fn with_probe_policy(mut self, policy: ConnectionProbePolicy) -> Self {
        self.probe_policy = policy;
        self
    }

    pub fn state(&self) -> &ChatState {
        &self.state
    }

    pub fn turns(&self) -> &[Turn] {
        &self.state.turns
    }

    pub fn storage_info(&mut self) -> StorageInfo {
        self.storage.storage_info()
    }

    /// Restores the persisted conversation and session id.
    pub fn load(&mut self) -> &ChatState {
        let loaded = self.storage.load_conversation();
        let storage_available = self.storage.is_available();
        if !storage_available {
            warn!("local storage unavailable; conversation will not persist");
        }

        info!(
            turns = loaded.turns.len(),
            session_id = %loaded.session_id,
            "conversation loaded"
        );
        self.dispatch(ChatAction::Loaded {
            turns: loaded.turns,
            session_id: loaded.session_id,
            storage_available,
        });
        &self.state
    }

    /// Probes relay health and records the resulting connection status.
    pub async fn check_connection(&mut self) -> ConnectionStatus {
        self.dispatch(ChatAction::ConnectionChanged(ConnectionStatus::Checking));

        let retries = self.probe_policy.retries;
        let mut status = ConnectionStatus::Disconnected;
        for attempt in 0..=retries {
            match self.relay.health_check().await {
                Ok(health) => {
                    info!(status = %health.status, "relay reachable");
                    status = ConnectionStatus::Connected;
                    break;
                }
                Err(err) => {
                    warn!(attempt = attempt + 1, "relay health check failed: {err}");
                    if attempt < retries {
                        tokio::time::sleep(self.probe_policy.step.saturating_mul(attempt + 1))
                            .await;
                    }
                }
            }
        }

        self.dispatch(ChatAction::ConnectionChanged(status));
        status
    }

    /// Sends `content` as a new user turn.
    ///
    /// Returns `Ok(None)` when the send was not attempted: blank input, a send already in
    /// flight, or a disconnected relay. On failure the optimistic user turn is removed again.
    pub async fn send_message(&mut self, content: &str) -> Result<Option<Turn>, ErrorInfo> {
        if content.trim().is_empty() || self.state.phase == SendPhase::Sending {
            return Ok(None);
        }
        if self.state.connection == ConnectionStatus::Disconnected {
            warn!("send skipped while relay is disconnected");
            return Ok(None);
        }

        self.send(content.to_string(), SendMode::Fresh).await
    }

    /// Resends the most recent user turn without appending a duplicate.
    ///
    /// Returns `Ok(None)` when the conversation has no user turn or a send is in flight.
    pub async fn retry_last_message(&mut self) -> Result<Option<Turn>, ErrorInfo> {
        if self.state.phase == SendPhase::Sending {
            return Ok(None);
        }
        let Some(index) = last_user_turn_index(&self.state.turns) else {
            return Ok(None);
        };

        let content = self.state.turns[index].content.clone();
        self.dispatch(ChatAction::RetryRequested);
        self.send(content, SendMode::Retry).await
    }

    /// Empties the conversation, drops persisted data and starts a new session.
    pub fn clear_conversation(&mut self) -> Result<(), ErrorInfo> {
        if !self.storage.clear_conversation() && self.storage.is_available() {
            let error = ErrorInfo::storage("Failed to clear conversation history");
            self.dispatch(ChatAction::ClearFailed {
                error: error.clone(),
            });
            return Err(error);
        }

        let session_id = self.storage.session_id();
        info!(session_id = %session_id, "conversation cleared");
        self.dispatch(ChatAction::Cleared { session_id });
        Ok(())
    }

    pub fn dismiss_error(&mut self) {
        self.dispatch(ChatAction::ErrorDismissed);
    }

    async fn send(&mut self, content: String, mode: SendMode) -> Result<Option<Turn>, ErrorInfo> {
        let (history, user_turn) = match mode {
            SendMode::Fresh => (
                history_of(&self.state.turns),
                Some(Turn::user(content.clone())),
            ),
            SendMode::Retry => {
                let end = last_user_turn_index(&self.state.turns).unwrap_or(0);
                (history_of(&self.state.turns[..end]), None)
            }
        };
        let rollback_turn_id = user_turn.as_ref().map(|turn| turn.id.clone());

        let appended = user_turn.is_some();
        self.dispatch(ChatAction::SendStarted { user_turn });
        if appended {
            self.persist();
        }

        let relay = &self.relay;
        let message = content.as_str();
        let history = history.as_slice();
        let result: Result<String, ApiError> =
            retry_with_backoff(self.retry_policy, move || relay.send_message(message, history))
                .await;

        match result {
            Ok(text) => {
                let reply = Turn::assistant(text);
                self.dispatch(ChatAction::SendSucceeded {
                    reply: reply.clone(),
                });
                self.persist();
                Ok(Some(reply))
            }
            Err(err) => {
                let error = err.info();
                warn!(
                    kind = error.kind.as_str(),
                    status = err.status,
                    retry = mode == SendMode::Retry,
                    "message send failed: {}",
                    err.message
                );
                let rolled_back = rollback_turn_id.is_some();
                self.dispatch(ChatAction::SendFailed {
                    error: error.clone(),
                    rollback_turn_id,
                });
                if rolled_back {
                    self.persist();
                }
                Err(error)
            }
        }
    }

    fn dispatch(&mut self, action: ChatAction) {
        let current = std::mem::take(&mut self.state);
        self.state = reduce(current, action);
    }

    fn persist(&mut self) {
        if !self.state.storage_available {
            return;
        }
        if !self.storage.save_conversation(&self.state.turns) {
            warn!("failed to persist conversation");
        }
    }
}

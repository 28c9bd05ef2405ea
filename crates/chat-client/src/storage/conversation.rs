use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::manager::StorageManager;
use super::store::KeyValueStore;
use crate::turn::Turn;

pub const CONVERSATION_KEY: &str = "scoper-chat-conversation-history";
pub const SESSION_ID_KEY: &str = "scoper-chat-session-id";
pub const STORAGE_KEYS: [&str; 2] = [CONVERSATION_KEY, SESSION_ID_KEY];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotRef<'a> {
    turns: &'a [Turn],
    last_updated: DateTime<Utc>,
    session_id: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSnapshot {
    turns: Option<Vec<Turn>>,
    #[serde(default)]
    last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    session_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedConversation {
    pub turns: Vec<Turn>,
    pub session_id: String,
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageInfo {
    pub available: bool,
    pub has_conversation: bool,
    pub session_id: String,
}

/// Persists the conversation snapshot and the session id under the app's namespaced keys.
pub struct ConversationStorage<S> {
    storage: StorageManager<S>,
}

impl<S: KeyValueStore> ConversationStorage<S> {
    pub fn new(store: S) -> Self {
        Self {
            storage: StorageManager::new(store),
        }
    }

    pub fn is_available(&self) -> bool {
        self.storage.is_available()
    }

    /// Overwrites the stored snapshot with `turns`.
    pub fn save_conversation(&mut self, turns: &[Turn]) -> bool {
        let session_id = self.session_id();
        self.storage.set_item(
            CONVERSATION_KEY,
            &SnapshotRef {
                turns,
                last_updated: Utc::now(),
                session_id: &session_id,
            },
        )
    }

    pub fn load_conversation(&mut self) -> LoadedConversation {
        let snapshot = self
            .storage
            .get_item::<StoredSnapshot>(CONVERSATION_KEY)
            .and_then(|snapshot| {
                let turns = snapshot.turns?;
                Some((turns, snapshot.session_id, snapshot.last_updated))
            });

        match snapshot {
            Some((turns, session_id, last_updated)) => LoadedConversation {
                turns,
                session_id: session_id.unwrap_or_else(|| self.session_id()),
                last_updated,
            },
            None => LoadedConversation {
                turns: Vec::new(),
                session_id: self.session_id(),
                last_updated: None,
            },
        }
    }

    /// Returns the stored session id, creating and storing one on first use.
    pub fn session_id(&mut self) -> String {
        if let Some(session_id) = self.storage.get_item::<String>(SESSION_ID_KEY) {
            return session_id;
        }

        let session_id = generate_session_id();
        self.storage.set_item(SESSION_ID_KEY, &session_id);
        session_id
    }

    /// Removes every namespaced key and rotates the session id.
    pub fn clear_conversation(&mut self) -> bool {
        let cleared = self.storage.clear(&STORAGE_KEYS);
        if cleared {
            self.storage.set_item(SESSION_ID_KEY, &generate_session_id());
        }
        cleared
    }

    pub fn storage_info(&mut self) -> StorageInfo {
        StorageInfo {
            available: self.storage.is_available(),
            has_conversation: self
                .storage
                .get_item::<serde_json::Value>(CONVERSATION_KEY)
                .is_some(),
            session_id: self.session_id(),
        }
    }
}

fn generate_session_id() -> String {
    Uuid::new_v4().to_string()
}

mod conversation;
mod manager;
mod store;

pub use conversation::{
    CONVERSATION_KEY, ConversationStorage, LoadedConversation, SESSION_ID_KEY, STORAGE_KEYS,
    StorageInfo,
};
pub use manager::{PROBE_KEY, StorageManager};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};

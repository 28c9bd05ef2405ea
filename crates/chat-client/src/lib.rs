pub mod api;
pub mod conversation;
pub mod errors;
pub mod retry;
pub mod storage;
pub mod turn;

pub use api::{HttpRelayClient, RelayApi, RelayFuture};
pub use conversation::{ChatState, ConnectionStatus, ConversationController, SendPhase};
pub use errors::{ApiError, ErrorInfo, ErrorKind};
pub use retry::{RetryPolicy, Retryable, retry_with_backoff};
pub use storage::{ConversationStorage, FileStore, KeyValueStore, MemoryStore, StorageManager};
pub use turn::Turn;

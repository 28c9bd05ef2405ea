use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use super::prompts::SCOPER_SYSTEM_PROMPT;
use crate::models::HistoryMessage;

pub type CompletionFuture<'a> =
    Pin<Box<dyn Future<Output = Result<CompletionResponse, CompletionError>> + Send + 'a>>;

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub messages: Vec<HistoryMessage>,
}

impl CompletionRequest {
    /// Prior turns followed by the new user message, under the Scoper instruction text.
    pub fn scoper(history: Vec<HistoryMessage>, message: impl Into<String>) -> Self {
        let mut messages = history;
        messages.push(HistoryMessage::user(message));
        Self {
            system_prompt: SCOPER_SYSTEM_PROMPT.to_string(),
            messages,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub model: String,
    pub provider_request_id: Option<String>,
    pub text: String,
}

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion provider request timed out")]
    Timeout,
    #[error("completion provider unreachable")]
    Unavailable,
    #[error("completion provider rejected request: status={status} code={code}")]
    Upstream { status: u16, code: String },
    #[error("completion provider returned an invalid payload: {0}")]
    InvalidPayload(String),
}

impl CompletionError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub trait CompletionGateway: Send + Sync {
    fn complete<'a>(&'a self, request: CompletionRequest) -> CompletionFuture<'a>;
}

#[cfg(test)]
mod tests {
    use super::{CompletionError, CompletionRequest};
    use crate::llm::SCOPER_SYSTEM_PROMPT;
    use crate::models::{HistoryMessage, Role};

    #[test]
    fn scoper_request_appends_new_user_turn_after_history() {
        let request = CompletionRequest::scoper(
            vec![
                HistoryMessage::user("first"),
                HistoryMessage::assistant("reply"),
            ],
            "second",
        );

        assert_eq!(request.system_prompt, SCOPER_SYSTEM_PROMPT);
        assert_eq!(request.messages.len(), 3);
        assert_eq!(request.messages[2].role, Role::User);
        assert_eq!(request.messages[2].content, "second");
    }

    #[test]
    fn only_upstream_errors_carry_status() {
        let err = CompletionError::Upstream {
            status: 429,
            code: "rate_limit_error".to_string(),
        };
        assert_eq!(err.status(), Some(429));
        assert_eq!(CompletionError::Timeout.status(), None);
    }
}

use axum::http::{HeaderMap, header};
use serde_json::Value;
use shared::models::{HistoryMessage, Role};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct ValidatedChat {
    pub(super) message: String,
    pub(super) history: Vec<HistoryMessage>,
}

/// Display strings are returned to callers verbatim in the `error` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub(super) enum ChatRequestError {
    #[error("Content-Type must be application/json")]
    UnsupportedContentType,
    #[error("Invalid JSON in request body")]
    InvalidJson,
    #[error("Message is required and must be a string")]
    MissingMessage,
    #[error("Message cannot be empty")]
    EmptyMessage,
    #[error("conversationHistory must be an array")]
    HistoryNotArray,
    #[error("Invalid conversation history format")]
    InvalidHistoryEntry,
}

pub(super) fn validate_content_type(headers: &HeaderMap) -> Result<(), ChatRequestError> {
    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains("application/json"));

    if is_json {
        Ok(())
    } else {
        Err(ChatRequestError::UnsupportedContentType)
    }
}

pub(super) fn parse_chat_request(body: &[u8]) -> Result<ValidatedChat, ChatRequestError> {
    let payload: Value =
        serde_json::from_slice(body).map_err(|_| ChatRequestError::InvalidJson)?;

    let message = match payload.get("message") {
        Some(Value::String(message)) if !message.is_empty() => message.clone(),
        _ => return Err(ChatRequestError::MissingMessage),
    };
    if message.trim().is_empty() {
        return Err(ChatRequestError::EmptyMessage);
    }

    let history = match payload.get("conversationHistory") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(entries)) => entries
            .iter()
            .map(parse_history_entry)
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => return Err(ChatRequestError::HistoryNotArray),
    };

    Ok(ValidatedChat { message, history })
}

fn parse_history_entry(entry: &Value) -> Result<HistoryMessage, ChatRequestError> {
    let role = entry
        .get("role")
        .and_then(Value::as_str)
        .and_then(Role::parse)
        .ok_or(ChatRequestError::InvalidHistoryEntry)?;
    let content = entry
        .get("content")
        .and_then(Value::as_str)
        .filter(|content| !content.is_empty())
        .ok_or(ChatRequestError::InvalidHistoryEntry)?;

    Ok(HistoryMessage {
        role,
        content: content.to_string(),
    })
}

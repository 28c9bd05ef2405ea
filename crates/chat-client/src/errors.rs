use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::retry::Retryable;

pub const NETWORK_STATUS: u16 = 0;

/// A failed call to the relay. `status` is the HTTP status, or 0 when the relay was unreachable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (status {status})")]
pub struct ApiError {
    pub status: u16,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Network,
    Validation,
    Auth,
    RateLimit,
    Server,
    Service,
    Storage,
    Unknown,
}

impl ErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Validation => "validation",
            Self::Auth => "auth",
            Self::RateLimit => "rate_limit",
            Self::Server => "server",
            Self::Service => "service",
            Self::Storage => "storage",
            Self::Unknown => "unknown",
        }
    }
}

/// User-facing classification of a failure. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
    pub retryable: bool,
}

impl ErrorInfo {
    pub fn storage(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Storage,
            message: message.into(),
            retryable: false,
        }
    }
}

impl ApiError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn network() -> Self {
        Self::new(
            NETWORK_STATUS,
            "Unable to connect to server. Please check your connection.",
        )
    }

    pub fn info(&self) -> ErrorInfo {
        let (kind, message, retryable) = match self.status {
            0 => (
                ErrorKind::Network,
                "Unable to connect to server. Please check your internet connection.".to_string(),
                true,
            ),
            400 => (
                ErrorKind::Validation,
                self.message_or("Invalid request. Please check your input."),
                false,
            ),
            401 => (
                ErrorKind::Auth,
                "Authentication failed. Please try again.".to_string(),
                true,
            ),
            429 => (
                ErrorKind::RateLimit,
                "Too many requests. Please wait a moment and try again.".to_string(),
                true,
            ),
            500 => (
                ErrorKind::Server,
                "Server error. Please try again later.".to_string(),
                true,
            ),
            503 => (
                ErrorKind::Service,
                "Service temporarily unavailable. Please try again in a few minutes.".to_string(),
                true,
            ),
            _ => (
                ErrorKind::Unknown,
                self.message_or("An unexpected error occurred."),
                true,
            ),
        };

        ErrorInfo {
            kind,
            message,
            retryable,
        }
    }

    fn message_or(&self, fallback: &str) -> String {
        if self.message.trim().is_empty() {
            fallback.to_string()
        } else {
            self.message.clone()
        }
    }
}

impl Retryable for ApiError {
    fn is_retryable(&self) -> bool {
        self.info().retryable
    }
}

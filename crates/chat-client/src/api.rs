use std::future::Future;
use std::pin::Pin;

use reqwest::StatusCode;
use shared::models::{ChatRequest, ChatResponse, HealthResponse, HistoryMessage};
use thiserror::Error;
use tracing::debug;

use crate::errors::{ApiError, NETWORK_STATUS};

pub type RelayFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ApiError>> + Send + 'a>>;

/// Calls the relay service makes available to the conversation controller.
pub trait RelayApi: Send + Sync {
    fn send_message<'a>(
        &'a self,
        message: &'a str,
        history: &'a [HistoryMessage],
    ) -> RelayFuture<'a, String>;

    fn health_check<'a>(&'a self) -> RelayFuture<'a, HealthResponse>;
}

#[derive(Debug, Error)]
pub enum RelayClientError {
    #[error("failed to build relay http client: {0}")]
    HttpClient(String),
}

/// Relay client over HTTP. No request timeout is set; the transport's defaults apply.
#[derive(Clone)]
pub struct HttpRelayClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRelayClient {
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, RelayClientError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|err| RelayClientError::HttpClient(err.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.as_ref().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_chat(
        &self,
        message: &str,
        history: &[HistoryMessage],
    ) -> Result<String, ApiError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ApiError::new(
                400,
                "Message is required and must be a non-empty string",
            ));
        }

        let request = ChatRequest {
            message: message.to_string(),
            conversation_history: history.to_vec(),
        };

        let response = self
            .client
            .post(format!("{}/chat", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|err| {
                debug!(error = %err, "relay chat request failed in transport");
                ApiError::network()
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|_| ApiError::network())?;
        let parsed = serde_json::from_str::<ChatResponse>(&body).ok();

        if !status.is_success() {
            let message = parsed
                .and_then(|parsed| parsed.error)
                .unwrap_or_else(|| http_status_message(status));
            return Err(ApiError::new(status.as_u16(), message));
        }

        let parsed =
            parsed.ok_or_else(|| ApiError::new(500, "Invalid response from server"))?;
        if let Some(error) = parsed.error {
            return Err(ApiError::new(400, error));
        }

        parsed
            .response
            .ok_or_else(|| ApiError::new(500, "Invalid response from server"))
    }

    async fn get_health(&self) -> Result<HealthResponse, ApiError> {
        let response = self
            .client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .map_err(|_| health_check_failed(NETWORK_STATUS))?;

        let status = response.status();
        if !status.is_success() {
            return Err(health_check_failed(status.as_u16()));
        }

        response
            .json::<HealthResponse>()
            .await
            .map_err(|_| health_check_failed(NETWORK_STATUS))
    }
}

impl RelayApi for HttpRelayClient {
    fn send_message<'a>(
        &'a self,
        message: &'a str,
        history: &'a [HistoryMessage],
    ) -> RelayFuture<'a, String> {
        Box::pin(self.post_chat(message, history))
    }

    fn health_check<'a>(&'a self) -> RelayFuture<'a, HealthResponse> {
        Box::pin(self.get_health())
    }
}

fn http_status_message(status: StatusCode) -> String {
    format!("HTTP {}", status.as_u16())
}

fn health_check_failed(status: u16) -> ApiError {
    ApiError::new(status, "Health check failed")
}
